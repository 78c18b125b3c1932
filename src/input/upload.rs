// 该文件是 Shuzi （数字识别） 项目的一部分。
// src/input/upload.rs - 上传文件校验与保存
//
// 本文件根据 Apache 许可证第 2.0 版（以下简称“许可证”）授权使用；
// 除非遵守该许可证条款，否则您不得使用本文件。
// 您可通过以下网址获取许可证副本：
// http://www.apache.org/licenses/LICENSE-2.0
// 除非适用法律要求或书面同意，根据本许可协议分发的软件均按“原样”提供，
// 不附带任何形式的明示或暗示的保证或条件。
// 有关许可权限与限制的具体条款，请参阅本许可协议。
//
// Copyright (C) 2026 Johann Li <me@qinka.pro>, Wareless Group

use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, info};

/// 允许上传的图片扩展名（小写比较）
pub const ALLOWED_EXTENSIONS: [&str; 4] = ["png", "jpg", "jpeg", "gif"];

#[derive(Error, Debug)]
pub enum UploadError {
  #[error("No file part")]
  NoFilePart,
  #[error("No selected file")]
  NoSelectedFile,
  #[error("File type not allowed: {0} (allowed: png, jpg, jpeg, gif)")]
  DisallowedExtension(String),
  #[error("Invalid filename: {0}")]
  InvalidFilename(String),
  #[error("I/O error: {0}")]
  IoError(#[from] std::io::Error),
}

/// 一次请求中收到的文件，保存后即丢弃
#[derive(Debug, Clone)]
pub struct UploadedFile {
  pub filename: String,
  pub bytes: Vec<u8>,
}

impl UploadedFile {
  pub fn new(filename: impl Into<String>, bytes: Vec<u8>) -> Self {
    Self {
      filename: filename.into(),
      bytes,
    }
  }

  /// 依次检查：文件名非空、扩展名允许、净化后的文件名可用。
  /// 成功时返回净化后的文件名。
  pub fn validate(&self) -> Result<String, UploadError> {
    if self.filename.is_empty() {
      return Err(UploadError::NoSelectedFile);
    }

    if !allowed_file(&self.filename) {
      return Err(UploadError::DisallowedExtension(self.filename.clone()));
    }

    let secured = secure_filename(&self.filename);
    if !allowed_file(&secured) {
      return Err(UploadError::InvalidFilename(self.filename.clone()));
    }

    Ok(secured)
  }
}

/// 文件名最后一个 `.` 之后的部分属于允许集合（忽略大小写）
pub fn allowed_file(filename: &str) -> bool {
  filename
    .rsplit_once('.')
    .map(|(_, ext)| {
      ALLOWED_EXTENSIONS
        .iter()
        .any(|allowed| ext.eq_ignore_ascii_case(allowed))
    })
    .unwrap_or(false)
}

/// 生成可安全落盘的文件名：
/// 去掉非 ASCII 字符，路径分隔符视为空白，空白折叠为 `_`，
/// 仅保留 `[A-Za-z0-9_.-]`，并去掉首尾的 `.` 与 `_`。
pub fn secure_filename(filename: &str) -> String {
  let spaced: String = filename
    .chars()
    .filter(char::is_ascii)
    .map(|c| if c == '/' || c == '\\' { ' ' } else { c })
    .collect();

  let joined = spaced.split_whitespace().collect::<Vec<_>>().join("_");

  joined
    .chars()
    .filter(|&c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-'))
    .collect::<String>()
    .trim_matches(|c: char| c == '.' || c == '_')
    .to_string()
}

/// 上传目录
#[derive(Debug, Clone)]
pub struct UploadStore {
  directory: PathBuf,
}

impl UploadStore {
  /// 目录不存在时创建
  pub fn new(directory: impl Into<PathBuf>) -> Result<Self, UploadError> {
    let directory = directory.into();
    if !directory.exists() {
      std::fs::create_dir_all(&directory)?;
      info!("创建上传目录: {}", directory.display());
    }
    Ok(Self { directory })
  }

  pub fn directory(&self) -> &Path {
    &self.directory
  }

  /// 以净化后的文件名写入上传目录，同名文件直接覆盖
  pub async fn save(&self, filename: &str, file: &UploadedFile) -> Result<PathBuf, UploadError> {
    let path = self.directory.join(filename);
    tokio::fs::create_dir_all(&self.directory).await?;
    tokio::fs::write(&path, &file.bytes).await?;
    debug!("保存上传文件 {} ({} 字节)", path.display(), file.bytes.len());
    Ok(path)
  }
}
