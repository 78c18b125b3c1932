// 该文件是 Shuzi （数字识别） 项目的一部分。
// src/args.rs - 项目参数配置
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

use std::path::PathBuf;

use clap::Parser;
use url::Url;

use shuzi::server::ServerConfig;

/// 开发用的默认密钥，生产环境应通过 SECRET_KEY 覆盖
pub const DEV_SECRET_KEY: &str = "dev_key";

/// Shuzi 项目参数配置
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
  /// 监听地址
  #[arg(long, env = "HOST", default_value = "0.0.0.0")]
  pub host: String,

  /// 监听端口
  #[arg(long, env = "PORT", default_value_t = 8080)]
  pub port: u16,

  /// 签名密钥
  #[arg(long, env = "SECRET_KEY", default_value = DEV_SECRET_KEY, hide_env_values = true)]
  pub secret_key: String,

  /// 模型路径，例如 onnx:model.onnx 或 onnx:///srv/models/mnist.onnx
  #[arg(long, env = "MODEL_URL", default_value = "onnx:model.onnx", value_name = "MODEL")]
  pub model: Url,

  /// 上传文件保存目录
  #[arg(long, env = "UPLOAD_FOLDER", default_value = "uploads", value_name = "DIR")]
  pub upload_folder: PathBuf,

  /// 单次上传的最大字节数（不设置则不限制）
  #[arg(long, env = "MAX_UPLOAD_SIZE", value_name = "BYTES")]
  pub max_upload_size: Option<usize>,
}

impl Args {
  pub fn server_config(&self) -> ServerConfig {
    ServerConfig {
      host: self.host.clone(),
      port: self.port,
      max_upload_size: self.max_upload_size,
    }
  }

  pub fn uses_dev_secret(&self) -> bool {
    self.secret_key == DEV_SECRET_KEY
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_defaults() {
    let args = Args::try_parse_from(["shuzi"]).unwrap();
    assert_eq!(args.model.scheme(), "onnx");
    assert_eq!(args.model.path(), "model.onnx");
    assert_eq!(args.upload_folder, PathBuf::from("uploads"));
    assert!(args.max_upload_size.is_none());
  }

  #[test]
  fn test_flags_override() {
    let args = Args::try_parse_from([
      "shuzi",
      "--port",
      "9000",
      "--secret-key",
      "s3cret",
      "--model",
      "onnx:///srv/mnist.onnx",
      "--max-upload-size",
      "1048576",
    ])
    .unwrap();
    let config = args.server_config();
    assert_eq!(config.port, 9000);
    assert_eq!(config.max_upload_size, Some(1048576));
    assert!(!args.uses_dev_secret());
    assert_eq!(args.model.path(), "/srv/mnist.onnx");
  }
}
