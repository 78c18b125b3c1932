// 该文件是 Shuzi （数字识别） 项目的一部分。
// src/input/read_image_file.rs - 图像文件输入
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

use std::path::Path;

use image::{GrayImage, ImageReader, imageops::FilterType};
use thiserror::Error;
use tracing::{debug, error};
use url::Url;

use crate::{
  FromUrl, FromUrlWithScheme,
  frame::{FrameError, GrayNhwcFrame},
};

#[derive(Error, Debug)]
pub enum ImageFileInputError {
  #[error("URI schema mismatch")]
  SchemaMismatch,
  #[error("I/O error: {0}")]
  IoError(std::io::Error),
  #[error("Image loading error: {0}")]
  ImageLoadError(image::ImageError),
  #[error("Frame error: {0}")]
  FrameError(#[from] FrameError),
}

impl From<std::io::Error> for ImageFileInputError {
  fn from(err: std::io::Error) -> Self {
    ImageFileInputError::IoError(err)
  }
}

impl From<image::ImageError> for ImageFileInputError {
  fn from(err: image::ImageError) -> Self {
    ImageFileInputError::ImageLoadError(err)
  }
}

/// 从磁盘读取一张图片，转为灰度并缩放到 W×H
pub struct ImageFileInput<const W: u32, const H: u32> {
  frame: Option<GrayNhwcFrame<W, H>>,
}

impl<const W: u32, const H: u32> FromUrlWithScheme for ImageFileInput<W, H> {
  const SCHEME: &'static str = "image";
}

impl<const W: u32, const H: u32> FromUrl for ImageFileInput<W, H> {
  type Error = ImageFileInputError;

  fn from_url(url: &Url) -> Result<Self, Self::Error> {
    if url.scheme() != Self::SCHEME {
      error!(
        "URI scheme mismatch: expected '{}', found '{}'",
        Self::SCHEME,
        url.scheme()
      );
      return Err(ImageFileInputError::SchemaMismatch);
    }

    Self::open(url.path())
  }
}

impl<const W: u32, const H: u32> ImageFileInput<W, H> {
  /// 按文件内容识别格式，不依赖扩展名
  pub fn open(path: impl AsRef<Path>) -> Result<Self, ImageFileInputError> {
    let path = path.as_ref();
    let image = ImageReader::open(path)?.with_guessed_format()?.decode()?;
    debug!(
      "读取图像 {}: {}x{}",
      path.display(),
      image.width(),
      image.height()
    );

    let gray = image.to_luma8();
    let resized = if gray.dimensions() == (W, H) {
      gray
    } else {
      image::imageops::resize(&gray, W, H, FilterType::Nearest)
    };

    let frame = GrayNhwcFrame::<W, H>::try_from(resized)?;
    debug!(
      "预处理完成: 1x{}x{}x{}",
      frame.height(),
      frame.width(),
      frame.channels()
    );

    Ok(ImageFileInput { frame: Some(frame) })
  }

  pub fn into_nhwc(self) -> ImageFileInputNhwc<W, H> {
    ImageFileInputNhwc { inner: self }
  }
}

pub struct ImageFileInputNhwc<const W: u32, const H: u32> {
  inner: ImageFileInput<W, H>,
}

impl<const W: u32, const H: u32> Iterator for ImageFileInputNhwc<W, H> {
  type Item = GrayNhwcFrame<W, H>;

  fn next(&mut self) -> Option<Self::Item> {
    self.inner.frame.take()
  }
}

impl<const W: u32, const H: u32> TryFrom<GrayImage> for GrayNhwcFrame<W, H> {
  type Error = FrameError;

  fn try_from(image: GrayImage) -> Result<Self, Self::Error> {
    // 单通道灰度图的行优先存储即为 1×H×W×1 的 NHWC 布局
    GrayNhwcFrame::<W, H>::try_from(image.into_raw())
  }
}
