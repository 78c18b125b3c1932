// 该文件是 Shuzi （数字识别） 项目的一部分。
// src/frame.rs - NHWC 灰度帧定义
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

use thiserror::Error;

use crate::input::AsNhwcFrame;

const GRAY_CHANNELS: usize = 1;
const BATCH_SIZE: usize = 1;

#[derive(Error, Debug)]
pub enum FrameError {
  #[error("数据长度不匹配: 期望长度 {expected}, 实际长度 {actual}")]
  LengthMismatch { expected: usize, actual: usize },
}

/// 批大小为 1 的灰度帧，内存布局为 NHWC（1×H×W×1）
#[derive(Debug, Clone)]
pub struct GrayNhwcFrame<const W: u32, const H: u32> {
  data: Box<[u8]>,
}

impl<const W: u32, const H: u32> GrayNhwcFrame<W, H> {
  const LEN: usize = BATCH_SIZE * GRAY_CHANNELS * W as usize * H as usize;

  pub fn height(&self) -> usize {
    H as usize
  }

  pub fn width(&self) -> usize {
    W as usize
  }

  pub fn channels(&self) -> usize {
    GRAY_CHANNELS
  }

  /// 张量形状 `[N, H, W, C]`
  pub fn shape(&self) -> [usize; 4] {
    [BATCH_SIZE, H as usize, W as usize, GRAY_CHANNELS]
  }
}

impl<const W: u32, const H: u32> TryFrom<Vec<u8>> for GrayNhwcFrame<W, H> {
  type Error = FrameError;

  fn try_from(data: Vec<u8>) -> Result<Self, Self::Error> {
    if data.len() != Self::LEN {
      return Err(FrameError::LengthMismatch {
        expected: Self::LEN,
        actual: data.len(),
      });
    }

    Ok(Self {
      data: data.into_boxed_slice(),
    })
  }
}

impl<const W: u32, const H: u32> Default for GrayNhwcFrame<W, H> {
  fn default() -> Self {
    let data = vec![0u8; Self::LEN].into_boxed_slice();
    Self { data }
  }
}

impl<const W: u32, const H: u32> AsMut<[u8]> for GrayNhwcFrame<W, H> {
  fn as_mut(&mut self) -> &mut [u8] {
    &mut self.data
  }
}

impl<const W: u32, const H: u32> AsNhwcFrame<W, H> for GrayNhwcFrame<W, H> {
  fn as_nhwc(&self) -> &[u8] {
    &self.data
  }
}
