// 该文件是 Shuzi （数字识别） 项目的一部分。
// src/task.rs - 推理任务
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

use tracing::{error, info};

use crate::{
  DIGIT_IMAGE_SIZE, DigitFrame,
  input::ImageFileInput,
  model::{ClassifyResult, Model},
};

pub trait Task<I, M>: Sized {
  type Output;
  type Error;
  fn run_task(self, input: I, model: &M) -> Result<Self::Output, Self::Error>;
}

/// 取输入的第一帧，推理一次
pub struct OneShotTask;

impl<F, D, ME, I, M> Task<I, M> for OneShotTask
where
  ME: std::error::Error + Sync + Send + 'static,
  I: Iterator<Item = F>,
  M: Model<Input = F, Output = D, Error = ME>,
{
  type Output = D;
  type Error = anyhow::Error;

  fn run_task(self, mut input: I, model: &M) -> Result<Self::Output, Self::Error> {
    info!("开始任务...");
    let frame = input.next().ok_or_else(|| anyhow::anyhow!("没有输入帧"))?;
    info!("输入帧获取成功，开始推理...");
    let now = std::time::Instant::now();
    let result = model.infer(&frame)?;
    info!("推理完成，耗时: {:.2?}", now.elapsed());

    Ok(result)
  }
}

/// 预处理与推理的结果：成功给出标签，失败给出原因
#[derive(Debug)]
pub enum ClassifyOutcome<T> {
  Predicted(ClassifyResult<T>),
  Failed(String),
}

impl<T> ClassifyOutcome<T> {
  pub fn is_predicted(&self) -> bool {
    matches!(self, ClassifyOutcome::Predicted(_))
  }
}

/// 读取已保存的图片并分类；任何错误都记录日志并折叠为 `Failed`
pub fn classify_file<T, M, ME>(path: &Path, model: &M) -> ClassifyOutcome<T>
where
  ME: std::error::Error + Sync + Send + 'static,
  M: Model<Input = DigitFrame, Output = ClassifyResult<T>, Error = ME>,
{
  let run = || -> anyhow::Result<ClassifyResult<T>> {
    let input = ImageFileInput::<DIGIT_IMAGE_SIZE, DIGIT_IMAGE_SIZE>::open(path)?;
    OneShotTask.run_task(input.into_nhwc(), model)
  };

  match run() {
    Ok(result) => ClassifyOutcome::Predicted(result),
    Err(e) => {
      error!("推理错误 {}: {:#}", path.display(), e);
      ClassifyOutcome::Failed(e.to_string())
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::{
    input::AsNhwcFrame,
    model::{ClassifyError, DigitLabel, postprocess},
  };
  use image::{GrayImage, Luma};

  /// 以像素均值决定类别的假模型
  struct MeanModel;

  impl Model for MeanModel {
    type Input = DigitFrame;
    type Output = ClassifyResult<DigitLabel>;
    type Error = ClassifyError;

    fn infer(&self, input: &Self::Input) -> Result<Self::Output, Self::Error> {
      let pixels = input.as_nhwc();
      let mean = pixels.iter().map(|&v| v as usize).sum::<usize>() / pixels.len();
      let mut scores = [0.0f32; 10];
      scores[mean * 9 / 255] = 1.0;
      postprocess(&scores)
    }
  }

  #[test]
  fn test_one_shot_takes_first_frame() {
    let frames = vec![DigitFrame::default(), DigitFrame::default()];
    let result = OneShotTask.run_task(frames.into_iter(), &MeanModel).unwrap();
    assert_eq!(result.kind, DigitLabel::Zero);
  }

  #[test]
  fn test_one_shot_without_frame_fails() {
    let frames: Vec<DigitFrame> = Vec::new();
    assert!(OneShotTask.run_task(frames.into_iter(), &MeanModel).is_err());
  }

  #[test]
  fn test_classify_file_outcomes() {
    let dir = tempfile::tempdir().unwrap();
    let white = dir.path().join("white.png");
    GrayImage::from_pixel(56, 56, Luma([255])).save(&white).unwrap();

    match classify_file(&white, &MeanModel) {
      ClassifyOutcome::Predicted(result) => assert_eq!(result.kind, DigitLabel::Nine),
      ClassifyOutcome::Failed(reason) => panic!("unexpected failure: {}", reason),
    }

    let broken = dir.path().join("broken.png");
    std::fs::write(&broken, b"\x89PNG but not really").unwrap();
    let outcome = classify_file(&broken, &MeanModel);
    assert!(!outcome.is_predicted());

    let missing = dir.path().join("missing.png");
    assert!(matches!(
      classify_file(&missing, &MeanModel),
      ClassifyOutcome::Failed(_)
    ));
  }
}
