// 该文件是 Shuzi （数字识别） 项目的一部分。
// src/model.rs - 模型
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
use tracing::debug;

pub trait Model {
  type Input;
  type Output;
  type Error;

  fn infer(&self, input: &Self::Input) -> Result<Self::Output, Self::Error>;
}

pub trait WithLabel: Sized + std::fmt::Debug {
  /// 类别总数，模型输出的分数向量长度须与之相等
  const NUM_CLASSES: usize;

  fn to_label_str(&self) -> String;
  fn from_label_id(id: u32) -> Option<Self>;
}

/// MNIST 的十个类别
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DigitLabel {
  Zero,
  One,
  Two,
  Three,
  Four,
  Five,
  Six,
  Seven,
  Eight,
  Nine,
}

const DIGIT_LABELS: [DigitLabel; 10] = [
  DigitLabel::Zero,
  DigitLabel::One,
  DigitLabel::Two,
  DigitLabel::Three,
  DigitLabel::Four,
  DigitLabel::Five,
  DigitLabel::Six,
  DigitLabel::Seven,
  DigitLabel::Eight,
  DigitLabel::Nine,
];

impl DigitLabel {
  pub fn id(&self) -> u32 {
    *self as u32
  }
}

impl WithLabel for DigitLabel {
  const NUM_CLASSES: usize = DIGIT_LABELS.len();

  fn to_label_str(&self) -> String {
    self.id().to_string()
  }

  fn from_label_id(id: u32) -> Option<Self> {
    DIGIT_LABELS.get(id as usize).copied()
  }
}

#[derive(Error, Debug)]
pub enum ClassifyError {
  #[error("分数向量长度不匹配: 期望 {expected}, 实际 {actual}")]
  ScoreCountMismatch { expected: usize, actual: usize },
}

#[derive(Debug, Clone)]
pub struct ClassifyResult<T> {
  pub kind: T,
  pub score: f32,
  pub scores: Box<[f32]>,
}

impl<T: WithLabel> ClassifyResult<T> {
  pub fn label(&self) -> String {
    self.kind.to_label_str()
  }
}

/// 取分数最大的类别；并列时取下标最小者，NaN 不参与比较
pub fn postprocess<T: WithLabel>(scores: &[f32]) -> Result<ClassifyResult<T>, ClassifyError> {
  if scores.len() != T::NUM_CLASSES {
    return Err(ClassifyError::ScoreCountMismatch {
      expected: T::NUM_CLASSES,
      actual: scores.len(),
    });
  }

  let mut best = 0usize;
  for (idx, &score) in scores.iter().enumerate().skip(1) {
    let current = scores[best];
    if score > current || (current.is_nan() && !score.is_nan()) {
      best = idx;
    }
  }

  let kind = T::from_label_id(best as u32).ok_or(ClassifyError::ScoreCountMismatch {
    expected: T::NUM_CLASSES,
    actual: scores.len(),
  })?;
  debug!("分类结果: {:?}, 分数: {}", kind, scores[best]);

  Ok(ClassifyResult {
    kind,
    score: scores[best],
    scores: scores.into(),
  })
}

#[cfg(feature = "model_onnx")]
mod onnx_classifier;
#[cfg(feature = "model_onnx")]
pub use self::onnx_classifier::{OnnxClassifier, OnnxClassifierBuilder, OnnxClassifierError};
