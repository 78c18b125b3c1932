// 该文件是 Shuzi （数字识别） 项目的一部分。
// src/model/onnx_classifier.rs - ONNX 分类模型
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

use std::marker::PhantomData;

use thiserror::Error;
use tracing::{debug, error, info};
use tract_onnx::prelude::*;
use url::Url;

use crate::{
  FromUrl, FromUrlWithScheme,
  frame::GrayNhwcFrame,
  input::AsNhwcFrame,
  model::{ClassifyError, ClassifyResult, Model, WithLabel, postprocess},
};

const ONNX_NUM_INPUTS: usize = 1;
const ONNX_NUM_OUTPUTS: usize = 1;

/// 输入为 1×H×W×1 的 f32 张量（0–255 原始灰度值），输出为各类别分数
pub struct OnnxClassifier<const W: u32, const H: u32, T> {
  plan: TypedRunnableModel<TypedModel>,
  _phantom: PhantomData<fn() -> T>,
}

#[derive(Error, Debug)]
pub enum OnnxClassifierError {
  #[error("模型加载错误: {0}")]
  ModelLoadError(std::io::Error),
  #[error("模型无效: {0}")]
  ModelInvalid(String),
  #[error("推理错误: {0}")]
  TractError(TractError),
  #[error("模型路径错误: {0}")]
  ModelPathError(String),
  #[error("分类错误: {0}")]
  ClassifyError(#[from] ClassifyError),
}

impl From<std::io::Error> for OnnxClassifierError {
  fn from(err: std::io::Error) -> Self {
    OnnxClassifierError::ModelLoadError(err)
  }
}

impl From<TractError> for OnnxClassifierError {
  fn from(err: TractError) -> Self {
    OnnxClassifierError::TractError(err)
  }
}

pub struct OnnxClassifierBuilder {
  model_path: String,
}

impl FromUrlWithScheme for OnnxClassifierBuilder {
  const SCHEME: &'static str = "onnx";
}

impl FromUrl for OnnxClassifierBuilder {
  type Error = OnnxClassifierError;

  fn from_url(url: &Url) -> Result<Self, Self::Error> {
    if url.scheme() != Self::SCHEME {
      return Err(OnnxClassifierError::ModelPathError(format!(
        "模型路径必须使用 {} 方案",
        Self::SCHEME
      )));
    }

    if url.path().is_empty() {
      return Err(OnnxClassifierError::ModelPathError(
        "模型路径为空".to_string(),
      ));
    }

    Ok(OnnxClassifierBuilder {
      model_path: url.path().to_string(),
    })
  }
}

impl OnnxClassifierBuilder {
  pub fn model_path(&self) -> &str {
    &self.model_path
  }

  pub fn build<const W: u32, const H: u32, T: WithLabel>(
    self,
  ) -> Result<OnnxClassifier<W, H, T>, OnnxClassifierError> {
    info!("加载模型文件: {}", self.model_path());
    let model_data = std::fs::read(self.model_path())?;
    debug!(
      "模型文件大小: {:.2} MB",
      model_data.len() as f64 / (1024.0 * 1024.0)
    );

    let mut reader: &[u8] = &model_data;
    let model = tract_onnx::onnx().model_for_read(&mut reader)?;

    let num_inputs = model.input_outlets()?.len();
    let num_outputs = model.output_outlets()?.len();

    if num_inputs != ONNX_NUM_INPUTS {
      error!(
        "预期模型输入数量为 {}, 实际为 {}",
        ONNX_NUM_INPUTS, num_inputs
      );
      return Err(OnnxClassifierError::ModelInvalid(format!(
        "预期模型输入数量为 {}, 实际为 {}",
        ONNX_NUM_INPUTS, num_inputs
      )));
    }

    if num_outputs != ONNX_NUM_OUTPUTS {
      error!(
        "预期模型输出数量为 {}, 实际为 {}",
        ONNX_NUM_OUTPUTS, num_outputs
      );
      return Err(OnnxClassifierError::ModelInvalid(format!(
        "预期模型输出数量为 {}, 实际为 {}",
        ONNX_NUM_OUTPUTS, num_outputs
      )));
    }

    info!("优化推理图，输入形状 [1, {}, {}, 1]", H, W);
    let plan = model
      .with_input_fact(0, f32::fact([1, H as usize, W as usize, 1]).into())?
      .into_optimized()?
      .into_runnable()?;
    info!("模型加载完成");

    Ok(OnnxClassifier {
      plan,
      _phantom: PhantomData,
    })
  }
}

impl<const W: u32, const H: u32, T: WithLabel> Model for OnnxClassifier<W, H, T> {
  type Input = GrayNhwcFrame<W, H>;
  type Output = ClassifyResult<T>;
  type Error = OnnxClassifierError;

  fn infer(&self, input: &Self::Input) -> Result<Self::Output, Self::Error> {
    debug!("设置模型输入");
    let pixels: Vec<f32> = input.as_nhwc().iter().map(|&v| v as f32).collect();
    let tensor = Tensor::from_shape(&input.shape(), &pixels)?;

    debug!("执行模型推理");
    let outputs = self.plan.run(tvec!(tensor.into()))?;

    debug!("获取模型输出");
    let scores = outputs
      .first()
      .ok_or_else(|| OnnxClassifierError::ModelInvalid("模型没有输出".to_string()))?
      .as_slice::<f32>()?;
    debug!("模型推理结果：{:?}", scores);

    Ok(postprocess(scores)?)
  }
}
