// 该文件是 Shuzi （数字识别） 项目的一部分。
// src/output.rs - 输出定义
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

use serde::Serialize;

use crate::model::{ClassifyResult, WithLabel};

pub trait Render<Page>: Sized {
  type Output;
  type Error;
  fn render_page(&self, page: &Page) -> Result<Self::Output, Self::Error>;
}

/// 模型不可用时代替预测结果显示的占位文本
pub const UNAVAILABLE_ANSWER: &str = "Error";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FlashCategory {
  Error,
}

/// 随本次响应一起显示的一次性提示
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FlashMessage {
  pub category: FlashCategory,
  pub message: String,
}

impl FlashMessage {
  pub fn error(message: impl Into<String>) -> Self {
    Self {
      category: FlashCategory::Error,
      message: message.into(),
    }
  }
}

/// 首页：上传表单、提示列表与预测文本
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct IndexPage {
  pub answer: String,
  pub messages: Vec<FlashMessage>,
}

impl IndexPage {
  pub fn with_message(mut self, message: FlashMessage) -> Self {
    self.messages.push(message);
    self
  }

  pub fn with_answer(mut self, answer: impl Into<String>) -> Self {
    self.answer = answer.into();
    self
  }

  pub fn predicted<T: WithLabel>(result: &ClassifyResult<T>) -> Self {
    Self::default().with_answer(format!("predicted: {}", result.label()))
  }
}

mod html_page;
pub use self::html_page::{HtmlPage, PAGE_TITLE, RenderError};
