// 该文件是 Shuzi （数字识别） 项目的一部分。
// src/output/html_page.rs - HTML 页面渲染
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

use minijinja::{Environment, context};
use thiserror::Error;

use crate::output::{IndexPage, Render};

pub const PAGE_TITLE: &str = "Handwritten Digit Recognition";

const INDEX_TEMPLATE_NAME: &str = "index.html";
const INDEX_TEMPLATE: &str = include_str!("../../templates/index.html");

#[derive(Error, Debug)]
pub enum RenderError {
  #[error("模板错误: {0}")]
  TemplateError(#[from] minijinja::Error),
}

/// 基于 minijinja 的页面渲染器；`.html` 模板自动转义
pub struct HtmlPage {
  env: Environment<'static>,
}

impl HtmlPage {
  pub fn new() -> Result<Self, RenderError> {
    let mut env = Environment::new();
    env.add_template(INDEX_TEMPLATE_NAME, INDEX_TEMPLATE)?;
    Ok(Self { env })
  }
}

impl Render<IndexPage> for HtmlPage {
  type Output = String;
  type Error = RenderError;

  fn render_page(&self, page: &IndexPage) -> Result<Self::Output, Self::Error> {
    let template = self.env.get_template(INDEX_TEMPLATE_NAME)?;
    let html = template.render(context! {
      title => PAGE_TITLE,
      answer => &page.answer,
      messages => &page.messages,
    })?;
    Ok(html)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::output::FlashMessage;

  #[test]
  fn test_render_empty_page() {
    let html = HtmlPage::new()
      .unwrap()
      .render_page(&IndexPage::default())
      .unwrap();
    assert!(html.contains(PAGE_TITLE));
    assert!(html.contains(r#"name="file""#));
    assert!(html.contains(r#"enctype="multipart/form-data""#));
    assert!(!html.contains("class=\"answer\""));
    assert!(!html.contains("class=\"flash"));
  }

  #[test]
  fn test_render_messages_and_answer() {
    let page = IndexPage::default()
      .with_message(FlashMessage::error("No file part"))
      .with_message(FlashMessage::error("No selected file"))
      .with_answer("predicted: 7");
    let html = HtmlPage::new().unwrap().render_page(&page).unwrap();
    assert!(html.contains(r#"<div class="flash flash-error">No file part</div>"#));
    assert!(html.contains(r#"<div class="flash flash-error">No selected file</div>"#));
    assert!(html.contains(r#"<div class="answer">predicted: 7</div>"#));
  }

  #[test]
  fn test_render_escapes_html() {
    let page = IndexPage::default().with_message(FlashMessage::error("<script>x</script>"));
    let html = HtmlPage::new().unwrap().render_page(&page).unwrap();
    assert!(!html.contains("<script>x</script>"));
    assert!(html.contains("&lt;script&gt;"));
  }
}
