// 该文件是 Shuzi （数字识别） 项目的一部分。
// src/server.rs - HTTP 服务
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

use std::sync::Arc;

use axum::{
  Router,
  extract::{
    DefaultBodyLimit, Multipart, State,
    multipart::{MultipartError, MultipartRejection},
  },
  http::StatusCode,
  response::{Html, IntoResponse, Response},
  routing::get,
};
use tracing::{debug, error, info, warn};

use crate::{
  DigitFrame,
  input::{UploadError, UploadStore, UploadedFile},
  model::{ClassifyResult, DigitLabel, Model},
  output::{FlashMessage, HtmlPage, IndexPage, Render, RenderError, UNAVAILABLE_ANSWER},
  task::{ClassifyOutcome, classify_file},
};

/// 表单中文件字段的名称
pub const FILE_FIELD: &str = "file";

pub const MODEL_UNAVAILABLE_MESSAGE: &str = "Model is not loaded; cannot predict.";
pub const PROCESSING_ERROR_MESSAGE: &str = "An error occurred while processing the image.";

#[derive(Debug, Clone)]
pub struct ServerConfig {
  pub host: String,
  pub port: u16,
  /// `None` 表示不限制上传大小
  pub max_upload_size: Option<usize>,
}

/// 所有请求共享的只读状态；模型加载失败时为 `None`
pub struct AppState<M> {
  pub model: Option<Arc<M>>,
  pub uploads: UploadStore,
  pub page: HtmlPage,
}

impl<M> AppState<M> {
  pub fn new(model: Option<M>, uploads: UploadStore) -> Result<Self, RenderError> {
    Ok(Self {
      model: model.map(Arc::new),
      uploads,
      page: HtmlPage::new()?,
    })
  }
}

pub fn build_app<M>(state: Arc<AppState<M>>, max_upload_size: Option<usize>) -> Router
where
  M: Model<Input = DigitFrame, Output = ClassifyResult<DigitLabel>> + Send + Sync + 'static,
  M::Error: std::error::Error + Send + Sync + 'static,
{
  let body_limit = match max_upload_size {
    Some(limit) => DefaultBodyLimit::max(limit),
    None => DefaultBodyLimit::disable(),
  };

  Router::new()
    .route("/", get(index::<M>).post(upload_file::<M>))
    .layer(body_limit)
    .with_state(state)
}

pub async fn startup<M>(config: ServerConfig, state: Arc<AppState<M>>) -> anyhow::Result<()>
where
  M: Model<Input = DigitFrame, Output = ClassifyResult<DigitLabel>> + Send + Sync + 'static,
  M::Error: std::error::Error + Send + Sync + 'static,
{
  let app = build_app(state, config.max_upload_size);
  let addr = format!("{}:{}", config.host, config.port);
  let listener = tokio::net::TcpListener::bind(&addr).await?;
  info!("服务已启动: http://{}", addr);

  axum::serve(listener, app)
    .with_graceful_shutdown(shutdown_signal())
    .await?;

  info!("服务已退出");
  Ok(())
}

async fn shutdown_signal() {
  if let Err(e) = tokio::signal::ctrl_c().await {
    error!("无法监听中断信号: {}", e);
    std::future::pending::<()>().await;
  }
  warn!("收到中断信号，准备退出...");
}

async fn index<M>(State(state): State<Arc<AppState<M>>>) -> Response {
  render_response(&state.page, &IndexPage::default())
}

async fn upload_file<M>(
  State(state): State<Arc<AppState<M>>>,
  multipart: Result<Multipart, MultipartRejection>,
) -> Response
where
  M: Model<Input = DigitFrame, Output = ClassifyResult<DigitLabel>> + Send + Sync + 'static,
  M::Error: std::error::Error + Send + Sync + 'static,
{
  let page = handle_upload(&state, multipart).await;
  render_response(&state.page, &page)
}

async fn handle_upload<M>(
  state: &AppState<M>,
  multipart: Result<Multipart, MultipartRejection>,
) -> IndexPage
where
  M: Model<Input = DigitFrame, Output = ClassifyResult<DigitLabel>> + Send + Sync + 'static,
  M::Error: std::error::Error + Send + Sync + 'static,
{
  let file = match read_file_field(multipart).await {
    Ok(Some(file)) => file,
    Ok(None) => return rejected(UploadError::NoFilePart),
    Err(e) => {
      error!("读取上传内容失败: {}", e);
      return processing_error();
    }
  };

  let filename = match file.validate() {
    Ok(filename) => filename,
    Err(e) => return rejected(e),
  };

  let path = match state.uploads.save(&filename, &file).await {
    Ok(path) => path,
    Err(e) => {
      error!("保存上传文件失败 {}: {}", filename, e);
      return processing_error();
    }
  };
  info!("已保存上传文件: {}", path.display());

  let Some(model) = state.model.clone() else {
    warn!("模型未加载，跳过推理");
    return IndexPage::default()
      .with_message(FlashMessage::error(MODEL_UNAVAILABLE_MESSAGE))
      .with_answer(UNAVAILABLE_ANSWER);
  };

  match tokio::task::spawn_blocking(move || classify_file(&path, model.as_ref())).await {
    Ok(ClassifyOutcome::Predicted(result)) => {
      info!("{} 预测结果: {} ({:.4})", filename, result.label(), result.score);
      IndexPage::predicted(&result)
    }
    Ok(ClassifyOutcome::Failed(_)) => processing_error(),
    Err(e) => {
      error!("推理任务异常退出: {}", e);
      processing_error()
    }
  }
}

/// 取出名为 `file` 且带文件名的字段；请求不是 multipart 或没有这样的字段时返回 `None`
async fn read_file_field(
  multipart: Result<Multipart, MultipartRejection>,
) -> Result<Option<UploadedFile>, MultipartError> {
  let mut multipart = match multipart {
    Ok(multipart) => multipart,
    Err(rejection) => {
      debug!("请求不是 multipart 表单: {}", rejection);
      return Ok(None);
    }
  };

  while let Some(field) = multipart.next_field().await? {
    if field.name() != Some(FILE_FIELD) {
      continue;
    }

    // 没有 filename 参数的同名字段是普通表单值，不算文件
    let Some(filename) = field.file_name().map(str::to_string) else {
      debug!("字段 {} 不带文件名，忽略", FILE_FIELD);
      continue;
    };
    let bytes = field.bytes().await?;
    debug!("收到文件字段: {:?} ({} 字节)", filename, bytes.len());
    return Ok(Some(UploadedFile::new(filename, bytes.to_vec())));
  }

  Ok(None)
}

fn rejected(e: UploadError) -> IndexPage {
  warn!("上传被拒绝: {}", e);
  IndexPage::default().with_message(FlashMessage::error(e.to_string()))
}

fn processing_error() -> IndexPage {
  IndexPage::default().with_message(FlashMessage::error(PROCESSING_ERROR_MESSAGE))
}

fn render_response(page: &HtmlPage, content: &IndexPage) -> Response {
  match page.render_page(content) {
    Ok(html) => Html(html).into_response(),
    Err(e) => {
      error!("页面渲染失败: {}", e);
      (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error").into_response()
    }
  }
}
