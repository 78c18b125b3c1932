// 该文件是 Shuzi （数字识别） 项目的一部分。
// src/main.rs - 项目主程序
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

mod args;

use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use shuzi::{
  DIGIT_IMAGE_SIZE, FromUrl,
  input::UploadStore,
  model::{DigitLabel, OnnxClassifier, OnnxClassifierBuilder},
  server::{self, AppState},
};

type DigitClassifier = OnnxClassifier<DIGIT_IMAGE_SIZE, DIGIT_IMAGE_SIZE, DigitLabel>;

/// 加载失败时返回 `None`，服务照常启动，推理请求返回错误提示
fn load_model(url: &url::Url) -> Option<DigitClassifier> {
  let result = OnnxClassifierBuilder::from_url(url).and_then(|builder| {
    builder.build::<DIGIT_IMAGE_SIZE, DIGIT_IMAGE_SIZE, DigitLabel>()
  });
  match result {
    Ok(model) => {
      info!("模型加载成功: {}", url);
      Some(model)
    }
    Err(e) => {
      error!("模型加载失败: {}", e);
      None
    }
  }
}

#[tokio::main]
async fn main() -> Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
    .init();

  let args = args::Args::parse();

  info!("Shuzi 手写数字识别服务");
  info!("模型路径: {}", args.model);
  info!("上传目录: {}", args.upload_folder.display());
  if args.uses_dev_secret() {
    warn!("正在使用默认的开发密钥，生产环境请设置 SECRET_KEY");
  }

  let model = load_model(&args.model);
  let uploads = UploadStore::new(&args.upload_folder)?;
  let state = Arc::new(AppState::new(model, uploads)?);

  server::startup(args.server_config(), state).await
}
