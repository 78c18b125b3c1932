//! Shared fixtures for the HTTP flow tests: classifier doubles, an app
//! backed by a temporary upload directory, and a multipart body builder.

#![allow(dead_code)]

use std::{
  io::Cursor,
  sync::{
    Arc,
    atomic::{AtomicUsize, Ordering},
  },
};

use axum::{
  Router,
  body::{Body, to_bytes},
  http::{Request, Response, header::CONTENT_TYPE},
};
use image::{DynamicImage, GrayImage, ImageFormat, Luma};
use shuzi::{
  DigitFrame,
  input::UploadStore,
  model::{ClassifyError, ClassifyResult, DigitLabel, Model, postprocess},
  server::{AppState, build_app},
};
use tempfile::TempDir;

pub const BOUNDARY: &str = "----shuzi-test-boundary";

/// Classifier double that always returns the same score vector.
#[derive(Clone)]
pub struct FixedScores {
  scores: Vec<f32>,
  calls: Arc<AtomicUsize>,
}

impl FixedScores {
  pub fn new(scores: Vec<f32>) -> Self {
    Self {
      scores,
      calls: Arc::new(AtomicUsize::new(0)),
    }
  }

  /// One-hot scores peaking at `digit`.
  pub fn one_hot(digit: usize) -> Self {
    let mut scores = vec![0.0; 10];
    scores[digit] = 1.0;
    Self::new(scores)
  }

  pub fn calls(&self) -> usize {
    self.calls.load(Ordering::SeqCst)
  }
}

impl Model for FixedScores {
  type Input = DigitFrame;
  type Output = ClassifyResult<DigitLabel>;
  type Error = ClassifyError;

  fn infer(&self, _input: &Self::Input) -> Result<Self::Output, Self::Error> {
    self.calls.fetch_add(1, Ordering::SeqCst);
    postprocess(&self.scores)
  }
}

pub struct TestApp {
  pub router: Router,
  pub dir: TempDir,
}

impl TestApp {
  pub fn new<M>(model: Option<M>) -> Self
  where
    M: Model<Input = DigitFrame, Output = ClassifyResult<DigitLabel>> + Send + Sync + 'static,
    M::Error: std::error::Error + Send + Sync + 'static,
  {
    Self::with_limit(model, None)
  }

  pub fn with_limit<M>(model: Option<M>, max_upload_size: Option<usize>) -> Self
  where
    M: Model<Input = DigitFrame, Output = ClassifyResult<DigitLabel>> + Send + Sync + 'static,
    M::Error: std::error::Error + Send + Sync + 'static,
  {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let uploads = UploadStore::new(dir.path().join("uploads")).expect("Failed to create uploads");
    let state = Arc::new(AppState::new(model, uploads).expect("Failed to build state"));
    Self {
      router: build_app(state, max_upload_size),
      dir,
    }
  }

  pub fn uploaded(&self, name: &str) -> std::path::PathBuf {
    self.dir.path().join("uploads").join(name)
  }

  pub fn upload_count(&self) -> usize {
    std::fs::read_dir(self.dir.path().join("uploads"))
      .map(|entries| entries.count())
      .unwrap_or(0)
  }
}

/// One multipart part; `filename: None` makes it a plain form field.
pub struct Part<'a> {
  pub name: &'a str,
  pub filename: Option<&'a str>,
  pub content: &'a [u8],
}

impl<'a> Part<'a> {
  pub fn file(filename: &'a str, content: &'a [u8]) -> Self {
    Self {
      name: "file",
      filename: Some(filename),
      content,
    }
  }

  pub fn field(name: &'a str, content: &'a [u8]) -> Self {
    Self {
      name,
      filename: None,
      content,
    }
  }
}

pub fn multipart_request(parts: &[Part<'_>]) -> Request<Body> {
  let mut body = Vec::new();
  for part in parts {
    body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
    let mut disposition = format!("Content-Disposition: form-data; name=\"{}\"", part.name);
    if let Some(filename) = part.filename {
      disposition.push_str(&format!("; filename=\"{}\"", filename));
    }
    body.extend_from_slice(disposition.as_bytes());
    body.extend_from_slice(b"\r\n");
    if part.filename.is_some() {
      body.extend_from_slice(b"Content-Type: application/octet-stream\r\n");
    }
    body.extend_from_slice(b"\r\n");
    body.extend_from_slice(part.content);
    body.extend_from_slice(b"\r\n");
  }
  body.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());

  Request::builder()
    .method("POST")
    .uri("/")
    .header(
      CONTENT_TYPE,
      format!("multipart/form-data; boundary={}", BOUNDARY),
    )
    .body(Body::from(body))
    .unwrap()
}

pub fn get_index() -> Request<Body> {
  Request::builder()
    .method("GET")
    .uri("/")
    .body(Body::empty())
    .unwrap()
}

pub async fn body_text(response: Response<Body>) -> String {
  let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
  String::from_utf8(bytes.to_vec()).unwrap()
}

pub fn png_bytes(image: GrayImage) -> Vec<u8> {
  let mut cursor = Cursor::new(Vec::new());
  DynamicImage::ImageLuma8(image)
    .write_to(&mut cursor, ImageFormat::Png)
    .unwrap();
  cursor.into_inner()
}

/// 28×28 all-white grayscale PNG.
pub fn blank_png() -> Vec<u8> {
  png_bytes(GrayImage::from_pixel(28, 28, Luma([255])))
}
