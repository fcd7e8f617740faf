pub mod vision;

use async_trait::async_trait;
use futures_util::future::join_all;
use serde::{Serialize, Deserialize};
use thiserror::Error;

/// An image to run text recognition on
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImageSource {
    Url(String),
    Bytes(Vec<u8>),
}

impl ImageSource {
    /// Label for history entries and logs
    pub fn describe(&self) -> Option<String> {
        match self {
            Self::Url(url) => Some(url.clone()),
            Self::Bytes(_) => None,
        }
    }
}

#[derive(Debug, Error)]
pub enum OcrError {
    #[error("OCR request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("OCR provider error: {0}")]
    Provider(String),
    #[error("no text found in image")]
    NoText,
}

#[async_trait]
pub trait OcrClient: Send + Sync {
    async fn recognize(&self, image: &ImageSource) -> Result<String, OcrError>;
}

/// Recognize `images` in chunks of `batch_size`; the requests within a chunk
/// run concurrently. One result per image, in input order. Failed images are
/// not retried.
pub async fn recognize_all(
    client: &dyn OcrClient,
    images: &[ImageSource],
    batch_size: usize,
) -> Vec<Result<String, OcrError>> {
    let mut results = Vec::with_capacity(images.len());
    for (n, chunk) in images.chunks(batch_size.max(1)).enumerate() {
        tracing::debug!("OCR batch {} ({} images)", n, chunk.len());
        results.extend(join_all(chunk.iter().map(|image| client.recognize(image))).await);
    }
    results
}
