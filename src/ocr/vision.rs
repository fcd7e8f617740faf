use std::time::Duration;
use async_trait::async_trait;
use base64::Engine as _;
use serde::Deserialize;
use serde_json::{json, Value};

use super::{ImageSource, OcrClient, OcrError};
use crate::config::OcrConfig;

pub const DEFAULT_ENDPOINT: &str = "https://vision.googleapis.com/v1/images:annotate";

/// Client for a Google Vision compatible `images:annotate` endpoint
pub struct VisionClient {
    client: reqwest::Client,
    endpoint: String,
    api_key: String,
}

impl VisionClient {
    pub fn new(config: &OcrConfig) -> Result<Self, OcrError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_s))
            .user_agent(concat!("ReadToMe/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            client,
            endpoint: config.endpoint.clone(),
            api_key: config.api_key.clone(),
        })
    }
}

#[async_trait]
impl OcrClient for VisionClient {
    async fn recognize(&self, image: &ImageSource) -> Result<String, OcrError> {
        let body = annotate_request(image);
        let resp = self.client.post(&self.endpoint)
            .query(&[("key", &self.api_key)])
            .json(&body)
            .send()
            .await?
            .error_for_status()?;

        let parsed: AnnotateResponse = resp.json().await?;
        let text = extract_text(parsed)?;
        tracing::debug!("Recognized {} chars from {:?}", text.len(), image.describe());
        Ok(text)
    }
}

pub(crate) fn annotate_request(image: &ImageSource) -> Value {
    let image = match image {
        ImageSource::Url(url) => json!({ "source": { "imageUri": url } }),
        ImageSource::Bytes(bytes) => {
            json!({ "content": base64::engine::general_purpose::STANDARD.encode(bytes) })
        }
    };
    json!({
        "requests": [{
            "image": image,
            "features": [{ "type": "TEXT_DETECTION" }],
        }]
    })
}

#[derive(Debug, Deserialize)]
pub(crate) struct AnnotateResponse {
    #[serde(default)]
    responses: Vec<ImageResponse>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ImageResponse {
    #[serde(default)]
    full_text_annotation: Option<FullText>,
    #[serde(default)]
    text_annotations: Vec<TextAnnotation>,
    #[serde(default)]
    error: Option<ProviderStatus>,
}

#[derive(Debug, Deserialize)]
struct FullText {
    text: String,
}

#[derive(Debug, Deserialize)]
struct TextAnnotation {
    description: String,
}

#[derive(Debug, Deserialize)]
struct ProviderStatus {
    #[serde(default)]
    message: String,
}

pub(crate) fn extract_text(parsed: AnnotateResponse) -> Result<String, OcrError> {
    let first = parsed.responses.into_iter().next().unwrap_or_default();
    if let Some(err) = first.error {
        return Err(OcrError::Provider(err.message));
    }

    let text = first
        .full_text_annotation
        .map(|f| f.text)
        .or_else(|| first.text_annotations.into_iter().next().map(|a| a.description))
        .unwrap_or_default();

    let text = text.trim();
    if text.is_empty() {
        return Err(OcrError::NoText);
    }
    Ok(text.to_string())
}
