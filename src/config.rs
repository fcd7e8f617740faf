use anyhow::{Context, Result};

use crate::ocr::vision::DEFAULT_ENDPOINT;

pub const ENV_API_KEY: &str = "READ_TO_ME_OCR_API_KEY";
pub const ENV_ENDPOINT: &str = "READ_TO_ME_OCR_ENDPOINT";
pub const ENV_BATCH_SIZE: &str = "READ_TO_ME_OCR_BATCH_SIZE";
pub const ENV_TIMEOUT: &str = "READ_TO_ME_OCR_TIMEOUT_S";

pub const DEFAULT_BATCH_SIZE: usize = 5;
pub const DEFAULT_TIMEOUT_S: u64 = 30;

/// OCR provider settings, read from the environment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OcrConfig {
    pub api_key: String,
    pub endpoint: String,
    pub batch_size: usize,
    pub timeout_s: u64,
}

impl OcrConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let api_key = lookup(ENV_API_KEY)
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| anyhow::anyhow!("{} is not set", ENV_API_KEY))?;

        let endpoint = lookup(ENV_ENDPOINT).unwrap_or_else(|| DEFAULT_ENDPOINT.to_string());

        let batch_size = match lookup(ENV_BATCH_SIZE) {
            Some(v) => v.trim().parse::<usize>()
                .with_context(|| format!("Invalid {}: '{}'", ENV_BATCH_SIZE, v))?
                .max(1),
            None => DEFAULT_BATCH_SIZE,
        };

        let timeout_s = match lookup(ENV_TIMEOUT) {
            Some(v) => v.trim().parse::<u64>()
                .with_context(|| format!("Invalid {}: '{}'", ENV_TIMEOUT, v))?,
            None => DEFAULT_TIMEOUT_S,
        };

        Ok(Self {
            api_key,
            endpoint,
            batch_size,
            timeout_s,
        })
    }
}
