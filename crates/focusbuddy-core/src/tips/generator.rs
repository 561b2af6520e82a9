//! Hosted text-generation client.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;

use crate::error::{CoreError, Result};

/// Anything that can produce a raw tip sentence.
#[async_trait]
pub trait TipGenerator: Send + Sync {
    async fn generate(&self) -> Result<String>;
}

pub const DEFAULT_BASE_URL: &str = "https://api-inference.huggingface.co";
pub const DEFAULT_MODEL: &str = "gpt2";
pub const TIP_PROMPT: &str =
    "Write a short, encouraging message for someone with ADHD who is trying to focus:";

const SERVICE: &str = "huggingface";

/// Hugging Face inference API.
pub struct HuggingFaceGenerator {
    client: Client,
    base_url: String,
    model: String,
    api_key: String,
}

#[derive(Debug, Deserialize)]
struct GeneratedText {
    #[serde(default)]
    generated_text: String,
}

impl HuggingFaceGenerator {
    pub fn new(
        api_key: impl Into<String>,
        base_url: impl Into<String>,
        model: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| upstream(e.to_string()))?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            model: model.into(),
            api_key: api_key.into(),
        })
    }

    fn endpoint(&self) -> String {
        format!("{}/models/{}", self.base_url, self.model)
    }
}

#[async_trait]
impl TipGenerator for HuggingFaceGenerator {
    async fn generate(&self) -> Result<String> {
        let body = json!({
            "inputs": TIP_PROMPT,
            "parameters": {
                "max_length": 100,
                "temperature": 0.8,
                "do_sample": true,
            }
        });

        let resp = self
            .client
            .post(self.endpoint())
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| upstream(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(upstream(format!("API request failed: {status}")));
        }

        let generated: Vec<GeneratedText> =
            resp.json().await.map_err(|e| upstream(e.to_string()))?;
        let raw = generated
            .into_iter()
            .next()
            .map(|g| g.generated_text)
            .unwrap_or_default();
        Ok(clean_generated_text(&raw))
    }
}

fn upstream(message: String) -> CoreError {
    CoreError::Upstream {
        service: SERVICE.to_string(),
        message,
    }
}

/// Strip the echoed prompt, keep the first line, and drop anything other
/// than ASCII word characters, whitespace and `.,!?-`.
pub fn clean_generated_text(raw: &str) -> String {
    let without_prompt = raw.replacen(TIP_PROMPT, "", 1);
    let first_line = without_prompt.trim().lines().next().unwrap_or("");
    first_line
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '_' || c.is_whitespace() || ".,!?-".contains(*c))
        .collect::<String>()
        .trim()
        .to_string()
}
