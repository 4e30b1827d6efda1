//! Remote vision-language backend.
//!
//! Sends the normalized sketch as an inline base64 data URL in a
//! chat-completions request and treats the model's short free-text answer
//! as a single full-confidence prediction. Vision models return no
//! calibrated score, so threshold filtering effectively reduces to the
//! substring match for this backend.

use async_trait::async_trait;
use base64::Engine as _;

use crate::{
    error::{DuudlError, DuudlResult},
    normalize::{DEFAULT_MODEL_INPUT_SIZE, NormalizedImage},
    recognize::{Prediction, PredictionSet, Recognizer},
};

const DEFAULT_PROMPT: &str =
    "This is a quick freehand sketch. What does it depict? Answer with a short noun phrase only.";

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct VisionLlmConfig {
    /// Chat-completions endpoint URL.
    pub api_url: String,
    pub api_key: String,
    pub model: String,
    /// Question posed alongside the image.
    #[serde(default = "default_prompt")]
    pub prompt: String,
    #[serde(default = "default_input_size")]
    pub input_size: u32,
}

fn default_prompt() -> String {
    DEFAULT_PROMPT.to_string()
}

fn default_input_size() -> u32 {
    DEFAULT_MODEL_INPUT_SIZE
}

impl VisionLlmConfig {
    pub fn new(
        api_url: impl Into<String>,
        api_key: impl Into<String>,
        model: impl Into<String>,
    ) -> Self {
        Self {
            api_url: api_url.into(),
            api_key: api_key.into(),
            model: model.into(),
            prompt: DEFAULT_PROMPT.to_string(),
            input_size: DEFAULT_MODEL_INPUT_SIZE,
        }
    }

    pub fn with_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.prompt = prompt.into();
        self
    }
}

pub struct VisionLlm {
    config: VisionLlmConfig,
    client: reqwest::Client,
}

impl VisionLlm {
    pub fn new(config: VisionLlmConfig) -> Self {
        Self {
            config,
            client: reqwest::Client::new(),
        }
    }

    fn build_request_body(&self, image: &NormalizedImage) -> serde_json::Value {
        let data_url = format!(
            "data:image/png;base64,{}",
            base64::engine::general_purpose::STANDARD.encode(image.as_png())
        );
        serde_json::json!({
            "model": self.config.model,
            "temperature": 0,
            "max_tokens": 32,
            "messages": [{
                "role": "user",
                "content": [
                    { "type": "text", "text": self.config.prompt },
                    { "type": "image_url", "image_url": { "url": data_url } }
                ]
            }]
        })
    }
}

/// Pull the assistant's answer out of a chat-completions reply.
pub(crate) fn parse_reply(body: &serde_json::Value) -> DuudlResult<String> {
    let text = body
        .get("choices")
        .and_then(|c| c.get(0))
        .and_then(|c| c.pointer("/message/content"))
        .and_then(|c| c.as_str())
        .ok_or_else(|| {
            DuudlError::malformed_response("reply has no choices[0].message.content string")
        })?;
    let trimmed = text.trim().trim_end_matches('.');
    if trimmed.is_empty() {
        return Err(DuudlError::malformed_response("reply text is empty"));
    }
    Ok(trimmed.to_string())
}

#[async_trait]
impl Recognizer for VisionLlm {
    fn name(&self) -> &str {
        "vision-llm"
    }

    #[tracing::instrument(skip(self, image), fields(model = %self.config.model))]
    async fn classify(&self, image: &NormalizedImage) -> DuudlResult<PredictionSet> {
        image.verify(self.config.input_size)?;

        let response = self
            .client
            .post(&self.config.api_url)
            .bearer_auth(&self.config.api_key)
            .json(&self.build_request_body(image))
            .send()
            .await
            .map_err(|e| DuudlError::backend_unavailable(format!("request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(DuudlError::backend_unavailable(format!(
                "vision endpoint returned {status}"
            )));
        }

        let body: serde_json::Value = response
            .json()
            .await
            .map_err(|e| DuudlError::malformed_response(format!("bad reply JSON: {e}")))?;
        let label = parse_reply(&body)?;
        tracing::debug!(%label, "vision reply");

        PredictionSet::new(vec![Prediction::new(label, 1.0)])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_reply_extracts_and_trims_content() {
        let body = serde_json::json!({
            "choices": [{ "message": { "role": "assistant", "content": "  A race car.  " } }]
        });
        assert_eq!(parse_reply(&body).unwrap(), "A race car");
    }

    #[test]
    fn parse_reply_rejects_missing_content() {
        let body = serde_json::json!({ "choices": [] });
        assert!(matches!(
            parse_reply(&body),
            Err(DuudlError::MalformedResponse(_))
        ));
    }

    #[test]
    fn parse_reply_rejects_empty_text() {
        let body = serde_json::json!({
            "choices": [{ "message": { "content": "   " } }]
        });
        assert!(matches!(
            parse_reply(&body),
            Err(DuudlError::MalformedResponse(_))
        ));
    }
}
