//! Remote small-image classifier backend.
//!
//! Speaks the hosted-inference convention for image classification models:
//! POST the encoded image bytes, optionally with a bearer token, and get
//! back a JSON array of `{"label": ..., "score": ...}` entries ranked by
//! the backend.

use async_trait::async_trait;

use crate::{
    error::{DuudlError, DuudlResult},
    normalize::{DEFAULT_MODEL_INPUT_SIZE, NormalizedImage},
    recognize::{Prediction, PredictionSet, Recognizer},
};

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct HttpClassifierConfig {
    /// Full model endpoint URL.
    pub api_url: String,
    /// Bearer token; supplied out-of-band, never persisted by this crate.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_token: Option<String>,
    /// Image edge the endpoint expects.
    #[serde(default = "default_input_size")]
    pub input_size: u32,
}

fn default_input_size() -> u32 {
    DEFAULT_MODEL_INPUT_SIZE
}

impl HttpClassifierConfig {
    pub fn new(api_url: impl Into<String>) -> Self {
        Self {
            api_url: api_url.into(),
            api_token: None,
            input_size: DEFAULT_MODEL_INPUT_SIZE,
        }
    }

    pub fn with_api_token(mut self, token: impl Into<String>) -> Self {
        self.api_token = Some(token.into());
        self
    }

    pub fn with_input_size(mut self, size: u32) -> Self {
        self.input_size = size;
        self
    }
}

pub struct HttpClassifier {
    config: HttpClassifierConfig,
    client: reqwest::Client,
}

impl HttpClassifier {
    pub fn new(config: HttpClassifierConfig) -> Self {
        Self {
            config,
            client: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl Recognizer for HttpClassifier {
    fn name(&self) -> &str {
        "http-classifier"
    }

    #[tracing::instrument(skip(self, image), fields(url = %self.config.api_url))]
    async fn classify(&self, image: &NormalizedImage) -> DuudlResult<PredictionSet> {
        image.verify(self.config.input_size)?;

        let mut request = self
            .client
            .post(&self.config.api_url)
            .header(reqwest::header::CONTENT_TYPE, "application/octet-stream")
            .body(image.as_png().to_vec());
        if let Some(token) = &self.config.api_token {
            request = request.bearer_auth(token);
        }

        let response = request
            .send()
            .await
            .map_err(|e| DuudlError::backend_unavailable(format!("request failed: {e}")))?;

        let status = response.status();
        if status == reqwest::StatusCode::SERVICE_UNAVAILABLE {
            // Hosted models answer 503 while the model is still loading.
            return Err(DuudlError::not_ready("model is still loading"));
        }
        if !status.is_success() {
            return Err(DuudlError::backend_unavailable(format!(
                "classifier returned {status}"
            )));
        }

        let predictions: Vec<Prediction> = response
            .json()
            .await
            .map_err(|e| DuudlError::malformed_response(format!("bad prediction JSON: {e}")))?;

        PredictionSet::new(predictions)
            .map_err(|_| DuudlError::malformed_response("backend returned an empty ranking"))
    }
}
