use async_trait::async_trait;

use crate::{
    error::{DuudlError, DuudlResult},
    normalize::NormalizedImage,
    recognize_http::{HttpClassifier, HttpClassifierConfig},
    recognize_local::LocalRecognizer,
    recognize_vision::{VisionLlm, VisionLlmConfig},
};

/// One ranked label from a classification backend.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Prediction {
    pub label: String,
    /// Confidence in `[0, 1]`.
    pub score: f64,
}

impl Prediction {
    pub fn new(label: impl Into<String>, score: f64) -> Self {
        Self {
            label: label.into(),
            score,
        }
    }
}

/// Non-empty, descending-by-score ranking of predictions.
///
/// Construction enforces both invariants: an empty input fails with
/// `NoPrediction`, and an out-of-order input is stably sorted so backend
/// order is preserved among equal scores (already-ordered input is kept
/// exactly as delivered).
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct PredictionSet(Vec<Prediction>);

impl PredictionSet {
    pub fn new(mut predictions: Vec<Prediction>) -> DuudlResult<Self> {
        if predictions.is_empty() {
            return Err(DuudlError::no_prediction("backend returned zero labels"));
        }
        let ordered = predictions
            .windows(2)
            .all(|pair| pair[0].score >= pair[1].score);
        if !ordered {
            predictions.sort_by(|a, b| {
                b.score
                    .partial_cmp(&a.score)
                    .unwrap_or(std::cmp::Ordering::Equal)
            });
        }
        Ok(Self(predictions))
    }

    /// Highest-ranked prediction. Always present.
    pub fn top(&self) -> &Prediction {
        &self.0[0]
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Prediction> {
        self.0.iter()
    }

    pub fn as_slice(&self) -> &[Prediction] {
        &self.0
    }
}

/// Capability contract over interchangeable classification backends.
///
/// One `classify` call issues exactly one outbound request; retries, if
/// any, belong to the caller.
#[async_trait]
pub trait Recognizer: Send + Sync {
    /// Short backend name for logs and diagnostics.
    fn name(&self) -> &str;

    async fn classify(&self, image: &NormalizedImage) -> DuudlResult<PredictionSet>;
}

/// Construction-time backend selection. Which backend answers `classify`
/// is decided here, never at call time.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "backend", rename_all = "snake_case")]
pub enum RecognizerConfig {
    /// Remote small-image classifier (ranked label/score JSON reply).
    HttpClassifier(HttpClassifierConfig),
    /// Remote vision-language endpoint (free-text reply).
    VisionLlm(VisionLlmConfig),
    /// In-process model; starts cold and must be warmed up before use.
    Local,
}

pub fn create_recognizer(config: &RecognizerConfig) -> Box<dyn Recognizer> {
    match config {
        RecognizerConfig::HttpClassifier(cfg) => Box::new(HttpClassifier::new(cfg.clone())),
        RecognizerConfig::VisionLlm(cfg) => Box::new(VisionLlm::new(cfg.clone())),
        RecognizerConfig::Local => Box::new(LocalRecognizer::new()),
    }
}
