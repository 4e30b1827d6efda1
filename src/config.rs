use crate::{
    error::{DuudlError, DuudlResult},
    normalize::DEFAULT_MODEL_INPUT_SIZE,
    recognize::RecognizerConfig,
    recognize_http::HttpClassifierConfig,
    score::DEFAULT_MATCH_THRESHOLD,
};

/// Default round length, in seconds.
pub const DEFAULT_ROUND_SECS: u64 = 20;

const DEFAULT_CLASSIFIER_URL: &str =
    "https://api-inference.huggingface.co/models/Xenova/quickdraw-mobilevit-small";

/// Tunables for one game, fixed at controller construction.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct GameSettings {
    /// Countdown length of the drawing phase.
    pub round_secs: u64,
    /// Minimum confidence a prediction must exceed to count as a match.
    pub match_threshold: f64,
    /// Edge of the square classifier input image.
    pub model_input_size: u32,
    /// Which classification backend answers `classify`.
    pub recognizer: RecognizerConfig,
}

impl Default for GameSettings {
    fn default() -> Self {
        Self {
            round_secs: DEFAULT_ROUND_SECS,
            match_threshold: DEFAULT_MATCH_THRESHOLD,
            model_input_size: DEFAULT_MODEL_INPUT_SIZE,
            recognizer: RecognizerConfig::HttpClassifier(HttpClassifierConfig::new(
                DEFAULT_CLASSIFIER_URL,
            )),
        }
    }
}

impl GameSettings {
    pub fn validate(&self) -> DuudlResult<()> {
        if self.round_secs == 0 {
            return Err(DuudlError::validation("round_secs must be > 0"));
        }
        if !(0.0..=1.0).contains(&self.match_threshold) {
            return Err(DuudlError::validation("match_threshold must be in [0, 1]"));
        }
        if self.model_input_size == 0 {
            return Err(DuudlError::validation("model_input_size must be > 0"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        GameSettings::default().validate().unwrap();
    }

    #[test]
    fn out_of_range_threshold_is_rejected() {
        let s = GameSettings {
            match_threshold: 1.5,
            ..GameSettings::default()
        };
        assert!(s.validate().is_err());
    }

    #[test]
    fn settings_round_trip_through_json() {
        let s = GameSettings::default();
        let json = serde_json::to_string(&s).unwrap();
        let back: GameSettings = serde_json::from_str(&json).unwrap();
        assert_eq!(back, s);
    }

    #[test]
    fn partial_json_fills_defaults() {
        let s: GameSettings = serde_json::from_str(r#"{"round_secs": 45}"#).unwrap();
        assert_eq!(s.round_secs, 45);
        assert_eq!(s.model_input_size, DEFAULT_MODEL_INPUT_SIZE);
    }
}
