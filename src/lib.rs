//! Drawing capture & recognition pipeline for a casual sketch-guessing
//! game.
//!
//! A word prompt is shown, the player free-hand draws it within a time
//! limit, and a classification backend guesses what was drawn; a match
//! against the prompt decides the round. This crate is the core of that
//! loop: stroke capture into a DPR-correct raster, deterministic
//! normalization into the classifier's input contract, swappable
//! recognition backends, pure match scoring, and the round state machine
//! that composes them. UI, auth and persistence live elsewhere.

#![forbid(unsafe_code)]

pub mod composite;
pub mod config;
pub mod error;
pub mod geom;
pub mod normalize;
pub mod raster;
pub mod recognize;
pub mod recognize_http;
pub mod recognize_local;
pub mod recognize_vision;
pub mod score;
pub mod session;
pub mod surface;
pub mod words;

pub use composite::Rgba8;
pub use config::GameSettings;
pub use error::{DuudlError, DuudlResult};
pub use geom::{DisplayMetrics, Point};
pub use normalize::{NormalizedImage, Normalizer};
pub use raster::Raster;
pub use recognize::{Prediction, PredictionSet, Recognizer, RecognizerConfig, create_recognizer};
pub use recognize_http::{HttpClassifier, HttpClassifierConfig};
pub use recognize_local::{LocalRecognizer, SketchModel};
pub use recognize_vision::{VisionLlm, VisionLlmConfig};
pub use score::{DEFAULT_MATCH_THRESHOLD, MatchScorer, Verdict};
pub use session::{
    EvaluationTicket, Phase, RoundOutcome, Session, SessionController, SessionEvent, SessionId,
};
pub use surface::{Brush, Stroke, StrokeSurface};
pub use words::{Difficulty, StaticWordList, WordPrompt, WordSource};
