pub type DuudlResult<T> = Result<T, DuudlError>;

#[derive(thiserror::Error, Debug)]
pub enum DuudlError {
    /// A raster or normalized image violates the pipeline contract
    /// (zero area, wrong encoding, wrong dimensions).
    #[error("invalid image: {0}")]
    InvalidImage(String),

    /// The recognition backend has not finished initializing.
    #[error("recognizer not ready: {0}")]
    NotReady(String),

    /// Transport or auth failure talking to a recognition backend.
    #[error("backend unavailable: {0}")]
    BackendUnavailable(String),

    /// The backend replied, but the reply could not be parsed into
    /// a prediction set.
    #[error("malformed response: {0}")]
    MalformedResponse(String),

    /// A prediction set was empty where a non-empty one is required.
    #[error("no prediction: {0}")]
    NoPrediction(String),

    /// The word source failed; callers fall back to the static list.
    #[error("word fetch failed: {0}")]
    WordFetchFailed(String),

    #[error("validation error: {0}")]
    Validation(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl DuudlError {
    pub fn invalid_image(msg: impl Into<String>) -> Self {
        Self::InvalidImage(msg.into())
    }

    pub fn not_ready(msg: impl Into<String>) -> Self {
        Self::NotReady(msg.into())
    }

    pub fn backend_unavailable(msg: impl Into<String>) -> Self {
        Self::BackendUnavailable(msg.into())
    }

    pub fn malformed_response(msg: impl Into<String>) -> Self {
        Self::MalformedResponse(msg.into())
    }

    pub fn no_prediction(msg: impl Into<String>) -> Self {
        Self::NoPrediction(msg.into())
    }

    pub fn word_fetch_failed(msg: impl Into<String>) -> Self {
        Self::WordFetchFailed(msg.into())
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// True for failures the session can recover from with a user-driven
    /// retry (`check_drawing()` / `play_again()`), per the round contract.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::NotReady(_) | Self::BackendUnavailable(_) | Self::MalformedResponse(_)
        )
    }
}
