//! In-process model backend.
//!
//! Model loading (download, weight initialization) can be slow, so the
//! recognizer starts cold and is warmed up asynchronously; `classify`
//! before warm-up completes fails with `NotReady`, which callers surface
//! distinctly from a classification failure.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::{
    error::{DuudlError, DuudlResult},
    normalize::NormalizedImage,
    recognize::{PredictionSet, Recognizer},
};

/// An on-device sketch classification model.
///
/// Implementations receive the normalized image and return a ranked label
/// list; inference is synchronous (models run on the calling thread).
pub trait SketchModel: Send + Sync {
    fn predict(&self, image: &NormalizedImage) -> DuudlResult<Vec<crate::recognize::Prediction>>;
}

/// Recognizer over an in-process [`SketchModel`].
///
/// Clones share the same model slot, so the embedding can keep one clone
/// to drive [`warm_up`](Self::warm_up) while another serves `classify`.
#[derive(Clone, Default)]
pub struct LocalRecognizer {
    slot: Arc<RwLock<Option<Box<dyn SketchModel>>>>,
}

impl LocalRecognizer {
    /// A cold recognizer; `classify` fails `NotReady` until warmed up.
    pub fn new() -> Self {
        Self::default()
    }

    /// A recognizer that is ready immediately (tests, pre-loaded models).
    pub fn with_model(model: Box<dyn SketchModel>) -> Self {
        Self {
            slot: Arc::new(RwLock::new(Some(model))),
        }
    }

    pub async fn is_ready(&self) -> bool {
        self.slot.read().await.is_some()
    }

    /// Run the (possibly slow) loader and install the model it produces.
    pub async fn warm_up<F>(&self, loader: F) -> DuudlResult<()>
    where
        F: Future<Output = DuudlResult<Box<dyn SketchModel>>> + Send,
    {
        let model = loader.await?;
        *self.slot.write().await = Some(model);
        tracing::debug!("local model warmed up");
        Ok(())
    }
}

#[async_trait]
impl Recognizer for LocalRecognizer {
    fn name(&self) -> &str {
        "local-model"
    }

    async fn classify(&self, image: &NormalizedImage) -> DuudlResult<PredictionSet> {
        let guard = self.slot.read().await;
        let model = guard
            .as_ref()
            .ok_or_else(|| DuudlError::not_ready("local model has not finished loading"))?;
        PredictionSet::new(model.predict(image)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        composite::WHITE, normalize::Normalizer, raster::Raster, recognize::Prediction,
    };

    struct FixedModel;
    impl SketchModel for FixedModel {
        fn predict(&self, _image: &NormalizedImage) -> DuudlResult<Vec<Prediction>> {
            Ok(vec![Prediction::new("cat", 0.9)])
        }
    }

    fn image() -> NormalizedImage {
        Normalizer::new(32)
            .unwrap()
            .normalize(&Raster::filled(32, 32, WHITE))
            .unwrap()
    }

    #[tokio::test]
    async fn cold_recognizer_is_not_ready() {
        let r = LocalRecognizer::new();
        assert!(!r.is_ready().await);
        assert!(matches!(
            r.classify(&image()).await,
            Err(DuudlError::NotReady(_))
        ));
    }

    #[tokio::test]
    async fn warm_up_installs_the_model_for_all_clones() {
        let r = LocalRecognizer::new();
        let serving = r.clone();
        r.warm_up(async { Ok(Box::new(FixedModel) as Box<dyn SketchModel>) })
            .await
            .unwrap();
        let set = serving.classify(&image()).await.unwrap();
        assert_eq!(set.top().label, "cat");
    }

    #[tokio::test]
    async fn failed_warm_up_leaves_recognizer_cold() {
        let r = LocalRecognizer::new();
        let res = r
            .warm_up(async { Err(DuudlError::backend_unavailable("download failed")) })
            .await;
        assert!(res.is_err());
        assert!(!r.is_ready().await);
    }
}
