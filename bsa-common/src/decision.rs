//! Load-time choice between the trained model and the fallback rules
//!
//! The choice is made exactly once, when the decision is resolved, and never
//! revisited. A prediction error while the model is active is returned to the
//! caller; it does not fall back to the rules.

use serde::Serialize;
use std::fmt;
use std::path::Path;
use tracing::{info, warn};

use crate::{
    features, FallbackClassifier, FallbackThresholds, FeatureVector, Label, ModelClassifier,
    Result,
};

/// Which classifier serves requests for the lifetime of the process
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ClassificationMode {
    ModelAvailable,
    FallbackOnly,
}

impl fmt::Display for ClassificationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClassificationMode::ModelAvailable => f.write_str("model"),
            ClassificationMode::FallbackOnly => f.write_str("fallback"),
        }
    }
}

#[derive(Debug)]
enum Route {
    Model(ModelClassifier),
    Fallback(FallbackClassifier),
}

/// Immutable classification policy shared by all requests
#[derive(Debug)]
pub struct ClassificationDecision {
    route: Route,
}

impl ClassificationDecision {
    /// Try to load model artifacts from `model_dir`, otherwise use the rules
    ///
    /// A missing or unusable artifact is logged once and never surfaced.
    pub fn resolve(model_dir: &Path, thresholds: FallbackThresholds) -> Self {
        match ModelClassifier::load(model_dir) {
            Ok(model) => {
                info!("Trained model loaded from {}", model_dir.display());
                Self::with_model(model)
            }
            Err(e) => {
                warn!("{}; using rule-based fallback classifier", e);
                Self::fallback_only(FallbackClassifier::new(thresholds))
            }
        }
    }

    pub fn with_model(model: ModelClassifier) -> Self {
        Self {
            route: Route::Model(model),
        }
    }

    pub fn fallback_only(fallback: FallbackClassifier) -> Self {
        Self {
            route: Route::Fallback(fallback),
        }
    }

    pub fn mode(&self) -> ClassificationMode {
        match self.route {
            Route::Model(_) => ClassificationMode::ModelAvailable,
            Route::Fallback(_) => ClassificationMode::FallbackOnly,
        }
    }

    /// Classify a feature vector with the selected classifier
    pub fn classify(&self, features: &FeatureVector) -> Result<Label> {
        match &self.route {
            Route::Model(model) => model.classify(features),
            Route::Fallback(fallback) => Ok(fallback.classify(features)),
        }
    }

    /// Extract features from image bytes, then classify
    pub fn classify_image(&self, image_bytes: &[u8]) -> Result<Label> {
        let features = features::extract(image_bytes)?;
        let label = self.classify(&features)?;
        tracing::debug!("Classified scan as {} ({} mode)", label, self.mode());
        Ok(label)
    }
}

impl Default for ClassificationDecision {
    fn default() -> Self {
        Self::fallback_only(FallbackClassifier::default())
    }
}
