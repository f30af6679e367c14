//! Threshold-based fallback classifier
//!
//! Ordered cascade, first match wins:
//!
//! 1. bright scan (mean and center) with low entropy → Non Demented
//! 2. high entropy and high edge density → Moderate Demented
//! 3. raised entropy and edge density → Mild Demented
//! 4. entropy above the very-mild floor → Very Mild Demented
//! 5. otherwise → Non Demented
//!
//! All comparisons are strict. The thresholds are empirical, not derived.

use serde::{Deserialize, Serialize};

use crate::{FeatureVector, Label};

/// Rule 1: minimum mean intensity of a healthy-looking scan
pub const NON_DEMENTED_MIN_MEAN_INTENSITY: f64 = 70.0;
/// Rule 1: minimum center brightness of a healthy-looking scan
pub const NON_DEMENTED_MIN_CENTER_BRIGHTNESS: f64 = 100.0;
/// Rule 1: entropy must stay below this
pub const NON_DEMENTED_MAX_ENTROPY: f64 = 5.3;
/// Rule 2: entropy floor for Moderate Demented
pub const MODERATE_MIN_ENTROPY: f64 = 5.3;
/// Rule 2: edge density floor for Moderate Demented
pub const MODERATE_MIN_EDGE_DENSITY: f64 = 0.05;
/// Rule 3: entropy floor for Mild Demented
pub const MILD_MIN_ENTROPY: f64 = 4.8;
/// Rule 3: edge density floor for Mild Demented
pub const MILD_MIN_EDGE_DENSITY: f64 = 0.045;
/// Rule 4: entropy floor for Very Mild Demented
pub const VERY_MILD_MIN_ENTROPY: f64 = 4.0;

/// Tunable thresholds of the fallback cascade
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FallbackThresholds {
    pub non_demented_min_mean_intensity: f64,
    pub non_demented_min_center_brightness: f64,
    pub non_demented_max_entropy: f64,
    pub moderate_min_entropy: f64,
    pub moderate_min_edge_density: f64,
    pub mild_min_entropy: f64,
    pub mild_min_edge_density: f64,
    pub very_mild_min_entropy: f64,
}

impl Default for FallbackThresholds {
    fn default() -> Self {
        Self {
            non_demented_min_mean_intensity: NON_DEMENTED_MIN_MEAN_INTENSITY,
            non_demented_min_center_brightness: NON_DEMENTED_MIN_CENTER_BRIGHTNESS,
            non_demented_max_entropy: NON_DEMENTED_MAX_ENTROPY,
            moderate_min_entropy: MODERATE_MIN_ENTROPY,
            moderate_min_edge_density: MODERATE_MIN_EDGE_DENSITY,
            mild_min_entropy: MILD_MIN_ENTROPY,
            mild_min_edge_density: MILD_MIN_EDGE_DENSITY,
            very_mild_min_entropy: VERY_MILD_MIN_ENTROPY,
        }
    }
}

/// Rule-based classifier used when no trained model is loaded
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FallbackClassifier {
    thresholds: FallbackThresholds,
}

impl FallbackClassifier {
    pub fn new(thresholds: FallbackThresholds) -> Self {
        Self { thresholds }
    }

    pub fn thresholds(&self) -> &FallbackThresholds {
        &self.thresholds
    }

    /// Map a feature vector to a label. Total: never fails.
    pub fn classify(&self, features: &FeatureVector) -> Label {
        let t = &self.thresholds;

        if features.mean_pixel_intensity > t.non_demented_min_mean_intensity
            && features.center_brightness > t.non_demented_min_center_brightness
            && features.entropy < t.non_demented_max_entropy
        {
            Label::NonDemented
        } else if features.entropy > t.moderate_min_entropy
            && features.edge_density > t.moderate_min_edge_density
        {
            Label::ModerateDemented
        } else if features.entropy > t.mild_min_entropy
            && features.edge_density > t.mild_min_edge_density
        {
            Label::MildDemented
        } else if features.entropy > t.very_mild_min_entropy {
            Label::VeryMildDemented
        } else {
            Label::NonDemented
        }
    }
}

/// Classify with the default thresholds
pub fn classify_fallback(features: &FeatureVector) -> Label {
    FallbackClassifier::default().classify(features)
}
