//! # BSA Common Library
//!
//! Shared code for the Brain Scan Analysis service and tools:
//! - Feature extraction from grayscale scans
//! - Severity labels and the threshold-based fallback classifier
//! - Trained model contract and bundled artifact format
//! - Load-time choice between model and fallback classification
//! - Configuration loading

pub mod config;
pub mod decision;
pub mod error;
pub mod fallback;
pub mod features;
pub mod label;
pub mod model;

pub use decision::{ClassificationDecision, ClassificationMode};
pub use error::{Error, Result};
pub use fallback::{classify_fallback, FallbackClassifier, FallbackThresholds};
pub use features::{extract, FeatureVector, FEATURE_NAMES};
pub use label::Label;
pub use model::{Estimator, LabelDecoder, ModelClassifier};
