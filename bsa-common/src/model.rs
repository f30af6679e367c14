//! Trained model contract and bundled artifact format
//!
//! The classifier is opaque to the rest of the system: it is reached only
//! through [`Estimator::predict`] (feature row → encoded class id) and
//! [`LabelDecoder::decode`] (class id → label).
//!
//! Artifacts are two bincode blobs produced by an external training job and
//! read from fixed filenames inside the model directory:
//! - `dementia_model.bin` - [`LinearEstimator`]
//! - `label_encoder.bin` - [`LabelEncoder`]

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

use crate::{Error, FeatureVector, Label, Result, FEATURE_NAMES};

/// Estimator artifact filename
pub const ESTIMATOR_FILENAME: &str = "dementia_model.bin";

/// Label encoder artifact filename
pub const LABEL_ENCODER_FILENAME: &str = "label_encoder.bin";

/// Maps a feature row to an encoded class id
pub trait Estimator: Send + Sync {
    fn predict(&self, row: &FeatureVector) -> Result<usize>;
}

/// Maps an encoded class id back to a label
pub trait LabelDecoder: Send + Sync {
    fn decode(&self, id: usize) -> Result<Label>;
}

/// Multiclass linear model: arg-max of `W * standardize(x) + b`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinearEstimator {
    /// Column names the model was fitted on, in input order
    pub feature_names: Vec<String>,
    /// Per-feature mean subtracted before scoring
    pub feature_means: Option<Vec<f64>>,
    /// Per-feature divisor applied after mean subtraction
    pub feature_scales: Option<Vec<f64>>,
    /// One coefficient row per class
    pub coefficients: Vec<Vec<f64>>,
    /// One intercept per class
    pub intercepts: Vec<f64>,
}

impl LinearEstimator {
    /// Number of classes this estimator predicts
    pub fn n_classes(&self) -> usize {
        self.intercepts.len()
    }

    /// Check shapes and column names against `FEATURE_NAMES`
    pub fn validate(&self) -> std::result::Result<(), String> {
        if self.feature_names.len() != FEATURE_NAMES.len()
            || self.feature_names.iter().zip(FEATURE_NAMES).any(|(a, b)| a != b)
        {
            return Err(format!(
                "feature columns {:?} do not match {:?}",
                self.feature_names, FEATURE_NAMES
            ));
        }

        if self.coefficients.len() < 2 || self.coefficients.len() != self.intercepts.len() {
            return Err(format!(
                "expected at least 2 classes with one intercept each, got {} rows and {} intercepts",
                self.coefficients.len(),
                self.intercepts.len()
            ));
        }

        if let Some(row) = self.coefficients.iter().find(|row| row.len() != FEATURE_NAMES.len()) {
            return Err(format!(
                "coefficient row has {} values, expected {}",
                row.len(),
                FEATURE_NAMES.len()
            ));
        }

        match (&self.feature_means, &self.feature_scales) {
            (None, None) => {}
            (Some(means), Some(scales)) => {
                if means.len() != FEATURE_NAMES.len() || scales.len() != FEATURE_NAMES.len() {
                    return Err("standardization vectors must have one value per feature".to_string());
                }
                if scales.iter().any(|&s| s == 0.0 || !s.is_finite()) {
                    return Err("standardization scales must be finite and non-zero".to_string());
                }
            }
            _ => return Err("feature_means and feature_scales must be given together".to_string()),
        }

        Ok(())
    }

    /// Write as a bincode artifact
    pub fn save(&self, path: &Path) -> Result<()> {
        write_artifact(self, path)
    }

    fn standardize(&self, mut x: [f64; 5]) -> [f64; 5] {
        if let (Some(means), Some(scales)) = (&self.feature_means, &self.feature_scales) {
            for (i, value) in x.iter_mut().enumerate() {
                *value = (*value - means[i]) / scales[i];
            }
        }
        x
    }
}

impl Estimator for LinearEstimator {
    fn predict(&self, row: &FeatureVector) -> Result<usize> {
        let x = self.standardize(row.to_array());

        let mut best: Option<(usize, f64)> = None;
        for (class, (weights, intercept)) in
            self.coefficients.iter().zip(&self.intercepts).enumerate()
        {
            let score = weights.iter().zip(x).map(|(w, v)| w * v).sum::<f64>() + intercept;
            if !score.is_finite() {
                return Err(Error::Inference(format!(
                    "non-finite score for class {} (features {:?})",
                    class,
                    row.to_array()
                )));
            }
            // Ties keep the lowest class id
            if best.map_or(true, |(_, top)| score > top) {
                best = Some((class, score));
            }
        }

        best.map(|(class, _)| class)
            .ok_or_else(|| Error::Inference("estimator has no classes".to_string()))
    }
}

/// Ordered class names; the encoded id is the index
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelEncoder {
    pub classes: Vec<String>,
}

impl LabelEncoder {
    pub fn new(labels: &[Label]) -> Self {
        Self {
            classes: labels.iter().map(|l| l.as_str().to_string()).collect(),
        }
    }

    pub fn validate(&self) -> std::result::Result<(), String> {
        if self.classes.is_empty() {
            return Err("label encoder has no classes".to_string());
        }
        for class in &self.classes {
            class.parse::<Label>().map_err(|e| e.to_string())?;
        }
        Ok(())
    }

    /// Write as a bincode artifact
    pub fn save(&self, path: &Path) -> Result<()> {
        write_artifact(self, path)
    }
}

impl LabelDecoder for LabelEncoder {
    fn decode(&self, id: usize) -> Result<Label> {
        let class = self.classes.get(id).ok_or_else(|| {
            Error::Inference(format!(
                "class id {} out of range for {} classes",
                id,
                self.classes.len()
            ))
        })?;
        // A bad class name surfaces at request time as an inference failure
        class
            .parse()
            .map_err(|e: Error| Error::Inference(format!("class id {}: {}", id, e)))
    }
}

/// Trained estimator plus label decoder
pub struct ModelClassifier {
    estimator: Box<dyn Estimator>,
    decoder: Box<dyn LabelDecoder>,
}

impl ModelClassifier {
    pub fn new(
        estimator: impl Estimator + 'static,
        decoder: impl LabelDecoder + 'static,
    ) -> Self {
        Self {
            estimator: Box::new(estimator),
            decoder: Box::new(decoder),
        }
    }

    /// Load both artifacts from `model_dir`
    ///
    /// Any read, parse or consistency failure is reported as
    /// `Error::MissingModelArtifact`; both artifacts must load.
    pub fn load(model_dir: &Path) -> Result<Self> {
        let estimator_path = model_dir.join(ESTIMATOR_FILENAME);
        let encoder_path = model_dir.join(LABEL_ENCODER_FILENAME);

        let estimator: LinearEstimator = read_artifact(&estimator_path)?;
        estimator
            .validate()
            .map_err(|reason| missing(&estimator_path, reason))?;

        let encoder: LabelEncoder = read_artifact(&encoder_path)?;
        encoder
            .validate()
            .map_err(|reason| missing(&encoder_path, reason))?;

        if encoder.classes.len() != estimator.n_classes() {
            return Err(missing(
                &encoder_path,
                format!(
                    "encoder has {} classes but estimator predicts {}",
                    encoder.classes.len(),
                    estimator.n_classes()
                ),
            ));
        }

        Ok(Self::new(estimator, encoder))
    }

    /// Predict and decode. Errors are `Error::Inference`.
    pub fn classify(&self, features: &FeatureVector) -> Result<Label> {
        let id = self.estimator.predict(features)?;
        self.decoder.decode(id)
    }
}

impl fmt::Debug for ModelClassifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModelClassifier").finish_non_exhaustive()
    }
}

fn missing(path: &Path, reason: impl Into<String>) -> Error {
    Error::MissingModelArtifact {
        path: path.to_path_buf(),
        reason: reason.into(),
    }
}

fn read_artifact<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let bytes = std::fs::read(path).map_err(|e| missing(path, e.to_string()))?;
    bincode::deserialize(&bytes).map_err(|e| missing(path, e.to_string()))
}

fn write_artifact<T: Serialize>(value: &T, path: &Path) -> Result<()> {
    let bytes = bincode::serialize(value)
        .map_err(|e| Error::Io(std::io::Error::new(std::io::ErrorKind::InvalidData, e)))?;
    std::fs::write(path, bytes)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    /// Class 0 when entropy dominates, class 1 when edge density does
    fn two_class_estimator() -> LinearEstimator {
        LinearEstimator {
            feature_names: FEATURE_NAMES.iter().map(|s| s.to_string()).collect(),
            feature_means: None,
            feature_scales: None,
            coefficients: vec![
                vec![0.0, 0.0, 1.0, 0.0, 0.0],
                vec![0.0, 0.0, 0.0, 100.0, 0.0],
            ],
            intercepts: vec![0.0, 0.0],
        }
    }

    fn features(entropy: f64, edge_density: f64) -> FeatureVector {
        FeatureVector {
            mean_pixel_intensity: 80.0,
            std_pixel_intensity: 40.0,
            entropy,
            edge_density,
            center_brightness: 120.0,
        }
    }

    #[test]
    fn test_linear_predict_argmax() {
        let estimator = two_class_estimator();
        assert_eq!(estimator.predict(&features(5.0, 0.01)).unwrap(), 0);
        assert_eq!(estimator.predict(&features(5.0, 0.2)).unwrap(), 1);
    }

    #[test]
    fn test_standardization_is_applied() {
        let mut estimator = two_class_estimator();
        // Entropy centred on 5.0: at 4.0 it scores -1 and loses to class 1
        estimator.feature_means = Some(vec![0.0, 0.0, 5.0, 0.0, 0.0]);
        estimator.feature_scales = Some(vec![1.0; 5]);

        assert_eq!(estimator.predict(&features(4.0, 0.0)).unwrap(), 1);
        assert_eq!(estimator.predict(&features(6.0, 0.0)).unwrap(), 0);
    }

    #[test]
    fn test_non_finite_features_are_inference_errors() {
        let estimator = two_class_estimator();
        let result = estimator.predict(&features(f64::NAN, 0.0));
        assert!(matches!(result, Err(Error::Inference(_))));
    }

    #[test]
    fn test_decode_out_of_range() {
        let encoder = LabelEncoder::new(&[Label::NonDemented, Label::MildDemented]);
        assert_eq!(encoder.decode(1).unwrap(), Label::MildDemented);
        assert!(matches!(encoder.decode(2), Err(Error::Inference(_))));
    }

    #[test]
    fn test_unknown_class_name() {
        let encoder = LabelEncoder {
            classes: vec!["Non Demented".to_string(), "Severely Demented".to_string()],
        };
        assert!(encoder.validate().unwrap_err().contains("Severely Demented"));
        assert!(matches!(encoder.decode(1), Err(Error::Inference(_))));
    }

    #[test]
    fn test_validate_rejects_reordered_columns() {
        let mut estimator = two_class_estimator();
        estimator.feature_names.swap(0, 1);
        assert!(estimator.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_bad_shapes() {
        let mut estimator = two_class_estimator();
        estimator.intercepts.push(0.0);
        assert!(estimator.validate().is_err());

        let mut estimator = two_class_estimator();
        estimator.coefficients[1].pop();
        assert!(estimator.validate().is_err());

        let mut estimator = two_class_estimator();
        estimator.feature_means = Some(vec![0.0; 5]);
        assert!(estimator.validate().is_err());

        let mut estimator = two_class_estimator();
        estimator.feature_means = Some(vec![0.0; 5]);
        estimator.feature_scales = Some(vec![1.0, 1.0, 0.0, 1.0, 1.0]);
        assert!(estimator.validate().is_err());
    }

    #[test]
    fn test_load_saved_artifacts() {
        let dir = TempDir::new().unwrap();
        two_class_estimator()
            .save(&dir.path().join(ESTIMATOR_FILENAME))
            .unwrap();
        LabelEncoder::new(&[Label::VeryMildDemented, Label::ModerateDemented])
            .save(&dir.path().join(LABEL_ENCODER_FILENAME))
            .unwrap();

        let model = ModelClassifier::load(dir.path()).unwrap();
        assert_eq!(model.classify(&features(5.0, 0.01)).unwrap(), Label::VeryMildDemented);
        assert_eq!(model.classify(&features(5.0, 0.2)).unwrap(), Label::ModerateDemented);
    }

    #[test]
    fn test_load_requires_both_artifacts() {
        let dir = TempDir::new().unwrap();
        two_class_estimator()
            .save(&dir.path().join(ESTIMATOR_FILENAME))
            .unwrap();

        match ModelClassifier::load(dir.path()) {
            Err(Error::MissingModelArtifact { path, .. }) => {
                assert!(path.ends_with(LABEL_ENCODER_FILENAME));
            }
            other => panic!("expected MissingModelArtifact, got {:?}", other),
        }
    }

    #[test]
    fn test_load_rejects_corrupt_artifact() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join(ESTIMATOR_FILENAME), b"\x01\x02").unwrap();
        LabelEncoder::new(&Label::ALL)
            .save(&dir.path().join(LABEL_ENCODER_FILENAME))
            .unwrap();

        assert!(matches!(
            ModelClassifier::load(dir.path()),
            Err(Error::MissingModelArtifact { .. })
        ));
    }

    #[test]
    fn test_load_rejects_class_count_mismatch() {
        let dir = TempDir::new().unwrap();
        two_class_estimator()
            .save(&dir.path().join(ESTIMATOR_FILENAME))
            .unwrap();
        LabelEncoder::new(&Label::ALL)
            .save(&dir.path().join(LABEL_ENCODER_FILENAME))
            .unwrap();

        assert!(matches!(
            ModelClassifier::load(dir.path()),
            Err(Error::MissingModelArtifact { .. })
        ));
    }
}
