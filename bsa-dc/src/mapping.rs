//! Archive label to id-prefix mapping

use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use crate::error::{CurationError, Result};

/// One `NAME=PREFIX` pair
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelPrefix {
    /// Folder name under the archive root, also written to the Label column
    pub label: String,
    /// Prefix of the standardized id, e.g. `Non_D`
    pub prefix: String,
}

impl LabelPrefix {
    pub fn new(label: impl Into<String>, prefix: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            prefix: prefix.into(),
        }
    }
}

impl FromStr for LabelPrefix {
    type Err = CurationError;

    fn from_str(s: &str) -> Result<Self> {
        let (label, prefix) = s.split_once('=').ok_or_else(|| {
            CurationError::InvalidMapping(format!("expected NAME=PREFIX, got {:?}", s))
        })?;

        let (label, prefix) = (label.trim(), prefix.trim());
        if label.is_empty() || prefix.is_empty() {
            return Err(CurationError::InvalidMapping(format!(
                "empty name or prefix in {:?}",
                s
            )));
        }
        if label.contains('/') {
            return Err(CurationError::InvalidMapping(format!(
                "label {:?} must be a single folder name",
                label
            )));
        }

        Ok(Self::new(label, prefix))
    }
}

impl fmt::Display for LabelPrefix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.label, self.prefix)
    }
}

/// Ordered label mapping
///
/// Labels are processed in this order regardless of archive layout, so the
/// output is reproducible across runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelMapping {
    entries: Vec<LabelPrefix>,
}

impl LabelMapping {
    /// Validate and build a mapping; rejects empty lists and duplicate labels or prefixes
    pub fn new(entries: Vec<LabelPrefix>) -> Result<Self> {
        if entries.is_empty() {
            return Err(CurationError::InvalidMapping(
                "at least one label is required".to_string(),
            ));
        }

        let mut labels = HashSet::new();
        let mut prefixes = HashSet::new();
        for entry in &entries {
            if !labels.insert(entry.label.as_str()) {
                return Err(CurationError::InvalidMapping(format!(
                    "duplicate label {:?}",
                    entry.label
                )));
            }
            if !prefixes.insert(entry.prefix.as_str()) {
                return Err(CurationError::InvalidMapping(format!(
                    "duplicate prefix {:?}",
                    entry.prefix
                )));
            }
        }

        Ok(Self { entries })
    }

    pub fn entries(&self) -> &[LabelPrefix] {
        &self.entries
    }
}

impl Default for LabelMapping {
    /// The four severity folders of the Alzheimer MRI dataset
    fn default() -> Self {
        Self {
            entries: vec![
                LabelPrefix::new("MildDemented", "Mild_D"),
                LabelPrefix::new("ModerateDemented", "Mod_D"),
                LabelPrefix::new("NonDemented", "Non_D"),
                LabelPrefix::new("VeryMildDemented", "VMild_D"),
            ],
        }
    }
}
