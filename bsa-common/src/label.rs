//! Dementia severity labels

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

use crate::Error;

/// One of the four severity classes a scan is mapped to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Label {
    NonDemented,
    VeryMildDemented,
    MildDemented,
    ModerateDemented,
}

impl Label {
    /// All labels in declared order
    pub const ALL: [Label; 4] = [
        Label::NonDemented,
        Label::VeryMildDemented,
        Label::MildDemented,
        Label::ModerateDemented,
    ];

    /// Human-readable form used in API responses
    pub fn as_str(&self) -> &'static str {
        match self {
            Label::NonDemented => "Non Demented",
            Label::VeryMildDemented => "Very Mild Demented",
            Label::MildDemented => "Mild Demented",
            Label::ModerateDemented => "Moderate Demented",
        }
    }

    /// Compact form used for dataset folder names (e.g. "MildDemented")
    pub fn folder_name(&self) -> &'static str {
        match self {
            Label::NonDemented => "NonDemented",
            Label::VeryMildDemented => "VeryMildDemented",
            Label::MildDemented => "MildDemented",
            Label::ModerateDemented => "ModerateDemented",
        }
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Label {
    type Err = Error;

    /// Accepts both "Mild Demented" and "MildDemented"
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        Label::ALL
            .into_iter()
            .find(|label| label.as_str() == trimmed || label.folder_name() == trimmed)
            .ok_or_else(|| Error::UnknownLabel(s.to_string()))
    }
}

impl Serialize for Label {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Label {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}
