//! bsa-dc library - Dataset Curator
//!
//! Walks a zip archive of labelled brain scans, extracts the shared feature
//! vector from each image and writes one CSV row per readable scan.

pub mod curator;
pub mod error;
pub mod mapping;
pub mod output;

pub use curator::{
    curate_archive, curate_path, is_augmented, standardized_id, CurationReport, DatasetRow,
    SkippedEntry, DEFAULT_ROOT, MAX_ENTRY_BYTES,
};
pub use error::{CurationError, Result};
pub use mapping::{LabelMapping, LabelPrefix};
pub use output::{write_csv, write_csv_path, CSV_HEADER};
