//! Archive curation: one feature row per readable scan
//!
//! Labels are walked in mapping order, entries within a label in the
//! archive's central-directory order. Each label keeps its own counter,
//! advanced only when a row is produced, so ids within a label never gap or
//! repeat even when files are skipped.

use std::fs::File;
use std::io::{Read, Seek};
use std::path::Path;

use bsa_common::{extract, FeatureVector};
use tracing::{debug, info, warn};
use zip::ZipArchive;

use crate::error::{CurationError, Result};
use crate::mapping::LabelMapping;

/// Archive root used by the Alzheimer MRI dataset
pub const DEFAULT_ROOT: &str = "combined_images";

/// Accepted entry extensions (matched case-insensitively)
pub const IMAGE_EXTENSIONS: [&str; 3] = [".png", ".jpg", ".jpeg"];

/// Largest entry read into memory; scans are a few hundred KiB
pub const MAX_ENTRY_BYTES: u64 = 64 * 1024 * 1024;

/// One curated row
#[derive(Debug, Clone, PartialEq)]
pub struct DatasetRow {
    /// Synthesized id, e.g. `Non_D_00001`
    pub standardized_id: String,
    /// Archive folder name
    pub label: String,
    pub features: FeatureVector,
    pub is_augmented: bool,
}

/// Entry that produced no row
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedEntry {
    pub entry_name: String,
    pub reason: String,
}

/// Result of one curation run
#[derive(Debug, Default)]
pub struct CurationReport {
    /// Label-major, then archive order
    pub rows: Vec<DatasetRow>,
    pub skipped: Vec<SkippedEntry>,
}

/// `{prefix}_{count:05}`
pub fn standardized_id(prefix: &str, count: u32) -> String {
    format!("{}_{:05}", prefix, count)
}

/// Augmented copies carry `aug` somewhere in their path
pub fn is_augmented(entry_name: &str) -> bool {
    entry_name.to_lowercase().contains("aug")
}

fn is_image_entry(entry_name: &str) -> bool {
    let lower = entry_name.to_lowercase();
    IMAGE_EXTENSIONS.iter().any(|ext| lower.ends_with(ext))
}

/// Open `path` and curate it
pub fn curate_path(path: &Path, root: &str, mapping: &LabelMapping) -> Result<CurationReport> {
    let file = File::open(path)
        .map_err(|e| CurationError::ArchiveOpen(path.to_path_buf(), e.to_string()))?;
    let mut archive = ZipArchive::new(file)
        .map_err(|e| CurationError::ArchiveOpen(path.to_path_buf(), e.to_string()))?;

    curate_archive(&mut archive, root, mapping)
}

/// Curate an open archive
///
/// Only a failure to list the archive is fatal. Unreadable or undecodable
/// entries are logged and recorded in `CurationReport::skipped`.
pub fn curate_archive<R: Read + Seek>(
    archive: &mut ZipArchive<R>,
    root: &str,
    mapping: &LabelMapping,
) -> Result<CurationReport> {
    let root = root.trim_end_matches('/');

    // Central-directory order
    let mut names = Vec::with_capacity(archive.len());
    for index in 0..archive.len() {
        let entry = archive.by_index(index)?;
        if !entry.is_dir() {
            names.push((index, entry.name().to_string()));
        }
    }
    debug!("Archive lists {} file entries", names.len());

    let mut report = CurationReport::default();

    for mapping_entry in mapping.entries() {
        let folder = format!("{}/{}/", root, mapping_entry.label);
        let matching: Vec<&(usize, String)> = names
            .iter()
            .filter(|(_, name)| name.starts_with(&folder) && is_image_entry(name))
            .collect();

        info!(
            "Processing {}: {} files",
            mapping_entry.label,
            matching.len()
        );

        let mut counter: u32 = 1;
        let rows_before = report.rows.len();

        for (index, name) in matching {
            match read_features(archive, *index) {
                Ok(features) => {
                    report.rows.push(DatasetRow {
                        standardized_id: standardized_id(&mapping_entry.prefix, counter),
                        label: mapping_entry.label.clone(),
                        features,
                        is_augmented: is_augmented(name),
                    });
                    counter += 1;
                }
                Err(reason) => {
                    warn!("Skipping file {}: {}", name, reason);
                    report.skipped.push(SkippedEntry {
                        entry_name: name.clone(),
                        reason,
                    });
                }
            }
        }

        info!(
            "Finished {}: {} rows",
            mapping_entry.label,
            report.rows.len() - rows_before
        );
    }

    Ok(report)
}

fn read_features<R: Read + Seek>(
    archive: &mut ZipArchive<R>,
    index: usize,
) -> std::result::Result<FeatureVector, String> {
    let entry = archive.by_index(index).map_err(|e| e.to_string())?;

    // The declared size comes from the archive and is not trusted
    let declared = entry.size();
    if declared > MAX_ENTRY_BYTES {
        return Err(format!(
            "declared size {} exceeds limit of {} bytes",
            declared, MAX_ENTRY_BYTES
        ));
    }

    let mut bytes = Vec::with_capacity(declared as usize);
    entry
        .take(MAX_ENTRY_BYTES + 1)
        .read_to_end(&mut bytes)
        .map_err(|e| e.to_string())?;
    if bytes.len() as u64 > MAX_ENTRY_BYTES {
        return Err(format!("entry exceeds limit of {} bytes", MAX_ENTRY_BYTES));
    }

    extract(&bytes).map_err(|e| e.to_string())
}
