//! Integration tests for archive curation
//!
//! Archives are built in memory with zip::ZipWriter; images are small
//! synthetic PNGs.

use bsa_common::extract;
use bsa_dc::{
    curate_archive, curate_path, write_csv_path, CurationError, LabelMapping, LabelPrefix,
    DEFAULT_ROOT, MAX_ENTRY_BYTES,
};
use image::{DynamicImage, GrayImage, ImageOutputFormat, Luma};
use std::io::{Cursor, Write};
use tempfile::TempDir;
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

/// Test helper: 16x16 PNG with a left/right intensity step
fn scan_png(level: u8) -> Vec<u8> {
    let img = GrayImage::from_fn(16, 16, |x, _| if x < 8 { Luma([level]) } else { Luma([10]) });
    let mut buf = Vec::new();
    DynamicImage::ImageLuma8(img)
        .write_to(&mut Cursor::new(&mut buf), ImageOutputFormat::Png)
        .unwrap();
    buf
}

/// Test helper: zip bytes with the given (name, contents) entries in order
fn build_zip(entries: &[(&str, Vec<u8>)]) -> Vec<u8> {
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    for (name, contents) in entries {
        writer.start_file(*name, FileOptions::default()).unwrap();
        writer.write_all(contents).unwrap();
    }
    writer.finish().unwrap().into_inner()
}

/// Test helper: stored (uncompressed) entries, so sizes are easy to patch
fn build_stored_zip(entries: &[(&str, Vec<u8>)]) -> Vec<u8> {
    let options = FileOptions::default().compression_method(CompressionMethod::Stored);
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    for (name, contents) in entries {
        writer.start_file(*name, options).unwrap();
        writer.write_all(contents).unwrap();
    }
    writer.finish().unwrap().into_inner()
}

/// Test helper: overwrite the uncompressed size in `name`'s central-directory record
fn set_declared_size(bytes: &mut [u8], name: &str, size: u32) {
    const CENTRAL_HEADER: [u8; 4] = [0x50, 0x4b, 0x01, 0x02];

    let header = (0..bytes.len().saturating_sub(46))
        .find(|&i| {
            if bytes[i..i + 4] != CENTRAL_HEADER {
                return false;
            }
            let name_len = u16::from_le_bytes([bytes[i + 28], bytes[i + 29]]) as usize;
            bytes.get(i + 46..i + 46 + name_len) == Some(name.as_bytes())
        })
        .expect("central directory record for entry");

    bytes[header + 24..header + 28].copy_from_slice(&size.to_le_bytes());
}

fn open(bytes: Vec<u8>) -> ZipArchive<Cursor<Vec<u8>>> {
    ZipArchive::new(Cursor::new(bytes)).unwrap()
}

fn ids(report: &bsa_dc::CurationReport) -> Vec<&str> {
    report
        .rows
        .iter()
        .map(|r| r.standardized_id.as_str())
        .collect()
}

#[test]
fn test_ids_per_label() {
    let bytes = build_zip(&[
        ("combined_images/NonDemented/a.png", scan_png(200)),
        ("combined_images/MildDemented/b.png", scan_png(120)),
        ("combined_images/NonDemented/c.png", scan_png(210)),
        ("combined_images/MildDemented/d.jpg", scan_png(130)),
        ("combined_images/NonDemented/e.PNG", scan_png(220)),
    ]);

    let report = curate_archive(&mut open(bytes), DEFAULT_ROOT, &LabelMapping::default()).unwrap();

    // Default mapping order puts MildDemented before NonDemented
    assert_eq!(
        ids(&report),
        [
            "Mild_D_00001",
            "Mild_D_00002",
            "Non_D_00001",
            "Non_D_00002",
            "Non_D_00003"
        ]
    );
    assert_eq!(report.rows[0].label, "MildDemented");
    assert_eq!(report.rows[4].label, "NonDemented");
    assert!(report.skipped.is_empty());
}

#[test]
fn test_archive_order_within_label() {
    let bytes = build_zip(&[
        ("combined_images/NonDemented/z.png", scan_png(250)),
        ("combined_images/NonDemented/a.png", scan_png(50)),
    ]);

    let report = curate_archive(&mut open(bytes), DEFAULT_ROOT, &LabelMapping::default()).unwrap();

    assert_eq!(report.rows.len(), 2);
    assert_eq!(report.rows[0].features, extract(&scan_png(250)).unwrap());
    assert_eq!(report.rows[1].features, extract(&scan_png(50)).unwrap());
}

#[test]
fn test_corrupt_file_leaves_no_gap() {
    let bytes = build_zip(&[
        ("combined_images/NonDemented/1.png", scan_png(200)),
        ("combined_images/NonDemented/broken.png", b"not an image".to_vec()),
        ("combined_images/NonDemented/2.png", scan_png(190)),
        ("combined_images/NonDemented/3.png", scan_png(180)),
    ]);

    let report = curate_archive(&mut open(bytes), DEFAULT_ROOT, &LabelMapping::default()).unwrap();

    assert_eq!(ids(&report), ["Non_D_00001", "Non_D_00002", "Non_D_00003"]);
    assert_eq!(report.skipped.len(), 1);
    assert_eq!(
        report.skipped[0].entry_name,
        "combined_images/NonDemented/broken.png"
    );
    assert!(!report.skipped[0].reason.is_empty());
}

#[test]
fn test_filters_extension_root_and_folder() {
    let bytes = build_zip(&[
        ("combined_images/NonDemented/notes.txt", b"hello".to_vec()),
        ("other_root/NonDemented/a.png", scan_png(200)),
        ("combined_images/NonDementedExtra/a.png", scan_png(200)),
        ("combined_images/UnknownLabel/a.png", scan_png(200)),
        ("combined_images/NonDemented/ok.jpeg", scan_png(200)),
    ]);

    let report = curate_archive(&mut open(bytes), DEFAULT_ROOT, &LabelMapping::default()).unwrap();

    assert_eq!(ids(&report), ["Non_D_00001"]);
    assert!(report.skipped.is_empty());
}

#[test]
fn test_augmentation_flag() {
    let bytes = build_zip(&[
        ("combined_images/VeryMildDemented/orig.png", scan_png(150)),
        ("combined_images/VeryMildDemented/Aug_rot90.png", scan_png(150)),
    ]);

    let report = curate_archive(&mut open(bytes), DEFAULT_ROOT, &LabelMapping::default()).unwrap();

    assert_eq!(ids(&report), ["VMild_D_00001", "VMild_D_00002"]);
    assert!(!report.rows[0].is_augmented);
    assert!(report.rows[1].is_augmented);
}

#[test]
fn test_custom_mapping_and_root() {
    let bytes = build_zip(&[
        ("scans/B/x.png", scan_png(100)),
        ("scans/A/y.png", scan_png(100)),
    ]);
    let mapping = LabelMapping::new(vec![
        LabelPrefix::new("B", "bee"),
        LabelPrefix::new("A", "ay"),
    ])
    .unwrap();

    let report = curate_archive(&mut open(bytes), "scans/", &mapping).unwrap();

    assert_eq!(ids(&report), ["bee_00001", "ay_00001"]);
}

#[test]
fn test_end_to_end_csv() {
    let dir = TempDir::new().unwrap();
    let archive_path = dir.path().join("archive.zip");
    let output_path = dir.path().join("out.csv");

    std::fs::write(
        &archive_path,
        build_zip(&[
            ("combined_images/ModerateDemented/aug_1.png", scan_png(90)),
            ("combined_images/ModerateDemented/2.png", scan_png(90)),
        ]),
    )
    .unwrap();

    let report = curate_path(&archive_path, DEFAULT_ROOT, &LabelMapping::default()).unwrap();
    write_csv_path(&output_path, &report.rows).unwrap();

    let mut reader = csv::Reader::from_path(&output_path).unwrap();
    let headers = reader.headers().unwrap().clone();
    assert_eq!(
        headers.iter().collect::<Vec<_>>(),
        [
            "Filename",
            "Label",
            "mean_pixel_intensity",
            "std_pixel_intensity",
            "entropy",
            "edge_density",
            "center_brightness",
            "is_augmented"
        ]
    );

    let records: Vec<csv::StringRecord> = reader.records().map(|r| r.unwrap()).collect();
    assert_eq!(records.len(), 2);
    assert_eq!(&records[0][0], "Mod_D_00001");
    assert_eq!(&records[0][1], "ModerateDemented");
    assert_eq!(&records[0][7], "TRUE");
    assert_eq!(&records[1][7], "FALSE");

    let mean: f64 = records[0][2].parse().unwrap();
    assert_eq!(mean, report.rows[0].features.mean_pixel_intensity);
}

#[test]
fn test_empty_dataset_still_has_header() {
    let dir = TempDir::new().unwrap();
    let output_path = dir.path().join("empty.csv");

    let report =
        curate_archive(&mut open(build_zip(&[])), DEFAULT_ROOT, &LabelMapping::default()).unwrap();
    assert!(report.rows.is_empty());

    write_csv_path(&output_path, &report.rows).unwrap();
    let contents = std::fs::read_to_string(&output_path).unwrap();
    assert!(contents.starts_with("Filename,Label,"));
    assert_eq!(contents.lines().count(), 1);
}

#[test]
fn test_missing_archive_is_fatal() {
    let result = curate_path(
        std::path::Path::new("/nonexistent/archive.zip"),
        DEFAULT_ROOT,
        &LabelMapping::default(),
    );
    assert!(matches!(result, Err(CurationError::ArchiveOpen(_, _))));
}

#[test]
fn test_non_zip_archive_is_fatal() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("archive.zip");
    std::fs::write(&path, b"definitely not a zip").unwrap();

    let result = curate_path(&path, DEFAULT_ROOT, &LabelMapping::default());
    assert!(matches!(result, Err(CurationError::ArchiveOpen(_, _))));
}

#[test]
fn test_unwritable_output_is_fatal() {
    let result = write_csv_path(std::path::Path::new("/nonexistent/dir/out.csv"), &[]);
    assert!(matches!(result, Err(CurationError::Output(_))));
}

#[test]
fn test_oversized_declared_entry_is_skipped() {
    let huge = "combined_images/NonDemented/huge.png";
    let mut bytes = build_stored_zip(&[
        (huge, scan_png(200)),
        ("combined_images/NonDemented/ok.png", scan_png(190)),
    ]);
    set_declared_size(&mut bytes, huge, u32::MAX);

    let mut archive = open(bytes);
    assert!(archive.by_index(0).unwrap().size() > MAX_ENTRY_BYTES);

    let report = curate_archive(&mut archive, DEFAULT_ROOT, &LabelMapping::default()).unwrap();

    assert_eq!(ids(&report), ["Non_D_00001"]);
    assert_eq!(report.rows[0].features, extract(&scan_png(190)).unwrap());
    assert_eq!(report.skipped.len(), 1);
    assert_eq!(report.skipped[0].entry_name, huge);
    assert!(report.skipped[0].reason.contains("exceeds limit"));
}
