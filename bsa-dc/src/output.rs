//! CSV output

use std::io::Write;
use std::path::Path;

use crate::curator::DatasetRow;
use crate::error::Result;

pub const CSV_HEADER: [&str; 8] = [
    "Filename",
    "Label",
    "mean_pixel_intensity",
    "std_pixel_intensity",
    "entropy",
    "edge_density",
    "center_brightness",
    "is_augmented",
];

/// Write rows to `path`, header first (also for an empty dataset)
pub fn write_csv_path(path: &Path, rows: &[DatasetRow]) -> Result<()> {
    let writer = csv::Writer::from_path(path)?;
    write_rows(writer, rows)
}

/// Write rows to any sink
pub fn write_csv<W: Write>(sink: W, rows: &[DatasetRow]) -> Result<()> {
    write_rows(csv::Writer::from_writer(sink), rows)
}

fn write_rows<W: Write>(mut writer: csv::Writer<W>, rows: &[DatasetRow]) -> Result<()> {
    writer.write_record(CSV_HEADER)?;

    for row in rows {
        let f = &row.features;
        writer.write_record([
            row.standardized_id.as_str(),
            row.label.as_str(),
            format_float(f.mean_pixel_intensity).as_str(),
            format_float(f.std_pixel_intensity).as_str(),
            format_float(f.entropy).as_str(),
            format_float(f.edge_density).as_str(),
            format_float(f.center_brightness).as_str(),
            if row.is_augmented { "TRUE" } else { "FALSE" },
        ])?;
    }

    writer.flush()?;
    Ok(())
}

/// Shortest round-trip form, always with a fractional part (`200.0`, not `200`)
fn format_float(value: f64) -> String {
    format!("{:?}", value)
}
