//! Export and log rendering for segments and summaries.
//!
//! Exports carry every source column in source order, whatever subset a
//! view displays.

use anyhow::Result;
use csv::WriterBuilder;
use flate2::Compression;
use flate2::write::GzEncoder;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use tracing::{debug, info};

use crate::segments::Segment;

/// Writes a segment as CSV: the source header row, then one row per order.
pub fn write_csv<W: Write>(segment: &Segment, writer: W) -> Result<()> {
    let mut wtr = WriterBuilder::new().from_writer(writer);

    wtr.write_record(segment.headers())?;
    for row in segment.rows() {
        wtr.write_record(&row.record.cells)?;
    }
    wtr.flush()?;

    Ok(())
}

/// Serializes a segment to CSV bytes.
pub fn to_csv(segment: &Segment) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    write_csv(segment, &mut buf)?;
    Ok(buf)
}

/// Writes a segment to `path`, gzip-compressed when `gzip` is set.
pub fn export_segment(segment: &Segment, path: &Path, gzip: bool) -> Result<()> {
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        std::fs::create_dir_all(dir)?;
    }
    let file = BufWriter::new(File::create(path)?);

    if gzip {
        let mut encoder = GzEncoder::new(file, Compression::default());
        write_csv(segment, &mut encoder)?;
        encoder.finish()?.flush()?;
    } else {
        write_csv(segment, file)?;
    }

    info!(
        path = %path.display(),
        rows = segment.len(),
        gzip,
        segment = segment.label(),
        "Segment exported"
    );
    Ok(())
}

/// Logs a value using Rust's debug pretty-print format.
pub fn print_pretty<T: std::fmt::Debug>(value: &T) {
    debug!("{:#?}", value);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::Status;
    use crate::segments::{SegmentSpec, Snapshot, Summary};
    use crate::table::RawTable;
    use chrono::NaiveDate;
    use flate2::read::GzDecoder;
    use std::env;
    use std::fs;
    use std::io::Read;

    fn temp_path(name: &str) -> std::path::PathBuf {
        env::temp_dir().join(name)
    }

    fn segment() -> Segment {
        let csv = "order_number,customer_name,latest_status,notes\n\
                   PK-1,\"Khan, Sara\",QC_APPROVED,\"said \"\"hi\"\"\"\n\
                   PK-2,John,FREIGHT,\n\
                   PK-3,Amy,QC_APPROVED,\n";
        let table = RawTable::from_csv(csv.as_bytes()).unwrap();
        let now = NaiveDate::from_ymd_opt(2024, 1, 6)
            .unwrap()
            .and_hms_opt(10, 0, 0)
            .unwrap();
        Snapshot::build(&table, now).segment(&SegmentSpec::new(Status::QcApproved))
    }

    #[test]
    fn test_to_csv_keeps_all_columns_and_order() {
        let bytes = to_csv(&segment()).unwrap();
        let parsed = RawTable::from_csv(&bytes).unwrap();

        assert_eq!(
            parsed.headers().as_ref(),
            ["order_number", "customer_name", "latest_status", "notes"]
        );
        assert_eq!(parsed.len(), 2);
        assert_eq!(parsed.rows()[0][1], "Khan, Sara");
        assert_eq!(parsed.rows()[0][3], "said \"hi\"");
        assert_eq!(parsed.rows()[1][0], "PK-3");
    }

    #[test]
    fn test_to_csv_empty_segment_writes_header_only() {
        let empty = segment().for_vendor("nobody");
        let bytes = to_csv(&empty).unwrap();
        let content = String::from_utf8(bytes).unwrap();
        assert_eq!(content.lines().count(), 1);
    }

    #[test]
    fn test_export_segment_plain() {
        let path = temp_path("gops_backlog_test_export.csv");
        let _ = fs::remove_file(&path);

        export_segment(&segment(), &path, false).unwrap();
        let content = fs::read_to_string(&path).unwrap();
        assert_eq!(content.lines().count(), 3);

        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_export_segment_gzip() {
        let path = temp_path("gops_backlog_test_export.csv.gz");
        let _ = fs::remove_file(&path);

        export_segment(&segment(), &path, true).unwrap();
        let mut decoded = String::new();
        GzDecoder::new(fs::File::open(&path).unwrap())
            .read_to_string(&mut decoded)
            .unwrap();
        assert_eq!(decoded.as_bytes(), to_csv(&segment()).unwrap().as_slice());

        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_print_pretty_does_not_panic() {
        print_pretty(&Summary::default());
    }
}
