use std::path::{self, PathBuf};

use chrono::Local;
use engine_logging::engine_debug;
use postscrape_core::{ResultRow, OUTPUT_HEADER};

use crate::filename::timestamped_filename;
use crate::persist::AtomicFileWriter;
use crate::types::SinkError;

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Final destination for a job's rows.
pub trait ResultSink: Send + Sync {
    /// Persist `rows` and return the absolute path of the written file.
    fn write(&self, rows: &[ResultRow]) -> Result<PathBuf, SinkError>;
}

/// Spreadsheet-friendly CSV: BOM, fixed header, one normalized row per record.
pub struct CsvSink {
    writer: AtomicFileWriter,
}

impl CsvSink {
    pub fn new(output_dir: PathBuf) -> Self {
        Self {
            writer: AtomicFileWriter::new(output_dir),
        }
    }
}

/// Encode rows as CSV bytes, BOM first.
pub fn encode_rows(rows: &[ResultRow]) -> Result<Vec<u8>, SinkError> {
    let mut csv_writer = csv::Writer::from_writer(UTF8_BOM.to_vec());
    csv_writer.write_record(OUTPUT_HEADER)?;
    for row in rows {
        csv_writer.write_record(row.to_record())?;
    }
    csv_writer
        .into_inner()
        .map_err(|err| SinkError::Io(err.into_error()))
}

impl ResultSink for CsvSink {
    fn write(&self, rows: &[ResultRow]) -> Result<PathBuf, SinkError> {
        let bytes = encode_rows(rows)?;
        let filename = timestamped_filename(Local::now());
        let written = self.writer.write(&filename, &bytes)?;
        engine_debug!("Wrote {} rows ({} bytes) to {:?}", rows.len(), bytes.len(), written);
        Ok(path::absolute(&written)?)
    }
}
