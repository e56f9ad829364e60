//! CSV 导出共享逻辑
//!
//! Used by the HTTP export endpoint and the `export-csv` command. Exports are
//! written to a transient file that is deleted when its handle is dropped.

use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

use chrono::Utc;
use csv::{ReaderBuilder, WriterBuilder};
use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;

use crate::errors::{Result, TelemetryError};
use crate::storage::TelemetryRecord;

/// Header row, in column order.
pub const CSV_HEADER: [&str; 6] = [
    "mod_id",
    "game_version",
    "mod_version",
    "loader",
    "count",
    "last_used",
];

/// CSV 行数据结构
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TelemetryCsvRow {
    pub mod_id: String,
    pub game_version: String,
    pub mod_version: String,
    pub loader: String,
    pub count: i64,
    /// `YYYY-MM-DD`
    pub last_used: String,
}

impl From<&TelemetryRecord> for TelemetryCsvRow {
    fn from(record: &TelemetryRecord) -> Self {
        Self {
            mod_id: record.mod_id.clone(),
            game_version: record.game_version.clone(),
            mod_version: record.mod_version.clone(),
            loader: record.loader.clone(),
            count: record.count,
            last_used: record.last_used.format("%Y-%m-%d").to_string(),
        }
    }
}

/// Write the header and one row per record. The header is written even when
/// there are no records.
pub fn write_csv<W: Write>(records: &[TelemetryRecord], writer: W) -> Result<()> {
    let mut csv_writer = WriterBuilder::new().has_headers(false).from_writer(writer);
    csv_writer.write_record(CSV_HEADER)?;

    for record in records {
        csv_writer.serialize(TelemetryCsvRow::from(record))?;
    }

    csv_writer
        .flush()
        .map_err(|e| TelemetryError::file_operation(format!("Failed to flush CSV: {}", e)))?;
    Ok(())
}

/// Read an export back into rows.
pub fn parse_csv<R: Read>(reader: R) -> Result<Vec<TelemetryCsvRow>> {
    let mut csv_reader = ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    csv_reader
        .deserialize::<TelemetryCsvRow>()
        .enumerate()
        .map(|(idx, row)| {
            // CSV 行号（1-based，跳过 header）
            row.map_err(|e| {
                TelemetryError::serialization(format!("Row {}: CSV parse error: {}", idx + 2, e))
            })
        })
        .collect()
}

/// Read an export file from disk.
pub fn parse_export(path: &Path) -> Result<Vec<TelemetryCsvRow>> {
    let file = File::open(path).map_err(|e| {
        TelemetryError::file_operation(format!("Failed to open {}: {}", path.display(), e))
    })?;
    parse_csv(BufReader::new(file))
}

/// A finished export living in a temporary file.
///
/// Dropping the handle deletes the file, on every path: write failure,
/// completed download, or an abandoned response.
#[derive(Debug)]
pub struct CsvExport {
    file: NamedTempFile,
    filename: String,
    rows: usize,
}

impl CsvExport {
    /// Write `records` to a new uniquely named file in `dir`. Blocking.
    pub fn create_in(dir: &Path, records: &[TelemetryRecord]) -> Result<Self> {
        let timestamp = Utc::now().format("%Y%m%d_%H%M%S");

        let file = tempfile::Builder::new()
            .prefix(&format!("telemetry_export_{}_", timestamp))
            .suffix(".csv")
            .tempfile_in(dir)
            .map_err(|e| {
                TelemetryError::file_operation(format!(
                    "Failed to create export file in {}: {}",
                    dir.display(),
                    e
                ))
            })?;

        // 写入失败时 file 在此被 drop，临时文件随之删除
        write_csv(records, BufWriter::new(file.as_file()))?;

        let filename = file
            .path()
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| format!("telemetry_export_{}.csv", timestamp));

        Ok(Self {
            file,
            filename,
            rows: records.len(),
        })
    }

    /// Download name offered to the client.
    pub fn filename(&self) -> &str {
        &self.filename
    }

    pub fn path(&self) -> &Path {
        self.file.path()
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Fresh read handle positioned at the start of the file.
    pub fn open_reader(&self) -> Result<File> {
        self.file.reopen().map_err(|e| {
            TelemetryError::file_operation(format!("Failed to reopen export file: {}", e))
        })
    }

    /// Move the export to `dest`, keeping it past the handle's lifetime.
    pub fn persist_to(self, dest: &Path) -> Result<()> {
        self.file
            .persist(dest)
            .map(|_| ())
            .or_else(|e| {
                // rename 跨文件系统会失败，回退为复制
                std::fs::copy(e.file.path(), dest).map(|_| ())
            })
            .map_err(|e| {
                TelemetryError::file_operation(format!(
                    "Failed to write export to {}: {}",
                    dest.display(),
                    e
                ))
            })
    }
}
