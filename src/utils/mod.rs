pub mod csv_handler;

pub use csv_handler::{CsvExport, TelemetryCsvRow, parse_csv, parse_export, write_csv};
