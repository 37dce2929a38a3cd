use std::path::Path;

use thiserror::Error;

pub mod delimited;
pub mod validate;
pub mod workbook;

use delimited::load_delimited;
use workbook::load_workbook;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableFormat {
    Csv,
    Tsv,
    Psv,
    Workbook,
}

impl TableFormat {
    pub fn delimiter(self) -> Option<u8> {
        match self {
            TableFormat::Csv => Some(b','),
            TableFormat::Tsv => Some(b'\t'),
            TableFormat::Psv => Some(b'|'),
            TableFormat::Workbook => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RawTable {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

#[derive(Debug, Error)]
pub enum InputError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error(
        "unsupported file type: {0} (expected .csv, .csv.gz, .tsv, .psv, .xlsx, .xlsm, .xls or .ods)"
    )]
    UnsupportedFormat(String),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("workbook error: {0}")]
    Workbook(#[from] calamine::Error),
    #[error("parse error: {0}")]
    Parse(String),
}

pub fn detect_format(path: &Path) -> Result<(TableFormat, bool), InputError> {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_ascii_lowercase())
        .unwrap_or_default();
    let (stem, gz) = match name.strip_suffix(".gz") {
        Some(stem) => (stem.to_string(), true),
        None => (name.clone(), false),
    };
    let ext = stem.rsplit_once('.').map(|(_, ext)| ext).unwrap_or("");
    let format = match ext {
        "csv" => TableFormat::Csv,
        "tsv" => TableFormat::Tsv,
        "psv" => TableFormat::Psv,
        "xlsx" | "xlsm" | "xls" | "xlsb" | "ods" if !gz => TableFormat::Workbook,
        _ => return Err(InputError::UnsupportedFormat(name)),
    };
    Ok((format, gz))
}

pub fn load_table(path: &Path) -> Result<RawTable, InputError> {
    let (format, gz) = detect_format(path)?;
    tracing::info!(
        path = %path.display(),
        ?format,
        gz,
        "reading patient table"
    );
    let table = match format.delimiter() {
        Some(delimiter) => load_delimited(path, delimiter, gz)?,
        None => load_workbook(path)?,
    };
    if table.columns.iter().all(|c| c.is_empty()) {
        return Err(InputError::Parse(format!(
            "{} has no header row",
            path.display()
        )));
    }
    if table.rows.is_empty() {
        return Err(InputError::Parse(format!(
            "{} has a header but no data rows",
            path.display()
        )));
    }
    tracing::info!(
        columns = table.columns.len(),
        rows = table.rows.len(),
        "patient table loaded"
    );
    Ok(table)
}

#[cfg(test)]
#[path = "../../tests/src_inline/input/tests.rs"]
mod tests;
