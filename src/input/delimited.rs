use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use flate2::read::GzDecoder;

use crate::input::{InputError, RawTable};

pub fn open_maybe_gz(path: &Path, gz: bool) -> Result<Box<dyn Read>, InputError> {
    let file = File::open(path)?;
    if gz {
        Ok(Box::new(BufReader::new(GzDecoder::new(file))))
    } else {
        Ok(Box::new(BufReader::new(file)))
    }
}

pub fn load_delimited(path: &Path, delimiter: u8, gz: bool) -> Result<RawTable, InputError> {
    let reader = open_maybe_gz(path, gz)?;
    read_delimited(reader, delimiter)
}

pub fn read_delimited<R: Read>(reader: R, delimiter: u8) -> Result<RawTable, InputError> {
    let mut rdr = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let columns: Vec<String> = rdr.headers()?.iter().map(str::to_string).collect();

    let mut rows = Vec::new();
    for (idx, record) in rdr.records().enumerate() {
        let record = record?;
        if record.iter().all(str::is_empty) {
            tracing::debug!(line = idx + 2, "skipping blank row");
            continue;
        }
        let mut row: Vec<String> = record.iter().map(str::to_string).collect();
        if row.len() < columns.len() {
            row.resize(columns.len(), String::new());
        }
        rows.push(row);
    }

    Ok(RawTable { columns, rows })
}
