use std::path::Path;

use calamine::{Data, Reader, open_workbook_auto};

use crate::input::{InputError, RawTable};

pub fn load_workbook(path: &Path) -> Result<RawTable, InputError> {
    let mut workbook = open_workbook_auto(path)?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| InputError::Parse(format!("{} has no sheets", path.display())))??;

    let mut iter = range.rows();
    let columns: Vec<String> = match iter.next() {
        Some(header) => header.iter().map(cell_text).collect(),
        None => Vec::new(),
    };

    let mut rows = Vec::new();
    for cells in iter {
        let mut row: Vec<String> = cells.iter().map(cell_text).collect();
        if row.iter().all(String::is_empty) {
            continue;
        }
        row.resize(columns.len().max(row.len()), String::new());
        rows.push(row);
    }

    Ok(RawTable { columns, rows })
}

pub fn cell_text(cell: &Data) -> String {
    match cell {
        Data::Empty | Data::Error(_) => String::new(),
        Data::String(s) => s.trim().to_string(),
        Data::Int(i) => i.to_string(),
        Data::Float(f) => format_float(*f),
        Data::Bool(b) => String::from(if *b { "1" } else { "0" }),
        other => other.to_string(),
    }
}

fn format_float(v: f64) -> String {
    if v.fract() == 0.0 && v.abs() < 1e15 {
        format!("{}", v as i64)
    } else {
        v.to_string()
    }
}
