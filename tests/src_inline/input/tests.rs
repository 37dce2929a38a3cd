use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};

use flate2::Compression;
use flate2::write::GzEncoder;

use super::delimited::read_delimited;
use super::validate::validate_columns;
use super::workbook::{cell_text, load_workbook};
use super::*;

static DIR_COUNTER: AtomicUsize = AtomicUsize::new(0);

fn make_temp_dir() -> PathBuf {
    let mut dir = std::env::temp_dir();
    let id = DIR_COUNTER.fetch_add(1, Ordering::SeqCst);
    dir.push(format!(
        "kira_sepsisrisk_input_{}_{}",
        std::process::id(),
        id
    ));
    fs::create_dir_all(&dir).unwrap();
    dir
}

fn write_file(path: &Path, contents: &str) {
    fs::write(path, contents).unwrap();
}

fn write_gz(path: &Path, contents: &str) {
    let mut enc = GzEncoder::new(File::create(path).unwrap(), Compression::default());
    enc.write_all(contents.as_bytes()).unwrap();
    enc.finish().unwrap();
}

const WORKSHEET_TYPE: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet";

fn inline_cell(cell_ref: &str, text: &str) -> String {
    format!(r#"<c r="{cell_ref}" t="inlineStr"><is><t>{text}</t></is></c>"#)
}

fn number_cell(cell_ref: &str, value: f64) -> String {
    format!(r#"<c r="{cell_ref}"><v>{value}</v></c>"#)
}

fn sheet_xml(rows: &[(u32, Vec<String>)]) -> String {
    let mut body = String::new();
    for (r, cells) in rows {
        body.push_str(&format!(r#"<row r="{r}">{}</row>"#, cells.concat()));
    }
    format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main"><sheetData>{body}</sheetData></worksheet>"#
    )
}

// Minimal SpreadsheetML package: one part per sheet, inline strings only.
fn write_xlsx(path: &Path, sheets: &[(&str, String)]) {
    use zip::write::SimpleFileOptions;

    let mut zip = zip::ZipWriter::new(File::create(path).unwrap());
    let opts = SimpleFileOptions::default();

    let mut overrides = String::new();
    let mut entries = String::new();
    let mut rels = String::new();
    for (i, (name, _)) in sheets.iter().enumerate() {
        let n = i + 1;
        overrides.push_str(&format!(
            r#"<Override PartName="/xl/worksheets/sheet{n}.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.worksheet+xml"/>"#
        ));
        entries.push_str(&format!(
            r#"<sheet name="{name}" sheetId="{n}" r:id="rId{n}"/>"#
        ));
        rels.push_str(&format!(
            r#"<Relationship Id="rId{n}" Type="{WORKSHEET_TYPE}" Target="worksheets/sheet{n}.xml"/>"#
        ));
    }

    let parts = [
        (
            "[Content_Types].xml".to_string(),
            format!(
                r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Default Extension="xml" ContentType="application/xml"/><Override PartName="/xl/workbook.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml"/>{overrides}</Types>"#
            ),
        ),
        (
            "_rels/.rels".to_string(),
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="xl/workbook.xml"/></Relationships>"#
                .to_string(),
        ),
        (
            "xl/workbook.xml".to_string(),
            format!(
                r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><workbook xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships"><sheets>{entries}</sheets></workbook>"#
            ),
        ),
        (
            "xl/_rels/workbook.xml.rels".to_string(),
            format!(
                r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">{rels}</Relationships>"#
            ),
        ),
    ];
    for (name, body) in parts {
        zip.start_file(name, opts).unwrap();
        zip.write_all(body.as_bytes()).unwrap();
    }
    for (i, (_, xml)) in sheets.iter().enumerate() {
        zip.start_file(format!("xl/worksheets/sheet{}.xml", i + 1), opts)
            .unwrap();
        zip.write_all(xml.as_bytes()).unwrap();
    }
    zip.finish().unwrap();
}

fn columns(names: &[&str]) -> Vec<String> {
    names.iter().map(|s| s.to_string()).collect()
}

#[test]
fn test_detect_format() {
    assert_eq!(
        detect_format(Path::new("a/p.csv")).unwrap(),
        (TableFormat::Csv, false)
    );
    assert_eq!(
        detect_format(Path::new("p.CSV.gz")).unwrap(),
        (TableFormat::Csv, true)
    );
    assert_eq!(
        detect_format(Path::new("p000001.psv")).unwrap(),
        (TableFormat::Psv, false)
    );
    assert_eq!(
        detect_format(Path::new("ward.xlsx")).unwrap(),
        (TableFormat::Workbook, false)
    );
    assert!(matches!(
        detect_format(Path::new("notes.pdf")),
        Err(InputError::UnsupportedFormat(_))
    ));
    assert!(matches!(
        detect_format(Path::new("ward.xlsx.gz")),
        Err(InputError::UnsupportedFormat(_))
    ));
    assert!(matches!(
        detect_format(Path::new("vitals.txt")),
        Err(InputError::UnsupportedFormat(_))
    ));
    assert!(matches!(
        detect_format(Path::new("noextension")),
        Err(InputError::UnsupportedFormat(_))
    ));
}

#[test]
fn test_read_delimited_trims_and_pads() {
    let data = "Patient_ID, HR ,Temp\nPT-1, 88 ,37.1\nPT-2,92\n,,\n";
    let table = read_delimited(data.as_bytes(), b',').unwrap();
    assert_eq!(table.columns, columns(&["Patient_ID", "HR", "Temp"]));
    assert_eq!(table.rows.len(), 2);
    assert_eq!(table.rows[0], vec!["PT-1", "88", "37.1"]);
    assert_eq!(table.rows[1], vec!["PT-2", "92", ""]);
}

#[test]
fn test_read_delimited_quoted_fields() {
    let data = "patient_id,note,HR\n\"PT-9\",\"a, b\",101\n";
    let table = read_delimited(data.as_bytes(), b',').unwrap();
    assert_eq!(table.rows[0][0], "PT-9");
    assert_eq!(table.rows[0][1], "a, b");
    assert_eq!(table.rows[0][2], "101");
}

#[test]
fn test_load_table_psv_and_gz() {
    let dir = make_temp_dir();
    let psv = dir.join("p000001.psv");
    write_file(
        &psv,
        "HR|O2Sat|Lactate|ICULOS|SepsisLabel|PatientID\n80|97|NaN|1|0|p1\n",
    );
    let table = load_table(&psv).unwrap();
    assert_eq!(table.columns.len(), 6);
    assert_eq!(table.rows[0][2], "NaN");

    let gz = dir.join("cohort.csv.gz");
    write_gz(&gz, "Patient_ID,Hour,HR\nA,1,80\nA,2,85\n");
    let table = load_table(&gz).unwrap();
    assert_eq!(table.rows.len(), 2);
    assert_eq!(table.rows[1], vec!["A", "2", "85"]);
}

#[test]
fn test_load_table_rejects_empty_inputs() {
    let dir = make_temp_dir();
    let empty = dir.join("empty.csv");
    write_file(&empty, "");
    assert!(matches!(load_table(&empty), Err(InputError::Parse(_))));

    let header_only = dir.join("header.csv");
    write_file(&header_only, "Patient_ID,HR\n");
    assert!(matches!(load_table(&header_only), Err(InputError::Parse(_))));

    let missing = dir.join("missing.csv");
    assert!(matches!(load_table(&missing), Err(InputError::Io(_))));
}

#[test]
fn test_validation_warnings_do_not_fail() {
    let report = validate_columns(&columns(&["Name", "Comment"]));
    assert_eq!(report.warnings.len(), 4);
    assert_eq!(report.ignored_columns, columns(&["Name", "Comment"]));

    let report = validate_columns(&columns(&[
        "Patient_ID",
        "Hour",
        "HR",
        "Lactate",
        "Age",
        "SepsisLabel",
    ]));
    assert!(report.is_clean());
    assert_eq!(report.vital_columns, columns(&["HR"]));
    assert_eq!(report.lab_columns, columns(&["Lactate"]));
    assert!(report.ignored_columns.is_empty());
}

#[test]
fn test_validation_missing_labs_only() {
    let report = validate_columns(&columns(&["patient_id", "ICULOS", "HR", "SBP"]));
    assert_eq!(report.warnings.len(), 1);
    assert!(report.warnings[0].contains("laboratory"));
}

#[test]
fn test_workbook_cell_text() {
    assert_eq!(cell_text(&calamine::Data::Float(7.0)), "7");
    assert_eq!(cell_text(&calamine::Data::Float(37.25)), "37.25");
    assert_eq!(cell_text(&calamine::Data::Int(12)), "12");
    assert_eq!(cell_text(&calamine::Data::Bool(true)), "1");
    assert_eq!(
        cell_text(&calamine::Data::String(" PT-007 ".to_string())),
        "PT-007"
    );
    assert_eq!(cell_text(&calamine::Data::Empty), "");
}

#[test]
fn test_workbook_reads_first_sheet_only() {
    let dir = make_temp_dir();
    let path = dir.join("ward.xlsx");
    let vitals = sheet_xml(&[
        (
            1,
            vec![
                inline_cell("A1", "Patient_ID"),
                inline_cell("B1", "HR"),
                inline_cell("C1", "Lactate"),
            ],
        ),
        (
            2,
            vec![
                inline_cell("A2", "PT-1"),
                number_cell("B2", 88.0),
                number_cell("C2", 1.5),
            ],
        ),
        (
            4,
            vec![inline_cell("A4", "PT-2"), number_cell("B4", 121.0)],
        ),
    ]);
    let notes = sheet_xml(&[
        (1, vec![inline_cell("A1", "Comment")]),
        (2, vec![inline_cell("A2", "not patient data")]),
    ]);
    write_xlsx(&path, &[("Vitals", vitals), ("Notes", notes)]);

    let table = load_workbook(&path).unwrap();
    assert_eq!(table.columns, columns(&["Patient_ID", "HR", "Lactate"]));
    assert_eq!(table.rows.len(), 2);
    assert_eq!(table.rows[0], vec!["PT-1", "88", "1.5"]);
    assert_eq!(table.rows[1], vec!["PT-2", "121", ""]);

    let via_dispatch = load_table(&path).unwrap();
    assert_eq!(via_dispatch, table);
}
