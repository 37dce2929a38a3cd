use crate::input::RawTable;
use crate::model::record::{Gender, PatientRecord};
use crate::model::schema::field_group;

#[derive(Debug, Clone)]
pub struct NormalizeOutput {
    pub records: Vec<PatientRecord>,
    pub skipped: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ColumnRole {
    PatientId(u8),
    SepsisLabel,
    Hour,
    Iculos,
    Age,
    Gender,
    Unit1,
    Unit2,
    HospAdmTime,
    Measurement,
    Ignored,
}

fn column_key(name: &str) -> String {
    name.chars()
        .filter(|c| !matches!(c, '_' | '-' | ' '))
        .flat_map(char::to_lowercase)
        .collect()
}

// 0 for an explicit patient id column, 1 for a bare `patient`/`id`/`pid`
// that may just be a row index.
fn patient_id_rank(name: &str) -> Option<u8> {
    let key = column_key(name);
    if key.contains("patientid") {
        Some(0)
    } else if matches!(key.as_str(), "patient" | "id" | "pid") {
        Some(1)
    } else {
        None
    }
}

pub fn is_patient_id_column(name: &str) -> bool {
    patient_id_rank(name).is_some()
}

pub fn is_sepsis_label_column(name: &str) -> bool {
    column_key(name).contains("sepsis")
}

pub fn is_hour_column(name: &str) -> bool {
    matches!(
        column_key(name).as_str(),
        "hour" | "hours" | "time" | "iculos"
    )
}

fn column_role(name: &str) -> ColumnRole {
    if let Some(rank) = patient_id_rank(name) {
        return ColumnRole::PatientId(rank);
    }
    if is_sepsis_label_column(name) {
        return ColumnRole::SepsisLabel;
    }
    if field_group(name).is_some() {
        return ColumnRole::Measurement;
    }
    match name {
        "Age" => ColumnRole::Age,
        "Gender" => ColumnRole::Gender,
        "Unit1" => ColumnRole::Unit1,
        "Unit2" => ColumnRole::Unit2,
        "HospAdmTime" => ColumnRole::HospAdmTime,
        "ICULOS" => ColumnRole::Iculos,
        _ if is_hour_column(name) => ColumnRole::Hour,
        _ => ColumnRole::Ignored,
    }
}

pub fn parse_number(raw: &str) -> Option<f64> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }
    let lower = s.to_ascii_lowercase();
    if matches!(lower.as_str(), "nan" | "na" | "n/a" | "null" | "none" | "-") {
        return None;
    }
    s.parse::<f64>().ok().filter(|v| v.is_finite())
}

pub fn parse_gender(raw: &str) -> Option<Gender> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "m" | "male" | "1" | "1.0" => Some(Gender::M),
        "f" | "female" | "0" | "0.0" => Some(Gender::F),
        _ => None,
    }
}

pub fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "1.0" | "true" | "yes" | "y" => Some(true),
        "0" | "0.0" | "false" | "no" | "n" => Some(false),
        _ => None,
    }
}

pub fn normalize_row(columns: &[String], row: &[String]) -> Option<PatientRecord> {
    let mut patient_id: Option<(u8, String)> = None;
    let mut hour: Option<f64> = None;
    let mut record = PatientRecord::new(String::new(), 1);

    for (idx, name) in columns.iter().enumerate() {
        let raw = row.get(idx).map(|s| s.trim()).unwrap_or("");
        match column_role(name) {
            ColumnRole::PatientId(rank) => {
                let better = patient_id.as_ref().is_none_or(|(best, _)| rank < *best);
                if better && !raw.is_empty() {
                    patient_id = Some((rank, raw.to_string()));
                }
            }
            ColumnRole::SepsisLabel => {
                record.sepsis_label = parse_number(raw).map(|v| u8::from(v >= 0.5));
            }
            ColumnRole::Hour => {
                if hour.is_none() {
                    hour = parse_number(raw);
                }
            }
            ColumnRole::Iculos => record.iculos = parse_number(raw).filter(|v| *v >= 0.0),
            ColumnRole::Age => {
                record.age = parse_number(raw)
                    .filter(|v| *v >= 0.0)
                    .map(|v| v.round() as u32)
            }
            ColumnRole::Gender => record.gender = parse_gender(raw),
            ColumnRole::Unit1 => record.unit1 = parse_flag(raw),
            ColumnRole::Unit2 => record.unit2 = parse_flag(raw),
            ColumnRole::HospAdmTime => record.hosp_adm_time = parse_number(raw).map(f64::abs),
            ColumnRole::Measurement => {
                record.set_value(name, parse_number(raw));
            }
            ColumnRole::Ignored => {}
        }
    }

    record.patient_id = patient_id?.1;
    let hour = hour.or(record.iculos).unwrap_or(1.0);
    record.hour = if hour >= 1.0 { hour.round() as u32 } else { 1 };
    Some(record)
}

pub fn normalize_table(table: &RawTable) -> NormalizeOutput {
    let mut records = Vec::with_capacity(table.rows.len());
    let mut skipped = 0usize;
    for (idx, row) in table.rows.iter().enumerate() {
        match normalize_row(&table.columns, row) {
            Some(record) => records.push(record),
            None => {
                skipped += 1;
                tracing::debug!(row = idx + 1, "row has no patient id; skipping");
            }
        }
    }
    if skipped > 0 {
        tracing::warn!(skipped, "rows without a patient id were skipped");
    }
    NormalizeOutput { records, skipped }
}

#[cfg(test)]
#[path = "../../tests/src_inline/pipeline/stage1_normalize.rs"]
mod tests;
