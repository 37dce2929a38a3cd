use serde::Serialize;

use crate::model::schema::{FieldGroup, field_group};
use crate::pipeline::stage1_normalize::{
    is_hour_column, is_patient_id_column, is_sepsis_label_column,
};

#[derive(Debug, Clone, Default, Serialize)]
pub struct ValidationReport {
    pub warnings: Vec<String>,
    pub vital_columns: Vec<String>,
    pub lab_columns: Vec<String>,
    pub ignored_columns: Vec<String>,
}

impl ValidationReport {
    pub fn is_clean(&self) -> bool {
        self.warnings.is_empty()
    }
}

pub fn validate_columns(columns: &[String]) -> ValidationReport {
    let mut report = ValidationReport::default();
    let mut has_patient_id = false;
    let mut has_hour = false;

    for name in columns {
        if is_patient_id_column(name) {
            has_patient_id = true;
            continue;
        }
        if is_hour_column(name) {
            has_hour = true;
            continue;
        }
        match field_group(name) {
            Some(FieldGroup::Vital) => report.vital_columns.push(name.clone()),
            Some(FieldGroup::Lab) => report.lab_columns.push(name.clone()),
            None => {
                if !is_known_context_column(name) {
                    report.ignored_columns.push(name.clone());
                }
            }
        }
    }

    if !has_patient_id {
        report
            .warnings
            .push("no patient identifier column (e.g. Patient_ID)".to_string());
    }
    if !has_hour {
        report
            .warnings
            .push("no hour/time column (e.g. Hour or ICULOS)".to_string());
    }
    if report.vital_columns.is_empty() {
        report
            .warnings
            .push("no recognizable vital sign columns (e.g. HR, Temp, SBP)".to_string());
    }
    if report.lab_columns.is_empty() {
        report
            .warnings
            .push("no recognizable laboratory columns (e.g. Lactate, WBC)".to_string());
    }

    for warning in &report.warnings {
        tracing::warn!("input validation: {warning}");
    }
    if !report.ignored_columns.is_empty() {
        tracing::debug!(columns = ?report.ignored_columns, "ignoring unknown columns");
    }

    report
}

fn is_known_context_column(name: &str) -> bool {
    matches!(
        name,
        "Age" | "Gender" | "Unit1" | "Unit2" | "HospAdmTime" | "ICULOS"
    ) || is_sepsis_label_column(name)
}
