use serde::Serialize;

use crate::input::validate::ValidationReport;
use crate::model::thresholds::ThresholdConfig;
use crate::pipeline::stage5_cohort::{CohortSummary, PatientSummary};

#[derive(Debug, Clone, Serialize)]
pub struct ToolMeta {
    pub name: String,
    pub version: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ScoringMeta {
    pub noise_amplitude: f64,
    pub seed: u64,
    pub base_confidence: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct InputMeta {
    pub path: String,
    pub rows_skipped: usize,
    pub validation: ValidationReport,
}

#[derive(Debug, Clone, Serialize)]
pub struct PatientEntry {
    pub patient_id: String,
    pub hour: u32,
    pub risk_level: String,
    pub probability: f64,
    pub confidence: f64,
    pub critical_violations: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct SummaryJson<'a> {
    pub tool: ToolMeta,
    pub input: InputMeta,
    pub scoring: ScoringMeta,
    pub cohort: &'a CohortSummary,
    pub high_risk_patients: Vec<PatientEntry>,
    pub thresholds: &'a ThresholdConfig,
}

pub fn patient_entry(p: &PatientSummary) -> PatientEntry {
    PatientEntry {
        patient_id: p.patient_id.clone(),
        hour: p.latest_hour,
        risk_level: p.assessment.risk_level.to_string(),
        probability: round4(p.assessment.probability),
        confidence: round4(p.assessment.confidence),
        critical_violations: p.violations.iter().filter(|v| v.is_critical()).count(),
    }
}

fn round4(v: f64) -> f64 {
    (v * 10_000.0).round() / 10_000.0
}

pub fn render_summary_json(data: &SummaryJson<'_>) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(data)
}
