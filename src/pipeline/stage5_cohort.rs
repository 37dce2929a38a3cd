use std::collections::BTreeMap;

use serde::Serialize;

use crate::engine::{CancelToken, EngineError, SepsisEngine};
use crate::model::record::PatientRecord;
use crate::model::risk::{RiskAssessment, RiskLevel, risk_level_order};
use crate::model::violations::Violation;
use crate::report::{median, p90};

#[derive(Debug, Clone, Serialize)]
pub struct LevelCount {
    pub level: RiskLevel,
    pub count: usize,
    pub fraction: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct PatientSummary {
    pub patient_id: String,
    pub record_index: usize,
    pub latest_hour: u32,
    pub n_records: usize,
    pub sepsis_label: Option<u8>,
    pub peak_probability: f64,
    pub assessment: RiskAssessment,
    pub violations: Vec<Violation>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct LabelAgreement {
    pub true_positive: usize,
    pub false_positive: usize,
    pub true_negative: usize,
    pub false_negative: usize,
    pub excluded_uncertain: usize,
    pub sensitivity: Option<f64>,
    pub specificity: Option<f64>,
    pub precision: Option<f64>,
    pub accuracy: Option<f64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CohortSummary {
    pub n_records: usize,
    pub n_patients: usize,
    pub mean_probability: f64,
    pub mean_confidence: f64,
    pub median_probability: f64,
    pub p90_probability: f64,
    pub record_levels: Vec<LevelCount>,
    pub patient_levels: Vec<LevelCount>,
    pub agreement: Option<LabelAgreement>,
}

#[derive(Debug, Clone)]
pub struct CohortOutput {
    pub assessments: Vec<RiskAssessment>,
    pub patients: Vec<PatientSummary>,
    pub summary: CohortSummary,
}

pub fn fit(
    engine: &SepsisEngine,
    records: &[PatientRecord],
    cancel: &CancelToken,
) -> Result<CohortOutput, EngineError> {
    let assessments = engine.score_all(records, cancel)?;
    let patients = summarize_patients(engine, records, &assessments);

    let n = assessments.len();
    let (mean_probability, mean_confidence) = if n == 0 {
        (0.0, 0.0)
    } else {
        (
            assessments.iter().map(|a| a.probability).sum::<f64>() / n as f64,
            assessments.iter().map(|a| a.confidence).sum::<f64>() / n as f64,
        )
    };

    let probabilities: Vec<f64> = assessments.iter().map(|a| a.probability).collect();
    let record_levels = level_counts(assessments.iter().map(|a| a.risk_level));
    let patient_levels = level_counts(patients.iter().map(|p| p.assessment.risk_level));
    let agreement = label_agreement(records, &assessments);

    tracing::info!(records = n, patients = patients.len(), "cohort scored");

    let summary = CohortSummary {
        n_records: n,
        n_patients: patients.len(),
        mean_probability,
        mean_confidence,
        median_probability: median(&probabilities),
        p90_probability: p90(&probabilities),
        record_levels,
        patient_levels,
        agreement,
    };

    Ok(CohortOutput {
        assessments,
        patients,
        summary,
    })
}

pub fn summarize_patients(
    engine: &SepsisEngine,
    records: &[PatientRecord],
    assessments: &[RiskAssessment],
) -> Vec<PatientSummary> {
    let mut latest: BTreeMap<&str, usize> = BTreeMap::new();
    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    let mut labels: BTreeMap<&str, u8> = BTreeMap::new();
    let mut peaks: BTreeMap<&str, f64> = BTreeMap::new();

    for (idx, record) in records.iter().enumerate() {
        let id = record.patient_id.as_str();
        *counts.entry(id).or_insert(0) += 1;
        if let Some(label) = record.sepsis_label {
            let entry = labels.entry(id).or_insert(label);
            *entry = (*entry).max(label);
        }
        let prob = assessments.get(idx).map(|a| a.probability).unwrap_or(0.0);
        let peak = peaks.entry(id).or_insert(prob);
        *peak = peak.max(prob);
        let newer = latest
            .get(id)
            .is_none_or(|&prev| records[prev].hour <= record.hour);
        if newer {
            latest.insert(id, idx);
        }
    }

    let mut out: Vec<PatientSummary> = latest
        .iter()
        .filter_map(|(&id, &idx)| {
            let assessment = assessments.get(idx)?.clone();
            Some(PatientSummary {
                patient_id: id.to_string(),
                record_index: idx,
                latest_hour: records[idx].hour,
                n_records: counts.get(id).copied().unwrap_or(0),
                sepsis_label: labels.get(id).copied(),
                peak_probability: peaks.get(id).copied().unwrap_or(0.0),
                assessment,
                violations: engine.check(&records[idx]),
            })
        })
        .collect();

    out.sort_by(|a, b| {
        match b
            .assessment
            .probability
            .partial_cmp(&a.assessment.probability)
            .unwrap_or(std::cmp::Ordering::Equal)
        {
            std::cmp::Ordering::Equal => a.patient_id.cmp(&b.patient_id),
            other => other,
        }
    });
    out
}

pub fn level_counts(levels: impl Iterator<Item = RiskLevel>) -> Vec<LevelCount> {
    let mut counts = [0usize; 5];
    let mut total = 0usize;
    for level in levels {
        if let Some(pos) = risk_level_order().iter().position(|l| *l == level) {
            counts[pos] += 1;
        }
        total += 1;
    }
    risk_level_order()
        .iter()
        .zip(counts.iter())
        .map(|(&level, &count)| LevelCount {
            level,
            count,
            fraction: if total > 0 {
                count as f64 / total as f64
            } else {
                0.0
            },
        })
        .collect()
}

pub fn label_agreement(
    records: &[PatientRecord],
    assessments: &[RiskAssessment],
) -> Option<LabelAgreement> {
    let mut agreement = LabelAgreement::default();
    let mut labeled = 0usize;

    for (record, assessment) in records.iter().zip(assessments.iter()) {
        let Some(label) = record.sepsis_label else {
            continue;
        };
        labeled += 1;
        if assessment.risk_level == RiskLevel::Uncertain {
            agreement.excluded_uncertain += 1;
            continue;
        }
        let predicted = assessment.risk_level.is_elevated();
        match (predicted, label == 1) {
            (true, true) => agreement.true_positive += 1,
            (true, false) => agreement.false_positive += 1,
            (false, false) => agreement.true_negative += 1,
            (false, true) => agreement.false_negative += 1,
        }
    }

    if labeled == 0 {
        return None;
    }

    let tp = agreement.true_positive as f64;
    let fp = agreement.false_positive as f64;
    let tn = agreement.true_negative as f64;
    let fn_ = agreement.false_negative as f64;
    agreement.sensitivity = ratio(tp, tp + fn_);
    agreement.specificity = ratio(tn, tn + fp);
    agreement.precision = ratio(tp, tp + fp);
    agreement.accuracy = ratio(tp + tn, tp + tn + fp + fn_);
    Some(agreement)
}

fn ratio(num: f64, denom: f64) -> Option<f64> {
    if denom > 0.0 { Some(num / denom) } else { None }
}

#[cfg(test)]
#[path = "../../tests/src_inline/pipeline/stage5_cohort.rs"]
mod tests;
