use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::input::validate::ValidationReport;
use crate::model::analysis::AnalysisReport;
use crate::model::record::PatientRecord;
use crate::model::risk::RiskAssessment;
use crate::model::thresholds::{ScoringProfile, ThresholdConfig};
use crate::pipeline::stage3_thresholds::check_thresholds;
use crate::pipeline::stage5_cohort::CohortOutput;
use crate::report::alerts::Alert;
use crate::report::format_f64_4;
use crate::report::json::{
    InputMeta, ScoringMeta, SummaryJson, ToolMeta, patient_entry, render_summary_json,
};
use crate::report::text::{ReportContext, render_report_text};

const TOP_PATIENTS: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowMode {
    LatestPerPatient,
    AllHours,
}

#[derive(Debug, Clone)]
pub struct Stage6Input<'a> {
    pub records: &'a [PatientRecord],
    pub cohort: &'a CohortOutput,
    pub reports: &'a [AnalysisReport],
    pub alerts: &'a [Alert],
    pub validation: &'a ValidationReport,
    pub thresholds: &'a ThresholdConfig,
    pub profile: &'a ScoringProfile,
    pub input_path: String,
    pub skipped_rows: usize,
    pub tool_name: String,
    pub tool_version: String,
    pub row_mode: RowMode,
}

pub fn write_reports(input: &Stage6Input<'_>, out_dir: &Path) -> std::io::Result<()> {
    fs::create_dir_all(out_dir)?;

    let risk_path = out_dir.join("risk.tsv");
    write_risk_tsv(input, &risk_path)?;

    let summary_path = out_dir.join("summary.json");
    let json = render_summary_json(&build_summary(input))?;
    write_text(&summary_path, &json)?;

    let report_path = out_dir.join("report.txt");
    let top = &input.cohort.patients[..input.cohort.patients.len().min(TOP_PATIENTS)];
    let ctx = ReportContext {
        tool_version: input.tool_version.clone(),
        input_path: input.input_path.clone(),
        summary: &input.cohort.summary,
        validation: input.validation,
        skipped_rows: input.skipped_rows,
        top_patients: top,
        reports: input.reports,
    };
    write_text(&report_path, &render_report_text(&ctx))?;

    let alerts_path = out_dir.join("alerts.txt");
    let mut alerts = String::new();
    for alert in input.alerts {
        alerts.push_str(&format!("{:?}\t{}\n", alert.channel, alert.message));
    }
    write_text(&alerts_path, &alerts)?;

    tracing::info!(out = %out_dir.display(), "reports written");
    Ok(())
}

pub fn build_summary<'a>(input: &Stage6Input<'a>) -> SummaryJson<'a> {
    SummaryJson {
        tool: ToolMeta {
            name: input.tool_name.clone(),
            version: input.tool_version.clone(),
        },
        input: InputMeta {
            path: input.input_path.clone(),
            rows_skipped: input.skipped_rows,
            validation: input.validation.clone(),
        },
        scoring: ScoringMeta {
            noise_amplitude: input.profile.noise_amplitude,
            seed: input.profile.seed,
            base_confidence: input.profile.base_confidence,
        },
        cohort: &input.cohort.summary,
        high_risk_patients: input
            .cohort
            .patients
            .iter()
            .filter(|p| p.assessment.risk_level.is_elevated())
            .map(patient_entry)
            .collect(),
        thresholds: input.thresholds,
    }
}

fn write_risk_tsv(input: &Stage6Input<'_>, path: &Path) -> std::io::Result<()> {
    let mut w = BufWriter::new(File::create(path)?);
    let header = [
        "patient_id",
        "hour",
        "probability",
        "raw_score",
        "confidence",
        "completeness",
        "risk_level",
        "warnings",
        "critical",
        "sepsis_label",
        "drivers",
    ]
    .join("\t");
    writeln!(w, "{}", header)?;

    match input.row_mode {
        RowMode::LatestPerPatient => {
            let mut order: Vec<usize> = input
                .cohort
                .patients
                .iter()
                .map(|p| p.record_index)
                .collect();
            order.sort_by(|&a, &b| input.records[a].patient_id.cmp(&input.records[b].patient_id));
            for idx in order {
                write_row(&mut w, input, idx)?;
            }
        }
        RowMode::AllHours => {
            for idx in 0..input.records.len() {
                write_row(&mut w, input, idx)?;
            }
        }
    }

    w.flush()
}

fn write_row<W: Write>(w: &mut W, input: &Stage6Input<'_>, idx: usize) -> std::io::Result<()> {
    let record = &input.records[idx];
    let Some(assessment) = input.cohort.assessments.get(idx) else {
        return Ok(());
    };
    let violations = check_thresholds(record, input.thresholds);
    let critical = violations.iter().filter(|v| v.is_critical()).count();
    let row = [
        record.patient_id.clone(),
        record.hour.to_string(),
        format_f64_4(assessment.probability),
        format_f64_4(assessment.raw_score),
        format_f64_4(assessment.confidence),
        format_f64_4(assessment.completeness),
        assessment.risk_level.to_string(),
        (violations.len() - critical).to_string(),
        critical.to_string(),
        record
            .sepsis_label
            .map(|l| l.to_string())
            .unwrap_or_default(),
        format_drivers(assessment),
    ];
    writeln!(w, "{}", row.join("\t"))
}

fn format_drivers(assessment: &RiskAssessment) -> String {
    assessment
        .contributors
        .iter()
        .map(|c| format!("{}:{:.2}", c.rule, c.weight))
        .collect::<Vec<_>>()
        .join(";")
}

fn write_text(path: &Path, contents: &str) -> std::io::Result<()> {
    let mut w = BufWriter::new(File::create(path)?);
    w.write_all(contents.as_bytes())?;
    w.flush()
}

#[cfg(test)]
#[path = "../../tests/src_inline/pipeline/stage6_output.rs"]
mod tests;
