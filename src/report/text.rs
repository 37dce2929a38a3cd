use crate::input::validate::ValidationReport;
use crate::model::analysis::AnalysisReport;
use crate::model::risk::RiskLevel;
use crate::model::violations::format_value;
use crate::pipeline::stage5_cohort::{CohortSummary, LevelCount, PatientSummary};
use crate::report::{format_f64_4, format_opt_percent, format_percent};

#[derive(Debug, Clone)]
pub struct ReportContext<'a> {
    pub tool_version: String,
    pub input_path: String,
    pub summary: &'a CohortSummary,
    pub validation: &'a ValidationReport,
    pub skipped_rows: usize,
    pub top_patients: &'a [PatientSummary],
    pub reports: &'a [AnalysisReport],
}

pub fn render_report_text(ctx: &ReportContext<'_>) -> String {
    let mut out = String::new();

    out.push_str("Sepsis Risk Screening Report\n");
    out.push_str("============================\n\n");
    out.push_str(&format!(
        "kira-sepsisrisk {} | input: {}\n",
        ctx.tool_version, ctx.input_path
    ));
    out.push_str(
        "Scores are a rule-based heuristic, not a calibrated probability. Use as a screening aid only.\n\n",
    );

    out.push_str("1. Cohort overview\n");
    out.push_str(&format!(
        "Patients: {}\nRecords (patient-hours): {}\n",
        ctx.summary.n_patients, ctx.summary.n_records
    ));
    out.push_str(&format!(
        "Mean risk score: {}\nMedian risk score: {}\nP90 risk score: {}\nMean confidence: {}\n",
        format_f64_4(ctx.summary.mean_probability),
        format_f64_4(ctx.summary.median_probability),
        format_f64_4(ctx.summary.p90_probability),
        format_f64_4(ctx.summary.mean_confidence)
    ));
    out.push_str(&format!(
        "{}\n\n",
        cohort_statement(&ctx.summary.patient_levels)
    ));

    out.push_str("2. Risk distribution (latest hour per patient)\n");
    for level in &ctx.summary.patient_levels {
        out.push_str(&format!(
            "{:<10} {:>6}  {}\n",
            level.level.as_str(),
            level.count,
            format_percent(level.fraction)
        ));
    }
    out.push('\n');

    out.push_str("3. Agreement with SepsisLabel (HIGH/CRITICAL = positive)\n");
    match &ctx.summary.agreement {
        Some(a) => {
            out.push_str(&format!(
                "TP={} FP={} TN={} FN={} (UNCERTAIN excluded: {})\n",
                a.true_positive,
                a.false_positive,
                a.true_negative,
                a.false_negative,
                a.excluded_uncertain
            ));
            out.push_str(&format!(
                "Sensitivity: {}\nSpecificity: {}\nPrecision: {}\nAccuracy: {}\n\n",
                format_opt_percent(a.sensitivity),
                format_opt_percent(a.specificity),
                format_opt_percent(a.precision),
                format_opt_percent(a.accuracy)
            ));
        }
        None => out.push_str("No labeled records in input.\n\n"),
    }

    out.push_str("4. Highest-risk patients\n");
    if ctx.top_patients.is_empty() {
        out.push_str("None.\n");
    }
    for p in ctx.top_patients {
        let critical = p.violations.iter().filter(|v| v.is_critical()).count();
        out.push_str(&format!(
            "{} hour {}: {} score={} confidence={} critical_violations={}\n",
            p.patient_id,
            p.latest_hour,
            p.assessment.risk_level,
            format_f64_4(p.assessment.probability),
            format_f64_4(p.assessment.confidence),
            critical
        ));
    }
    out.push('\n');

    out.push_str("5. Data quality and caveats\n");
    out.push_str(&format!("Rows skipped (no patient id): {}\n", ctx.skipped_rows));
    if ctx.validation.is_clean() {
        out.push_str("Input schema: OK\n");
    } else {
        for w in &ctx.validation.warnings {
            out.push_str(&format!("Warning: {}\n", w));
        }
    }
    if !ctx.validation.ignored_columns.is_empty() {
        out.push_str(&format!(
            "Ignored columns: {}\n",
            ctx.validation.ignored_columns.join(", ")
        ));
    }
    out.push('\n');

    if !ctx.reports.is_empty() {
        out.push_str("6. Patient reports\n\n");
        for report in ctx.reports {
            out.push_str(&render_patient_report(report));
            out.push('\n');
        }
    }

    out
}

pub fn render_patient_report(report: &AnalysisReport) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "Patient {} | hour {} | priority {} | generated {}\n",
        report.patient_id,
        report.hour,
        report.priority.as_str(),
        report.generated_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    push_list(&mut out, "Findings", &report.findings);
    push_list(&mut out, "Recommendations", &report.recommendations);
    push_list(&mut out, "Treatment plan", &report.treatment_plan);
    push_list(&mut out, "Follow-up", &report.follow_up);
    if !report.violations.is_empty() {
        out.push_str("Violations:\n");
        for v in &report.violations {
            out.push_str(&format!(
                "  {:<16} value={:<8} bound={:<8} {:?}/{:?}\n",
                v.parameter,
                format_value(v.value),
                format_value(v.bound),
                v.kind,
                v.severity
            ));
        }
    }
    out
}

fn push_list(out: &mut String, title: &str, items: &[String]) {
    if items.is_empty() {
        return;
    }
    out.push_str(title);
    out.push_str(":\n");
    for item in items {
        out.push_str("  - ");
        out.push_str(item);
        out.push('\n');
    }
}

fn level_fraction(levels: &[LevelCount], level: RiskLevel) -> f64 {
    levels
        .iter()
        .find(|l| l.level == level)
        .map(|l| l.fraction)
        .unwrap_or(0.0)
}

fn cohort_statement(levels: &[LevelCount]) -> &'static str {
    let critical = level_fraction(levels, RiskLevel::Critical);
    let elevated = critical + level_fraction(levels, RiskLevel::High);
    let uncertain = level_fraction(levels, RiskLevel::Uncertain);
    if uncertain >= 0.5 {
        "Most patients lack key measurements; risk levels are largely UNCERTAIN."
    } else if critical >= 0.10 {
        "A substantial share of patients is at CRITICAL risk."
    } else if elevated >= 0.20 {
        "Elevated risk is common in this cohort."
    } else if elevated > 0.0 {
        "A minority of patients shows elevated risk."
    } else {
        "No patients currently show elevated risk."
    }
}
