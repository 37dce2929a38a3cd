use chrono::{DateTime, Utc};

use crate::model::analysis::{AnalysisReport, Priority};
use crate::model::record::PatientRecord;
use crate::model::risk::{RiskAssessment, RiskLevel};
use crate::model::schema::field_label;
use crate::model::violations::Violation;

#[derive(Debug, Default)]
struct Sections {
    findings: Vec<String>,
    recommendations: Vec<String>,
    treatment_plan: Vec<String>,
    follow_up: Vec<String>,
}

fn push_unique(list: &mut Vec<String>, item: &str) {
    if !list.iter().any(|s| s == item) {
        list.push(item.to_string());
    }
}

pub fn build_report(
    record: &PatientRecord,
    patient_id: &str,
    assessment: RiskAssessment,
    violations: Vec<Violation>,
    generated_at: DateTime<Utc>,
) -> AnalysisReport {
    let priority = Priority::from_level(assessment.risk_level);
    let mut s = Sections::default();

    s.findings.push(format!(
        "Sepsis risk {:.0}% ({}), confidence {:.0}%, data completeness {:.0}%",
        assessment.probability * 100.0,
        assessment.risk_level,
        assessment.confidence * 100.0,
        assessment.completeness * 100.0
    ));
    if !assessment.contributors.is_empty() {
        let names: Vec<&str> = assessment.contributors.iter().map(|c| c.rule).collect();
        s.findings
            .push(format!("Risk drivers: {}", names.join(", ").replace('_', " ")));
    }
    for v in &violations {
        let tag = if v.is_critical() { "CRITICAL" } else { "warning" };
        s.findings.push(format!("[{}] {}", tag, v.describe()));
    }
    if !assessment.missing.is_empty() {
        let labels: Vec<&str> = assessment.missing.iter().map(|m| field_label(m)).collect();
        s.findings
            .push(format!("Missing key measurements: {}", labels.join(", ")));
    }
    if record.sepsis_label == Some(1) {
        s.findings
            .push("Record is labeled sepsis-positive in the source data".to_string());
    }

    tier_sections(&mut s, priority, &assessment);
    for v in violations.iter().filter(|v| v.is_critical()) {
        if let Some(rec) = critical_recommendation(&v.parameter) {
            push_unique(&mut s.recommendations, rec);
        }
    }
    let warnings = violations.iter().filter(|v| !v.is_critical()).count();
    if warnings > 0 {
        push_unique(
            &mut s.follow_up,
            &format!("Trend {} out-of-range parameter(s) at next reassessment", warnings),
        );
    }

    AnalysisReport {
        patient_id: patient_id.to_string(),
        hour: record.hour,
        assessment,
        violations,
        priority,
        findings: s.findings,
        recommendations: s.recommendations,
        treatment_plan: s.treatment_plan,
        follow_up: s.follow_up,
        generated_at,
    }
}

fn tier_sections(s: &mut Sections, priority: Priority, assessment: &RiskAssessment) {
    match priority {
        Priority::Uncertain => {
            let labels: Vec<&str> = assessment.missing.iter().map(|m| field_label(m)).collect();
            if labels.is_empty() {
                s.recommendations
                    .push("Confidence is too low for a reliable assessment".to_string());
            } else {
                s.recommendations.push(format!(
                    "Insufficient data for a reliable assessment; obtain: {}",
                    labels.join(", ")
                ));
            }
            s.recommendations
                .push("Repeat the assessment once missing values are available".to_string());
            s.treatment_plan
                .push("Continue standard monitoring until data completeness improves".to_string());
            s.follow_up.push("Re-evaluate within 1 hour".to_string());
        }
        Priority::Critical => {
            s.recommendations
                .push("Activate the sepsis response team immediately".to_string());
            s.recommendations.push(
                "Start the hour-1 bundle: blood cultures before antibiotics, broad-spectrum antibiotics, 30 mL/kg crystalloid for hypotension or lactate >= 4 mmol/L"
                    .to_string(),
            );
            s.treatment_plan
                .push("Broad-spectrum antibiotics within 1 hour".to_string());
            s.treatment_plan
                .push("Fluid resuscitation with 30 mL/kg crystalloid".to_string());
            s.treatment_plan
                .push("Vasopressors if MAP remains below 65 mmHg after fluids".to_string());
            s.treatment_plan.push("ICU-level monitoring".to_string());
            s.follow_up.push("Reassess lactate within 2 hours".to_string());
            s.follow_up.push("Vital signs every 15 minutes".to_string());
            s.follow_up
                .push("Reassess volume status and tissue perfusion after fluids".to_string());
        }
        Priority::High => {
            s.recommendations
                .push("Notify the attending physician within 30 minutes".to_string());
            s.recommendations
                .push("Obtain blood cultures and a repeat lactate".to_string());
            s.treatment_plan
                .push("Consider empiric antibiotics after cultures are drawn".to_string());
            s.treatment_plan
                .push("Evaluate for a source of infection".to_string());
            s.follow_up.push("Vital signs every 30 minutes".to_string());
            s.follow_up.push("Reassess within 1 hour".to_string());
        }
        Priority::Routine => {
            if assessment.risk_level == RiskLevel::Moderate {
                s.recommendations
                    .push("Increase monitoring frequency and reassess in 2-4 hours".to_string());
                s.follow_up.push("Vital signs every 2 hours".to_string());
            } else {
                s.recommendations
                    .push("Continue routine monitoring".to_string());
                s.follow_up.push("Vital signs every 4 hours".to_string());
            }
            s.treatment_plan.push("Standard care".to_string());
        }
    }
}

fn critical_recommendation(parameter: &str) -> Option<&'static str> {
    let rec = match parameter {
        "Lactate" => "Repeat lactate within 2 hours and begin fluid resuscitation",
        "SBP" | "MAP" | "DBP" => {
            "Treat hypotension: 30 mL/kg crystalloid, vasopressors to target MAP >= 65 mmHg"
        }
        "Temp" => "Obtain blood cultures and manage fever",
        "HR" => "Evaluate tachycardia and assess volume status",
        "Resp" => "Assess respiratory status and obtain an arterial blood gas",
        "O2Sat" | "SaO2" => "Provide supplemental oxygen to keep saturation at or above 92%",
        "WBC" => "Review the differential and evaluate the infection source",
        "Creatinine" => "Monitor urine output and review nephrotoxic medications",
        "Platelets" => "Check coagulation profile and screen for DIC",
        "Bilirubin_total" => "Evaluate hepatic function",
        _ => return None,
    };
    Some(rec)
}

#[cfg(test)]
#[path = "../../tests/src_inline/pipeline/stage4_assemble.rs"]
mod tests;
