use super::*;
use crate::model::thresholds::{ScoringProfile, ThresholdConfig};
use crate::pipeline::stage2_score::score_record;
use crate::pipeline::stage3_thresholds::check_thresholds;

fn exact() -> ScoringProfile {
    ScoringProfile {
        noise_amplitude: 0.0,
        ..ScoringProfile::default_v1()
    }
}

fn report_for(record: &PatientRecord) -> AnalysisReport {
    let assessment = score_record(record, &exact());
    let violations = check_thresholds(record, &ThresholdConfig::default_v1());
    build_report(record, &record.patient_id, assessment, violations, Utc::now())
}

fn base(id: &str) -> PatientRecord {
    PatientRecord::new(id, 6)
        .with("HR", 80.0)
        .with("Temp", 37.0)
        .with("SBP", 120.0)
        .with("Resp", 16.0)
        .with("WBC", 8.0)
        .with("Lactate", 1.0)
}

#[test]
fn test_critical_report() {
    let record = base("PT-9")
        .with("HR", 110.0)
        .with("Temp", 39.0)
        .with("SBP", 85.0)
        .with("Lactate", 5.0)
        .with("WBC", 14.0);
    let report = report_for(&record);
    assert_eq!(report.priority, Priority::Critical);
    assert_eq!(report.patient_id, "PT-9");
    assert_eq!(report.hour, 6);
    assert_eq!(
        report.recommendations[0],
        "Activate the sepsis response team immediately"
    );
    assert!(
        report
            .recommendations
            .iter()
            .any(|r| r.starts_with("Repeat lactate within 2 hours"))
    );
    assert!(report.follow_up.iter().any(|f| f == "Reassess lactate within 2 hours"));
    assert!(
        report
            .findings
            .iter()
            .any(|f| f.starts_with("[CRITICAL] Lactate"))
    );
    assert!(report.findings[0].contains("(CRITICAL)"));
    assert!(!report.treatment_plan.is_empty());
}

#[test]
fn test_routine_report() {
    let report = report_for(&base("PT-1"));
    assert_eq!(report.priority, Priority::Routine);
    assert_eq!(report.recommendations, vec!["Continue routine monitoring"]);
    assert!(report.violations.is_empty());
    assert_eq!(report.findings.len(), 1);
}

#[test]
fn test_moderate_report_increases_monitoring() {
    let record = base("PT-2").with("Lactate", 3.0).with("HR", 105.0);
    let report = report_for(&record);
    assert_eq!(report.assessment.risk_level, RiskLevel::Moderate);
    assert_eq!(report.priority, Priority::Routine);
    assert!(report.recommendations[0].starts_with("Increase monitoring frequency"));
    assert!(
        report
            .follow_up
            .iter()
            .any(|f| f.starts_with("Trend 2 out-of-range"))
    );
}

#[test]
fn test_uncertain_report_lists_missing() {
    let record = PatientRecord::new("PT-3", 2).with("HR", 120.0);
    let report = report_for(&record);
    assert_eq!(report.priority, Priority::Uncertain);
    let first = &report.recommendations[0];
    assert!(first.starts_with("Insufficient data"));
    assert!(first.contains("Lactate"));
    assert!(
        report
            .findings
            .iter()
            .any(|f| f.starts_with("Missing key measurements"))
    );
}

#[test]
fn test_labeled_positive_is_noted() {
    let mut record = base("PT-4");
    record.sepsis_label = Some(1);
    let report = report_for(&record);
    assert!(report.findings.iter().any(|f| f.contains("sepsis-positive")));
}

#[test]
fn test_push_unique() {
    let mut list = Vec::new();
    push_unique(&mut list, "a");
    push_unique(&mut list, "a");
    push_unique(&mut list, "b");
    assert_eq!(list, vec!["a", "b"]);
}
