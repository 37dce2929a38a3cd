use super::*;
use crate::model::thresholds::ThresholdBound;

fn single(parameter: &str, bound: ThresholdBound) -> ThresholdConfig {
    let mut cfg = ThresholdConfig::empty();
    cfg.set(parameter, bound);
    cfg
}

#[test]
fn test_sbp_below_critical() {
    let cfg = single("SBP", ThresholdBound::new(Some(90.0), Some(140.0), Some(80.0)));
    let record = PatientRecord::new("A", 1).with("SBP", 70.0);
    let out = check_thresholds(&record, &cfg);
    assert_eq!(out.len(), 2);
    assert_eq!(out[0].kind, ViolationKind::Min);
    assert_eq!(out[0].severity, Severity::Warning);
    assert_eq!(out[1].kind, ViolationKind::Critical);
    assert!(out[1].is_critical());
    assert_eq!(out[1].bound, 80.0);
}

#[test]
fn test_high_sbp_is_only_a_warning() {
    let cfg = single("SBP", ThresholdBound::new(Some(90.0), Some(140.0), Some(80.0)));
    let record = PatientRecord::new("A", 1).with("SBP", 200.0);
    let out = check_thresholds(&record, &cfg);
    assert_eq!(out.len(), 1);
    assert_eq!(out[0].kind, ViolationKind::Max);
    assert_eq!(out[0].severity, Severity::Warning);
}

#[test]
fn test_lactate_above_critical() {
    let record = PatientRecord::new("A", 1).with("Lactate", 5.0);
    let out = check_thresholds(&record, &ThresholdConfig::default_v1());
    let critical: Vec<_> = out.iter().filter(|v| v.is_critical()).collect();
    assert_eq!(critical.len(), 1);
    assert_eq!(critical[0].parameter, "Lactate");
    assert_eq!(critical[0].value, 5.0);
}

#[test]
fn test_order_follows_config() {
    let record = PatientRecord::new("A", 1)
        .with("Lactate", 3.0)
        .with("HR", 120.0)
        .with("Temp", 35.0);
    let out = check_thresholds(&record, &ThresholdConfig::default_v1());
    let params: Vec<&str> = out.iter().map(|v| v.parameter.as_str()).collect();
    assert_eq!(params, vec!["HR", "Temp", "Lactate"]);
}

#[test]
fn test_disabled_and_missing_are_skipped() {
    let mut cfg = ThresholdConfig::default_v1();
    cfg.set_enabled("HR", false);
    let record = PatientRecord::new("A", 1).with("HR", 180.0);
    assert!(check_thresholds(&record, &cfg).is_empty());

    let empty = PatientRecord::new("B", 1);
    assert!(check_thresholds(&empty, &ThresholdConfig::default_v1()).is_empty());
}

#[test]
fn test_in_range_value_has_no_violations() {
    let record = PatientRecord::new("A", 1).with("HR", 80.0).with("pH", 7.4);
    assert!(check_thresholds(&record, &ThresholdConfig::default_v1()).is_empty());
}

#[test]
fn test_violation_text() {
    let record = PatientRecord::new("A", 1).with("SBP", 70.0).with("Lactate", 5.0);
    let out = check_thresholds(&record, &ThresholdConfig::default_v1());
    let text: Vec<String> = out
        .iter()
        .filter(|v| v.is_critical())
        .map(|v| v.describe())
        .collect();
    assert_eq!(
        text,
        vec![
            "Systolic BP 70 mmHg below critical threshold 80",
            "Lactate 5 mmol/L above critical threshold 4",
        ]
    );
}
