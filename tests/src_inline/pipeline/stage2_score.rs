use super::*;

fn exact() -> ScoringProfile {
    ScoringProfile {
        noise_amplitude: 0.0,
        ..ScoringProfile::default_v1()
    }
}

fn normal_record(id: &str) -> PatientRecord {
    PatientRecord::new(id, 4)
        .with("HR", 78.0)
        .with("Temp", 36.9)
        .with("SBP", 122.0)
        .with("MAP", 85.0)
        .with("Resp", 16.0)
        .with("O2Sat", 98.0)
        .with("WBC", 7.5)
        .with("Lactate", 1.1)
}

fn septic_record(id: &str) -> PatientRecord {
    normal_record(id)
        .with("HR", 110.0)
        .with("Temp", 39.0)
        .with("SBP", 85.0)
        .with("Lactate", 5.0)
        .with("WBC", 14.0)
}

#[test]
fn test_septic_record_is_elevated() {
    let a = score_record(&septic_record("PT-1"), &ScoringProfile::default_v1());
    assert!(a.risk_level.is_elevated(), "got {:?}", a.risk_level);
    assert_eq!(a.completeness, 1.0);
    assert!((a.confidence - 0.85).abs() < 1e-12);

    let exact = score_record(&septic_record("PT-1"), &exact());
    assert!((exact.raw_score - 1.0).abs() < 1e-12);
    assert_eq!(exact.risk_level, RiskLevel::Critical);
    let rules: Vec<&str> = exact.contributors.iter().map(|c| c.rule).collect();
    assert!(rules.contains(&"hyperlactatemia"));
    assert!(rules.contains(&"hypotension"));
    assert!(!rules.contains(&"tachypnea"));
}

#[test]
fn test_normal_record_is_low() {
    let a = score_record(&normal_record("PT-2"), &exact());
    assert_eq!(a.raw_score, 0.0);
    assert!(a.contributors.is_empty());
    assert!(a.missing.is_empty());
    assert_eq!(a.risk_level, RiskLevel::Low);
}

#[test]
fn test_lactate_tiers_are_exclusive() {
    let mid = normal_record("A").with("Lactate", 3.0);
    let a = score_record(&mid, &exact());
    assert!((a.raw_score - 0.20).abs() < 1e-12);

    let high = normal_record("A").with("Lactate", 4.5);
    let a = score_record(&high, &exact());
    assert!((a.raw_score - 0.35).abs() < 1e-12);
    assert_eq!(a.contributors.len(), 1);
}

#[test]
fn test_outputs_stay_in_unit_interval() {
    let profile = ScoringProfile {
        noise_amplitude: 0.5,
        ..ScoringProfile::default_v1()
    };
    for hour in 1..50u32 {
        let mut r = septic_record("P").with("Platelets", 40.0).with("Creatinine", 3.0);
        r.hour = hour;
        let a = score_record(&r, &profile);
        assert!((0.0..=1.0).contains(&a.probability));
        assert!((0.0..=1.0).contains(&a.confidence));

        let mut r = PatientRecord::new("Q", hour);
        r.age = Some(30);
        let a = score_record(&r, &profile);
        assert!((0.0..=1.0).contains(&a.probability));
    }
}

#[test]
fn test_classify_boundaries() {
    let p = ScoringProfile::default_v1();
    assert_eq!(classify(0.30, 0.9, 1.0, &p), RiskLevel::Moderate);
    assert_eq!(classify(0.2999, 0.9, 1.0, &p), RiskLevel::Low);
    assert_eq!(classify(0.55, 0.9, 1.0, &p), RiskLevel::High);
    assert_eq!(classify(0.75, 0.9, 1.0, &p), RiskLevel::Critical);
    assert_eq!(classify(0.95, 0.49, 1.0, &p), RiskLevel::Uncertain);
    assert_eq!(classify(0.95, 0.9, 0.39, &p), RiskLevel::Uncertain);
}

#[test]
fn test_all_missing_is_uncertain() {
    let a = score_record(&PatientRecord::new("EMPTY", 1), &ScoringProfile::default_v1());
    assert_eq!(a.completeness, 0.0);
    assert_eq!(a.confidence, 0.2);
    assert_eq!(a.risk_level, RiskLevel::Uncertain);
    assert_eq!(a.missing.len(), 6);
}

#[test]
fn test_low_completeness_is_uncertain() {
    let r = PatientRecord::new("P", 1).with("HR", 140.0).with("Lactate", 6.0);
    let a = score_record(&r, &exact());
    assert!(a.completeness < 0.4);
    assert_eq!(a.risk_level, RiskLevel::Uncertain);
    assert!(a.raw_score > 0.4);
}

#[test]
fn test_scoring_is_reproducible() {
    let profile = ScoringProfile::default_v1();
    let r = septic_record("PT-42").with("Lactate", 2.5);
    let a = score_record(&r, &profile);
    let b = score_record(&r, &profile);
    assert_eq!(a, b);
}

#[test]
fn test_noise_is_bounded() {
    let profile = ScoringProfile::default_v1();
    for hour in 1..200u32 {
        let r = PatientRecord::new(format!("P{hour}"), hour);
        let noise = perturbation(&r, &profile);
        assert!(noise.abs() <= profile.noise_amplitude + 1e-12);
    }
    assert_eq!(perturbation(&PatientRecord::new("P", 1), &exact()), 0.0);
}
