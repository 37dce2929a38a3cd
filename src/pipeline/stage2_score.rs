use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::model::clamp01;
use crate::model::record::PatientRecord;
use crate::model::risk::{Contributor, RiskAssessment, RiskLevel};
use crate::model::schema::completeness_checklist;
use crate::model::thresholds::ScoringProfile;

struct Rule {
    name: &'static str,
    fires: fn(&PatientRecord) -> Option<f64>,
}

fn above(record: &PatientRecord, name: &str, limit: f64, weight: f64) -> Option<f64> {
    record.value(name).filter(|v| *v > limit).map(|_| weight)
}

fn below(record: &PatientRecord, name: &str, limit: f64, weight: f64) -> Option<f64> {
    record.value(name).filter(|v| *v < limit).map(|_| weight)
}

fn outside(record: &PatientRecord, name: &str, low: f64, high: f64, weight: f64) -> Option<f64> {
    record
        .value(name)
        .filter(|v| *v < low || *v > high)
        .map(|_| weight)
}

const RULES: &[Rule] = &[
    Rule {
        name: "tachycardia",
        fires: |r| above(r, "HR", 90.0, 0.15),
    },
    Rule {
        name: "abnormal_temperature",
        fires: |r| outside(r, "Temp", 36.0, 38.0, 0.15),
    },
    Rule {
        name: "tachypnea",
        fires: |r| above(r, "Resp", 22.0, 0.15),
    },
    Rule {
        name: "hypotension",
        fires: |r| below(r, "SBP", 100.0, 0.20),
    },
    Rule {
        name: "low_map",
        fires: |r| below(r, "MAP", 65.0, 0.15),
    },
    Rule {
        name: "hypoxemia",
        fires: |r| below(r, "O2Sat", 92.0, 0.10),
    },
    Rule {
        name: "abnormal_wbc",
        fires: |r| outside(r, "WBC", 4.0, 12.0, 0.15),
    },
    Rule {
        name: "hyperlactatemia",
        fires: |r| above(r, "Lactate", 4.0, 0.35).or_else(|| above(r, "Lactate", 2.0, 0.20)),
    },
    Rule {
        name: "renal_dysfunction",
        fires: |r| above(r, "Creatinine", 2.0, 0.10),
    },
    Rule {
        name: "thrombocytopenia",
        fires: |r| below(r, "Platelets", 100.0, 0.10),
    },
    Rule {
        name: "hyperbilirubinemia",
        fires: |r| above(r, "Bilirubin_total", 2.0, 0.10),
    },
    Rule {
        name: "advanced_age",
        fires: |r| r.age.filter(|a| *a > 65).map(|_| 0.05),
    },
];

pub fn score_record(record: &PatientRecord, profile: &ScoringProfile) -> RiskAssessment {
    let mut risk_score = 0.0f64;
    let mut contributors = Vec::new();
    for rule in RULES {
        if let Some(weight) = (rule.fires)(record) {
            risk_score += weight;
            contributors.push(Contributor {
                rule: rule.name,
                weight,
            });
        }
    }

    let checklist = completeness_checklist();
    let mut present = 0usize;
    let mut uncertainty_penalty = 0.0f64;
    let mut missing = Vec::new();
    for &field in checklist {
        if record.value(field).is_some() {
            present += 1;
        } else {
            uncertainty_penalty += profile.missing_penalty;
            missing.push(field);
        }
    }
    let completeness = present as f64 / checklist.len() as f64;

    let confidence = ((profile.base_confidence - uncertainty_penalty) * completeness)
        .clamp(profile.confidence_floor, profile.confidence_ceiling);

    let raw_score = clamp01(risk_score);
    let probability = clamp01(raw_score + perturbation(record, profile));
    let risk_level = classify(probability, confidence, completeness, profile);

    RiskAssessment {
        probability,
        confidence,
        completeness,
        risk_level,
        raw_score,
        contributors,
        missing,
    }
}

/// Ordered, first match wins. Lower bounds are inclusive: 0.30 is MODERATE.
pub fn classify(
    risk_score: f64,
    confidence: f64,
    completeness: f64,
    profile: &ScoringProfile,
) -> RiskLevel {
    if confidence < profile.uncertain_confidence || completeness < profile.uncertain_completeness
    {
        RiskLevel::Uncertain
    } else if risk_score < 0.30 {
        RiskLevel::Low
    } else if risk_score < 0.55 {
        RiskLevel::Moderate
    } else if risk_score < 0.75 {
        RiskLevel::High
    } else {
        RiskLevel::Critical
    }
}

/// Bounded noise in `[-noise_amplitude, noise_amplitude]`, reproducible for a
/// given seed, patient and hour.
pub fn perturbation(record: &PatientRecord, profile: &ScoringProfile) -> f64 {
    let amplitude = profile.noise_amplitude.abs();
    if amplitude == 0.0 {
        return 0.0;
    }
    let mut hasher = Fnv64::new();
    hasher.update(record.patient_id.as_bytes());
    hasher.update(&record.hour.to_le_bytes());
    let mut rng = StdRng::seed_from_u64(hasher.finish() ^ profile.seed);
    rng.gen_range(-amplitude..=amplitude)
}

struct Fnv64 {
    hash: u64,
}

impl Fnv64 {
    fn new() -> Self {
        Self {
            hash: 0xcbf29ce484222325,
        }
    }

    fn update(&mut self, data: &[u8]) {
        let mut h = self.hash;
        for &b in data {
            h ^= b as u64;
            h = h.wrapping_mul(0x100000001b3);
        }
        self.hash = h;
    }

    fn finish(&self) -> u64 {
        self.hash
    }
}

#[cfg(test)]
#[path = "../../tests/src_inline/pipeline/stage2_score.rs"]
mod tests;
