use crate::model::record::PatientRecord;
use crate::model::schema::is_critical_below;
use crate::model::thresholds::ThresholdConfig;
use crate::model::violations::{Severity, Violation, ViolationKind};

// Compares every enabled, present parameter against its bounds. Order
// follows the config; a value may produce both a warning and a critical
// violation.
pub fn check_thresholds(record: &PatientRecord, config: &ThresholdConfig) -> Vec<Violation> {
    let mut out = Vec::new();

    for (parameter, bound) in config.iter() {
        if !bound.enabled {
            continue;
        }
        let Some(value) = record.value(parameter) else {
            continue;
        };

        if let Some(min) = bound.min {
            if value < min {
                out.push(violation(parameter, value, min, ViolationKind::Min));
            }
        }
        if let Some(max) = bound.max {
            if value > max {
                out.push(violation(parameter, value, max, ViolationKind::Max));
            }
        }
        if let Some(critical) = bound.critical {
            let breached = if is_critical_below(parameter) {
                value < critical
            } else {
                value > critical
            };
            if breached {
                out.push(violation(parameter, value, critical, ViolationKind::Critical));
            }
        }
    }

    out
}

fn violation(parameter: &str, value: f64, bound: f64, kind: ViolationKind) -> Violation {
    let severity = match kind {
        ViolationKind::Critical => Severity::Critical,
        ViolationKind::Min | ViolationKind::Max => Severity::Warning,
    };
    Violation {
        parameter: parameter.to_string(),
        value,
        bound,
        kind,
        severity,
    }
}

#[cfg(test)]
#[path = "../../tests/src_inline/pipeline/stage3_thresholds.rs"]
mod tests;
