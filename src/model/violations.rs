use serde::Serialize;

use crate::model::schema::{field_def, is_critical_below};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Warning,
    Critical,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ViolationKind {
    Min,
    Max,
    Critical,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Violation {
    pub parameter: String,
    pub value: f64,
    pub bound: f64,
    pub kind: ViolationKind,
    pub severity: Severity,
}

impl Violation {
    pub fn is_critical(&self) -> bool {
        self.severity == Severity::Critical
    }

    pub fn describe(&self) -> String {
        let (label, unit) = match field_def(&self.parameter) {
            Some(def) => (def.label, def.unit),
            None => (self.parameter.as_str(), ""),
        };
        let relation = match self.kind {
            ViolationKind::Min => "below minimum",
            ViolationKind::Max => "above maximum",
            ViolationKind::Critical if is_critical_below(&self.parameter) => {
                "below critical threshold"
            }
            ViolationKind::Critical => "above critical threshold",
        };
        let value = if unit.is_empty() {
            format_value(self.value)
        } else {
            format!("{} {}", format_value(self.value), unit)
        };
        format!(
            "{} {} {} {}",
            label,
            value,
            relation,
            format_value(self.bound)
        )
    }
}

pub fn format_value(v: f64) -> String {
    if v.fract() == 0.0 && v.abs() < 1e9 {
        format!("{}", v as i64)
    } else {
        format!("{:.2}", v)
    }
}
