use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::model::risk::{RiskAssessment, RiskLevel};
use crate::model::violations::Violation;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Priority {
    Uncertain,
    Critical,
    High,
    Routine,
}

impl Priority {
    pub fn from_level(level: RiskLevel) -> Self {
        match level {
            RiskLevel::Uncertain => Priority::Uncertain,
            RiskLevel::Critical => Priority::Critical,
            RiskLevel::High => Priority::High,
            RiskLevel::Low | RiskLevel::Moderate => Priority::Routine,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Priority::Uncertain => "UNCERTAIN",
            Priority::Critical => "CRITICAL",
            Priority::High => "HIGH",
            Priority::Routine => "ROUTINE",
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct AnalysisReport {
    pub patient_id: String,
    pub hour: u32,
    pub assessment: RiskAssessment,
    pub violations: Vec<Violation>,
    pub priority: Priority,
    pub findings: Vec<String>,
    pub recommendations: Vec<String>,
    pub treatment_plan: Vec<String>,
    pub follow_up: Vec<String>,
    pub generated_at: DateTime<Utc>,
}

impl AnalysisReport {
    pub fn critical_violations(&self) -> impl Iterator<Item = &Violation> {
        self.violations.iter().filter(|v| v.is_critical())
    }
}
