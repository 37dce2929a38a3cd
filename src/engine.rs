use std::cell::Cell;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use chrono::Utc;
use thiserror::Error;

use crate::model::analysis::AnalysisReport;
use crate::model::record::PatientRecord;
use crate::model::risk::RiskAssessment;
use crate::model::thresholds::{ScoringProfile, ThresholdConfig};
use crate::model::violations::Violation;
use crate::pipeline::stage2_score::score_record;
use crate::pipeline::stage3_thresholds::check_thresholds;
use crate::pipeline::stage4_assemble::build_report;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum EngineError {
    #[error("model not trained: score at least one record before requesting a report")]
    NotTrained,
    #[error("scoring cancelled after {processed} record(s)")]
    Cancelled { processed: usize },
    #[error("unknown patient: {0}")]
    UnknownPatient(String),
}

#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }
}

#[derive(Debug)]
pub struct SepsisEngine {
    profile: ScoringProfile,
    thresholds: ThresholdConfig,
    scored: Cell<usize>,
}

impl SepsisEngine {
    pub fn new(profile: ScoringProfile, thresholds: ThresholdConfig) -> Self {
        Self {
            profile,
            thresholds,
            scored: Cell::new(0),
        }
    }

    pub fn profile(&self) -> &ScoringProfile {
        &self.profile
    }

    pub fn thresholds(&self) -> &ThresholdConfig {
        &self.thresholds
    }

    pub fn thresholds_mut(&mut self) -> &mut ThresholdConfig {
        &mut self.thresholds
    }

    pub fn is_ready(&self) -> bool {
        self.scored.get() > 0
    }

    pub fn scored_count(&self) -> usize {
        self.scored.get()
    }

    pub fn score(&self, record: &PatientRecord) -> RiskAssessment {
        let assessment = score_record(record, &self.profile);
        self.scored.set(self.scored.get() + 1);
        assessment
    }

    pub fn score_all(
        &self,
        records: &[PatientRecord],
        cancel: &CancelToken,
    ) -> Result<Vec<RiskAssessment>, EngineError> {
        let mut out = Vec::with_capacity(records.len());
        for (idx, record) in records.iter().enumerate() {
            if cancel.is_cancelled() {
                tracing::info!(processed = idx, "scoring superseded; stopping");
                return Err(EngineError::Cancelled { processed: idx });
            }
            out.push(self.score(record));
            if (idx + 1) % 10_000 == 0 {
                tracing::debug!(processed = idx + 1, total = records.len(), "scoring");
            }
        }
        Ok(out)
    }

    pub fn check(&self, record: &PatientRecord) -> Vec<Violation> {
        check_thresholds(record, &self.thresholds)
    }

    pub fn assemble(
        &self,
        record: &PatientRecord,
        patient_id: &str,
    ) -> Result<AnalysisReport, EngineError> {
        if !self.is_ready() {
            return Err(EngineError::NotTrained);
        }
        let assessment = self.score(record);
        let violations = self.check(record);
        Ok(build_report(
            record,
            patient_id,
            assessment,
            violations,
            Utc::now(),
        ))
    }
}

#[cfg(test)]
#[path = "../tests/src_inline/engine.rs"]
mod tests;
