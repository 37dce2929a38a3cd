use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read threshold config {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid threshold config {path}: {source}")]
    Json {
        path: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("threshold config lists unknown parameter: {0}")]
    UnknownParameter(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ThresholdBound {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub critical: Option<f64>,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

fn default_enabled() -> bool {
    true
}

impl ThresholdBound {
    pub fn new(min: Option<f64>, max: Option<f64>, critical: Option<f64>) -> Self {
        Self {
            min,
            max,
            critical,
            enabled: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThresholdEntry {
    pub parameter: String,
    #[serde(flatten)]
    pub bound: ThresholdBound,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThresholdConfig {
    pub entries: Vec<ThresholdEntry>,
}

impl ThresholdConfig {
    pub fn empty() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    pub fn default_v1() -> Self {
        let mut cfg = Self::empty();
        cfg.set("HR", ThresholdBound::new(Some(60.0), Some(100.0), Some(130.0)));
        cfg.set("Temp", ThresholdBound::new(Some(36.0), Some(38.0), Some(39.5)));
        cfg.set("SBP", ThresholdBound::new(Some(90.0), Some(140.0), Some(80.0)));
        cfg.set("MAP", ThresholdBound::new(Some(65.0), Some(110.0), Some(60.0)));
        cfg.set("DBP", ThresholdBound::new(Some(60.0), Some(90.0), Some(50.0)));
        cfg.set("Resp", ThresholdBound::new(Some(12.0), Some(20.0), Some(30.0)));
        cfg.set("O2Sat", ThresholdBound::new(Some(92.0), None, Some(88.0)));
        cfg.set("Lactate", ThresholdBound::new(None, Some(2.0), Some(4.0)));
        cfg.set("WBC", ThresholdBound::new(Some(4.0), Some(12.0), Some(20.0)));
        cfg.set("Creatinine", ThresholdBound::new(Some(0.6), Some(1.3), Some(3.5)));
        cfg.set("Platelets", ThresholdBound::new(Some(150.0), Some(450.0), Some(50.0)));
        cfg.set("Bilirubin_total", ThresholdBound::new(None, Some(1.2), Some(6.0)));
        cfg.set("pH", ThresholdBound::new(Some(7.35), Some(7.45), None));
        cfg
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let cfg: ThresholdConfig =
            serde_json::from_str(&raw).map_err(|source| ConfigError::Json {
                path: path.display().to_string(),
                source,
            })?;
        for entry in &cfg.entries {
            if crate::model::schema::field_group(&entry.parameter).is_none() {
                return Err(ConfigError::UnknownParameter(entry.parameter.clone()));
            }
        }
        Ok(cfg)
    }

    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    pub fn get(&self, parameter: &str) -> Option<&ThresholdBound> {
        self.entries
            .iter()
            .find(|e| e.parameter == parameter)
            .map(|e| &e.bound)
    }

    pub fn set(&mut self, parameter: &str, bound: ThresholdBound) {
        match self.entries.iter_mut().find(|e| e.parameter == parameter) {
            Some(entry) => entry.bound = bound,
            None => self.entries.push(ThresholdEntry {
                parameter: parameter.to_string(),
                bound,
            }),
        }
    }

    pub fn set_enabled(&mut self, parameter: &str, enabled: bool) -> bool {
        match self.entries.iter_mut().find(|e| e.parameter == parameter) {
            Some(entry) => {
                entry.bound.enabled = enabled;
                true
            }
            None => false,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ThresholdBound)> {
        self.entries.iter().map(|e| (e.parameter.as_str(), &e.bound))
    }
}

impl Default for ThresholdConfig {
    fn default() -> Self {
        Self::default_v1()
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoringProfile {
    pub base_confidence: f64,
    pub missing_penalty: f64,
    pub confidence_floor: f64,
    pub confidence_ceiling: f64,
    pub noise_amplitude: f64,
    pub seed: u64,
    pub uncertain_confidence: f64,
    pub uncertain_completeness: f64,
}

impl ScoringProfile {
    pub fn default_v1() -> Self {
        Self {
            base_confidence: 0.85,
            missing_penalty: 0.1,
            confidence_floor: 0.2,
            confidence_ceiling: 0.95,
            noise_amplitude: 0.05,
            seed: 2019,
            uncertain_confidence: 0.5,
            uncertain_completeness: 0.4,
        }
    }
}

impl Default for ScoringProfile {
    fn default() -> Self {
        Self::default_v1()
    }
}

#[cfg(test)]
#[path = "../../tests/src_inline/model/thresholds.rs"]
mod tests;
