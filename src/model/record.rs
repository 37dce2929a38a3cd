use serde::Serialize;

use crate::model::schema::{FieldDef, lab_fields, vital_fields};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Gender {
    M,
    F,
}

/// Fixed-schema set of optional numeric measurements. `None` is missing,
/// never zero.
#[derive(Debug, Clone, PartialEq)]
pub struct Measurements {
    schema: &'static [FieldDef],
    values: Vec<Option<f64>>,
}

impl Measurements {
    pub fn empty(schema: &'static [FieldDef]) -> Self {
        Self {
            schema,
            values: vec![None; schema.len()],
        }
    }

    pub fn vitals() -> Self {
        Self::empty(vital_fields())
    }

    pub fn labs() -> Self {
        Self::empty(lab_fields())
    }

    fn index_of(&self, name: &str) -> Option<usize> {
        self.schema.iter().position(|f| f.name == name)
    }

    pub fn get(&self, name: &str) -> Option<f64> {
        self.index_of(name).and_then(|idx| self.values[idx])
    }

    pub fn set(&mut self, name: &str, value: Option<f64>) -> bool {
        match self.index_of(name) {
            Some(idx) => {
                self.values[idx] = value;
                true
            }
            None => false,
        }
    }

    pub fn present(&self) -> usize {
        self.values.iter().filter(|v| v.is_some()).count()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PatientRecord {
    pub patient_id: String,
    pub hour: u32,
    pub age: Option<u32>,
    pub gender: Option<Gender>,
    pub unit1: Option<bool>,
    pub unit2: Option<bool>,
    pub hosp_adm_time: Option<f64>,
    pub iculos: Option<f64>,
    pub sepsis_label: Option<u8>,
    pub vitals: Measurements,
    pub labs: Measurements,
}

impl PatientRecord {
    pub fn new(patient_id: impl Into<String>, hour: u32) -> Self {
        Self {
            patient_id: patient_id.into(),
            hour: hour.max(1),
            age: None,
            gender: None,
            unit1: None,
            unit2: None,
            hosp_adm_time: None,
            iculos: None,
            sepsis_label: None,
            vitals: Measurements::vitals(),
            labs: Measurements::labs(),
        }
    }

    pub fn value(&self, name: &str) -> Option<f64> {
        self.vitals.get(name).or_else(|| self.labs.get(name))
    }

    pub fn set_value(&mut self, name: &str, value: Option<f64>) -> bool {
        self.vitals.set(name, value) || self.labs.set(name, value)
    }

    pub fn with(mut self, name: &str, value: f64) -> Self {
        self.set_value(name, Some(value));
        self
    }
}
