#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldGroup {
    Vital,
    Lab,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldDef {
    pub name: &'static str,
    pub label: &'static str,
    pub unit: &'static str,
}

const fn field(name: &'static str, label: &'static str, unit: &'static str) -> FieldDef {
    FieldDef { name, label, unit }
}

const VITAL_FIELDS: &[FieldDef] = &[
    field("HR", "Heart rate", "bpm"),
    field("O2Sat", "Oxygen saturation", "%"),
    field("Temp", "Temperature", "C"),
    field("SBP", "Systolic BP", "mmHg"),
    field("MAP", "Mean arterial pressure", "mmHg"),
    field("DBP", "Diastolic BP", "mmHg"),
    field("Resp", "Respiratory rate", "/min"),
    field("EtCO2", "End-tidal CO2", "mmHg"),
];

const LAB_FIELDS: &[FieldDef] = &[
    field("BaseExcess", "Base excess", "mmol/L"),
    field("HCO3", "Bicarbonate", "mmol/L"),
    field("FiO2", "Fraction of inspired O2", ""),
    field("pH", "pH", ""),
    field("PaCO2", "PaCO2", "mmHg"),
    field("SaO2", "Arterial O2 saturation", "%"),
    field("AST", "AST", "IU/L"),
    field("BUN", "Blood urea nitrogen", "mg/dL"),
    field("Alkalinephos", "Alkaline phosphatase", "IU/L"),
    field("Calcium", "Calcium", "mg/dL"),
    field("Chloride", "Chloride", "mmol/L"),
    field("Creatinine", "Creatinine", "mg/dL"),
    field("Bilirubin_direct", "Direct bilirubin", "mg/dL"),
    field("Glucose", "Glucose", "mg/dL"),
    field("Lactate", "Lactate", "mmol/L"),
    field("Magnesium", "Magnesium", "mmol/dL"),
    field("Phosphate", "Phosphate", "mg/dL"),
    field("Potassium", "Potassium", "mmol/L"),
    field("Bilirubin_total", "Total bilirubin", "mg/dL"),
    field("TroponinI", "Troponin I", "ng/mL"),
    field("Hct", "Hematocrit", "%"),
    field("Hgb", "Hemoglobin", "g/dL"),
    field("PTT", "Partial thromboplastin time", "s"),
    field("WBC", "White blood cells", "10^3/uL"),
    field("Fibrinogen", "Fibrinogen", "mg/dL"),
    field("Platelets", "Platelets", "10^3/uL"),
];

// Parameters where danger lies below the critical bound (hypotension,
// hypoxemia, thrombocytopenia). Every other parameter is critical above it.
const CRITICAL_BELOW: &[&str] = &["SBP", "DBP", "MAP", "O2Sat", "SaO2", "Platelets"];

const COMPLETENESS_CHECKLIST: &[&str] = &["HR", "Temp", "SBP", "Resp", "WBC", "Lactate"];

pub fn vital_fields() -> &'static [FieldDef] {
    VITAL_FIELDS
}

pub fn lab_fields() -> &'static [FieldDef] {
    LAB_FIELDS
}

pub fn completeness_checklist() -> &'static [&'static str] {
    COMPLETENESS_CHECKLIST
}

pub fn is_critical_below(parameter: &str) -> bool {
    CRITICAL_BELOW.contains(&parameter)
}

pub fn field_group(name: &str) -> Option<FieldGroup> {
    if VITAL_FIELDS.iter().any(|f| f.name == name) {
        Some(FieldGroup::Vital)
    } else if LAB_FIELDS.iter().any(|f| f.name == name) {
        Some(FieldGroup::Lab)
    } else {
        None
    }
}

pub fn field_def(name: &str) -> Option<&'static FieldDef> {
    VITAL_FIELDS
        .iter()
        .chain(LAB_FIELDS.iter())
        .find(|f| f.name == name)
}

pub fn field_label(name: &str) -> &str {
    field_def(name).map(|f| f.label).unwrap_or(name)
}
