pub mod alerts;
pub mod json;
pub mod text;

pub fn format_f64_4(v: f64) -> String {
    format!("{:.4}", v)
}

pub fn format_percent(v: f64) -> String {
    format!("{:.1}%", v * 100.0)
}

pub fn format_opt_percent(v: Option<f64>) -> String {
    match v {
        Some(v) => format_percent(v),
        None => "n/a".to_string(),
    }
}

pub fn quantile_indexed(values: &[f64], p: f64) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    let n = sorted.len();
    let idx = ((n - 1) as f64 * p).ceil() as usize;
    sorted[idx]
}

pub fn median(values: &[f64]) -> f64 {
    quantile_indexed(values, 0.5)
}

pub fn p90(values: &[f64]) -> f64 {
    quantile_indexed(values, 0.90)
}

#[cfg(test)]
#[path = "../../tests/src_inline/report/mod.rs"]
mod tests;
