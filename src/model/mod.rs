pub mod analysis;
pub mod record;
pub mod risk;
pub mod schema;
pub mod thresholds;
pub mod violations;

pub fn clamp01(x: f64) -> f64 {
    if x.is_nan() {
        0.0
    } else if x < 0.0 {
        0.0
    } else if x > 1.0 {
        1.0
    } else {
        x
    }
}
