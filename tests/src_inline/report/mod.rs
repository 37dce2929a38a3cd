use super::*;

#[test]
fn test_quantiles() {
    let v = vec![5.0, 1.0, 4.0, 2.0, 3.0];
    assert_eq!(median(&v), 3.0);
    assert_eq!(p90(&v), 5.0);
    assert_eq!(median(&[]), 0.0);
    assert_eq!(quantile_indexed(&[0.25], 0.9), 0.25);
}

#[test]
fn test_formatting() {
    assert_eq!(format_f64_4(0.123456), "0.1235");
    assert_eq!(format_percent(0.5), "50.0%");
    assert_eq!(format_opt_percent(None), "n/a");
    assert_eq!(format_opt_percent(Some(0.125)), "12.5%");
}
