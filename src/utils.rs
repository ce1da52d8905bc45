pub fn now_ts() -> f64 {
    let now = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default();
    now.as_secs_f64()
}

/// Tickers and underwriter names are stored uppercase, matching entry forms.
pub fn normalize_code(s: &str) -> String {
    s.trim().to_uppercase()
}

/// Day-offset fields must be finite or absent by the time they reach the
/// aggregation core. NaN/inf from malformed input collapse to None
/// (the neutral "not a number" display state).
pub fn sanitize_day(v: Option<f64>) -> Option<f64> {
    v.filter(|x| x.is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_code_trims_and_uppercases() {
        assert_eq!(normalize_code("  bbri "), "BBRI");
        assert_eq!(normalize_code("GoTo"), "GOTO");
    }

    #[test]
    fn sanitize_day_drops_non_finite() {
        assert_eq!(sanitize_day(Some(1.5)), Some(1.5));
        assert_eq!(sanitize_day(Some(f64::NAN)), None);
        assert_eq!(sanitize_day(Some(f64::INFINITY)), None);
        assert_eq!(sanitize_day(None), None);
    }
}
