//! Shared numeric helpers. Scores are clamped before they are reported, so
//! extreme penalties can never push a value outside its documented range.

pub fn clamp(value: f64, lo: f64, hi: f64) -> f64 {
    value.max(lo).min(hi)
}

pub fn clamp01(value: f64) -> f64 {
    clamp(value, 0.0, 1.0)
}

pub fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

pub fn round4(value: f64) -> f64 {
    (value * 10_000.0).round() / 10_000.0
}
