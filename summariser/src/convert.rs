use std::num::ParseFloatError;

/// Parse a raw CSV field into a sample value.
///
/// When `nan_as_zero` is set, a `nan` field (in any case) becomes `0.0` instead of a NaN sample.
pub fn parse_raw(raw: &str, nan_as_zero: bool) -> Result<f64, ParseFloatError> {
    let raw = raw.trim();
    if nan_as_zero && raw.eq_ignore_ascii_case("nan") {
        return Ok(0.0);
    }

    raw.parse::<f64>()
}

/// Convert a raw value into the normalized unit described by `unit`.
///
/// The first matching rule wins:
/// - `%` scales a ratio to a percentage
/// - a unit containing `MB` converts bytes to megabytes
/// - a unit containing `Mb` converts bytes to megabits
/// - a unit containing `GB` converts bytes to gigabytes
///
/// Any other unit, including the empty one, leaves the value unchanged.
pub fn convert(value: f64, unit: &str) -> f64 {
    if unit == "%" {
        value * 100.0
    } else if unit.contains("MB") {
        value / 1_000_000.0
    } else if unit.contains("Mb") {
        (value * 8.0) / 1_000_000.0
    } else if unit.contains("GB") {
        value / 1_000_000_000.0
    } else {
        value
    }
}
