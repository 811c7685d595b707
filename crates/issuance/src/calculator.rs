//! Holograms-required calculator (one hologram per bottle).

use serde_json::Value;

/// Holograms needed for `cases` cases of `bottles` bottles each.
pub fn holograms_required(bottles: u64, cases: u64) -> u64 {
    bottles.saturating_mul(cases)
}

/// Read a count leniently: integers, non-negative floats (truncated) and
/// numeric strings are accepted. `None` means "not a count".
pub fn parse_count(value: &Value) -> Option<u64> {
    match value {
        Value::Null => Some(0),
        Value::Bool(b) => Some(u64::from(*b)),
        Value::Number(n) => n
            .as_u64()
            .or_else(|| n.as_f64().filter(|f| f.is_finite() && *f >= 0.0).map(|f| f as u64)),
        Value::String(s) if s.trim().is_empty() => Some(0),
        Value::String(s) => s.trim().parse::<u64>().ok(),
        _ => None,
    }
}

/// Calculator over raw JSON fields. Missing or non-numeric input yields 0.
pub fn calculate(bottles: Option<&Value>, cases: Option<&Value>) -> u64 {
    let bottles = bottles.map_or(Some(0), parse_count);
    let cases = cases.map_or(Some(0), parse_count);
    match (bottles, cases) {
        (Some(b), Some(c)) => holograms_required(b, c),
        _ => 0,
    }
}
