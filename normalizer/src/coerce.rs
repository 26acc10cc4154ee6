//! Numeric coercion of parameter values.
//!
//! A missing or empty value is absent. Anything else must parse, otherwise
//! the hit fails with `ValueConversion`.

use std::str::FromStr;

use crate::errors::{NormalizationError, Result};
use crate::raw_hit::RawHit;

fn parse_number<T: FromStr>(
    hit: &RawHit,
    key: &'static str,
    expected: &'static str,
) -> Result<Option<T>> {
    let Some(raw) = hit.non_empty(key) else {
        return Ok(None);
    };

    raw.trim()
        .parse()
        .map(Some)
        .map_err(|_| NormalizationError::ValueConversion {
            key,
            value: raw.to_string(),
            expected,
        })
}

pub fn parse_integer(hit: &RawHit, key: &'static str) -> Result<Option<i64>> {
    parse_number(hit, key, "integer")
}

/// Rejects `NaN` and infinities, which `f64` parsing accepts but a JSON row
/// cannot carry.
pub fn parse_float(hit: &RawHit, key: &'static str) -> Result<Option<f64>> {
    match parse_number::<f64>(hit, key, "float")? {
        Some(value) if !value.is_finite() => Err(NormalizationError::ValueConversion {
            key,
            value: hit.get(key).unwrap_or_default().to_string(),
            expected: "float",
        }),
        value => Ok(value),
    }
}
