//! Value normalization: raw cell value → effective number.
//!
//! Multi-value cells use their first element ("first value wins"); anything
//! that is not a finite number has no effective value. Never fails.
use crate::types::RawValue;

/// Returns the effective numeric value of a cell, or `None` (no value).
///
/// Negative zero is folded into `0.0` so sorting and tie detection agree.
pub fn normalize(raw: &RawValue) -> Option<f64> {
    let scalar = match raw {
        RawValue::List(values) => values.first()?,
        other => other,
    };

    match scalar {
        RawValue::Number(n) if n.is_finite() => Some(if *n == 0.0 { 0.0 } else { *n }),
        // Nested lists, text, booleans, null, NaN, ±inf.
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_numbers() {
        assert_eq!(normalize(&RawValue::Number(42.5)), Some(42.5));
        assert_eq!(normalize(&RawValue::Number(-3.0)), Some(-3.0));
        assert_eq!(normalize(&RawValue::Number(0.0)), Some(0.0));
    }

    #[test]
    fn test_non_finite_rejected() {
        assert_eq!(normalize(&RawValue::Number(f64::NAN)), None);
        assert_eq!(normalize(&RawValue::Number(f64::INFINITY)), None);
        assert_eq!(normalize(&RawValue::Number(f64::NEG_INFINITY)), None);
    }

    #[test]
    fn test_non_numeric_scalars_rejected() {
        assert_eq!(normalize(&RawValue::Null), None);
        assert_eq!(normalize(&RawValue::Text("12".into())), None);
        assert_eq!(normalize(&RawValue::Text("abc".into())), None);
        assert_eq!(normalize(&RawValue::Bool(true)), None);
    }

    #[test]
    fn test_first_value_wins() {
        let raw = RawValue::from(vec![7.0, 100.0, -1.0]);
        assert_eq!(normalize(&raw), Some(7.0));
    }

    #[test]
    fn test_list_first_element_unusable() {
        // Later numeric elements are ignored even if the first is unusable.
        let raw = RawValue::List(vec![RawValue::Null, RawValue::Number(5.0)]);
        assert_eq!(normalize(&raw), None);
        assert_eq!(normalize(&RawValue::List(vec![])), None);
    }

    #[test]
    fn test_nested_list_not_flattened() {
        let raw = RawValue::List(vec![RawValue::from(vec![1.0])]);
        assert_eq!(normalize(&raw), None);
    }

    #[test]
    fn test_negative_zero_folded() {
        let value = normalize(&RawValue::Number(-0.0)).unwrap();
        assert!(value.is_sign_positive());
        assert_eq!(value, 0.0);
    }
}
