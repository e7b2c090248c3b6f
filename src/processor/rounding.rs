use rust_decimal::{
    Decimal, RoundingStrategy,
    prelude::{FromPrimitive, ToPrimitive},
};
use std::str::FromStr;

/// Rounds to 2 decimal places, halves away from zero.
///
/// Rounding works on the shortest decimal form of `value` (what `{}` prints),
/// so `1.005` rounds to `1.01` even though its binary value is slightly below.
/// Non-finite values are returned unchanged.
pub fn round2(value: f64) -> f64 {
    let decimal = match Decimal::from_str(&value.to_string()) {
        Ok(decimal) => decimal,
        // Magnitudes beyond Decimal's 28 digits of scale
        Err(_) => match Decimal::from_f64(value) {
            Some(decimal) => decimal,
            None => return value,
        },
    };

    decimal
        .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
        .to_f64()
        .unwrap_or(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_halves_round_away_from_zero() {
        assert_eq!(round2(0.125), 0.13);
        assert_eq!(round2(0.375), 0.38);
        assert_eq!(round2(-0.125), -0.13);
    }

    #[test]
    fn test_decimal_halves_round_up() {
        // Binary values of these sit just below the half.
        assert_eq!(round2(1.005), 1.01);
        assert_eq!(round2(0.285), 0.29);
        assert_eq!(round2(2.675), 2.68);
        assert_eq!(round2(1.0049), 1.0);
    }

    #[test]
    fn test_plain_values() {
        assert_eq!(round2(20.0), 20.0);
        assert_eq!(round2(33.333333), 33.33);
        assert_eq!(round2(66.666666), 66.67);
        assert_eq!(round2(0.0), 0.0);
    }

    #[test]
    fn test_non_finite_values_pass_through() {
        assert!(round2(f64::NAN).is_nan());
        assert_eq!(round2(f64::INFINITY), f64::INFINITY);
    }
}
