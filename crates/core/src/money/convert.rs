//! Currency conversion logic.
//!
//! CRITICAL: Rounding strategy for multi-currency:
//! - Always fixed-point `Decimal`, never floats
//! - Round half away from zero, matching the amounts already persisted
//!   by upstream systems
//! - Posted amounts carry 2 decimal places, intermediate equivalents 4

use rust_decimal::Decimal;
use rust_decimal::RoundingStrategy;
use thiserror::Error;

/// Decimal places for posted and equivalent amounts.
pub const POSTED_SCALE: u32 = 2;

/// Decimal places for intermediate conversion results.
pub const INTERMEDIATE_SCALE: u32 = 4;

/// Decimal places for stored exchange rates.
pub const RATE_SCALE: u32 = 6;

/// Errors raised by conversion operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConversionError {
    /// Exchange rate must be strictly positive.
    #[error("Exchange rate must be positive, got {0}")]
    InvalidRate(Decimal),

    /// Amounts entering a conversion must be non-negative.
    #[error("Amount must be non-negative, got {0}")]
    NegativeAmount(Decimal),
}

/// Rounds a value to the given number of decimal places, half away from zero.
#[must_use]
pub fn round_amount(value: Decimal, decimal_places: u32) -> Decimal {
    value.round_dp_with_strategy(decimal_places, RoundingStrategy::MidpointAwayFromZero)
}

/// Converts an amount using the given exchange rate, rounded to posted precision.
///
/// # Errors
///
/// Returns `ConversionError::InvalidRate` if `rate <= 0` and
/// `ConversionError::NegativeAmount` if `amount < 0`.
pub fn convert(amount: Decimal, rate: Decimal) -> Result<Decimal, ConversionError> {
    convert_with_scale(amount, rate, POSTED_SCALE)
}

/// Converts an amount using the given exchange rate and decimal precision.
///
/// # Errors
///
/// Returns `ConversionError::InvalidRate` if `rate <= 0` and
/// `ConversionError::NegativeAmount` if `amount < 0`.
pub fn convert_with_scale(
    amount: Decimal,
    rate: Decimal,
    decimal_places: u32,
) -> Result<Decimal, ConversionError> {
    if rate <= Decimal::ZERO {
        return Err(ConversionError::InvalidRate(rate));
    }
    if amount < Decimal::ZERO {
        return Err(ConversionError::NegativeAmount(amount));
    }

    Ok(round_amount(amount * rate, decimal_places))
}

/// Converts loyalty points into a currency value.
///
/// Points DIVIDE by the redemption rate: 3500 points at a rate of 100
/// points-per-unit are worth 35.00, not 350,000.00.
///
/// # Errors
///
/// Returns `ConversionError::InvalidRate` if `redemption_rate <= 0` and
/// `ConversionError::NegativeAmount` if `points < 0`.
pub fn points_value(points: Decimal, redemption_rate: Decimal) -> Result<Decimal, ConversionError> {
    if redemption_rate <= Decimal::ZERO {
        return Err(ConversionError::InvalidRate(redemption_rate));
    }
    if points < Decimal::ZERO {
        return Err(ConversionError::NegativeAmount(points));
    }

    Ok(round_amount(points / redemption_rate, POSTED_SCALE))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_convert_basic() {
        // 100 USD * 15000 = 1,500,000 IDR
        let result = convert(dec!(100), dec!(15000)).unwrap();
        assert_eq!(result, dec!(1500000.00));
    }

    #[test]
    fn test_convert_same_currency() {
        let result = convert(dec!(100.50), Decimal::ONE).unwrap();
        assert_eq!(result, dec!(100.50));
    }

    #[test]
    fn test_convert_rounds_half_up() {
        // 1.005 at 2dp rounds away from zero to 1.01, not banker's 1.00
        let result = convert(dec!(1.005), Decimal::ONE).unwrap();
        assert_eq!(result, dec!(1.01));

        let result = convert(dec!(2.5), Decimal::ONE).unwrap();
        assert_eq!(result, dec!(2.50));

        let result = convert_with_scale(dec!(2.5), Decimal::ONE, 0).unwrap();
        assert_eq!(result, dec!(3));
    }

    #[test]
    fn test_convert_intermediate_scale() {
        // 100 * 1.23456789 = 123.456789 -> 123.4568 at intermediate scale
        let result = convert_with_scale(dec!(100), dec!(1.23456789), INTERMEDIATE_SCALE).unwrap();
        assert_eq!(result, dec!(123.4568));
    }

    #[test]
    fn test_convert_rejects_non_positive_rate() {
        assert_eq!(
            convert(dec!(100), Decimal::ZERO),
            Err(ConversionError::InvalidRate(Decimal::ZERO))
        );
        assert_eq!(
            convert(dec!(100), dec!(-1.5)),
            Err(ConversionError::InvalidRate(dec!(-1.5)))
        );
    }

    #[test]
    fn test_convert_rejects_negative_amount() {
        assert_eq!(
            convert(dec!(-0.01), Decimal::ONE),
            Err(ConversionError::NegativeAmount(dec!(-0.01)))
        );
    }

    #[test]
    fn test_points_value_divides() {
        // 3500 points at 100 points per currency unit = 35.00
        let result = points_value(dec!(3500), dec!(100)).unwrap();
        assert_eq!(result, dec!(35.00));
    }

    #[test]
    fn test_points_value_rejects_zero_rate() {
        assert_eq!(
            points_value(dec!(3500), Decimal::ZERO),
            Err(ConversionError::InvalidRate(Decimal::ZERO))
        );
    }

    #[test]
    fn test_round_amount() {
        assert_eq!(round_amount(dec!(123.456789), 2), dec!(123.46));
        assert_eq!(round_amount(dec!(123.454), 2), dec!(123.45));
        assert_eq!(round_amount(dec!(-1.005), 2), dec!(-1.01));
    }
}
