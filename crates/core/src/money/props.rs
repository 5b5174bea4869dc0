//! Property-based tests for currency conversion.

use proptest::prelude::*;
use rust_decimal::Decimal;

use super::convert::{convert, convert_with_scale, points_value, round_amount, POSTED_SCALE};

/// Strategy for a non-negative 2dp amount.
fn amount_strategy() -> impl Strategy<Value = Decimal> {
    (0i64..100_000_00).prop_map(|cents| Decimal::new(cents, 2))
}

/// Strategy for a positive exchange rate with up to 6 decimal places.
fn rate_strategy() -> impl Strategy<Value = Decimal> {
    (1i64..100_000_000).prop_map(|micros| Decimal::new(micros, 6))
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    /// Property: conversion round-trip.
    ///
    /// *For any* amount x and rate r > 0, converting forward and back
    /// with the inverse rate recovers x within the rounding error bound
    /// of the two half-up roundings involved.
    #[test]
    fn prop_conversion_round_trips(
        amount in amount_strategy(),
        rate in rate_strategy(),
    ) {
        let forward = convert(amount, rate).unwrap();
        let back = convert(forward, Decimal::ONE / rate).unwrap();

        // Each rounding moves the value at most half a cent; the first
        // error is scaled by 1/r on the way back.
        let half_cent = Decimal::new(5, 3);
        let bound = round_amount(half_cent / rate, POSTED_SCALE) + half_cent + half_cent;
        prop_assert!(
            (back - amount).abs() <= bound,
            "round trip drifted: {} -> {} -> {} (bound {})",
            amount,
            forward,
            back,
            bound
        );
    }

    /// Property: conversion by a rate of one is identity for 2dp inputs.
    #[test]
    fn prop_identity_rate(amount in amount_strategy()) {
        prop_assert_eq!(convert(amount, Decimal::ONE).unwrap(), amount);
    }

    /// Property: converted amounts never exceed the requested scale.
    #[test]
    fn prop_result_scale_bounded(
        amount in amount_strategy(),
        rate in rate_strategy(),
        scale in 0u32..6,
    ) {
        let result = convert_with_scale(amount, rate, scale).unwrap();
        prop_assert!(result.scale() <= scale);
    }

    /// Property: conversion is monotone in the amount.
    #[test]
    fn prop_monotone_in_amount(
        a in amount_strategy(),
        b in amount_strategy(),
        rate in rate_strategy(),
    ) {
        let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
        let lo_converted = convert(lo, rate).unwrap();
        let hi_converted = convert(hi, rate).unwrap();
        prop_assert!(lo_converted <= hi_converted);
    }

    /// Property: rounding is idempotent.
    #[test]
    fn prop_rounding_idempotent(amount in amount_strategy(), scale in 0u32..6) {
        let once = round_amount(amount, scale);
        prop_assert_eq!(round_amount(once, scale), once);
    }

    /// Property: points divide by the redemption rate, so the value never
    /// exceeds the points themselves for rates >= 1.
    #[test]
    fn prop_points_value_bounded(points in amount_strategy(), rate in 1i64..10_000) {
        let rate = Decimal::from(rate);
        let value = points_value(points, rate).unwrap();
        prop_assert!(value <= points + Decimal::new(5, 3));
    }
}
