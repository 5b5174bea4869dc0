//! Exchange rate types and lookup.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::convert::ConversionError;

/// Exchange rate between two currencies.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExchangeRate {
    /// Source currency code (ISO 4217).
    pub from_currency: String,
    /// Target currency code (ISO 4217).
    pub to_currency: String,
    /// Exchange rate (1 from_currency = rate to_currency).
    pub rate: Decimal,
    /// Date this rate is effective.
    pub effective_date: NaiveDate,
}

impl ExchangeRate {
    /// Creates a new exchange rate.
    #[must_use]
    pub const fn new(
        from_currency: String,
        to_currency: String,
        rate: Decimal,
        effective_date: NaiveDate,
    ) -> Self {
        Self {
            from_currency,
            to_currency,
            rate,
            effective_date,
        }
    }

    /// Returns the inverse rate.
    #[must_use]
    pub fn inverse(&self) -> Self {
        Self {
            from_currency: self.to_currency.clone(),
            to_currency: self.from_currency.clone(),
            rate: Decimal::ONE / self.rate,
            effective_date: self.effective_date,
        }
    }
}

/// How an exchange rate was obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateLookupMethod {
    /// Direct rate found (from_currency -> to_currency).
    Direct,
    /// Inverse rate calculated (to_currency -> from_currency, then inverted).
    Inverse,
}

/// Result of an exchange rate lookup.
#[derive(Debug, Clone)]
pub struct RateLookup {
    /// The exchange rate.
    pub rate: Decimal,
    /// How the rate was obtained.
    pub lookup_method: RateLookupMethod,
    /// The effective date of the rate used.
    pub effective_date: NaiveDate,
}

/// In-memory table of exchange rates with on-or-before date lookup.
///
/// Rates are looked up by the most recent effective date at or before the
/// transaction date. A missing direct rate falls back to inverting the
/// opposite pair.
#[derive(Debug, Clone, Default)]
pub struct RateTable {
    rates: Vec<ExchangeRate>,
}

impl RateTable {
    /// Creates an empty rate table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a rate to the table.
    ///
    /// # Errors
    ///
    /// Returns `ConversionError::InvalidRate` if the rate is not positive.
    pub fn insert(&mut self, rate: ExchangeRate) -> Result<(), ConversionError> {
        if rate.rate <= Decimal::ZERO {
            return Err(ConversionError::InvalidRate(rate.rate));
        }
        self.rates.push(rate);
        Ok(())
    }

    /// Finds the rate for a currency pair effective on or before a date.
    ///
    /// Lookup priority:
    /// 1. Same currency = rate of 1
    /// 2. Direct rate (from_currency -> to_currency), newest first
    /// 3. Inverse rate (to_currency -> from_currency, then inverted)
    #[must_use]
    pub fn find_rate(&self, from: &str, to: &str, date: NaiveDate) -> Option<RateLookup> {
        if from == to {
            return Some(RateLookup {
                rate: Decimal::ONE,
                lookup_method: RateLookupMethod::Direct,
                effective_date: date,
            });
        }

        if let Some(direct) = self.find_direct(from, to, date) {
            return Some(RateLookup {
                rate: direct.rate,
                lookup_method: RateLookupMethod::Direct,
                effective_date: direct.effective_date,
            });
        }

        if let Some(opposite) = self.find_direct(to, from, date) {
            return Some(RateLookup {
                rate: Decimal::ONE / opposite.rate,
                lookup_method: RateLookupMethod::Inverse,
                effective_date: opposite.effective_date,
            });
        }

        None
    }

    /// Finds the most recent direct rate on or before the date.
    fn find_direct(&self, from: &str, to: &str, date: NaiveDate) -> Option<&ExchangeRate> {
        self.rates
            .iter()
            .filter(|r| {
                r.from_currency == from && r.to_currency == to && r.effective_date <= date
            })
            .max_by_key(|r| r.effective_date)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn eur_usd(rate: Decimal, effective: NaiveDate) -> ExchangeRate {
        ExchangeRate::new("EUR".to_string(), "USD".to_string(), rate, effective)
    }

    #[test]
    fn test_same_currency_rate_is_one() {
        let table = RateTable::new();
        let lookup = table.find_rate("USD", "USD", date(2026, 1, 15)).unwrap();
        assert_eq!(lookup.rate, Decimal::ONE);
        assert_eq!(lookup.lookup_method, RateLookupMethod::Direct);
    }

    #[test]
    fn test_nearest_effective_date_wins() {
        let mut table = RateTable::new();
        table.insert(eur_usd(dec!(1.05), date(2026, 1, 1))).unwrap();
        table.insert(eur_usd(dec!(1.10), date(2026, 1, 10))).unwrap();
        table.insert(eur_usd(dec!(1.20), date(2026, 2, 1))).unwrap();

        // Jan 15: the Jan 10 rate applies, not Jan 1 and not the future Feb 1
        let lookup = table.find_rate("EUR", "USD", date(2026, 1, 15)).unwrap();
        assert_eq!(lookup.rate, dec!(1.10));
        assert_eq!(lookup.effective_date, date(2026, 1, 10));
    }

    #[test]
    fn test_rate_exactly_on_date() {
        let mut table = RateTable::new();
        table.insert(eur_usd(dec!(1.10), date(2026, 1, 10))).unwrap();

        let lookup = table.find_rate("EUR", "USD", date(2026, 1, 10)).unwrap();
        assert_eq!(lookup.rate, dec!(1.10));
    }

    #[test]
    fn test_no_rate_before_date() {
        let mut table = RateTable::new();
        table.insert(eur_usd(dec!(1.10), date(2026, 1, 10))).unwrap();

        assert!(table.find_rate("EUR", "USD", date(2026, 1, 9)).is_none());
    }

    #[test]
    fn test_inverse_fallback() {
        let mut table = RateTable::new();
        table.insert(eur_usd(dec!(1.25), date(2026, 1, 1))).unwrap();

        let lookup = table.find_rate("USD", "EUR", date(2026, 1, 15)).unwrap();
        assert_eq!(lookup.lookup_method, RateLookupMethod::Inverse);
        assert_eq!(lookup.rate, Decimal::ONE / dec!(1.25));
    }

    #[test]
    fn test_insert_rejects_non_positive_rate() {
        let mut table = RateTable::new();
        let result = table.insert(eur_usd(Decimal::ZERO, date(2026, 1, 1)));
        assert_eq!(result, Err(ConversionError::InvalidRate(Decimal::ZERO)));
    }

    #[test]
    fn test_inverse_round_trips() {
        let rate = eur_usd(dec!(1.25), date(2026, 1, 1));
        let inverse = rate.inverse();
        assert_eq!(inverse.from_currency, "USD");
        assert_eq!(inverse.to_currency, "EUR");
        assert_eq!(inverse.rate * rate.rate, Decimal::ONE);
    }
}
