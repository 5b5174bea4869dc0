//! Multi-currency handling and exchange rates.

pub mod convert;
pub mod exchange;

#[cfg(test)]
mod props;

pub use convert::{convert, convert_with_scale, points_value, round_amount, ConversionError};
pub use exchange::{ExchangeRate, RateLookup, RateLookupMethod, RateTable};
