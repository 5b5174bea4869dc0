//! Exchange rate repository for currency conversion database operations.

use chrono::NaiveDate;
use kontor_core::money::{RateLookup, RateLookupMethod};
use kontor_shared::types::CompanyId;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter,
    QueryOrder, Set,
};
use uuid::Uuid;

use crate::entities::exchange_rates;

/// Error types for exchange rate operations.
#[derive(Debug, thiserror::Error)]
pub enum ExchangeRateError {
    /// Rate must be positive.
    #[error("Exchange rate must be positive")]
    NonPositiveRate,

    /// Currencies must be different.
    #[error("From and to currencies must be different")]
    SameCurrency,

    /// Exchange rate not found.
    #[error("No exchange rate found for {0}/{1} on or before {2}")]
    RateNotFound(String, String, NaiveDate),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

/// Input for creating or updating an exchange rate.
#[derive(Debug, Clone)]
pub struct CreateExchangeRateInput {
    /// The company (tenant) the rate belongs to.
    pub company_id: CompanyId,
    /// Source currency code.
    pub from_currency: String,
    /// Target currency code.
    pub to_currency: String,
    /// Exchange rate (from_currency * rate = to_currency).
    pub rate: Decimal,
    /// Effective date for this rate.
    pub effective_date: NaiveDate,
}

/// Validates a rate input before touching the database.
pub fn validate_input(
    rate: Decimal,
    from_currency: &str,
    to_currency: &str,
) -> Result<(), ExchangeRateError> {
    if rate <= Decimal::ZERO {
        return Err(ExchangeRateError::NonPositiveRate);
    }
    if from_currency == to_currency {
        return Err(ExchangeRateError::SameCurrency);
    }
    Ok(())
}

/// Exchange rate repository for CRUD operations.
#[derive(Debug, Clone)]
pub struct ExchangeRateRepository {
    db: DatabaseConnection,
}

impl ExchangeRateRepository {
    /// Creates a new exchange rate repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Creates or updates an exchange rate (upsert behavior).
    ///
    /// One rate exists per (company, pair, effective date); a second
    /// write for the same key overwrites the rate value.
    ///
    /// # Errors
    ///
    /// Returns an error if the rate is not positive or the currencies
    /// are the same.
    pub async fn create_or_update_rate(
        &self,
        input: CreateExchangeRateInput,
    ) -> Result<exchange_rates::Model, ExchangeRateError> {
        validate_input(input.rate, &input.from_currency, &input.to_currency)?;

        let existing = exchange_rates::Entity::find()
            .filter(exchange_rates::Column::CompanyId.eq(input.company_id.into_inner()))
            .filter(exchange_rates::Column::FromCurrency.eq(&input.from_currency))
            .filter(exchange_rates::Column::ToCurrency.eq(&input.to_currency))
            .filter(exchange_rates::Column::EffectiveDate.eq(input.effective_date))
            .one(&self.db)
            .await?;

        if let Some(existing_rate) = existing {
            let mut active: exchange_rates::ActiveModel = existing_rate.into();
            active.rate = Set(input.rate);
            Ok(active.update(&self.db).await?)
        } else {
            let rate = exchange_rates::ActiveModel {
                id: Set(Uuid::new_v4()),
                company_id: Set(input.company_id.into_inner()),
                from_currency: Set(input.from_currency),
                to_currency: Set(input.to_currency),
                rate: Set(input.rate),
                effective_date: Set(input.effective_date),
                created_at: Set(chrono::Utc::now().into()),
            };
            Ok(rate.insert(&self.db).await?)
        }
    }

    /// Finds an exchange rate for a currency pair on or before a date.
    ///
    /// Lookup priority:
    /// 1. Same currency = rate of 1
    /// 2. Direct rate (from_currency -> to_currency), most recent first
    /// 3. Inverse rate (to_currency -> from_currency, then inverted)
    ///
    /// # Errors
    ///
    /// Returns `RateNotFound` when neither direction has a usable rate.
    pub async fn find_rate(
        &self,
        company_id: CompanyId,
        from_currency: &str,
        to_currency: &str,
        date: NaiveDate,
    ) -> Result<RateLookup, ExchangeRateError> {
        if from_currency == to_currency {
            return Ok(RateLookup {
                rate: Decimal::ONE,
                lookup_method: RateLookupMethod::Direct,
                effective_date: date,
            });
        }

        if let Some(direct) = self
            .find_direct_rate(company_id, from_currency, to_currency, date)
            .await?
        {
            return Ok(RateLookup {
                rate: direct.rate,
                lookup_method: RateLookupMethod::Direct,
                effective_date: direct.effective_date,
            });
        }

        if let Some(inverse) = self
            .find_direct_rate(company_id, to_currency, from_currency, date)
            .await?
        {
            return Ok(RateLookup {
                rate: Decimal::ONE / inverse.rate,
                lookup_method: RateLookupMethod::Inverse,
                effective_date: inverse.effective_date,
            });
        }

        Err(ExchangeRateError::RateNotFound(
            from_currency.to_string(),
            to_currency.to_string(),
            date,
        ))
    }

    /// Finds the most recent direct rate on or before the date.
    async fn find_direct_rate(
        &self,
        company_id: CompanyId,
        from_currency: &str,
        to_currency: &str,
        date: NaiveDate,
    ) -> Result<Option<exchange_rates::Model>, ExchangeRateError> {
        Ok(exchange_rates::Entity::find()
            .filter(exchange_rates::Column::CompanyId.eq(company_id.into_inner()))
            .filter(exchange_rates::Column::FromCurrency.eq(from_currency))
            .filter(exchange_rates::Column::ToCurrency.eq(to_currency))
            .filter(exchange_rates::Column::EffectiveDate.lte(date))
            .order_by_desc(exchange_rates::Column::EffectiveDate)
            .one(&self.db)
            .await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_validate_input_positive_rate() {
        assert!(validate_input(dec!(1.25), "EUR", "USD").is_ok());
    }

    #[test]
    fn test_validate_input_rejects_zero_rate() {
        assert!(matches!(
            validate_input(Decimal::ZERO, "EUR", "USD"),
            Err(ExchangeRateError::NonPositiveRate)
        ));
    }

    #[test]
    fn test_validate_input_rejects_negative_rate() {
        assert!(matches!(
            validate_input(dec!(-0.5), "EUR", "USD"),
            Err(ExchangeRateError::NonPositiveRate)
        ));
    }

    #[test]
    fn test_validate_input_rejects_same_currency() {
        assert!(matches!(
            validate_input(dec!(1), "USD", "USD"),
            Err(ExchangeRateError::SameCurrency)
        ));
    }
}
