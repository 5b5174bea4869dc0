//! Posting error types.
//!
//! This module defines all errors that can occur while building or
//! verifying a posting batch: configuration errors, balance invariant
//! errors, conversion errors, and document state errors.

use rust_decimal::Decimal;
use thiserror::Error;

use super::document::DocumentStatus;
use super::resolve::AccountRole;
use crate::money::ConversionError;

/// Errors that can occur during posting operations.
#[derive(Debug, Error)]
pub enum PostingError {
    // ========== Configuration Errors ==========
    /// A mandatory account role could not be resolved.
    ///
    /// Never silently defaulted; the triggering action must fail with the
    /// role and line identified.
    #[error("No account configured for role {role} on line {line}")]
    MissingAccountConfiguration {
        /// The role that failed to resolve.
        role: AccountRole,
        /// 1-based document line, 0 for header-level roles.
        line: u32,
    },

    // ========== Balance Invariant Errors ==========
    /// Batch debits and credits do not balance within tolerance.
    #[error("Batch is not balanced. Debit: {debit}, Credit: {credit}, Delta: {delta}")]
    UnbalancedBatch {
        /// Total debit amount.
        debit: Decimal,
        /// Total credit amount.
        credit: Decimal,
        /// Absolute difference.
        delta: Decimal,
    },

    /// A batch must contain at least one entry.
    #[error("Batch must contain at least one entry")]
    EmptyBatch,

    /// Entry amounts must not be negative.
    #[error("Entry amount cannot be negative: {0}")]
    NegativeAmount(Decimal),

    // ========== Conversion Errors ==========
    /// Currency conversion failed (non-positive rate or negative amount).
    #[error(transparent)]
    Conversion(#[from] ConversionError),

    // ========== Document State Errors ==========
    /// The document is not in a state that allows posting.
    #[error("Document cannot be posted from status {0}")]
    NotPostable(DocumentStatus),

    /// The document is not in a state that allows voiding.
    #[error("Document cannot be voided from status {0}")]
    NotVoidable(DocumentStatus),
}

impl PostingError {
    /// Returns the error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::MissingAccountConfiguration { .. } => "MISSING_ACCOUNT_CONFIGURATION",
            Self::UnbalancedBatch { .. } => "UNBALANCED_BATCH",
            Self::EmptyBatch => "EMPTY_BATCH",
            Self::NegativeAmount(_) => "NEGATIVE_AMOUNT",
            Self::Conversion(ConversionError::InvalidRate(_)) => "INVALID_RATE",
            Self::Conversion(ConversionError::NegativeAmount(_)) => "NEGATIVE_AMOUNT",
            Self::NotPostable(_) => "NOT_POSTABLE",
            Self::NotVoidable(_) => "NOT_VOIDABLE",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_error_codes() {
        assert_eq!(
            PostingError::MissingAccountConfiguration {
                role: AccountRole::Cogs,
                line: 2,
            }
            .error_code(),
            "MISSING_ACCOUNT_CONFIGURATION"
        );
        assert_eq!(
            PostingError::UnbalancedBatch {
                debit: dec!(100.00),
                credit: dec!(50.00),
                delta: dec!(50.00),
            }
            .error_code(),
            "UNBALANCED_BATCH"
        );
        assert_eq!(
            PostingError::Conversion(ConversionError::InvalidRate(Decimal::ZERO)).error_code(),
            "INVALID_RATE"
        );
    }

    #[test]
    fn test_error_display_names_role_and_line() {
        let err = PostingError::MissingAccountConfiguration {
            role: AccountRole::Inventory,
            line: 3,
        };
        assert_eq!(
            err.to_string(),
            "No account configured for role inventory on line 3"
        );
    }

    #[test]
    fn test_unbalanced_display_reports_totals() {
        let err = PostingError::UnbalancedBatch {
            debit: dec!(118.00),
            credit: dec!(100.00),
            delta: dec!(18.00),
        };
        assert_eq!(
            err.to_string(),
            "Batch is not balanced. Debit: 118.00, Credit: 100.00, Delta: 18.00"
        );
    }
}
