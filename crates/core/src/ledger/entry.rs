//! Ledger entry domain types.

use chrono::NaiveDate;
use kontor_shared::types::{AccountId, BatchId, CompanyId, LedgerEntryId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::document::TransactionType;

/// The side of the ledger an entry posts to.
///
/// In double-entry bookkeeping:
/// - Debits increase asset/expense accounts, decrease liability/equity/revenue accounts
/// - Credits decrease asset/expense accounts, increase liability/equity/revenue accounts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryNature {
    /// Debit entry.
    Debit,
    /// Credit entry.
    Credit,
}

impl EntryNature {
    /// Returns the opposite side.
    #[must_use]
    pub const fn flipped(self) -> Self {
        match self {
            Self::Debit => Self::Credit,
            Self::Credit => Self::Debit,
        }
    }
}

impl std::fmt::Display for EntryNature {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Debit => write!(f, "debit"),
            Self::Credit => write!(f, "credit"),
        }
    }
}

impl std::str::FromStr for EntryNature {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "debit" => Ok(Self::Debit),
            "credit" => Ok(Self::Credit),
            other => Err(format!("Unknown entry nature: {other}")),
        }
    }
}

/// A single ledger entry in its persisted shape.
///
/// Entries sharing one `batch_id` form a posting batch: one atomic
/// economic event whose debits and credits must balance. Rows are never
/// updated after creation; corrections arrive as new reversing batches.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerEntry {
    /// Unique identifier for this entry.
    pub id: LedgerEntryId,
    /// The posting batch this entry belongs to.
    pub batch_id: BatchId,
    /// The company (tenant) this entry belongs to.
    pub company_id: CompanyId,
    /// The account affected by this entry.
    pub account_id: AccountId,
    /// Denormalized account code, for reporting without joins.
    pub account_code: String,
    /// Denormalized account name.
    pub account_name: String,
    /// Whether this is a debit or credit.
    pub nature: EntryNature,
    /// Amount in the document currency (non-negative, 2 decimal places).
    pub amount: Decimal,
    /// Exchange rate from document currency to the company base currency.
    pub exchange_rate: Decimal,
    /// Debit amount in base currency (zero when `nature` is credit).
    pub equivalent_debit_amount: Decimal,
    /// Credit amount in base currency (zero when `nature` is debit).
    pub equivalent_credit_amount: Decimal,
    /// Human-readable document identifier; groups entries, not unique.
    pub reference_number: String,
    /// The kind of document that produced this entry.
    pub transaction_type: TransactionType,
    /// The document's transaction date.
    pub transaction_date: NaiveDate,
}

impl LedgerEntry {
    /// Returns the signed amount (positive for debit, negative for credit).
    #[must_use]
    pub fn signed_amount(&self) -> Decimal {
        match self.nature {
            EntryNature::Debit => self.amount,
            EntryNature::Credit => -self.amount,
        }
    }

    /// Returns the base-currency amount on this entry's side.
    #[must_use]
    pub fn equivalent_amount(&self) -> Decimal {
        match self.nature {
            EntryNature::Debit => self.equivalent_debit_amount,
            EntryNature::Credit => self.equivalent_credit_amount,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_nature_flipped() {
        assert_eq!(EntryNature::Debit.flipped(), EntryNature::Credit);
        assert_eq!(EntryNature::Credit.flipped(), EntryNature::Debit);
    }

    #[test]
    fn test_nature_round_trip() {
        assert_eq!(
            EntryNature::from_str(&EntryNature::Debit.to_string()).unwrap(),
            EntryNature::Debit
        );
        assert_eq!(
            EntryNature::from_str(&EntryNature::Credit.to_string()).unwrap(),
            EntryNature::Credit
        );
        assert!(EntryNature::from_str("DEBIT").is_err());
    }
}
