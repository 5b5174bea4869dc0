//! `SeaORM` active enums mapping the PostgreSQL enum types.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Account classification (mirrors the `account_category` enum).
#[derive(Debug, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "account_category")]
#[serde(rename_all = "lowercase")]
pub enum AccountCategory {
    /// Assets (debit-normal).
    #[sea_orm(string_value = "asset")]
    Asset,
    /// Liabilities (credit-normal).
    #[sea_orm(string_value = "liability")]
    Liability,
    /// Equity (credit-normal).
    #[sea_orm(string_value = "equity")]
    Equity,
    /// Revenue (credit-normal).
    #[sea_orm(string_value = "revenue")]
    Revenue,
    /// Expenses (debit-normal).
    #[sea_orm(string_value = "expense")]
    Expense,
}

impl From<kontor_core::ledger::AccountCategory> for AccountCategory {
    fn from(value: kontor_core::ledger::AccountCategory) -> Self {
        use kontor_core::ledger::AccountCategory as Core;
        match value {
            Core::Asset => Self::Asset,
            Core::Liability => Self::Liability,
            Core::Equity => Self::Equity,
            Core::Revenue => Self::Revenue,
            Core::Expense => Self::Expense,
        }
    }
}

impl From<AccountCategory> for kontor_core::ledger::AccountCategory {
    fn from(value: AccountCategory) -> Self {
        match value {
            AccountCategory::Asset => Self::Asset,
            AccountCategory::Liability => Self::Liability,
            AccountCategory::Equity => Self::Equity,
            AccountCategory::Revenue => Self::Revenue,
            AccountCategory::Expense => Self::Expense,
        }
    }
}

/// Entry side (mirrors the `account_nature` enum).
#[derive(Debug, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "account_nature")]
#[serde(rename_all = "lowercase")]
pub enum AccountNature {
    /// Debit entry.
    #[sea_orm(string_value = "debit")]
    Debit,
    /// Credit entry.
    #[sea_orm(string_value = "credit")]
    Credit,
}

impl From<kontor_core::ledger::EntryNature> for AccountNature {
    fn from(value: kontor_core::ledger::EntryNature) -> Self {
        match value {
            kontor_core::ledger::EntryNature::Debit => Self::Debit,
            kontor_core::ledger::EntryNature::Credit => Self::Credit,
        }
    }
}

impl From<AccountNature> for kontor_core::ledger::EntryNature {
    fn from(value: AccountNature) -> Self {
        match value {
            AccountNature::Debit => Self::Debit,
            AccountNature::Credit => Self::Credit,
        }
    }
}

/// Document lifecycle status (mirrors the `document_status` enum).
#[derive(Debug, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "document_status")]
#[serde(rename_all = "lowercase")]
pub enum DocumentStatus {
    /// Document is being drafted.
    #[sea_orm(string_value = "draft")]
    Draft,
    /// Document has been posted to the ledger.
    #[sea_orm(string_value = "posted")]
    Posted,
    /// Document has been voided via a reversing batch.
    #[sea_orm(string_value = "voided")]
    Voided,
}

/// Transaction type stamped on entries (mirrors the `transaction_type` enum).
#[derive(Debug, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "transaction_type")]
#[serde(rename_all = "snake_case")]
pub enum TransactionType {
    /// Sales invoice.
    #[sea_orm(string_value = "invoice")]
    Invoice,
    /// Customer payment receipt.
    #[sea_orm(string_value = "receipt")]
    Receipt,
    /// Stock adjustment.
    #[sea_orm(string_value = "adjustment")]
    Adjustment,
    /// General journal entry.
    #[sea_orm(string_value = "journal")]
    Journal,
    /// Reversal of a previous batch.
    #[sea_orm(string_value = "reversal")]
    Reversal,
}

impl From<kontor_core::ledger::TransactionType> for TransactionType {
    fn from(value: kontor_core::ledger::TransactionType) -> Self {
        use kontor_core::ledger::TransactionType as Core;
        match value {
            Core::Invoice => Self::Invoice,
            Core::Receipt => Self::Receipt,
            Core::Adjustment => Self::Adjustment,
            Core::Journal => Self::Journal,
            Core::Reversal => Self::Reversal,
        }
    }
}

impl From<TransactionType> for kontor_core::ledger::TransactionType {
    fn from(value: TransactionType) -> Self {
        match value {
            TransactionType::Invoice => Self::Invoice,
            TransactionType::Receipt => Self::Receipt,
            TransactionType::Adjustment => Self::Adjustment,
            TransactionType::Journal => Self::Journal,
            TransactionType::Reversal => Self::Reversal,
        }
    }
}
