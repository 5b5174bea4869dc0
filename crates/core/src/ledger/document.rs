//! Commercial documents and the posting contract they share.
//!
//! Every document variant exposes the same contract to the posting rule
//! set: given my state, produce an ordered list of (role, nature, amount)
//! tuples. The variants are a tagged union rather than per-script
//! duplication so new document types extend one match.

use chrono::NaiveDate;
use kontor_shared::types::{AccountId, CompanyId, CustomerId, DocumentId, ProductId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Document lifecycle status.
///
/// Posting is guarded by an atomic draft-to-posted transition; voiding a
/// posted document emits a reversing batch, never an edit in place.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentStatus {
    /// Document is being drafted and can be modified.
    Draft,
    /// Document has been posted to the ledger (immutable).
    Posted,
    /// Document has been voided via a reversing batch (immutable).
    Voided,
}

impl DocumentStatus {
    /// Returns true if the document can be posted.
    #[must_use]
    pub fn can_post(self) -> bool {
        matches!(self, Self::Draft)
    }

    /// Returns true if the document can be voided.
    #[must_use]
    pub fn can_void(self) -> bool {
        matches!(self, Self::Posted)
    }
}

impl std::fmt::Display for DocumentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Draft => write!(f, "draft"),
            Self::Posted => write!(f, "posted"),
            Self::Voided => write!(f, "voided"),
        }
    }
}

/// Transaction type classification stamped on every ledger entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionType {
    /// Sales invoice.
    Invoice,
    /// Customer payment receipt.
    Receipt,
    /// Stock adjustment.
    Adjustment,
    /// General journal entry.
    Journal,
    /// Reversal of a previous batch.
    Reversal,
}

impl std::fmt::Display for TransactionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Invoice => "invoice",
            Self::Receipt => "receipt",
            Self::Adjustment => "adjustment",
            Self::Journal => "journal",
            Self::Reversal => "reversal",
        };
        write!(f, "{name}")
    }
}

/// One invoice line item with its account configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InvoiceLine {
    /// The product sold.
    pub product_id: ProductId,
    /// Quantity sold.
    pub quantity: Decimal,
    /// Moving average cost per unit at posting time.
    pub average_cost: Decimal,
    /// Service products carry no stock and emit no COGS/Inventory pair.
    pub is_service: bool,
    /// Product-level COGS account override.
    pub cogs_account: Option<AccountId>,
    /// Product-level inventory account override.
    pub inventory_account: Option<AccountId>,
    /// Category-level COGS default.
    pub category_cogs_account: Option<AccountId>,
    /// Category-level inventory default.
    pub category_inventory_account: Option<AccountId>,
}

/// Header-level account configuration for a sales invoice.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct InvoiceAccounts {
    /// Document-level receivable fallback.
    pub receivable: Option<AccountId>,
    /// Customer-level receivable default (wins over the document fallback).
    pub customer_receivable: Option<AccountId>,
    /// Income account.
    pub income: Option<AccountId>,
    /// Tax payable account.
    pub tax_payable: Option<AccountId>,
    /// Withholding tax receivable account.
    pub wht_receivable: Option<AccountId>,
    /// Discount allowed account.
    pub discount_allowed: Option<AccountId>,
    /// Cash/deposit account for amounts already paid at posting time.
    pub cash: Option<AccountId>,
}

/// A sales invoice.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SalesInvoice {
    /// Unique identifier.
    pub id: DocumentId,
    /// The company (tenant) this invoice belongs to.
    pub company_id: CompanyId,
    /// The customer billed.
    pub customer_id: CustomerId,
    /// Human-readable document identifier (e.g. "INV-001").
    pub reference_number: String,
    /// Transaction date.
    pub transaction_date: NaiveDate,
    /// Document currency code (ISO 4217).
    pub currency: String,
    /// Exchange rate from document currency to the company base currency.
    pub exchange_rate: Decimal,
    /// Pre-tax subtotal.
    pub subtotal: Decimal,
    /// Tax amount.
    pub tax_amount: Decimal,
    /// Discount amount.
    pub discount_amount: Decimal,
    /// Withholding tax amount.
    pub wht_amount: Decimal,
    /// Amount already paid at posting time.
    pub paid_amount: Decimal,
    /// Line items.
    pub lines: Vec<InvoiceLine>,
    /// Account configuration.
    pub accounts: InvoiceAccounts,
    /// Lifecycle status.
    pub status: DocumentStatus,
}

impl SalesInvoice {
    /// The invoice total: subtotal less discount, plus tax, less WHT.
    #[must_use]
    pub fn total(&self) -> Decimal {
        self.subtotal - self.discount_amount + self.tax_amount - self.wht_amount
    }

    /// The open balance at posting time: total less the amount already paid.
    ///
    /// The receivable entry posts this balance, never the full total.
    #[must_use]
    pub fn balance(&self) -> Decimal {
        self.total() - self.paid_amount
    }
}

/// Header-level account configuration for a receipt.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct ReceiptAccounts {
    /// Cash or bank deposit account.
    pub deposit: Option<AccountId>,
    /// Customer-level receivable default.
    pub customer_receivable: Option<AccountId>,
    /// Document-level receivable fallback.
    pub receivable: Option<AccountId>,
}

/// A customer payment receipt applied against receivables.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Receipt {
    /// Unique identifier.
    pub id: DocumentId,
    /// The company (tenant) this receipt belongs to.
    pub company_id: CompanyId,
    /// The paying customer.
    pub customer_id: CustomerId,
    /// Human-readable document identifier (e.g. "RCV-001").
    pub reference_number: String,
    /// Transaction date.
    pub transaction_date: NaiveDate,
    /// Document currency code (ISO 4217).
    pub currency: String,
    /// Exchange rate from document currency to the company base currency.
    pub exchange_rate: Decimal,
    /// Amount received.
    pub amount: Decimal,
    /// Account configuration.
    pub accounts: ReceiptAccounts,
    /// Lifecycle status.
    pub status: DocumentStatus,
}

/// One stock adjustment line.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdjustmentLine {
    /// The product adjusted.
    pub product_id: ProductId,
    /// Signed quantity change (positive = stock found, negative = shrinkage).
    pub quantity_delta: Decimal,
    /// Moving average cost per unit.
    pub average_cost: Decimal,
    /// Product-level inventory account override.
    pub inventory_account: Option<AccountId>,
    /// Category-level inventory default.
    pub category_inventory_account: Option<AccountId>,
}

/// A stock adjustment document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StockAdjustment {
    /// Unique identifier.
    pub id: DocumentId,
    /// The company (tenant) this adjustment belongs to.
    pub company_id: CompanyId,
    /// Human-readable document identifier (e.g. "ADJ-001").
    pub reference_number: String,
    /// Transaction date.
    pub transaction_date: NaiveDate,
    /// Document currency code (ISO 4217).
    pub currency: String,
    /// Exchange rate from document currency to the company base currency.
    pub exchange_rate: Decimal,
    /// Adjustment lines.
    pub lines: Vec<AdjustmentLine>,
    /// Document-level inventory fallback account.
    pub inventory_account: Option<AccountId>,
    /// Adjustment gain/loss account.
    pub adjustment_account: Option<AccountId>,
    /// Lifecycle status.
    pub status: DocumentStatus,
}

/// One free-form journal line with an explicitly chosen account.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JournalLine {
    /// The account to post to.
    pub account_id: AccountId,
    /// Debit or credit.
    pub nature: super::entry::EntryNature,
    /// Amount in document currency (must be positive).
    pub amount: Decimal,
    /// Optional memo for this line.
    pub memo: Option<String>,
}

/// A general journal entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JournalEntry {
    /// Unique identifier.
    pub id: DocumentId,
    /// The company (tenant) this entry belongs to.
    pub company_id: CompanyId,
    /// Human-readable document identifier (e.g. "JRN-001").
    pub reference_number: String,
    /// Transaction date.
    pub transaction_date: NaiveDate,
    /// Document currency code (ISO 4217).
    pub currency: String,
    /// Exchange rate from document currency to the company base currency.
    pub exchange_rate: Decimal,
    /// Journal lines (must balance).
    pub lines: Vec<JournalLine>,
    /// Lifecycle status.
    pub status: DocumentStatus,
}

/// The source business event behind a posting batch.
///
/// Polymorphic over the capability "produces postings": each variant
/// feeds the same rule-set entry point.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Document {
    /// Sales invoice.
    SalesInvoice(SalesInvoice),
    /// Customer payment receipt.
    Receipt(Receipt),
    /// Stock adjustment.
    StockAdjustment(StockAdjustment),
    /// General journal entry.
    JournalEntry(JournalEntry),
}

impl Document {
    /// The company (tenant) owning this document.
    #[must_use]
    pub fn company_id(&self) -> CompanyId {
        match self {
            Self::SalesInvoice(d) => d.company_id,
            Self::Receipt(d) => d.company_id,
            Self::StockAdjustment(d) => d.company_id,
            Self::JournalEntry(d) => d.company_id,
        }
    }

    /// The document's unique identifier.
    #[must_use]
    pub fn id(&self) -> DocumentId {
        match self {
            Self::SalesInvoice(d) => d.id,
            Self::Receipt(d) => d.id,
            Self::StockAdjustment(d) => d.id,
            Self::JournalEntry(d) => d.id,
        }
    }

    /// The human-readable document identifier.
    #[must_use]
    pub fn reference_number(&self) -> &str {
        match self {
            Self::SalesInvoice(d) => &d.reference_number,
            Self::Receipt(d) => &d.reference_number,
            Self::StockAdjustment(d) => &d.reference_number,
            Self::JournalEntry(d) => &d.reference_number,
        }
    }

    /// The transaction date.
    #[must_use]
    pub fn transaction_date(&self) -> NaiveDate {
        match self {
            Self::SalesInvoice(d) => d.transaction_date,
            Self::Receipt(d) => d.transaction_date,
            Self::StockAdjustment(d) => d.transaction_date,
            Self::JournalEntry(d) => d.transaction_date,
        }
    }

    /// The document currency code.
    #[must_use]
    pub fn currency(&self) -> &str {
        match self {
            Self::SalesInvoice(d) => &d.currency,
            Self::Receipt(d) => &d.currency,
            Self::StockAdjustment(d) => &d.currency,
            Self::JournalEntry(d) => &d.currency,
        }
    }

    /// The exchange rate to the company base currency.
    #[must_use]
    pub fn exchange_rate(&self) -> Decimal {
        match self {
            Self::SalesInvoice(d) => d.exchange_rate,
            Self::Receipt(d) => d.exchange_rate,
            Self::StockAdjustment(d) => d.exchange_rate,
            Self::JournalEntry(d) => d.exchange_rate,
        }
    }

    /// The transaction type stamped on entries from this document.
    #[must_use]
    pub fn transaction_type(&self) -> TransactionType {
        match self {
            Self::SalesInvoice(_) => TransactionType::Invoice,
            Self::Receipt(_) => TransactionType::Receipt,
            Self::StockAdjustment(_) => TransactionType::Adjustment,
            Self::JournalEntry(_) => TransactionType::Journal,
        }
    }

    /// The lifecycle status.
    #[must_use]
    pub fn status(&self) -> DocumentStatus {
        match self {
            Self::SalesInvoice(d) => d.status,
            Self::Receipt(d) => d.status,
            Self::StockAdjustment(d) => d.status,
            Self::JournalEntry(d) => d.status,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_status_transitions() {
        assert!(DocumentStatus::Draft.can_post());
        assert!(!DocumentStatus::Posted.can_post());
        assert!(!DocumentStatus::Voided.can_post());

        assert!(!DocumentStatus::Draft.can_void());
        assert!(DocumentStatus::Posted.can_void());
        assert!(!DocumentStatus::Voided.can_void());
    }

    #[test]
    fn test_invoice_total_and_balance() {
        let invoice = SalesInvoice {
            id: DocumentId::new(),
            company_id: CompanyId::new(),
            customer_id: CustomerId::new(),
            reference_number: "INV-001".to_string(),
            transaction_date: NaiveDate::from_ymd_opt(2026, 3, 1).unwrap(),
            currency: "USD".to_string(),
            exchange_rate: Decimal::ONE,
            subtotal: dec!(100.00),
            tax_amount: dec!(18.00),
            discount_amount: dec!(5.00),
            wht_amount: dec!(2.00),
            paid_amount: dec!(50.00),
            lines: vec![],
            accounts: InvoiceAccounts::default(),
            status: DocumentStatus::Draft,
        };

        // 100 - 5 + 18 - 2 = 111; balance = 111 - 50 = 61
        assert_eq!(invoice.total(), dec!(111.00));
        assert_eq!(invoice.balance(), dec!(61.00));
    }
}
