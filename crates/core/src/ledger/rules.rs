//! Posting rule sets per document type.
//!
//! Each document type maps to a fixed table of (role, nature, amount)
//! lines. Amounts are computed exactly once, here, so verification and
//! persistence can never drift apart. Reversals flip the persisted
//! lines verbatim instead of recomputing from (possibly changed)
//! document state.

use kontor_shared::types::AccountId;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::warn;

use super::document::{
    Document, JournalEntry, Receipt, SalesInvoice, StockAdjustment,
};
use super::entry::EntryNature;
use super::error::PostingError;
use super::resolve::{resolve_account, AccountRole, LineContext};
use crate::money::round_amount;
use crate::money::convert::POSTED_SCALE;

/// One line of a posting batch before persistence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostingLine {
    /// The role this entry plays.
    pub role: AccountRole,
    /// The resolved account.
    pub account_id: AccountId,
    /// Debit or credit.
    pub nature: EntryNature,
    /// Amount in document currency, non-negative, posted precision.
    pub amount: Decimal,
}

impl PostingLine {
    fn new(role: AccountRole, account_id: AccountId, nature: EntryNature, amount: Decimal) -> Self {
        Self {
            role,
            account_id,
            nature,
            amount,
        }
    }
}

/// Builds the ordered posting lines for a document.
///
/// # Errors
///
/// Returns `MissingAccountConfiguration` when a mandatory role cannot be
/// resolved, `NegativeAmount` for negative inputs, and `EmptyBatch` when
/// no line survives (all amounts zero).
pub fn build_entries(document: &Document) -> Result<Vec<PostingLine>, PostingError> {
    let lines = match document {
        Document::SalesInvoice(invoice) => build_invoice_entries(invoice)?,
        Document::Receipt(receipt) => build_receipt_entries(receipt)?,
        Document::StockAdjustment(adjustment) => build_adjustment_entries(adjustment)?,
        Document::JournalEntry(journal) => build_journal_entries(journal)?,
    };

    if lines.is_empty() {
        return Err(PostingError::EmptyBatch);
    }
    Ok(lines)
}

/// Builds the reversing lines for a posted batch.
///
/// Every line keeps its role, account, and amount byte-identical, with
/// the nature flipped. Amounts are never re-derived from document state.
#[must_use]
pub fn build_reversal(lines: &[PostingLine]) -> Vec<PostingLine> {
    lines
        .iter()
        .map(|line| PostingLine {
            role: line.role,
            account_id: line.account_id,
            nature: line.nature.flipped(),
            amount: line.amount,
        })
        .collect()
}

fn non_negative(value: Decimal) -> Result<Decimal, PostingError> {
    if value < Decimal::ZERO {
        return Err(PostingError::NegativeAmount(value));
    }
    Ok(round_amount(value, POSTED_SCALE))
}

/// Resolves a role that must produce an account, whatever its default
/// optionality. Used for mandatory roles and for tax-when-present.
fn resolve_required(role: AccountRole, context: &LineContext) -> Result<AccountId, PostingError> {
    resolve_account(role, context)?.ok_or(PostingError::MissingAccountConfiguration {
        role,
        line: context.line,
    })
}

/// Sales invoice rule set.
///
/// Per non-service line: Debit COGS / Credit Inventory at quantity x
/// average cost. Then Debit Receivable for the OPEN BALANCE (total less
/// paid), Credit Income for the pre-tax subtotal, Credit Tax Payable,
/// Debit WHT Receivable, Debit Discount Allowed, and Debit Cash for any
/// amount already applied. Tax is mandatory when a tax amount exists;
/// WHT and discount are skipped when unconfigured.
fn build_invoice_entries(invoice: &SalesInvoice) -> Result<Vec<PostingLine>, PostingError> {
    let subtotal = non_negative(invoice.subtotal)?;
    let tax = non_negative(invoice.tax_amount)?;
    let discount = non_negative(invoice.discount_amount)?;
    let wht = non_negative(invoice.wht_amount)?;
    let paid = non_negative(invoice.paid_amount)?;

    let total = subtotal - discount + tax - wht;
    let balance = non_negative(total - paid)?;

    let mut lines = Vec::new();

    // COGS / Inventory pair per stocked line item.
    for (index, item) in invoice.lines.iter().enumerate() {
        #[allow(clippy::cast_possible_truncation)]
        let line_no = (index + 1) as u32;

        if item.is_service {
            continue;
        }

        let quantity = non_negative(item.quantity)?;
        let average_cost = non_negative(item.average_cost)?;
        let cost = round_amount(quantity * average_cost, POSTED_SCALE);
        if cost.is_zero() {
            warn!(line = line_no, "zero-cost line item, skipping COGS pair");
            continue;
        }

        let cogs_context = LineContext {
            line: line_no,
            item_override: item.cogs_account,
            category_default: item.category_cogs_account,
            ..LineContext::default()
        };
        let cogs = resolve_required(AccountRole::Cogs, &cogs_context)?;

        let inventory_context = LineContext {
            line: line_no,
            item_override: item.inventory_account,
            category_default: item.category_inventory_account,
            ..LineContext::default()
        };
        let inventory = resolve_required(AccountRole::Inventory, &inventory_context)?;

        lines.push(PostingLine::new(
            AccountRole::Cogs,
            cogs,
            EntryNature::Debit,
            cost,
        ));
        lines.push(PostingLine::new(
            AccountRole::Inventory,
            inventory,
            EntryNature::Credit,
            cost,
        ));
    }

    // Receivable posts the open balance, never the full total.
    if balance.is_zero() {
        warn!("invoice fully paid at posting time, no receivable entry");
    } else {
        let context = LineContext {
            customer_default: invoice.accounts.customer_receivable,
            document_fallback: invoice.accounts.receivable,
            ..LineContext::default()
        };
        let receivable = resolve_required(AccountRole::Receivable, &context)?;
        lines.push(PostingLine::new(
            AccountRole::Receivable,
            receivable,
            EntryNature::Debit,
            balance,
        ));
    }

    // Income is the pre-tax subtotal; tax posts separately below.
    if subtotal.is_zero() {
        warn!("zero subtotal, no income entry");
    } else {
        let context = LineContext::header(invoice.accounts.income);
        let income = resolve_required(AccountRole::Income, &context)?;
        lines.push(PostingLine::new(
            AccountRole::Income,
            income,
            EntryNature::Credit,
            subtotal,
        ));
    }

    // Tax is mandatory-if-present: a tax amount with no account is a
    // configuration gap, not a soft skip.
    if tax > Decimal::ZERO {
        let context = LineContext::header(invoice.accounts.tax_payable);
        let account = resolve_required(AccountRole::TaxPayable, &context)?;
        lines.push(PostingLine::new(
            AccountRole::TaxPayable,
            account,
            EntryNature::Credit,
            tax,
        ));
    }

    if wht > Decimal::ZERO {
        let context = LineContext::header(invoice.accounts.wht_receivable);
        if let Some(account) = resolve_account(AccountRole::WhtReceivable, &context)? {
            lines.push(PostingLine::new(
                AccountRole::WhtReceivable,
                account,
                EntryNature::Debit,
                wht,
            ));
        }
    }

    if discount > Decimal::ZERO {
        let context = LineContext::header(invoice.accounts.discount_allowed);
        if let Some(account) = resolve_account(AccountRole::DiscountAllowed, &context)? {
            lines.push(PostingLine::new(
                AccountRole::DiscountAllowed,
                account,
                EntryNature::Debit,
                discount,
            ));
        }
    }

    // Payment already applied at posting time lands in cash so the batch
    // balances on its own.
    if paid > Decimal::ZERO {
        let context = LineContext::header(invoice.accounts.cash);
        let cash = resolve_required(AccountRole::Cash, &context)?;
        lines.push(PostingLine::new(
            AccountRole::Cash,
            cash,
            EntryNature::Debit,
            paid,
        ));
    }

    Ok(lines)
}

/// Receipt rule set: Debit Cash, Credit Receivable for the amount applied.
fn build_receipt_entries(receipt: &Receipt) -> Result<Vec<PostingLine>, PostingError> {
    let amount = non_negative(receipt.amount)?;
    if amount.is_zero() {
        warn!("zero-amount receipt produces no entries");
        return Ok(Vec::new());
    }

    let deposit_context = LineContext::header(receipt.accounts.deposit);
    let deposit = resolve_required(AccountRole::Cash, &deposit_context)?;

    let receivable_context = LineContext {
        customer_default: receipt.accounts.customer_receivable,
        document_fallback: receipt.accounts.receivable,
        ..LineContext::default()
    };
    let receivable = resolve_required(AccountRole::Receivable, &receivable_context)?;

    Ok(vec![
        PostingLine::new(AccountRole::Cash, deposit, EntryNature::Debit, amount),
        PostingLine::new(
            AccountRole::Receivable,
            receivable,
            EntryNature::Credit,
            amount,
        ),
    ])
}

/// Stock adjustment rule set.
///
/// Stock found: Debit Inventory / Credit Adjustment. Shrinkage: Debit
/// Adjustment / Credit Inventory. Value is |quantity delta| x average cost.
fn build_adjustment_entries(
    adjustment: &StockAdjustment,
) -> Result<Vec<PostingLine>, PostingError> {
    let mut lines = Vec::new();

    for (index, item) in adjustment.lines.iter().enumerate() {
        #[allow(clippy::cast_possible_truncation)]
        let line_no = (index + 1) as u32;

        let average_cost = non_negative(item.average_cost)?;
        let value = round_amount(item.quantity_delta.abs() * average_cost, POSTED_SCALE);
        if value.is_zero() {
            warn!(line = line_no, "zero-value adjustment line, skipping");
            continue;
        }

        let inventory_context = LineContext {
            line: line_no,
            item_override: item.inventory_account,
            category_default: item.category_inventory_account,
            document_fallback: adjustment.inventory_account,
            ..LineContext::default()
        };
        let inventory = resolve_required(AccountRole::Inventory, &inventory_context)?;

        let adjustment_context = LineContext {
            line: line_no,
            document_fallback: adjustment.adjustment_account,
            ..LineContext::default()
        };
        let gain_loss = resolve_required(AccountRole::InventoryAdjustment, &adjustment_context)?;

        if item.quantity_delta > Decimal::ZERO {
            lines.push(PostingLine::new(
                AccountRole::Inventory,
                inventory,
                EntryNature::Debit,
                value,
            ));
            lines.push(PostingLine::new(
                AccountRole::InventoryAdjustment,
                gain_loss,
                EntryNature::Credit,
                value,
            ));
        } else {
            lines.push(PostingLine::new(
                AccountRole::InventoryAdjustment,
                gain_loss,
                EntryNature::Debit,
                value,
            ));
            lines.push(PostingLine::new(
                AccountRole::Inventory,
                inventory,
                EntryNature::Credit,
                value,
            ));
        }
    }

    Ok(lines)
}

/// Journal rule set: lines pass through with their chosen accounts.
///
/// Balance is enforced by the writer's pre-commit verification, exactly
/// as for generated rule sets.
fn build_journal_entries(journal: &JournalEntry) -> Result<Vec<PostingLine>, PostingError> {
    let mut lines = Vec::new();

    for line in &journal.lines {
        let amount = non_negative(line.amount)?;
        if amount.is_zero() {
            warn!("zero-amount journal line, skipping");
            continue;
        }
        lines.push(PostingLine::new(
            AccountRole::Direct,
            line.account_id,
            line.nature,
            amount,
        ));
    }

    Ok(lines)
}
