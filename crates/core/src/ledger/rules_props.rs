//! Property-based tests for posting rule sets.

use chrono::NaiveDate;
use kontor_shared::types::{AccountId, CompanyId, CustomerId, DocumentId, ProductId};
use proptest::prelude::*;
use rust_decimal::Decimal;

use super::document::{Document, DocumentStatus, InvoiceAccounts, InvoiceLine, SalesInvoice};
use super::resolve::AccountRole;
use super::rules::{build_entries, build_reversal};
use super::verify::{check_receivable_consistency, verify};

/// Strategy for a fully configured invoice.
///
/// Discount and WHT are bounded below the subtotal and the paid amount
/// below the total, so every generated document is postable.
fn invoice_strategy() -> impl Strategy<Value = SalesInvoice> {
    (1_00i64..100_000_00).prop_flat_map(|subtotal| {
        (
            Just(subtotal),
            0..=subtotal / 5,
            0..=subtotal / 2,
            0..=subtotal / 10,
        )
            .prop_flat_map(|(subtotal, tax, discount, wht)| {
                let total = subtotal - discount + tax - wht;
                (
                    Just((subtotal, tax, discount, wht)),
                    0..=total,
                    prop::collection::vec((1i64..100, 0i64..500_00, any::<bool>()), 0..4),
                )
            })
            .prop_map(|((subtotal, tax, discount, wht), paid, items)| SalesInvoice {
                id: DocumentId::new(),
                company_id: CompanyId::new(),
                customer_id: CustomerId::new(),
                reference_number: "INV-PROP".to_string(),
                transaction_date: NaiveDate::from_ymd_opt(2026, 1, 15).unwrap(),
                currency: "USD".to_string(),
                exchange_rate: Decimal::ONE,
                subtotal: Decimal::new(subtotal, 2),
                tax_amount: Decimal::new(tax, 2),
                discount_amount: Decimal::new(discount, 2),
                wht_amount: Decimal::new(wht, 2),
                paid_amount: Decimal::new(paid, 2),
                lines: items
                    .into_iter()
                    .map(|(quantity, cost_cents, is_service)| InvoiceLine {
                        product_id: ProductId::new(),
                        quantity: Decimal::from(quantity),
                        average_cost: Decimal::new(cost_cents, 2),
                        is_service,
                        cogs_account: Some(AccountId::new()),
                        inventory_account: Some(AccountId::new()),
                        category_cogs_account: None,
                        category_inventory_account: None,
                    })
                    .collect(),
                accounts: InvoiceAccounts {
                    receivable: Some(AccountId::new()),
                    customer_receivable: None,
                    income: Some(AccountId::new()),
                    tax_payable: Some(AccountId::new()),
                    wht_receivable: Some(AccountId::new()),
                    discount_allowed: Some(AccountId::new()),
                    cash: Some(AccountId::new()),
                },
                status: DocumentStatus::Draft,
            })
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// Property: every generated batch balances.
    ///
    /// *For any* fully configured invoice, the rule set SHALL emit lines
    /// whose debits equal credits exactly.
    #[test]
    fn prop_invoice_batches_balance(invoice in invoice_strategy()) {
        let lines = build_entries(&Document::SalesInvoice(invoice)).unwrap();
        let report = verify(&lines);

        prop_assert!(report.balanced);
        prop_assert_eq!(report.delta, Decimal::ZERO);
    }

    /// Property: all emitted amounts are non-negative.
    #[test]
    fn prop_amounts_never_negative(invoice in invoice_strategy()) {
        let lines = build_entries(&Document::SalesInvoice(invoice)).unwrap();
        for line in &lines {
            prop_assert!(line.amount >= Decimal::ZERO);
        }
    }

    /// Property: the posted receivable always satisfies the component
    /// formula (income - discount + tax - wht - cash applied).
    #[test]
    fn prop_receivable_consistent(invoice in invoice_strategy()) {
        let lines = build_entries(&Document::SalesInvoice(invoice)).unwrap();
        prop_assert_eq!(check_receivable_consistency(&lines), None);
    }

    /// Property: reversal symmetry.
    ///
    /// *For any* batch, every line has exactly one counterpart in the
    /// reversal on the same account with opposite nature and identical
    /// amount, and a batch merged with its reversal nets to zero.
    #[test]
    fn prop_reversal_symmetry(invoice in invoice_strategy()) {
        let original = build_entries(&Document::SalesInvoice(invoice)).unwrap();
        let reversal = build_reversal(&original);

        prop_assert_eq!(original.len(), reversal.len());
        for (orig, rev) in original.iter().zip(&reversal) {
            prop_assert_eq!(orig.account_id, rev.account_id);
            prop_assert_eq!(orig.role, rev.role);
            prop_assert_eq!(orig.amount, rev.amount);
            prop_assert_eq!(orig.nature.flipped(), rev.nature);
        }

        let merged: Vec<_> = original.iter().chain(&reversal).cloned().collect();
        let report = verify(&merged);
        prop_assert_eq!(report.total_debit, report.total_credit);
    }

    /// Property: one COGS line per non-zero stocked item, none for services.
    #[test]
    fn prop_cogs_lines_match_stocked_items(invoice in invoice_strategy()) {
        let nonzero_stocked = invoice
            .lines
            .iter()
            .filter(|l| !l.is_service && !(l.quantity * l.average_cost).is_zero())
            .count();
        let lines = build_entries(&Document::SalesInvoice(invoice)).unwrap();

        let cogs_count = lines.iter().filter(|l| l.role == AccountRole::Cogs).count();
        let inventory_count = lines
            .iter()
            .filter(|l| l.role == AccountRole::Inventory)
            .count();

        prop_assert_eq!(cogs_count, nonzero_stocked);
        prop_assert_eq!(inventory_count, nonzero_stocked);
    }

    /// Property: zero optional amounts emit zero optional lines.
    #[test]
    fn prop_zero_optionals_emit_no_lines(mut invoice in invoice_strategy()) {
        invoice.discount_amount = Decimal::ZERO;
        invoice.wht_amount = Decimal::ZERO;
        let lines = build_entries(&Document::SalesInvoice(invoice)).unwrap();

        prop_assert!(lines.iter().all(|l| l.role != AccountRole::DiscountAllowed));
        prop_assert!(lines.iter().all(|l| l.role != AccountRole::WhtReceivable));
    }

    /// Property: rule sets are deterministic.
    #[test]
    fn prop_build_is_deterministic(invoice in invoice_strategy()) {
        let doc = Document::SalesInvoice(invoice);
        let first = build_entries(&doc).unwrap();
        let second = build_entries(&doc).unwrap();
        prop_assert_eq!(first, second);
    }
}
