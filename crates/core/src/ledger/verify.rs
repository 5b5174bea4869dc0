//! Balance verification and audit findings.
//!
//! The verifier runs twice in a batch's life: synchronously before the
//! writer commits (an unbalanced batch is rejected, nothing persists),
//! and offline over historic batches to catch drift left behind by
//! legacy bugs. The hard debit/credit invariant is a HIGH severity
//! violation; a receivable that disagrees with its components is a
//! separate MEDIUM severity finding.

use kontor_shared::types::BatchId;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::entry::EntryNature;
use super::error::PostingError;
use super::resolve::AccountRole;
use super::rules::PostingLine;

/// Maximum tolerated difference between debit and credit totals.
pub const BALANCE_TOLERANCE: Decimal = Decimal::from_parts(1, 0, 0, false, 2);

/// Result of verifying one posting batch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BalanceReport {
    /// Whether debits equal credits within tolerance.
    pub balanced: bool,
    /// Total debit amount.
    pub total_debit: Decimal,
    /// Total credit amount.
    pub total_credit: Decimal,
    /// Absolute difference between the sides.
    pub delta: Decimal,
}

impl BalanceReport {
    /// Sums (nature, amount) pairs into a report.
    pub fn from_pairs<I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (EntryNature, Decimal)>,
    {
        let mut total_debit = Decimal::ZERO;
        let mut total_credit = Decimal::ZERO;

        for (nature, amount) in pairs {
            match nature {
                EntryNature::Debit => total_debit += amount,
                EntryNature::Credit => total_credit += amount,
            }
        }

        let delta = (total_debit - total_credit).abs();
        Self {
            balanced: delta <= BALANCE_TOLERANCE,
            total_debit,
            total_credit,
            delta,
        }
    }

    /// Turns an unbalanced report into the error the writer surfaces.
    ///
    /// # Errors
    ///
    /// Returns `UnbalancedBatch` with both totals and the delta.
    pub fn ensure_balanced(&self) -> Result<(), PostingError> {
        if self.balanced {
            Ok(())
        } else {
            Err(PostingError::UnbalancedBatch {
                debit: self.total_debit,
                credit: self.total_credit,
                delta: self.delta,
            })
        }
    }
}

/// Verifies the debit/credit invariant over a set of posting lines.
#[must_use]
pub fn verify(lines: &[PostingLine]) -> BalanceReport {
    BalanceReport::from_pairs(lines.iter().map(|l| (l.nature, l.amount)))
}

/// Severity of an audit finding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Severity {
    /// Hard balance invariant violated.
    High,
    /// Secondary consistency rule violated.
    Medium,
}

/// What an audit finding is about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FindingKind {
    /// Debits and credits of the batch do not balance.
    UnbalancedBatch,
    /// The posted receivable disagrees with its components.
    ReceivableMismatch,
}

/// One audit finding for a historic batch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditFinding {
    /// The batch the finding is about.
    pub batch_id: BatchId,
    /// The document reference grouping the batch's entries.
    pub reference_number: String,
    /// Finding severity.
    pub severity: Severity,
    /// What rule was violated.
    pub kind: FindingKind,
    /// Size of the discrepancy.
    pub delta: Decimal,
}

fn net(lines: &[PostingLine], role: AccountRole, positive: EntryNature) -> Decimal {
    lines
        .iter()
        .filter(|l| l.role == role)
        .map(|l| {
            if l.nature == positive {
                l.amount
            } else {
                -l.amount
            }
        })
        .sum()
}

/// Checks the receivable against its components.
///
/// `expected = income - discount + tax - wht - cash applied`; the posted
/// receivable (net debit) must match within tolerance. Returns the delta
/// when it does not.
#[must_use]
pub fn check_receivable_consistency(lines: &[PostingLine]) -> Option<Decimal> {
    let income = net(lines, AccountRole::Income, EntryNature::Credit);
    let tax = net(lines, AccountRole::TaxPayable, EntryNature::Credit);
    let discount = net(lines, AccountRole::DiscountAllowed, EntryNature::Debit);
    let wht = net(lines, AccountRole::WhtReceivable, EntryNature::Debit);
    let cash = net(lines, AccountRole::Cash, EntryNature::Debit);
    let receivable = net(lines, AccountRole::Receivable, EntryNature::Debit);

    let expected = income - discount + tax - wht - cash;
    let delta = (receivable - expected).abs();

    if delta <= BALANCE_TOLERANCE {
        None
    } else {
        Some(delta)
    }
}

/// Audits one batch, producing zero or more findings.
///
/// The hard balance check always runs; the receivable consistency check
/// runs when `check_receivable` is set (sales document batches).
#[must_use]
pub fn audit_batch(
    batch_id: BatchId,
    reference_number: &str,
    lines: &[PostingLine],
    check_receivable: bool,
) -> Vec<AuditFinding> {
    let mut findings = Vec::new();

    let report = verify(lines);
    if !report.balanced {
        findings.push(AuditFinding {
            batch_id,
            reference_number: reference_number.to_string(),
            severity: Severity::High,
            kind: FindingKind::UnbalancedBatch,
            delta: report.delta,
        });
    }

    if check_receivable {
        if let Some(delta) = check_receivable_consistency(lines) {
            findings.push(AuditFinding {
                batch_id,
                reference_number: reference_number.to_string(),
                severity: Severity::Medium,
                kind: FindingKind::ReceivableMismatch,
                delta,
            });
        }
    }

    findings
}

#[cfg(test)]
mod tests {
    use super::*;
    use kontor_shared::types::AccountId;
    use rust_decimal_macros::dec;

    fn line(role: AccountRole, nature: EntryNature, amount: Decimal) -> PostingLine {
        PostingLine {
            role,
            account_id: AccountId::new(),
            nature,
            amount,
        }
    }

    #[test]
    fn test_balanced_report() {
        let lines = vec![
            line(AccountRole::Receivable, EntryNature::Debit, dec!(118.00)),
            line(AccountRole::Income, EntryNature::Credit, dec!(100.00)),
            line(AccountRole::TaxPayable, EntryNature::Credit, dec!(18.00)),
        ];

        let report = verify(&lines);
        assert!(report.balanced);
        assert_eq!(report.total_debit, dec!(118.00));
        assert_eq!(report.total_credit, dec!(118.00));
        assert_eq!(report.delta, Decimal::ZERO);
        assert!(report.ensure_balanced().is_ok());
    }

    #[test]
    fn test_unbalanced_report() {
        let lines = vec![
            line(AccountRole::Receivable, EntryNature::Debit, dec!(118.00)),
            line(AccountRole::Income, EntryNature::Credit, dec!(100.00)),
        ];

        let report = verify(&lines);
        assert!(!report.balanced);
        assert_eq!(report.delta, dec!(18.00));
        assert!(matches!(
            report.ensure_balanced(),
            Err(PostingError::UnbalancedBatch { .. })
        ));
    }

    #[test]
    fn test_rounding_tolerance() {
        // One cent of drift is tolerated; two cents is not.
        let within = vec![
            line(AccountRole::Receivable, EntryNature::Debit, dec!(100.01)),
            line(AccountRole::Income, EntryNature::Credit, dec!(100.00)),
        ];
        assert!(verify(&within).balanced);

        let beyond = vec![
            line(AccountRole::Receivable, EntryNature::Debit, dec!(100.02)),
            line(AccountRole::Income, EntryNature::Credit, dec!(100.00)),
        ];
        assert!(!verify(&beyond).balanced);
    }

    #[test]
    fn test_empty_batch_is_trivially_balanced() {
        // The writer rejects empty batches before verification runs.
        let report = verify(&[]);
        assert!(report.balanced);
        assert_eq!(report.total_debit, Decimal::ZERO);
    }

    #[test]
    fn test_receivable_consistency_holds() {
        // Receivable 118 = income 100 + tax 18
        let lines = vec![
            line(AccountRole::Receivable, EntryNature::Debit, dec!(118.00)),
            line(AccountRole::Income, EntryNature::Credit, dec!(100.00)),
            line(AccountRole::TaxPayable, EntryNature::Credit, dec!(18.00)),
        ];
        assert_eq!(check_receivable_consistency(&lines), None);
    }

    #[test]
    fn test_receivable_consistency_with_payment_applied() {
        // Receivable 68 = income 100 + tax 18 - cash 50
        let lines = vec![
            line(AccountRole::Receivable, EntryNature::Debit, dec!(68.00)),
            line(AccountRole::Income, EntryNature::Credit, dec!(100.00)),
            line(AccountRole::TaxPayable, EntryNature::Credit, dec!(18.00)),
            line(AccountRole::Cash, EntryNature::Debit, dec!(50.00)),
        ];
        assert_eq!(check_receivable_consistency(&lines), None);
    }

    #[test]
    fn test_receivable_posted_at_full_total_is_flagged() {
        // Legacy bug pattern: receivable posted at the tax-inclusive total
        // even though 50 was already paid. Balanced it is not; the
        // receivable check flags the 50 of drift independently.
        let lines = vec![
            line(AccountRole::Receivable, EntryNature::Debit, dec!(118.00)),
            line(AccountRole::Income, EntryNature::Credit, dec!(100.00)),
            line(AccountRole::TaxPayable, EntryNature::Credit, dec!(18.00)),
            line(AccountRole::Cash, EntryNature::Debit, dec!(50.00)),
        ];
        assert_eq!(check_receivable_consistency(&lines), Some(dec!(50.00)));
    }

    #[test]
    fn test_audit_batch_reports_both_severities() {
        let lines = vec![
            line(AccountRole::Receivable, EntryNature::Debit, dec!(118.00)),
            line(AccountRole::Income, EntryNature::Credit, dec!(100.00)),
            line(AccountRole::TaxPayable, EntryNature::Credit, dec!(18.00)),
            line(AccountRole::Cash, EntryNature::Debit, dec!(50.00)),
        ];

        let findings = audit_batch(BatchId::new(), "INV-077", &lines, true);
        assert_eq!(findings.len(), 2);

        assert_eq!(findings[0].severity, Severity::High);
        assert_eq!(findings[0].kind, FindingKind::UnbalancedBatch);
        assert_eq!(findings[0].delta, dec!(50.00));

        assert_eq!(findings[1].severity, Severity::Medium);
        assert_eq!(findings[1].kind, FindingKind::ReceivableMismatch);
        assert_eq!(findings[1].reference_number, "INV-077");
    }

    #[test]
    fn test_audit_batch_clean() {
        let lines = vec![
            line(AccountRole::Receivable, EntryNature::Debit, dec!(118.00)),
            line(AccountRole::Income, EntryNature::Credit, dec!(100.00)),
            line(AccountRole::TaxPayable, EntryNature::Credit, dec!(18.00)),
        ];
        assert!(audit_batch(BatchId::new(), "INV-001", &lines, true).is_empty());
    }

    #[test]
    fn test_audit_skips_receivable_check_for_non_sales() {
        // A transfer-like journal batch has no receivable at all; the
        // consistency rule only applies when requested.
        let lines = vec![
            line(AccountRole::Direct, EntryNature::Debit, dec!(40.00)),
            line(AccountRole::Direct, EntryNature::Credit, dec!(40.00)),
        ];
        assert!(audit_batch(BatchId::new(), "JRN-003", &lines, false).is_empty());
    }
}
