//! Property-based tests for balance verification.

use kontor_shared::types::{AccountId, BatchId};
use proptest::prelude::*;
use rust_decimal::Decimal;

use super::entry::EntryNature;
use super::resolve::AccountRole;
use super::rules::PostingLine;
use super::verify::{audit_batch, verify, BalanceReport, Severity, BALANCE_TOLERANCE};

/// Strategy for an entry nature.
fn nature_strategy() -> impl Strategy<Value = EntryNature> {
    prop_oneof![Just(EntryNature::Debit), Just(EntryNature::Credit)]
}

/// Strategy for a positive 2dp amount.
fn amount_strategy() -> impl Strategy<Value = Decimal> {
    (1i64..10_000_00).prop_map(|cents| Decimal::new(cents, 2))
}

/// Strategy for an arbitrary list of posting lines.
fn lines_strategy(max_len: usize) -> impl Strategy<Value = Vec<PostingLine>> {
    prop::collection::vec(
        (nature_strategy(), amount_strategy()).prop_map(|(nature, amount)| PostingLine {
            role: AccountRole::Direct,
            account_id: AccountId::new(),
            nature,
            amount,
        }),
        1..=max_len,
    )
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// Property: the report's totals equal the manual sums.
    #[test]
    fn prop_report_totals_are_sums(lines in lines_strategy(16)) {
        let report = verify(&lines);

        let debit: Decimal = lines
            .iter()
            .filter(|l| l.nature == EntryNature::Debit)
            .map(|l| l.amount)
            .sum();
        let credit: Decimal = lines
            .iter()
            .filter(|l| l.nature == EntryNature::Credit)
            .map(|l| l.amount)
            .sum();

        prop_assert_eq!(report.total_debit, debit);
        prop_assert_eq!(report.total_credit, credit);
        prop_assert_eq!(report.delta, (debit - credit).abs());
    }

    /// Property: balanced if and only if the delta is within tolerance.
    #[test]
    fn prop_balanced_iff_within_tolerance(lines in lines_strategy(16)) {
        let report = verify(&lines);
        prop_assert_eq!(report.balanced, report.delta <= BALANCE_TOLERANCE);
        prop_assert_eq!(report.balanced, report.ensure_balanced().is_ok());
    }

    /// Property: mirroring every line balances the batch.
    ///
    /// *For any* set of lines, adding the flipped counterpart of each
    /// line produces equal totals on both sides.
    #[test]
    fn prop_mirrored_lines_balance(lines in lines_strategy(16)) {
        let mirrored: Vec<PostingLine> = lines
            .iter()
            .cloned()
            .chain(lines.iter().map(|l| PostingLine {
                role: l.role,
                account_id: l.account_id,
                nature: l.nature.flipped(),
                amount: l.amount,
            }))
            .collect();

        let report = verify(&mirrored);
        prop_assert_eq!(report.total_debit, report.total_credit);
        prop_assert!(report.balanced);
    }

    /// Property: an unbalanced batch always yields exactly one HIGH finding.
    #[test]
    fn prop_unbalanced_batch_is_high_severity(
        lines in lines_strategy(8),
        extra in amount_strategy(),
    ) {
        // Push the batch decisively out of tolerance on the debit side.
        let mut skewed = lines;
        skewed.push(PostingLine {
            role: AccountRole::Direct,
            account_id: AccountId::new(),
            nature: EntryNature::Debit,
            amount: skewed.iter().map(|l| l.amount).sum::<Decimal>() + extra + Decimal::ONE,
        });

        let findings = audit_batch(BatchId::new(), "PROP", &skewed, false);
        prop_assert_eq!(findings.len(), 1);
        prop_assert_eq!(findings[0].severity, Severity::High);
    }

    /// Property: verification order-independence.
    #[test]
    fn prop_verification_is_order_independent(lines in lines_strategy(12)) {
        let forward = verify(&lines);
        let reversed: Vec<PostingLine> = lines.iter().rev().cloned().collect();
        let backward = verify(&reversed);

        prop_assert_eq!(forward.total_debit, backward.total_debit);
        prop_assert_eq!(forward.total_credit, backward.total_credit);
        prop_assert_eq!(forward.balanced, backward.balanced);
    }

    /// Property: report construction from pairs matches line verification.
    #[test]
    fn prop_from_pairs_matches_verify(lines in lines_strategy(12)) {
        let from_lines = verify(&lines);
        let from_pairs =
            BalanceReport::from_pairs(lines.iter().map(|l| (l.nature, l.amount)));

        prop_assert_eq!(from_lines.total_debit, from_pairs.total_debit);
        prop_assert_eq!(from_lines.total_credit, from_pairs.total_credit);
        prop_assert_eq!(from_lines.balanced, from_pairs.balanced);
    }
}
