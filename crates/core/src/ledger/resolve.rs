//! Account resolution for posting roles.
//!
//! A posting rule names the ROLE an entry plays (Cogs, Income,
//! Receivable, ...); resolution maps the role to a concrete account id
//! using the configured override hierarchy: line-item override first,
//! then category default, then customer default (receivable only), then
//! the document-level fallback. Mandatory roles fail loudly when nothing
//! resolves; optional roles are skipped with a warning.

use kontor_shared::types::AccountId;
use serde::{Deserialize, Serialize};
use tracing::warn;

use super::error::PostingError;

/// The role an entry plays in a posting batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccountRole {
    /// Cost of goods sold.
    Cogs,
    /// Inventory asset.
    Inventory,
    /// Accounts receivable.
    Receivable,
    /// Sales income (always pre-tax subtotal).
    Income,
    /// Tax payable. Optional to resolve, but a tax amount with no
    /// resolvable account is a configuration error.
    TaxPayable,
    /// Withholding tax receivable.
    WhtReceivable,
    /// Discount allowed.
    DiscountAllowed,
    /// Cash or bank deposit account.
    Cash,
    /// Inventory adjustment gain/loss.
    InventoryAdjustment,
    /// Journal line with an explicitly chosen account.
    Direct,
}

impl AccountRole {
    /// Returns true if posting must fail when this role cannot resolve.
    ///
    /// `TaxPayable` is special-cased by the rule set: it resolves softly
    /// here, but a non-zero tax amount with no account escalates to
    /// `MissingAccountConfiguration`.
    #[must_use]
    pub const fn is_mandatory(self) -> bool {
        matches!(
            self,
            Self::Cogs
                | Self::Inventory
                | Self::Receivable
                | Self::Income
                | Self::Cash
                | Self::InventoryAdjustment
                | Self::Direct
        )
    }
}

impl std::fmt::Display for AccountRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Cogs => "cogs",
            Self::Inventory => "inventory",
            Self::Receivable => "receivable",
            Self::Income => "income",
            Self::TaxPayable => "tax_payable",
            Self::WhtReceivable => "wht_receivable",
            Self::DiscountAllowed => "discount_allowed",
            Self::Cash => "cash",
            Self::InventoryAdjustment => "inventory_adjustment",
            Self::Direct => "direct",
        };
        write!(f, "{name}")
    }
}

/// Account configuration visible from one document line (or header).
///
/// Each field is one level of the override hierarchy; `None` means that
/// level has nothing configured for the role being resolved.
#[derive(Debug, Clone, Copy, Default)]
pub struct LineContext {
    /// 1-based document line number, 0 for header-level roles.
    pub line: u32,
    /// Line-item-level override (e.g. the product's own COGS account).
    pub item_override: Option<AccountId>,
    /// Category-level default (e.g. the product category's COGS account).
    pub category_default: Option<AccountId>,
    /// Customer-level default; consulted for the receivable role only.
    pub customer_default: Option<AccountId>,
    /// Document-level fallback field.
    pub document_fallback: Option<AccountId>,
}

impl LineContext {
    /// Context for a header-level role with only a document fallback.
    #[must_use]
    pub fn header(document_fallback: Option<AccountId>) -> Self {
        Self {
            document_fallback,
            ..Self::default()
        }
    }
}

/// Resolves the concrete account for a role, first non-null wins.
///
/// Resolution order: item override, category default, customer default
/// (receivable role only), document fallback.
///
/// # Errors
///
/// Returns `MissingAccountConfiguration` when a mandatory role resolves
/// to nothing. Optional roles return `Ok(None)` and log a warning; the
/// caller skips the entry.
pub fn resolve_account(
    role: AccountRole,
    context: &LineContext,
) -> Result<Option<AccountId>, PostingError> {
    let customer_level = if role == AccountRole::Receivable {
        context.customer_default
    } else {
        None
    };

    let resolved = context
        .item_override
        .or(context.category_default)
        .or(customer_level)
        .or(context.document_fallback);

    match resolved {
        Some(account) => Ok(Some(account)),
        None if role.is_mandatory() => Err(PostingError::MissingAccountConfiguration {
            role,
            line: context.line,
        }),
        None => {
            warn!(%role, line = context.line, "optional account role unresolved, skipping entry");
            Ok(None)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_item_override_wins() {
        let item = AccountId::new();
        let category = AccountId::new();
        let context = LineContext {
            line: 1,
            item_override: Some(item),
            category_default: Some(category),
            customer_default: None,
            document_fallback: Some(AccountId::new()),
        };

        let resolved = resolve_account(AccountRole::Cogs, &context).unwrap();
        assert_eq!(resolved, Some(item));
    }

    #[test]
    fn test_category_default_when_no_item_override() {
        let category = AccountId::new();
        let context = LineContext {
            line: 1,
            category_default: Some(category),
            document_fallback: Some(AccountId::new()),
            ..LineContext::default()
        };

        let resolved = resolve_account(AccountRole::Cogs, &context).unwrap();
        assert_eq!(resolved, Some(category));
    }

    #[test]
    fn test_customer_default_applies_to_receivable_only() {
        let customer = AccountId::new();
        let fallback = AccountId::new();
        let context = LineContext {
            line: 0,
            customer_default: Some(customer),
            document_fallback: Some(fallback),
            ..LineContext::default()
        };

        let receivable = resolve_account(AccountRole::Receivable, &context).unwrap();
        assert_eq!(receivable, Some(customer));

        // For any other role the customer level is ignored.
        let income = resolve_account(AccountRole::Income, &context).unwrap();
        assert_eq!(income, Some(fallback));
    }

    #[test]
    fn test_document_fallback_last() {
        let fallback = AccountId::new();
        let context = LineContext::header(Some(fallback));

        let resolved = resolve_account(AccountRole::Income, &context).unwrap();
        assert_eq!(resolved, Some(fallback));
    }

    #[rstest]
    #[case(AccountRole::Cogs)]
    #[case(AccountRole::Inventory)]
    #[case(AccountRole::Receivable)]
    #[case(AccountRole::Income)]
    #[case(AccountRole::Cash)]
    fn test_mandatory_roles_fail_when_unresolved(#[case] role: AccountRole) {
        let context = LineContext {
            line: 2,
            ..LineContext::default()
        };

        let err = resolve_account(role, &context).unwrap_err();
        match err {
            PostingError::MissingAccountConfiguration { role: r, line } => {
                assert_eq!(r, role);
                assert_eq!(line, 2);
            }
            other => panic!("expected MissingAccountConfiguration, got {other:?}"),
        }
    }

    #[rstest]
    #[case(AccountRole::TaxPayable)]
    #[case(AccountRole::WhtReceivable)]
    #[case(AccountRole::DiscountAllowed)]
    fn test_optional_roles_resolve_to_none(#[case] role: AccountRole) {
        let context = LineContext::default();
        let resolved = resolve_account(role, &context).unwrap();
        assert_eq!(resolved, None);
    }
}
