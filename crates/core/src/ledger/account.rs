//! Chart of accounts and the account hierarchy.
//!
//! Accounts form a tree (parents roll up children for reporting). The
//! tree is held in an arena keyed by `AccountId` with an explicit
//! acyclicity check on insert and re-parent, instead of trusting
//! unchecked foreign keys.

use std::collections::HashMap;

use kontor_shared::types::{AccountId, CompanyId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::entry::EntryNature;

/// Account classification determining the normal balance side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccountCategory {
    /// Assets (debit-normal).
    Asset,
    /// Liabilities (credit-normal).
    Liability,
    /// Equity (credit-normal).
    Equity,
    /// Revenue (credit-normal).
    Revenue,
    /// Expenses (debit-normal).
    Expense,
}

impl AccountCategory {
    /// Returns the side that increases this category's balance.
    #[must_use]
    pub const fn normal_nature(self) -> EntryNature {
        match self {
            Self::Asset | Self::Expense => EntryNature::Debit,
            Self::Liability | Self::Equity | Self::Revenue => EntryNature::Credit,
        }
    }

    /// Calculates the balance change an entry causes for this category.
    ///
    /// Debit-normal: balance += debit - credit.
    /// Credit-normal: balance += credit - debit.
    #[must_use]
    pub fn balance_change(self, debit: Decimal, credit: Decimal) -> Decimal {
        match self.normal_nature() {
            EntryNature::Debit => debit - credit,
            EntryNature::Credit => credit - debit,
        }
    }
}

/// A ledger account owned by one company.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Account {
    /// Unique identifier.
    pub id: AccountId,
    /// The company (tenant) owning this account.
    pub company_id: CompanyId,
    /// Account code, unique per company (NOT globally).
    pub code: String,
    /// Display name.
    pub name: String,
    /// Classification.
    pub category: AccountCategory,
    /// Optional parent for roll-up reporting.
    pub parent: Option<AccountId>,
}

impl Account {
    /// Returns the side that increases this account's balance.
    #[must_use]
    pub const fn nature(&self) -> EntryNature {
        self.category.normal_nature()
    }
}

/// Errors raised by account tree operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AccountTreeError {
    /// Account belongs to a different company than the tree.
    #[error("Account {0} belongs to a different company")]
    CompanyMismatch(AccountId),

    /// Account code already used by this company.
    #[error("Account code '{0}' already exists for this company")]
    DuplicateCode(String),

    /// Referenced parent account does not exist.
    #[error("Parent account not found: {0}")]
    ParentNotFound(AccountId),

    /// Assigning this parent would create a cycle.
    #[error("Assigning parent {parent} to account {account} would create a cycle")]
    CycleDetected {
        /// The account being re-parented.
        account: AccountId,
        /// The proposed parent.
        parent: AccountId,
    },

    /// Account does not exist in the tree.
    #[error("Account not found: {0}")]
    NotFound(AccountId),
}

/// Arena holding one company's chart of accounts.
///
/// All mutation goes through methods that preserve two invariants:
/// codes are unique within the company, and the parent graph is acyclic.
#[derive(Debug, Clone)]
pub struct AccountTree {
    company_id: CompanyId,
    nodes: HashMap<AccountId, Account>,
    by_code: HashMap<String, AccountId>,
}

impl AccountTree {
    /// Creates an empty tree for one company.
    #[must_use]
    pub fn new(company_id: CompanyId) -> Self {
        Self {
            company_id,
            nodes: HashMap::new(),
            by_code: HashMap::new(),
        }
    }

    /// The company this tree belongs to.
    #[must_use]
    pub const fn company_id(&self) -> CompanyId {
        self.company_id
    }

    /// Number of accounts in the tree.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Returns true if the tree has no accounts.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Looks up an account by id.
    #[must_use]
    pub fn get(&self, id: AccountId) -> Option<&Account> {
        self.nodes.get(&id)
    }

    /// Looks up an account id by its code.
    #[must_use]
    pub fn resolve_code(&self, code: &str) -> Option<AccountId> {
        self.by_code.get(code).copied()
    }

    /// Inserts a new account.
    ///
    /// # Errors
    ///
    /// Rejects accounts from other companies, duplicate codes, missing
    /// parents, and self-parenting.
    pub fn insert(&mut self, account: Account) -> Result<(), AccountTreeError> {
        if account.company_id != self.company_id {
            return Err(AccountTreeError::CompanyMismatch(account.id));
        }
        if self.by_code.contains_key(&account.code) {
            return Err(AccountTreeError::DuplicateCode(account.code));
        }
        if let Some(parent) = account.parent {
            if parent == account.id {
                return Err(AccountTreeError::CycleDetected {
                    account: account.id,
                    parent,
                });
            }
            if !self.nodes.contains_key(&parent) {
                return Err(AccountTreeError::ParentNotFound(parent));
            }
        }

        self.by_code.insert(account.code.clone(), account.id);
        self.nodes.insert(account.id, account);
        Ok(())
    }

    /// Re-parents an account (or detaches it with `None`).
    ///
    /// # Errors
    ///
    /// Rejects unknown accounts or parents, and any assignment that would
    /// close a cycle in the parent chain.
    pub fn set_parent(
        &mut self,
        id: AccountId,
        parent: Option<AccountId>,
    ) -> Result<(), AccountTreeError> {
        if !self.nodes.contains_key(&id) {
            return Err(AccountTreeError::NotFound(id));
        }

        if let Some(parent_id) = parent {
            if !self.nodes.contains_key(&parent_id) {
                return Err(AccountTreeError::ParentNotFound(parent_id));
            }
            // Walk up from the proposed parent; reaching `id` means the
            // assignment would close a cycle.
            let mut cursor = Some(parent_id);
            while let Some(current) = cursor {
                if current == id {
                    return Err(AccountTreeError::CycleDetected {
                        account: id,
                        parent: parent_id,
                    });
                }
                cursor = self.nodes.get(&current).and_then(|a| a.parent);
            }
        }

        if let Some(account) = self.nodes.get_mut(&id) {
            account.parent = parent;
        }
        Ok(())
    }

    /// Returns the chain of ancestors from the account's parent to the root.
    #[must_use]
    pub fn ancestors(&self, id: AccountId) -> Vec<AccountId> {
        let mut chain = Vec::new();
        let mut cursor = self.nodes.get(&id).and_then(|a| a.parent);
        while let Some(current) = cursor {
            chain.push(current);
            cursor = self.nodes.get(&current).and_then(|a| a.parent);
        }
        chain
    }

    /// Iterates over all accounts.
    pub fn iter(&self) -> impl Iterator<Item = &Account> {
        self.nodes.values()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn make_account(tree: &AccountTree, code: &str, parent: Option<AccountId>) -> Account {
        Account {
            id: AccountId::new(),
            company_id: tree.company_id(),
            code: code.to_string(),
            name: format!("Account {code}"),
            category: AccountCategory::Asset,
            parent,
        }
    }

    #[test]
    fn test_normal_nature() {
        assert_eq!(AccountCategory::Asset.normal_nature(), EntryNature::Debit);
        assert_eq!(AccountCategory::Expense.normal_nature(), EntryNature::Debit);
        assert_eq!(
            AccountCategory::Liability.normal_nature(),
            EntryNature::Credit
        );
        assert_eq!(AccountCategory::Equity.normal_nature(), EntryNature::Credit);
        assert_eq!(
            AccountCategory::Revenue.normal_nature(),
            EntryNature::Credit
        );
    }

    #[test]
    fn test_balance_change() {
        assert_eq!(
            AccountCategory::Asset.balance_change(dec!(100), dec!(30)),
            dec!(70)
        );
        assert_eq!(
            AccountCategory::Revenue.balance_change(dec!(30), dec!(100)),
            dec!(70)
        );
    }

    #[test]
    fn test_insert_and_lookup() {
        let mut tree = AccountTree::new(CompanyId::new());
        let account = make_account(&tree, "1000", None);
        let id = account.id;

        tree.insert(account).unwrap();
        assert_eq!(tree.get(id).unwrap().code, "1000");
        assert_eq!(tree.resolve_code("1000"), Some(id));
        assert_eq!(tree.len(), 1);
    }

    #[test]
    fn test_duplicate_code_rejected() {
        let mut tree = AccountTree::new(CompanyId::new());
        tree.insert(make_account(&tree, "1000", None)).unwrap();

        let result = tree.insert(make_account(&tree, "1000", None));
        assert_eq!(
            result,
            Err(AccountTreeError::DuplicateCode("1000".to_string()))
        );
    }

    #[test]
    fn test_same_code_in_other_company_is_fine() {
        // Tenant isolation: uniqueness is (code, company), never global.
        let mut tree_a = AccountTree::new(CompanyId::new());
        let mut tree_b = AccountTree::new(CompanyId::new());

        tree_a.insert(make_account(&tree_a, "1000", None)).unwrap();
        tree_b.insert(make_account(&tree_b, "1000", None)).unwrap();

        assert!(tree_a.resolve_code("1000").is_some());
        assert!(tree_b.resolve_code("1000").is_some());
        assert_ne!(tree_a.resolve_code("1000"), tree_b.resolve_code("1000"));
    }

    #[test]
    fn test_company_mismatch_rejected() {
        let mut tree = AccountTree::new(CompanyId::new());
        let mut foreign = make_account(&tree, "1000", None);
        foreign.company_id = CompanyId::new();

        let id = foreign.id;
        assert_eq!(
            tree.insert(foreign),
            Err(AccountTreeError::CompanyMismatch(id))
        );
    }

    #[test]
    fn test_parent_must_exist() {
        let mut tree = AccountTree::new(CompanyId::new());
        let missing = AccountId::new();
        let result = tree.insert(make_account(&tree, "1000", Some(missing)));
        assert_eq!(result, Err(AccountTreeError::ParentNotFound(missing)));
    }

    #[test]
    fn test_self_parent_rejected() {
        let mut tree = AccountTree::new(CompanyId::new());
        let mut account = make_account(&tree, "1000", None);
        account.parent = Some(account.id);
        let id = account.id;

        assert_eq!(
            tree.insert(account),
            Err(AccountTreeError::CycleDetected {
                account: id,
                parent: id
            })
        );
    }

    #[test]
    fn test_reparent_cycle_rejected() {
        let mut tree = AccountTree::new(CompanyId::new());
        let root = make_account(&tree, "1000", None);
        let root_id = root.id;
        tree.insert(root).unwrap();

        let child = make_account(&tree, "1100", Some(root_id));
        let child_id = child.id;
        tree.insert(child).unwrap();

        let grandchild = make_account(&tree, "1110", Some(child_id));
        let grandchild_id = grandchild.id;
        tree.insert(grandchild).unwrap();

        // root -> grandchild would close the loop root -> child -> grandchild -> root
        let result = tree.set_parent(root_id, Some(grandchild_id));
        assert_eq!(
            result,
            Err(AccountTreeError::CycleDetected {
                account: root_id,
                parent: grandchild_id
            })
        );

        // The failed attempt must not have mutated anything.
        assert_eq!(tree.get(root_id).unwrap().parent, None);
    }

    #[test]
    fn test_ancestors() {
        let mut tree = AccountTree::new(CompanyId::new());
        let root = make_account(&tree, "1000", None);
        let root_id = root.id;
        tree.insert(root).unwrap();

        let child = make_account(&tree, "1100", Some(root_id));
        let child_id = child.id;
        tree.insert(child).unwrap();

        let grandchild = make_account(&tree, "1110", Some(child_id));
        let grandchild_id = grandchild.id;
        tree.insert(grandchild).unwrap();

        assert_eq!(tree.ancestors(grandchild_id), vec![child_id, root_id]);
        assert_eq!(tree.ancestors(root_id), Vec::<AccountId>::new());
    }

    #[test]
    fn test_detach_parent() {
        let mut tree = AccountTree::new(CompanyId::new());
        let root = make_account(&tree, "1000", None);
        let root_id = root.id;
        tree.insert(root).unwrap();

        let child = make_account(&tree, "1100", Some(root_id));
        let child_id = child.id;
        tree.insert(child).unwrap();

        tree.set_parent(child_id, None).unwrap();
        assert_eq!(tree.get(child_id).unwrap().parent, None);
    }
}
