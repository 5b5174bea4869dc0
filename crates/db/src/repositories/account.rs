//! Account repository for chart of accounts database operations.

use chrono::Utc;
use kontor_core::ledger::{Account, AccountTree, AccountTreeError};
use kontor_shared::types::{AccountId, CompanyId};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter,
    QueryOrder, Set,
};
use uuid::Uuid;

use crate::entities::{chart_of_accounts, sea_orm_active_enums::AccountCategory};

/// Error types for account operations.
#[derive(Debug, thiserror::Error)]
pub enum AccountError {
    /// Account not found.
    #[error("Account not found: {0}")]
    NotFound(Uuid),

    /// Parent account not found or belongs to another company.
    #[error("Parent account not found: {0}")]
    ParentNotFound(Uuid),

    /// Account code already used by this company.
    #[error("Account code '{0}' already exists for this company")]
    DuplicateCode(String),

    /// The account hierarchy violated an invariant (cycle, bad parent).
    #[error(transparent)]
    Tree(#[from] AccountTreeError),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

/// Input for creating an account.
#[derive(Debug, Clone)]
pub struct CreateAccountInput {
    /// The company (tenant) the account belongs to.
    pub company_id: CompanyId,
    /// Account code, unique within the company.
    pub code: String,
    /// Display name.
    pub name: String,
    /// Classification.
    pub category: kontor_core::ledger::AccountCategory,
    /// Optional parent account.
    pub parent_id: Option<AccountId>,
}

/// Builds the in-memory account tree from persisted rows.
///
/// Parents are inserted before children; anything left over references a
/// missing parent or participates in a cycle, which the arena rejects.
pub fn build_tree(
    company_id: CompanyId,
    rows: Vec<chart_of_accounts::Model>,
) -> Result<AccountTree, AccountTreeError> {
    let mut tree = AccountTree::new(company_id);
    let mut pending: Vec<Account> = rows
        .into_iter()
        .map(|row| Account {
            id: AccountId::from_uuid(row.id),
            company_id: CompanyId::from_uuid(row.company_id),
            code: row.code,
            name: row.name,
            category: row.category.into(),
            parent: row.parent_id.map(AccountId::from_uuid),
        })
        .collect();

    while !pending.is_empty() {
        let before = pending.len();
        let mut deferred = Vec::new();

        for account in pending {
            match account.parent {
                Some(parent) if tree.get(parent).is_none() => deferred.push(account),
                _ => tree.insert(account)?,
            }
        }

        if deferred.len() == before {
            // No progress: the remainder references parents that do not
            // exist in this company's chart.
            let account = &deferred[0];
            return Err(AccountTreeError::ParentNotFound(
                account.parent.unwrap_or(account.id),
            ));
        }
        pending = deferred;
    }

    Ok(tree)
}

/// Account repository for CRUD operations.
#[derive(Debug, Clone)]
pub struct AccountRepository {
    db: DatabaseConnection,
}

impl AccountRepository {
    /// Creates a new account repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Creates a new account.
    ///
    /// # Errors
    ///
    /// Returns an error if the code is taken within the company or the
    /// parent does not exist in the same company.
    pub async fn create_account(
        &self,
        input: CreateAccountInput,
    ) -> Result<chart_of_accounts::Model, AccountError> {
        let existing = chart_of_accounts::Entity::find()
            .filter(chart_of_accounts::Column::CompanyId.eq(input.company_id.into_inner()))
            .filter(chart_of_accounts::Column::Code.eq(&input.code))
            .one(&self.db)
            .await?;
        if existing.is_some() {
            return Err(AccountError::DuplicateCode(input.code));
        }

        if let Some(parent_id) = input.parent_id {
            let parent = chart_of_accounts::Entity::find_by_id(parent_id.into_inner())
                .filter(chart_of_accounts::Column::CompanyId.eq(input.company_id.into_inner()))
                .one(&self.db)
                .await?;
            if parent.is_none() {
                return Err(AccountError::ParentNotFound(parent_id.into_inner()));
            }
        }

        let now = Utc::now().into();
        let account = chart_of_accounts::ActiveModel {
            id: Set(Uuid::new_v4()),
            company_id: Set(input.company_id.into_inner()),
            code: Set(input.code),
            name: Set(input.name),
            category: Set(AccountCategory::from(input.category)),
            parent_id: Set(input.parent_id.map(AccountId::into_inner)),
            created_at: Set(now),
            updated_at: Set(now),
        };

        Ok(account.insert(&self.db).await?)
    }

    /// Re-parents an account, rejecting assignments that would create a
    /// cycle in the hierarchy.
    ///
    /// The whole chart is loaded into the arena so the cycle check runs
    /// against the real tree, not whatever foreign keys happen to allow.
    ///
    /// # Errors
    ///
    /// Returns `Tree(CycleDetected)` for cyclic assignments and
    /// `NotFound`/`ParentNotFound` for missing rows.
    pub async fn set_parent(
        &self,
        company_id: CompanyId,
        account_id: AccountId,
        parent_id: Option<AccountId>,
    ) -> Result<chart_of_accounts::Model, AccountError> {
        let rows = self.list_accounts(company_id).await?;
        let mut tree = build_tree(company_id, rows)?;
        if tree.get(account_id).is_none() {
            return Err(AccountError::NotFound(account_id.into_inner()));
        }
        tree.set_parent(account_id, parent_id)?;

        let row = chart_of_accounts::Entity::find_by_id(account_id.into_inner())
            .filter(chart_of_accounts::Column::CompanyId.eq(company_id.into_inner()))
            .one(&self.db)
            .await?
            .ok_or(AccountError::NotFound(account_id.into_inner()))?;

        let mut active: chart_of_accounts::ActiveModel = row.into();
        active.parent_id = Set(parent_id.map(AccountId::into_inner));
        active.updated_at = Set(Utc::now().into());
        Ok(active.update(&self.db).await?)
    }

    /// Gets one account scoped to the company.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` when the account does not exist for this tenant.
    pub async fn get_account(
        &self,
        company_id: CompanyId,
        account_id: AccountId,
    ) -> Result<chart_of_accounts::Model, AccountError> {
        chart_of_accounts::Entity::find_by_id(account_id.into_inner())
            .filter(chart_of_accounts::Column::CompanyId.eq(company_id.into_inner()))
            .one(&self.db)
            .await?
            .ok_or(AccountError::NotFound(account_id.into_inner()))
    }

    /// Lists all accounts for a company ordered by code.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list_accounts(
        &self,
        company_id: CompanyId,
    ) -> Result<Vec<chart_of_accounts::Model>, AccountError> {
        Ok(chart_of_accounts::Entity::find()
            .filter(chart_of_accounts::Column::CompanyId.eq(company_id.into_inner()))
            .order_by_asc(chart_of_accounts::Column::Code)
            .all(&self.db)
            .await?)
    }

    /// Loads the company's chart of accounts into the arena.
    ///
    /// # Errors
    ///
    /// Surfaces hierarchy violations found in the persisted data.
    pub async fn load_tree(&self, company_id: CompanyId) -> Result<AccountTree, AccountError> {
        let rows = self.list_accounts(company_id).await?;
        Ok(build_tree(company_id, rows)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(
        company: Uuid,
        id: Uuid,
        code: &str,
        parent_id: Option<Uuid>,
    ) -> chart_of_accounts::Model {
        let now = Utc::now().into();
        chart_of_accounts::Model {
            id,
            company_id: company,
            code: code.to_string(),
            name: format!("Account {code}"),
            category: AccountCategory::Asset,
            parent_id,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_build_tree_orders_parents_first() {
        let company = Uuid::new_v4();
        let root = Uuid::new_v4();
        let child = Uuid::new_v4();

        // Child listed before its parent; the builder must still succeed.
        let rows = vec![
            row(company, child, "1100", Some(root)),
            row(company, root, "1000", None),
        ];

        let tree = build_tree(CompanyId::from_uuid(company), rows).unwrap();
        assert_eq!(tree.len(), 2);
        assert_eq!(
            tree.ancestors(AccountId::from_uuid(child)),
            vec![AccountId::from_uuid(root)]
        );
    }

    #[test]
    fn test_build_tree_rejects_missing_parent() {
        let company = Uuid::new_v4();
        let orphan_parent = Uuid::new_v4();
        let rows = vec![row(company, Uuid::new_v4(), "1100", Some(orphan_parent))];

        let result = build_tree(CompanyId::from_uuid(company), rows);
        assert!(matches!(result, Err(AccountTreeError::ParentNotFound(_))));
    }

    #[test]
    fn test_build_tree_rejects_persisted_cycle() {
        let company = Uuid::new_v4();
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();

        // a -> b -> a can only exist if foreign keys were bypassed; the
        // loader refuses to produce a tree from it.
        let rows = vec![
            row(company, a, "1000", Some(b)),
            row(company, b, "1100", Some(a)),
        ];

        let result = build_tree(CompanyId::from_uuid(company), rows);
        assert!(result.is_err());
    }

    #[test]
    fn test_build_tree_empty_chart() {
        let tree = build_tree(CompanyId::new(), vec![]).unwrap();
        assert!(tree.is_empty());
    }
}
