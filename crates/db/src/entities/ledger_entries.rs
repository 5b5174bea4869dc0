//! `SeaORM` entity for the ledger_entries table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::sea_orm_active_enums::{AccountNature, TransactionType};

/// One persisted ledger entry.
///
/// Rows sharing a `general_ledger_id` form one posting batch and must
/// balance within tolerance. Rows are immutable; corrections arrive as
/// new batches whose `reversal_of` points at the original.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "ledger_entries")]
pub struct Model {
    /// Unique identifier.
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    /// Posting batch identifier shared by all rows of one economic event.
    pub general_ledger_id: Uuid,
    /// The company (tenant) owning this entry.
    pub company_id: Uuid,
    /// The document that produced this entry.
    pub document_id: Option<Uuid>,
    /// The account posted to.
    pub account_id: Uuid,
    /// Denormalized account code for reporting without joins.
    pub account_code: String,
    /// Denormalized account name.
    pub account_name: String,
    /// Debit or credit.
    pub account_nature: AccountNature,
    /// Amount in document currency (non-negative, 2 decimal places).
    pub amount: Decimal,
    /// Exchange rate to the company base currency (6 decimal places).
    pub exchange_rate: Decimal,
    /// Debit amount in base currency (zero on credit rows).
    pub equivalent_debit_amount: Decimal,
    /// Credit amount in base currency (zero on debit rows).
    pub equivalent_credit_amount: Decimal,
    /// Human-readable document identifier; groups entries, not unique.
    pub reference_number: String,
    /// The kind of document that produced this entry.
    pub transaction_type: TransactionType,
    /// The document's transaction date.
    pub transaction_date: Date,
    /// Batch this row reverses, when part of a reversal batch.
    pub reversal_of: Option<Uuid>,
    /// When the row was created.
    pub created_at: DateTimeWithTimeZone,
}

/// Entity relations.
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// The owning company.
    #[sea_orm(
        belongs_to = "super::companies::Entity",
        from = "Column::CompanyId",
        to = "super::companies::Column::Id"
    )]
    Companies,
    /// The account posted to.
    #[sea_orm(
        belongs_to = "super::chart_of_accounts::Entity",
        from = "Column::AccountId",
        to = "super::chart_of_accounts::Column::Id"
    )]
    ChartOfAccounts,
    /// The source document.
    #[sea_orm(
        belongs_to = "super::documents::Entity",
        from = "Column::DocumentId",
        to = "super::documents::Column::Id"
    )]
    Documents,
}

impl Related<super::companies::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Companies.def()
    }
}

impl Related<super::chart_of_accounts::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ChartOfAccounts.def()
    }
}

impl Related<super::documents::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Documents.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
