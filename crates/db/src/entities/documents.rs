//! `SeaORM` entity for the documents table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::sea_orm_active_enums::{DocumentStatus, TransactionType};

/// A commercial document header.
///
/// The status column is the double-posting guard: posting flips
/// `draft -> posted` under a row lock, and a second attempt fails
/// instead of writing a second batch.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "documents")]
pub struct Model {
    /// Unique identifier.
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    /// The company (tenant) owning this document.
    pub company_id: Uuid,
    /// What kind of document this is.
    pub document_type: TransactionType,
    /// Human-readable document identifier (e.g. "INV-001").
    pub reference_number: String,
    /// Transaction date.
    pub transaction_date: Date,
    /// Document currency code (ISO 4217).
    pub currency: String,
    /// Lifecycle status.
    pub status: DocumentStatus,
    /// The batch written when this document was posted.
    pub posted_batch_id: Option<Uuid>,
    /// When the row was created.
    pub created_at: DateTimeWithTimeZone,
    /// When the row was last updated.
    pub updated_at: DateTimeWithTimeZone,
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
    /// Entries produced by this document.
    #[sea_orm(has_many = "super::ledger_entries::Entity")]
    LedgerEntries,
}

impl Related<super::companies::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Companies.def()
    }
}

impl Related<super::ledger_entries::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::LedgerEntries.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
