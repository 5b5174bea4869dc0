//! `SeaORM` entity definitions for the ledger schema.

pub mod chart_of_accounts;
pub mod companies;
pub mod documents;
pub mod exchange_rates;
pub mod ledger_entries;
pub mod sea_orm_active_enums;
