//! Repository abstractions for data access.
//!
//! Repositories provide a clean interface for database operations,
//! hiding the `SeaORM` implementation details from the rest of the
//! application. Every method takes the tenant (`CompanyId`) explicitly.

pub mod account;
pub mod audit;
pub mod exchange_rate;
pub mod ledger;

pub use account::{AccountError, AccountRepository, CreateAccountInput};
pub use audit::{AuditError, AuditRepository};
pub use exchange_rate::{CreateExchangeRateInput, ExchangeRateError, ExchangeRateRepository};
pub use ledger::{LedgerRepository, LedgerWriteError, PostedBatch};
