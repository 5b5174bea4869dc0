//! Audit repository: offline scan for drifted posting batches.
//!
//! Historic batches written by earlier systems can be unbalanced or can
//! carry a receivable that disagrees with its components. The scan
//! groups entries by batch, re-runs the core verifier over each group,
//! and reports findings instead of mutating anything.

use std::collections::BTreeMap;
use std::collections::HashMap;

use chrono::NaiveDate;
use kontor_core::ledger::{audit_batch, AccountRole, AuditFinding, PostingLine};
use kontor_shared::types::{AccountId, BatchId, CompanyId};
use sea_orm::{ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter, QueryOrder};
use tracing::{info, warn};
use uuid::Uuid;

use crate::entities::{ledger_entries, sea_orm_active_enums::TransactionType};

/// Error types for audit operations.
#[derive(Debug, thiserror::Error)]
pub enum AuditError {
    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

/// Groups entry rows by their batch id, preserving batch order.
#[must_use]
pub fn group_batches(
    rows: Vec<ledger_entries::Model>,
) -> BTreeMap<Uuid, Vec<ledger_entries::Model>> {
    let mut batches: BTreeMap<Uuid, Vec<ledger_entries::Model>> = BTreeMap::new();
    for row in rows {
        batches.entry(row.general_ledger_id).or_default().push(row);
    }
    batches
}

/// Reconstructs a posting line from a persisted row.
///
/// Roles are not persisted; the caller supplies the company's account
/// configuration as an account-to-role map, and unknown accounts fall
/// back to `Direct`.
#[must_use]
pub fn to_posting_line(
    row: &ledger_entries::Model,
    role_map: &HashMap<Uuid, AccountRole>,
) -> PostingLine {
    PostingLine {
        role: role_map
            .get(&row.account_id)
            .copied()
            .unwrap_or(AccountRole::Direct),
        account_id: AccountId::from_uuid(row.account_id),
        nature: row.account_nature.clone().into(),
        amount: row.amount,
    }
}

/// Audit repository for read-only invariant scans.
#[derive(Debug, Clone)]
pub struct AuditRepository {
    db: DatabaseConnection,
}

impl AuditRepository {
    /// Creates a new audit repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Scans historic batches for invariant drift.
    ///
    /// The hard debit/credit check runs on every batch. The receivable
    /// consistency check additionally runs on invoice batches when a
    /// role map is supplied (it needs to know which accounts play which
    /// role).
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn scan_for_imbalance(
        &self,
        company_id: CompanyId,
        since: NaiveDate,
        role_map: &HashMap<Uuid, AccountRole>,
    ) -> Result<Vec<AuditFinding>, AuditError> {
        let rows = ledger_entries::Entity::find()
            .filter(ledger_entries::Column::CompanyId.eq(company_id.into_inner()))
            .filter(ledger_entries::Column::TransactionDate.gte(since))
            .order_by_asc(ledger_entries::Column::GeneralLedgerId)
            .order_by_asc(ledger_entries::Column::CreatedAt)
            .all(&self.db)
            .await?;

        let batches = group_batches(rows);
        let batch_count = batches.len();
        let mut findings = Vec::new();

        for (batch_uuid, entries) in batches {
            let is_invoice = entries
                .iter()
                .any(|e| e.transaction_type == TransactionType::Invoice);
            let reference = entries
                .first()
                .map(|e| e.reference_number.clone())
                .unwrap_or_default();

            let lines: Vec<PostingLine> = entries
                .iter()
                .map(|row| to_posting_line(row, role_map))
                .collect();

            let batch_findings = audit_batch(
                BatchId::from_uuid(batch_uuid),
                &reference,
                &lines,
                is_invoice && !role_map.is_empty(),
            );
            for finding in &batch_findings {
                warn!(
                    batch_id = %finding.batch_id,
                    reference = %finding.reference_number,
                    severity = ?finding.severity,
                    kind = ?finding.kind,
                    delta = %finding.delta,
                    "audit finding"
                );
            }
            findings.extend(batch_findings);
        }

        info!(
            %company_id,
            %since,
            batches = batch_count,
            findings = findings.len(),
            "imbalance scan complete"
        );

        Ok(findings)
    }
}
