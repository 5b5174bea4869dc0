//! Ledger repository: the batch writer.
//!
//! Posting runs inside one database transaction. The balance invariant
//! is checked BEFORE any row is inserted, the document row is locked and
//! flipped `draft -> posted` so a concurrent posting of the same
//! document fails instead of writing twice, and any error rolls the
//! whole batch back. No partial batch is ever visible to readers.

use chrono::Utc;
use kontor_core::ledger::{
    build_entries, build_reversal, verify, Document, EntryNature, PostingError, PostingLine,
};
use kontor_core::money::convert;
use kontor_shared::types::{BatchId, CompanyId, DocumentId};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DatabaseTransaction, DbErr, EntityTrait,
    QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};
use tracing::info;
use uuid::Uuid;

use crate::entities::{
    chart_of_accounts, documents, ledger_entries,
    sea_orm_active_enums::{AccountNature, DocumentStatus, TransactionType},
};

/// Error types for ledger write operations.
#[derive(Debug, thiserror::Error)]
pub enum LedgerWriteError {
    /// The posting rules rejected the document (configuration gap,
    /// unbalanced batch, invalid rate, ...).
    #[error(transparent)]
    Posting(#[from] PostingError),

    /// Document not found for this company.
    #[error("Document not found: {0}")]
    DocumentNotFound(Uuid),

    /// Document already left draft; posting it again would double-post.
    #[error("Document {0} has already been posted")]
    DocumentAlreadyPosted(Uuid),

    /// Only posted documents can be voided.
    #[error("Document {0} is not in a voidable state")]
    DocumentNotVoidable(Uuid),

    /// A resolved account does not exist for this company.
    #[error("Account not found: {0}")]
    AccountNotFound(Uuid),

    /// No batch with this identifier exists.
    #[error("Posting batch not found: {0}")]
    BatchNotFound(Uuid),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

/// A successfully written posting batch.
#[derive(Debug, Clone)]
pub struct PostedBatch {
    /// The generated batch identifier.
    pub batch_id: BatchId,
    /// The persisted rows, in rule-set order.
    pub entries: Vec<ledger_entries::Model>,
}

/// Splits a base-currency equivalent onto the entry's side.
#[must_use]
pub fn split_equivalent(nature: EntryNature, equivalent: Decimal) -> (Decimal, Decimal) {
    match nature {
        EntryNature::Debit => (equivalent, Decimal::ZERO),
        EntryNature::Credit => (Decimal::ZERO, equivalent),
    }
}

/// Ledger repository for writing and reading posting batches.
#[derive(Debug, Clone)]
pub struct LedgerRepository {
    db: DatabaseConnection,
}

impl LedgerRepository {
    /// Creates a new ledger repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Posts a document to the ledger.
    ///
    /// Builds the posting lines once, verifies the balance invariant,
    /// then in a single transaction: locks the document row, checks the
    /// `draft` status (the double-posting guard), inserts one entry per
    /// line under a fresh batch id, and flips the document to `posted`.
    ///
    /// # Errors
    ///
    /// Any failure rolls back the transaction; the document keeps its
    /// pre-approval state and no entries are visible.
    pub async fn post_document(&self, document: &Document) -> Result<PostedBatch, LedgerWriteError> {
        let lines = build_entries(document)?;
        verify(&lines).ensure_balanced()?;

        let txn = self.db.begin().await?;

        let doc_row = self
            .lock_document(&txn, document.company_id(), document.id())
            .await?;
        if doc_row.status != DocumentStatus::Draft {
            return Err(LedgerWriteError::DocumentAlreadyPosted(doc_row.id));
        }

        let batch_id = BatchId::from_uuid(Uuid::new_v4());
        let entries = self.insert_lines(&txn, document, batch_id, &lines).await?;

        let now = Utc::now().into();
        let mut active: documents::ActiveModel = doc_row.into();
        active.status = Set(DocumentStatus::Posted);
        active.posted_batch_id = Set(Some(batch_id.into_inner()));
        active.updated_at = Set(now);
        active.update(&txn).await?;

        txn.commit().await?;

        info!(
            %batch_id,
            company_id = %document.company_id(),
            reference = document.reference_number(),
            entry_count = entries.len(),
            "posted batch"
        );

        Ok(PostedBatch { batch_id, entries })
    }

    /// Voids a posted document by writing the reversing batch.
    ///
    /// The reversal flips each persisted line's nature and keeps every
    /// amount identical; nothing is recomputed from the document, whose
    /// state may have changed since the original posting. The new rows
    /// carry `reversal_of` pointing at the original batch.
    ///
    /// # Errors
    ///
    /// Fails when the document is not posted, or its batch is missing.
    pub async fn post_reversal(
        &self,
        company_id: CompanyId,
        document_id: DocumentId,
    ) -> Result<PostedBatch, LedgerWriteError> {
        let txn = self.db.begin().await?;

        let doc_row = self.lock_document(&txn, company_id, document_id).await?;
        if doc_row.status != DocumentStatus::Posted {
            return Err(LedgerWriteError::DocumentNotVoidable(doc_row.id));
        }
        let original_batch = doc_row
            .posted_batch_id
            .ok_or(LedgerWriteError::BatchNotFound(doc_row.id))?;

        let originals = ledger_entries::Entity::find()
            .filter(ledger_entries::Column::GeneralLedgerId.eq(original_batch))
            .order_by_asc(ledger_entries::Column::CreatedAt)
            .order_by_asc(ledger_entries::Column::Id)
            .all(&txn)
            .await?;
        if originals.is_empty() {
            return Err(LedgerWriteError::BatchNotFound(original_batch));
        }

        // Reconstruct the lines and flip them through the same path the
        // rule set uses.
        let original_lines: Vec<PostingLine> = originals
            .iter()
            .map(|row| PostingLine {
                role: kontor_core::ledger::AccountRole::Direct,
                account_id: kontor_shared::types::AccountId::from_uuid(row.account_id),
                nature: row.account_nature.clone().into(),
                amount: row.amount,
            })
            .collect();
        let flipped = build_reversal(&original_lines);

        let batch_id = BatchId::from_uuid(Uuid::new_v4());
        let now = Utc::now().into();
        let mut entries = Vec::with_capacity(originals.len());

        for (original, line) in originals.iter().zip(&flipped) {
            let entry = ledger_entries::ActiveModel {
                id: Set(Uuid::new_v4()),
                general_ledger_id: Set(batch_id.into_inner()),
                company_id: Set(original.company_id),
                document_id: Set(original.document_id),
                account_id: Set(original.account_id),
                account_code: Set(original.account_code.clone()),
                account_name: Set(original.account_name.clone()),
                account_nature: Set(AccountNature::from(line.nature)),
                amount: Set(original.amount),
                exchange_rate: Set(original.exchange_rate),
                // Equivalents swap sides verbatim; never recomputed.
                equivalent_debit_amount: Set(original.equivalent_credit_amount),
                equivalent_credit_amount: Set(original.equivalent_debit_amount),
                reference_number: Set(original.reference_number.clone()),
                transaction_type: Set(TransactionType::Reversal),
                transaction_date: Set(original.transaction_date),
                reversal_of: Set(Some(original_batch)),
                created_at: Set(now),
            };
            entries.push(entry.insert(&txn).await?);
        }

        let mut active: documents::ActiveModel = doc_row.into();
        active.status = Set(DocumentStatus::Voided);
        active.updated_at = Set(now);
        active.update(&txn).await?;

        txn.commit().await?;

        info!(
            %batch_id,
            reversal_of = %original_batch,
            entry_count = entries.len(),
            "posted reversal batch"
        );

        Ok(PostedBatch { batch_id, entries })
    }

    /// Recomputes the balance report for a persisted batch.
    ///
    /// # Errors
    ///
    /// Returns `BatchNotFound` when no rows carry the batch id.
    pub async fn verify_batch(
        &self,
        company_id: CompanyId,
        batch_id: BatchId,
    ) -> Result<kontor_core::ledger::BalanceReport, LedgerWriteError> {
        let rows = ledger_entries::Entity::find()
            .filter(ledger_entries::Column::CompanyId.eq(company_id.into_inner()))
            .filter(ledger_entries::Column::GeneralLedgerId.eq(batch_id.into_inner()))
            .all(&self.db)
            .await?;

        if rows.is_empty() {
            return Err(LedgerWriteError::BatchNotFound(batch_id.into_inner()));
        }

        Ok(kontor_core::ledger::BalanceReport::from_pairs(
            rows.iter()
                .map(|row| (row.account_nature.clone().into(), row.amount)),
        ))
    }

    /// Locks a document row for the duration of the transaction.
    async fn lock_document(
        &self,
        txn: &DatabaseTransaction,
        company_id: CompanyId,
        document_id: DocumentId,
    ) -> Result<documents::Model, LedgerWriteError> {
        documents::Entity::find_by_id(document_id.into_inner())
            .filter(documents::Column::CompanyId.eq(company_id.into_inner()))
            .lock_exclusive()
            .one(txn)
            .await?
            .ok_or(LedgerWriteError::DocumentNotFound(document_id.into_inner()))
    }

    /// Inserts one row per posting line, all under the same batch id.
    async fn insert_lines(
        &self,
        txn: &DatabaseTransaction,
        document: &Document,
        batch_id: BatchId,
        lines: &[PostingLine],
    ) -> Result<Vec<ledger_entries::Model>, LedgerWriteError> {
        let now = Utc::now().into();
        let rate = document.exchange_rate();
        let mut entries = Vec::with_capacity(lines.len());

        for line in lines {
            let account = chart_of_accounts::Entity::find_by_id(line.account_id.into_inner())
                .filter(
                    chart_of_accounts::Column::CompanyId.eq(document.company_id().into_inner()),
                )
                .one(txn)
                .await?
                .ok_or(LedgerWriteError::AccountNotFound(line.account_id.into_inner()))?;

            let equivalent = convert(line.amount, rate).map_err(PostingError::from)?;
            let (equivalent_debit, equivalent_credit) = split_equivalent(line.nature, equivalent);

            let entry = ledger_entries::ActiveModel {
                id: Set(Uuid::new_v4()),
                general_ledger_id: Set(batch_id.into_inner()),
                company_id: Set(document.company_id().into_inner()),
                document_id: Set(Some(document.id().into_inner())),
                account_id: Set(account.id),
                account_code: Set(account.code.clone()),
                account_name: Set(account.name.clone()),
                account_nature: Set(AccountNature::from(line.nature)),
                amount: Set(line.amount),
                exchange_rate: Set(rate),
                equivalent_debit_amount: Set(equivalent_debit),
                equivalent_credit_amount: Set(equivalent_credit),
                reference_number: Set(document.reference_number().to_string()),
                transaction_type: Set(TransactionType::from(document.transaction_type())),
                transaction_date: Set(document.transaction_date()),
                reversal_of: Set(None),
                created_at: Set(now),
            };
            entries.push(entry.insert(txn).await?);
        }

        Ok(entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_split_equivalent() {
        assert_eq!(
            split_equivalent(EntryNature::Debit, dec!(118.00)),
            (dec!(118.00), Decimal::ZERO)
        );
        assert_eq!(
            split_equivalent(EntryNature::Credit, dec!(118.00)),
            (Decimal::ZERO, dec!(118.00))
        );
    }

    #[test]
    fn test_nature_mapping_round_trips() {
        let debit: EntryNature = AccountNature::Debit.into();
        assert_eq!(debit, EntryNature::Debit);
        assert_eq!(AccountNature::from(EntryNature::Credit), AccountNature::Credit);
    }
}
