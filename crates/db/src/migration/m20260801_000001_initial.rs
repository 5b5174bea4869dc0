//! Initial database migration.
//!
//! Creates the ledger schema: enums, companies, chart of accounts,
//! exchange rates, documents, and ledger entries. All tenant-scoped
//! uniqueness constraints are `(value, company_id)`, never global.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();

        // ============================================================
        // PART 1: ENUMS
        // ============================================================
        db.execute_unprepared(ENUMS_SQL).await?;

        // ============================================================
        // PART 2: TENANTS
        // ============================================================
        db.execute_unprepared(COMPANIES_SQL).await?;

        // ============================================================
        // PART 3: CHART OF ACCOUNTS
        // ============================================================
        db.execute_unprepared(CHART_OF_ACCOUNTS_SQL).await?;

        // ============================================================
        // PART 4: CURRENCY MANAGEMENT
        // ============================================================
        db.execute_unprepared(EXCHANGE_RATES_SQL).await?;

        // ============================================================
        // PART 5: DOCUMENTS & LEDGER
        // ============================================================
        db.execute_unprepared(DOCUMENTS_SQL).await?;
        db.execute_unprepared(LEDGER_ENTRIES_SQL).await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        db.execute_unprepared(DROP_ALL_SQL).await?;
        Ok(())
    }
}

// ============================================================
// SQL CONSTANTS
// ============================================================

const ENUMS_SQL: &str = r"
-- Account classification
CREATE TYPE account_category AS ENUM (
    'asset',
    'liability',
    'equity',
    'revenue',
    'expense'
);

-- Entry side
CREATE TYPE account_nature AS ENUM ('debit', 'credit');

-- Document lifecycle
CREATE TYPE document_status AS ENUM ('draft', 'posted', 'voided');

-- Transaction type
CREATE TYPE transaction_type AS ENUM (
    'invoice',
    'receipt',
    'adjustment',
    'journal',
    'reversal'
);
";

const COMPANIES_SQL: &str = r"
CREATE TABLE companies (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    name VARCHAR(255) NOT NULL,
    base_currency CHAR(3) NOT NULL,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
);
";

const CHART_OF_ACCOUNTS_SQL: &str = r"
CREATE TABLE chart_of_accounts (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    company_id UUID NOT NULL REFERENCES companies(id) ON DELETE CASCADE,
    code VARCHAR(50) NOT NULL,
    name VARCHAR(255) NOT NULL,
    category account_category NOT NULL,
    parent_id UUID REFERENCES chart_of_accounts(id),
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    UNIQUE (company_id, code)
);

CREATE INDEX idx_coa_company ON chart_of_accounts(company_id);
CREATE INDEX idx_coa_parent ON chart_of_accounts(parent_id) WHERE parent_id IS NOT NULL;
";

const EXCHANGE_RATES_SQL: &str = r"
CREATE TABLE exchange_rates (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    company_id UUID NOT NULL REFERENCES companies(id) ON DELETE CASCADE,
    from_currency CHAR(3) NOT NULL,
    to_currency CHAR(3) NOT NULL,
    rate NUMERIC(19, 6) NOT NULL,
    effective_date DATE NOT NULL,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    CONSTRAINT chk_rate_positive CHECK (rate > 0),
    CONSTRAINT chk_currencies_differ CHECK (from_currency <> to_currency),
    UNIQUE (company_id, from_currency, to_currency, effective_date)
);

CREATE INDEX idx_rates_lookup
    ON exchange_rates(company_id, from_currency, to_currency, effective_date DESC);
";

const DOCUMENTS_SQL: &str = r"
CREATE TABLE documents (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    company_id UUID NOT NULL REFERENCES companies(id) ON DELETE CASCADE,
    document_type transaction_type NOT NULL,
    reference_number VARCHAR(100) NOT NULL,
    transaction_date DATE NOT NULL,
    currency CHAR(3) NOT NULL,
    status document_status NOT NULL DEFAULT 'draft',
    posted_batch_id UUID,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    UNIQUE (company_id, reference_number)
);

CREATE INDEX idx_doc_company_status ON documents(company_id, status);
CREATE INDEX idx_doc_company_date ON documents(company_id, transaction_date);
";

const LEDGER_ENTRIES_SQL: &str = r"
CREATE TABLE ledger_entries (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    general_ledger_id UUID NOT NULL,
    company_id UUID NOT NULL REFERENCES companies(id) ON DELETE CASCADE,
    document_id UUID REFERENCES documents(id),
    account_id UUID NOT NULL REFERENCES chart_of_accounts(id),
    account_code VARCHAR(50) NOT NULL,
    account_name VARCHAR(255) NOT NULL,
    account_nature account_nature NOT NULL,
    amount NUMERIC(19, 2) NOT NULL,
    exchange_rate NUMERIC(19, 6) NOT NULL DEFAULT 1,
    equivalent_debit_amount NUMERIC(19, 2) NOT NULL DEFAULT 0,
    equivalent_credit_amount NUMERIC(19, 2) NOT NULL DEFAULT 0,
    reference_number VARCHAR(100) NOT NULL,
    transaction_type transaction_type NOT NULL,
    transaction_date DATE NOT NULL,
    reversal_of UUID,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    CONSTRAINT chk_amount_non_negative CHECK (amount >= 0),
    CONSTRAINT chk_exchange_rate_positive CHECK (exchange_rate > 0),
    CONSTRAINT chk_equivalent_matches_nature CHECK (
        (account_nature = 'debit' AND equivalent_credit_amount = 0)
        OR (account_nature = 'credit' AND equivalent_debit_amount = 0)
    )
);

CREATE INDEX idx_le_batch ON ledger_entries(general_ledger_id);
CREATE INDEX idx_le_company_date ON ledger_entries(company_id, transaction_date);
CREATE INDEX idx_le_account ON ledger_entries(account_id);
CREATE INDEX idx_le_reference ON ledger_entries(company_id, reference_number);
";

const DROP_ALL_SQL: &str = r"
DROP TABLE IF EXISTS ledger_entries CASCADE;
DROP TABLE IF EXISTS documents CASCADE;
DROP TABLE IF EXISTS exchange_rates CASCADE;
DROP TABLE IF EXISTS chart_of_accounts CASCADE;
DROP TABLE IF EXISTS companies CASCADE;

DROP TYPE IF EXISTS transaction_type;
DROP TYPE IF EXISTS document_status;
DROP TYPE IF EXISTS account_nature;
DROP TYPE IF EXISTS account_category;
";
