//! Offline ledger imbalance scanner.
//!
//! Usage:
//!   audit <company-id> [since-date]
//!
//! Re-verifies the balance invariant over historic posting batches and
//! reports drift without mutating anything. Exits non-zero when any
//! HIGH severity finding (hard debit/credit imbalance) is present.

use std::collections::HashMap;
use std::process::ExitCode;
use std::str::FromStr;

use chrono::{Duration, NaiveDate, Utc};
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use kontor_core::ledger::Severity;
use kontor_db::{connect, AuditRepository};
use kontor_shared::types::CompanyId;
use kontor_shared::AppConfig;

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "kontor=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let mut args = std::env::args().skip(1);
    let Some(company_arg) = args.next() else {
        error!("usage: audit <company-id> [since-date]");
        return Ok(ExitCode::from(2));
    };
    let company_id = CompanyId::from_str(&company_arg)
        .map_err(|e| anyhow::anyhow!("invalid company id '{company_arg}': {e}"))?;

    // Load configuration
    let config = AppConfig::load()?;

    let since = match args.next() {
        Some(date_arg) => NaiveDate::from_str(&date_arg)
            .map_err(|e| anyhow::anyhow!("invalid since-date '{date_arg}': {e}"))?,
        None => (Utc::now() - Duration::days(i64::from(config.audit.lookback_days))).date_naive(),
    };

    // Connect to database
    let db = connect(&config.database.url).await?;
    info!("Connected to database");

    let audit = AuditRepository::new(db);
    // Without the company's role configuration only the hard balance
    // check runs; see AuditRepository::scan_for_imbalance.
    let findings = audit
        .scan_for_imbalance(company_id, since, &HashMap::new())
        .await?;

    let high = findings
        .iter()
        .filter(|f| f.severity == Severity::High)
        .count();
    let medium = findings.len() - high;
    info!(%company_id, %since, high, medium, "scan finished");

    if high > 0 {
        return Ok(ExitCode::FAILURE);
    }
    Ok(ExitCode::SUCCESS)
}
