// Allow dead_code because these helpers are used across different test files
// which are compiled separately
#![allow(dead_code)]

use anyhow::Result;
use finbook::application::LedgerApp;
use finbook::domain::{EntryKind, LedgerEntry, User};
use rust_decimal::Decimal;
use tempfile::TempDir;

/// Helper to create the services over a temporary database
pub async fn test_app() -> Result<(LedgerApp, TempDir)> {
    let temp_dir = TempDir::new()?;
    let db_path = temp_dir.path().join("test.db");
    let app = LedgerApp::init(db_path.to_str().unwrap()).await?;
    Ok((app, temp_dir))
}

/// Register a user whose email is derived from the name
pub async fn register(app: &LedgerApp, name: &str) -> Result<User> {
    let email = format!("{}@example.com", name.to_lowercase());
    Ok(app.users.register(name, email, "secret").await?)
}

/// A complete candidate entry for January 2024
pub fn entry(owner: &User, description: &str, amount: Decimal, kind: EntryKind) -> LedgerEntry {
    LedgerEntry::new(owner.id, description, 1, 2024, amount, kind)
}

/// Store an entry through the service and return it
pub async fn record(
    app: &LedgerApp,
    owner: &User,
    description: &str,
    amount: Decimal,
    kind: EntryKind,
) -> Result<LedgerEntry> {
    Ok(app
        .ledger
        .create(entry(owner, description, amount, kind))
        .await?)
}
