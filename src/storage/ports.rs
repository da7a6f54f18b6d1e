//! Collaborator interfaces the application layer talks to.
//!
//! `Repository` implements all of them on SQLite; tests substitute their own.

use anyhow::Result;
use async_trait::async_trait;
use rust_decimal::Decimal;

use crate::domain::{EntryFilter, EntryId, EntryKind, LedgerEntry, NewUser, User, UserId};

/// Persistence for ledger entries.
#[async_trait]
pub trait EntryStore: Send + Sync {
    /// Insert when `entry.id` is unset, otherwise upsert by id.
    ///
    /// Updating keeps the stored status when `entry.status` is unset and
    /// never changes the registration date. An id with no stored row is
    /// inserted as a new `Pending` entry registered today.
    /// Returns the entry as stored, id included.
    async fn save(&self, entry: &LedgerEntry) -> Result<LedgerEntry>;

    async fn delete_by_id(&self, id: EntryId) -> Result<()>;

    async fn find_by_id(&self, id: EntryId) -> Result<Option<LedgerEntry>>;

    /// All entries accepted by `EntryFilter::matches`.
    async fn find_matching(&self, filter: &EntryFilter) -> Result<Vec<LedgerEntry>>;

    /// Sum of amounts for one user and kind, `None` when there are no rows.
    async fn sum_amount_by_user_and_kind(
        &self,
        user_id: UserId,
        kind: EntryKind,
    ) -> Result<Option<Decimal>>;
}

/// Read access to users, used to resolve entry owners.
#[async_trait]
pub trait UserLookup: Send + Sync {
    async fn find_user_by_id(&self, id: UserId) -> Result<Option<User>>;
}

/// Full user persistence, needed only for registration.
#[async_trait]
pub trait UserStore: UserLookup {
    async fn save_user(&self, user: NewUser) -> Result<User>;

    async fn exists_by_email(&self, email: &str) -> Result<bool>;

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>>;
}
