use std::sync::Arc;

use chrono::Utc;
use rust_decimal::Decimal;
use tracing::{debug, info, warn};

use crate::domain::{EntryFilter, EntryId, EntryKind, EntryStatus, LedgerEntry, UserId};
use crate::storage::{EntryStore, UserLookup};

use super::{EntryValidator, LedgerError};

/// Application service for ledger entries: writes, searches, status
/// changes and balances. This is the primary interface for any client.
///
/// Holds no state of its own; everything durable lives in the stores.
pub struct LedgerService {
    entries: Arc<dyn EntryStore>,
    users: Arc<dyn UserLookup>,
    validator: EntryValidator,
}

impl LedgerService {
    /// Create a new ledger service over the given stores.
    pub fn new(entries: Arc<dyn EntryStore>, users: Arc<dyn UserLookup>) -> Self {
        let validator = EntryValidator::new(Arc::clone(&users));
        Self {
            entries,
            users,
            validator,
        }
    }

    /// Validate and store a new entry.
    ///
    /// The stored entry always starts as `Pending` and gets today's date as
    /// registration date, whatever the caller supplied.
    pub async fn create(&self, mut entry: LedgerEntry) -> Result<LedgerEntry, LedgerError> {
        self.checked(&entry).await?;

        entry.status = Some(EntryStatus::Pending);
        entry.registration_date = Some(Utc::now().date_naive());

        let stored = self.entries.save(&entry).await?;
        info!(id = ?stored.id, owner = ?stored.owner, "Created entry");
        Ok(stored)
    }

    /// Validate and store changes to an existing entry.
    pub async fn update(&self, entry: LedgerEntry) -> Result<LedgerEntry, LedgerError> {
        let id = entry.id.ok_or(LedgerError::MissingId)?;
        self.checked(&entry).await?;

        let stored = self.entries.save(&entry).await?;
        info!(id, status = ?stored.status, "Updated entry");
        Ok(stored)
    }

    /// Delete an entry. An entry that was never stored has nothing to
    /// delete, so a missing id is accepted silently.
    pub async fn delete(&self, entry: &LedgerEntry) -> Result<(), LedgerError> {
        let Some(id) = entry.id else {
            debug!("Delete requested for an entry without id, nothing to do");
            return Ok(());
        };

        self.entries.delete_by_id(id).await?;
        info!(id, "Deleted entry");
        Ok(())
    }

    /// Find entries matching every set field of the filter.
    pub async fn search(&self, filter: &EntryFilter) -> Result<Vec<LedgerEntry>, LedgerError> {
        let found = self.entries.find_matching(filter).await?;
        debug!(count = found.len(), "Searched entries");
        Ok(found)
    }

    /// Change the status of an entry and store it through `update`, so the
    /// entry is validated again.
    pub async fn update_status(
        &self,
        mut entry: LedgerEntry,
        status: EntryStatus,
    ) -> Result<LedgerEntry, LedgerError> {
        entry.status = Some(status);
        self.update(entry).await
    }

    pub async fn find_by_id(&self, id: EntryId) -> Result<Option<LedgerEntry>, LedgerError> {
        Ok(self.entries.find_by_id(id).await?)
    }

    /// Income minus expenses over all of a user's entries.
    pub async fn compute_balance(&self, user_id: UserId) -> Result<Decimal, LedgerError> {
        if self.users.find_user_by_id(user_id).await?.is_none() {
            return Err(LedgerError::UserNotFound(user_id));
        }

        let income = self
            .entries
            .sum_amount_by_user_and_kind(user_id, EntryKind::Income)
            .await?
            .unwrap_or(Decimal::ZERO);
        let expense = self
            .entries
            .sum_amount_by_user_and_kind(user_id, EntryKind::Expense)
            .await?
            .unwrap_or(Decimal::ZERO);

        Ok(income - expense)
    }

    async fn checked(&self, entry: &LedgerEntry) -> Result<(), LedgerError> {
        if let Err(e) = self.validator.validate(entry).await {
            if let Some(rule) = e.as_validation() {
                warn!(%rule, "Rejected entry");
            }
            return Err(e);
        }
        Ok(())
    }
}
