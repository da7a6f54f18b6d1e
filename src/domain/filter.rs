use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{EntryKind, EntryStatus, LedgerEntry, UserId};

/// Query-by-example filter for entries.
///
/// Every field that is set must match; unset fields impose no constraint.
/// The description matches as a case-insensitive substring, all other
/// fields by equality.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EntryFilter {
    pub description: Option<String>,
    pub month: Option<i32>,
    pub year: Option<i32>,
    pub owner: Option<UserId>,
    pub amount: Option<Decimal>,
    pub kind: Option<EntryKind>,
    pub status: Option<EntryStatus>,
}

impl EntryFilter {
    pub fn for_owner(owner: UserId) -> Self {
        Self {
            owner: Some(owner),
            ..Self::default()
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_month(mut self, month: i32) -> Self {
        self.month = Some(month);
        self
    }

    pub fn with_year(mut self, year: i32) -> Self {
        self.year = Some(year);
        self
    }

    pub fn with_kind(mut self, kind: EntryKind) -> Self {
        self.kind = Some(kind);
        self
    }

    pub fn with_status(mut self, status: EntryStatus) -> Self {
        self.status = Some(status);
        self
    }

    /// Check a stored entry against this filter.
    pub fn matches(&self, entry: &LedgerEntry) -> bool {
        if let Some(needle) = &self.description {
            let needle = needle.to_lowercase();
            let found = entry
                .description
                .as_deref()
                .is_some_and(|d| d.to_lowercase().contains(&needle));
            if !found {
                return false;
            }
        }

        exact(&self.month, &entry.month)
            && exact(&self.year, &entry.year)
            && exact(&self.owner, &entry.owner)
            && exact(&self.amount, &entry.amount)
            && exact(&self.kind, &entry.kind)
            && exact(&self.status, &entry.status)
    }
}

fn exact<T: PartialEq>(wanted: &Option<T>, actual: &Option<T>) -> bool {
    match wanted {
        Some(w) => actual.as_ref() == Some(w),
        None => true,
    }
}
