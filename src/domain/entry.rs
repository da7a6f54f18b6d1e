use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::UserId;

pub type EntryId = i64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum EntryKind {
    /// Money coming in (salary, refunds, ...)
    Income,
    /// Money going out
    Expense,
}

impl EntryKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntryKind::Income => "INCOME",
            EntryKind::Expense => "EXPENSE",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_uppercase().as_str() {
            "INCOME" => Some(EntryKind::Income),
            "EXPENSE" => Some(EntryKind::Expense),
            _ => None,
        }
    }
}

impl std::fmt::Display for EntryKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Lifecycle of an entry. Every entry starts as `Pending`; any status may
/// move to any other.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum EntryStatus {
    Pending,
    Settled,
    Cancelled,
}

impl EntryStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntryStatus::Pending => "PENDING",
            EntryStatus::Settled => "SETTLED",
            EntryStatus::Cancelled => "CANCELLED",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_uppercase().as_str() {
            "PENDING" => Some(EntryStatus::Pending),
            "SETTLED" => Some(EntryStatus::Settled),
            "CANCELLED" => Some(EntryStatus::Cancelled),
            _ => None,
        }
    }
}

impl std::fmt::Display for EntryStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A single income or expense movement.
///
/// User-settable fields are optional so that an incomplete candidate can be
/// represented and rejected by validation. An entry without `id` has not
/// been persisted yet. Entries read back from storage have every field set.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LedgerEntry {
    pub id: Option<EntryId>,
    pub description: Option<String>,
    /// Month of competence, 1-12
    pub month: Option<i32>,
    /// Four-digit year of competence
    pub year: Option<i32>,
    pub owner: Option<UserId>,
    /// Always positive; the direction comes from `kind`
    pub amount: Option<Decimal>,
    pub kind: Option<EntryKind>,
    pub status: Option<EntryStatus>,
    /// Assigned once when the entry is created
    pub registration_date: Option<NaiveDate>,
}

impl LedgerEntry {
    /// Build a complete candidate. Status and registration date are left
    /// for the service to assign.
    pub fn new(
        owner: UserId,
        description: impl Into<String>,
        month: i32,
        year: i32,
        amount: Decimal,
        kind: EntryKind,
    ) -> Self {
        Self {
            id: None,
            description: Some(description.into()),
            month: Some(month),
            year: Some(year),
            owner: Some(owner),
            amount: Some(amount),
            kind: Some(kind),
            status: None,
            registration_date: None,
        }
    }

    pub fn with_id(mut self, id: EntryId) -> Self {
        self.id = Some(id);
        self
    }

    pub fn with_status(mut self, status: EntryStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn is_persisted(&self) -> bool {
        self.id.is_some()
    }
}
