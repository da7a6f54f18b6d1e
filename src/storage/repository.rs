use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use sqlx::{Row, SqlitePool};

use crate::domain::{
    EntryFilter, EntryId, EntryKind, EntryStatus, LedgerEntry, NewUser, User, UserId,
};

use super::{EntryStore, MIGRATION_001_INITIAL, UserLookup, UserStore};

const ENTRY_COLUMNS: &str =
    "id, description, month, year, user_id, amount, kind, status, registration_date";

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Required columns of an entry, checked before any write.
struct EntryFields<'a> {
    description: &'a str,
    month: i32,
    year: i32,
    owner: UserId,
    amount: Decimal,
    kind: EntryKind,
}

impl<'a> EntryFields<'a> {
    fn of(entry: &'a LedgerEntry) -> Result<Self> {
        Ok(Self {
            description: entry
                .description
                .as_deref()
                .context("Cannot store an entry without description")?,
            month: entry.month.context("Cannot store an entry without month")?,
            year: entry.year.context("Cannot store an entry without year")?,
            owner: entry.owner.context("Cannot store an entry without owner")?,
            amount: entry.amount.context("Cannot store an entry without amount")?,
            kind: entry.kind.context("Cannot store an entry without kind")?,
        })
    }
}

/// SQLite-backed store for users and ledger entries.
pub struct Repository {
    pool: SqlitePool,
}

impl Repository {
    /// Create a new repository with the given SQLite connection pool.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Connect to a SQLite database at the given URL.
    pub async fn connect(database_url: &str) -> Result<Self> {
        let pool = SqlitePool::connect(database_url)
            .await
            .context("Failed to connect to database")?;
        Ok(Self::new(pool))
    }

    /// Run database migrations.
    pub async fn migrate(&self) -> Result<()> {
        sqlx::query(MIGRATION_001_INITIAL)
            .execute(&self.pool)
            .await
            .context("Failed to run migration 001")?;
        Ok(())
    }

    /// Initialize a new database (connect + migrate).
    pub async fn init(database_url: &str) -> Result<Self> {
        let repo = Self::connect(database_url).await?;
        repo.migrate().await?;
        Ok(repo)
    }

    async fn insert_entry(
        &self,
        id: Option<EntryId>,
        entry: &LedgerEntry,
        status: EntryStatus,
        registration_date: NaiveDate,
    ) -> Result<EntryId> {
        let fields = EntryFields::of(entry)?;

        let row = sqlx::query(
            r#"
            INSERT INTO entries (id, description, month, year, user_id, amount, kind, status, registration_date)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            RETURNING id
            "#,
        )
        .bind(id)
        .bind(fields.description)
        .bind(fields.month)
        .bind(fields.year)
        .bind(fields.owner)
        .bind(fields.amount.to_string())
        .bind(fields.kind.as_str())
        .bind(status.as_str())
        .bind(registration_date.format(DATE_FORMAT).to_string())
        .fetch_one(&self.pool)
        .await
        .context("Failed to insert entry")?;

        Ok(row.get("id"))
    }

    fn row_to_entry(row: &sqlx::sqlite::SqliteRow) -> Result<LedgerEntry> {
        let amount_str: String = row.get("amount");
        let kind_str: String = row.get("kind");
        let status_str: String = row.get("status");
        let date_str: String = row.get("registration_date");

        Ok(LedgerEntry {
            id: Some(row.get("id")),
            description: Some(row.get("description")),
            month: Some(row.get("month")),
            year: Some(row.get("year")),
            owner: Some(row.get("user_id")),
            amount: Some(
                amount_str
                    .parse::<Decimal>()
                    .with_context(|| format!("Invalid amount: {}", amount_str))?,
            ),
            kind: Some(
                EntryKind::from_str(&kind_str)
                    .ok_or_else(|| anyhow::anyhow!("Invalid entry kind: {}", kind_str))?,
            ),
            status: Some(
                EntryStatus::from_str(&status_str)
                    .ok_or_else(|| anyhow::anyhow!("Invalid entry status: {}", status_str))?,
            ),
            registration_date: Some(
                NaiveDate::parse_from_str(&date_str, DATE_FORMAT)
                    .context("Invalid registration_date")?,
            ),
        })
    }

    fn row_to_user(row: &sqlx::sqlite::SqliteRow) -> User {
        User {
            id: row.get("id"),
            name: row.get("name"),
            email: row.get("email"),
            secret_hash: row.get("secret_hash"),
        }
    }
}

#[async_trait]
impl EntryStore for Repository {
    async fn save(&self, entry: &LedgerEntry) -> Result<LedgerEntry> {
        let EntryFields {
            description,
            month,
            year,
            owner,
            amount,
            kind,
        } = EntryFields::of(entry)?;
        let today = Utc::now().date_naive();

        let id: EntryId = match entry.id {
            None => {
                let status = entry.status.unwrap_or(EntryStatus::Pending);
                let registration_date = entry.registration_date.unwrap_or(today);
                self.insert_entry(None, entry, status, registration_date)
                    .await?
            }

            Some(id) => {
                // status is kept as stored unless the caller sets one;
                // registration_date is never rewritten
                let updated = sqlx::query(
                    r#"
                    UPDATE entries
                    SET description = ?, month = ?, year = ?, user_id = ?, amount = ?, kind = ?,
                        status = COALESCE(?, status)
                    WHERE id = ?
                    "#,
                )
                .bind(description)
                .bind(month)
                .bind(year)
                .bind(owner)
                .bind(amount.to_string())
                .bind(kind.as_str())
                .bind(entry.status.map(|s| s.as_str()))
                .bind(id)
                .execute(&self.pool)
                .await
                .context("Failed to update entry")?;

                // an unknown id starts a brand new entry
                if updated.rows_affected() == 0 {
                    self.insert_entry(Some(id), entry, EntryStatus::Pending, today)
                        .await?;
                }
                id
            }
        };

        self.find_by_id(id)
            .await?
            .ok_or_else(|| anyhow::anyhow!("Entry {} missing right after save", id))
    }

    async fn delete_by_id(&self, id: EntryId) -> Result<()> {
        sqlx::query("DELETE FROM entries WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .context("Failed to delete entry")?;
        Ok(())
    }

    async fn find_by_id(&self, id: EntryId) -> Result<Option<LedgerEntry>> {
        let query = format!("SELECT {} FROM entries WHERE id = ?", ENTRY_COLUMNS);
        let row = sqlx::query(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .context("Failed to fetch entry")?;

        match row {
            Some(row) => Ok(Some(Self::row_to_entry(&row)?)),
            None => Ok(None),
        }
    }

    async fn find_matching(&self, filter: &EntryFilter) -> Result<Vec<LedgerEntry>> {
        // Exact fields are narrowed in SQL. Description and amount are checked
        // by `EntryFilter::matches`: SQLite's LIKE only folds ASCII and amounts
        // are stored as text.
        let mut query = format!("SELECT {} FROM entries WHERE 1=1", ENTRY_COLUMNS);

        if filter.owner.is_some() {
            query.push_str(" AND user_id = ?");
        }
        if filter.month.is_some() {
            query.push_str(" AND month = ?");
        }
        if filter.year.is_some() {
            query.push_str(" AND year = ?");
        }
        if filter.kind.is_some() {
            query.push_str(" AND kind = ?");
        }
        if filter.status.is_some() {
            query.push_str(" AND status = ?");
        }

        query.push_str(" ORDER BY id");

        let mut sql_query = sqlx::query(&query);

        if let Some(owner) = filter.owner {
            sql_query = sql_query.bind(owner);
        }
        if let Some(month) = filter.month {
            sql_query = sql_query.bind(month);
        }
        if let Some(year) = filter.year {
            sql_query = sql_query.bind(year);
        }
        if let Some(kind) = filter.kind {
            sql_query = sql_query.bind(kind.as_str());
        }
        if let Some(status) = filter.status {
            sql_query = sql_query.bind(status.as_str());
        }

        let rows = sql_query
            .fetch_all(&self.pool)
            .await
            .context("Failed to search entries")?;

        let mut entries = Vec::with_capacity(rows.len());
        for row in &rows {
            let entry = Self::row_to_entry(row)?;
            if filter.matches(&entry) {
                entries.push(entry);
            }
        }
        Ok(entries)
    }

    async fn sum_amount_by_user_and_kind(
        &self,
        user_id: UserId,
        kind: EntryKind,
    ) -> Result<Option<Decimal>> {
        // Amounts are summed as Decimal, SQLite's SUM would go through REAL.
        let rows = sqlx::query("SELECT amount FROM entries WHERE user_id = ? AND kind = ?")
            .bind(user_id)
            .bind(kind.as_str())
            .fetch_all(&self.pool)
            .await
            .context("Failed to sum entries")?;

        if rows.is_empty() {
            return Ok(None);
        }

        let mut total = Decimal::ZERO;
        for row in &rows {
            let amount_str: String = row.get("amount");
            total += amount_str
                .parse::<Decimal>()
                .with_context(|| format!("Invalid amount: {}", amount_str))?;
        }
        Ok(Some(total))
    }
}

#[async_trait]
impl UserLookup for Repository {
    async fn find_user_by_id(&self, id: UserId) -> Result<Option<User>> {
        let row = sqlx::query("SELECT id, name, email, secret_hash FROM users WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .context("Failed to fetch user")?;

        Ok(row.as_ref().map(Self::row_to_user))
    }
}

#[async_trait]
impl UserStore for Repository {
    async fn save_user(&self, user: NewUser) -> Result<User> {
        let id: UserId = sqlx::query(
            r#"
            INSERT INTO users (name, email, secret_hash)
            VALUES (?, ?, ?)
            RETURNING id
            "#,
        )
        .bind(&user.name)
        .bind(&user.email)
        .bind(&user.secret_hash)
        .fetch_one(&self.pool)
        .await
        .context("Failed to save user")?
        .get("id");

        Ok(user.into_user(id))
    }

    async fn exists_by_email(&self, email: &str) -> Result<bool> {
        let count: i64 = sqlx::query("SELECT COUNT(*) as count FROM users WHERE email = ?")
            .bind(email)
            .fetch_one(&self.pool)
            .await
            .context("Failed to check user email")?
            .get("count");

        Ok(count > 0)
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>> {
        let row = sqlx::query("SELECT id, name, email, secret_hash FROM users WHERE email = ?")
            .bind(email)
            .fetch_optional(&self.pool)
            .await
            .context("Failed to fetch user by email")?;

        Ok(row.as_ref().map(Self::row_to_user))
    }
}
