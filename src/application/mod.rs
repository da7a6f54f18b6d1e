// Application layer - use cases and orchestration over the storage ports

pub mod error;
mod service;
mod users;
mod validator;

pub use error::*;
pub use service::LedgerService;
pub use users::UserService;
pub use validator::EntryValidator;

use std::sync::Arc;

use crate::storage::Repository;

/// Services wired over one shared SQLite repository.
pub struct LedgerApp {
    pub ledger: LedgerService,
    pub users: UserService,
}

impl LedgerApp {
    /// Wire both services over the given repository.
    pub fn new(repo: Repository) -> Self {
        let repo = Arc::new(repo);
        Self {
            ledger: LedgerService::new(repo.clone(), repo.clone()),
            users: UserService::new(repo),
        }
    }

    /// Initialize a new database at the given path.
    pub async fn init(database_path: &str) -> anyhow::Result<Self> {
        let db_url = format!("sqlite:{}?mode=rwc", database_path);
        let repo = Repository::init(&db_url).await?;
        Ok(Self::new(repo))
    }

    /// Connect to an existing database.
    pub async fn connect(database_path: &str) -> anyhow::Result<Self> {
        let db_url = format!("sqlite:{}", database_path);
        let repo = Repository::connect(&db_url).await?;
        Ok(Self::new(repo))
    }
}
