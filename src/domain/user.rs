use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

pub type UserId = i64;

/// A registered ledger owner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub name: String,
    /// Unique across all users
    pub email: String,
    #[serde(skip_serializing)]
    pub secret_hash: String,
}

/// A user that has not been stored yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub secret_hash: String,
}

impl NewUser {
    /// The secret is hashed immediately; the plain value is never kept.
    pub fn new(name: impl Into<String>, email: impl Into<String>, secret: &str) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
            secret_hash: hash_secret(secret),
        }
    }

    pub fn into_user(self, id: UserId) -> User {
        User {
            id,
            name: self.name,
            email: self.email,
            secret_hash: self.secret_hash,
        }
    }
}

/// Hex-encoded SHA-256 digest of a secret.
pub fn hash_secret(secret: &str) -> String {
    hex::encode(Sha256::digest(secret.as_bytes()))
}
