use std::sync::Arc;

use tracing::{info, warn};

use crate::domain::{NewUser, User, UserId};
use crate::storage::UserStore;

use super::UserError;

/// Registration and lookup of ledger owners.
pub struct UserService {
    users: Arc<dyn UserStore>,
}

impl UserService {
    pub fn new(users: Arc<dyn UserStore>) -> Self {
        Self { users }
    }

    /// Register a new user. The email must not belong to anyone yet.
    pub async fn register(
        &self,
        name: impl Into<String>,
        email: impl Into<String>,
        secret: &str,
    ) -> Result<User, UserError> {
        let email = email.into();
        self.ensure_email_available(&email).await?;

        let user = match self.users.save_user(NewUser::new(name, email.clone(), secret)).await {
            Ok(user) => user,
            // someone registered the same email between the check and the insert
            Err(e) => {
                if self.users.exists_by_email(&email).await? {
                    warn!(email = %email, "Email registered concurrently");
                    return Err(UserError::EmailTaken);
                }
                return Err(e.into());
            }
        };
        info!(id = user.id, "Registered user");
        Ok(user)
    }

    pub async fn ensure_email_available(&self, email: &str) -> Result<(), UserError> {
        if self.users.exists_by_email(email).await? {
            warn!(email, "Email already registered");
            return Err(UserError::EmailTaken);
        }
        Ok(())
    }

    pub async fn find_by_id(&self, id: UserId) -> Result<Option<User>, UserError> {
        Ok(self.users.find_user_by_id(id).await?)
    }

    pub async fn find_by_email(&self, email: &str) -> Result<Option<User>, UserError> {
        Ok(self.users.find_user_by_email(email).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::UserLookup;
    use anyhow::Result;
    use async_trait::async_trait;
    use std::sync::Mutex;

    #[derive(Default)]
    struct MemoryUsers {
        users: Mutex<Vec<User>>,
    }

    #[async_trait]
    impl UserLookup for MemoryUsers {
        async fn find_user_by_id(&self, id: UserId) -> Result<Option<User>> {
            Ok(self.users.lock().unwrap().iter().find(|u| u.id == id).cloned())
        }
    }

    #[async_trait]
    impl UserStore for MemoryUsers {
        async fn save_user(&self, user: NewUser) -> Result<User> {
            let mut users = self.users.lock().unwrap();
            let user = user.into_user(users.len() as UserId + 1);
            users.push(user.clone());
            Ok(user)
        }

        async fn exists_by_email(&self, email: &str) -> Result<bool> {
            Ok(self.users.lock().unwrap().iter().any(|u| u.email == email))
        }

        async fn find_user_by_email(&self, email: &str) -> Result<Option<User>> {
            Ok(self
                .users
                .lock()
                .unwrap()
                .iter()
                .find(|u| u.email == email)
                .cloned())
        }
    }

    #[tokio::test]
    async fn test_register_assigns_id() {
        let service = UserService::new(Arc::new(MemoryUsers::default()));

        let user = service
            .register("Ana", "ana@example.com", "secret")
            .await
            .unwrap();

        assert_eq!(user.id, 1);
        assert_eq!(service.find_by_id(1).await.unwrap(), Some(user.clone()));
        assert_eq!(
            service.find_by_email("ana@example.com").await.unwrap(),
            Some(user)
        );
    }

    #[tokio::test]
    async fn test_register_rejects_duplicate_email() {
        let store = Arc::new(MemoryUsers::default());
        let service = UserService::new(store.clone());
        service
            .register("Ana", "ana@example.com", "secret")
            .await
            .unwrap();

        let err = service
            .register("Other Ana", "ana@example.com", "x")
            .await
            .unwrap_err();

        assert!(matches!(err, UserError::EmailTaken));
        assert_eq!(
            err.to_string(),
            "Já existe um usuário cadastrado com esse email."
        );
        assert_eq!(store.users.lock().unwrap().len(), 1);
    }

    /// Loses the race: the email is free when checked, but another
    /// registration lands before the insert.
    #[derive(Default)]
    struct RacedUsers {
        taken: Mutex<bool>,
    }

    #[async_trait]
    impl UserLookup for RacedUsers {
        async fn find_user_by_id(&self, _id: UserId) -> Result<Option<User>> {
            Ok(None)
        }
    }

    #[async_trait]
    impl UserStore for RacedUsers {
        async fn save_user(&self, _user: NewUser) -> Result<User> {
            *self.taken.lock().unwrap() = true;
            Err(anyhow::anyhow!("UNIQUE constraint failed: users.email"))
        }

        async fn exists_by_email(&self, _email: &str) -> Result<bool> {
            Ok(*self.taken.lock().unwrap())
        }

        async fn find_user_by_email(&self, _email: &str) -> Result<Option<User>> {
            Ok(None)
        }
    }

    /// Always fails to insert, for reasons unrelated to the email.
    struct FailingUsers;

    #[async_trait]
    impl UserLookup for FailingUsers {
        async fn find_user_by_id(&self, _id: UserId) -> Result<Option<User>> {
            Ok(None)
        }
    }

    #[async_trait]
    impl UserStore for FailingUsers {
        async fn save_user(&self, _user: NewUser) -> Result<User> {
            Err(anyhow::anyhow!("disk I/O error"))
        }

        async fn exists_by_email(&self, _email: &str) -> Result<bool> {
            Ok(false)
        }

        async fn find_user_by_email(&self, _email: &str) -> Result<Option<User>> {
            Ok(None)
        }
    }

    #[tokio::test]
    async fn test_concurrent_duplicate_email_is_reported_as_taken() {
        let service = UserService::new(Arc::new(RacedUsers::default()));

        let err = service
            .register("Ana", "ana@example.com", "secret")
            .await
            .unwrap_err();

        assert!(matches!(err, UserError::EmailTaken));
    }

    #[tokio::test]
    async fn test_other_insert_failures_stay_store_errors() {
        let service = UserService::new(Arc::new(FailingUsers));

        let err = service
            .register("Ana", "ana@example.com", "secret")
            .await
            .unwrap_err();

        assert!(matches!(err, UserError::Store(_)));
    }
}
