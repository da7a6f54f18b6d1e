use std::sync::Arc;

use rust_decimal::Decimal;

use crate::domain::LedgerEntry;
use crate::storage::UserLookup;

use super::{LedgerError, ValidationError};

/// Checks a candidate entry against the ledger's business rules.
///
/// Rules run in a fixed order and the first failure is reported:
/// description, month, year, owner, amount, kind.
#[derive(Clone)]
pub struct EntryValidator {
    users: Arc<dyn UserLookup>,
}

impl EntryValidator {
    pub fn new(users: Arc<dyn UserLookup>) -> Self {
        Self { users }
    }

    /// Validate an entry, resolving its owner to a stored user.
    ///
    /// A missing or unknown owner fails with `ValidationError::Owner`.
    /// Lookup failures surface as `LedgerError::Store`.
    pub async fn validate(&self, entry: &LedgerEntry) -> Result<(), LedgerError> {
        check_content(entry)?;

        let owner = entry.owner.ok_or(ValidationError::Owner)?;
        if self.users.find_user_by_id(owner).await?.is_none() {
            return Err(ValidationError::Owner.into());
        }

        check_value(entry)?;
        Ok(())
    }
}

/// Rules that precede the owner check.
fn check_content(entry: &LedgerEntry) -> Result<(), ValidationError> {
    let has_description = entry
        .description
        .as_deref()
        .is_some_and(|d| !d.trim().is_empty());
    if !has_description {
        return Err(ValidationError::Description);
    }

    if !entry.month.is_some_and(|m| (1..=12).contains(&m)) {
        return Err(ValidationError::Month);
    }

    // four decimal digits
    if !entry.year.is_some_and(|y| (1000..=9999).contains(&y)) {
        return Err(ValidationError::Year);
    }

    Ok(())
}

/// Rules that follow the owner check.
fn check_value(entry: &LedgerEntry) -> Result<(), ValidationError> {
    if !entry.amount.is_some_and(|a| a > Decimal::ZERO) {
        return Err(ValidationError::Amount);
    }

    if entry.kind.is_none() {
        return Err(ValidationError::Kind);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{EntryKind, User, UserId};
    use anyhow::Result;
    use async_trait::async_trait;
    use rust_decimal_macros::dec;

    /// Knows a single user with id 1.
    struct OneUser;

    #[async_trait]
    impl UserLookup for OneUser {
        async fn find_user_by_id(&self, id: UserId) -> Result<Option<User>> {
            Ok((id == 1).then(|| User {
                id: 1,
                name: "Ana".into(),
                email: "ana@example.com".into(),
                secret_hash: String::new(),
            }))
        }
    }

    struct BrokenLookup;

    #[async_trait]
    impl UserLookup for BrokenLookup {
        async fn find_user_by_id(&self, _id: UserId) -> Result<Option<User>> {
            Err(anyhow::anyhow!("connection refused"))
        }
    }

    fn validator() -> EntryValidator {
        EntryValidator::new(Arc::new(OneUser))
    }

    fn valid_entry() -> LedgerEntry {
        LedgerEntry::new(1, "Salary", 1, 2024, dec!(1500), EntryKind::Income)
    }

    async fn rejection(entry: LedgerEntry) -> ValidationError {
        validator()
            .validate(&entry)
            .await
            .unwrap_err()
            .as_validation()
            .unwrap()
    }

    #[tokio::test]
    async fn test_valid_entry_passes() {
        assert!(validator().validate(&valid_entry()).await.is_ok());
    }

    #[tokio::test]
    async fn test_description_rules() {
        let mut entry = valid_entry();
        entry.description = None;
        assert_eq!(rejection(entry.clone()).await, ValidationError::Description);

        entry.description = Some("   ".into());
        assert_eq!(rejection(entry).await, ValidationError::Description);
    }

    #[tokio::test]
    async fn test_month_rules() {
        for month in [None, Some(13), Some(0), Some(-1)] {
            let mut entry = valid_entry();
            entry.month = month;
            assert_eq!(rejection(entry).await, ValidationError::Month, "{:?}", month);
        }

        let mut entry = valid_entry();
        entry.month = Some(12);
        assert!(validator().validate(&entry).await.is_ok());
    }

    #[tokio::test]
    async fn test_year_must_have_four_digits() {
        for year in [None, Some(999), Some(10000), Some(24), Some(-202)] {
            let mut entry = valid_entry();
            entry.year = year;
            assert_eq!(rejection(entry).await, ValidationError::Year, "{:?}", year);
        }
    }

    #[tokio::test]
    async fn test_owner_missing_or_unknown() {
        let mut entry = valid_entry();
        entry.owner = None;
        assert_eq!(rejection(entry.clone()).await, ValidationError::Owner);

        entry.owner = Some(42);
        assert_eq!(rejection(entry).await, ValidationError::Owner);
    }

    #[tokio::test]
    async fn test_amount_must_be_positive() {
        for amount in [None, Some(dec!(0)), Some(dec!(-10))] {
            let mut entry = valid_entry();
            entry.amount = amount;
            assert_eq!(rejection(entry).await, ValidationError::Amount);
        }
    }

    #[tokio::test]
    async fn test_kind_required() {
        let mut entry = valid_entry();
        entry.kind = None;
        assert_eq!(rejection(entry).await, ValidationError::Kind);
    }

    #[tokio::test]
    async fn test_first_failing_rule_wins() {
        let mut entry = valid_entry();
        entry.description = None;
        entry.kind = None;
        assert_eq!(rejection(entry).await, ValidationError::Description);

        // an unknown owner is reported before a bad amount
        let mut entry = valid_entry();
        entry.owner = Some(99);
        entry.amount = Some(dec!(0));
        assert_eq!(rejection(entry).await, ValidationError::Owner);
    }

    #[test]
    fn test_messages() {
        assert_eq!(
            ValidationError::Description.to_string(),
            "Informe uma Descrição válida."
        );
        assert_eq!(ValidationError::Month.to_string(), "Informe um Mês válido.");
        assert_eq!(ValidationError::Year.to_string(), "Informe um Ano válido.");
        assert_eq!(ValidationError::Owner.to_string(), "Informe um Usuário");
        assert_eq!(ValidationError::Amount.to_string(), "Informe um Valor válido.");
        assert_eq!(
            ValidationError::Kind.to_string(),
            "Informe um Tipo de Lançamento."
        );
    }

    #[tokio::test]
    async fn test_lookup_failure_is_not_a_validation_error() {
        let validator = EntryValidator::new(Arc::new(BrokenLookup));
        let err = validator.validate(&valid_entry()).await.unwrap_err();
        assert!(matches!(err, LedgerError::Store(_)));
    }
}
