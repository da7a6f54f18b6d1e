use thiserror::Error;

use crate::domain::UserId;

/// A business rule rejected the content of an entry.
///
/// The message is meant for the end user, who can fix the input and retry.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Informe uma Descrição válida.")]
    Description,

    #[error("Informe um Mês válido.")]
    Month,

    #[error("Informe um Ano válido.")]
    Year,

    #[error("Informe um Usuário")]
    Owner,

    #[error("Informe um Valor válido.")]
    Amount,

    #[error("Informe um Tipo de Lançamento.")]
    Kind,
}

#[derive(Error, Debug)]
pub enum LedgerError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Entry id is required for this operation")]
    MissingId,

    #[error("User not found: {0}")]
    UserNotFound(UserId),

    #[error("Database error: {0}")]
    Store(#[from] anyhow::Error),
}

impl LedgerError {
    /// The validation failure, if this error is one.
    pub fn as_validation(&self) -> Option<ValidationError> {
        match self {
            LedgerError::Validation(e) => Some(*e),
            _ => None,
        }
    }
}

#[derive(Error, Debug)]
pub enum UserError {
    #[error("Já existe um usuário cadastrado com esse email.")]
    EmailTaken,

    #[error("Database error: {0}")]
    Store(#[from] anyhow::Error),
}
