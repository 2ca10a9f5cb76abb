//! CLI-level errors (wraps infrastructure errors)

use thiserror::Error;

use crate::application::ApplicationError;
use crate::exitcode;
use crate::infrastructure::{InfraError, StoreError};

/// CLI errors are the top-level error type.
/// These are what get displayed to the user.
#[derive(Error, Debug)]
pub enum CliError {
    #[error("{0}")]
    Infra(#[from] InfraError),

    #[error("invalid arguments: {0}")]
    InvalidArgs(String),

    #[error("{0}")]
    Usage(String),
}

impl From<ApplicationError> for CliError {
    fn from(e: ApplicationError) -> Self {
        Self::Infra(InfraError::Application(e))
    }
}

/// Result type for CLI operations.
pub type CliResult<T> = Result<T, CliError>;

impl CliError {
    /// Get the appropriate exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::InvalidArgs(_) | CliError::Usage(_) => exitcode::USAGE,
            CliError::Infra(InfraError::Io { .. }) => exitcode::IOERR,
            CliError::Infra(InfraError::Application(e)) => application_exit_code(e),
        }
    }
}

fn application_exit_code(e: &ApplicationError) -> i32 {
    if e.is_not_found() {
        return exitcode::NOINPUT;
    }
    if e.is_validation() {
        return exitcode::DATAERR;
    }
    match e {
        ApplicationError::PartialDelete { .. } => exitcode::SOFTWARE,
        ApplicationError::Config { .. } => exitcode::CONFIG,
        ApplicationError::Store(StoreError::Io { .. }) => exitcode::IOERR,
        ApplicationError::Store(StoreError::Serialization { .. })
        | ApplicationError::Store(StoreError::Inconsistent(_)) => exitcode::DATAERR,
        ApplicationError::Store(_) => exitcode::UNAVAILABLE,
        ApplicationError::Domain(_) => exitcode::SOFTWARE,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{DomainError, ItemId};

    #[test]
    fn given_missing_item_when_mapping_then_noinput() {
        let err = CliError::from(ApplicationError::from(DomainError::ItemNotFound(
            ItemId::new(1),
        )));
        assert_eq!(err.exit_code(), exitcode::NOINPUT);
    }

    #[test]
    fn given_key_conflict_when_mapping_then_dataerr() {
        let err = CliError::from(ApplicationError::from(DomainError::DuplicateKey(
            "greeting".into(),
        )));
        assert_eq!(err.exit_code(), exitcode::DATAERR);
    }

    #[test]
    fn given_partial_delete_when_mapping_then_software() {
        let err = CliError::from(ApplicationError::PartialDelete {
            requested: ItemId::new(1),
            removed: vec![],
            surviving: vec![ItemId::new(1)],
            source: StoreError::Unavailable("down".into()),
        });
        assert_eq!(err.exit_code(), exitcode::SOFTWARE);
    }
}
