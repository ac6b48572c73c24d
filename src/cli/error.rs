//! CLI-level errors (wraps infrastructure errors)

use thiserror::Error;

use crate::application::ApplicationError;
use crate::domain::DomainError;
use crate::exitcode;
use crate::infrastructure::InfraError;

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
        CliError::Infra(InfraError::Application(e))
    }
}

/// Result type for CLI operations.
pub type CliResult<T> = Result<T, CliError>;

impl CliError {
    /// Get the appropriate exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::InvalidArgs(_) | CliError::Usage(_) => exitcode::USAGE,
            CliError::Infra(e) => match e {
                InfraError::Io { .. } => exitcode::IOERR,
                InfraError::Application(app) => match app {
                    ApplicationError::Domain(d) => domain_exit_code(d),
                    ApplicationError::Config { .. } => exitcode::CONFIG,
                    ApplicationError::Preference { .. } => exitcode::CANTCREAT,
                    ApplicationError::OperationFailed { .. } => exitcode::NOINPUT,
                },
            },
        }
    }
}

fn domain_exit_code(e: &DomainError) -> i32 {
    match e {
        DomainError::NodeNotFound(_) => exitcode::NOTFOUND,
        DomainError::UnsupportedLanguage { .. } | DomainError::NotASection(_) => exitcode::USAGE,
        DomainError::MissingDefaultLabel { .. }
        | DomainError::InvalidToc { .. }
        | DomainError::UnbalancedDirective { .. }
        | DomainError::InvalidDocument(_) => exitcode::DATAERR,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn given_domain_errors_when_mapping_then_uses_sysexits() {
        let not_found: CliError =
            ApplicationError::from(DomainError::NodeNotFound("/x".into())).into();
        assert_eq!(not_found.exit_code(), exitcode::NOTFOUND);

        let bad_toc: CliError = ApplicationError::from(DomainError::InvalidToc {
            line: 3,
            message: "x".into(),
        })
        .into();
        assert_eq!(bad_toc.exit_code(), exitcode::DATAERR);

        let config: CliError = ApplicationError::Config {
            message: "bad".into(),
        }
        .into();
        assert_eq!(config.exit_code(), exitcode::CONFIG);
        assert_eq!(CliError::Usage("x".into()).exit_code(), exitcode::USAGE);
    }
}
