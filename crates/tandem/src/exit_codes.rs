//! Exit codes for the CLI

use tandem_core::error::{GitError, TandemError};

/// Success
#[allow(dead_code)]
pub const SUCCESS: i32 = 0;

/// General error
pub const ERROR: i32 = 1;

/// Configuration error
pub const CONFIG_ERROR: i32 = 2;

/// Git error
pub const GIT_ERROR: i32 = 3;

/// Registry authentication error
pub const AUTH_ERROR: i32 = 4;

/// Validation error, several problems reported together
pub const VALIDATION_ERROR: i32 = 5;

/// A package manager or npm command failed
pub const COMMAND_ERROR: i32 = 6;

/// Exit code for an error returned by a command
pub fn for_error(err: &anyhow::Error) -> i32 {
    if let Some(err) = err.downcast_ref::<TandemError>() {
        return match err {
            TandemError::Config(_) => CONFIG_ERROR,
            TandemError::Git(_) => GIT_ERROR,
            TandemError::Auth(_) => AUTH_ERROR,
            TandemError::Aggregate(_) => VALIDATION_ERROR,
            TandemError::Command(_) => COMMAND_ERROR,
            _ => ERROR,
        };
    }
    if err.downcast_ref::<GitError>().is_some() {
        return GIT_ERROR;
    }
    ERROR
}

#[cfg(test)]
mod tests {
    use super::*;
    use tandem_core::error::{AggregateError, AuthError, ConfigError};

    #[test]
    fn test_exit_codes() {
        let auth = anyhow::Error::from(TandemError::from(AuthError::NoToken {
            registry: "https://registry.npmjs.org/".to_string(),
        }));
        assert_eq!(for_error(&auth), AUTH_ERROR);

        let mut aggregate = AggregateError::new();
        aggregate.push(ConfigError::NotFound("tandem.toml".into()));
        assert_eq!(
            for_error(&anyhow::Error::from(TandemError::from(aggregate))),
            VALIDATION_ERROR
        );

        let git = anyhow::Error::from(GitError::RemoteNotFound("origin".to_string()));
        assert_eq!(for_error(&git), GIT_ERROR);

        assert_eq!(for_error(&anyhow::anyhow!("boom")), ERROR);
    }
}
