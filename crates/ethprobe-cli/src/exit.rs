//! Process exit codes.

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

use ethprobe_core::ConfigError;
use ethprobe_health::HealthError;

pub const GENERIC_ERROR: u8 = 1;
pub const INVALID_INPUT: u8 = 2;
pub const HEALTH_CHECK_EXHAUSTED: u8 = 3;
pub const NETWORK_MISMATCH: u8 = 4;

/// Failures raised by the CLI itself rather than the libraries.
#[derive(Debug, Error)]
pub enum CliError {
    #[error("health check did not finish within {0:?}")]
    DeadlineExceeded(Duration),

    #[error("{} already exists (use --force to overwrite)", .0.display())]
    AlreadyExists(PathBuf),
}

/// Pick the exit code for an error returned by a command.
///
/// A mismatch wins over exhaustion: a run that ran out of attempts while
/// the node kept reporting the wrong chain exits with `NETWORK_MISMATCH`.
pub fn code_for(err: &anyhow::Error) -> u8 {
    if let Some(health) = err.downcast_ref::<HealthError>() {
        return if health.is_network_mismatch() {
            NETWORK_MISMATCH
        } else if matches!(health, HealthError::Exhausted { .. }) {
            HEALTH_CHECK_EXHAUSTED
        } else {
            GENERIC_ERROR
        };
    }

    if err.downcast_ref::<ConfigError>().is_some() {
        return INVALID_INPUT;
    }

    match err.downcast_ref::<CliError>() {
        Some(CliError::DeadlineExceeded(_)) => HEALTH_CHECK_EXHAUSTED,
        Some(CliError::AlreadyExists(_)) => INVALID_INPUT,
        None => GENERIC_ERROR,
    }
}

#[cfg(test)]
mod tests {
    use anyhow::Context;

    use super::*;

    fn exhausted(last: HealthError) -> anyhow::Error {
        HealthError::Exhausted {
            attempts: 3,
            last: Box::new(last),
        }
        .into()
    }

    #[test]
    fn exhausted_transport_failure() {
        let err = exhausted(HealthError::Transport("connect failed".into()));
        assert_eq!(code_for(&err), HEALTH_CHECK_EXHAUSTED);
    }

    #[test]
    fn exhausted_cause_is_printed_once() {
        let err = exhausted(HealthError::Transport("connect failed".into()));
        let rendered = format!("{err:#}");
        assert_eq!(rendered.matches("connect failed").count(), 1, "{rendered}");
    }

    #[test]
    fn exhausted_on_mismatch_reports_mismatch() {
        let err = exhausted(HealthError::NetworkMismatch {
            expected: 1,
            actual: 4,
        });
        assert_eq!(code_for(&err), NETWORK_MISMATCH);
    }

    #[test]
    fn fail_fast_mismatch() {
        let err: anyhow::Error = HealthError::NetworkMismatch {
            expected: 1,
            actual: 5,
        }
        .into();
        assert_eq!(code_for(&err), NETWORK_MISMATCH);
    }

    #[test]
    fn config_errors_are_invalid_input() {
        let err: anyhow::Error = ConfigError::Missing("rpc.endpoint").into();
        assert_eq!(code_for(&err), INVALID_INPUT);

        let wrapped = Err::<(), _>(ConfigError::UnknownNetwork("x".into()))
            .context("loading config")
            .unwrap_err();
        assert_eq!(code_for(&wrapped), INVALID_INPUT);
    }

    #[test]
    fn cli_errors() {
        let deadline: anyhow::Error = CliError::DeadlineExceeded(Duration::from_secs(30)).into();
        assert_eq!(code_for(&deadline), HEALTH_CHECK_EXHAUSTED);

        let exists: anyhow::Error = CliError::AlreadyExists(PathBuf::from("ethprobe.toml")).into();
        assert_eq!(code_for(&exists), INVALID_INPUT);
    }

    #[test]
    fn anything_else_is_generic() {
        let err = anyhow::anyhow!("disk on fire");
        assert_eq!(code_for(&err), GENERIC_ERROR);
    }
}
