use std::path::PathBuf;

/// Fatal outcomes of a run, each mapped to a process exit code
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("missing settings file {}", .0.display())]
    MissingSettings(PathBuf),

    #[error("failed to read settings file {}: {source}", path.display())]
    ReadSettings {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse settings: {0}")]
    ParseSettings(#[from] serde_json::Error),

    #[error("missing setting for {0}")]
    MissingSetting(&'static str),

    #[error("invalid site url {url}: {reason}")]
    InvalidSite { url: String, reason: String },

    #[error("failed to deliver report: {0}")]
    Delivery(String),
}

impl Error {
    /// Exit code reported to the operator
    #[must_use]
    pub const fn exit_code(&self) -> u8 {
        match self {
            Self::Delivery(_) => 2,
            _ => 1,
        }
    }
}

/// Map the outcome of a run to a process exit code
///
/// Errors that do not carry an [`Error`] are treated as configuration failures.
#[must_use]
pub fn exit_code(err: &anyhow::Error) -> u8 {
    err.downcast_ref::<Error>().map_or(1, Error::exit_code)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

    use super::*;
    use anyhow::Context;

    #[test]
    fn test_exit_codes() {
        assert_eq!(Error::MissingSettings("settings.json".into()).exit_code(), 1);
        assert_eq!(Error::MissingSetting("sites").exit_code(), 1);
        assert_eq!(Error::Delivery("503".to_string()).exit_code(), 2);
    }

    #[test]
    fn test_exit_code_through_context() {
        let result: Result<(), Error> = Err(Error::Delivery("rejected".to_string()));
        let err = result.context("sending report").unwrap_err();
        assert_eq!(exit_code(&err), 2);
    }

    #[test]
    fn test_exit_code_untyped_error() {
        let err = anyhow::anyhow!("Invalid value for --concurrency");
        assert_eq!(exit_code(&err), 1);
    }

    #[test]
    fn test_display() {
        let err = Error::InvalidSite {
            url: "http://example.com".to_string(),
            reason: "scheme must be https".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "invalid site url http://example.com: scheme must be https"
        );
        assert_eq!(
            Error::MissingSetting("sites").to_string(),
            "missing setting for sites"
        );
    }
}
