use anyhow::{Result, anyhow};
use tracing::Level;
use tracing_subscriber::EnvFilter;

/// Map the `-v` count to a log level
#[must_use]
pub const fn level(verbosity: u8) -> Level {
    match verbosity {
        0 => Level::INFO,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    }
}

/// Filter used when `RUST_LOG` is not set
#[must_use]
pub fn default_directive(verbosity: u8) -> String {
    let level = level(verbosity).as_str().to_lowercase();
    format!("{}={level}", env!("CARGO_PKG_NAME"))
}

/// Install the global subscriber, logging to stderr so stdout stays free for previews
///
/// `RUST_LOG` takes precedence over the verbosity flag.
///
/// # Errors
///
/// Returns an error if a global subscriber is already installed
pub fn init(verbosity: u8) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_directive(verbosity)))?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init()
        .map_err(|e| anyhow!("failed to initialize logging: {e}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level() {
        assert_eq!(level(0), Level::INFO);
        assert_eq!(level(1), Level::DEBUG);
        assert_eq!(level(2), Level::TRACE);
        assert_eq!(level(9), Level::TRACE);
    }

    #[test]
    fn test_default_directive() {
        assert_eq!(default_directive(0), "certpulse=info");
        assert_eq!(default_directive(1), "certpulse=debug");
        assert_eq!(default_directive(3), "certpulse=trace");
    }
}
