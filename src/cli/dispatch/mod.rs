use crate::{checker::Options, cli::actions::Action, report::DEFAULT_SUBJECT};
use anyhow::{Context, Result};
use clap::ArgMatches;
use std::{path::PathBuf, time::Duration};

/// Convert `ArgMatches` into typed Action enum with validation
///
/// # Errors
///
/// Returns an error if required parameters are missing
pub fn dispatch(matches: &ArgMatches) -> Result<Action> {
    let settings = matches
        .get_one::<String>("settings")
        .map(PathBuf::from)
        .context("settings path is required")?;

    let concurrency = matches.get_one::<u8>("concurrency").copied().unwrap_or(4);

    let timeout = matches.get_one::<u16>("timeout").copied().unwrap_or(10);

    let subject = matches
        .get_one::<String>("subject")
        .cloned()
        .unwrap_or_else(|| DEFAULT_SUBJECT.to_string());

    Ok(Action::Check(Options {
        settings,
        concurrency: usize::from(concurrency),
        timeout: Duration::from_secs(u64::from(timeout)),
        subject,
        dry_run: matches.get_flag("dry-run"),
    }))
}
