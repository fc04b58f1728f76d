use crate::{
    inspector::{DEFAULT_CONCURRENCY, DEFAULT_TIMEOUT, Inspector},
    mailer::{Dispatcher, Envelope, Preview, SendGrid},
    report::{DEFAULT_SUBJECT, Report, ReportBuilder},
    settings::Settings,
    site,
};
use anyhow::{Context, Result};
use chrono::Utc;
use std::{path::PathBuf, time::Duration};
use tracing::{debug, info};

/// Everything a single run needs besides the settings file contents
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Options {
    pub settings: PathBuf,
    pub concurrency: usize,
    pub timeout: Duration,
    pub subject: String,
    pub dry_run: bool,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            settings: PathBuf::from("settings.json"),
            concurrency: DEFAULT_CONCURRENCY,
            timeout: DEFAULT_TIMEOUT,
            subject: DEFAULT_SUBJECT.to_string(),
            dry_run: false,
        }
    }
}

/// How a run ended when nothing went wrong
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Sent,
    Previewed,
    /// No site had a certificate, so no report was produced
    NothingToSend,
}

/// Load settings, inspect every site and deliver the report
///
/// # Errors
///
/// Returns an error if the settings are missing or invalid, or if the report could not be
/// delivered. Failures of individual sites are part of the report, not errors.
pub async fn start(options: &Options) -> Result<Outcome> {
    let settings = Settings::load(&options.settings)?;

    info!(
        settings = %options.settings.display(),
        sites = settings.sites.len(),
        recipients = settings.to.len(),
        "settings loaded"
    );

    let delivered = if options.dry_run {
        check(&settings, options, &Preview).await?
    } else {
        let sendgrid = SendGrid::new(settings.send_grid.clone())?;
        check(&settings, options, &sendgrid).await?
    };

    let outcome = match delivered {
        None => Outcome::NothingToSend,
        Some(_) if options.dry_run => Outcome::Previewed,
        Some(_) => Outcome::Sent,
    };

    match outcome {
        Outcome::Sent => info!("report sent"),
        Outcome::Previewed => info!("report printed, nothing sent"),
        Outcome::NothingToSend => info!("no certificates captured, nothing to send"),
    }

    Ok(outcome)
}

/// Inspect the configured sites and hand the report to `dispatcher`
///
/// Returns the delivered report, or `None` when there was nothing to send.
///
/// # Errors
///
/// Returns an error if the dispatcher fails
pub async fn check<D: Dispatcher>(
    settings: &Settings,
    options: &Options,
    dispatcher: &D,
) -> Result<Option<Report>> {
    let inspector = Inspector::new(options.concurrency, options.timeout);

    debug!(
        concurrency = inspector.concurrency(),
        timeout = ?inspector.timeout(),
        "inspecting sites"
    );

    let sites = inspector.inspect(site::from_urls(&settings.sites)).await;

    let Some(report) = ReportBuilder::new(options.subject.clone(), Utc::now()).build(sites) else {
        return Ok(None);
    };

    dispatcher
        .send(&Envelope {
            from: &settings.from,
            to: &settings.to,
            report: &report,
        })
        .await
        .context("sending report")?;

    Ok(Some(report))
}
