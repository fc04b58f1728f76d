//! Report delivery
//!
//! `SendGrid` posts the report to the `SendGrid` v3 mail API, `Preview` prints it instead.

use crate::{error::Error, report::Report, settings::EmailInfo};
use anyhow::{Context, Result};
use serde::Serialize;
use std::{future::Future, time::Duration};
use tracing::{debug, info};

/// `SendGrid` v3 mail send endpoint
pub const SENDGRID_ENDPOINT: &str = "https://api.sendgrid.com/v3/mail/send";

/// Everything needed to deliver one report
#[derive(Debug, Clone, Copy)]
pub struct Envelope<'a> {
    pub from: &'a EmailInfo,
    pub to: &'a [EmailInfo],
    pub report: &'a Report,
}

/// Delivery channel for a rendered report
pub trait Dispatcher {
    /// Submit the report; success means it was accepted, not that it reached an inbox
    fn send(&self, envelope: &Envelope<'_>) -> impl Future<Output = Result<()>> + Send;
}

#[derive(Debug, Serialize)]
struct Address<'a> {
    email: &'a str,
    #[serde(skip_serializing_if = "str::is_empty")]
    name: &'a str,
}

impl<'a> From<&'a EmailInfo> for Address<'a> {
    fn from(info: &'a EmailInfo) -> Self {
        Self {
            email: &info.email,
            name: &info.display_name,
        }
    }
}

#[derive(Debug, Serialize)]
struct Personalization<'a> {
    to: Vec<Address<'a>>,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    #[serde(rename = "type")]
    kind: &'static str,
    value: &'a str,
}

#[derive(Debug, Serialize)]
struct MailSend<'a> {
    personalizations: Vec<Personalization<'a>>,
    from: Address<'a>,
    subject: &'a str,
    content: Vec<Content<'a>>,
}

impl<'a> MailSend<'a> {
    /// One personalization per recipient so recipients do not see each other
    fn new(envelope: &Envelope<'a>) -> Self {
        Self {
            personalizations: envelope
                .to
                .iter()
                .map(|to| Personalization {
                    to: vec![Address::from(to)],
                })
                .collect(),
            from: Address::from(envelope.from),
            subject: &envelope.report.subject,
            content: vec![
                Content {
                    kind: "text/plain",
                    value: &envelope.report.text,
                },
                Content {
                    kind: "text/html",
                    value: &envelope.report.html,
                },
            ],
        }
    }
}

/// Delivers reports through the `SendGrid` HTTP API
#[derive(Debug, Clone)]
pub struct SendGrid {
    client: reqwest::Client,
    api_key: String,
    endpoint: String,
}

impl SendGrid {
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        Self::with_endpoint(api_key, SENDGRID_ENDPOINT)
    }

    /// Deliver to a custom endpoint instead of the public API
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built
    pub fn with_endpoint(api_key: impl Into<String>, endpoint: impl Into<String>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_secs(30))
            .build()
            .context("failed to build HTTP client")?;

        Ok(Self {
            client,
            api_key: api_key.into(),
            endpoint: endpoint.into(),
        })
    }
}

impl Dispatcher for SendGrid {
    async fn send(&self, envelope: &Envelope<'_>) -> Result<()> {
        let payload = MailSend::new(envelope);

        debug!(
            endpoint = %self.endpoint,
            recipients = envelope.to.len(),
            "submitting report"
        );

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&payload)
            .send()
            .await
            .map_err(|e| Error::Delivery(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Delivery(format!("{status}: {}", body.trim())).into());
        }

        info!(%status, recipients = envelope.to.len(), "report accepted for delivery");

        Ok(())
    }
}

/// Prints the report to stdout instead of sending it
#[derive(Debug, Clone, Copy, Default)]
pub struct Preview;

impl Preview {
    /// Headers, then the plain-text body, then the HTML body
    #[must_use]
    pub fn render(envelope: &Envelope<'_>) -> String {
        let to: Vec<&str> = envelope.to.iter().map(|to| to.email.as_str()).collect();
        format!(
            "From: {}\nTo: {}\nSubject: {}\n\n--- text/plain ---\n{}\n--- text/html ---\n{}",
            envelope.from.email,
            to.join(", "),
            envelope.report.subject,
            envelope.report.text,
            envelope.report.html,
        )
    }
}

impl Dispatcher for Preview {
    async fn send(&self, envelope: &Envelope<'_>) -> Result<()> {
        print!("{}", Self::render(envelope));
        Ok(())
    }
}
