//! Expiry report rendered as plain text and HTML
//!
//! Sites are classified against a single `now`, sorted most urgent first and rendered twice
//! with identical content. Sites without a captured certificate sort ahead of everything else
//! and are marked as undetermined instead of being given an expiry.

mod html;
mod text;

use crate::{
    expiry::{Expiry, Tier},
    site::{Site, SiteStatus},
};
use chrono::{DateTime, Utc};

pub use html::render_html;
pub use text::render_text;

/// Subject line used unless configured otherwise
pub const DEFAULT_SUBJECT: &str = "Status for certificates";

/// Timestamp format used in both renderings
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S UTC";

/// Classification of one site at report time
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Status {
    Classified(Expiry),
    /// No certificate was captured, with the reason when known
    Undetermined(String),
}

impl Status {
    #[must_use]
    pub const fn remaining_days(&self) -> Option<i64> {
        match self {
            Self::Classified(expiry) => Some(expiry.remaining_days),
            Self::Undetermined(_) => None,
        }
    }
}

/// A site paired with its classification
#[derive(Debug, Clone)]
pub struct Entry {
    pub site: Site,
    pub status: Status,
}

impl Entry {
    #[must_use]
    pub fn new(site: Site, now: DateTime<Utc>) -> Self {
        let status = match site.expiry(now) {
            Ok(expiry) => Status::Classified(expiry),
            Err(_) => Status::Undetermined(match &site.status {
                SiteStatus::Failed(reason) => reason.clone(),
                _ => "site was not inspected".to_string(),
            }),
        };
        Self { site, status }
    }
}

/// Counts per tier, shown at the top of the report
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Summary {
    pub total: usize,
    pub expired: usize,
    pub critical: usize,
    pub warning: usize,
    pub undetermined: usize,
}

impl Summary {
    #[must_use]
    pub fn from_entries(entries: &[Entry]) -> Self {
        let mut summary = Self {
            total: entries.len(),
            ..Self::default()
        };
        for entry in entries {
            match &entry.status {
                Status::Classified(expiry) => match expiry.tier {
                    Tier::Expired => summary.expired += 1,
                    Tier::Critical => summary.critical += 1,
                    Tier::Warning => summary.warning += 1,
                    Tier::Ok => {}
                },
                Status::Undetermined(_) => summary.undetermined += 1,
            }
        }
        summary
    }

    #[must_use]
    pub fn line(&self) -> String {
        format!(
            "Checked {} {}: {} expired, {} expiring within 7 days, {} expiring within 30 days, {} undetermined",
            self.total,
            if self.total == 1 { "site" } else { "sites" },
            self.expired,
            self.critical,
            self.warning,
            self.undetermined
        )
    }
}

/// Rendered report ready for delivery
#[derive(Debug, Clone)]
pub struct Report {
    pub subject: String,
    pub text: String,
    pub html: String,
    /// Entries in report order
    pub entries: Vec<Entry>,
}

/// Classify sites against `now` and order them most urgent first
///
/// The sort is stable: sites with the same remaining days keep their input order.
#[must_use]
pub fn sort_by_urgency(sites: Vec<Site>, now: DateTime<Utc>) -> Vec<Entry> {
    let mut entries: Vec<Entry> = sites.into_iter().map(|site| Entry::new(site, now)).collect();
    entries.sort_by_key(|entry| entry.status.remaining_days());
    entries
}

/// Builds reports with a fixed subject and reference time
#[derive(Debug, Clone)]
pub struct ReportBuilder {
    subject: String,
    now: DateTime<Utc>,
}

impl ReportBuilder {
    #[must_use]
    pub fn new(subject: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self {
            subject: subject.into(),
            now,
        }
    }

    /// Sort and render the inspected sites
    ///
    /// Returns `None` when there is nothing to send: no sites at all, or none with a captured
    /// certificate.
    #[must_use]
    pub fn build(&self, sites: Vec<Site>) -> Option<Report> {
        if !sites.iter().any(|site| site.certificate().is_some()) {
            return None;
        }

        let entries = sort_by_urgency(sites, self.now);

        Some(Report {
            subject: self.subject.clone(),
            text: render_text(&entries),
            html: render_html(&self.subject, &entries),
            entries,
        })
    }
}

/// Severity line for tiers below Ok
#[must_use]
pub fn severity_line(expiry: &Expiry) -> Option<String> {
    match expiry.tier {
        Tier::Expired => Some(format!(
            "ERROR: certificate expired {} days ago",
            expiry.remaining_days.unsigned_abs()
        )),
        Tier::Critical => Some(format!(
            "WARNING: certificate expires in {} days",
            expiry.remaining_days
        )),
        Tier::Warning => Some(format!(
            "INFO: certificate expires in {} days",
            expiry.remaining_days
        )),
        Tier::Ok => None,
    }
}
