use crate::expiry::{self, Expiry};
use chrono::{DateTime, Utc};
use url::Url;

/// Leaf certificate fields captured during a handshake
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Certificate {
    pub subject: String,
    pub issuer: String,
    pub valid_from: DateTime<Utc>,
    pub valid_to: DateTime<Utc>,
}

/// Inspection state of a site
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SiteStatus {
    /// Not inspected yet
    #[default]
    Pending,
    Inspected(Certificate),
    /// No certificate could be captured
    Failed(String),
}

/// A site reached classification without a captured certificate
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("no certificate captured for {url}")]
pub struct UnpopulatedSite {
    pub url: String,
}

/// One configured monitoring target
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Site {
    pub url: String,
    pub status: SiteStatus,
}

impl Site {
    #[must_use]
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            status: SiteStatus::Pending,
        }
    }

    #[must_use]
    pub const fn certificate(&self) -> Option<&Certificate> {
        match &self.status {
            SiteStatus::Inspected(certificate) => Some(certificate),
            _ => None,
        }
    }

    #[must_use]
    pub const fn is_pending(&self) -> bool {
        matches!(self.status, SiteStatus::Pending)
    }

    /// Record the certificate captured for this site
    ///
    /// Returns `false` and leaves the site untouched if it was already inspected.
    pub fn populate(&mut self, certificate: Certificate) -> bool {
        if !self.is_pending() {
            return false;
        }
        self.status = SiteStatus::Inspected(certificate);
        true
    }

    /// Mark the site as failed unless it already carries a result
    pub fn fail(&mut self, reason: impl Into<String>) -> bool {
        if !self.is_pending() {
            return false;
        }
        self.status = SiteStatus::Failed(reason.into());
        true
    }

    /// Classify the captured certificate relative to `now`
    ///
    /// # Errors
    ///
    /// Returns [`UnpopulatedSite`] if no certificate was captured
    pub fn expiry(&self, now: DateTime<Utc>) -> Result<Expiry, UnpopulatedSite> {
        self.certificate()
            .map(|certificate| expiry::classify(certificate.valid_to, now))
            .ok_or_else(|| UnpopulatedSite {
                url: self.url.clone(),
            })
    }

    #[must_use]
    pub fn remaining_days(&self, now: DateTime<Utc>) -> Option<i64> {
        self.expiry(now).ok().map(|e| e.remaining_days)
    }
}

/// Build unpopulated sites from the configured URLs, keeping order and duplicates
#[must_use]
pub fn from_urls<S: AsRef<str>>(urls: &[S]) -> Vec<Site> {
    urls.iter().map(|url| Site::new(url.as_ref())).collect()
}

/// Connection identity of a URL: scheme, host and effective port
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SiteKey {
    scheme: String,
    host: String,
    port: u16,
}

impl SiteKey {
    #[must_use]
    pub fn from_url(url: &Url) -> Option<Self> {
        Some(Self {
            scheme: url.scheme().to_ascii_lowercase(),
            host: url.host_str()?.to_ascii_lowercase(),
            port: url.port_or_known_default()?,
        })
    }
}

#[derive(Debug)]
struct Entry {
    key: SiteKey,
    path: String,
}

/// Lookup table from live connection URLs back to configured sites
///
/// Keys are computed once per configured site. Among sites sharing a key, the one whose path
/// equals the live path (ignoring trailing slashes) wins, otherwise the first in configured
/// order. Entries already claimed are skipped so duplicates resolve to distinct sites.
#[derive(Debug)]
pub struct SiteTable {
    entries: Vec<Option<Entry>>,
}

impl SiteTable {
    #[must_use]
    pub fn new(sites: &[Site]) -> Self {
        let entries = sites
            .iter()
            .map(|site| {
                let url = Url::parse(&site.url).ok()?;
                Some(Entry {
                    key: SiteKey::from_url(&url)?,
                    path: normalize_path(url.path()),
                })
            })
            .collect();

        Self { entries }
    }

    /// Index of the site a live URL belongs to, skipping indices for which `claimed` is true
    #[must_use]
    pub fn resolve(&self, live: &Url, claimed: impl Fn(usize) -> bool) -> Option<usize> {
        let key = SiteKey::from_url(live)?;
        let path = normalize_path(live.path());

        let candidates: Vec<(usize, &Entry)> = self
            .entries
            .iter()
            .enumerate()
            .filter_map(|(index, entry)| entry.as_ref().map(|entry| (index, entry)))
            .filter(|(index, entry)| entry.key == key && !claimed(*index))
            .collect();

        candidates
            .iter()
            .find(|(_, entry)| entry.path == path)
            .or_else(|| candidates.first())
            .map(|(index, _)| *index)
    }

    /// Resolve a live URL against the sites, only considering those still pending
    #[must_use]
    pub fn resolve_pending(&self, live: &Url, sites: &[Site]) -> Option<usize> {
        self.resolve(live, |index| sites.get(index).is_none_or(|site| !site.is_pending()))
    }
}

fn normalize_path(path: &str) -> String {
    path.trim_end_matches('/').to_string()
}
