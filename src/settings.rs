use crate::error::Error;
use serde::Deserialize;
use std::{fs, io::ErrorKind, path::Path};
use url::Url;

/// Email address with a display name
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct EmailInfo {
    pub email: String,
    #[serde(default)]
    pub display_name: String,
}

/// Settings read once at startup, immutable afterwards
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Settings {
    /// `SendGrid` API key
    #[serde(default)]
    pub send_grid: String,
    #[serde(default)]
    pub sites: Vec<String>,
    pub from: EmailInfo,
    #[serde(default)]
    pub to: Vec<EmailInfo>,
}

impl Settings {
    /// Load and validate settings from a JSON file
    ///
    /// # Errors
    ///
    /// Returns an error if the file is missing, unreadable, not valid JSON or fails validation
    pub fn load(path: &Path) -> Result<Self, Error> {
        let data = fs::read_to_string(path).map_err(|source| {
            if source.kind() == ErrorKind::NotFound {
                Error::MissingSettings(path.to_path_buf())
            } else {
                Error::ReadSettings {
                    path: path.to_path_buf(),
                    source,
                }
            }
        })?;

        Self::from_json(&data)
    }

    /// Parse and validate settings from a JSON document
    ///
    /// # Errors
    ///
    /// Returns an error if the document is not valid JSON or fails validation
    pub fn from_json(data: &str) -> Result<Self, Error> {
        let settings: Self = serde_json::from_str(data)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Check the invariants the rest of the run relies on
    ///
    /// # Errors
    ///
    /// Returns an error naming the first missing or invalid setting
    pub fn validate(&self) -> Result<(), Error> {
        if self.sites.is_empty() {
            return Err(Error::MissingSetting("sites"));
        }

        for site in &self.sites {
            parse_site_url(site)?;
        }

        if self.send_grid.trim().is_empty() {
            return Err(Error::MissingSetting("send grid api key"));
        }

        if self.from.email.trim().is_empty() {
            return Err(Error::MissingSetting("sender"));
        }

        if self.to.is_empty() || self.to.iter().any(|to| to.email.trim().is_empty()) {
            return Err(Error::MissingSetting("recipients"));
        }

        Ok(())
    }
}

/// Parse a configured site into an absolute HTTPS URL
///
/// # Errors
///
/// Returns an error if the URL does not parse, is not `https` or has no host
pub fn parse_site_url(site: &str) -> Result<Url, Error> {
    let invalid = |reason: String| Error::InvalidSite {
        url: site.to_string(),
        reason,
    };

    let url = Url::parse(site).map_err(|e| invalid(e.to_string()))?;

    if url.scheme() != "https" {
        return Err(invalid(format!(
            "scheme must be https, got {}",
            url.scheme()
        )));
    }

    if url.host().is_none() {
        return Err(invalid("missing host".to_string()));
    }

    Ok(url)
}
