use crate::{
    site::{Site, SiteTable},
    tls::{Interception, probe_site},
};
use futures::{StreamExt, stream};
use std::time::Duration;
use tracing::{info, warn};
use url::Url;

/// Sites inspected at the same time unless configured otherwise
pub const DEFAULT_CONCURRENCY: usize = 4;

/// Per-site bound on connect, handshake and fetch unless configured otherwise
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Drives one TLS inspection per configured site
#[derive(Debug, Clone, Copy)]
pub struct Inspector {
    concurrency: usize,
    timeout: Duration,
}

impl Default for Inspector {
    fn default() -> Self {
        Self::new(DEFAULT_CONCURRENCY, DEFAULT_TIMEOUT)
    }
}

impl Inspector {
    /// `concurrency` is clamped to at least one inspection at a time
    #[must_use]
    pub fn new(concurrency: usize, timeout: Duration) -> Self {
        Self {
            concurrency: concurrency.max(1),
            timeout,
        }
    }

    #[must_use]
    pub const fn concurrency(&self) -> usize {
        self.concurrency
    }

    #[must_use]
    pub const fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Inspect every site and return them with their certificates populated
    ///
    /// Sites keep their configured order. Each site gets exactly one connection; results are
    /// merged on the calling task, so nothing is shared with the connections in flight. A site
    /// whose inspection fails or times out is marked failed and the batch carries on.
    pub async fn inspect(&self, mut sites: Vec<Site>) -> Vec<Site> {
        let table = SiteTable::new(&sites);

        let mut targets = Vec::with_capacity(sites.len());
        for site in &mut sites {
            match Url::parse(&site.url) {
                Ok(url) => targets.push(url),
                Err(e) => {
                    warn!(url = %site.url, error = %e, "skipping site with invalid url");
                    site.fail(format!("invalid url: {e}"));
                }
            }
        }

        let limit = self.timeout;
        let mut interceptions = stream::iter(targets)
            .map(|url| async move { probe_site(&url, limit).await })
            .buffered(self.concurrency);

        while let Some(interception) = interceptions.next().await {
            merge(&table, &mut sites, interception);
        }

        sites
    }
}

/// Store one interception in the site it belongs to
fn merge(table: &SiteTable, sites: &mut [Site], interception: Interception) {
    let Some(site) = table
        .resolve_pending(&interception.live_url, sites)
        .and_then(|index| sites.get_mut(index))
    else {
        warn!(url = %interception.live_url, "no configured site matches, result dropped");
        return;
    };

    info!(url = %site.url, "fetched data for site");

    match interception.certificate {
        Ok(certificate) => {
            if let Some(error) = &interception.error {
                warn!(url = %site.url, error = %error, "fetch failed after handshake, keeping certificate");
            }
            info!(
                url = %site.url,
                subject = %certificate.subject,
                valid_to = %certificate.valid_to,
                status = ?interception.status,
                "certificate captured"
            );
            site.populate(certificate);
        }
        Err(error) => {
            warn!(url = %site.url, error = %error, "could not capture certificate");
            site.fail(error);
        }
    }
}
