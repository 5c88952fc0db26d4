//! URL existence prober

#[cfg(test)]
use mockall::automock;

use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::debug;
use url::Url;

use crate::config::ProbeConfig;
use crate::probe::error::ProbeError;
use crate::probe::ftp::FtpProbe;
use crate::probe::http::HttpProbe;
use crate::probe::rules::HostRules;

/// Result of a single probe
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeOutcome {
    pub exists: bool,
    /// Content type reported by the server, when the protocol has one
    pub content_type: Option<String>,
}

/// Trait for deciding whether a URL plausibly points at an existing file
#[cfg_attr(test, automock)]
#[async_trait::async_trait]
pub trait UrlProber: Send + Sync {
    /// Returns true if the URL exists.
    ///
    /// Never fails: transport errors, timeouts, unsupported schemes and
    /// cancellation all count as "does not exist".
    async fn exists(&self, url: &str, cancel: &CancellationToken) -> bool;
}

/// Prober dispatching on URL scheme and host rules
pub struct DefaultProber {
    http: HttpProbe,
    ftp: FtpProbe,
    rules: HostRules,
}

impl DefaultProber {
    pub fn new(config: &ProbeConfig) -> Self {
        Self::with_rules(config, HostRules::from_config(config))
    }

    pub fn with_rules(config: &ProbeConfig, rules: HostRules) -> Self {
        let timeout = Duration::from_secs(config.timeout_secs);
        Self {
            http: HttpProbe::new(timeout),
            ftp: FtpProbe::new(timeout),
            rules,
        }
    }

    /// Probe a URL, surfacing the failure reason
    pub async fn probe(&self, url: &str) -> Result<ProbeOutcome, ProbeError> {
        let url = Url::parse(url)?;

        match url.scheme() {
            "http" | "https" => {
                let host = url
                    .host_str()
                    .ok_or_else(|| ProbeError::MissingHost(url.to_string()))?;
                let strategy = self.rules.strategy_for(host);
                debug!("Probing {} with {:?}", url, strategy);
                self.http.probe(&url, strategy).await
            }
            "ftp" => self.ftp.probe(&url).await,
            scheme => Err(ProbeError::UnsupportedScheme(scheme.to_string())),
        }
    }
}

#[async_trait::async_trait]
impl UrlProber for DefaultProber {
    async fn exists(&self, url: &str, cancel: &CancellationToken) -> bool {
        let result = tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(ProbeError::Cancelled),
            result = self.probe(url) => result,
        };

        result
            .inspect_err(|e| debug!("Probe of {} failed: {}", url, e))
            .map(|outcome| outcome.exists)
            .unwrap_or(false)
    }
}
