//! HTTP(S) existence probing

use std::time::Duration;

use chrono::{DateTime, Datelike, TimeDelta, TimeZone, Utc};
use reqwest::StatusCode;
use reqwest::header::{CONTENT_TYPE, IF_MODIFIED_SINCE};
use tracing::debug;
use url::Url;

use crate::config::USER_AGENT;
use crate::probe::content_type::is_archive_type;
use crate::probe::error::ProbeError;
use crate::probe::prober::ProbeOutcome;
use crate::probe::rules::ProbeStrategy;

/// Prober for http and https URLs
#[derive(Clone)]
pub struct HttpProbe {
    client: reqwest::Client,
}

impl HttpProbe {
    /// Creates a new HttpProbe whose requests give up after `timeout`
    pub fn new(timeout: Duration) -> Self {
        Self {
            client: reqwest::Client::builder()
                .user_agent(USER_AGENT)
                .timeout(timeout)
                .build()
                .expect("Failed to create HTTP client"),
        }
    }

    pub async fn probe(
        &self,
        url: &Url,
        strategy: ProbeStrategy,
    ) -> Result<ProbeOutcome, ProbeError> {
        match strategy {
            ProbeStrategy::ContentType => self.probe_content_type(url).await,
            ProbeStrategy::TransportOnly => self.probe_transport_only(url).await,
            ProbeStrategy::ConditionalGet => self.probe_conditional_get(url).await,
        }
    }

    /// HEAD the URL and classify the reported content type
    async fn probe_content_type(&self, url: &Url) -> Result<ProbeOutcome, ProbeError> {
        let response = self.client.head(url.as_str()).send().await?;
        let status = response.status();
        let content_type = response_content_type(&response);

        if !status.is_success() {
            debug!("HEAD {} returned status {}", url, status);
            return Ok(ProbeOutcome {
                exists: false,
                content_type,
            });
        }

        let exists = is_archive_type(content_type.as_deref());
        debug!(
            "HEAD {} returned content type {:?} (archive: {})",
            url, content_type, exists
        );
        Ok(ProbeOutcome {
            exists,
            content_type,
        })
    }

    /// GET the URL; any 2xx/3xx final status counts. The body is never read.
    async fn probe_transport_only(&self, url: &Url) -> Result<ProbeOutcome, ProbeError> {
        let response = self.client.get(url.as_str()).send().await?;
        let status = response.status();
        debug!("GET {} returned status {}", url, status);

        Ok(ProbeOutcome {
            exists: status.is_success() || status.is_redirection(),
            content_type: response_content_type(&response),
        })
    }

    /// GET with a far-future `If-Modified-Since`. These hosts answer 304 for
    /// files they have and an error or HTML page otherwise.
    async fn probe_conditional_get(&self, url: &Url) -> Result<ProbeOutcome, ProbeError> {
        let response = self
            .client
            .get(url.as_str())
            .header(IF_MODIFIED_SINCE, far_future_http_date(Utc::now()))
            .send()
            .await?;
        let status = response.status();
        debug!("Conditional GET {} returned status {}", url, status);

        Ok(ProbeOutcome {
            exists: status == StatusCode::NOT_MODIFIED,
            content_type: response_content_type(&response),
        })
    }
}

fn response_content_type(response: &reqwest::Response) -> Option<String> {
    response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.to_string())
}

/// HTTP date for January 1st of the year after `now`
pub fn far_future_http_date(now: DateTime<Utc>) -> String {
    let next_year = Utc
        .with_ymd_and_hms(now.year() + 1, 1, 1, 0, 0, 0)
        .single()
        .unwrap_or_else(|| now + TimeDelta::days(366));

    next_year.format("%a, %d %b %Y %H:%M:%S GMT").to_string()
}
