//! Host matcher -> probe strategy rules
//!
//! Some hosting providers misreport content types or answer HEAD requests
//! incorrectly. Each rule pairs a host matcher with the strategy used for
//! hosts it matches; the first matching rule wins.

use crate::config::ProbeConfig;

/// How a URL's existence is decided
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbeStrategy {
    /// HEAD request; the reported content type must look like an archive
    ContentType,
    /// Any 2xx/3xx final status counts, regardless of content type
    TransportOnly,
    /// GET with a far-future `If-Modified-Since`; only 304 counts
    ConditionalGet,
}

/// Matches a (`www.`-stripped) host name
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostMatcher {
    Exact(String),
    /// The domain itself or any of its subdomains
    Suffix(String),
}

impl HostMatcher {
    pub fn matches(&self, host: &str) -> bool {
        match self {
            HostMatcher::Exact(expected) => host.eq_ignore_ascii_case(expected),
            HostMatcher::Suffix(domain) => {
                let host = host.to_ascii_lowercase();
                let domain = domain.to_ascii_lowercase();
                host == domain || host.ends_with(&format!(".{}", domain))
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostRule {
    pub matcher: HostMatcher,
    pub strategy: ProbeStrategy,
}

impl HostRule {
    pub fn new(matcher: HostMatcher, strategy: ProbeStrategy) -> Self {
        Self { matcher, strategy }
    }
}

/// Ordered rule set; hosts without a matching rule use [`ProbeStrategy::ContentType`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HostRules {
    rules: Vec<HostRule>,
}

impl HostRules {
    pub fn new(rules: Vec<HostRule>) -> Self {
        Self { rules }
    }

    /// Build the rule set from configuration: conditional-GET domains first,
    /// then transport-only hosts.
    pub fn from_config(config: &ProbeConfig) -> Self {
        let conditional = config.conditional_get_domains.iter().map(|domain| {
            HostRule::new(
                HostMatcher::Suffix(domain.clone()),
                ProbeStrategy::ConditionalGet,
            )
        });
        let transport_only = config.transport_only_hosts.iter().map(|host| {
            HostRule::new(
                HostMatcher::Exact(host.clone()),
                ProbeStrategy::TransportOnly,
            )
        });

        Self::new(conditional.chain(transport_only).collect())
    }

    /// Select the strategy for a host. A leading `www.` is ignored.
    pub fn strategy_for(&self, host: &str) -> ProbeStrategy {
        let host = normalize_host(host);
        self.rules
            .iter()
            .find(|rule| rule.matcher.matches(host))
            .map(|rule| rule.strategy)
            .unwrap_or(ProbeStrategy::ContentType)
    }
}

/// Strip a leading `www.` for matching
pub fn normalize_host(host: &str) -> &str {
    host.strip_prefix("www.").unwrap_or(host)
}
