use thiserror::Error;

/// Reasons a probe could not produce an answer.
///
/// Never surfaced to callers of [`UrlProber::exists`](crate::probe::UrlProber::exists),
/// which treats every error as "does not exist".
#[derive(Debug, Error)]
pub enum ProbeError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("Unsupported scheme: {0}")]
    UnsupportedScheme(String),

    #[error("URL has no host: {0}")]
    MissingHost(String),

    #[error("FTP error: {0}")]
    Ftp(String),

    #[error("Probe timed out")]
    Timeout,

    #[error("Probe cancelled")]
    Cancelled,
}
