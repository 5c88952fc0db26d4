//! Probe layer: decides whether a synthesized download URL exists
//!
//! # Modules
//!
//! - [`prober`]: `UrlProber` trait and the scheme-dispatching `DefaultProber`
//! - [`rules`]: ordered host matcher -> strategy rules
//! - [`http`]: HEAD / transport-only / conditional-GET strategies
//! - [`ftp`]: control-connection FTP existence check
//! - [`content_type`]: archive content-type classification
//! - [`error`]: probe failure reasons (never surfaced past `UrlProber`)

pub mod content_type;
pub mod error;
pub mod ftp;
pub mod http;
pub mod prober;
pub mod rules;

pub use content_type::is_archive_type;
pub use error::ProbeError;
pub use prober::{DefaultProber, ProbeOutcome, UrlProber};
pub use rules::{HostMatcher, HostRule, HostRules, ProbeStrategy};
