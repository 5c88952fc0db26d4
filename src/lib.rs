//! Probe upstream download sites for package versions newer than the ones
//! declared in a tree of build recipes.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │  Discovery  │────▶│  Extractor  │────▶│ PackageTask │
//! │ (walk tree) │     │  (helper)   │     │   queue     │
//! └─────────────┘     └─────────────┘     └─────────────┘
//!                                                │
//!                                                ▼
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │   Logger    │◀────│    Check    │◀────│ Worker pool │
//! │ (one writer)│     │ (increment, │     │             │
//! └─────────────┘     │   probe)    │     └─────────────┘
//!                     └─────────────┘
//! ```
//!
//! # Modules
//!
//! - [`config`]: constants and configuration values
//! - [`version`]: next-version candidate generation
//! - [`probe`]: URL existence probing (HTTP strategies, FTP)
//! - [`recipe`]: recipe discovery, extraction and source URL selection
//! - [`pool`]: worker pool and output sink
//! - [`check`]: per-package check with the control-probe guard
//! - [`scan`]: top-level run

pub mod check;
pub mod config;
pub mod pool;
pub mod probe;
pub mod recipe;
pub mod scan;
pub mod version;
