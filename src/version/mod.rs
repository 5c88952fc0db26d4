//! Version layer
//!
//! - [`increment`]: tokenizes a version string and generates the candidate
//!   next versions, least significant bump first

pub mod increment;

pub use increment::{Token, next_versions, tokenize};
