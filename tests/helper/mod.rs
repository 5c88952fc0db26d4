//! Shared test utilities

pub mod fakes;

pub use fakes::{FakeExtractor, FakeProber, create_recipe_tree, run_scan};
