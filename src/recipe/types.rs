//! Common types for the recipe layer

use std::path::PathBuf;

/// Fields pulled out of one build recipe by the extraction step
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedRecipe {
    pub name: String,
    pub version: String,
    /// Source entries in declaration order (not yet filtered)
    pub sources: Vec<String>,
}

/// A discovered build recipe on disk
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecipePath {
    /// Name of the directory holding the recipe
    pub package_dir: String,
    pub path: PathBuf,
}

/// Unit of work for one package
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PackageTask {
    pub name: String,
    pub current_version: String,
    /// Download URL containing `current_version` as a whole word
    pub source_url_template: String,
}

impl PackageTask {
    pub fn new(name: &str, current_version: &str, source_url_template: &str) -> Self {
        Self {
            name: name.to_string(),
            current_version: current_version.to_string(),
            source_url_template: source_url_template.to_string(),
        }
    }
}
