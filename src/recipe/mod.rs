//! Recipe layer
//! - types.rs: PackageTask, ExtractedRecipe, RecipePath
//! - discovery.rs: recipe tree walking and whitelist filtering
//! - extractor.rs: RecipeExtractor trait and the external-command extractor
//! - source.rs: source URL selection and version substitution
//! - error.rs: discovery and extraction errors

pub mod discovery;
pub mod error;
pub mod extractor;
pub mod source;
pub mod types;

pub use discovery::discover_recipes;
pub use error::{DiscoveryError, ExtractError};
pub use extractor::{CommandExtractor, RecipeExtractor};
pub use source::{VersionPattern, select_source_template};
pub use types::{ExtractedRecipe, PackageTask, RecipePath};
