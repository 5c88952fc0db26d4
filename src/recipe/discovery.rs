//! Recipe discovery: walk a directory tree and collect build recipes

use std::path::Path;

use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::recipe::error::DiscoveryError;
use crate::recipe::types::RecipePath;

/// Collect every file named `recipe_file` under `root`, sorted by path.
///
/// When `whitelist` is non-empty, only recipes whose parent directory name
/// is listed are kept. Unreadable entries are skipped with a warning.
pub fn discover_recipes(
    root: &Path,
    recipe_file: &str,
    whitelist: &[String],
) -> Result<Vec<RecipePath>, DiscoveryError> {
    if !root.is_dir() {
        return Err(DiscoveryError::RootNotFound(root.to_path_buf()));
    }

    let mut recipes: Vec<RecipePath> = WalkDir::new(root)
        .follow_links(false)
        .into_iter()
        .filter_map(|entry| {
            entry
                .inspect_err(|e| warn!("Skipping unreadable entry: {}", e))
                .ok()
        })
        .filter(|entry| entry.file_type().is_file() && entry.file_name() == recipe_file)
        .filter_map(|entry| {
            let package_dir = entry
                .path()
                .parent()
                .and_then(|dir| dir.file_name())
                .map(|name| name.to_string_lossy().into_owned())?;
            Some(RecipePath {
                package_dir,
                path: entry.into_path(),
            })
        })
        .filter(|recipe| whitelist.is_empty() || whitelist.contains(&recipe.package_dir))
        .collect();

    recipes.sort_by(|a, b| a.path.cmp(&b.path));
    debug!("Discovered {} recipes under {}", recipes.len(), root.display());

    Ok(recipes)
}
