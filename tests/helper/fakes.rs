//! Fake collaborators for driving a scan without network or shell access

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tempfile::TempDir;
use tokio_util::sync::CancellationToken;

use upstream_check::config::{FileConfig, ScanConfig};
use upstream_check::pool::Logger;
use upstream_check::probe::UrlProber;
use upstream_check::recipe::{ExtractError, ExtractedRecipe, RecipeExtractor};
use upstream_check::scan::{self, ScanError, ScanSummary};

/// Extractor answering from a table keyed by package directory name
#[derive(Default)]
pub struct FakeExtractor {
    recipes: HashMap<String, ExtractedRecipe>,
}

impl FakeExtractor {
    pub fn with_recipe(mut self, dir: &str, name: &str, version: &str, sources: &[&str]) -> Self {
        self.recipes.insert(
            dir.to_string(),
            ExtractedRecipe {
                name: name.to_string(),
                version: version.to_string(),
                sources: sources.iter().map(|s| s.to_string()).collect(),
            },
        );
        self
    }
}

#[async_trait]
impl RecipeExtractor for FakeExtractor {
    async fn extract(&self, path: &Path) -> Result<ExtractedRecipe, ExtractError> {
        let dir = path
            .parent()
            .and_then(|dir| dir.file_name())
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();

        self.recipes
            .get(&dir)
            .cloned()
            .ok_or(ExtractError::Failed {
                code: Some(1),
                stderr: format!("cannot source {}", path.display()),
            })
    }
}

/// Prober answering from a fixed set of existing URLs; records every probe
#[derive(Default)]
pub struct FakeProber {
    existing: HashSet<String>,
    probed: Mutex<Vec<String>>,
}

impl FakeProber {
    pub fn with_existing(urls: &[&str]) -> Self {
        Self {
            existing: urls.iter().map(|u| u.to_string()).collect(),
            probed: Mutex::new(Vec::new()),
        }
    }

    pub fn probed(&self) -> Vec<String> {
        self.probed.lock().unwrap().clone()
    }
}

#[async_trait]
impl UrlProber for FakeProber {
    async fn exists(&self, url: &str, cancel: &CancellationToken) -> bool {
        self.probed.lock().unwrap().push(url.to_string());
        !cancel.is_cancelled() && self.existing.contains(url)
    }
}

/// Create `<root>/<repo>/<package>/PKGBUILD` for each entry
pub fn create_recipe_tree(packages: &[(&str, &str)]) -> TempDir {
    let temp_dir = TempDir::new().unwrap();
    for (repo, package) in packages {
        let dir = temp_dir.path().join(repo).join(package);
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("PKGBUILD"), "").unwrap();
    }
    temp_dir
}

/// Run a scan over `root` and return the summary together with stdout
pub async fn run_scan(
    root: PathBuf,
    whitelist: &[&str],
    verbose: bool,
    extractor: FakeExtractor,
    prober: Arc<dyn UrlProber>,
) -> (Result<ScanSummary, ScanError>, String) {
    let mut config = ScanConfig::from_file_config(FileConfig::default(), root);
    config.verbose = verbose;
    config.threads = 3;
    config.whitelist = whitelist.iter().map(|s| s.to_string()).collect();

    let (logger, handle) = Logger::spawn(Vec::new(), verbose);
    let result = scan::run(
        &config,
        Arc::new(extractor),
        prober,
        logger,
        CancellationToken::new(),
    )
    .await;
    let output = String::from_utf8(handle.finish().await.unwrap()).unwrap();

    (result, output)
}
