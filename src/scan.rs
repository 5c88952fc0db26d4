//! Top-level run: discovery -> extraction -> worker pool

use std::path::PathBuf;
use std::sync::Arc;

use futures::stream::{self, StreamExt};
use thiserror::Error;
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::check::{CheckOutcome, check_package};
use crate::config::{ConfigError, DEFAULT_ABS_ROOT, ScanConfig};
use crate::pool::{self, Logger};
use crate::probe::UrlProber;
use crate::recipe::{
    DiscoveryError, PackageTask, RecipeExtractor, RecipePath, discover_recipes,
    select_source_template,
};

/// Configuration-level problems; the only errors that abort a run
#[derive(Debug, Error)]
pub enum ScanError {
    #[error("--abs and -d cannot be used together")]
    ConflictingRoots,

    #[error(transparent)]
    Discovery(#[from] DiscoveryError),

    #[error("No packages found")]
    NoPackages,

    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Counts gathered over one run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScanSummary {
    pub recipes_found: usize,
    pub tasks_queued: usize,
    pub new_versions: usize,
    pub suspicious: usize,
    pub up_to_date: usize,
    pub no_candidates: usize,
    pub cancelled: usize,
}

impl ScanSummary {
    fn record(&mut self, outcome: &CheckOutcome) {
        match outcome {
            CheckOutcome::NewVersion { .. } => self.new_versions += 1,
            CheckOutcome::Suspicious { .. } => self.suspicious += 1,
            CheckOutcome::UpToDate => self.up_to_date += 1,
            CheckOutcome::NoCandidates => self.no_candidates += 1,
            CheckOutcome::Cancelled => self.cancelled += 1,
        }
    }
}

/// Pick the recipe tree to scan.
///
/// `--abs` selects the well-known system tree, `-d` an arbitrary one; giving
/// both is an error. Without either, `default_root` (from the config file) is used.
pub fn resolve_root(
    abs: bool,
    dir: Option<PathBuf>,
    default_root: PathBuf,
) -> Result<PathBuf, ScanError> {
    match (abs, dir) {
        (true, Some(_)) => Err(ScanError::ConflictingRoots),
        (true, None) => Ok(PathBuf::from(DEFAULT_ABS_ROOT)),
        (false, Some(dir)) => Ok(dir),
        (false, None) => Ok(default_root),
    }
}

/// Run the extractor over every recipe and keep the packages that have a
/// probeable source URL. Failures skip the package with a diagnostic.
///
/// Extraction runs up to `concurrency` helpers at once; the result keeps
/// recipe order. Once `cancel` fires no further recipe is extracted and
/// in-flight helpers are dropped.
pub async fn collect_tasks(
    recipes: Vec<RecipePath>,
    extractor: &dyn RecipeExtractor,
    concurrency: usize,
    logger: &Logger,
    cancel: &CancellationToken,
) -> Vec<PackageTask> {
    stream::iter(recipes)
        .map(|recipe| async move {
            let result = extractor.extract(&recipe.path).await;
            (recipe, result)
        })
        .buffered(concurrency.max(1))
        .take_until(cancel.cancelled())
        .filter_map(|(recipe, result)| async move {
            let extracted = result
                .inspect_err(|e| logger.diagnostic(&recipe.package_dir, format!("skipped: {}", e)))
                .ok()?;

            let Some(template) = select_source_template(&extracted) else {
                logger.diagnostic(
                    &extracted.name,
                    format!("no source URL containing version {}", extracted.version),
                );
                return None;
            };

            Some(PackageTask::new(
                &extracted.name,
                &extracted.version,
                &template,
            ))
        })
        .collect()
        .await
}

/// Scan the configured tree and check every package for a newer upstream version.
///
/// Per-package failures are reported through `logger` and never fail the run.
pub async fn run(
    config: &ScanConfig,
    extractor: Arc<dyn RecipeExtractor>,
    prober: Arc<dyn UrlProber>,
    logger: Logger,
    cancel: CancellationToken,
) -> Result<ScanSummary, ScanError> {
    let recipes = discover_recipes(&config.root, &config.recipe_file, &config.whitelist)?;
    let recipes_found = recipes.len();
    if recipes_found == 0 {
        return Err(ScanError::NoPackages);
    }

    let tasks = collect_tasks(
        recipes,
        extractor.as_ref(),
        config.threads,
        &logger,
        &cancel,
    )
    .await;
    if tasks.is_empty() && !cancel.is_cancelled() {
        return Err(ScanError::NoPackages);
    }
    let tasks_queued = tasks.len();
    info!(
        "Checking {} packages ({} recipes) with up to {} workers",
        tasks_queued, recipes_found, config.threads
    );

    let summary = Arc::new(Mutex::new(ScanSummary {
        recipes_found,
        tasks_queued,
        ..ScanSummary::default()
    }));

    let report = {
        let summary = Arc::clone(&summary);
        let worker_cancel = cancel.clone();
        pool::run(tasks, config.threads, cancel, move |task| {
            let prober = Arc::clone(&prober);
            let logger = logger.clone();
            let cancel = worker_cancel.clone();
            let summary = Arc::clone(&summary);
            async move {
                let outcome = check_package(&task, prober.as_ref(), &logger, &cancel).await;
                debug!("{}: {:?}", task.name, outcome);
                summary.lock().await.record(&outcome);
            }
        })
        .await
    };
    debug!(
        "{} workers processed {} tasks",
        report.workers_spawned, report.tasks_processed
    );

    let summary = *summary.lock().await;
    info!(
        "Done: {} new, {} suspicious, {} up to date, {} not incrementable, {} cancelled",
        summary.new_versions,
        summary.suspicious,
        summary.up_to_date,
        summary.no_candidates,
        summary.cancelled
    );

    Ok(summary)
}
