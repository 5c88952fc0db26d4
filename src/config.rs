use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

// =============================================================================
// Scan-related constants
// =============================================================================

/// Default number of concurrent workers
pub const DEFAULT_THREADS: usize = 12;

/// Well-known root of the system package-recipe tree (selected by `--abs`)
pub const DEFAULT_ABS_ROOT: &str = "/var/abs";

/// File name of a build recipe inside a package directory
pub const DEFAULT_RECIPE_FILE: &str = "PKGBUILD";

// =============================================================================
// Probe-related constants
// =============================================================================

/// Timeout for a single existence probe in seconds
pub const PROBE_TIMEOUT_SECS: u64 = 30;

/// Timeout for one run of the extraction helper in seconds
pub const EXTRACT_TIMEOUT_SECS: u64 = 60;

/// Appended to the current version to build the control URL that must NOT exist
pub const INVALID_VERSION_SUFFIX: &str = "99999";

/// User agent sent with every HTTP probe
pub const USER_AGENT: &str = concat!("upstream-check/", env!("CARGO_PKG_VERSION"));

/// Helper script used to pull name, version and sources out of a recipe.
///
/// Receives the recipe path as `$1` and prints the name, the version and then
/// one source entry per line.
pub const DEFAULT_EXTRACTOR_SCRIPT: &str = r#"source "$1" >/dev/null 2>&1 || exit 1
echo "$pkgname"
echo "$pkgver"
printf '%s\n' "${source[@]}""#;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Invalid config file {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
}

/// On-disk configuration structure
#[derive(Debug, Clone, Deserialize, Default, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct FileConfig {
    pub scan: ScanSection,
    pub probe: ProbeConfig,
    pub extractor: ExtractorConfig,
}

/// Scan-related configuration
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct ScanSection {
    /// Number of concurrent workers
    pub threads: usize,
    /// Recipe tree scanned when neither `--abs` nor `-d` is given
    pub root: PathBuf,
    /// File name identifying a build recipe
    pub recipe_file: String,
}

impl Default for ScanSection {
    fn default() -> Self {
        Self {
            threads: DEFAULT_THREADS,
            root: PathBuf::from(DEFAULT_ABS_ROOT),
            recipe_file: DEFAULT_RECIPE_FILE.to_string(),
        }
    }
}

/// Probe-related configuration
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct ProbeConfig {
    /// Per-probe timeout in seconds
    pub timeout_secs: u64,
    /// Hosts that only need to answer with a 2xx/3xx status
    pub transport_only_hosts: Vec<String>,
    /// Domains (and their subdomains) probed with a far-future conditional GET
    pub conditional_get_domains: Vec<String>,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            timeout_secs: PROBE_TIMEOUT_SECS,
            transport_only_hosts: vec![
                "github.com".to_string(),
                "bitbucket.org".to_string(),
                "gitlab.com".to_string(),
                "launchpad.net".to_string(),
            ],
            conditional_get_domains: vec!["sourceforge.net".to_string()],
        }
    }
}

/// External extraction helper configuration
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct ExtractorConfig {
    /// Program to run; the recipe file is appended as the last argument
    pub program: String,
    pub args: Vec<String>,
    /// Seconds a single run may take before the recipe is skipped
    pub timeout_secs: u64,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            program: "bash".to_string(),
            args: vec![
                "-c".to_string(),
                DEFAULT_EXTRACTOR_SCRIPT.to_string(),
                "upstream-check".to_string(),
            ],
            timeout_secs: EXTRACT_TIMEOUT_SECS,
        }
    }
}

/// Fully resolved configuration for one run
#[derive(Debug, Clone, PartialEq)]
pub struct ScanConfig {
    pub root: PathBuf,
    pub recipe_file: String,
    pub threads: usize,
    pub verbose: bool,
    /// Package directory names to restrict the scan to; empty means all
    pub whitelist: Vec<String>,
    pub probe: ProbeConfig,
    pub extractor: ExtractorConfig,
}

impl ScanConfig {
    /// Build a run configuration from the file config, overriding the root
    pub fn from_file_config(file: FileConfig, root: PathBuf) -> Self {
        Self {
            root,
            recipe_file: file.scan.recipe_file,
            threads: file.scan.threads,
            verbose: false,
            whitelist: Vec::new(),
            probe: file.probe,
            extractor: file.extractor,
        }
    }
}

/// Load the config file.
///
/// An explicitly given path must exist. The default path is optional and
/// falls back to [`FileConfig::default`] when absent.
pub fn load(explicit: Option<&Path>) -> Result<FileConfig, ConfigError> {
    match explicit {
        Some(path) => read_config(path),
        None => {
            let path = config_path();
            if path.is_file() {
                read_config(&path)
            } else {
                Ok(FileConfig::default())
            }
        }
    }
}

fn read_config(path: &Path) -> Result<FileConfig, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&content).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Returns the path to the default config file.
/// Uses $XDG_CONFIG_HOME/upstream-check if XDG_CONFIG_HOME is set,
/// otherwise falls back to ~/.config/upstream-check,
/// or ./upstream-check if neither is available.
pub fn config_path() -> PathBuf {
    config_dir_with_env(std::env::var("XDG_CONFIG_HOME").ok(), dirs::home_dir())
        .join("config.json")
}

fn config_dir_with_env(xdg_config_home: Option<String>, home_dir: Option<PathBuf>) -> PathBuf {
    let config_dir = xdg_config_home
        .map(PathBuf::from)
        .or_else(|| home_dir.map(|home| home.join(".config")))
        .unwrap_or_else(|| PathBuf::from("."));

    config_dir.join("upstream-check")
}
