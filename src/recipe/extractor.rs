//! Extraction boundary: turns a recipe file into name, version and sources
//!
//! Recipes are shell scripts, so the heavy lifting is delegated to an
//! external helper. Its output protocol is line based:
//!
//! ```text
//! <name>
//! <version>
//! <source url>...
//! ```

#[cfg(test)]
use mockall::automock;

use std::path::{Path, PathBuf};
use std::time::Duration;

use tokio::process::Command;
use tracing::debug;

use crate::config::ExtractorConfig;
use crate::recipe::error::ExtractError;
use crate::recipe::types::ExtractedRecipe;

/// Trait for extracting package fields from a recipe file
#[cfg_attr(test, automock)]
#[async_trait::async_trait]
pub trait RecipeExtractor: Send + Sync {
    async fn extract(&self, path: &Path) -> Result<ExtractedRecipe, ExtractError>;
}

/// Runs an external helper once per recipe.
///
/// The helper runs inside the recipe's directory and receives the recipe as
/// `./<file name>`, so relative scan roots resolve the same as absolute ones.
pub struct CommandExtractor {
    program: String,
    args: Vec<String>,
    timeout: Duration,
}

impl CommandExtractor {
    pub fn new(config: &ExtractorConfig) -> Self {
        Self {
            program: config.program.clone(),
            args: config.args.clone(),
            timeout: Duration::from_secs(config.timeout_secs),
        }
    }
}

impl Default for CommandExtractor {
    fn default() -> Self {
        Self::new(&ExtractorConfig::default())
    }
}

#[async_trait::async_trait]
impl RecipeExtractor for CommandExtractor {
    async fn extract(&self, path: &Path) -> Result<ExtractedRecipe, ExtractError> {
        let mut command = Command::new(&self.program);
        command
            .args(&self.args)
            .arg(helper_argument(path))
            .kill_on_drop(true);
        // Recipes may refer to sibling files
        if let Some(dir) = path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
            command.current_dir(dir);
        }

        // Dropping the output future kills the helper
        let output = tokio::time::timeout(self.timeout, command.output())
            .await
            .map_err(|_| ExtractError::Timeout(self.timeout))??;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            debug!(
                "Extractor failed for {}: {:?} {}",
                path.display(),
                output.status.code(),
                stderr
            );
            return Err(ExtractError::Failed {
                code: output.status.code(),
                stderr,
            });
        }

        parse_output(&String::from_utf8_lossy(&output.stdout))
    }
}

/// Recipe argument as seen from inside its own directory. The `./` prefix
/// keeps `source` from searching `PATH`.
fn helper_argument(path: &Path) -> PathBuf {
    match (path.parent(), path.file_name()) {
        (Some(dir), Some(file_name)) if !dir.as_os_str().is_empty() => {
            Path::new(".").join(file_name)
        }
        _ => path.to_path_buf(),
    }
}

/// Parse the helper's line protocol
pub fn parse_output(stdout: &str) -> Result<ExtractedRecipe, ExtractError> {
    let mut lines = stdout.lines().map(str::trim);

    let name = lines
        .next()
        .filter(|name| !name.is_empty())
        .ok_or(ExtractError::MissingField("name"))?;
    let version = lines
        .next()
        .filter(|version| !version.is_empty())
        .ok_or(ExtractError::MissingField("version"))?;
    let sources = lines
        .filter(|line| !line.is_empty())
        .map(|line| line.to_string())
        .collect();

    Ok(ExtractedRecipe {
        name: name.to_string(),
        version: version.to_string(),
        sources,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recipe::discover_recipes;
    use rstest::rstest;
    use std::time::Instant;
    use tempfile::TempDir;

    const FOO_PKGBUILD: &str = r#"pkgname=foo
pkgver=1.2.3
pkgrel=1
source=("https://example.com/foo-$pkgver.tar.gz"
        "fix-build.patch")
"#;

    fn cat_extractor() -> CommandExtractor {
        CommandExtractor::new(&ExtractorConfig {
            program: "sh".to_string(),
            args: vec![
                "-c".to_string(),
                r#"cat "$1""#.to_string(),
                "extract".to_string(),
            ],
            timeout_secs: 5,
        })
    }

    #[test]
    fn parse_output_reads_name_version_and_sources() {
        let result = parse_output(
            "foo\n1.2.3\nhttps://example.com/foo-1.2.3.tar.gz\n\nfoo.patch\n",
        )
        .unwrap();

        assert_eq!(
            result,
            ExtractedRecipe {
                name: "foo".to_string(),
                version: "1.2.3".to_string(),
                sources: vec![
                    "https://example.com/foo-1.2.3.tar.gz".to_string(),
                    "foo.patch".to_string(),
                ],
            }
        );
    }

    #[test]
    fn parse_output_accepts_recipe_without_sources() {
        let result = parse_output("foo\n1.0\n").unwrap();

        assert!(result.sources.is_empty());
    }

    #[test]
    fn parse_output_fails_without_name() {
        let result = parse_output("");

        assert!(matches!(result, Err(ExtractError::MissingField("name"))));
    }

    #[test]
    fn parse_output_fails_without_version() {
        let result = parse_output("foo\n\nhttps://example.com/foo.tar.gz\n");

        assert!(matches!(result, Err(ExtractError::MissingField("version"))));
    }

    #[tokio::test]
    async fn command_extractor_parses_helper_output() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("recipe.out");
        std::fs::write(&path, "bar\n0.4\nftp://ftp.example.com/bar-0.4.tar.bz2\n").unwrap();

        let result = cat_extractor().extract(&path).await.unwrap();

        assert_eq!(result.name, "bar");
        assert_eq!(result.version, "0.4");
        assert_eq!(result.sources, vec!["ftp://ftp.example.com/bar-0.4.tar.bz2"]);
    }

    #[tokio::test]
    async fn command_extractor_reports_nonzero_exit() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("missing.out");

        let result = cat_extractor().extract(&path).await;

        assert!(matches!(result, Err(ExtractError::Failed { .. })));
    }

    #[tokio::test]
    async fn command_extractor_reports_missing_program() {
        let extractor = CommandExtractor::new(&ExtractorConfig {
            program: "/nonexistent/extractor".to_string(),
            args: vec![],
            timeout_secs: 5,
        });

        let result = extractor.extract(Path::new("PKGBUILD")).await;

        assert!(matches!(result, Err(ExtractError::Spawn(_))));
    }

    #[tokio::test]
    async fn default_extractor_sources_pkgbuild() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("PKGBUILD");
        std::fs::write(&path, FOO_PKGBUILD).unwrap();

        let result = CommandExtractor::default().extract(&path).await.unwrap();

        assert_eq!(
            result,
            ExtractedRecipe {
                name: "foo".to_string(),
                version: "1.2.3".to_string(),
                sources: vec![
                    "https://example.com/foo-1.2.3.tar.gz".to_string(),
                    "fix-build.patch".to_string(),
                ],
            }
        );
    }

    #[tokio::test]
    async fn default_extractor_handles_recipes_under_relative_root() {
        // Created under the working directory so the root can be given relative
        let temp_dir = tempfile::Builder::new()
            .prefix("relative-root")
            .tempdir_in(".")
            .unwrap();
        let root = PathBuf::from(".").join(temp_dir.path().file_name().unwrap());
        let package_dir = root.join("extra").join("foo");
        std::fs::create_dir_all(&package_dir).unwrap();
        std::fs::write(package_dir.join("PKGBUILD"), FOO_PKGBUILD).unwrap();

        let recipes = discover_recipes(&root, "PKGBUILD", &[]).unwrap();
        assert_eq!(recipes.len(), 1);
        assert!(recipes[0].path.is_relative());

        let result = CommandExtractor::default()
            .extract(&recipes[0].path)
            .await
            .unwrap();

        assert_eq!(result.name, "foo");
        assert_eq!(result.version, "1.2.3");
    }

    #[tokio::test]
    async fn command_extractor_gives_up_on_hung_helper() {
        let extractor = CommandExtractor {
            program: "sh".to_string(),
            args: vec!["-c".to_string(), "sleep 30".to_string(), "extract".to_string()],
            timeout: Duration::from_millis(200),
        };
        let started = Instant::now();

        let result = extractor.extract(Path::new("PKGBUILD")).await;

        assert!(matches!(result, Err(ExtractError::Timeout(_))));
        assert!(started.elapsed() < Duration::from_secs(10));
    }

    #[rstest]
    #[case("/var/abs/extra/foo/PKGBUILD", "./PKGBUILD")]
    #[case("tree/extra/foo/PKGBUILD", "./PKGBUILD")]
    #[case("PKGBUILD", "PKGBUILD")]
    fn helper_argument_is_relative_to_recipe_directory(
        #[case] path: &str,
        #[case] expected: &str,
    ) {
        assert_eq!(helper_argument(Path::new(path)), PathBuf::from(expected));
    }
}
