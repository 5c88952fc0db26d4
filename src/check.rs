//! Per-package check: probe incremented versions of the source URL
//!
//! Candidates are tried least significant bump first. The first one whose
//! URL exists is cross-checked against a control URL built from a version
//! that should not exist (`<current>99999`). If the control resolves too, the
//! host answers "yes" to everything and the hit is reported as suspicious.

use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::config::INVALID_VERSION_SUFFIX;
use crate::pool::Logger;
use crate::probe::UrlProber;
use crate::recipe::{PackageTask, VersionPattern};
use crate::version::next_versions;

/// Result of checking one package
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckOutcome {
    /// A candidate URL exists and the control URL does not
    NewVersion { from: String, to: String },
    /// A candidate URL exists, but so does the control URL
    Suspicious {
        candidate: String,
        control_version: String,
    },
    /// No candidate URL exists
    UpToDate,
    /// The version has no numeric trailing component to bump
    NoCandidates,
    /// The run was cancelled before an answer was reached
    Cancelled,
}

/// Build the deliberately invalid version used for the control probe
pub fn control_version(current_version: &str) -> String {
    format!("{}{}", current_version, INVALID_VERSION_SUFFIX)
}

/// Check one package and report notable results through `logger`
pub async fn check_package(
    task: &PackageTask,
    prober: &dyn UrlProber,
    logger: &Logger,
    cancel: &CancellationToken,
) -> CheckOutcome {
    let current = task.current_version.as_str();
    let candidates = next_versions(current);
    let pattern = VersionPattern::new(current);

    let Some(pattern) = pattern.filter(|_| !candidates.is_empty()) else {
        logger.diagnostic(&task.name, format!("cannot increment version {}", current));
        return CheckOutcome::NoCandidates;
    };

    for candidate in candidates {
        if cancel.is_cancelled() {
            return CheckOutcome::Cancelled;
        }

        let url = pattern.replace_all(&task.source_url_template, &candidate);
        debug!("{}: probing {}", task.name, url);
        if !prober.exists(&url, cancel).await {
            continue;
        }

        let control_version = control_version(current);
        let control_url = pattern.replace_all(&task.source_url_template, &control_version);
        let control_exists = prober.exists(&control_url, cancel).await;
        if cancel.is_cancelled() {
            return CheckOutcome::Cancelled;
        }

        if control_exists {
            logger.result(
                &task.name,
                format!(
                    "suspicious result - {} => {} (invalid version {} also resolves)",
                    current, candidate, control_version
                ),
            );
            return CheckOutcome::Suspicious {
                candidate,
                control_version,
            };
        }

        logger.result(
            &task.name,
            format!("new version found - {} => {}", current, candidate),
        );
        return CheckOutcome::NewVersion {
            from: current.to_string(),
            to: candidate,
        };
    }

    if cancel.is_cancelled() {
        return CheckOutcome::Cancelled;
    }

    logger.diagnostic(&task.name, format!("no newer version than {}", current));
    CheckOutcome::UpToDate
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::probe::prober::MockUrlProber;

    const TEMPLATE: &str = "https://example.com/foo-2.0.tar.gz";

    fn task() -> PackageTask {
        PackageTask::new("foo", "2.0", TEMPLATE)
    }

    fn prober_with_existing(existing: &'static [&'static str]) -> MockUrlProber {
        let mut prober = MockUrlProber::new();
        prober
            .expect_exists()
            .returning(move |url, _| existing.iter().any(|existing| *existing == url));
        prober
    }

    async fn check_with(
        task: &PackageTask,
        prober: &MockUrlProber,
        verbose: bool,
        cancel: &CancellationToken,
    ) -> (CheckOutcome, String) {
        let (logger, handle) = Logger::spawn(Vec::new(), verbose);
        let outcome = check_package(task, prober, &logger, cancel).await;
        drop(logger);
        let output = String::from_utf8(handle.finish().await.unwrap()).unwrap();
        (outcome, output)
    }

    #[test]
    fn control_version_appends_suffix() {
        assert_eq!(control_version("2.0"), "2.099999");
    }

    #[tokio::test]
    async fn check_package_reports_nothing_when_no_candidate_exists() {
        let mut prober = MockUrlProber::new();
        prober
            .expect_exists()
            .withf(|url, _| url == "https://example.com/foo-2.1.tar.gz")
            .times(1)
            .returning(|_, _| false);
        prober
            .expect_exists()
            .withf(|url, _| url == "https://example.com/foo-3.0.tar.gz")
            .times(1)
            .returning(|_, _| false);

        let (outcome, output) =
            check_with(&task(), &prober, false, &CancellationToken::new()).await;

        assert_eq!(outcome, CheckOutcome::UpToDate);
        assert_eq!(output, "");
    }

    #[tokio::test]
    async fn check_package_reports_new_version_when_control_is_missing() {
        let mut prober = MockUrlProber::new();
        prober
            .expect_exists()
            .withf(|url, _| url == "https://example.com/foo-2.1.tar.gz")
            .times(1)
            .returning(|_, _| true);
        prober
            .expect_exists()
            .withf(|url, _| url == "https://example.com/foo-2.099999.tar.gz")
            .times(1)
            .returning(|_, _| false);
        // The more significant bump is never probed once a hit is confirmed
        prober
            .expect_exists()
            .withf(|url, _| url == "https://example.com/foo-3.0.tar.gz")
            .times(0);

        let (outcome, output) =
            check_with(&task(), &prober, false, &CancellationToken::new()).await;

        assert_eq!(
            outcome,
            CheckOutcome::NewVersion {
                from: "2.0".to_string(),
                to: "2.1".to_string(),
            }
        );
        assert_eq!(output, "foo: new version found - 2.0 => 2.1\n");
    }

    #[tokio::test]
    async fn check_package_downgrades_hit_to_suspicious_when_control_exists() {
        let prober = prober_with_existing(&[
            "https://example.com/foo-2.1.tar.gz",
            "https://example.com/foo-2.099999.tar.gz",
        ]);

        let (outcome, output) =
            check_with(&task(), &prober, false, &CancellationToken::new()).await;

        assert_eq!(
            outcome,
            CheckOutcome::Suspicious {
                candidate: "2.1".to_string(),
                control_version: "2.099999".to_string(),
            }
        );
        assert!(!output.contains("new version found"));
        assert_eq!(
            output,
            "foo: suspicious result - 2.0 => 2.1 (invalid version 2.099999 also resolves)\n"
        );
    }

    #[tokio::test]
    async fn check_package_finds_more_significant_bump() {
        let prober = prober_with_existing(&["https://example.com/foo-3.0.tar.gz"]);

        let (outcome, output) =
            check_with(&task(), &prober, false, &CancellationToken::new()).await;

        assert_eq!(
            outcome,
            CheckOutcome::NewVersion {
                from: "2.0".to_string(),
                to: "3.0".to_string(),
            }
        );
        assert_eq!(output, "foo: new version found - 2.0 => 3.0\n");
    }

    #[tokio::test]
    async fn check_package_substitutes_every_occurrence_of_the_version() {
        let task = PackageTask::new(
            "bar",
            "1.4",
            "https://example.com/releases/1.4/bar-1.4.tar.xz",
        );
        let prober = prober_with_existing(&["https://example.com/releases/1.5/bar-1.5.tar.xz"]);

        let (outcome, _) = check_with(&task, &prober, false, &CancellationToken::new()).await;

        assert_eq!(
            outcome,
            CheckOutcome::NewVersion {
                from: "1.4".to_string(),
                to: "1.5".to_string(),
            }
        );
    }

    #[tokio::test]
    async fn check_package_reports_unincrementable_version_in_verbose_mode() {
        let task = PackageTask::new("baz", "1.0rc1", "https://example.com/baz-1.0rc1.tar.gz");
        let mut prober = MockUrlProber::new();
        prober.expect_exists().times(0);

        let (outcome, output) =
            check_with(&task, &prober, true, &CancellationToken::new()).await;

        assert_eq!(outcome, CheckOutcome::NoCandidates);
        assert_eq!(output, "baz: cannot increment version 1.0rc1\n");
    }

    #[tokio::test]
    async fn check_package_stops_when_cancelled() {
        let mut prober = MockUrlProber::new();
        prober.expect_exists().times(0);
        let cancel = CancellationToken::new();
        cancel.cancel();

        let (outcome, output) = check_with(&task(), &prober, false, &cancel).await;

        assert_eq!(outcome, CheckOutcome::Cancelled);
        assert_eq!(output, "");
    }
}
