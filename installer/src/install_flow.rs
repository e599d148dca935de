//! Per-directory install loop for the CLI.

use camino::{Utf8Path, Utf8PathBuf};
use venv_bootstrap_common::{Reporter, VersionedArtifact};
use venv_bootstrap_installer::policy::{InstallPolicy, Prompt, Resolution, maybe_install};
use venv_bootstrap_installer::target::InstallTarget;

/// Installs `artifact` into every directory and returns how many failed.
///
/// Each directory is checked, its outcome reported, and the policy applied
/// independently; a failure never stops the remaining directories.
pub(crate) fn install_directories(
    directories: &[Utf8PathBuf],
    artifact: &VersionedArtifact,
    policy: InstallPolicy,
    reporter: &mut dyn Reporter,
    mut prompt: Option<&mut dyn Prompt>,
) -> usize {
    if directories.is_empty() {
        reporter.info("warning: no directories supplied");
        return 0;
    }

    let mut failures = 0;
    for directory in directories {
        let target = InstallTarget::new(resolve_directory(directory));
        let outcome = target.check(artifact);
        reporter.info(&format!("{}: {outcome}", target.path()));

        match maybe_install(
            &target,
            artifact,
            Some(outcome),
            policy,
            reporter,
            prompt.as_mut().map(|prompt| -> &mut dyn Prompt { &mut **prompt }),
        ) {
            Ok(Resolution::Installed | Resolution::Unchanged) => {}
            Ok(Resolution::Refused) => failures += 1,
            Err(err) => {
                reporter.error(&err.to_string());
                failures += 1;
            }
        }
    }
    failures
}

/// Absolute form of `directory` when it exists, otherwise as given.
fn resolve_directory(directory: &Utf8Path) -> Utf8PathBuf {
    directory
        .canonicalize_utf8()
        .unwrap_or_else(|_| directory.to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::{fixture, rstest};
    use tempfile::TempDir;
    use venv_bootstrap_common::{MARKER, RecordingReporter, Severity};
    use venv_bootstrap_installer::target::SCRIPT_NAME;

    #[fixture]
    fn artifact() -> VersionedArtifact {
        VersionedArtifact::from_template(b"@@MARKER@@\nVERSION = \"@@VERSION@@\"\n", "1.0.0")
            .expect("template renders")
    }

    fn utf8(dir: &TempDir) -> Utf8PathBuf {
        Utf8PathBuf::try_from(dir.path().to_path_buf()).expect("utf-8 temp path")
    }

    #[rstest]
    fn empty_directory_list_warns_without_failing(artifact: VersionedArtifact) {
        let mut reporter = RecordingReporter::new();
        let failures =
            install_directories(&[], &artifact, InstallPolicy::default(), &mut reporter, None);
        assert_eq!(failures, 0);
        assert_eq!(
            reporter.messages(Severity::Info).collect::<Vec<_>>(),
            ["warning: no directories supplied"]
        );
    }

    #[rstest]
    fn failing_directory_does_not_stop_the_rest(artifact: VersionedArtifact) {
        let good = TempDir::new().expect("temp dir");
        let blocked = TempDir::new().expect("temp dir");
        std::fs::write(blocked.path().join(SCRIPT_NAME), MARKER).expect("seed marker-only file");
        let missing = utf8(&good).join("missing");

        let mut reporter = RecordingReporter::new();
        let failures = install_directories(
            &[utf8(&blocked), missing, utf8(&good)],
            &artifact,
            InstallPolicy::default(),
            &mut reporter,
            None,
        );

        assert_eq!(failures, 2);
        assert!(good.path().join(SCRIPT_NAME).is_file());
        assert_eq!(reporter.count(Severity::Error), 2);
        assert!(
            reporter
                .messages(Severity::Info)
                .any(|line| line.ends_with(": version-unknown"))
        );
    }

    #[rstest]
    fn prompt_is_shared_across_directories(artifact: VersionedArtifact) {
        let first = TempDir::new().expect("temp dir");
        let second = TempDir::new().expect("temp dir");
        for dir in [&first, &second] {
            std::fs::write(dir.path().join(SCRIPT_NAME), b"foreign").expect("seed file");
        }

        let mut asked = 0;
        let mut prompt = |_: &str| {
            asked += 1;
            asked == 1
        };
        let mut reporter = RecordingReporter::new();
        let failures = install_directories(
            &[utf8(&first), utf8(&second)],
            &artifact,
            InstallPolicy::default(),
            &mut reporter,
            Some(&mut prompt),
        );

        assert_eq!(failures, 0);
        assert_eq!(asked, 2);
        assert_eq!(
            std::fs::read(first.path().join(SCRIPT_NAME)).expect("read first"),
            artifact.bytes()
        );
        assert_eq!(
            std::fs::read(second.path().join(SCRIPT_NAME)).expect("read second"),
            b"foreign"
        );
    }
}
