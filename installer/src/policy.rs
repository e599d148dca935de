//! Decides whether a target gets the launcher, then installs it.
//!
//! The policy never looks at the filesystem itself: it acts on a
//! [`CheckOutcome`] and reports every decision through a [`Reporter`]. An
//! optional [`Prompt`] lets an interactive front-end ask before overwriting
//! unknown files or downgrading.

use crate::check::CheckOutcome;
use crate::error::Result;
use crate::target::InstallTarget;
use log::debug;
use venv_bootstrap_common::{Reporter, VersionedArtifact};

/// Flags controlling overwrite decisions for one target.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InstallPolicy {
    /// Keep older launchers in place.
    pub no_upgrade: bool,
    /// Replace newer launchers without asking.
    pub downgrade: bool,
    /// Overwrite files that may not be ours.
    pub force: bool,
}

/// Yes/no confirmation source.
pub trait Prompt {
    /// Asks `question`; returns `true` when the user agrees.
    fn confirm(&mut self, question: &str) -> bool;
}

impl<F> Prompt for F
where
    F: FnMut(&str) -> bool,
{
    fn confirm(&mut self, question: &str) -> bool {
        self(question)
    }
}

/// What happened to a target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    /// The artifact was written.
    Installed,
    /// The target was left as it was, by policy or choice.
    Unchanged,
    /// The target cannot or must not be written.
    Refused,
}

/// Applies `policy` to `target`, installing `artifact` when allowed.
///
/// `outcome` is the result of a previous [`InstallTarget::check`]; when it is
/// `None` the target is checked first.
///
/// # Errors
///
/// Returns an error only when an allowed install fails to write. Refusals are
/// reported through `reporter` and returned as [`Resolution::Refused`].
pub fn maybe_install(
    target: &InstallTarget,
    artifact: &VersionedArtifact,
    outcome: Option<CheckOutcome>,
    policy: InstallPolicy,
    reporter: &mut dyn Reporter,
    prompt: Option<&mut dyn Prompt>,
) -> Result<Resolution> {
    let outcome = outcome.unwrap_or_else(|| target.check(artifact));
    debug!("{}: {outcome} under {policy:?}", target.path());
    let path = target.path();
    let version = artifact.version();

    match outcome {
        CheckOutcome::Absent => {
            target.install(artifact)?;
            reporter.info(&format!("{path}: installed version {version}"));
            Ok(Resolution::Installed)
        }
        CheckOutcome::VersionSame => {
            reporter.info(&format!("{path}: version {version} already installed"));
            Ok(Resolution::Unchanged)
        }
        CheckOutcome::NoDir => {
            reporter.error(&format!("{}: directory does not exist", target.directory()));
            Ok(Resolution::Refused)
        }
        CheckOutcome::ADir => {
            reporter.error(&format!("{path}: is a directory"));
            Ok(Resolution::Refused)
        }
        CheckOutcome::VersionOlder { installed } => {
            if policy.no_upgrade {
                reporter.info(&format!(
                    "{path}: version {installed} left in place (--no-upgrade)"
                ));
                return Ok(Resolution::Unchanged);
            }
            target.install(artifact)?;
            reporter.info(&format!("{path}: upgraded from {installed} to {version}"));
            Ok(Resolution::Installed)
        }
        CheckOutcome::VersionNewer { installed } => {
            let question =
                format!("{path}: installed version {installed} is newer, downgrade to {version}?");
            if policy.downgrade || prompt.is_some_and(|prompt| prompt.confirm(&question)) {
                target.install(artifact)?;
                reporter.info(&format!("{path}: downgraded from {installed} to {version}"));
                return Ok(Resolution::Installed);
            }
            reporter.info(&format!(
                "{path}: newer version {installed} present, not downgrading"
            ));
            Ok(Resolution::Unchanged)
        }
        CheckOutcome::ReadError
        | CheckOutcome::ALink
        | CheckOutcome::NotOurs
        | CheckOutcome::VersionUnknown
        | CheckOutcome::VersionSameModified => {
            overwrite_unsafe(target, artifact, &outcome, policy, reporter, prompt)
        }
    }
}

fn overwrite_unsafe(
    target: &InstallTarget,
    artifact: &VersionedArtifact,
    outcome: &CheckOutcome,
    policy: InstallPolicy,
    reporter: &mut dyn Reporter,
    prompt: Option<&mut dyn Prompt>,
) -> Result<Resolution> {
    let path = target.path();

    if policy.force {
        reporter.warning(&format!("{path}: {outcome}, overwriting (--force)"));
        target.install(artifact)?;
        return Ok(Resolution::Installed);
    }

    let Some(prompt) = prompt else {
        reporter.error(&format!(
            "{path}: {outcome}, refusing to overwrite without --force"
        ));
        return Ok(Resolution::Refused);
    };

    if prompt.confirm(&format!("{path}: {outcome}, overwrite?")) {
        target.install(artifact)?;
        reporter.info(&format!("{path}: overwritten with version {}", artifact.version()));
        Ok(Resolution::Installed)
    } else {
        reporter.info(&format!("{path}: left untouched"));
        Ok(Resolution::Unchanged)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use camino::Utf8PathBuf;
    use rstest::{fixture, rstest};
    use semver::Version;
    use tempfile::TempDir;
    use venv_bootstrap_common::{RecordingReporter, Severity};

    struct Fixture {
        _dir: TempDir,
        target: InstallTarget,
        artifact: VersionedArtifact,
        reporter: RecordingReporter,
    }

    impl Fixture {
        fn seed(&self, contents: &[u8]) {
            std::fs::write(self.target.path(), contents).expect("seed launcher");
        }

        fn installed(&self) -> Vec<u8> {
            std::fs::read(self.target.path()).unwrap_or_default()
        }

        fn apply(
            &mut self,
            policy: InstallPolicy,
            prompt: Option<&mut dyn Prompt>,
        ) -> Resolution {
            maybe_install(
                &self.target,
                &self.artifact,
                None,
                policy,
                &mut self.reporter,
                prompt,
            )
            .expect("policy applies")
        }
    }

    #[fixture]
    fn fx() -> Fixture {
        let dir = TempDir::new().expect("create temp dir");
        let target =
            InstallTarget::new(Utf8PathBuf::try_from(dir.path().to_path_buf()).expect("utf-8"));
        let artifact = VersionedArtifact::from_template(
            b"@@MARKER@@\nVERSION = \"@@VERSION@@\"\n",
            "1.0.0",
        )
        .expect("template renders");
        Fixture {
            _dir: dir,
            target,
            artifact,
            reporter: RecordingReporter::new(),
        }
    }

    fn stamped(version: &str) -> Vec<u8> {
        format!("{}\nVERSION = \"{version}\"\n", venv_bootstrap_common::MARKER).into_bytes()
    }

    #[rstest]
    fn absent_installs(mut fx: Fixture) {
        assert_eq!(fx.apply(InstallPolicy::default(), None), Resolution::Installed);
        assert_eq!(fx.installed(), fx.artifact.bytes());
        assert_eq!(fx.reporter.count(Severity::Info), 1);
    }

    #[rstest]
    fn same_is_a_no_op(mut fx: Fixture) {
        fx.seed(&fx.artifact.bytes().to_vec());
        assert_eq!(fx.apply(InstallPolicy::default(), None), Resolution::Unchanged);
        assert_eq!(fx.reporter.count(Severity::Error), 0);
    }

    #[rstest]
    fn missing_directory_is_refused(mut fx: Fixture) {
        fx.target = InstallTarget::new(fx.target.directory().join("missing"));
        assert_eq!(fx.apply(InstallPolicy::default(), None), Resolution::Refused);
        assert_eq!(fx.reporter.count(Severity::Error), 1);
    }

    #[rstest]
    fn directory_at_path_is_refused_even_with_force(mut fx: Fixture) {
        std::fs::create_dir(fx.target.path()).expect("create dir");
        let policy = InstallPolicy {
            force: true,
            ..InstallPolicy::default()
        };
        assert_eq!(fx.apply(policy, None), Resolution::Refused);
        assert_eq!(fx.reporter.count(Severity::Error), 1);
    }

    #[rstest]
    #[case::not_ours(b"#!/bin/sh\necho hi\n".to_vec())]
    #[case::unknown(venv_bootstrap_common::MARKER.as_bytes().to_vec())]
    #[case::modified({
        let mut contents = stamped("1.0.0");
        contents.extend_from_slice(b"edited\n");
        contents
    })]
    fn unsafe_overwrite_needs_force(mut fx: Fixture, #[case] contents: Vec<u8>) {
        fx.seed(&contents);
        assert_eq!(fx.apply(InstallPolicy::default(), None), Resolution::Refused);
        assert_eq!(fx.installed(), contents);
        let errors: Vec<_> = fx.reporter.messages(Severity::Error).collect();
        assert!(errors.iter().any(|msg| msg.contains("--force")));
    }

    #[rstest]
    fn force_overwrites_with_warning(mut fx: Fixture) {
        fx.seed(b"foreign");
        let policy = InstallPolicy {
            force: true,
            ..InstallPolicy::default()
        };
        assert_eq!(fx.apply(policy, None), Resolution::Installed);
        assert_eq!(fx.installed(), fx.artifact.bytes());
        assert_eq!(fx.reporter.count(Severity::Warning), 1);
    }

    #[rstest]
    #[case::confirmed(true, Resolution::Installed)]
    #[case::declined(false, Resolution::Unchanged)]
    fn prompt_decides_unsafe_overwrite(
        mut fx: Fixture,
        #[case] answer: bool,
        #[case] expected: Resolution,
    ) {
        fx.seed(b"foreign");
        let mut asked = Vec::new();
        let mut prompt = |question: &str| {
            asked.push(question.to_owned());
            answer
        };
        assert_eq!(
            fx.apply(InstallPolicy::default(), Some(&mut prompt)),
            expected
        );
        assert_eq!(asked.len(), 1);
        assert!(asked.iter().all(|q| q.contains("not-our")));
        assert_eq!(fx.reporter.count(Severity::Error), 0);
    }

    #[rstest]
    #[case::upgrade(false, Resolution::Installed)]
    #[case::no_upgrade(true, Resolution::Unchanged)]
    fn older_versions_upgrade_unless_disabled(
        mut fx: Fixture,
        #[case] no_upgrade: bool,
        #[case] expected: Resolution,
    ) {
        fx.seed(&stamped("0.1"));
        let policy = InstallPolicy {
            no_upgrade,
            ..InstallPolicy::default()
        };
        assert_eq!(fx.apply(policy, None), expected);
        assert_eq!(fx.reporter.count(Severity::Error), 0);
    }

    #[rstest]
    #[case::kept(false, None, Resolution::Unchanged)]
    #[case::flag(true, None, Resolution::Installed)]
    #[case::prompt_yes(false, Some(true), Resolution::Installed)]
    #[case::prompt_no(false, Some(false), Resolution::Unchanged)]
    fn newer_versions_need_consent(
        mut fx: Fixture,
        #[case] downgrade: bool,
        #[case] answer: Option<bool>,
        #[case] expected: Resolution,
    ) {
        fx.seed(&stamped("2.0.0"));
        let policy = InstallPolicy {
            downgrade,
            ..InstallPolicy::default()
        };
        let mut confirm = move |_: &str| answer.unwrap_or(false);
        let prompt: Option<&mut dyn Prompt> = if answer.is_some() {
            Some(&mut confirm)
        } else {
            None
        };
        assert_eq!(fx.apply(policy, prompt), expected);
    }

    #[rstest]
    fn supplied_outcome_skips_check(mut fx: Fixture) {
        let resolution = maybe_install(
            &fx.target,
            &fx.artifact,
            Some(CheckOutcome::VersionNewer {
                installed: Version::new(9, 0, 0),
            }),
            InstallPolicy::default(),
            &mut fx.reporter,
            None,
        )
        .expect("policy applies");
        assert_eq!(resolution, Resolution::Unchanged);
        assert!(fx.installed().is_empty());
    }
}
