//! Container build invocation derived from a test case.

use std::fmt;
use std::path::Path;

use packmatrix_core::types::{CaseId, TestCase};
use serde::{Deserialize, Serialize};

/// Everything needed to run one containerized verification.
///
/// Built only through [`ContainerVerificationSpec::for_case`], so the
/// container platform always matches the architecture the package was
/// built for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContainerVerificationSpec {
    /// Case this invocation belongs to, used to tag streamed output.
    pub case_id: CaseId,
    /// `<format>.dockerfile`
    pub dockerfile: String,
    /// Dockerfile stage: the scenario name, or `compression`.
    pub target: String,
    /// `linux/<arch>`
    pub platform: String,
    /// `package=<scratch>/<artifact>`, relative to the build context.
    pub package_arg: String,
    /// Additional `key=value` build arguments.
    pub build_args: Vec<String>,
}

impl ContainerVerificationSpec {
    /// Derives the invocation for `case`. `scratch_dir` is relative to the
    /// build context (the fixture root).
    pub fn for_case(case: &TestCase, scratch_dir: &Path) -> Self {
        let scratch = scratch_dir.to_string_lossy();
        let scratch = scratch.trim_end_matches('/');
        Self {
            case_id: case.id(),
            dockerfile: case.format.dockerfile(),
            target: case.target_stage().to_owned(),
            platform: case.arch.platform(),
            package_arg: format!("package={scratch}/{}", case.artifact_name()),
            build_args: case.extra_build_args(),
        }
    }

    /// Argument vector for the container CLI, context `.` last.
    pub fn to_args(&self) -> Vec<String> {
        let mut args: Vec<String> = [
            "build",
            "--rm",
            "--force-rm",
            "--platform",
            self.platform.as_str(),
            "-f",
            self.dockerfile.as_str(),
            "--target",
            self.target.as_str(),
            "--build-arg",
            self.package_arg.as_str(),
        ]
        .into_iter()
        .map(str::to_owned)
        .collect();

        for arg in &self.build_args {
            args.push("--build-arg".to_owned());
            args.push(arg.clone());
        }
        args.push(".".to_owned());
        args
    }
}

impl fmt::Display for ContainerVerificationSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_args().join(" "))
    }
}
