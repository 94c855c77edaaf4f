//! Matrix configuration helpers.

use std::path::{Path, PathBuf};

use packmatrix_core::config::MatrixConfig;

/// Root of the checked-in acceptance fixtures.
pub fn fixture_root() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../testdata/acceptance")
}

/// Matrix over the acceptance fixtures with the default relative scratch dir.
///
/// Only use with mock builders; nothing is written to disk.
#[allow(dead_code)]
pub fn acceptance_matrix() -> MatrixConfig {
    MatrixConfig {
        fixture_root: fixture_root(),
        ..MatrixConfig::default()
    }
}

/// Matrix over the acceptance fixtures that writes artifacts into `scratch`.
///
/// `scratch` is absolute, so `scratch_path()` resolves to it directly. Build-only:
/// a controller with a verifier rejects scratch dirs outside the fixture root.
#[allow(dead_code)]
pub fn acceptance_matrix_with_scratch(scratch: &Path) -> MatrixConfig {
    MatrixConfig {
        fixture_root: fixture_root(),
        scratch_dir: scratch.to_path_buf(),
        ..MatrixConfig::default()
    }
}

/// Matrix rooted at a temporary fixture directory.
#[allow(dead_code)]
pub fn temp_matrix(root: &Path) -> MatrixConfig {
    MatrixConfig {
        fixture_root: root.to_path_buf(),
        ..MatrixConfig::default()
    }
}

/// Writes `core.<scenario>.yaml` into `root`.
#[allow(dead_code)]
pub fn write_core_fixture(root: &Path, scenario: &str, yaml: &str) {
    std::fs::write(root.join(format!("core.{scenario}.yaml")), yaml)
        .expect("failed to write fixture");
}

/// A fixture that every format accepts.
#[allow(dead_code)]
pub const VALID_FIXTURE: &str = "name: foo\narch: ${BUILD_ARCH}\nversion: ${SEMVER}\n";

/// A fixture that fails validation: no package name.
#[allow(dead_code)]
pub const NAMELESS_FIXTURE: &str = "name: \"\"\narch: ${BUILD_ARCH}\nversion: ${SEMVER}\n";
