//! Real packaging through `BuildRequestExecutor`.
//!
//! Validates artifact placement, reproducibility across runs, and that
//! a bad fixture fails only its own case.

use std::sync::Arc;

use packmatrix_core::types::{Arch, Compression, Format, Outcome, Phase, TestCase};
use packmatrix_harness::{
    BuildRequestExecutor, ParallelExecutionController, SCENARIOS, TestMatrixGenerator,
};
use packmatrix_verifier::DockerCliVerifier;

use crate::helpers::config::{
    NAMELESS_FIXTURE, VALID_FIXTURE, acceptance_matrix_with_scratch, temp_matrix,
    write_core_fixture,
};
use crate::helpers::mocks::RecordingVerifier;

type BuildOnly = ParallelExecutionController<BuildRequestExecutor, DockerCliVerifier>;

fn build_only(matrix: packmatrix_core::config::MatrixConfig) -> BuildOnly {
    ParallelExecutionController::builder()
        .matrix(matrix)
        .artifact_builder(Arc::new(BuildRequestExecutor::with_builtin()))
        .build()
        .expect("controller should build")
}

/// Every case of the full matrix packages successfully.
#[tokio::test]
async fn test_e2e_full_matrix_builds() {
    let scratch = tempfile::tempdir().unwrap();
    let c = build_only(acceptance_matrix_with_scratch(scratch.path()));
    let cases = TestMatrixGenerator::new().generate();
    let total = cases.len();

    let report = c.run(cases).await;

    let failures: Vec<_> = report.failures().map(|r| r.id.to_string()).collect();
    assert!(failures.is_empty(), "failed cases: {failures:?}");
    assert_eq!(report.totals.passed, total);
    assert_eq!(total, SCENARIOS.len() * 10 + 9);
}

/// Pass implies an existing, non-empty artifact at the expected path.
#[tokio::test]
async fn test_e2e_pass_implies_non_empty_artifact() {
    let scratch = tempfile::tempdir().unwrap();
    let c = build_only(acceptance_matrix_with_scratch(scratch.path()));

    let report = c
        .run(vec![
            TestCase::core("complex", Format::Rpm, Arch::Amd64),
            TestCase::core("meta", Format::Apk, Arch::I386),
            TestCase::compression(Compression::Lzma, Arch::Ppc64le),
        ])
        .await;

    for case_report in &report.cases {
        match &case_report.outcome {
            Outcome::Pass(details) => {
                assert_eq!(
                    details.artifact,
                    scratch.path().join(case_report.case.artifact_name())
                );
                let meta = std::fs::metadata(&details.artifact).unwrap();
                assert!(meta.len() > 0);
                assert_eq!(meta.len(), details.size_bytes);
                assert_eq!(details.sha256.len(), 64);
            }
            other => panic!("{}: expected pass, got {other:?}", case_report.id),
        }
    }
}

/// Same case into a cleared scratch dir -> byte-identical artifact.
#[tokio::test]
async fn test_e2e_rebuild_is_byte_identical() {
    let scratch = tempfile::tempdir().unwrap();
    let dir = scratch.path().join("tmp");
    let case = TestCase::core("min", Format::Deb, Arch::Amd64);

    let mut runs = Vec::new();
    for _ in 0..2 {
        let _ = std::fs::remove_dir_all(&dir);
        let c = build_only(acceptance_matrix_with_scratch(&dir));
        let report = c.run(vec![case.clone()]).await;
        let Outcome::Pass(details) = &report.cases[0].outcome else {
            panic!("expected pass, got {:?}", report.cases[0].outcome);
        };
        runs.push((
            std::fs::read(&details.artifact).unwrap(),
            details.sha256.clone(),
        ));
    }

    assert_eq!(runs[0].0, runs[1].0);
    assert_eq!(runs[0].1, runs[1].1);
}

/// Validation error in one fixture -> only that case fails.
#[tokio::test]
async fn test_e2e_validation_error_is_isolated() {
    // Given: a valid and a nameless fixture side by side
    let root = tempfile::tempdir().unwrap();
    write_core_fixture(root.path(), "good", VALID_FIXTURE);
    write_core_fixture(root.path(), "nameless", NAMELESS_FIXTURE);
    let verifier = Arc::new(RecordingVerifier::new());
    let c = ParallelExecutionController::builder()
        .matrix(temp_matrix(root.path()))
        .artifact_builder(Arc::new(BuildRequestExecutor::with_builtin()))
        .verifier(Arc::clone(&verifier))
        .build()
        .expect("controller should build");

    // When
    let report = c
        .run(vec![
            TestCase::core("good", Format::Deb, Arch::Amd64),
            TestCase::core("nameless", Format::Deb, Arch::Amd64),
            TestCase::core("good", Format::Rpm, Arch::Arm64),
        ])
        .await;

    // Then
    assert!(report.cases[0].outcome.is_pass());
    match &report.cases[1].outcome {
        Outcome::Fail(details) => {
            assert_eq!(details.phase, Phase::Validate);
            assert!(details.error.contains("package name must be provided"));
        }
        other => panic!("expected fail, got {other:?}"),
    }
    assert!(report.cases[2].outcome.is_pass());
    assert_eq!(verifier.calls(), 2);
    assert!(verifier.spec_for("deb/amd64/nameless").is_none());
    assert!(!root.path().join("tmp/nameless_amd64.deb").exists());
}

/// Missing fixture -> resolution failure for that case.
#[tokio::test]
async fn test_e2e_missing_fixture_fails_resolution() {
    let root = tempfile::tempdir().unwrap();
    let c = build_only(temp_matrix(root.path()));

    let report = c
        .run(vec![TestCase::core("absent", Format::Apk, Arch::Amd64)])
        .await;

    match &report.cases[0].outcome {
        Outcome::Fail(details) => {
            assert_eq!(details.phase, Phase::Resolve);
            assert!(details.error.contains("core.absent.yaml"));
        }
        other => panic!("expected fail, got {other:?}"),
    }
}

/// Artifacts outside the build context cannot be verified, so the
/// controller refuses that layout up front.
#[tokio::test]
async fn test_e2e_verifier_rejects_scratch_outside_fixture_root() {
    let scratch = tempfile::tempdir().unwrap();

    let result = ParallelExecutionController::builder()
        .matrix(acceptance_matrix_with_scratch(scratch.path()))
        .artifact_builder(Arc::new(BuildRequestExecutor::with_builtin()))
        .verifier(Arc::new(RecordingVerifier::new()))
        .build();

    let err = result.err().expect("absolute scratch dir should be rejected");
    assert!(err.to_string().contains("matrix.scratch_dir"), "{err}");
}
