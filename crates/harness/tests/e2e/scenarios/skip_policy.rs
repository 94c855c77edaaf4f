//! ppc64le skip toggle.
//!
//! Validates that skipped cases are reported as `Skip` with the fixed
//! reason and never reach the builder or the verifier.

use std::sync::Arc;

use packmatrix_core::config::MatrixConfig;
use packmatrix_core::types::{Arch, Format, Outcome, TestCase};
use packmatrix_harness::{PPC64LE_SKIP_REASON, ParallelExecutionController, TestMatrixGenerator};

use crate::helpers::config::acceptance_matrix;
use crate::helpers::mocks::{RecordingBuilder, RecordingVerifier};

fn matrix(skip_ppc64le: bool) -> MatrixConfig {
    MatrixConfig {
        skip_ppc64le,
        ..acceptance_matrix()
    }
}

/// Toggle on -> ppc64le cases are skipped with no build or verify calls.
#[tokio::test]
async fn test_e2e_ppc64le_skipped_without_side_effects() {
    // Given
    let builder = Arc::new(RecordingBuilder::new());
    let verifier = Arc::new(RecordingVerifier::new());
    let c = ParallelExecutionController::builder()
        .matrix(matrix(true))
        .artifact_builder(Arc::clone(&builder))
        .verifier(Arc::clone(&verifier))
        .build()
        .expect("controller should build");

    // When
    let report = c
        .run(vec![TestCase::core("min", Format::Rpm, Arch::Ppc64le)])
        .await;

    // Then
    match &report.cases[0].outcome {
        Outcome::Skip { reason } => assert_eq!(reason, PPC64LE_SKIP_REASON),
        other => panic!("expected skip, got {other:?}"),
    }
    assert_eq!(builder.calls(), 0);
    assert_eq!(verifier.calls(), 0);
    assert!(report.is_success());
}

/// Toggle on over the full matrix -> only ppc64le cases are skipped.
#[tokio::test]
async fn test_e2e_full_matrix_skips_only_ppc64le() {
    let builder = Arc::new(RecordingBuilder::new());
    let verifier = Arc::new(RecordingVerifier::new());
    let c = ParallelExecutionController::builder()
        .matrix(matrix(true))
        .artifact_builder(Arc::clone(&builder))
        .verifier(Arc::clone(&verifier))
        .build()
        .expect("controller should build");
    let cases = TestMatrixGenerator::new().generate();
    let ppc = cases.iter().filter(|c| c.arch == Arch::Ppc64le).count();
    let total = cases.len();

    let report = c.run(cases).await;

    assert_eq!(report.totals.skipped, ppc);
    assert_eq!(report.totals.passed, total - ppc);
    assert_eq!(builder.calls(), total - ppc);
    assert!(
        builder.built_ids().iter().all(|id| !id.contains("ppc64le")),
        "ppc64le case reached the builder"
    );
    assert!(
        verifier
            .specs()
            .iter()
            .all(|s| s.platform != "linux/ppc64le"),
        "ppc64le case reached the verifier"
    );
}

/// Toggle off -> ppc64le cases run like any other.
#[tokio::test]
async fn test_e2e_ppc64le_runs_when_toggle_off() {
    let verifier = Arc::new(RecordingVerifier::new());
    let c = ParallelExecutionController::builder()
        .matrix(matrix(false))
        .artifact_builder(Arc::new(RecordingBuilder::new()))
        .verifier(Arc::clone(&verifier))
        .build()
        .expect("controller should build");

    let report = c
        .run(vec![TestCase::core("min", Format::Deb, Arch::Ppc64le)])
        .await;

    assert!(report.cases[0].outcome.is_pass());
    assert_eq!(
        verifier.spec_for("deb/ppc64le/min").map(|s| s.platform),
        Some("linux/ppc64le".to_owned())
    );
}
