//! Report shape and build-only mode.

use std::sync::Arc;
use std::time::Duration;

use packmatrix_core::config::MatrixConfig;
use packmatrix_core::types::{Arch, Format, Outcome, TestCase};
use packmatrix_harness::{ParallelExecutionController, TestMatrixGenerator};
use packmatrix_verifier::DockerCliVerifier;

use crate::helpers::config::acceptance_matrix;
use crate::helpers::mocks::{RecordingBuilder, RecordingVerifier};

/// Report order matches enumeration order regardless of completion order.
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_e2e_report_preserves_enumeration_order() {
    let c = ParallelExecutionController::builder()
        .matrix(MatrixConfig {
            skip_ppc64le: true,
            ..acceptance_matrix()
        })
        .artifact_builder(Arc::new(RecordingBuilder::new()))
        .verifier(Arc::new(
            RecordingVerifier::new().with_delay(Duration::from_millis(5)),
        ))
        .max_parallel(8)
        .build()
        .expect("controller should build");
    let cases = TestMatrixGenerator::new().with_filter("deb/").generate();
    let expected: Vec<String> = cases.iter().map(|c| c.id().to_string()).collect();

    let report = c.run(cases).await;

    let actual: Vec<String> = report.cases.iter().map(|r| r.id.to_string()).collect();
    assert_eq!(actual, expected);
    assert_eq!(report.totals.total(), expected.len());
    assert!(report.totals.skipped > 0);
}

/// Exactly one outcome per case, skipped cases included.
#[tokio::test]
async fn test_e2e_one_outcome_per_case() {
    let c = ParallelExecutionController::builder()
        .matrix(acceptance_matrix())
        .artifact_builder(Arc::new(RecordingBuilder::new()))
        .verifier(Arc::new(RecordingVerifier::new()))
        .build()
        .expect("controller should build");
    let cases = TestMatrixGenerator::new().generate();
    let total = cases.len();

    let report = c.run(cases).await;

    assert_eq!(report.cases.len(), total);
    assert_eq!(report.totals.total(), total);
}

/// No verifier -> cases pass after packaging with empty output.
#[tokio::test]
async fn test_e2e_build_only_mode() {
    let builder = Arc::new(RecordingBuilder::new());
    let c: ParallelExecutionController<RecordingBuilder, DockerCliVerifier> =
        ParallelExecutionController::builder()
            .matrix(acceptance_matrix())
            .artifact_builder(Arc::clone(&builder))
            .build()
            .expect("controller should build");
    assert!(c.is_build_only());

    let report = c
        .run(vec![
            TestCase::core("symlink", Format::Rpm, Arch::Arm64),
            TestCase::core("signed", Format::Apk, Arch::Amd64),
        ])
        .await;

    assert_eq!(builder.calls(), 2);
    for case_report in &report.cases {
        match &case_report.outcome {
            Outcome::Pass(details) => assert!(details.output.is_empty()),
            other => panic!("expected pass, got {other:?}"),
        }
    }
}

/// Empty case list -> empty, successful report.
#[tokio::test]
async fn test_e2e_empty_run() {
    let c = ParallelExecutionController::builder()
        .matrix(acceptance_matrix())
        .artifact_builder(Arc::new(RecordingBuilder::new()))
        .verifier(Arc::new(RecordingVerifier::new()))
        .build()
        .expect("controller should build");

    let report = c.run(Vec::new()).await;

    assert!(report.cases.is_empty());
    assert!(report.is_success());
}
