//! Per-case fault isolation.
//!
//! Validates that build errors, verifier failures and panics are recorded
//! as `Fail` for the affected case only.

use std::sync::Arc;
use std::time::Duration;

use packmatrix_core::error::CaseError;
use packmatrix_core::types::{Arch, Format, Outcome, Phase, TestCase};
use packmatrix_harness::{ParallelExecutionController, TestMatrixGenerator};

use crate::helpers::config::acceptance_matrix;
use crate::helpers::mocks::{RecordingBuilder, RecordingVerifier};

fn cases() -> Vec<TestCase> {
    vec![
        TestCase::core("min", Format::Deb, Arch::Amd64),
        TestCase::core("min", Format::Deb, Arch::Arm64),
        TestCase::core("min", Format::Rpm, Arch::Amd64),
    ]
}

fn fail_details(outcome: &Outcome) -> (Phase, &str, &str) {
    match outcome {
        Outcome::Fail(details) => (details.phase, details.error.as_str(), details.output.as_str()),
        other => panic!("expected fail, got {other:?}"),
    }
}

/// A panicking build -> that case fails in the execute phase, the rest pass.
#[tokio::test]
async fn test_e2e_panic_becomes_fail() {
    let builder = Arc::new(RecordingBuilder::new().panicking("deb/arm64/min"));
    let verifier = Arc::new(RecordingVerifier::new());
    let c = ParallelExecutionController::builder()
        .matrix(acceptance_matrix())
        .artifact_builder(Arc::clone(&builder))
        .verifier(Arc::clone(&verifier))
        .build()
        .expect("controller should build");

    let report = c.run(cases()).await;

    assert_eq!(report.cases.len(), 3);
    assert!(report.cases[0].outcome.is_pass());
    let (phase, error, _) = fail_details(&report.cases[1].outcome);
    assert_eq!(phase, Phase::Execute);
    assert!(error.contains("injected panic for deb/arm64/min"), "{error}");
    assert!(report.cases[2].outcome.is_pass());
    assert_eq!(builder.calls(), 3);
    assert_eq!(verifier.calls(), 2);
}

/// A build error keeps its phase and skips verification for that case.
#[tokio::test]
async fn test_e2e_build_error_is_isolated() {
    let builder = Arc::new(
        RecordingBuilder::new().failing("rpm/amd64/min", CaseError::UnknownFormat("rpm".into())),
    );
    let verifier = Arc::new(RecordingVerifier::new());
    let c = ParallelExecutionController::builder()
        .matrix(acceptance_matrix())
        .artifact_builder(builder)
        .verifier(Arc::clone(&verifier))
        .build()
        .expect("controller should build");

    let report = c.run(cases()).await;

    let (phase, error, _) = fail_details(&report.cases[2].outcome);
    assert_eq!(phase, Phase::SelectBackend);
    assert!(error.contains("unknown format"));
    assert!(verifier.spec_for("rpm/amd64/min").is_none());
    assert_eq!(report.totals.passed, 2);
}

/// Nonzero verifier exit -> fail with the captured container output.
#[tokio::test]
async fn test_e2e_verifier_failure_keeps_output() {
    let verifier = Arc::new(RecordingVerifier::new().exiting("deb/amd64/min", 1));
    let c = ParallelExecutionController::builder()
        .matrix(acceptance_matrix())
        .artifact_builder(Arc::new(RecordingBuilder::new()))
        .verifier(verifier)
        .build()
        .expect("controller should build");

    let report = c.run(cases()).await;

    let (phase, error, output) = fail_details(&report.cases[0].outcome);
    assert_eq!(phase, Phase::Verify);
    assert!(error.contains("status 1"), "{error}");
    assert!(output.contains("exit 1"), "{output}");
    assert!(report.cases[1].outcome.is_pass());
    assert!(!report.is_success());
}

/// Concurrency never exceeds `max_parallel`.
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_e2e_parallelism_is_bounded() {
    let verifier = Arc::new(RecordingVerifier::new().with_delay(Duration::from_millis(20)));
    let c = ParallelExecutionController::builder()
        .matrix(acceptance_matrix())
        .artifact_builder(Arc::new(RecordingBuilder::new()))
        .verifier(Arc::clone(&verifier))
        .max_parallel(2)
        .build()
        .expect("controller should build");
    let cases = TestMatrixGenerator::new().with_filter("/min").generate();
    assert!(cases.len() > 2);

    let report = c.run(cases).await;

    assert!(report.is_success());
    assert!(verifier.max_in_flight() <= 2, "{}", verifier.max_in_flight());
    assert!(verifier.max_in_flight() >= 1);
}
