//! Container invocation derived from each case.
//!
//! Validates that the verifier receives the platform, Dockerfile, target
//! stage and package path that match the case the package was built for.

use std::sync::Arc;

use packmatrix_core::types::{Arch, Compression, Format, TestCase};
use packmatrix_harness::{ParallelExecutionController, TestMatrixGenerator};

use crate::helpers::config::acceptance_matrix;
use crate::helpers::mocks::{RecordingBuilder, RecordingVerifier};

fn controller(
    verifier: Arc<RecordingVerifier>,
) -> ParallelExecutionController<RecordingBuilder, RecordingVerifier> {
    ParallelExecutionController::builder()
        .matrix(acceptance_matrix())
        .artifact_builder(Arc::new(RecordingBuilder::new()))
        .verifier(verifier)
        .build()
        .expect("controller should build")
}

/// min/deb/amd64 -> linux/amd64, deb.dockerfile, target `min`.
#[tokio::test]
async fn test_e2e_min_deb_amd64_invocation() {
    // Given
    let verifier = Arc::new(RecordingVerifier::new());
    let c = controller(Arc::clone(&verifier));

    // When
    let report = c
        .run(vec![TestCase::core("min", Format::Deb, Arch::Amd64)])
        .await;

    // Then
    assert!(report.cases[0].outcome.is_pass());
    let spec = verifier.spec_for("deb/amd64/min").expect("verifier not called");
    assert_eq!(
        spec.to_args(),
        vec![
            "build",
            "--rm",
            "--force-rm",
            "--platform",
            "linux/amd64",
            "-f",
            "deb.dockerfile",
            "--target",
            "min",
            "--build-arg",
            "package=tmp/min_amd64.deb",
            ".",
        ]
    );
}

/// Compression cases pass the algorithm and use the `compression` stage.
#[tokio::test]
async fn test_e2e_compression_invocation() {
    let verifier = Arc::new(RecordingVerifier::new());
    let c = controller(Arc::clone(&verifier));

    let report = c
        .run(vec![TestCase::compression(Compression::Xz, Arch::Arm64)])
        .await;

    assert!(report.cases[0].outcome.is_pass());
    let spec = verifier
        .spec_for("rpm/arm64/compression/xz")
        .expect("verifier not called");
    assert_eq!(spec.platform, "linux/arm64");
    assert_eq!(spec.dockerfile, "rpm.dockerfile");
    assert_eq!(spec.target, "compression");
    assert_eq!(spec.package_arg, "package=tmp/xz_compression_arm64.rpm");
    assert_eq!(spec.build_args, vec!["compression=xz".to_owned()]);
}

/// Every verified case runs on the platform of its own architecture.
#[tokio::test]
async fn test_e2e_platform_matches_case_arch_for_full_matrix() {
    let verifier = Arc::new(RecordingVerifier::new());
    let c = controller(Arc::clone(&verifier));
    let cases = TestMatrixGenerator::new().generate();
    let expected = cases.len();

    let report = c.run(cases).await;

    assert_eq!(report.totals.passed, expected);
    assert_eq!(verifier.calls(), expected);
    for case_report in &report.cases {
        let spec = verifier
            .spec_for(case_report.id.as_str())
            .expect("every case should be verified");
        assert_eq!(spec.platform, case_report.case.arch.platform());
        assert_eq!(spec.dockerfile, case_report.case.format.dockerfile());
        assert!(
            spec.package_arg
                .ends_with(&case_report.case.artifact_name()),
            "{}",
            spec.package_arg
        );
    }
}

/// The builder sees the case-local template variables.
#[tokio::test]
async fn test_e2e_build_request_carries_case_env() {
    let builder = Arc::new(RecordingBuilder::new());
    let c = ParallelExecutionController::builder()
        .matrix(acceptance_matrix())
        .artifact_builder(Arc::clone(&builder))
        .verifier(Arc::new(RecordingVerifier::new()))
        .build()
        .expect("controller should build");

    c.run(vec![
        TestCase::core("simple", Format::Apk, Arch::I386),
        TestCase::core("simple", Format::Rpm, Arch::Ppc64le),
    ])
    .await;

    let mut archs: Vec<String> = builder
        .requests()
        .iter()
        .map(|r| r.env.var("BUILD_ARCH").unwrap_or_default().to_owned())
        .collect();
    archs.sort();
    assert_eq!(archs, vec!["386".to_owned(), "ppc64le".to_owned()]);
    for request in builder.requests() {
        assert_eq!(request.env.var("SEMVER"), Some("v1.0.0-0.1.b1+git.abcdefgh"));
    }
}
