//! 병렬 실행 컨트롤러
//!
//! [`ParallelExecutionController`]는 케이스마다 독립된 tokio 태스크를 띄우고
//! 세마포어로 동시 실행 수를 제한합니다.
//!
//! # 케이스 흐름
//! ```text
//! SkipPolicy ──skip──▶ Outcome::Skip          (태스크 생성 없음)
//!     │
//!     ▼
//! spawn_blocking(ArtifactBuilder::build) ──err/panic──▶ Outcome::Fail
//!     │
//!     ▼
//! Verifier::run ──nonzero/err──▶ Outcome::Fail (캡처 출력 포함)
//!     │
//!     ▼
//! Outcome::Pass
//! ```
//!
//! 한 케이스의 에러나 패닉은 그 케이스의 `Fail`로만 기록되며 다른 케이스에
//! 영향을 주지 않습니다. 리포트는 입력 순서를 유지합니다.

use std::sync::Arc;
use std::time::{Duration, Instant};

use packmatrix_core::config::MatrixConfig;
use packmatrix_core::error::CaseError;
use packmatrix_core::metrics as m;
use packmatrix_core::types::{Outcome, PassDetails, TestCase};
use packmatrix_verifier::{ContainerVerificationSpec, Verifier};
use tokio::sync::Semaphore;
use tokio::task::{JoinError, JoinHandle};
use uuid::Uuid;

use crate::build::{ArtifactBuilder, BuildRequest};
use crate::error::HarnessError;
use crate::report::{CaseReport, RunReport};
use crate::skip::SkipPolicy;

/// 케이스 태스크가 공유하는 상태
struct CaseContext<B, V> {
    matrix: Arc<MatrixConfig>,
    builder: Arc<B>,
    verifier: Option<Arc<V>>,
    semaphore: Arc<Semaphore>,
}

impl<B, V> Clone for CaseContext<B, V> {
    fn clone(&self) -> Self {
        Self {
            matrix: Arc::clone(&self.matrix),
            builder: Arc::clone(&self.builder),
            verifier: self.verifier.clone(),
            semaphore: Arc::clone(&self.semaphore),
        }
    }
}

/// 매트릭스 병렬 실행기
pub struct ParallelExecutionController<B: ArtifactBuilder, V: Verifier> {
    skip: SkipPolicy,
    max_parallel: usize,
    ctx: CaseContext<B, V>,
}

impl<B: ArtifactBuilder, V: Verifier> ParallelExecutionController<B, V> {
    pub fn builder() -> ControllerBuilder<B, V> {
        ControllerBuilder::new()
    }

    pub fn max_parallel(&self) -> usize {
        self.max_parallel
    }

    /// 검증 단계 없이 빌드만 수행하는지 여부
    pub fn is_build_only(&self) -> bool {
        self.ctx.verifier.is_none()
    }

    /// 모든 케이스를 실행하고 케이스마다 정확히 하나의 결과를 담은 리포트를 반환합니다.
    pub async fn run(&self, cases: Vec<TestCase>) -> RunReport {
        let run_id = Uuid::new_v4();
        let started = Instant::now();
        tracing::info!(
            %run_id,
            cases = cases.len(),
            max_parallel = self.max_parallel,
            build_only = self.is_build_only(),
            "matrix run starting"
        );

        let mut pending: Vec<(TestCase, Pending)> = Vec::with_capacity(cases.len());
        for case in cases {
            if let Some(reason) = self.skip.evaluate(&case) {
                tracing::info!(case = %case.id(), reason, "case skipped");
                pending.push((
                    case,
                    Pending::Done(Outcome::Skip {
                        reason: reason.to_owned(),
                    }),
                ));
                continue;
            }

            let ctx = self.ctx.clone();
            let task_case = case.clone();
            let handle = tokio::spawn(async move { execute_case(ctx, task_case).await });
            pending.push((case, Pending::Running(handle)));
        }

        let mut reports = Vec::with_capacity(pending.len());
        for (case, pending) in pending {
            let outcome = match pending {
                Pending::Done(outcome) => outcome,
                Pending::Running(handle) => match handle.await {
                    Ok(outcome) => outcome,
                    Err(e) => Outcome::failed(&CaseError::Panicked(panic_message(e)), Duration::ZERO),
                },
            };
            record(&case, &outcome);
            reports.push(CaseReport {
                id: case.id(),
                case,
                outcome,
            });
        }

        let report = RunReport::new(run_id, started.elapsed(), reports);
        tracing::info!(
            %run_id,
            passed = report.totals.passed,
            failed = report.totals.failed,
            skipped = report.totals.skipped,
            elapsed_ms = report.elapsed.as_millis() as u64,
            "matrix run finished"
        );
        report
    }
}

enum Pending {
    Done(Outcome),
    Running(JoinHandle<Outcome>),
}

/// 케이스 하나를 실행합니다. 모든 실패는 `Outcome::Fail`로 변환됩니다.
async fn execute_case<B: ArtifactBuilder, V: Verifier>(
    ctx: CaseContext<B, V>,
    case: TestCase,
) -> Outcome {
    let id = case.id();
    let _permit = match Arc::clone(&ctx.semaphore).acquire_owned().await {
        Ok(permit) => permit,
        Err(_) => {
            return Outcome::failed(
                &CaseError::Scheduler("case scheduler closed".to_owned()),
                Duration::ZERO,
            );
        }
    };

    let started = Instant::now();
    let fail = |err: CaseError| {
        tracing::warn!(case = %id, phase = %err.phase(), error = %err, "case failed");
        Outcome::failed(&err, started.elapsed())
    };

    let request = BuildRequest::for_case(&case, &ctx.matrix);
    let builder = Arc::clone(&ctx.builder);
    let artifact = match tokio::task::spawn_blocking(move || builder.build(&request)).await {
        Ok(Ok(artifact)) => artifact,
        Ok(Err(err)) => return fail(err),
        Err(e) => return fail(CaseError::Panicked(panic_message(e))),
    };

    let output = match &ctx.verifier {
        None => String::new(),
        Some(verifier) => {
            let spec = ContainerVerificationSpec::for_case(&case, &ctx.matrix.scratch_dir);
            match verifier.run(&spec).await {
                Ok(result) if result.success => result.output,
                Ok(result) => {
                    let status = result
                        .status
                        .map_or_else(|| "a signal".to_owned(), |code| format!("status {code}"));
                    return fail(CaseError::VerificationProcess {
                        reason: format!("container build exited with {status}"),
                        output: result.output,
                    });
                }
                Err(err) => return fail(err.into()),
            }
        }
    };

    tracing::info!(case = %id, artifact = %artifact.path.display(), "case passed");
    Outcome::Pass(PassDetails {
        artifact: artifact.path,
        size_bytes: artifact.size_bytes,
        sha256: artifact.sha256,
        output,
        elapsed: started.elapsed(),
    })
}

fn panic_message(err: JoinError) -> String {
    if err.is_cancelled() {
        return "case task was cancelled".to_owned();
    }
    match err.try_into_panic() {
        Ok(payload) => payload
            .downcast_ref::<&str>()
            .map(|s| (*s).to_owned())
            .or_else(|| payload.downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "case task panicked".to_owned()),
        Err(_) => "case task failed".to_owned(),
    }
}

fn record(case: &TestCase, outcome: &Outcome) {
    let format = case.format.as_str();
    metrics::counter!(m::CASES_TOTAL, m::LABEL_OUTCOME => outcome.label(), m::LABEL_FORMAT => format)
        .increment(1);
    match outcome {
        Outcome::Pass(details) => {
            metrics::histogram!(m::CASE_DURATION_SECONDS).record(details.elapsed.as_secs_f64());
            metrics::counter!(m::ARTIFACT_BYTES_TOTAL, m::LABEL_FORMAT => format)
                .increment(details.size_bytes);
        }
        Outcome::Fail(details) => {
            metrics::histogram!(m::CASE_DURATION_SECONDS).record(details.elapsed.as_secs_f64());
        }
        Outcome::Skip { .. } => {}
    }
}

/// [`ParallelExecutionController`] 빌더
pub struct ControllerBuilder<B: ArtifactBuilder, V: Verifier> {
    matrix: MatrixConfig,
    builder: Option<Arc<B>>,
    verifier: Option<Arc<V>>,
    max_parallel: Option<usize>,
    skip: Option<SkipPolicy>,
}

impl<B: ArtifactBuilder, V: Verifier> ControllerBuilder<B, V> {
    pub fn new() -> Self {
        Self {
            matrix: MatrixConfig::default(),
            builder: None,
            verifier: None,
            max_parallel: None,
            skip: None,
        }
    }

    /// 매트릭스 설정을 지정합니다. 스킵 정책과 동시 실행 수의 기본값도 여기서 옵니다.
    pub fn matrix(mut self, matrix: MatrixConfig) -> Self {
        self.matrix = matrix;
        self
    }

    pub fn artifact_builder(mut self, builder: Arc<B>) -> Self {
        self.builder = Some(builder);
        self
    }

    /// 검증기를 설정합니다. 설정하지 않으면 빌드만 수행합니다.
    pub fn verifier(mut self, verifier: Arc<V>) -> Self {
        self.verifier = Some(verifier);
        self
    }

    pub fn max_parallel(mut self, max_parallel: usize) -> Self {
        self.max_parallel = Some(max_parallel);
        self
    }

    pub fn skip_policy(mut self, skip: SkipPolicy) -> Self {
        self.skip = Some(skip);
        self
    }

    pub fn build(self) -> Result<ParallelExecutionController<B, V>, HarnessError> {
        let builder = self.builder.ok_or_else(|| HarnessError::Config {
            field: "artifact_builder".to_owned(),
            reason: "artifact builder must be provided".to_owned(),
        })?;

        let max_parallel = self.max_parallel.unwrap_or(self.matrix.max_parallel);
        if max_parallel == 0 {
            return Err(HarnessError::Config {
                field: "max_parallel".to_owned(),
                reason: "must be greater than 0".to_owned(),
            });
        }

        if self.verifier.is_some() {
            self.matrix
                .validate_scratch_dir()
                .map_err(|e| HarnessError::Config {
                    field: "matrix.scratch_dir".to_owned(),
                    reason: e.to_string(),
                })?;
        }

        let skip = self
            .skip
            .unwrap_or_else(|| SkipPolicy::from_config(&self.matrix));

        Ok(ParallelExecutionController {
            skip,
            max_parallel,
            ctx: CaseContext {
                matrix: Arc::new(self.matrix),
                builder,
                verifier: self.verifier,
                semaphore: Arc::new(Semaphore::new(max_parallel)),
            },
        })
    }
}

impl<B: ArtifactBuilder, V: Verifier> Default for ControllerBuilder<B, V> {
    fn default() -> Self {
        Self::new()
    }
}
