#![doc = include_str!("../README.md")]
//!
//! # 모듈 구조
//!
//! - [`matrix`]: 매트릭스 열거 (`TestMatrixGenerator`)
//! - [`skip`]: 실행 시점 스킵 정책 (`SkipPolicy`)
//! - [`build`]: 케이스 -> 패키지 빌드 (`BuildRequest`, `BuildRequestExecutor`)
//! - [`controller`]: 병렬 실행 (`ParallelExecutionController`, `ControllerBuilder`)
//! - [`report`]: 실행 결과 (`RunReport`, `CaseReport`)
//! - [`error`]: 구성 에러 (`HarnessError`)
//!
//! # 구조
//!
//! ```text
//! TestMatrixGenerator ──Vec<TestCase>──▶ ParallelExecutionController
//!                                            │  (케이스마다 태스크)
//!                                            ├─ SkipPolicy.evaluate()
//!                                            ├─ ArtifactBuilder.build()
//!                                            └─ Verifier.run()
//!                                            ▼
//!                                        RunReport
//! ```

pub mod build;
pub mod controller;
pub mod error;
pub mod matrix;
pub mod report;
pub mod skip;

// --- 주요 타입 re-export ---

pub use build::{ArtifactBuilder, BuildRequest, BuildRequestExecutor, BuiltArtifact};
pub use controller::{ControllerBuilder, ParallelExecutionController};
pub use error::HarnessError;
pub use matrix::{SCENARIOS, TestMatrixGenerator};
pub use report::{CaseReport, RunReport, Totals};
pub use skip::{PPC64LE_SKIP_REASON, SkipPolicy};
