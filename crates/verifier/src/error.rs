//! 검증기 에러 타입
//!
//! 0이 아닌 종료 코드는 에러가 아니라 [`VerificationOutput`](crate::VerificationOutput)의
//! 결과입니다. [`VerifierError`]는 프로세스를 실행하거나 끝까지 기다리지
//! 못한 경우만 표현합니다.

use packmatrix_core::error::CaseError;

/// 검증기 도메인 에러
#[derive(Debug, thiserror::Error)]
pub enum VerifierError {
    /// 프로세스 실행 실패 (바이너리 없음, 권한 등)
    #[error("failed to launch '{binary}': {reason}")]
    Launch {
        /// 실행하려던 바이너리
        binary: String,
        /// 실패 사유
        reason: String,
    },

    /// 실행 중 I/O 에러
    #[error("container build io error: {reason}")]
    Io {
        reason: String,
        /// 에러 직전까지 캡처된 출력
        output: String,
    },

    /// 타임아웃으로 프로세스를 종료함
    #[error("container build timed out after {timeout_secs}s")]
    Timeout {
        timeout_secs: u64,
        /// 종료 직전까지 캡처된 출력
        output: String,
    },
}

impl VerifierError {
    /// 캡처된 출력 (없으면 빈 문자열)
    pub fn output(&self) -> &str {
        match self {
            Self::Launch { .. } => "",
            Self::Io { output, .. } | Self::Timeout { output, .. } => output,
        }
    }
}

impl From<VerifierError> for CaseError {
    fn from(err: VerifierError) -> Self {
        CaseError::VerificationProcess {
            reason: err.to_string(),
            output: err.output().to_owned(),
        }
    }
}
