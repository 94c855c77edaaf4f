//! 에러 타입: 케이스 단위 에러와 설정 에러 정의
//!
//! [`CaseError`]는 한 테스트 케이스 안에서만 의미를 가집니다.
//! 어떤 변형도 케이스 경계를 넘어 전파되지 않으며, 컨트롤러가
//! [`Outcome::Fail`](crate::types::Outcome::Fail)로 변환합니다.

use crate::types::Phase;

/// packmatrix 최상위 에러 타입
#[derive(Debug, thiserror::Error)]
pub enum PackmatrixError {
    /// 설정 관련 에러
    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    /// I/O 에러
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// 설정 관련 에러
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// 설정 파일을 찾을 수 없음
    #[error("config file not found: {path}")]
    FileNotFound { path: String },

    /// 설정 파싱 실패
    #[error("failed to parse config: {reason}")]
    ParseFailed { reason: String },

    /// 유효하지 않은 설정 값
    #[error("invalid config value for '{field}': {reason}")]
    InvalidValue { field: String, reason: String },
}

/// 케이스 단위 에러
///
/// 각 변형은 실패한 단계(resolve → parse → validate → select-backend →
/// build → verify)를 하나씩 가리킵니다.
#[derive(Debug, Clone, thiserror::Error)]
pub enum CaseError {
    /// 픽스처 파일을 찾지 못함
    #[error("fixture not found: {path}: {reason}")]
    FixtureResolution { path: String, reason: String },

    /// 설정 파싱 실패
    #[error("parse error: {0}")]
    Parse(String),

    /// 디스크립터 검증 실패
    #[error("validation error: {0}")]
    Validation(String),

    /// 등록되지 않은 패키지 포맷
    #[error("unknown format: {0}")]
    UnknownFormat(String),

    /// 패키지 생성/쓰기 실패
    #[error("build error: {0}")]
    Build(String),

    /// 컨테이너 검증 프로세스 실패 (비정상 종료, 실행 실패, 타임아웃)
    #[error("verification failed: {reason}")]
    VerificationProcess { reason: String, output: String },

    /// 케이스 태스크 패닉
    #[error("case panicked: {0}")]
    Panicked(String),

    /// 케이스 스케줄링 실패 (실행 슬롯을 얻지 못함)
    #[error("scheduler error: {0}")]
    Scheduler(String),
}

impl CaseError {
    /// 에러가 발생한 단계를 반환합니다.
    pub fn phase(&self) -> Phase {
        match self {
            Self::FixtureResolution { .. } => Phase::Resolve,
            Self::Parse(_) => Phase::Parse,
            Self::Validation(_) => Phase::Validate,
            Self::UnknownFormat(_) => Phase::SelectBackend,
            Self::Build(_) => Phase::Build,
            Self::VerificationProcess { .. } => Phase::Verify,
            Self::Panicked(_) | Self::Scheduler(_) => Phase::Execute,
        }
    }

    /// 진단용으로 캡처된 출력을 반환합니다. 없으면 빈 문자열입니다.
    pub fn captured_output(&self) -> &str {
        match self {
            Self::VerificationProcess { output, .. } => output,
            _ => "",
        }
    }
}
