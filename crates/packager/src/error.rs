//! 패키저 에러 타입
//!
//! [`PackagerError`]는 디스크립터 파싱, 검증, 백엔드 선택, 패키지 생성
//! 과정의 에러를 표현합니다. `From<PackagerError> for CaseError` 변환이
//! 구현되어 있어 하네스에서 `?`로 케이스 에러로 전파할 수 있습니다.

use packmatrix_core::error::CaseError;

/// 패키저 도메인 에러
#[derive(Debug, thiserror::Error)]
pub enum PackagerError {
    /// 디스크립터 파일 읽기/파싱 실패
    #[error("parse error: {path}: {reason}")]
    Parse {
        /// 디스크립터 경로
        path: String,
        /// 실패 사유
        reason: String,
    },

    /// 지원하지 않는 포맷
    #[error("unknown format: {0}")]
    UnknownFormat(String),

    /// 디스크립터 검증 실패
    #[error("{0}")]
    Validation(String),

    /// 패키지 생성 실패
    #[error("{0}")]
    Build(String),

    /// 백엔드 레지스트리 에러
    #[error("registry error: {0}")]
    Registry(String),

    /// I/O 에러 (패키지 쓰기)
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<PackagerError> for CaseError {
    fn from(err: PackagerError) -> Self {
        match err {
            PackagerError::Parse { .. } => CaseError::Parse(err.to_string()),
            PackagerError::UnknownFormat(format) => CaseError::UnknownFormat(format),
            PackagerError::Validation(reason) => CaseError::Validation(reason),
            PackagerError::Build(reason) => CaseError::Build(reason),
            PackagerError::Registry(_) | PackagerError::Io(_) => {
                CaseError::Build(err.to_string())
            }
        }
    }
}
