//! 하네스 에러 타입
//!
//! 케이스 단위 실패는 [`CaseError`](packmatrix_core::error::CaseError)로 결과에
//! 기록되며, [`HarnessError`]는 컨트롤러를 구성할 수 없는 경우만 표현합니다.

use packmatrix_core::error::{ConfigError, PackmatrixError};

/// 하네스 도메인 에러
#[derive(Debug, thiserror::Error)]
pub enum HarnessError {
    /// 잘못된 컨트롤러 구성
    #[error("config error: {field}: {reason}")]
    Config {
        /// 설정 필드명
        field: String,
        /// 에러 사유
        reason: String,
    },
}

impl From<HarnessError> for PackmatrixError {
    fn from(err: HarnessError) -> Self {
        match err {
            HarnessError::Config { field, reason } => {
                PackmatrixError::Config(ConfigError::InvalidValue { field, reason })
            }
        }
    }
}
