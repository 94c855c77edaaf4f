//! 실행 시점 스킵 정책

use packmatrix_core::config::MatrixConfig;
use packmatrix_core::types::{Arch, TestCase};

/// ppc64le 스킵 사유
pub const PPC64LE_SKIP_REASON: &str = "ppc64le arch not supported in pipeline";

/// (포맷, 아키텍처) 조합을 실행 시점에 제외할지 결정합니다.
///
/// 토글은 설정 로드 시 한 번 읽히며 실행 중에는 바뀌지 않습니다.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SkipPolicy {
    skip_ppc64le: bool,
}

impl SkipPolicy {
    pub fn new(skip_ppc64le: bool) -> Self {
        Self { skip_ppc64le }
    }

    pub fn from_config(matrix: &MatrixConfig) -> Self {
        Self::new(matrix.skip_ppc64le)
    }

    /// 스킵해야 하면 사유를 반환합니다.
    pub fn evaluate(&self, case: &TestCase) -> Option<&'static str> {
        (self.skip_ppc64le && case.arch == Arch::Ppc64le).then_some(PPC64LE_SKIP_REASON)
    }
}
