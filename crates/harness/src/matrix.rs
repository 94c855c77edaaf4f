//! 테스트 매트릭스 생성
//!
//! 코어 매트릭스는 시나리오 x 포맷 x (포맷별) 아키텍처의 곱이고, 보조
//! 매트릭스는 rpm 아키텍처 x 압축 알고리즘입니다. 열거 순서는 항상 같습니다:
//! 시나리오 순, 포맷 순(apk, deb, rpm), 아키텍처 선언 순, 마지막에 압축 케이스.

use packmatrix_core::types::{Compression, Format, TestCase};

/// 코어 매트릭스 시나리오 (픽스처 `core.<scenario>.yaml`, 타깃 스테이지 이름)
pub const SCENARIOS: [&str; 10] = [
    "min",
    "simple",
    "no-glob",
    "complex",
    "env-var-version",
    "overrides",
    "meta",
    "withchangelog",
    "symlink",
    "signed",
];

/// 매트릭스 생성기
#[derive(Debug, Clone, Default)]
pub struct TestMatrixGenerator {
    filter: Option<String>,
}

impl TestMatrixGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    /// 케이스 ID에 `pattern`이 포함된 케이스만 남깁니다. 빈 문자열은 무시됩니다.
    pub fn with_filter(mut self, pattern: impl Into<String>) -> Self {
        let pattern = pattern.into();
        self.filter = (!pattern.is_empty()).then_some(pattern);
        self
    }

    /// 코어 매트릭스 전체
    pub fn core_cases() -> Vec<TestCase> {
        SCENARIOS
            .iter()
            .flat_map(|scenario| {
                Format::ALL.into_iter().flat_map(move |format| {
                    format
                        .architectures()
                        .iter()
                        .map(move |arch| TestCase::core(*scenario, format, *arch))
                })
            })
            .collect()
    }

    /// rpm 압축 보조 매트릭스 전체
    pub fn compression_cases() -> Vec<TestCase> {
        Format::Rpm
            .architectures()
            .iter()
            .flat_map(|arch| {
                Compression::ALL
                    .into_iter()
                    .map(move |alg| TestCase::compression(alg, *arch))
            })
            .collect()
    }

    /// 필터를 적용한 전체 매트릭스
    pub fn generate(&self) -> Vec<TestCase> {
        let mut cases = Self::core_cases();
        cases.extend(Self::compression_cases());
        if let Some(pattern) = &self.filter {
            cases.retain(|case| case.id().as_str().contains(pattern.as_str()));
        }
        cases
    }
}
