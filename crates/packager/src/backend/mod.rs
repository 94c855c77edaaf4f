//! 포맷별 패키지 백엔드
//!
//! [`BackendRegistry`]는 포맷 이름을 [`PackageBackend`] 구현에 매핑합니다.
//! 시작 시 한 번 [`BackendRegistry::with_builtin`]으로 채운 뒤에는 읽기 전용으로
//! 여러 케이스에서 공유됩니다.
//!
//! # 사용 예시
//! ```ignore
//! let registry = BackendRegistry::with_builtin();
//! let backend = registry.get("deb")?;
//! backend.validate(&descriptor)?;
//! backend.package(&backend.with_defaults(descriptor), &mut writer)?;
//! ```

pub(crate) mod archive;
pub mod apk;
pub mod deb;
pub mod rpm;

pub use apk::ApkBackend;
pub use deb::DebBackend;
pub use rpm::RpmBackend;

use std::io::Write;

use crate::descriptor::Descriptor;
use crate::error::PackagerError;

/// 패키지 포맷 백엔드
///
/// 구현체는 `Send + Sync`여야 하며, 여러 블로킹 작업에서 동시에 호출됩니다.
pub trait PackageBackend: Send + Sync {
    /// 포맷 이름 (레지스트리 키)
    fn name(&self) -> &'static str;

    /// 이 포맷으로 패키지를 만들 수 있는 디스크립터인지 검증합니다.
    fn validate(&self, info: &Descriptor) -> Result<(), PackagerError>;

    /// 공통 기본값과 포맷별 기본값을 적용합니다.
    fn with_defaults(&self, info: Descriptor) -> Descriptor;

    /// 패키지를 `writer`에 씁니다.
    fn package(&self, info: &Descriptor, writer: &mut dyn Write) -> Result<(), PackagerError>;
}

/// 포맷 이름 -> 백엔드 매핑
pub struct BackendRegistry {
    backends: Vec<Box<dyn PackageBackend>>,
}

impl BackendRegistry {
    /// 빈 레지스트리를 생성합니다.
    pub fn new() -> Self {
        Self {
            backends: Vec::new(),
        }
    }

    /// 내장 백엔드(apk, deb, rpm)로 레지스트리를 생성합니다.
    pub fn with_builtin() -> Self {
        Self {
            backends: vec![
                Box::new(ApkBackend),
                Box::new(DebBackend),
                Box::new(RpmBackend),
            ],
        }
    }

    /// 백엔드를 등록합니다.
    ///
    /// # Errors
    /// - 같은 이름의 백엔드가 이미 등록된 경우
    pub fn register(&mut self, backend: Box<dyn PackageBackend>) -> Result<(), PackagerError> {
        if self.backends.iter().any(|b| b.name() == backend.name()) {
            return Err(PackagerError::Registry(format!(
                "backend '{}' already registered",
                backend.name()
            )));
        }
        self.backends.push(backend);
        Ok(())
    }

    /// 포맷 이름으로 백엔드를 조회합니다.
    ///
    /// # Errors
    /// - 등록되지 않은 포맷이면 `UnknownFormat`
    pub fn get(&self, format: &str) -> Result<&dyn PackageBackend, PackagerError> {
        self.backends
            .iter()
            .find(|b| b.name() == format)
            .map(|b| b.as_ref())
            .ok_or_else(|| PackagerError::UnknownFormat(format.to_owned()))
    }

    /// 등록된 포맷 이름 목록
    pub fn formats(&self) -> Vec<&'static str> {
        self.backends.iter().map(|b| b.name()).collect()
    }
}

impl Default for BackendRegistry {
    fn default() -> Self {
        Self::with_builtin()
    }
}

/// Go 스타일 아키텍처 이름을 포맷 고유 이름으로 바꿉니다.
/// 표에 없는 이름은 그대로 사용합니다.
pub(crate) fn translate_arch(arch: &str, table: &[(&str, &str)]) -> String {
    table
        .iter()
        .find(|(go, _)| *go == arch)
        .map_or_else(|| arch.to_owned(), |(_, native)| (*native).to_owned())
}

/// 포맷 공통 아키텍처 검증 -- 공백이나 경로 구분자를 허용하지 않습니다.
pub(crate) fn check_arch(format: &str, arch: &str) -> Result<(), PackagerError> {
    if arch.is_empty() || arch.chars().any(|c| c.is_whitespace() || c == '/') {
        return Err(PackagerError::Validation(format!(
            "{format}: invalid architecture '{arch}'"
        )));
    }
    Ok(())
}
