//! 설정 관리: packmatrix.toml 파싱 및 런타임 설정
//!
//! [`PackmatrixConfig`]는 하네스 전체 설정을 담는 최상위 구조체입니다.
//!
//! # 설정 로딩 우선순위
//! 1. CLI 인자 (최고 우선)
//! 2. 환경변수 (`PACKMATRIX_MATRIX_MAX_PARALLEL=8` 형식, 레거시 `NO_TEST_PPC64LE`, `SEMVER`)
//! 3. 설정 파일 (`packmatrix.toml`)
//! 4. 기본값 (`Default` 구현)
//!
//! 환경변수는 로딩 시점에 한 번만 읽습니다. 케이스 실행 중에는
//! 프로세스 환경을 읽거나 쓰지 않습니다.
//!
//! # 사용 예시
//! ```no_run
//! # async fn example() -> Result<(), packmatrix_core::error::PackmatrixError> {
//! use packmatrix_core::config::PackmatrixConfig;
//!
//! let config = PackmatrixConfig::load("packmatrix.toml").await?;
//! let config = PackmatrixConfig::parse("[matrix]\nmax_parallel = 2")?;
//! # Ok(())
//! # }
//! ```

use std::path::{Component, Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{ConfigError, PackmatrixError};

/// ppc64le 스킵 토글 환경변수 (CI 파이프라인 호환)
pub const ENV_NO_TEST_PPC64LE: &str = "NO_TEST_PPC64LE";

/// 버전 문자열 환경변수 (CI 파이프라인 호환)
pub const ENV_SEMVER: &str = "SEMVER";

const MAX_PARALLEL: usize = 256;
const MAX_TIMEOUT_SECS: u64 = 86_400;

/// packmatrix 통합 설정
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PackmatrixConfig {
    /// 일반 설정
    #[serde(default)]
    pub general: GeneralConfig,
    /// 매트릭스 실행 설정
    #[serde(default)]
    pub matrix: MatrixConfig,
    /// 컨테이너 검증 설정
    #[serde(default)]
    pub verifier: VerifierConfig,
}

impl PackmatrixConfig {
    /// TOML 파일에서 설정을 로드하고 환경변수 오버라이드를 적용합니다.
    pub async fn load(path: impl AsRef<Path>) -> Result<Self, PackmatrixError> {
        let mut config = Self::from_file(path).await?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// 설정 파일 없이 기본값과 환경변수만으로 설정을 만듭니다.
    pub fn from_env() -> Result<Self, PackmatrixError> {
        let mut config = Self::default();
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// TOML 파일에서 설정을 로드합니다 (환경변수 오버라이드 없음).
    pub async fn from_file(path: impl AsRef<Path>) -> Result<Self, PackmatrixError> {
        let path = path.as_ref();
        let content = tokio::fs::read_to_string(path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                PackmatrixError::Config(ConfigError::FileNotFound {
                    path: path.display().to_string(),
                })
            } else {
                PackmatrixError::Io(e)
            }
        })?;
        let config = Self::parse(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// TOML 문자열에서 설정을 파싱합니다.
    pub fn parse(toml_str: &str) -> Result<Self, PackmatrixError> {
        toml::from_str(toml_str).map_err(|e| {
            PackmatrixError::Config(ConfigError::ParseFailed {
                reason: e.to_string(),
            })
        })
    }

    /// 환경변수로 설정값을 오버라이드합니다.
    ///
    /// 환경변수 네이밍 규칙: `PACKMATRIX_{SECTION}_{FIELD}`
    pub fn apply_env_overrides(&mut self) {
        // General
        override_string(&mut self.general.log_level, "PACKMATRIX_GENERAL_LOG_LEVEL");
        override_string(&mut self.general.log_format, "PACKMATRIX_GENERAL_LOG_FORMAT");

        // Matrix
        override_path(
            &mut self.matrix.fixture_root,
            "PACKMATRIX_MATRIX_FIXTURE_ROOT",
        );
        override_path(&mut self.matrix.scratch_dir, "PACKMATRIX_MATRIX_SCRATCH_DIR");
        override_string(&mut self.matrix.semver, ENV_SEMVER);
        override_string(&mut self.matrix.semver, "PACKMATRIX_MATRIX_SEMVER");
        override_legacy_toggle(&mut self.matrix.skip_ppc64le, ENV_NO_TEST_PPC64LE);
        override_bool(
            &mut self.matrix.skip_ppc64le,
            "PACKMATRIX_MATRIX_SKIP_PPC64LE",
        );
        override_usize(
            &mut self.matrix.max_parallel,
            "PACKMATRIX_MATRIX_MAX_PARALLEL",
        );

        // Verifier
        override_bool(&mut self.verifier.enabled, "PACKMATRIX_VERIFIER_ENABLED");
        override_string(&mut self.verifier.binary, "PACKMATRIX_VERIFIER_BINARY");
        override_u64(
            &mut self.verifier.timeout_secs,
            "PACKMATRIX_VERIFIER_TIMEOUT_SECS",
        );
    }

    /// 설정값의 유효성을 검증합니다.
    pub fn validate(&self) -> Result<(), PackmatrixError> {
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.general.log_level.as_str()) {
            return Err(ConfigError::InvalidValue {
                field: "general.log_level".to_owned(),
                reason: format!("must be one of: {}", valid_levels.join(", ")),
            }
            .into());
        }

        let valid_formats = ["json", "pretty"];
        if !valid_formats.contains(&self.general.log_format.as_str()) {
            return Err(ConfigError::InvalidValue {
                field: "general.log_format".to_owned(),
                reason: format!("must be one of: {}", valid_formats.join(", ")),
            }
            .into());
        }

        self.matrix.validate()?;
        self.verifier.validate()?;
        Ok(())
    }
}

/// 일반 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// 로그 레벨 (trace, debug, info, warn, error)
    pub log_level: String,
    /// 로그 형식 (json, pretty)
    pub log_format: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_owned(),
            log_format: "pretty".to_owned(),
        }
    }
}

/// 매트릭스 실행 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MatrixConfig {
    /// 픽스처 루트 (컨테이너 빌드 컨텍스트이기도 함)
    pub fixture_root: PathBuf,
    /// 픽스처 루트 기준 스크래치 디렉토리
    pub scratch_dir: PathBuf,
    /// 템플릿의 `SEMVER` 값
    pub semver: String,
    /// ppc64le 케이스 스킵 여부
    pub skip_ppc64le: bool,
    /// 동시에 실행할 최대 케이스 수
    pub max_parallel: usize,
}

impl Default for MatrixConfig {
    fn default() -> Self {
        Self {
            fixture_root: PathBuf::from("testdata/acceptance"),
            scratch_dir: PathBuf::from("tmp"),
            semver: "v1.0.0-0.1.b1+git.abcdefgh".to_owned(),
            skip_ppc64le: false,
            max_parallel: 4,
        }
    }
}

impl MatrixConfig {
    /// 스크래치 디렉토리의 실제 경로 (`fixture_root/scratch_dir`)
    pub fn scratch_path(&self) -> PathBuf {
        self.fixture_root.join(&self.scratch_dir)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.max_parallel == 0 || self.max_parallel > MAX_PARALLEL {
            return Err(ConfigError::InvalidValue {
                field: "matrix.max_parallel".to_owned(),
                reason: format!("must be 1-{MAX_PARALLEL}"),
            });
        }

        if self.semver.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "matrix.semver".to_owned(),
                reason: "must not be empty".to_owned(),
            });
        }

        self.validate_scratch_dir()
    }

    /// `scratch_dir`가 `fixture_root` 안의 상대 경로인지 확인합니다.
    ///
    /// 산출물 경로는 빌드 컨텍스트 기준 상대 경로로 컨테이너에 전달됩니다.
    pub fn validate_scratch_dir(&self) -> Result<(), ConfigError> {
        let escapes = self
            .scratch_dir
            .components()
            .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir));
        if self.scratch_dir.as_os_str().is_empty() || escapes {
            return Err(ConfigError::InvalidValue {
                field: "matrix.scratch_dir".to_owned(),
                reason: "must be a relative path inside fixture_root".to_owned(),
            });
        }

        Ok(())
    }
}

/// 컨테이너 검증 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VerifierConfig {
    /// 비활성화하면 패키지 생성까지만 수행합니다
    pub enabled: bool,
    /// 컨테이너 빌드 바이너리 (docker, podman)
    pub binary: String,
    /// 컨테이너 빌드 타임아웃 (초)
    pub timeout_secs: u64,
}

impl Default for VerifierConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            binary: "docker".to_owned(),
            timeout_secs: 1800,
        }
    }
}

impl VerifierConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        if self.timeout_secs == 0 || self.timeout_secs > MAX_TIMEOUT_SECS {
            return Err(ConfigError::InvalidValue {
                field: "verifier.timeout_secs".to_owned(),
                reason: format!("must be 1-{MAX_TIMEOUT_SECS}"),
            });
        }

        if self.enabled && self.binary.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "verifier.binary".to_owned(),
                reason: "binary must not be empty when enabled".to_owned(),
            });
        }

        Ok(())
    }
}

// --- 환경변수 오버라이드 헬퍼 ---

fn override_string(target: &mut String, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        *target = val;
    }
}

fn override_path(target: &mut PathBuf, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        *target = PathBuf::from(val);
    }
}

fn override_bool(target: &mut bool, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        match val.parse::<bool>() {
            Ok(parsed) => *target = parsed,
            Err(_) => warn!(
                env_key,
                value = val.as_str(),
                "failed to parse bool from env var, ignoring"
            ),
        }
    }
}

/// CI 토글은 정확히 `"true"`일 때만 켜집니다.
fn override_legacy_toggle(target: &mut bool, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        if val == "true" {
            *target = true;
        }
    }
}

fn override_usize(target: &mut usize, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        match val.parse::<usize>() {
            Ok(parsed) => *target = parsed,
            Err(_) => warn!(
                env_key,
                value = val.as_str(),
                "failed to parse usize from env var, ignoring"
            ),
        }
    }
}

fn override_u64(target: &mut u64, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        match val.parse::<u64>() {
            Ok(parsed) => *target = parsed,
            Err(_) => warn!(
                env_key,
                value = val.as_str(),
                "failed to parse u64 from env var, ignoring"
            ),
        }
    }
}
