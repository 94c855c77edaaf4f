//! 도메인 타입: 매트릭스를 구성하는 포맷, 아키텍처, 케이스, 결과
//!
//! [`TestCase`]는 매 실행마다 정적 열거로 새로 만들어지며,
//! 픽스처 파일명, 산출물 파일명, 컨테이너 타깃 스테이지가 모두
//! 케이스에서 결정적으로 파생됩니다.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::CaseError;

/// 패키지 포맷
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Format {
    Apk,
    Deb,
    Rpm,
}

impl Format {
    /// 매트릭스 열거 순서대로 정렬된 전체 포맷 목록
    pub const ALL: [Format; 3] = [Format::Apk, Format::Deb, Format::Rpm];

    /// 포맷 이름 (백엔드 레지스트리 키, 파일 확장자와 동일)
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Apk => "apk",
            Self::Deb => "deb",
            Self::Rpm => "rpm",
        }
    }

    /// 이 포맷이 지원하는 아키텍처 목록
    ///
    /// 모든 포맷이 모든 아키텍처를 지원하지는 않습니다 (`386`은 apk만).
    pub fn architectures(self) -> &'static [Arch] {
        match self {
            Self::Apk => &[Arch::Amd64, Arch::Arm64, Arch::I386, Arch::Ppc64le],
            Self::Deb | Self::Rpm => &[Arch::Amd64, Arch::Arm64, Arch::Ppc64le],
        }
    }

    /// 검증에 사용할 Dockerfile 이름
    pub fn dockerfile(self) -> String {
        format!("{}.dockerfile", self.as_str())
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Format {
    type Err = CaseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "apk" => Ok(Self::Apk),
            "deb" => Ok(Self::Deb),
            "rpm" => Ok(Self::Rpm),
            other => Err(CaseError::UnknownFormat(other.to_owned())),
        }
    }
}

/// 대상 아키텍처 (Go 스타일 이름)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Arch {
    #[serde(rename = "amd64")]
    Amd64,
    #[serde(rename = "arm64")]
    Arm64,
    #[serde(rename = "386")]
    I386,
    #[serde(rename = "ppc64le")]
    Ppc64le,
}

impl Arch {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Amd64 => "amd64",
            Self::Arm64 => "arm64",
            Self::I386 => "386",
            Self::Ppc64le => "ppc64le",
        }
    }

    /// 컨테이너 플랫폼 문자열 (`linux/<arch>`)
    pub fn platform(self) -> String {
        format!("linux/{}", self.as_str())
    }
}

impl fmt::Display for Arch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 보조 매트릭스에서 사용하는 rpm 압축 알고리즘
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Compression {
    Gzip,
    Xz,
    Lzma,
}

impl Compression {
    pub const ALL: [Compression; 3] = [Compression::Gzip, Compression::Xz, Compression::Lzma];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Gzip => "gzip",
            Self::Xz => "xz",
            Self::Lzma => "lzma",
        }
    }
}

impl fmt::Display for Compression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 압축 보조 매트릭스의 고정 스테이지/시나리오 이름
pub const COMPRESSION_STAGE: &str = "compression";

/// 케이스 식별자 (`<format>/<arch>/<scenario>`)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CaseId(String);

impl CaseId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CaseId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// 매트릭스의 한 칸
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestCase {
    /// 시나리오 이름 (압축 케이스는 `compression`)
    pub scenario: String,
    pub format: Format,
    pub arch: Arch,
    /// 압축 보조 매트릭스 케이스일 때만 설정됨
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub compression: Option<Compression>,
}

impl TestCase {
    /// 코어 매트릭스 케이스를 생성합니다.
    pub fn core(scenario: impl Into<String>, format: Format, arch: Arch) -> Self {
        Self {
            scenario: scenario.into(),
            format,
            arch,
            compression: None,
        }
    }

    /// rpm 압축 보조 매트릭스 케이스를 생성합니다.
    pub fn compression(algorithm: Compression, arch: Arch) -> Self {
        Self {
            scenario: COMPRESSION_STAGE.to_owned(),
            format: Format::Rpm,
            arch,
            compression: Some(algorithm),
        }
    }

    /// 안정적이고 사람이 읽을 수 있는 케이스 식별자
    pub fn id(&self) -> CaseId {
        match self.compression {
            None => CaseId(format!("{}/{}/{}", self.format, self.arch, self.scenario)),
            Some(alg) => CaseId(format!(
                "{}/{}/{COMPRESSION_STAGE}/{alg}",
                self.format, self.arch
            )),
        }
    }

    /// 픽스처 파일명 (`<family>.<scenario>.yaml`)
    pub fn fixture_name(&self) -> String {
        match self.compression {
            None => format!("core.{}.yaml", self.scenario),
            Some(alg) => format!("{}.{alg}.{COMPRESSION_STAGE}.yaml", self.format),
        }
    }

    /// 스크래치 디렉토리 안의 산출물 파일명
    ///
    /// 아키텍처가 항상 포함되므로 한 실행 안에서 케이스마다 고유합니다.
    pub fn artifact_name(&self) -> String {
        match self.compression {
            None => format!("{}_{}.{}", self.scenario, self.arch, self.format),
            Some(alg) => format!("{alg}_{COMPRESSION_STAGE}_{}.{}", self.arch, self.format),
        }
    }

    /// 컨테이너 빌드 타깃 스테이지
    pub fn target_stage(&self) -> &str {
        match self.compression {
            None => &self.scenario,
            Some(_) => COMPRESSION_STAGE,
        }
    }

    /// `package=` 외에 추가로 전달할 빌드 인자
    pub fn extra_build_args(&self) -> Vec<String> {
        self.compression
            .map(|alg| vec![format!("compression={alg}")])
            .unwrap_or_default()
    }
}

impl fmt::Display for TestCase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.id())
    }
}

/// 케이스 처리 단계
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Resolve,
    Parse,
    Validate,
    SelectBackend,
    Build,
    Verify,
    Execute,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Resolve => "resolve",
            Self::Parse => "parse",
            Self::Validate => "validate",
            Self::SelectBackend => "select-backend",
            Self::Build => "build",
            Self::Verify => "verify",
            Self::Execute => "execute",
        };
        f.write_str(name)
    }
}

/// 통과한 케이스의 세부 정보
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PassDetails {
    /// 생성된 패키지 경로
    pub artifact: PathBuf,
    /// 패키지 크기 (바이트)
    pub size_bytes: u64,
    /// 패키지 SHA-256 (hex)
    pub sha256: String,
    /// 검증 단계에서 캡처한 출력
    pub output: String,
    /// 케이스 소요 시간
    pub elapsed: Duration,
}

/// 실패한 케이스의 세부 정보
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FailDetails {
    pub phase: Phase,
    pub error: String,
    /// 진단용 캡처 출력 (빌드/검증 로그)
    pub output: String,
    pub elapsed: Duration,
}

/// 케이스 결과 (케이스당 정확히 하나)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum Outcome {
    Pass(PassDetails),
    Fail(FailDetails),
    Skip { reason: String },
}

impl Outcome {
    /// 에러를 실패 결과로 변환합니다. 원본 에러 메시지와 출력은 보존됩니다.
    pub fn failed(err: &CaseError, elapsed: Duration) -> Self {
        Self::Fail(FailDetails {
            phase: err.phase(),
            error: err.to_string(),
            output: err.captured_output().to_owned(),
            elapsed,
        })
    }

    /// 메트릭/리포트용 고정 레이블
    pub fn label(&self) -> &'static str {
        match self {
            Self::Pass(_) => "pass",
            Self::Fail(_) => "fail",
            Self::Skip { .. } => "skip",
        }
    }

    pub fn is_pass(&self) -> bool {
        matches!(self, Self::Pass(_))
    }

    pub fn is_fail(&self) -> bool {
        matches!(self, Self::Fail(_))
    }

    pub fn is_skip(&self) -> bool {
        matches!(self, Self::Skip { .. })
    }
}
