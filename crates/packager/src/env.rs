//! 케이스 로컬 빌드 환경 -- 템플릿 변수와 기준 디렉토리
//!
//! [`BuildEnv`]는 디스크립터의 `$VAR` / `${VAR}` 템플릿을 해석할 때 사용하는
//! 변수 집합입니다. 프로세스 환경변수를 읽거나 쓰지 않으므로 여러 케이스가
//! 동시에 서로 다른 버전/아키텍처로 파싱할 수 있습니다.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::{Captures, Regex};

/// 버전 문자열 템플릿 변수
pub const VAR_SEMVER: &str = "SEMVER";
/// 아키텍처 템플릿 변수
pub const VAR_BUILD_ARCH: &str = "BUILD_ARCH";

static VAR_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\$(?:\{([A-Za-z_][A-Za-z0-9_]*)\}|([A-Za-z_][A-Za-z0-9_]*))")
        .unwrap_or_else(|e| unreachable!("static template pattern is valid: {e}"))
});

/// 케이스 하나의 파싱/빌드 환경
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuildEnv {
    vars: BTreeMap<String, String>,
    base_dir: PathBuf,
}

impl BuildEnv {
    /// 상대 경로 해석 기준 디렉토리로 빈 환경을 생성합니다.
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            vars: BTreeMap::new(),
            base_dir: base_dir.into(),
        }
    }

    /// 템플릿 변수를 추가합니다.
    pub fn with_var(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.vars.insert(name.into(), value.into());
        self
    }

    pub fn var(&self, name: &str) -> Option<&str> {
        self.vars.get(name).map(String::as_str)
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// 기준 디렉토리에 대해 경로를 해석합니다. 절대 경로는 그대로 둡니다.
    pub fn resolve(&self, path: &str) -> PathBuf {
        let path = Path::new(path);
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.base_dir.join(path)
        }
    }

    /// `$VAR` / `${VAR}`를 치환합니다.
    ///
    /// 정의되지 않은 변수는 빈 문자열로 치환되고, 변수 이름이 따라오지 않는
    /// `$`는 그대로 남습니다.
    pub fn expand(&self, input: &str) -> String {
        if !input.contains('$') {
            return input.to_owned();
        }
        VAR_PATTERN
            .replace_all(input, |caps: &Captures<'_>| {
                let name = caps
                    .get(1)
                    .or_else(|| caps.get(2))
                    .map_or("", |m| m.as_str());
                self.var(name).unwrap_or_default().to_owned()
            })
            .into_owned()
    }
}
