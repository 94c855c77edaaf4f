//! 패키지 디스크립터 -- 픽스처 YAML 스키마와 포맷별 선택
//!
//! 픽스처 파일 하나는 기본 디스크립터와 포맷별 `overrides`를 담습니다.
//! [`parse_file`]은 템플릿 필드를 [`BuildEnv`]로 치환하고 상대 경로를
//! 기준 디렉토리로 해석한 [`DescriptorSet`]을 반환합니다.
//!
//! # 사용 예시
//! ```ignore
//! let env = BuildEnv::new("testdata/acceptance").with_var("SEMVER", "v1.0.0");
//! let set = parse_file("testdata/acceptance/core.min.yaml", &env)?;
//! let deb = set.get("deb")?;
//! ```

use std::collections::BTreeMap;
use std::path::Path;

use serde::Deserialize;

use crate::env::BuildEnv;
use crate::error::PackagerError;

/// 디스크립터 파일 최대 크기
const MAX_DESCRIPTOR_FILE_SIZE: u64 = 1024 * 1024; // 1MB

/// 디스크립터가 선택될 수 있는 포맷 이름
pub const KNOWN_FORMATS: [&str; 3] = ["apk", "deb", "rpm"];

/// 버전 문자열 해석 방식
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VersionSchema {
    /// `v1.2.3-pre+meta`를 버전/프리릴리스/메타데이터로 분리
    #[default]
    Semver,
    /// 버전 문자열을 그대로 사용
    None,
}

/// 패키지 콘텐츠 종류
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub enum ContentType {
    #[default]
    #[serde(rename = "file", alias = "")]
    File,
    #[serde(rename = "config")]
    Config,
    #[serde(rename = "config|noreplace")]
    ConfigNoReplace,
    #[serde(rename = "symlink")]
    Symlink,
    #[serde(rename = "dir")]
    Dir,
    /// 패키지가 소유하지만 내용은 담지 않는 파일 (rpm 전용)
    #[serde(rename = "ghost")]
    Ghost,
}

impl ContentType {
    /// 소스 파일을 읽어야 하는 종류인지 여부
    pub fn reads_source(self) -> bool {
        matches!(self, Self::File | Self::Config | Self::ConfigNoReplace)
    }

    pub fn is_config(self) -> bool {
        matches!(self, Self::Config | Self::ConfigNoReplace)
    }
}

/// 콘텐츠 파일 속성
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct FileInfo {
    /// 8진수 문자열 (예: `"0755"`)
    pub mode: Option<String>,
}

impl FileInfo {
    /// 8진수 모드를 파싱합니다. 설정되지 않았으면 `None`.
    pub fn parse_mode(&self) -> Result<Option<u32>, PackagerError> {
        match &self.mode {
            None => Ok(None),
            Some(raw) => {
                let digits = raw.trim().trim_start_matches("0o");
                u32::from_str_radix(digits, 8)
                    .ok()
                    .filter(|mode| *mode <= 0o7777)
                    .map(Some)
                    .ok_or_else(|| {
                        PackagerError::Validation(format!("invalid file mode '{raw}'"))
                    })
            }
        }
    }
}

/// 패키지에 담길 항목 하나
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Content {
    /// 소스 경로 (symlink는 링크 대상)
    pub src: String,
    /// 설치 경로 (절대 경로)
    pub dst: String,
    #[serde(rename = "type")]
    pub kind: ContentType,
    pub file_info: FileInfo,
    /// 비어있지 않으면 해당 포맷에서만 포함
    pub packager: String,
}

/// 설치/제거 스크립트 경로
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Scripts {
    pub preinstall: String,
    pub postinstall: String,
    pub preremove: String,
    pub postremove: String,
}

impl Scripts {
    /// (이름, 경로) 목록. 비어있는 항목은 제외됩니다.
    pub fn entries(&self) -> Vec<(&'static str, &str)> {
        [
            ("preinstall", self.preinstall.as_str()),
            ("postinstall", self.postinstall.as_str()),
            ("preremove", self.preremove.as_str()),
            ("postremove", self.postremove.as_str()),
        ]
        .into_iter()
        .filter(|(_, path)| !path.is_empty())
        .collect()
    }

    fn merge(&mut self, other: Scripts) {
        replace_if_set(&mut self.preinstall, other.preinstall);
        replace_if_set(&mut self.postinstall, other.postinstall);
        replace_if_set(&mut self.preremove, other.preremove);
        replace_if_set(&mut self.postremove, other.postremove);
    }
}

/// 포맷별로 덮어쓸 수 있는 필드
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Overridables {
    pub depends: Vec<String>,
    pub recommends: Vec<String>,
    pub suggests: Vec<String>,
    pub conflicts: Vec<String>,
    pub replaces: Vec<String>,
    pub provides: Vec<String>,
    pub contents: Vec<Content>,
    pub scripts: Scripts,
}

/// 패키지 서명 설정
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Signature {
    pub key_file: String,
}

impl Signature {
    pub fn is_configured(&self) -> bool {
        !self.key_file.is_empty()
    }
}

/// deb 전용 설정
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct DebSettings {
    pub breaks: Vec<String>,
    pub signature: Signature,
}

/// rpm 전용 설정
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct RpmSettings {
    pub summary: String,
    pub group: String,
    pub compression: String,
    pub signature: Signature,
}

/// apk 전용 설정
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ApkSettings {
    pub signature: Signature,
}

/// 한 포맷에 대해 완전히 해석된 패키지 디스크립터
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Descriptor {
    pub name: String,
    pub arch: String,
    pub platform: String,
    pub version: String,
    pub version_schema: VersionSchema,
    pub release: String,
    pub prerelease: String,
    pub epoch: String,
    pub version_metadata: String,
    pub section: String,
    pub priority: String,
    pub maintainer: String,
    pub description: String,
    pub vendor: String,
    pub homepage: String,
    pub license: String,
    /// 변경 이력 파일 경로
    pub changelog: String,
    /// 메타 패키지 (콘텐츠 없음)
    pub meta: bool,

    pub depends: Vec<String>,
    pub recommends: Vec<String>,
    pub suggests: Vec<String>,
    pub conflicts: Vec<String>,
    pub replaces: Vec<String>,
    pub provides: Vec<String>,
    pub contents: Vec<Content>,
    pub scripts: Scripts,

    pub deb: DebSettings,
    pub rpm: RpmSettings,
    pub apk: ApkSettings,

    /// 포맷 이름별 덮어쓰기. [`DescriptorSet::get`] 이후에는 비어 있습니다.
    pub overrides: BTreeMap<String, Overridables>,
}

impl Descriptor {
    /// 포맷별 덮어쓰기를 병합합니다. 비어있지 않은 값만 기본값을 대체합니다.
    fn merge(&mut self, over: Overridables) {
        replace_if_set(&mut self.depends, over.depends);
        replace_if_set(&mut self.recommends, over.recommends);
        replace_if_set(&mut self.suggests, over.suggests);
        replace_if_set(&mut self.conflicts, over.conflicts);
        replace_if_set(&mut self.replaces, over.replaces);
        replace_if_set(&mut self.provides, over.provides);
        replace_if_set(&mut self.contents, over.contents);
        self.scripts.merge(over.scripts);
    }

    fn expand_templates(&mut self, env: &BuildEnv) {
        for field in [
            &mut self.name,
            &mut self.arch,
            &mut self.platform,
            &mut self.version,
            &mut self.release,
            &mut self.prerelease,
            &mut self.epoch,
            &mut self.version_metadata,
        ] {
            *field = env.expand(field);
        }
    }

    fn resolve_paths(&mut self, env: &BuildEnv) {
        let resolve = |path: &mut String| {
            if !path.is_empty() {
                *path = env.resolve(path).display().to_string();
            }
        };

        resolve(&mut self.changelog);
        resolve(&mut self.deb.signature.key_file);
        resolve(&mut self.rpm.signature.key_file);
        resolve(&mut self.apk.signature.key_file);

        let contents = self
            .contents
            .iter_mut()
            .chain(self.overrides.values_mut().flat_map(|o| o.contents.iter_mut()));
        for content in contents {
            if content.kind.reads_source() {
                resolve(&mut content.src);
            }
        }

        let scripts = std::iter::once(&mut self.scripts)
            .chain(self.overrides.values_mut().map(|o| &mut o.scripts));
        for scripts in scripts {
            resolve(&mut scripts.preinstall);
            resolve(&mut scripts.postinstall);
            resolve(&mut scripts.preremove);
            resolve(&mut scripts.postremove);
        }
    }
}

fn replace_if_set<T: Default + PartialEq>(target: &mut T, value: T) {
    if value != T::default() {
        *target = value;
    }
}

/// 파싱된 픽스처 -- 기본 디스크립터 + 포맷별 덮어쓰기
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DescriptorSet {
    base: Descriptor,
}

impl DescriptorSet {
    /// 주어진 포맷에 대한 디스크립터를 만듭니다.
    ///
    /// 해당 포맷의 덮어쓰기를 병합하고, 다른 포맷 전용 콘텐츠를 걸러냅니다.
    ///
    /// # Errors
    /// - 포맷이 [`KNOWN_FORMATS`]에 없으면 `UnknownFormat`
    pub fn get(&self, format: &str) -> Result<Descriptor, PackagerError> {
        if !KNOWN_FORMATS.contains(&format) {
            return Err(PackagerError::UnknownFormat(format.to_owned()));
        }

        let mut descriptor = self.base.clone();
        let mut overrides = std::mem::take(&mut descriptor.overrides);
        if let Some(over) = overrides.remove(format) {
            descriptor.merge(over);
        }
        descriptor
            .contents
            .retain(|c| c.packager.is_empty() || c.packager == format);
        Ok(descriptor)
    }

    /// 덮어쓰기가 정의된 포맷 이름 목록
    pub fn override_formats(&self) -> Vec<&str> {
        self.base.overrides.keys().map(String::as_str).collect()
    }
}

/// 디스크립터 파일을 읽고 파싱합니다.
///
/// # Errors
/// - 파일을 읽을 수 없거나 너무 큰 경우
/// - YAML 구조가 스키마와 맞지 않는 경우
pub fn parse_file(path: impl AsRef<Path>, env: &BuildEnv) -> Result<DescriptorSet, PackagerError> {
    let path = path.as_ref();
    let parse_err = |reason: String| PackagerError::Parse {
        path: path.display().to_string(),
        reason,
    };

    let metadata = std::fs::metadata(path).map_err(|e| parse_err(format!("failed to stat: {e}")))?;
    if metadata.len() > MAX_DESCRIPTOR_FILE_SIZE {
        return Err(parse_err(format!(
            "file too large: {} bytes (max {MAX_DESCRIPTOR_FILE_SIZE})",
            metadata.len()
        )));
    }

    let content =
        std::fs::read_to_string(path).map_err(|e| parse_err(format!("failed to read: {e}")))?;

    parse_str(&content, env).map_err(|e| match e {
        PackagerError::Parse { reason, .. } => parse_err(reason),
        other => other,
    })
}

/// YAML 문자열을 파싱합니다.
pub fn parse_str(yaml: &str, env: &BuildEnv) -> Result<DescriptorSet, PackagerError> {
    let mut base: Descriptor = serde_yaml::from_str(yaml).map_err(|e| PackagerError::Parse {
        path: "<inline>".to_owned(),
        reason: e.to_string(),
    })?;

    base.expand_templates(env);
    base.resolve_paths(env);

    tracing::debug!(
        name = %base.name,
        arch = %base.arch,
        version = %base.version,
        overrides = base.overrides.len(),
        "descriptor parsed"
    );

    Ok(DescriptorSet { base })
}
