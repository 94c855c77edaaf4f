//! 포맷 독립 기본값

use crate::descriptor::{Descriptor, VersionSchema};

pub const DEFAULT_PLATFORM: &str = "linux";
pub const DEFAULT_DESCRIPTION: &str = "no description given";
pub const DEFAULT_VERSION: &str = "v0.0.0-rc0";

/// 비어 있는 필드에 기본값을 채우고, semver 스키마면 버전을 분리합니다.
///
/// `v1.0.0-0.1.b1+git.abcdefgh`는 버전 `1.0.0`, 프리릴리스 `0.1.b1`,
/// 메타데이터 `git.abcdefgh`가 됩니다. 명시적으로 지정된 프리릴리스와
/// 메타데이터는 유지됩니다. semver로 해석할 수 없는 버전은 그대로 둡니다.
pub fn with_defaults(mut info: Descriptor) -> Descriptor {
    if info.platform.is_empty() {
        info.platform = DEFAULT_PLATFORM.to_owned();
    }
    if info.description.trim().is_empty() {
        info.description = DEFAULT_DESCRIPTION.to_owned();
    }
    if info.version.is_empty() {
        info.version = DEFAULT_VERSION.to_owned();
    }
    if info.version_schema == VersionSchema::Semver {
        split_semver(&mut info);
    }
    info
}

fn split_semver(info: &mut Descriptor) {
    let raw = info.version.strip_prefix('v').unwrap_or(&info.version);
    let Ok(parsed) = semver::Version::parse(raw) else {
        tracing::debug!(version = %info.version, "version is not semver, keeping as is");
        return;
    };

    info.version = format!("{}.{}.{}", parsed.major, parsed.minor, parsed.patch);
    if info.prerelease.is_empty() && !parsed.pre.is_empty() {
        info.prerelease = parsed.pre.to_string();
    }
    if info.version_metadata.is_empty() && !parsed.build.is_empty() {
        info.version_metadata = parsed.build.to_string();
    }
}
