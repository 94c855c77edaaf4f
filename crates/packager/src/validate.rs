//! 포맷 독립 디스크립터 검증

use std::collections::HashSet;

use crate::descriptor::{ContentType, Descriptor};
use crate::error::PackagerError;

/// 디스크립터가 패키지를 만들 수 있는 상태인지 검증합니다.
///
/// # Errors
/// - 이름, 아키텍처, 버전이 비어 있는 경우
/// - 콘텐츠의 설치 경로가 절대 경로가 아니거나 중복되는 경우
/// - 소스가 필요한 콘텐츠에 소스가 없는 경우
/// - 파일 모드가 올바른 8진수가 아닌 경우
pub fn validate(info: &Descriptor) -> Result<(), PackagerError> {
    if info.name.trim().is_empty() {
        return Err(PackagerError::Validation(
            "package name must be provided".to_owned(),
        ));
    }
    if info.arch.trim().is_empty() {
        return Err(PackagerError::Validation(
            "package arch must be provided".to_owned(),
        ));
    }
    if info.version.trim().is_empty() {
        return Err(PackagerError::Validation(
            "package version must be provided".to_owned(),
        ));
    }

    let mut seen = HashSet::new();
    for content in &info.contents {
        if !content.dst.starts_with('/') {
            return Err(PackagerError::Validation(format!(
                "content destination '{}' must be an absolute path",
                content.dst
            )));
        }
        if content.dst.split('/').any(|part| part == "..") {
            return Err(PackagerError::Validation(format!(
                "content destination '{}' must not contain '..'",
                content.dst
            )));
        }
        if !seen.insert(content.dst.trim_end_matches('/')) {
            return Err(PackagerError::Validation(format!(
                "content collision: '{}' is declared more than once",
                content.dst
            )));
        }
        let needs_src = content.kind.reads_source() || content.kind == ContentType::Symlink;
        if needs_src && content.src.is_empty() {
            return Err(PackagerError::Validation(format!(
                "content '{}' requires a src",
                content.dst
            )));
        }
        content.file_info.parse_mode()?;
    }

    Ok(())
}
