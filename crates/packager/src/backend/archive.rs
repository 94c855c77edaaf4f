//! 결정적 tar 스트림 작성기와 공통 페이로드 수집
//!
//! 모든 멤버는 mtime 0, uid/gid 0(root)으로 기록되고 선언 순서를 유지하므로
//! 같은 입력은 항상 같은 바이트열을 만듭니다. 작성기는 추가된 멤버의
//! 경로와 내용을 SHA-256으로 누적하여 서명 멤버 계산에 사용합니다.

use std::io::Write;

use sha2::{Digest, Sha256};
use tar::{EntryType, Header};

use crate::descriptor::{ContentType, Descriptor, Signature};
use crate::error::PackagerError;

pub(crate) const DEFAULT_FILE_MODE: u32 = 0o644;
pub(crate) const DEFAULT_DIR_MODE: u32 = 0o755;
pub(crate) const SCRIPT_MODE: u32 = 0o755;

/// 패키지에 담길 데이터 항목
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum EntryKind {
    File { data: Vec<u8>, mode: u32 },
    Dir { mode: u32 },
    Symlink { target: String },
    /// 소유만 하고 내용은 없음
    Ghost,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct DataEntry {
    /// 선행 `/`가 없는 설치 경로
    pub path: String,
    pub kind: EntryKind,
    pub content_type: ContentType,
}

impl DataEntry {
    /// 설치 후 차지하는 바이트 수
    pub fn installed_size(&self) -> u64 {
        match &self.kind {
            EntryKind::File { data, .. } => data.len() as u64,
            _ => 0,
        }
    }

    /// 패키지 안의 절대 설치 경로
    pub fn install_path(&self) -> String {
        format!("/{}", self.path)
    }
}

fn read_source(path: &str, what: &str) -> Result<Vec<u8>, PackagerError> {
    std::fs::read(path)
        .map_err(|e| PackagerError::Build(format!("failed to read {what} '{path}': {e}")))
}

/// 디스크립터의 콘텐츠를 읽어 데이터 항목 목록을 만듭니다.
///
/// 메타 패키지는 콘텐츠를 담지 않습니다.
pub(crate) fn collect_entries(info: &Descriptor) -> Result<Vec<DataEntry>, PackagerError> {
    if info.meta {
        return Ok(Vec::new());
    }

    let mut entries = Vec::with_capacity(info.contents.len());
    for content in &info.contents {
        let path = content.dst.trim_start_matches('/').trim_end_matches('/').to_owned();
        let mode = content.file_info.parse_mode()?;
        let kind = match content.kind {
            ContentType::File | ContentType::Config | ContentType::ConfigNoReplace => {
                EntryKind::File {
                    data: read_source(&content.src, "content")?,
                    mode: mode.unwrap_or(DEFAULT_FILE_MODE),
                }
            }
            ContentType::Dir => EntryKind::Dir {
                mode: mode.unwrap_or(DEFAULT_DIR_MODE),
            },
            ContentType::Symlink => EntryKind::Symlink {
                target: content.src.clone(),
            },
            ContentType::Ghost => EntryKind::Ghost,
        };
        entries.push(DataEntry {
            path,
            kind,
            content_type: content.kind,
        });
    }
    Ok(entries)
}

/// (스크립트 이름, 내용) 목록을 읽습니다.
pub(crate) fn read_scripts(info: &Descriptor) -> Result<Vec<(&'static str, Vec<u8>)>, PackagerError> {
    info.scripts
        .entries()
        .into_iter()
        .map(|(name, path)| Ok((name, read_source(path, "script")?)))
        .collect()
}

/// 변경 이력 파일이 설정되어 있으면 읽습니다.
pub(crate) fn read_changelog(info: &Descriptor) -> Result<Option<Vec<u8>>, PackagerError> {
    if info.changelog.is_empty() {
        return Ok(None);
    }
    read_source(&info.changelog, "changelog").map(Some)
}

/// 설명을 첫 줄(요약)과 나머지로 나눕니다.
pub(crate) fn split_description(description: &str) -> (&str, Vec<&str>) {
    let mut lines = description.trim().lines();
    let summary = lines.next().unwrap_or_default();
    (summary, lines.collect())
}

/// 결정적 tar 작성기
pub(crate) struct PayloadWriter<'w> {
    builder: tar::Builder<&'w mut dyn Write>,
    digest: Sha256,
}

impl<'w> PayloadWriter<'w> {
    pub fn new(writer: &'w mut dyn Write) -> Self {
        let mut builder = tar::Builder::new(writer);
        builder.mode(tar::HeaderMode::Deterministic);
        Self {
            builder,
            digest: Sha256::new(),
        }
    }

    fn header(entry_type: EntryType, size: u64, mode: u32) -> Result<Header, PackagerError> {
        let mut header = Header::new_gnu();
        header.set_entry_type(entry_type);
        header.set_size(size);
        header.set_mode(mode);
        header.set_mtime(0);
        header.set_uid(0);
        header.set_gid(0);
        header.set_username("root")?;
        header.set_groupname("root")?;
        Ok(header)
    }

    fn record(&mut self, path: &str, data: &[u8]) {
        self.digest.update(path.as_bytes());
        self.digest.update([0u8]);
        self.digest.update(data);
    }

    /// 일반 파일 멤버를 추가합니다.
    pub fn file(&mut self, path: &str, data: &[u8], mode: u32) -> Result<(), PackagerError> {
        let mut header = Self::header(EntryType::Regular, data.len() as u64, mode)?;
        self.builder.append_data(&mut header, path, data)?;
        self.record(path, data);
        Ok(())
    }

    /// 디렉토리 멤버를 추가합니다.
    pub fn dir(&mut self, path: &str, mode: u32) -> Result<(), PackagerError> {
        let mut header = Self::header(EntryType::Directory, 0, mode)?;
        self.builder.append_data(&mut header, path, std::io::empty())?;
        self.record(path, &[]);
        Ok(())
    }

    /// 심볼릭 링크 멤버를 추가합니다.
    pub fn symlink(&mut self, path: &str, target: &str) -> Result<(), PackagerError> {
        let mut header = Self::header(EntryType::Symlink, 0, 0o777)?;
        self.builder.append_link(&mut header, path, target)?;
        self.record(path, target.as_bytes());
        Ok(())
    }

    /// 데이터 항목들을 `prefix` 아래에 추가합니다. ghost 항목은 건너뜁니다.
    pub fn entries(&mut self, prefix: &str, entries: &[DataEntry]) -> Result<(), PackagerError> {
        for entry in entries {
            let path = if prefix.is_empty() {
                entry.path.clone()
            } else {
                format!("{prefix}/{}", entry.path)
            };
            match &entry.kind {
                EntryKind::File { data, mode } => self.file(&path, data, *mode)?,
                EntryKind::Dir { mode } => self.dir(&path, *mode)?,
                EntryKind::Symlink { target } => self.symlink(&path, target)?,
                EntryKind::Ghost => {}
            }
        }
        Ok(())
    }

    /// 지금까지 추가된 멤버의 누적 다이제스트 (hex)
    pub fn digest_hex(&self) -> String {
        to_hex(&self.digest.clone().finalize())
    }

    /// 서명이 설정되어 있으면 `path`에 서명 멤버를 추가합니다.
    ///
    /// 서명은 키 내용과 앞선 모든 멤버의 누적 다이제스트에 대한 SHA-256입니다.
    pub fn sign(&mut self, path: &str, signature: &Signature) -> Result<(), PackagerError> {
        if !signature.is_configured() {
            return Ok(());
        }
        let key = std::fs::read(&signature.key_file).map_err(|e| {
            PackagerError::Build(format!(
                "failed to read signing key '{}': {e}",
                signature.key_file
            ))
        })?;

        let mut hasher = Sha256::new();
        hasher.update(&key);
        hasher.update(self.digest_hex().as_bytes());
        let mut sig = to_hex(&hasher.finalize());
        sig.push('\n');

        self.file(path, sig.as_bytes(), DEFAULT_FILE_MODE)
    }

    /// tar 트레일러를 쓰고 내부 writer를 flush합니다.
    pub fn finish(self) -> Result<(), PackagerError> {
        let writer = self.builder.into_inner()?;
        writer.flush()?;
        Ok(())
    }
}

/// 바이트열을 소문자 hex 문자열로 변환합니다.
pub fn to_hex(bytes: &[u8]) -> String {
    use std::fmt::Write as _;
    bytes.iter().fold(String::with_capacity(bytes.len() * 2), |mut acc, b| {
        let _ = write!(acc, "{b:02x}");
        acc
    })
}
