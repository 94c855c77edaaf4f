//! apk 백엔드
//!
//! 멤버 순서: `.PKGINFO`, 스크립트(`.pre-install` 등), 콘텐츠(루트 기준),
//! 서명이 설정되면 `.SIGN.SHA256`.

use std::fmt::Write as _;
use std::io::Write;

use sha2::{Digest, Sha256};

use super::archive::{
    DEFAULT_FILE_MODE, DataEntry, EntryKind, PayloadWriter, SCRIPT_MODE, collect_entries,
    read_scripts, split_description, to_hex,
};
use super::{PackageBackend, check_arch, translate_arch};
use crate::defaults::with_defaults;
use crate::descriptor::{ContentType, Descriptor};
use crate::error::PackagerError;

const ARCH_TABLE: &[(&str, &str)] = &[
    ("amd64", "x86_64"),
    ("arm64", "aarch64"),
    ("386", "x86"),
    ("ppc64le", "ppc64le"),
];

#[derive(Debug, Clone, Copy, Default)]
pub struct ApkBackend;

/// `version[_prerelease]-r<release>`
pub fn apk_version(info: &Descriptor) -> String {
    let mut version = info.version.clone();
    if !info.prerelease.is_empty() {
        version.push('_');
        version.push_str(&info.prerelease);
    }
    let release = if info.release.is_empty() {
        "0"
    } else {
        info.release.as_str()
    };
    format!("{version}-r{release}")
}

/// 데이터 항목에 대한 SHA-256 (`datahash`)
fn data_hash(entries: &[DataEntry]) -> String {
    let mut hasher = Sha256::new();
    for entry in entries {
        hasher.update(entry.path.as_bytes());
        if let EntryKind::File { data, .. } = &entry.kind {
            hasher.update(data);
        }
    }
    to_hex(&hasher.finalize())
}

fn pkginfo(info: &Descriptor, entries: &[DataEntry]) -> String {
    let mut out = String::from("# Generated by packmatrix\n");
    let mut field = |name: &str, value: &str| {
        if !value.is_empty() {
            let _ = writeln!(out, "{name} = {value}");
        }
    };

    let (summary, _) = split_description(&info.description);
    let size: u64 = entries.iter().map(DataEntry::installed_size).sum();

    field("pkgname", &info.name);
    field("pkgver", &apk_version(info));
    field("pkgdesc", summary);
    field("url", &info.homepage);
    field("size", &size.to_string());
    field("arch", &info.arch);
    field("origin", &info.name);
    field("maintainer", &info.maintainer);
    field("license", &info.license);
    for dep in &info.depends {
        field("depend", dep);
    }
    for dep in &info.conflicts {
        field("depend", &format!("!{dep}"));
    }
    for dep in &info.provides {
        field("provides", dep);
    }
    for dep in &info.replaces {
        field("replaces", dep);
    }
    field("datahash", &data_hash(entries));
    out
}

fn script_member(name: &str) -> &'static str {
    match name {
        "preinstall" => ".pre-install",
        "postinstall" => ".post-install",
        "preremove" => ".pre-deinstall",
        _ => ".post-deinstall",
    }
}

impl PackageBackend for ApkBackend {
    fn name(&self) -> &'static str {
        "apk"
    }

    fn validate(&self, info: &Descriptor) -> Result<(), PackagerError> {
        check_arch(self.name(), &info.arch)?;
        if info.contents.iter().any(|c| c.kind == ContentType::Ghost) {
            return Err(PackagerError::Validation(
                "apk: ghost contents are not supported".to_owned(),
            ));
        }
        Ok(())
    }

    fn with_defaults(&self, info: Descriptor) -> Descriptor {
        let mut info = with_defaults(info);
        info.arch = translate_arch(&info.arch, ARCH_TABLE);
        info
    }

    fn package(&self, info: &Descriptor, writer: &mut dyn Write) -> Result<(), PackagerError> {
        let entries = collect_entries(info)?;
        let scripts = read_scripts(info)?;

        let mut tar = PayloadWriter::new(writer);
        tar.file(
            ".PKGINFO",
            pkginfo(info, &entries).as_bytes(),
            DEFAULT_FILE_MODE,
        )?;
        for (name, body) in &scripts {
            tar.file(script_member(name), body, SCRIPT_MODE)?;
        }
        tar.entries("", &entries)?;
        tar.sign(".SIGN.SHA256", &info.apk.signature)?;
        tar.finish()?;

        tracing::debug!(
            name = %info.name,
            arch = %info.arch,
            entries = entries.len(),
            "apk package written"
        );
        Ok(())
    }
}
