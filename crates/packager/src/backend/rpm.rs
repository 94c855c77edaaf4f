//! rpm 백엔드
//!
//! 멤버 순서: `header` (태그 텍스트, 파일 목록), `scripts/*`, `payload/*`,
//! 서명이 설정되면 `signature`.

use std::fmt::Write as _;
use std::io::Write;

use super::archive::{
    DEFAULT_FILE_MODE, DataEntry, EntryKind, PayloadWriter, SCRIPT_MODE, collect_entries,
    read_changelog, read_scripts, split_description,
};
use super::{PackageBackend, check_arch, translate_arch};
use crate::defaults::with_defaults;
use crate::descriptor::{ContentType, Descriptor};
use crate::error::PackagerError;

/// 지원하는 payload 압축
pub const SUPPORTED_COMPRESSION: [&str; 4] = ["gzip", "xz", "lzma", "zstd"];
pub const DEFAULT_COMPRESSION: &str = "gzip";
pub const DEFAULT_RELEASE: &str = "1";

const ARCH_TABLE: &[(&str, &str)] = &[
    ("amd64", "x86_64"),
    ("arm64", "aarch64"),
    ("386", "i386"),
    ("ppc64le", "ppc64le"),
];

#[derive(Debug, Clone, Copy, Default)]
pub struct RpmBackend;

/// `version[~prerelease][+metadata]`
pub fn rpm_version(info: &Descriptor) -> String {
    let mut version = info.version.clone();
    if !info.prerelease.is_empty() {
        version.push('~');
        version.push_str(&info.prerelease);
    }
    if !info.version_metadata.is_empty() {
        version.push('+');
        version.push_str(&info.version_metadata);
    }
    version
}

fn file_list_line(entry: &DataEntry) -> String {
    let path = entry.install_path();
    match (&entry.kind, entry.content_type) {
        (EntryKind::Dir { .. }, _) => format!("%dir {path}"),
        (EntryKind::Ghost, _) => format!("%ghost {path}"),
        (_, ContentType::ConfigNoReplace) => format!("%config(noreplace) {path}"),
        (_, ContentType::Config) => format!("%config {path}"),
        _ => path,
    }
}

fn header_file(info: &Descriptor, entries: &[DataEntry], changelog: Option<&[u8]>) -> String {
    let mut out = String::new();
    let mut tag = |name: &str, value: &str| {
        if !value.is_empty() {
            let _ = writeln!(out, "{name}: {value}");
        }
    };

    let (summary, body) = split_description(&info.description);
    let summary = if info.rpm.summary.is_empty() {
        summary
    } else {
        info.rpm.summary.as_str()
    };

    tag("Name", &info.name);
    tag("Epoch", &info.epoch);
    tag("Version", &rpm_version(info));
    tag("Release", &info.release);
    tag("Summary", summary);
    tag("License", &info.license);
    tag("Group", &info.rpm.group);
    tag("Vendor", &info.vendor);
    tag("URL", &info.homepage);
    tag("Packager", &info.maintainer);
    tag("BuildArch", &info.arch);
    tag("PayloadCompressor", &info.rpm.compression);
    for dep in &info.depends {
        tag("Requires", dep);
    }
    for dep in &info.recommends {
        tag("Recommends", dep);
    }
    for dep in &info.suggests {
        tag("Suggests", dep);
    }
    for dep in &info.conflicts {
        tag("Conflicts", dep);
    }
    for dep in &info.replaces {
        tag("Obsoletes", dep);
    }
    for dep in &info.provides {
        tag("Provides", dep);
    }

    out.push_str("\n%description\n");
    out.push_str(summary);
    out.push('\n');
    for line in body {
        out.push_str(line);
        out.push('\n');
    }

    out.push_str("\n%files\n");
    for entry in entries {
        out.push_str(&file_list_line(entry));
        out.push('\n');
    }

    if let Some(changelog) = changelog {
        out.push_str("\n%changelog\n");
        out.push_str(&String::from_utf8_lossy(changelog));
        if !out.ends_with('\n') {
            out.push('\n');
        }
    }
    out
}

fn script_member(name: &str) -> &'static str {
    match name {
        "preinstall" => "scripts/pre",
        "postinstall" => "scripts/post",
        "preremove" => "scripts/preun",
        _ => "scripts/postun",
    }
}

impl PackageBackend for RpmBackend {
    fn name(&self) -> &'static str {
        "rpm"
    }

    fn validate(&self, info: &Descriptor) -> Result<(), PackagerError> {
        check_arch(self.name(), &info.arch)?;
        let compression = info.rpm.compression.as_str();
        if !compression.is_empty() && !SUPPORTED_COMPRESSION.contains(&compression) {
            return Err(PackagerError::Validation(format!(
                "rpm: unsupported compression '{compression}' (expected one of {})",
                SUPPORTED_COMPRESSION.join(", ")
            )));
        }
        Ok(())
    }

    fn with_defaults(&self, info: Descriptor) -> Descriptor {
        let mut info = with_defaults(info);
        info.arch = translate_arch(&info.arch, ARCH_TABLE);
        if info.release.is_empty() {
            info.release = DEFAULT_RELEASE.to_owned();
        }
        if info.rpm.compression.is_empty() {
            info.rpm.compression = DEFAULT_COMPRESSION.to_owned();
        }
        info
    }

    fn package(&self, info: &Descriptor, writer: &mut dyn Write) -> Result<(), PackagerError> {
        let entries = collect_entries(info)?;
        let scripts = read_scripts(info)?;
        let changelog = read_changelog(info)?;

        let mut tar = PayloadWriter::new(writer);
        tar.file(
            "header",
            header_file(info, &entries, changelog.as_deref()).as_bytes(),
            DEFAULT_FILE_MODE,
        )?;
        for (name, body) in &scripts {
            tar.file(script_member(name), body, SCRIPT_MODE)?;
        }
        tar.entries("payload", &entries)?;
        tar.sign("signature", &info.rpm.signature)?;
        tar.finish()?;

        tracing::debug!(
            name = %info.name,
            arch = %info.arch,
            compression = %info.rpm.compression,
            entries = entries.len(),
            "rpm package written"
        );
        Ok(())
    }
}
