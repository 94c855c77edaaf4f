//! deb 백엔드
//!
//! 멤버 순서: `debian-binary`, `control/*` (control, conffiles, 스크립트),
//! `data/*` (콘텐츠, 변경 이력), 서명이 설정되면 `_gpgorigin`.

use std::io::Write;

use super::archive::{
    DEFAULT_FILE_MODE, DataEntry, PayloadWriter, SCRIPT_MODE, collect_entries, read_changelog,
    read_scripts, split_description,
};
use super::{PackageBackend, check_arch, translate_arch};
use crate::defaults::with_defaults;
use crate::descriptor::{ContentType, Descriptor};
use crate::error::PackagerError;

pub const DEFAULT_MAINTAINER: &str = "Unset Maintainer <unset@localhost>";

const ARCH_TABLE: &[(&str, &str)] = &[
    ("amd64", "amd64"),
    ("arm64", "arm64"),
    ("386", "i386"),
    ("ppc64le", "ppc64el"),
];

#[derive(Debug, Clone, Copy, Default)]
pub struct DebBackend;

/// `[epoch:]version[~prerelease][+metadata][-release]`
pub fn deb_version(info: &Descriptor) -> String {
    let mut version = String::new();
    if !info.epoch.is_empty() {
        version.push_str(&info.epoch);
        version.push(':');
    }
    version.push_str(&info.version);
    if !info.prerelease.is_empty() {
        version.push('~');
        version.push_str(&info.prerelease);
    }
    if !info.version_metadata.is_empty() {
        version.push('+');
        version.push_str(&info.version_metadata);
    }
    if !info.release.is_empty() {
        version.push('-');
        version.push_str(&info.release);
    }
    version
}

fn control_file(info: &Descriptor, installed_size: u64) -> String {
    let mut out = String::new();
    let mut field = |name: &str, value: &str| {
        if !value.is_empty() {
            out.push_str(name);
            out.push_str(": ");
            out.push_str(value);
            out.push('\n');
        }
    };

    field("Package", &info.name);
    field("Version", &deb_version(info));
    field("Section", &info.section);
    field("Priority", &info.priority);
    field("Architecture", &info.arch);
    field("Maintainer", &info.maintainer);
    field("Installed-Size", &installed_size.div_ceil(1024).to_string());
    field("Depends", &info.depends.join(", "));
    field("Recommends", &info.recommends.join(", "));
    field("Suggests", &info.suggests.join(", "));
    field("Conflicts", &info.conflicts.join(", "));
    field("Breaks", &info.deb.breaks.join(", "));
    field("Replaces", &info.replaces.join(", "));
    field("Provides", &info.provides.join(", "));
    field("Vendor", &info.vendor);
    field("Homepage", &info.homepage);

    let (summary, body) = split_description(&info.description);
    field("Description", summary);
    for line in body {
        if line.trim().is_empty() {
            out.push_str(" .\n");
        } else {
            out.push(' ');
            out.push_str(line);
            out.push('\n');
        }
    }
    out
}

fn conffiles(entries: &[DataEntry]) -> String {
    entries
        .iter()
        .filter(|e| e.content_type.is_config())
        .map(|e| format!("{}\n", e.install_path()))
        .collect()
}

fn script_member(name: &str) -> &'static str {
    match name {
        "preinstall" => "control/preinst",
        "postinstall" => "control/postinst",
        "preremove" => "control/prerm",
        _ => "control/postrm",
    }
}

impl PackageBackend for DebBackend {
    fn name(&self) -> &'static str {
        "deb"
    }

    fn validate(&self, info: &Descriptor) -> Result<(), PackagerError> {
        check_arch(self.name(), &info.arch)?;
        if info.contents.iter().any(|c| c.kind == ContentType::Ghost) {
            return Err(PackagerError::Validation(
                "deb: ghost contents are not supported".to_owned(),
            ));
        }
        Ok(())
    }

    fn with_defaults(&self, info: Descriptor) -> Descriptor {
        let mut info = with_defaults(info);
        info.arch = translate_arch(&info.arch, ARCH_TABLE);
        if info.maintainer.is_empty() {
            info.maintainer = DEFAULT_MAINTAINER.to_owned();
        }
        if info.section.is_empty() {
            info.section = "default".to_owned();
        }
        if info.priority.is_empty() {
            info.priority = "optional".to_owned();
        }
        info
    }

    fn package(&self, info: &Descriptor, writer: &mut dyn Write) -> Result<(), PackagerError> {
        let entries = collect_entries(info)?;
        let scripts = read_scripts(info)?;
        let changelog = read_changelog(info)?;
        let installed_size: u64 = entries.iter().map(DataEntry::installed_size).sum();

        let mut tar = PayloadWriter::new(writer);
        tar.file("debian-binary", b"2.0\n", DEFAULT_FILE_MODE)?;
        tar.file(
            "control/control",
            control_file(info, installed_size).as_bytes(),
            DEFAULT_FILE_MODE,
        )?;
        let conffiles = conffiles(&entries);
        if !conffiles.is_empty() {
            tar.file("control/conffiles", conffiles.as_bytes(), DEFAULT_FILE_MODE)?;
        }
        for (name, body) in &scripts {
            tar.file(script_member(name), body, SCRIPT_MODE)?;
        }

        tar.entries("data", &entries)?;
        if let Some(changelog) = changelog {
            let path = format!("data/usr/share/doc/{}/changelog.Debian", info.name);
            tar.file(&path, &changelog, DEFAULT_FILE_MODE)?;
        }

        tar.sign("_gpgorigin", &info.deb.signature)?;
        tar.finish()?;

        tracing::debug!(
            name = %info.name,
            arch = %info.arch,
            entries = entries.len(),
            "deb package written"
        );
        Ok(())
    }
}
