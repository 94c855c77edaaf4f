#![doc = include_str!("../README.md")]
//!
//! # 모듈 구성
//! - [`env`]: 케이스 로컬 템플릿 변수 ([`BuildEnv`])
//! - [`descriptor`]: 픽스처 스키마, [`parse_file`], [`DescriptorSet`]
//! - [`validate`](mod@validate): 포맷 독립 검증
//! - [`defaults`]: 포맷 독립 기본값
//! - [`backend`]: [`PackageBackend`] trait, [`BackendRegistry`], deb/rpm/apk
//! - [`error`]: [`PackagerError`]

pub mod backend;
pub mod defaults;
pub mod descriptor;
pub mod env;
pub mod error;
pub mod validate;

pub use backend::archive::to_hex;
pub use backend::{ApkBackend, BackendRegistry, DebBackend, PackageBackend, RpmBackend};
pub use defaults::with_defaults;
pub use descriptor::{Descriptor, DescriptorSet, parse_file, parse_str};
pub use env::{BuildEnv, VAR_BUILD_ARCH, VAR_SEMVER};
pub use error::PackagerError;
pub use validate::validate;
