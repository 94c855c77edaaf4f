//! 케이스 -> 패키지 빌드
//!
//! [`BuildRequest`]는 케이스에서 결정적으로 파생되며, 템플릿 변수는
//! 케이스 로컬 [`BuildEnv`]로만 전달됩니다. [`BuildRequestExecutor`]는
//! 패키저 계약(parse -> get -> validate -> backend -> defaults -> package)을
//! 순서대로 수행하고 각 단계의 실패를 해당 단계의 [`CaseError`]로 돌려줍니다.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use packmatrix_core::config::MatrixConfig;
use packmatrix_core::error::CaseError;
use packmatrix_core::types::{CaseId, Format, TestCase};
use packmatrix_packager::{
    BackendRegistry, BuildEnv, VAR_BUILD_ARCH, VAR_SEMVER, parse_file, to_hex, validate,
};
use sha2::{Digest, Sha256};

/// 스크래치 디렉토리 권한
const SCRATCH_DIR_MODE: u32 = 0o700;

/// 케이스 하나의 빌드 요청
#[derive(Debug, Clone)]
pub struct BuildRequest {
    pub case_id: CaseId,
    /// 픽스처 파일 경로 (`<fixture_root>/<family>.<scenario>.yaml`)
    pub fixture: PathBuf,
    pub format: Format,
    /// 스크래치 디렉토리
    pub scratch_dir: PathBuf,
    /// 산출물 경로 (`<scratch_dir>/<artifact_name>`)
    pub output: PathBuf,
    /// `SEMVER`, `BUILD_ARCH`가 설정된 케이스 로컬 환경
    pub env: BuildEnv,
}

impl BuildRequest {
    pub fn for_case(case: &TestCase, matrix: &MatrixConfig) -> Self {
        let scratch_dir = matrix.scratch_path();
        Self {
            case_id: case.id(),
            fixture: matrix.fixture_root.join(case.fixture_name()),
            format: case.format,
            output: scratch_dir.join(case.artifact_name()),
            scratch_dir,
            env: BuildEnv::new(&matrix.fixture_root)
                .with_var(VAR_SEMVER, matrix.semver.as_str())
                .with_var(VAR_BUILD_ARCH, case.arch.as_str()),
        }
    }
}

/// 생성된 패키지 정보
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuiltArtifact {
    pub path: PathBuf,
    pub size_bytes: u64,
    /// SHA-256 (hex)
    pub sha256: String,
}

/// 빌드 요청을 패키지로 만드는 능력
///
/// 블로킹 풀에서 호출되므로 동기 인터페이스입니다.
pub trait ArtifactBuilder: Send + Sync + 'static {
    /// # Errors
    /// 실패한 단계에 해당하는 [`CaseError`]
    fn build(&self, request: &BuildRequest) -> Result<BuiltArtifact, CaseError>;
}

/// 패키저 라이브러리를 사용하는 기본 빌더
pub struct BuildRequestExecutor {
    registry: BackendRegistry,
}

impl BuildRequestExecutor {
    pub fn new(registry: BackendRegistry) -> Self {
        Self { registry }
    }

    /// 내장 백엔드(apk, deb, rpm)를 사용하는 빌더
    pub fn with_builtin() -> Self {
        Self::new(BackendRegistry::with_builtin())
    }
}

impl Default for BuildRequestExecutor {
    fn default() -> Self {
        Self::with_builtin()
    }
}

/// 쓰는 동안 크기와 SHA-256을 누적하는 writer
struct DigestWriter<W> {
    inner: W,
    hasher: Sha256,
    written: u64,
}

impl<W: Write> Write for DigestWriter<W> {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        let n = self.inner.write(buf)?;
        self.hasher.update(&buf[..n]);
        self.written += n as u64;
        Ok(n)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.inner.flush()
    }
}

fn create_scratch_dir(dir: &Path) -> std::io::Result<()> {
    let mut builder = std::fs::DirBuilder::new();
    builder.recursive(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::DirBuilderExt;
        builder.mode(SCRATCH_DIR_MODE);
    }
    builder.create(dir)
}

impl ArtifactBuilder for BuildRequestExecutor {
    fn build(&self, request: &BuildRequest) -> Result<BuiltArtifact, CaseError> {
        let case = request.case_id.as_str();

        // resolve
        if !request.fixture.is_file() {
            return Err(CaseError::FixtureResolution {
                path: request.fixture.display().to_string(),
                reason: "fixture file not found".to_owned(),
            });
        }

        // parse, select format
        let set = parse_file(&request.fixture, &request.env)?;
        let info = set.get(request.format.as_str())?;

        // validate
        validate(&info)?;

        // select backend
        let backend = self.registry.get(request.format.as_str())?;
        backend.validate(&info)?;

        // defaults
        let info = backend.with_defaults(info);
        tracing::debug!(
            case,
            phase = "build",
            name = %info.name,
            arch = %info.arch,
            version = %info.version,
            "descriptor resolved"
        );

        create_scratch_dir(&request.scratch_dir).map_err(|e| {
            CaseError::Build(format!(
                "failed to create scratch dir '{}': {e}",
                request.scratch_dir.display()
            ))
        })?;

        let file = File::create(&request.output).map_err(|e| {
            CaseError::Build(format!(
                "failed to create '{}': {e}",
                request.output.display()
            ))
        })?;
        let mut writer = DigestWriter {
            inner: BufWriter::new(file),
            hasher: Sha256::new(),
            written: 0,
        };

        let packaged = backend
            .package(&info, &mut writer)
            .map_err(CaseError::from)
            .and_then(|()| {
                writer
                    .flush()
                    .map_err(|e| CaseError::Build(format!("failed to flush artifact: {e}")))
            })
            .and_then(|()| {
                if writer.written == 0 {
                    Err(CaseError::Build("backend produced an empty artifact".to_owned()))
                } else {
                    Ok(())
                }
            });

        if let Err(err) = packaged {
            drop(writer);
            if let Err(e) = std::fs::remove_file(&request.output) {
                tracing::warn!(case, artifact = %request.output.display(), error = %e, "failed to remove partial artifact");
            }
            return Err(err);
        }

        let artifact = BuiltArtifact {
            path: request.output.clone(),
            size_bytes: writer.written,
            sha256: to_hex(&writer.hasher.finalize()),
        };
        tracing::info!(
            case,
            phase = "build",
            artifact = %artifact.path.display(),
            size_bytes = artifact.size_bytes,
            "package built"
        );
        Ok(artifact)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use packmatrix_core::types::{Arch, Compression};

    fn matrix(root: &Path) -> MatrixConfig {
        MatrixConfig {
            fixture_root: root.to_path_buf(),
            ..MatrixConfig::default()
        }
    }

    #[test]
    fn request_paths_follow_naming_convention() {
        let matrix = matrix(Path::new("/fx"));
        let case = TestCase::core("min", Format::Deb, Arch::Amd64);
        let request = BuildRequest::for_case(&case, &matrix);
        assert_eq!(request.fixture, PathBuf::from("/fx/core.min.yaml"));
        assert_eq!(request.output, PathBuf::from("/fx/tmp/min_amd64.deb"));
        assert_eq!(request.env.var(VAR_BUILD_ARCH), Some("amd64"));
        assert_eq!(request.env.var(VAR_SEMVER), Some("v1.0.0-0.1.b1+git.abcdefgh"));
        assert_eq!(request.env.base_dir(), Path::new("/fx"));
    }

    #[test]
    fn compression_request_uses_compression_fixture() {
        let matrix = matrix(Path::new("/fx"));
        let case = TestCase::compression(Compression::Gzip, Arch::Arm64);
        let request = BuildRequest::for_case(&case, &matrix);
        assert_eq!(request.fixture, PathBuf::from("/fx/rpm.gzip.compression.yaml"));
        assert_eq!(
            request.output,
            PathBuf::from("/fx/tmp/gzip_compression_arm64.rpm")
        );
    }

    #[test]
    fn missing_fixture_is_resolution_error() {
        let dir = tempfile::tempdir().unwrap();
        let case = TestCase::core("nope", Format::Rpm, Arch::Amd64);
        let request = BuildRequest::for_case(&case, &matrix(dir.path()));
        let err = BuildRequestExecutor::with_builtin()
            .build(&request)
            .unwrap_err();
        assert!(matches!(err, CaseError::FixtureResolution { .. }));
        assert!(!request.scratch_dir.exists());
    }

    #[test]
    fn builds_artifact_with_digest() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("core.min.yaml"),
            "name: foo\narch: ${BUILD_ARCH}\nversion: ${SEMVER}\n",
        )
        .unwrap();
        let case = TestCase::core("min", Format::Apk, Arch::I386);
        let request = BuildRequest::for_case(&case, &matrix(dir.path()));

        let artifact = BuildRequestExecutor::with_builtin().build(&request).unwrap();

        let bytes = std::fs::read(&artifact.path).unwrap();
        assert_eq!(artifact.size_bytes, bytes.len() as u64);
        assert_eq!(artifact.sha256, to_hex(&Sha256::digest(&bytes)));
        assert!(artifact.path.ends_with("tmp/min_386.apk"));
    }

    #[cfg(unix)]
    #[test]
    fn scratch_dir_is_private() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let scratch = dir.path().join("tmp");
        create_scratch_dir(&scratch).unwrap();
        create_scratch_dir(&scratch).unwrap();
        let mode = std::fs::metadata(&scratch).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o700);
    }

    #[test]
    fn failed_build_removes_partial_artifact() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("core.broken.yaml"),
            "name: foo\narch: amd64\nversion: 1.0.0\ncontents:\n  - src: ./missing\n    dst: /usr/bin/missing\n",
        )
        .unwrap();
        let case = TestCase::core("broken", Format::Deb, Arch::Amd64);
        let request = BuildRequest::for_case(&case, &matrix(dir.path()));

        let err = BuildRequestExecutor::with_builtin()
            .build(&request)
            .unwrap_err();

        assert!(matches!(err, CaseError::Build(_)));
        assert!(!request.output.exists());
    }
}
