//! Container CLI abstraction for testability.
//!
//! The [`Verifier`] trait is what the harness depends on. Production code uses
//! [`DockerCliVerifier`], which shells out to `docker build` (or any CLI with
//! the same surface, e.g. `podman`); harness tests use recording fakes.
//!
//! # Output handling
//!
//! stdout and stderr are read line by line as they arrive. Every line is
//! emitted as a tracing event carrying the `case` field and appended to a
//! combined buffer that is returned to the caller (or attached to the error
//! on timeout), so a failing case always reports what the build printed.
//!
//! The exit status is awaited alongside the output. Once the process exits,
//! remaining output is read for a short grace period only, since helper
//! processes it spawned may keep the pipes open.
//!
//! # Examples
//!
//! ```ignore
//! let verifier = DockerCliVerifier::new("docker", "testdata/acceptance")
//!     .with_timeout(Duration::from_secs(600));
//! let output = verifier.run(&spec).await?;
//! if !output.success {
//!     eprintln!("{}", output.output);
//! }
//! ```

use std::future::Future;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;

use packmatrix_core::config::VerifierConfig;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::Command;
use tokio::sync::mpsc;

use crate::error::VerifierError;
use crate::spec::ContainerVerificationSpec;

/// Result of a container build that ran to completion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerificationOutput {
    /// Exit code, `None` if the process was terminated by a signal.
    pub status: Option<i32>,
    /// `true` iff the process exited with status zero.
    pub success: bool,
    /// Combined stdout/stderr in arrival order.
    pub output: String,
}

/// Capability to run a containerized verification.
///
/// The trait is `Send + Sync + 'static` so one instance can be shared by
/// every case task through an `Arc`.
pub trait Verifier: Send + Sync + 'static {
    /// Runs the verification described by `spec`.
    ///
    /// A nonzero exit is reported through [`VerificationOutput::success`],
    /// not as an error.
    ///
    /// # Errors
    ///
    /// - `VerifierError::Launch`: the process could not be started
    /// - `VerifierError::Io`: waiting on the process failed
    /// - `VerifierError::Timeout`: the process exceeded the configured timeout
    fn run(
        &self,
        spec: &ContainerVerificationSpec,
    ) -> impl Future<Output = Result<VerificationOutput, VerifierError>> + Send;
}

/// Runs verifications by spawning the container CLI.
#[derive(Debug, Clone)]
pub struct DockerCliVerifier {
    binary: String,
    context_dir: PathBuf,
    timeout: Duration,
}

impl DockerCliVerifier {
    /// Default timeout for a single container build.
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(1800);

    /// Creates a verifier running `binary` with `context_dir` as working
    /// directory and build context.
    pub fn new(binary: impl Into<String>, context_dir: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
            context_dir: context_dir.into(),
            timeout: Self::DEFAULT_TIMEOUT,
        }
    }

    /// Creates a verifier from the `[verifier]` config section.
    pub fn from_config(config: &VerifierConfig, context_dir: impl Into<PathBuf>) -> Self {
        Self::new(config.binary.clone(), context_dir)
            .with_timeout(Duration::from_secs(config.timeout_secs))
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn binary(&self) -> &str {
        &self.binary
    }

    pub fn context_dir(&self) -> &Path {
        &self.context_dir
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

#[derive(Debug, Clone, Copy)]
enum Stream {
    Stdout,
    Stderr,
}

impl Stream {
    fn as_str(self) -> &'static str {
        match self {
            Self::Stdout => "stdout",
            Self::Stderr => "stderr",
        }
    }
}

/// How long to keep reading output after the process has exited.
const OUTPUT_DRAIN_GRACE: Duration = Duration::from_millis(500);

fn append_line(output: &mut String, spec: &ContainerVerificationSpec, stream: Stream, line: &str) {
    tracing::info!(case = %spec.case_id, stream = stream.as_str(), "{line}");
    output.push_str(line);
    output.push('\n');
}

/// Forwards `reader` line by line into `tx` until EOF or a read error.
async fn forward_lines<R>(reader: R, stream: Stream, tx: mpsc::UnboundedSender<(Stream, String)>)
where
    R: AsyncRead + Unpin,
{
    let mut segments = BufReader::new(reader).split(b'\n');
    loop {
        match segments.next_segment().await {
            Ok(Some(bytes)) => {
                let line = String::from_utf8_lossy(&bytes)
                    .trim_end_matches('\r')
                    .to_owned();
                if tx.send((stream, line)).is_err() {
                    break;
                }
            }
            Ok(None) => break,
            Err(e) => {
                tracing::warn!(stream = stream.as_str(), error = %e, "failed to read container build output");
                break;
            }
        }
    }
}

impl Verifier for DockerCliVerifier {
    async fn run(
        &self,
        spec: &ContainerVerificationSpec,
    ) -> Result<VerificationOutput, VerifierError> {
        let args = spec.to_args();
        tracing::info!(
            case = %spec.case_id,
            binary = %self.binary,
            context = %self.context_dir.display(),
            command = %spec,
            "starting container build"
        );

        let mut child = Command::new(&self.binary)
            .args(&args)
            .current_dir(&self.context_dir)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| VerifierError::Launch {
                binary: self.binary.clone(),
                reason: e.to_string(),
            })?;

        let (tx, mut rx) = mpsc::unbounded_channel();
        if let Some(stdout) = child.stdout.take() {
            tokio::spawn(forward_lines(stdout, Stream::Stdout, tx.clone()));
        }
        if let Some(stderr) = child.stderr.take() {
            tokio::spawn(forward_lines(stderr, Stream::Stderr, tx.clone()));
        }
        drop(tx);

        let mut output = String::new();
        let collect = async {
            let status = loop {
                tokio::select! {
                    Some((stream, line)) = rx.recv() => {
                        append_line(&mut output, spec, stream, &line);
                    }
                    status = child.wait() => break status,
                }
            };

            // background children may hold the pipes open past exit
            let drain = async {
                while let Some((stream, line)) = rx.recv().await {
                    append_line(&mut output, spec, stream, &line);
                }
            };
            if tokio::time::timeout(OUTPUT_DRAIN_GRACE, drain).await.is_err() {
                tracing::debug!(case = %spec.case_id, "output pipes still open after exit, not waiting further");
            }
            status
        };

        let result = tokio::time::timeout(self.timeout, collect).await;
        match result {
            Ok(Ok(status)) => {
                tracing::info!(
                    case = %spec.case_id,
                    exit_code = status.code(),
                    success = status.success(),
                    "container build finished"
                );
                Ok(VerificationOutput {
                    status: status.code(),
                    success: status.success(),
                    output,
                })
            }
            Ok(Err(e)) => Err(VerifierError::Io {
                reason: e.to_string(),
                output,
            }),
            Err(_) => {
                tracing::warn!(
                    case = %spec.case_id,
                    timeout_secs = self.timeout.as_secs(),
                    "container build timed out, killing process"
                );
                if let Err(e) = child.start_kill() {
                    tracing::warn!(case = %spec.case_id, error = %e, "failed to kill container build");
                }
                Err(VerifierError::Timeout {
                    timeout_secs: self.timeout.as_secs(),
                    output,
                })
            }
        }
    }
}
