//! CLI-specific error types and exit code mapping

use packmatrix_core::error::PackmatrixError;
use packmatrix_harness::HarnessError;

/// CLI-specific error type.
///
/// `exit_code()` maps each variant to the process exit code.
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// Configuration loading or validation failure.
    #[error("configuration error: {0}")]
    Config(String),

    /// The run finished but at least one case failed.
    #[error("{0} case(s) failed")]
    CasesFailed(usize),

    /// JSON serialisation failed during output rendering.
    #[error("json output error: {0}")]
    JsonSerialize(#[from] serde_json::Error),

    /// IO error (stdout write, etc.).
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl CliError {
    /// Map the error to a process exit code.
    ///
    /// | Code | Meaning                         |
    /// |------|---------------------------------|
    /// | 0    | All cases passed or skipped     |
    /// | 1    | At least one case failed        |
    /// | 2    | Configuration error             |
    /// | 10   | IO error                        |
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Config(_) => 2,
            Self::Io(_) => 10,
            Self::CasesFailed(_) | Self::JsonSerialize(_) => 1,
        }
    }
}

impl From<PackmatrixError> for CliError {
    fn from(e: PackmatrixError) -> Self {
        match e {
            PackmatrixError::Config(err) => Self::Config(err.to_string()),
            PackmatrixError::Io(err) => Self::Io(err),
        }
    }
}

impl From<HarnessError> for CliError {
    fn from(e: HarnessError) -> Self {
        Self::Config(e.to_string())
    }
}
