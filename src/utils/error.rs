use serde::Serialize;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CompileError {
    #[error("Source file not found: {}", path.display())]
    NotFound { path: PathBuf },

    #[error("Compilation timeout ({seconds} seconds exceeded)")]
    Timeout { seconds: u64 },

    #[error("Compilation failed: {diagnostics}")]
    CompilerFailed {
        exit_code: Option<i32>,
        diagnostics: String,
    },

    #[error("Compiled file not found after successful compilation: {}", expected.display())]
    MissingOutput { expected: PathBuf },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error in {field}: {message}")]
    Config { field: String, message: String },

    #[error("Invalid request field {field}: {reason}")]
    InvalidRequest { field: String, reason: String },
}

/// Stable tag for each failure, serialized into the report as `error_kind`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    NotFound,
    Timeout,
    CompilerFailed,
    MissingOutput,
    Io,
    Config,
    InvalidRequest,
}

impl CompileError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            CompileError::NotFound { .. } => ErrorKind::NotFound,
            CompileError::Timeout { .. } => ErrorKind::Timeout,
            CompileError::CompilerFailed { .. } => ErrorKind::CompilerFailed,
            CompileError::MissingOutput { .. } => ErrorKind::MissingOutput,
            CompileError::Io(_) => ErrorKind::Io,
            CompileError::Config { .. } => ErrorKind::Config,
            CompileError::InvalidRequest { .. } => ErrorKind::InvalidRequest,
        }
    }

    /// Short summary placed in the report's `message` field.
    pub fn summary(&self) -> &'static str {
        match self {
            CompileError::Timeout { .. } => "Compilation process took too long",
            _ => "Compilation failed",
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            CompileError::NotFound { .. } => {
                "Check the source path or the EA_STORAGE_PATH directory"
            }
            CompileError::Timeout { .. } => {
                "Raise EA_COMPILE_TIMEOUT_SECS or check that the compiler is not waiting for input"
            }
            CompileError::CompilerFailed { .. } => "Fix the diagnostics reported by the compiler",
            CompileError::MissingOutput { .. } => {
                "Verify that the compiler writes its artifact next to the source file"
            }
            CompileError::Io(_) => "Check permissions on the source and output directories",
            CompileError::Config { .. } => {
                "Check MQL5_COMPILER_PATH, EA_STORAGE_PATH, COMPILED_EA_PATH or the config file"
            }
            CompileError::InvalidRequest { .. } => {
                "Use a product id made of plain file name characters"
            }
        }
    }
}

pub type Result<T> = std::result::Result<T, CompileError>;
