use crate::utils::error::{CompileError, ErrorKind};
use serde::Serialize;
use std::path::PathBuf;

/// Extension of the artifact the external compiler writes.
pub const ARTIFACT_EXTENSION: &str = "ex5";

#[derive(Debug, Clone)]
pub struct CompileRequest {
    pub source_path: PathBuf,
    pub product_id: String,
    pub license_key: Option<String>,
}

impl CompileRequest {
    pub fn new(source_path: impl Into<PathBuf>, product_id: impl Into<String>) -> Self {
        Self {
            source_path: source_path.into(),
            product_id: product_id.into(),
            license_key: None,
        }
    }

    pub fn with_license_key(mut self, license_key: impl Into<String>) -> Self {
        self.license_key = Some(license_key.into());
        self
    }
}

/// What a single run of the external compiler reported.
#[derive(Debug, Clone, Default)]
pub struct CompilerOutput {
    pub exit_code: Option<i32>,
    pub success: bool,
    pub stdout: String,
    pub stderr: String,
}

impl CompilerOutput {
    /// Diagnostics to surface on failure; some compilers only write to stdout.
    pub fn diagnostics(&self) -> String {
        let stderr = self.stderr.trim();
        if stderr.is_empty() {
            self.stdout.trim().to_string()
        } else {
            stderr.to_string()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LicenseInjection {
    Injected { path: PathBuf },
    Skipped { original: PathBuf, reason: String },
}

impl LicenseInjection {
    /// The source file that should be handed to the compiler.
    pub fn compile_source(&self) -> &PathBuf {
        match self {
            LicenseInjection::Injected { path } => path,
            LicenseInjection::Skipped { original, .. } => original,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompiledArtifact {
    pub path: PathBuf,
    pub filename: String,
}

/// JSON document printed on stdout for every invocation.
#[derive(Debug, Clone, Serialize)]
pub struct CompileReport {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub compiled_path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_kind: Option<ErrorKind>,
    pub message: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

impl CompileReport {
    pub fn succeeded(artifact: CompiledArtifact, warnings: Vec<String>) -> Self {
        Self {
            success: true,
            compiled_path: Some(artifact.path.display().to_string()),
            filename: Some(artifact.filename),
            error: None,
            error_kind: None,
            message: "Compilation successful".to_string(),
            warnings,
        }
    }

    pub fn failed(error: &CompileError, warnings: Vec<String>) -> Self {
        Self {
            success: false,
            compiled_path: None,
            filename: None,
            error: Some(error.to_string()),
            error_kind: Some(error.kind()),
            message: error.summary().to_string(),
            warnings,
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}
