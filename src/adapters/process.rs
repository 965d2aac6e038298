use crate::domain::model::CompilerOutput;
use crate::domain::ports::CompilerBackend;
use crate::utils::error::{CompileError, Result};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;

/// Flag the MetaEditor command line expects before the source path.
pub const COMPILE_FLAG: &str = "/compile";

/// Runs the configured compiler executable as a child process.
#[derive(Debug, Clone)]
pub struct ExternalCompiler {
    executable: PathBuf,
}

impl ExternalCompiler {
    pub fn new(executable: impl Into<PathBuf>) -> Self {
        Self {
            executable: executable.into(),
        }
    }
}

#[async_trait]
impl CompilerBackend for ExternalCompiler {
    async fn compile(&self, source: &Path, timeout: Duration) -> Result<CompilerOutput> {
        if self.executable.as_os_str().is_empty() {
            return Err(CompileError::Config {
                field: "compiler.path".to_string(),
                message: "compiler executable path is not set".to_string(),
            });
        }

        tracing::info!("🔧 Compiling: {}", source.display());
        tracing::debug!(
            "📍 Command: {} {} {}",
            self.executable.display(),
            COMPILE_FLAG,
            source.display()
        );

        let child = Command::new(&self.executable)
            .arg(COMPILE_FLAG)
            .arg(source)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| {
                std::io::Error::new(
                    e.kind(),
                    format!(
                        "failed to launch compiler {}: {}",
                        self.executable.display(),
                        e
                    ),
                )
            })?;

        // Dropping the wait future on expiry drops the child, which kills it.
        let output = match tokio::time::timeout(timeout, child.wait_with_output()).await {
            Ok(output) => output?,
            Err(_) => {
                tracing::warn!("⏱️ Compiler exceeded {:?}, terminating", timeout);
                return Err(CompileError::Timeout {
                    seconds: timeout.as_secs(),
                });
            }
        };

        let result = CompilerOutput {
            exit_code: output.status.code(),
            success: output.status.success(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        };

        tracing::debug!(
            "Compiler exited with {:?} (stdout {} bytes, stderr {} bytes)",
            result.exit_code,
            result.stdout.len(),
            result.stderr.len()
        );

        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_empty_executable_is_config_error() {
        let compiler = ExternalCompiler::new("");
        let err = compiler
            .compile(Path::new("strategy.mq5"), Duration::from_secs(1))
            .await
            .unwrap_err();
        assert!(matches!(err, CompileError::Config { .. }));
    }

    #[tokio::test]
    async fn test_missing_executable_is_io_error() {
        let compiler = ExternalCompiler::new("/nonexistent/metaeditor64");
        let err = compiler
            .compile(Path::new("strategy.mq5"), Duration::from_secs(1))
            .await
            .unwrap_err();
        assert!(matches!(err, CompileError::Io(_)));
        assert!(err.to_string().contains("failed to launch compiler"));
    }
}
