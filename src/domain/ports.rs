use crate::domain::model::CompilerOutput;
use crate::utils::error::Result;
use async_trait::async_trait;
use std::path::Path;
use std::time::Duration;

pub trait Storage: Send + Sync {
    fn exists(&self, path: &Path) -> impl std::future::Future<Output = bool> + Send;
    fn read_to_string(
        &self,
        path: &Path,
    ) -> impl std::future::Future<Output = Result<String>> + Send;
    fn write_string(
        &self,
        path: &Path,
        contents: &str,
    ) -> impl std::future::Future<Output = Result<()>> + Send;
    fn create_dir_all(&self, path: &Path) -> impl std::future::Future<Output = Result<()>> + Send;
    /// Moves `from` onto `to`, replacing any existing file at `to`.
    fn move_file(
        &self,
        from: &Path,
        to: &Path,
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}

pub trait ConfigProvider: Send + Sync {
    fn compiler_path(&self) -> &str;
    fn ea_storage_path(&self) -> &str;
    fn compiled_path(&self) -> &str;
    fn timeout(&self) -> Duration;
}

#[async_trait]
pub trait CompilerBackend: Send + Sync {
    /// Runs the compiler once on `source`. Exceeding `timeout` yields
    /// `CompileError::Timeout`; a non-zero exit is reported in the output,
    /// not as an error.
    async fn compile(&self, source: &Path, timeout: Duration) -> Result<CompilerOutput>;
}
