use crate::domain::ports::Storage;
use crate::utils::error::Result;
use std::io;
use std::path::{Path, PathBuf};
use tokio::fs;

#[derive(Debug, Clone, Default)]
pub struct LocalStorage;

impl LocalStorage {
    pub fn new() -> Self {
        Self
    }
}

impl Storage for LocalStorage {
    async fn exists(&self, path: &Path) -> bool {
        fs::try_exists(path).await.unwrap_or(false)
    }

    async fn read_to_string(&self, path: &Path) -> Result<String> {
        Ok(fs::read_to_string(path).await?)
    }

    async fn write_string(&self, path: &Path, contents: &str) -> Result<()> {
        fs::write(path, contents).await?;
        Ok(())
    }

    async fn create_dir_all(&self, path: &Path) -> Result<()> {
        fs::create_dir_all(path).await?;
        Ok(())
    }

    async fn move_file(&self, from: &Path, to: &Path) -> Result<()> {
        match fs::rename(from, to).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::CrossesDevices => {
                tracing::debug!(
                    "rename across devices, copying {} to {}",
                    from.display(),
                    to.display()
                );
                let (from, to) = (from.to_path_buf(), to.to_path_buf());
                tokio::task::spawn_blocking(move || copy_then_persist(&from, &to))
                    .await
                    .map_err(io::Error::other)??;
                Ok(())
            }
            Err(e) => Err(e.into()),
        }
    }
}

/// Copies into a temporary file inside the destination directory and renames
/// it into place, so readers never observe a half-written artifact.
fn copy_then_persist(from: &Path, to: &Path) -> io::Result<()> {
    let dir = to
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."));
    let mut staged = tempfile::NamedTempFile::new_in(dir)?;
    let mut source = std::fs::File::open(from)?;
    io::copy(&mut source, staged.as_file_mut())?;
    staged.as_file().sync_all()?;
    staged.persist(to)?;
    std::fs::remove_file(from)
}
