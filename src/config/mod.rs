#[cfg(feature = "cli")]
pub mod cli;
pub mod toml_config;

use crate::core::ConfigProvider;
use crate::utils::error::{CompileError, Result};
use crate::utils::validation::{validate_path, validate_range, Validate};
use serde::{Deserialize, Serialize};
use std::env;
use std::time::Duration;
use toml_config::TomlConfig;

pub const COMPILER_PATH_VAR: &str = "MQL5_COMPILER_PATH";
pub const EA_STORAGE_PATH_VAR: &str = "EA_STORAGE_PATH";
pub const COMPILED_PATH_VAR: &str = "COMPILED_EA_PATH";
pub const TIMEOUT_VAR: &str = "EA_COMPILE_TIMEOUT_SECS";

pub const DEFAULT_EA_STORAGE_PATH: &str = "./uploads/ea_files";
pub const DEFAULT_COMPILED_PATH: &str = "./uploads/compiled";
pub const DEFAULT_TIMEOUT_SECONDS: u64 = 60;
const MAX_TIMEOUT_SECONDS: u64 = 3600;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompilerConfig {
    pub compiler_path: String,
    pub ea_storage_path: String,
    pub compiled_path: String,
    pub timeout_seconds: u64,
}

impl Default for CompilerConfig {
    fn default() -> Self {
        Self {
            compiler_path: String::new(),
            ea_storage_path: DEFAULT_EA_STORAGE_PATH.to_string(),
            compiled_path: DEFAULT_COMPILED_PATH.to_string(),
            timeout_seconds: DEFAULT_TIMEOUT_SECONDS,
        }
    }
}

impl CompilerConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary variable source; unset
    /// variables keep their defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(path) = lookup(COMPILER_PATH_VAR) {
            config.compiler_path = path;
        }
        if let Some(path) = lookup(EA_STORAGE_PATH_VAR) {
            config.ea_storage_path = path;
        }
        if let Some(path) = lookup(COMPILED_PATH_VAR) {
            config.compiled_path = path;
        }
        if let Some(raw) = lookup(TIMEOUT_VAR) {
            config.timeout_seconds = raw.trim().parse().map_err(|e| CompileError::Config {
                field: TIMEOUT_VAR.to_string(),
                message: format!("'{}' is not a number of seconds: {}", raw, e),
            })?;
        }

        Ok(config)
    }

    /// Values present in the file win over the environment.
    pub fn merge_file(&mut self, file: &TomlConfig) {
        if let Some(compiler) = &file.compiler {
            if let Some(path) = &compiler.path {
                self.compiler_path = path.clone();
            }
            if let Some(timeout) = compiler.timeout_seconds {
                self.timeout_seconds = timeout;
            }
        }
        if let Some(storage) = &file.storage {
            if let Some(path) = &storage.ea_files {
                self.ea_storage_path = path.clone();
            }
            if let Some(path) = &storage.compiled {
                self.compiled_path = path.clone();
            }
        }
    }
}

impl ConfigProvider for CompilerConfig {
    fn compiler_path(&self) -> &str {
        &self.compiler_path
    }

    fn ea_storage_path(&self) -> &str {
        &self.ea_storage_path
    }

    fn compiled_path(&self) -> &str {
        &self.compiled_path
    }

    fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }
}

impl Validate for CompilerConfig {
    // An empty compiler path is reported when the compiler is launched, so the
    // JSON report still carries it.
    fn validate(&self) -> Result<()> {
        validate_path("storage.ea_files", &self.ea_storage_path)?;
        validate_path("storage.compiled", &self.compiled_path)?;
        validate_range(
            "compiler.timeout_seconds",
            self.timeout_seconds,
            1,
            MAX_TIMEOUT_SECONDS,
        )?;
        Ok(())
    }
}
