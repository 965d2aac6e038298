pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

pub use adapters::{ExternalCompiler, LocalStorage};
pub use config::CompilerConfig;
pub use core::orchestrator::Orchestrator;
pub use domain::model::{CompileReport, CompileRequest};
pub use utils::error::{CompileError, ErrorKind, Result};
