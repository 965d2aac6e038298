pub mod license;
pub mod orchestrator;

pub use crate::domain::model::{CompileReport, CompileRequest};
pub use crate::domain::ports::{CompilerBackend, ConfigProvider, Storage};
pub use crate::utils::error::Result;
