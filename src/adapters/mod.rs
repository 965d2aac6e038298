// Adapters layer: concrete implementations of the domain ports.

pub mod process;
pub mod storage;

pub use process::ExternalCompiler;
pub use storage::LocalStorage;
