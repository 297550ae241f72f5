//! Command implementations for the coherent CLI
//!
//! Each command has its own module/file for better organization.

pub mod evaluate;
pub mod gold;
pub mod inspect;
pub mod rerank;

// Re-export argument types for parser
pub use evaluate::EvaluateArgs;
pub use gold::GoldArgs;
pub use inspect::InspectArgs;
pub use rerank::RerankArgs;
