//! Command implementations for concord CLI
//!
//! Each command has its own module/file.

pub mod clusters;
pub mod score;

// Re-export argument types for parser
pub use clusters::{ClusterFormat, ClustersArgs};
pub use score::ScoreArgs;
