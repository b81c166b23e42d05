//! Swiftcheck Common Library
//!
//! Test case model and fixture loading shared by the orchestration engine
//! and the command-line runner.

pub mod error;
pub mod fixture;
pub mod types;

pub use error::{LoadError, Result};
pub use fixture::{CaseLoader, FixtureFormat};
pub use types::*;

/// Swiftcheck version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
