//! Test helpers shared across rcstack crates.

pub mod fixtures;
pub mod glob;
pub mod module;

pub use fixtures::{FixtureTree, sample_tree};
pub use glob::{GlobCall, StaticGlobService};
pub use module::StubModuleLoader;
