//! The build graph as described by GN: a project with its targets.
//!
//! Generators consume this model; loading it from GN's JSON output happens
//! elsewhere.

mod paths;
pub use paths::relative_path;

mod project;
pub use project::Project;

mod target;
pub use target::{BundleData, Target, TargetType};
