//! IDE project generation for GN build graphs.
//!
//! * [`model`]: the build graph consumed by the generators.
//! * [`pbx`]: the Xcode project file object model and writer.
//! * [`xcode`]: the Xcode project and workspace generator.

pub use idegen_model as model;
pub use idegen_pbx as pbx;
pub use idegen_xcode as xcode;
