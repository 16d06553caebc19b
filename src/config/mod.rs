//! Configuration types for composed streams.
//!
//! This module provides:
//! - `FragmentSpec`: Specification for a single fragment
//! - `ManifestConfig`: Serializable description of a complete composed stream
//! - `ManifestFormat`: Formats a manifest file can be written in

mod manifest;
mod spec;

pub use manifest::{FragmentConfig, ManifestConfig, ManifestError, ManifestFormat};
pub use spec::FragmentSpec;
