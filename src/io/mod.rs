//! Fragment source abstractions.
//!
//! This module provides:
//! - `ReadSeekClose`: Trait for open, seekable, closable byte sources
//! - `Opener`: Trait for factories that open fragment sources on demand
//! - `OpenFn` and `probe_size`: Closure adapter and size probing for openers
//! - File and in-memory openers, plus `RangedSource` and `NopClose` adapters

mod file;
mod memory;
mod opener;
mod source;

pub use file::FileFragment;
pub use memory::InMemoryFragment;
pub use opener::{OpenFn, Opener, probe_size};
pub use source::{NopClose, RangedSource, ReadSeekClose};

pub(crate) use source::measure;
