//! # multiseek
//!
//! Present an ordered list of byte-range fragments as one seekable stream.
//!
//! ## Overview
//!
//! multiseek reassembles a file that was split into fragments (sharded
//! storage, chunked transfers, multi-part archives) without copying the
//! fragments into a single buffer. The composed stream implements
//! `std::io::Read` and `std::io::Seek`; its size is the sum of the fragment
//! sizes and its content is their ordered concatenation.
//!
//! Two strategies are available:
//! - **Eager** ([`MultiReadSeeker`]): composes already-open sources and keeps
//!   all of them open until `close`.
//! - **Lazy** ([`MultiOpener`] / [`MultiOpenerReader`]): composes [`Opener`]s
//!   and holds at most one fragment source open at a time, closing the
//!   current fragment before opening the next.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use std::io::Read;
//! use multiseek::{MultiseekBuilder, ReadSeekClose, Strategy};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut stream = MultiseekBuilder::new()
//!         .add_file("archive.part0")
//!         .add_file("archive.part1")
//!         .with_strategy(Strategy::Lazy)
//!         .build()?;
//!
//!     let mut data = Vec::new();
//!     stream.read_to_end(&mut data)?;
//!     stream.close()?;
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Read semantics
//!
//! A single `read` call returns bytes from exactly one fragment, so a call
//! may return fewer bytes than requested at a fragment boundary. Use
//! `read_exact` or `read_to_end` to fill buffers across boundaries. `Ok(0)`
//! is only returned for an empty buffer or at the end of the logical stream.
//!
//! ## Features
//!
//! - `json` - JSON manifests (enabled by default)
//! - `yaml` - YAML manifests
//! - `toml` - TOML manifests
//! - `miette` - Pretty error reporting with miette

// Core modules
pub mod builder;
pub mod config;
pub mod eager;
pub mod error;
pub mod io;
pub mod lazy;
pub mod seek;
pub mod stream;

// Re-exports for convenience
pub use builder::MultiseekBuilder;
pub use config::{FragmentConfig, FragmentSpec, ManifestConfig, ManifestError, ManifestFormat};
pub use eager::MultiReadSeeker;
pub use error::{AggregateError, ErrorPolicy, SeekError, SingleIoError, Stage};
pub use io::{
    FileFragment, InMemoryFragment, NopClose, OpenFn, Opener, RangedSource, ReadSeekClose,
    probe_size,
};
pub use lazy::{MultiOpener, MultiOpenerReader};
pub use seek::{FragmentLayout, SeekWhence, Whence};
pub use stream::{ComposedStream, Strategy};

/// Build a composed stream from a manifest.
pub fn build_stream_from_manifest(config: ManifestConfig) -> Result<ComposedStream, AggregateError> {
    MultiseekBuilder::from_manifest(config)?.build()
}

/// Build a composed stream from a manifest, allowing the caller to further
/// customize the MultiseekBuilder before it is built, e.g. to append
/// fragments that cannot be described in a manifest.
pub fn build_stream_from_manifest_with<F>(
    config: ManifestConfig,
    customize: F,
) -> Result<ComposedStream, AggregateError>
where
    F: FnOnce(MultiseekBuilder) -> MultiseekBuilder,
{
    let builder = MultiseekBuilder::from_manifest(config)?;
    customize(builder).build()
}

#[cfg(feature = "miette")]
pub use error::IoDiagnostic;
