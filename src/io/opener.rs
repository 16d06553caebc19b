//! Opener trait definition and helpers.

use std::fmt;
use std::io::{self, SeekFrom};

use super::ReadSeekClose;

/// Factory for fragment sources.
///
/// Implementors produce a fresh, independently seekable source each time
/// `open` is called, such as a file, a network range or an in-memory buffer.
pub trait Opener: Send + Sync + fmt::Debug {
    /// Returns an identifier for this fragment.
    ///
    /// This is used for error messages and logging.
    fn id(&self) -> &str;

    /// Open and return a new source positioned at its start.
    fn open(&self) -> io::Result<Box<dyn ReadSeekClose>>;
}

/// Lets a plain closure act as an `Opener`.
///
/// ```rust,ignore
/// let opener = OpenFn::new(|| Ok(Box::new(std::fs::File::open("part-0")?) as Box<dyn ReadSeekClose>));
/// ```
pub struct OpenFn<F> {
    id: String,
    f: F,
}

impl<F> OpenFn<F>
where
    F: Fn() -> io::Result<Box<dyn ReadSeekClose>> + Send + Sync,
{
    pub fn new(f: F) -> Self {
        Self {
            id: "fn".into(),
            f,
        }
    }

    /// Set the identifier reported in errors and logs.
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }
}

impl<F> fmt::Debug for OpenFn<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OpenFn").field("id", &self.id).finish_non_exhaustive()
    }
}

impl<F> Opener for OpenFn<F>
where
    F: Fn() -> io::Result<Box<dyn ReadSeekClose>> + Send + Sync,
{
    fn id(&self) -> &str {
        &self.id
    }

    fn open(&self) -> io::Result<Box<dyn ReadSeekClose>> {
        (self.f)()
    }
}

/// Measure the size of the fragment behind `opener`.
///
/// The fragment is opened, seeked to its end and closed again. A failure at
/// any step is returned; the source is still closed when the seek fails.
pub fn probe_size(opener: &dyn Opener) -> io::Result<u64> {
    let mut source = opener.open()?;
    let size = match source.seek(SeekFrom::End(0)) {
        Ok(size) => size,
        Err(e) => {
            if let Err(close_err) = source.close() {
                tracing::warn!(
                    fragment = opener.id(),
                    error = %close_err,
                    "failed to close fragment after a failed size probe"
                );
            }
            return Err(e);
        }
    };
    source.close()?;
    tracing::debug!(fragment = opener.id(), size, "probed fragment size");
    Ok(size)
}
