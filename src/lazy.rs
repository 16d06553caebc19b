//! Lazy composition over fragment openers.
//!
//! A [`MultiOpener`] measures its fragments once and can then hand out any
//! number of independent [`MultiOpenerReader`]s. A reader holds at most one
//! fragment source open at a time: moving to another fragment closes the
//! current source before the next one is opened.

use std::fmt;
use std::io::{self, Read, Seek, SeekFrom};
use std::sync::Arc;

use crate::io::{Opener, ReadSeekClose, probe_size};
use crate::seek::{FragmentLayout, resolve_position};

#[derive(Debug)]
struct Fragments {
    openers: Vec<Arc<dyn Opener>>,
    layout: FragmentLayout,
}

/// An [`Opener`] that concatenates other openers.
#[derive(Debug, Clone)]
pub struct MultiOpener {
    id: String,
    fragments: Arc<Fragments>,
}

impl MultiOpener {
    /// Compose `openers` in order, probing each fragment's size.
    ///
    /// Each fragment is opened, measured and closed; no source is kept. The
    /// first probe failure aborts construction.
    pub fn new(openers: Vec<Arc<dyn Opener>>) -> io::Result<Self> {
        let mut sizes = Vec::with_capacity(openers.len());
        for opener in &openers {
            sizes.push(probe_size(opener.as_ref())?);
        }
        Self::with_sizes(openers, sizes)
    }

    pub(crate) fn with_sizes(openers: Vec<Arc<dyn Opener>>, sizes: Vec<u64>) -> io::Result<Self> {
        debug_assert_eq!(openers.len(), sizes.len());
        let layout = FragmentLayout::from_sizes(sizes)?;
        tracing::debug!(
            fragments = layout.len(),
            size = layout.total_size(),
            "composed lazy opener"
        );
        Ok(Self {
            id: "multi".into(),
            fragments: Arc::new(Fragments { openers, layout }),
        })
    }

    /// Set the identifier reported when this opener is itself a fragment.
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    /// Total logical size.
    pub fn size(&self) -> u64 {
        self.fragments.layout.total_size()
    }

    pub fn fragment_count(&self) -> usize {
        self.fragments.openers.len()
    }

    pub fn fragment_sizes(&self) -> Vec<u64> {
        self.fragments.layout.sizes().collect()
    }

    /// Open a reader positioned at offset 0.
    ///
    /// The first fragment holding data is opened right away. Leading
    /// zero-length fragments own no offsets and are skipped, so
    /// `active_fragment()` may report a later index than 0; with no data at
    /// all nothing is opened.
    pub fn open_reader(&self) -> io::Result<MultiOpenerReader> {
        let mut reader = MultiOpenerReader {
            fragments: Arc::clone(&self.fragments),
            current: None,
            index: 0,
            offset: 0,
            closed: false,
        };
        reader.reacquire()?;
        Ok(reader)
    }
}

impl Opener for MultiOpener {
    fn id(&self) -> &str {
        &self.id
    }

    fn open(&self) -> io::Result<Box<dyn ReadSeekClose>> {
        Ok(Box::new(self.open_reader()?))
    }
}

/// A single logical stream that opens fragments on demand.
///
/// If a fragment transition fails, the stream is left without an open
/// source; the next `read` reopens the fragment that owns the current offset.
pub struct MultiOpenerReader {
    fragments: Arc<Fragments>,
    current: Option<Box<dyn ReadSeekClose>>,
    index: usize,
    offset: u64,
    closed: bool,
}

impl MultiOpenerReader {
    /// Probe `openers` and open a reader over them.
    pub fn new(openers: Vec<Arc<dyn Opener>>) -> io::Result<Self> {
        MultiOpener::new(openers)?.open_reader()
    }

    /// Total logical size.
    pub fn size(&self) -> u64 {
        self.fragments.layout.total_size()
    }

    /// Current logical offset. May exceed `size()` after a seek.
    pub fn position(&self) -> u64 {
        self.offset
    }

    pub fn fragment_count(&self) -> usize {
        self.fragments.openers.len()
    }

    /// Index of the fragment whose source is currently open, if any.
    pub fn active_fragment(&self) -> Option<usize> {
        self.current.as_ref().map(|_| self.index)
    }

    fn ensure_open(&self) -> io::Result<()> {
        if self.closed {
            return Err(io::Error::other("stream is closed"));
        }
        Ok(())
    }

    /// Close the current source, if any. The slot is cleared before the
    /// close is attempted, so a failing close never leaves a stale handle.
    fn close_current(&mut self) -> io::Result<()> {
        match self.current.take() {
            Some(mut source) => {
                tracing::trace!(fragment = self.index, "closing fragment");
                source.close()
            }
            None => Ok(()),
        }
    }

    /// Open the fragment owning the current offset and seek it into place.
    ///
    /// At or beyond the end nothing is opened.
    fn reacquire(&mut self) -> io::Result<()> {
        debug_assert!(self.current.is_none());
        let Some((index, local)) = self.fragments.layout.locate(self.offset) else {
            self.index = self.fragments.openers.len();
            return Ok(());
        };
        self.index = index;
        let opener = &self.fragments.openers[index];
        let mut source = opener.open()?;
        if let Err(e) = source.seek(SeekFrom::Start(local)) {
            if let Err(close_err) = source.close() {
                tracing::warn!(
                    fragment = opener.id(),
                    error = %close_err,
                    "failed to close fragment after a failed seek"
                );
            }
            return Err(e);
        }
        tracing::trace!(fragment = opener.id(), index, local, "opened fragment");
        self.current = Some(source);
        Ok(())
    }

    /// Move from the exhausted current fragment to `next`.
    fn advance(&mut self, next: usize) -> io::Result<()> {
        self.close_current()?;
        let opener = &self.fragments.openers[next];
        let source = opener.open()?;
        tracing::trace!(from = self.index, to = next, fragment = opener.id(), "switched fragment");
        self.index = next;
        self.current = Some(source);
        Ok(())
    }
}

impl Read for MultiOpenerReader {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.ensure_open()?;
        if buf.is_empty() {
            return Ok(0);
        }
        loop {
            if self.current.is_none() {
                self.reacquire()?;
            }
            let Some(source) = self.current.as_mut() else {
                return Ok(0);
            };
            let n = source.read(buf)?;
            if n > 0 {
                self.offset += n as u64;
                return Ok(n);
            }
            let Some(next) = self.fragments.layout.next_non_empty(self.index) else {
                return Ok(0);
            };
            self.advance(next)?;
        }
    }
}

impl Seek for MultiOpenerReader {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        self.ensure_open()?;
        let target = resolve_position(pos, self.offset, self.size())?;
        self.offset = target;
        self.close_current()?;
        self.reacquire()?;
        Ok(target)
    }

    fn stream_position(&mut self) -> io::Result<u64> {
        Ok(self.offset)
    }
}

impl ReadSeekClose for MultiOpenerReader {
    /// Close the currently open fragment source, if any.
    fn close(&mut self) -> io::Result<()> {
        self.closed = true;
        self.close_current()
    }
}

impl Drop for MultiOpenerReader {
    fn drop(&mut self) {
        if let Err(e) = self.close_current() {
            tracing::warn!(fragment = self.index, error = %e, "failed to close fragment on drop");
        }
    }
}

impl fmt::Debug for MultiOpenerReader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MultiOpenerReader")
            .field("layout", &self.fragments.layout)
            .field("index", &self.index)
            .field("offset", &self.offset)
            .field("open", &self.current.is_some())
            .field("closed", &self.closed)
            .finish()
    }
}
