//! Eager composition over already-open fragment sources.

use std::io::{self, Read, Seek, SeekFrom};

use crate::error::{ErrorPolicy, fold_close_errors};
use crate::io::{ReadSeekClose, measure};
use crate::seek::{FragmentLayout, resolve_position};

/// A single logical stream over already-open fragment sources.
///
/// Every source stays open for the lifetime of the stream and is closed by
/// [`ReadSeekClose::close`]. Reads switch to the next fragment when the active
/// one is exhausted; a single `read` call returns bytes from one fragment only.
pub struct MultiReadSeeker<S = Box<dyn ReadSeekClose>> {
    sources: Vec<S>,
    layout: FragmentLayout,
    index: usize,
    offset: u64,
    close_policy: ErrorPolicy,
}

impl<S: ReadSeekClose> MultiReadSeeker<S> {
    /// Compose `sources` in order.
    ///
    /// Each source is measured by seeking to its end and back to its start.
    /// The first failing seek is returned unchanged; sources are then dropped
    /// without being closed.
    pub fn new(mut sources: Vec<S>) -> io::Result<Self> {
        let mut sizes = Vec::with_capacity(sources.len());
        for (index, source) in sources.iter_mut().enumerate() {
            let size = measure(source).inspect_err(|e| {
                tracing::debug!(fragment = index, error = %e, "failed to measure fragment");
            })?;
            sizes.push(size);
        }
        Self::with_sizes(sources, sizes)
    }

    /// Compose sources whose sizes are already known and which are positioned
    /// at their start.
    pub(crate) fn with_sizes(sources: Vec<S>, sizes: Vec<u64>) -> io::Result<Self> {
        debug_assert_eq!(sources.len(), sizes.len());
        let layout = FragmentLayout::from_sizes(sizes)?;
        let index = first_index(&layout);
        tracing::debug!(
            fragments = layout.len(),
            size = layout.total_size(),
            "composed eager stream"
        );
        Ok(Self {
            sources,
            layout,
            index,
            offset: 0,
            close_policy: ErrorPolicy::default(),
        })
    }

    /// Choose how `close` reacts to a failing fragment.
    ///
    /// `Accumulate` (the default) closes every fragment and reports all
    /// failures; `FastFail` stops at the first one, leaving later fragments
    /// open.
    pub fn with_close_policy(mut self, policy: ErrorPolicy) -> Self {
        self.close_policy = policy;
        self
    }

    /// Total logical size.
    pub fn size(&self) -> u64 {
        self.layout.total_size()
    }

    /// Current logical offset. May exceed `size()` after a seek.
    pub fn position(&self) -> u64 {
        self.offset
    }

    pub fn fragment_count(&self) -> usize {
        self.sources.len()
    }

    pub fn fragment_sizes(&self) -> Vec<u64> {
        self.layout.sizes().collect()
    }

    /// Index of the fragment serving the next read, if any.
    pub fn active_fragment(&self) -> Option<usize> {
        (self.index < self.sources.len()).then_some(self.index)
    }

    /// Give the sources back without closing them.
    pub fn into_inner(self) -> Vec<S> {
        self.sources
    }
}

fn first_index(layout: &FragmentLayout) -> usize {
    layout.locate(0).map_or(layout.len(), |(index, _)| index)
}

impl<S: ReadSeekClose> Read for MultiReadSeeker<S> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if buf.is_empty() {
            return Ok(0);
        }
        loop {
            let Some(source) = self.sources.get_mut(self.index) else {
                return Ok(0);
            };
            let n = source.read(buf)?;
            if n > 0 {
                self.offset += n as u64;
                return Ok(n);
            }
            let Some(next) = self.layout.next_non_empty(self.index) else {
                return Ok(0);
            };
            self.sources[next].seek(SeekFrom::Start(0))?;
            tracing::trace!(from = self.index, to = next, "switched fragment");
            self.index = next;
        }
    }
}

impl<S: ReadSeekClose> Seek for MultiReadSeeker<S> {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        let target = resolve_position(pos, self.offset, self.size())?;
        self.index = match self.layout.locate(target) {
            Some((index, local)) => {
                self.sources[index].seek(SeekFrom::Start(local))?;
                index
            }
            None => self.sources.len(),
        };
        self.offset = target;
        tracing::trace!(offset = target, fragment = self.index, "seeked");
        Ok(target)
    }

    fn stream_position(&mut self) -> io::Result<u64> {
        Ok(self.offset)
    }
}

impl<S: ReadSeekClose> ReadSeekClose for MultiReadSeeker<S> {
    /// Close every fragment source in order, following the close policy.
    fn close(&mut self) -> io::Result<()> {
        let mut errors = Vec::new();
        for (index, source) in self.sources.iter_mut().enumerate() {
            if let Err(e) = source.close() {
                tracing::warn!(fragment = index, error = %e, "failed to close fragment");
                errors.push((index, e));
                if self.close_policy == ErrorPolicy::FastFail {
                    break;
                }
            }
        }
        fold_close_errors(errors)
    }
}

impl<S> std::fmt::Debug for MultiReadSeeker<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MultiReadSeeker")
            .field("layout", &self.layout)
            .field("index", &self.index)
            .field("offset", &self.offset)
            .field("close_policy", &self.close_policy)
            .finish_non_exhaustive()
    }
}
