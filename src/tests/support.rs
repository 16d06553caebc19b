//! Shared fixtures: fragment splitting and instrumented sources.

use std::io::{self, Cursor, Read, Seek, SeekFrom};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use crate::io::{Opener, ReadSeekClose};

pub(crate) fn cursors(parts: &[&str]) -> Vec<Cursor<Vec<u8>>> {
    parts
        .iter()
        .map(|p| Cursor::new(p.as_bytes().to_vec()))
        .collect()
}

pub(crate) fn read_all<R: Read>(reader: &mut R) -> Vec<u8> {
    let mut out = Vec::new();
    reader.read_to_end(&mut out).expect("read_to_end");
    out
}

/// Read in `size`-byte fills, the way `io.ReadFull`-style callers do.
pub(crate) fn read_filled<R: Read>(reader: &mut R, size: usize) -> Vec<Vec<u8>> {
    let mut chunks = Vec::new();
    loop {
        let mut chunk = Vec::new();
        reader
            .by_ref()
            .take(size as u64)
            .read_to_end(&mut chunk)
            .expect("filled read");
        if chunk.is_empty() {
            return chunks;
        }
        chunks.push(chunk);
    }
}

/// Counters shared by every source opened through a [`Tracker`].
#[derive(Debug, Default)]
pub(crate) struct Tracker {
    opens: AtomicUsize,
    live: AtomicUsize,
    max_live: AtomicUsize,
    closes: AtomicUsize,
    leaked: AtomicUsize,
}

impl Tracker {
    pub(crate) fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub(crate) fn opener(self: &Arc<Self>, id: &str, data: &str) -> Arc<TrackedOpener> {
        Arc::new(TrackedOpener {
            id: id.to_string(),
            data: Arc::from(data.as_bytes()),
            tracker: Arc::clone(self),
            faults: Arc::new(Faults::default()),
        })
    }

    pub(crate) fn openers(self: &Arc<Self>, parts: &[&str]) -> Vec<Arc<TrackedOpener>> {
        parts
            .iter()
            .enumerate()
            .map(|(i, p)| self.opener(&format!("part-{i}"), p))
            .collect()
    }

    pub(crate) fn opens(&self) -> usize {
        self.opens.load(Ordering::SeqCst)
    }

    pub(crate) fn live(&self) -> usize {
        self.live.load(Ordering::SeqCst)
    }

    pub(crate) fn max_live(&self) -> usize {
        self.max_live.load(Ordering::SeqCst)
    }

    pub(crate) fn closes(&self) -> usize {
        self.closes.load(Ordering::SeqCst)
    }

    /// Sources dropped without ever being closed.
    pub(crate) fn leaked(&self) -> usize {
        self.leaked.load(Ordering::SeqCst)
    }
}

/// Failure switches shared between an opener and the sources it opens.
#[derive(Debug, Default)]
pub(crate) struct Faults {
    /// Number of upcoming `open` calls that fail
    pub(crate) failing_opens: AtomicUsize,
    pub(crate) fail_close: AtomicBool,
    pub(crate) fail_seek: AtomicBool,
}

#[derive(Debug)]
pub(crate) struct TrackedOpener {
    id: String,
    data: Arc<[u8]>,
    tracker: Arc<Tracker>,
    pub(crate) faults: Arc<Faults>,
}

impl TrackedOpener {
    pub(crate) fn fail_next_opens(&self, n: usize) {
        self.faults.failing_opens.store(n, Ordering::SeqCst);
    }

    pub(crate) fn fail_close(&self, fail: bool) {
        self.faults.fail_close.store(fail, Ordering::SeqCst);
    }

    pub(crate) fn fail_seek(&self, fail: bool) {
        self.faults.fail_seek.store(fail, Ordering::SeqCst);
    }
}

impl Opener for TrackedOpener {
    fn id(&self) -> &str {
        &self.id
    }

    fn open(&self) -> io::Result<Box<dyn ReadSeekClose>> {
        let pending = self.faults.failing_opens.load(Ordering::SeqCst);
        if pending > 0 {
            self.faults.failing_opens.store(pending - 1, Ordering::SeqCst);
            return Err(io::Error::new(
                io::ErrorKind::ConnectionRefused,
                format!("simulated open failure for {}", self.id),
            ));
        }
        let live = self.tracker.live.fetch_add(1, Ordering::SeqCst) + 1;
        self.tracker.opens.fetch_add(1, Ordering::SeqCst);
        self.tracker.max_live.fetch_max(live, Ordering::SeqCst);
        Ok(Box::new(TrackedSource {
            cursor: Cursor::new(Arc::clone(&self.data)),
            tracker: Arc::clone(&self.tracker),
            faults: Arc::clone(&self.faults),
            closed: false,
        }))
    }
}

struct TrackedSource {
    cursor: Cursor<Arc<[u8]>>,
    tracker: Arc<Tracker>,
    faults: Arc<Faults>,
    closed: bool,
}

impl Read for TrackedSource {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        assert!(!self.closed, "read after close");
        self.cursor.read(buf)
    }
}

impl Seek for TrackedSource {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        assert!(!self.closed, "seek after close");
        if self.faults.fail_seek.load(Ordering::SeqCst) {
            return Err(io::Error::other("simulated seek failure"));
        }
        self.cursor.seek(pos)
    }
}

impl ReadSeekClose for TrackedSource {
    /// The resource is released even when the close reports a failure.
    fn close(&mut self) -> io::Result<()> {
        if !self.closed {
            self.closed = true;
            self.tracker.live.fetch_sub(1, Ordering::SeqCst);
            self.tracker.closes.fetch_add(1, Ordering::SeqCst);
        }
        if self.faults.fail_close.load(Ordering::SeqCst) {
            return Err(io::Error::new(io::ErrorKind::BrokenPipe, "simulated close failure"));
        }
        Ok(())
    }
}

impl Drop for TrackedSource {
    fn drop(&mut self) {
        if !self.closed {
            self.tracker.leaked.fetch_add(1, Ordering::SeqCst);
            self.tracker.live.fetch_sub(1, Ordering::SeqCst);
        }
    }
}

/// An already-open source whose seek and close can be made to fail.
#[derive(Debug)]
pub(crate) struct FlakySource {
    cursor: Cursor<Vec<u8>>,
    pub(crate) fail_seek: bool,
    pub(crate) fail_close: bool,
    pub(crate) closed: Arc<AtomicBool>,
}

impl FlakySource {
    pub(crate) fn new(data: &str) -> Self {
        Self {
            cursor: Cursor::new(data.as_bytes().to_vec()),
            fail_seek: false,
            fail_close: false,
            closed: Arc::new(AtomicBool::new(false)),
        }
    }

    pub(crate) fn failing_close(mut self) -> Self {
        self.fail_close = true;
        self
    }

    pub(crate) fn failing_seek(mut self) -> Self {
        self.fail_seek = true;
        self
    }
}

impl Read for FlakySource {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.cursor.read(buf)
    }
}

impl Seek for FlakySource {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        if self.fail_seek {
            return Err(io::Error::new(io::ErrorKind::Unsupported, "simulated seek failure"));
        }
        self.cursor.seek(pos)
    }
}

impl ReadSeekClose for FlakySource {
    fn close(&mut self) -> io::Result<()> {
        if self.fail_close {
            return Err(io::Error::new(io::ErrorKind::BrokenPipe, "simulated close failure"));
        }
        self.closed.store(true, Ordering::SeqCst);
        Ok(())
    }
}
