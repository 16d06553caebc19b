//! A composed stream built by either strategy.

use std::fmt;
use std::io::{self, Read, Seek, SeekFrom};
use std::str::FromStr;

use crate::eager::MultiReadSeeker;
use crate::io::ReadSeekClose;
use crate::lazy::MultiOpenerReader;

/// How fragment sources are held while the stream is in use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Strategy {
    /// Open every fragment up front and keep them all open
    Eager,
    /// Keep at most one fragment open, reopening on demand
    #[default]
    Lazy,
}

impl FromStr for Strategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "eager" => Ok(Strategy::Eager),
            "lazy" => Ok(Strategy::Lazy),
            other => Err(format!("unknown strategy: {other}")),
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Strategy::Eager => write!(f, "eager"),
            Strategy::Lazy => write!(f, "lazy"),
        }
    }
}

/// The stream produced by [`MultiseekBuilder`](crate::MultiseekBuilder).
#[derive(Debug)]
pub enum ComposedStream {
    Eager(MultiReadSeeker),
    Lazy(MultiOpenerReader),
}

impl ComposedStream {
    pub fn strategy(&self) -> Strategy {
        match self {
            ComposedStream::Eager(_) => Strategy::Eager,
            ComposedStream::Lazy(_) => Strategy::Lazy,
        }
    }

    /// Total logical size.
    pub fn size(&self) -> u64 {
        match self {
            ComposedStream::Eager(s) => s.size(),
            ComposedStream::Lazy(s) => s.size(),
        }
    }

    /// Current logical offset.
    pub fn position(&self) -> u64 {
        match self {
            ComposedStream::Eager(s) => s.position(),
            ComposedStream::Lazy(s) => s.position(),
        }
    }

    pub fn fragment_count(&self) -> usize {
        match self {
            ComposedStream::Eager(s) => s.fragment_count(),
            ComposedStream::Lazy(s) => s.fragment_count(),
        }
    }
}

impl Read for ComposedStream {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match self {
            ComposedStream::Eager(s) => s.read(buf),
            ComposedStream::Lazy(s) => s.read(buf),
        }
    }
}

impl Seek for ComposedStream {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        match self {
            ComposedStream::Eager(s) => s.seek(pos),
            ComposedStream::Lazy(s) => s.seek(pos),
        }
    }

    fn stream_position(&mut self) -> io::Result<u64> {
        Ok(self.position())
    }
}

impl ReadSeekClose for ComposedStream {
    fn close(&mut self) -> io::Result<()> {
        match self {
            ComposedStream::Eager(s) => s.close(),
            ComposedStream::Lazy(s) => s.close(),
        }
    }
}
