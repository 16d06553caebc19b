//! Filesystem fragment opener.

use std::fs::File;
use std::io;
use std::ops::Range;
use std::path::{Path, PathBuf};

use super::{Opener, RangedSource, ReadSeekClose};

/// Opener for a file on disk, or for a byte range inside one.
#[derive(Debug, Clone)]
pub struct FileFragment {
    id: String,
    path: PathBuf,
    range: Option<Range<u64>>,
}

impl FileFragment {
    /// Create a fragment covering the whole file.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let id = path.to_string_lossy().into_owned();
        Self {
            id,
            path,
            range: None,
        }
    }

    /// Restrict the fragment to the byte range `[start, end)` of the file.
    pub fn with_range(mut self, range: Range<u64>) -> Self {
        self.id = format!(
            "{}[{}..{}]",
            self.path.to_string_lossy(),
            range.start,
            range.end
        );
        self.range = Some(range);
        self
    }

    /// Get the file path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn range(&self) -> Option<&Range<u64>> {
        self.range.as_ref()
    }
}

impl Opener for FileFragment {
    fn id(&self) -> &str {
        &self.id
    }

    fn open(&self) -> io::Result<Box<dyn ReadSeekClose>> {
        let file = File::open(&self.path)?;
        match &self.range {
            Some(range) => Ok(Box::new(RangedSource::new(file, range.clone())?)),
            None => Ok(Box::new(file)),
        }
    }
}
