//! In-memory fragment opener.

use std::io::{self, Cursor};
use std::sync::Arc;

use super::{Opener, ReadSeekClose};

/// Opener over a shared in-memory buffer.
///
/// Every `open` returns an independent cursor over the same bytes.
#[derive(Debug, Clone)]
pub struct InMemoryFragment {
    id: String,
    data: Arc<[u8]>,
}

impl InMemoryFragment {
    /// Create a new in-memory fragment with the given data.
    pub fn new(id: impl Into<String>, data: impl Into<Arc<[u8]>>) -> Self {
        Self {
            id: id.into(),
            data: data.into(),
        }
    }

    /// Create a new in-memory fragment from a string.
    pub fn from_string(id: impl Into<String>, data: impl Into<String>) -> Self {
        Self::new(id, data.into().into_bytes())
    }

    /// Length of the fragment in bytes.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

impl Opener for InMemoryFragment {
    fn id(&self) -> &str {
        &self.id
    }

    fn open(&self) -> io::Result<Box<dyn ReadSeekClose>> {
        Ok(Box::new(Cursor::new(Arc::clone(&self.data))))
    }
}
