//! Fragment specifications.

use std::sync::Arc;

use crate::io::Opener;

/// Specification for a single fragment.
#[derive(Debug, Clone)]
pub struct FragmentSpec {
    /// Raw fragment argument or manifest identifier
    pub raw: String,
    /// The opener producing this fragment's source
    pub opener: Arc<dyn Opener>,
}

impl FragmentSpec {
    /// Create a new fragment specification.
    pub fn new(raw: impl Into<String>, opener: Arc<dyn Opener>) -> Self {
        Self {
            raw: raw.into(),
            opener,
        }
    }

    /// Create a specification named after the opener's own id.
    pub fn from_opener(opener: Arc<dyn Opener>) -> Self {
        Self {
            raw: opener.id().to_string(),
            opener,
        }
    }
}
