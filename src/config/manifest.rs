//! Fragment manifests describing a composed stream.

use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

/// Description of a composed stream: which fragments, in what order, and how
/// to hold them.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ManifestConfig {
    /// Fragment descriptions, in logical order
    #[serde(default)]
    pub fragments: Vec<FragmentConfig>,
    /// Strategy: "eager" or "lazy"
    #[serde(default)]
    pub strategy: Option<String>,
    /// Error policy: "fast_fail" or "accumulate"
    #[serde(default)]
    pub error_policy: Option<String>,
    /// Directory relative file paths are resolved against
    #[serde(default)]
    pub base_dir: Option<String>,
}

/// Configuration for a single fragment.
#[derive(Debug, Clone, Deserialize)]
pub struct FragmentConfig {
    /// Identifier used in errors; defaults to the path or `inline #N`
    #[serde(default)]
    pub id: Option<String>,
    /// Kind of fragment: "file" or "inline"
    pub kind: String,
    /// File path (for file fragments)
    #[serde(default)]
    pub path: Option<String>,
    /// Start of the byte range inside the file (for file fragments)
    #[serde(default)]
    pub offset: Option<u64>,
    /// Length of the byte range inside the file (for file fragments)
    #[serde(default)]
    pub length: Option<u64>,
    /// Literal content (for inline fragments)
    #[serde(default)]
    pub data: Option<String>,
}

impl ManifestConfig {
    /// Create a new empty manifest.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a fragment description.
    pub fn add_fragment(mut self, fragment: FragmentConfig) -> Self {
        self.fragments.push(fragment);
        self
    }

    /// Set the strategy.
    pub fn with_strategy(mut self, strategy: impl Into<String>) -> Self {
        self.strategy = Some(strategy.into());
        self
    }

    /// Set the error policy.
    pub fn with_error_policy(mut self, policy: impl Into<String>) -> Self {
        self.error_policy = Some(policy.into());
        self
    }

    /// Set the base directory for relative paths.
    pub fn with_base_dir(mut self, dir: impl Into<String>) -> Self {
        self.base_dir = Some(dir.into());
        self
    }

    /// Parse a manifest from bytes in the given format.
    pub fn from_slice(format: ManifestFormat, bytes: &[u8]) -> Result<Self, ManifestError> {
        match format {
            #[cfg(feature = "json")]
            ManifestFormat::Json => {
                serde_json::from_slice(bytes).map_err(|e| ManifestError::Serde(Box::new(e)))
            }

            #[cfg(feature = "yaml")]
            ManifestFormat::Yaml => {
                serde_yaml::from_slice(bytes).map_err(|e| ManifestError::Serde(Box::new(e)))
            }

            #[cfg(feature = "toml")]
            ManifestFormat::Toml => {
                let s = std::str::from_utf8(bytes).map_err(|e| ManifestError::Serde(Box::new(e)))?;
                toml::from_str(s).map_err(|e| ManifestError::Serde(Box::new(e)))
            }

            #[allow(unreachable_patterns)]
            _ => Err(ManifestError::NotEnabled(format)),
        }
    }

    /// Read a manifest file, inferring its format from the extension.
    ///
    /// When the manifest sets no `base_dir`, relative fragment paths resolve
    /// against the manifest's own directory.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ManifestError> {
        let path = path.as_ref();
        let ext = path
            .extension()
            .and_then(|s| s.to_str())
            .unwrap_or_default();
        let format = ManifestFormat::from_extension(ext)
            .ok_or_else(|| ManifestError::UnknownFormat(ext.to_string()))?;

        let bytes = std::fs::read(path)?;
        let mut config = Self::from_slice(format, &bytes)?;
        if config.base_dir.is_none() {
            config.base_dir = path
                .parent()
                .map(|dir| dir.to_string_lossy().into_owned());
        }
        Ok(config)
    }
}

impl FragmentConfig {
    /// A fragment covering a whole file.
    pub fn file(path: impl Into<String>) -> Self {
        Self {
            id: None,
            kind: "file".into(),
            path: Some(path.into()),
            offset: None,
            length: None,
            data: None,
        }
    }

    /// A fragment with literal content.
    pub fn inline(data: impl Into<String>) -> Self {
        Self {
            id: None,
            kind: "inline".into(),
            path: None,
            offset: None,
            length: None,
            data: Some(data.into()),
        }
    }

    /// Set the identifier.
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Restrict a file fragment to `length` bytes starting at `offset`.
    pub fn with_range(mut self, offset: u64, length: u64) -> Self {
        self.offset = Some(offset);
        self.length = Some(length);
        self
    }
}

/// Serialization formats a manifest can be written in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ManifestFormat {
    Json,
    Yaml,
    Toml,
}

impl std::fmt::Display for ManifestFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ManifestFormat::Json => write!(f, "json"),
            ManifestFormat::Yaml => write!(f, "yaml"),
            ManifestFormat::Toml => write!(f, "toml"),
        }
    }
}

impl ManifestFormat {
    /// Parse a format from its name.
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "json" => Some(ManifestFormat::Json),
            "yaml" | "yml" => Some(ManifestFormat::Yaml),
            "toml" => Some(ManifestFormat::Toml),
            _ => None,
        }
    }

    /// Find the format whose extensions include `ext`.
    pub fn from_extension(ext: &str) -> Option<Self> {
        let ext = ext.to_ascii_lowercase();
        [ManifestFormat::Json, ManifestFormat::Yaml, ManifestFormat::Toml]
            .into_iter()
            .find(|f| f.extensions().contains(&ext.as_str()))
    }

    /// Get file extensions for this format.
    pub fn extensions(&self) -> &'static [&'static str] {
        match self {
            ManifestFormat::Json => &["json"],
            ManifestFormat::Yaml => &["yaml", "yml"],
            ManifestFormat::Toml => &["toml"],
        }
    }

    /// Check if this format is available (feature enabled).
    pub fn is_available(&self) -> bool {
        match self {
            ManifestFormat::Json => cfg!(feature = "json"),
            ManifestFormat::Yaml => cfg!(feature = "yaml"),
            ManifestFormat::Toml => cfg!(feature = "toml"),
        }
    }
}

/// Errors that can occur while loading a manifest.
#[derive(Debug, Error)]
pub enum ManifestError {
    /// The file extension does not name a known format
    #[error("Unknown manifest format: {0:?}")]
    UnknownFormat(String),

    /// Format feature not enabled
    #[error("Manifest format '{0}' is not enabled. Enable the corresponding feature.")]
    NotEnabled(ManifestFormat),

    /// I/O error while reading the manifest
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Deserialization error
    #[error("Serde error: {0}")]
    Serde(Box<dyn std::error::Error + Send + Sync>),
}
