//! Tests for manifest parsing and format detection.

use crate::config::{ManifestConfig, ManifestError, ManifestFormat};

#[test]
fn format_from_name_and_extension() {
    assert_eq!(ManifestFormat::from_str("JSON"), Some(ManifestFormat::Json));
    assert_eq!(ManifestFormat::from_str("yml"), Some(ManifestFormat::Yaml));
    assert_eq!(ManifestFormat::from_str("ini"), None);

    assert_eq!(ManifestFormat::from_extension("toml"), Some(ManifestFormat::Toml));
    assert_eq!(ManifestFormat::from_extension("YAML"), Some(ManifestFormat::Yaml));
    assert_eq!(ManifestFormat::from_extension("txt"), None);
    assert_eq!(ManifestFormat::Yaml.to_string(), "yaml");
}

#[test]
fn format_availability_follows_features() {
    assert_eq!(ManifestFormat::Json.is_available(), cfg!(feature = "json"));
    assert_eq!(ManifestFormat::Yaml.is_available(), cfg!(feature = "yaml"));
    assert_eq!(ManifestFormat::Toml.is_available(), cfg!(feature = "toml"));
}

#[test]
fn unknown_extension_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("manifest.ini");
    std::fs::write(&path, "fragments = []").unwrap();

    let err = ManifestConfig::from_path(&path).unwrap_err();
    assert!(matches!(err, ManifestError::UnknownFormat(ref ext) if ext == "ini"));
}

#[cfg(feature = "json")]
mod json {
    use super::*;

    #[test]
    fn parse_json_manifest() {
        let raw = br#"{
            "strategy": "eager",
            "error_policy": "fast_fail",
            "fragments": [
                { "kind": "file", "path": "a.bin", "offset": 4, "length": 8 },
                { "kind": "inline", "id": "greeting", "data": "hi" }
            ]
        }"#;

        let config = ManifestConfig::from_slice(ManifestFormat::Json, raw).unwrap();

        assert_eq!(config.strategy.as_deref(), Some("eager"));
        assert_eq!(config.error_policy.as_deref(), Some("fast_fail"));
        assert_eq!(config.fragments.len(), 2);
        assert_eq!(config.fragments[0].path.as_deref(), Some("a.bin"));
        assert_eq!(config.fragments[0].offset, Some(4));
        assert_eq!(config.fragments[0].length, Some(8));
        assert_eq!(config.fragments[1].id.as_deref(), Some("greeting"));
        assert!(config.base_dir.is_none());
    }

    #[test]
    fn missing_kind_is_a_serde_error() {
        let raw = br#"{ "fragments": [ { "path": "a.bin" } ] }"#;

        let err = ManifestConfig::from_slice(ManifestFormat::Json, raw).unwrap_err();
        assert!(matches!(err, ManifestError::Serde(_)));
    }

    #[test]
    fn from_path_defaults_base_dir_to_manifest_dir() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("parts.json");
        std::fs::write(&path, r#"{ "fragments": [] }"#).unwrap();

        let config = ManifestConfig::from_path(&path).unwrap();
        assert_eq!(
            config.base_dir.as_deref(),
            Some(dir.path().to_string_lossy().as_ref())
        );
    }

    #[test]
    fn from_path_keeps_explicit_base_dir() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("parts.json");
        std::fs::write(&path, r#"{ "base_dir": "/data/shards" }"#).unwrap();

        let config = ManifestConfig::from_path(&path).unwrap();
        assert_eq!(config.base_dir.as_deref(), Some("/data/shards"));
        assert!(config.fragments.is_empty());
    }

    #[test]
    fn missing_manifest_is_an_io_error() {
        let dir = tempfile::tempdir().unwrap();

        let err = ManifestConfig::from_path(dir.path().join("absent.json")).unwrap_err();
        assert!(matches!(err, ManifestError::Io(_)));
    }
}

#[cfg(feature = "toml")]
#[test]
fn parse_toml_manifest() {
    let raw = br#"
        strategy = "lazy"

        [[fragments]]
        kind = "inline"
        data = "abc"
    "#;

    let config = ManifestConfig::from_slice(ManifestFormat::Toml, raw).unwrap();
    assert_eq!(config.fragments.len(), 1);
    assert_eq!(config.fragments[0].data.as_deref(), Some("abc"));
}

#[cfg(not(feature = "yaml"))]
#[test]
fn disabled_format_is_reported() {
    let err = ManifestConfig::from_slice(ManifestFormat::Yaml, b"fragments: []").unwrap_err();
    assert!(matches!(err, ManifestError::NotEnabled(ManifestFormat::Yaml)));
}
