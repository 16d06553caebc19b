//! Builder for creating composed streams.

use std::ops::Range;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::config::{FragmentConfig, FragmentSpec, ManifestConfig};
use crate::eager::MultiReadSeeker;
use crate::error::{AggregateError, ErrorPolicy, SingleIoError, Stage};
use crate::io::{FileFragment, InMemoryFragment, Opener, ReadSeekClose, measure, probe_size};
use crate::lazy::{MultiOpener, MultiOpenerReader};
use crate::stream::{ComposedStream, Strategy};

pub struct MultiseekBuilder {
    fragments: Vec<FragmentSpec>,
    strategy: Strategy,
    error_policy: ErrorPolicy,
    base_dir: Option<PathBuf>,
}

impl MultiseekBuilder {
    pub fn new() -> Self {
        Self {
            fragments: Vec::new(),
            strategy: Strategy::default(),
            error_policy: ErrorPolicy::Accumulate,
            base_dir: None,
        }
    }

    pub fn add_file(self, path: impl Into<PathBuf>) -> Self {
        let opener = FileFragment::new(self.resolve_path(path.into()));
        self.add_opener(Arc::new(opener))
    }

    pub fn add_file_range(self, path: impl Into<PathBuf>, range: Range<u64>) -> Self {
        let opener = FileFragment::new(self.resolve_path(path.into())).with_range(range);
        self.add_opener(Arc::new(opener))
    }

    pub fn add_bytes(self, id: impl Into<String>, data: impl Into<Arc<[u8]>>) -> Self {
        self.add_opener(Arc::new(InMemoryFragment::new(id, data)))
    }

    pub fn add_opener(mut self, opener: Arc<dyn Opener>) -> Self {
        self.fragments.push(FragmentSpec::from_opener(opener));
        self
    }

    pub fn add_fragment_spec(mut self, spec: FragmentSpec) -> Self {
        self.fragments.push(spec);
        self
    }

    pub fn with_strategy(mut self, strategy: Strategy) -> Self {
        self.strategy = strategy;
        self
    }

    /// Set the error policy.
    ///
    /// It decides whether resolve, open and probe failures are accumulated
    /// while building, and how an eager stream reacts to failing closes.
    pub fn with_error_policy(mut self, policy: ErrorPolicy) -> Self {
        self.error_policy = policy;
        self
    }

    /// Directory that relative file paths are resolved against.
    pub fn with_base_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.base_dir = Some(dir.into());
        self
    }

    pub fn fragments(&self) -> &[FragmentSpec] {
        &self.fragments
    }

    pub fn build(self) -> Result<ComposedStream, AggregateError> {
        tracing::debug!(
            fragments = self.fragments.len(),
            strategy = %self.strategy,
            "building composed stream"
        );
        match self.strategy {
            Strategy::Eager => self.build_eager().map(ComposedStream::Eager),
            Strategy::Lazy => self.build_lazy().map(ComposedStream::Lazy),
        }
    }

    fn build_eager(self) -> Result<MultiReadSeeker, AggregateError> {
        let mut sources: Vec<Box<dyn ReadSeekClose>> = Vec::with_capacity(self.fragments.len());
        let mut sizes = Vec::with_capacity(self.fragments.len());
        let mut opened = Vec::with_capacity(self.fragments.len());
        let mut errors = Vec::new();

        for spec in &self.fragments {
            match open_and_measure(spec) {
                Ok((source, size)) => {
                    sources.push(source);
                    sizes.push(size);
                    opened.push(spec.raw.as_str());
                }
                Err(e) => {
                    errors.push(e);
                    if matches!(self.error_policy, ErrorPolicy::FastFail) {
                        break;
                    }
                }
            }
        }

        if !errors.is_empty() {
            // The sources were opened here, so they are released here too.
            for (source, raw) in sources.iter_mut().zip(opened) {
                if let Err(e) = source.close() {
                    tracing::warn!(fragment = raw, error = %e, "failed to close fragment");
                }
            }
            return Err(AggregateError { errors });
        }

        MultiReadSeeker::with_sizes(sources, sizes)
            .map(|stream| stream.with_close_policy(self.error_policy))
            .map_err(|e| SingleIoError::io(Stage::Probe, "<composed>", e).into())
    }

    fn build_lazy(self) -> Result<MultiOpenerReader, AggregateError> {
        let mut openers = Vec::with_capacity(self.fragments.len());
        let mut sizes = Vec::with_capacity(self.fragments.len());
        let mut errors = Vec::new();

        for spec in self.fragments {
            match probe_size(spec.opener.as_ref()) {
                Ok(size) => {
                    openers.push(spec.opener);
                    sizes.push(size);
                }
                Err(e) => {
                    errors.push(SingleIoError::io(Stage::Probe, spec.raw, e));
                    if matches!(self.error_policy, ErrorPolicy::FastFail) {
                        break;
                    }
                }
            }
        }

        if !errors.is_empty() {
            return Err(AggregateError { errors });
        }

        MultiOpener::with_sizes(openers, sizes)
            .and_then(|opener| opener.open_reader())
            .map_err(|e| SingleIoError::io(Stage::Open, "<composed>", e).into())
    }

    fn resolve_path(&self, path: PathBuf) -> PathBuf {
        match &self.base_dir {
            Some(dir) if path.is_relative() => dir.join(path),
            _ => path,
        }
    }

    pub fn from_manifest(config: ManifestConfig) -> Result<Self, AggregateError> {
        let mut builder = MultiseekBuilder::new();

        if let Some(policy) = config.error_policy.as_deref() {
            let policy = policy.parse::<ErrorPolicy>().map_err(|e| {
                SingleIoError::io(Stage::Resolve, "error_policy", invalid_input(e))
            })?;
            builder = builder.with_error_policy(policy);
        }

        if let Some(strategy) = config.strategy.as_deref() {
            let strategy = strategy
                .parse::<Strategy>()
                .map_err(|e| SingleIoError::io(Stage::Resolve, "strategy", invalid_input(e)))?;
            builder = builder.with_strategy(strategy);
        }

        if let Some(dir) = config.base_dir {
            builder = builder.with_base_dir(dir);
        }

        let mut errors = Vec::new();
        for (index, fragment_cfg) in config.fragments.iter().enumerate() {
            match builder.fragment_from_config(index, fragment_cfg) {
                Ok(spec) => builder.fragments.push(spec),
                Err(e) => {
                    errors.push(e);
                    if matches!(builder.error_policy, ErrorPolicy::FastFail) {
                        return Err(AggregateError { errors });
                    }
                }
            }
        }

        if !errors.is_empty() {
            return Err(AggregateError { errors });
        }

        Ok(builder)
    }

    fn fragment_from_config(
        &self,
        index: usize,
        cfg: &FragmentConfig,
    ) -> Result<FragmentSpec, SingleIoError> {
        let opener: Arc<dyn Opener> = match cfg.kind.as_str() {
            "file" => {
                let raw = cfg.id.clone().unwrap_or_else(|| format!("fragment #{index}"));
                let path = cfg.path.as_ref().ok_or_else(|| {
                    SingleIoError::io(
                        Stage::Resolve,
                        raw.clone(),
                        invalid_input("file fragment requires 'path' field"),
                    )
                })?;
                let file = FileFragment::new(self.resolve_path(Path::new(path).to_path_buf()));
                match (cfg.offset, cfg.length) {
                    (None, None) => Arc::new(file),
                    (offset, Some(length)) => {
                        let start = offset.unwrap_or(0);
                        let end = start.checked_add(length).ok_or_else(|| {
                            SingleIoError::io(
                                Stage::Resolve,
                                raw.clone(),
                                invalid_input("fragment range overflows u64"),
                            )
                        })?;
                        Arc::new(file.with_range(start..end))
                    }
                    (Some(_), None) => {
                        return Err(SingleIoError::io(
                            Stage::Resolve,
                            raw,
                            invalid_input("file fragment with 'offset' requires 'length'"),
                        ));
                    }
                }
            }
            "inline" => {
                let id = cfg.id.clone().unwrap_or_else(|| format!("inline #{index}"));
                let data = cfg.data.clone().unwrap_or_default();
                Arc::new(InMemoryFragment::from_string(id, data))
            }
            other => {
                return Err(SingleIoError::io(
                    Stage::Resolve,
                    cfg.id.clone().unwrap_or_else(|| format!("fragment #{index}")),
                    invalid_input(format!("unknown fragment kind: {other}")),
                ));
            }
        };

        let raw = cfg.id.clone().unwrap_or_else(|| opener.id().to_string());
        Ok(FragmentSpec::new(raw, opener))
    }
}

impl Default for MultiseekBuilder {
    fn default() -> Self {
        MultiseekBuilder::new()
    }
}

fn open_and_measure(spec: &FragmentSpec) -> Result<(Box<dyn ReadSeekClose>, u64), SingleIoError> {
    let mut source = spec
        .opener
        .open()
        .map_err(|e| SingleIoError::io(Stage::Open, spec.raw.clone(), e))?;
    match measure(&mut source) {
        Ok(size) => Ok((source, size)),
        Err(e) => {
            if let Err(close_err) = source.close() {
                tracing::warn!(fragment = %spec.raw, error = %close_err, "failed to close fragment");
            }
            Err(SingleIoError::io(Stage::Probe, spec.raw.clone(), e))
        }
    }
}

fn invalid_input(msg: impl Into<String>) -> std::io::Error {
    std::io::Error::new(std::io::ErrorKind::InvalidInput, msg.into())
}
