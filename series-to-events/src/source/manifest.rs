use super::{EntityDescriptor, SeriesSource, SourceOutcome};
use crate::event_detection::{RawSeries, Real, SampleRate};
use serde::Deserialize;
use series_events_common::EntityIdentity;
use std::{
    collections::{HashMap, HashSet},
    fs::File,
    io::{BufRead, BufReader},
    num::ParseFloatError,
    path::{Path, PathBuf},
};
use thiserror::Error;
use tracing::{debug, instrument};

#[derive(Debug, Error)]
pub enum ManifestError {
    #[error("IO Error: {0}")]
    IO(#[from] std::io::Error),
    #[error("Invalid Manifest: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Entity listed twice in manifest: {0}")]
    DuplicateIdentity(EntityIdentity),
}

#[derive(Debug, Error)]
pub enum SeriesReadError {
    #[error("IO Error: {0}")]
    IO(#[from] std::io::Error),
    #[error("Invalid sample on line {line}: {source}")]
    Parse {
        line: usize,
        source: ParseFloatError,
    },
    #[error("No samples found")]
    Empty,
}

/// One analysed entity, as listed in the manifest file.
///
/// ```json
/// { "group": 1, "batch": 2, "timepoint": 0, "entity-index": 5,
///   "source-name": "plate2_A5", "path": "series/plate2_A5.txt", "sampling-rate": 30.0 }
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ManifestEntry {
    #[serde(flatten)]
    pub identity: EntityIdentity,
    pub source_name: String,
    /// Relative paths are resolved against the manifest's directory.
    pub path: PathBuf,
    pub sampling_rate: SampleRate,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Manifest {
    pub entities: Vec<ManifestEntry>,
}

impl Manifest {
    pub fn from_json_str(json: &str) -> Result<Self, ManifestError> {
        let manifest: Manifest = serde_json::from_str(json)?;
        let mut seen = HashSet::new();
        for entry in &manifest.entities {
            if !seen.insert(entry.identity) {
                return Err(ManifestError::DuplicateIdentity(entry.identity));
            }
        }
        Ok(manifest)
    }
}

/// Reads one sample per line. Blank lines and lines starting with `#` are skipped.
pub fn read_samples<R: BufRead>(reader: R) -> Result<Vec<Real>, SeriesReadError> {
    let mut samples = Vec::new();
    for (index, line) in reader.lines().enumerate() {
        let line = line?;
        let text = line.trim();
        if text.is_empty() || text.starts_with('#') {
            continue;
        }
        let sample = text.parse().map_err(|source| SeriesReadError::Parse {
            line: index + 1,
            source,
        })?;
        samples.push(sample);
    }
    if samples.is_empty() {
        return Err(SeriesReadError::Empty);
    }
    Ok(samples)
}

/// Serves the series listed in a [Manifest], each stored as a text file.
#[derive(Debug, Clone)]
pub struct ManifestSource {
    base_dir: PathBuf,
    /// In manifest order.
    entries: Vec<ManifestEntry>,
    index: HashMap<EntityIdentity, usize>,
}

impl ManifestSource {
    pub fn new(manifest: Manifest, base_dir: impl Into<PathBuf>) -> Self {
        let index = manifest
            .entities
            .iter()
            .enumerate()
            .map(|(position, entry)| (entry.identity, position))
            .collect();
        Self {
            base_dir: base_dir.into(),
            entries: manifest.entities,
            index,
        }
    }

    #[instrument(skip_all, fields(path = %path.display()))]
    pub fn load(path: &Path) -> Result<Self, ManifestError> {
        let json = std::fs::read_to_string(path)?;
        let manifest = Manifest::from_json_str(&json)?;
        debug!("Loaded {} manifest entries", manifest.entities.len());
        let base_dir = path.parent().map(Path::to_path_buf).unwrap_or_default();
        Ok(Self::new(manifest, base_dir))
    }

    fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.base_dir.join(path)
        }
    }

    fn read_series(&self, entry: &ManifestEntry) -> Result<RawSeries, SeriesReadError> {
        let file = File::open(self.resolve(&entry.path))?;
        let samples = read_samples(BufReader::new(file))?;
        Ok(RawSeries::new(samples, entry.sampling_rate))
    }
}

impl SeriesSource for ManifestSource {
    fn entities(&self) -> Vec<EntityDescriptor> {
        self.entries
            .iter()
            .map(|entry| EntityDescriptor {
                identity: entry.identity,
                source_name: entry.source_name.clone(),
            })
            .collect()
    }

    fn acquire(&self, entity: &EntityDescriptor) -> SourceOutcome {
        let Some(entry) = self
            .index
            .get(&entity.identity)
            .and_then(|&position| self.entries.get(position))
        else {
            return SourceOutcome::Unavailable {
                reason: "entity not listed in manifest".to_owned(),
            };
        };
        match self.read_series(entry) {
            Ok(series) => SourceOutcome::Available(series),
            Err(e) => SourceOutcome::Unavailable {
                reason: format!("{}: {e}", entry.path.display()),
            },
        }
    }
}
