//! Acquisition of the raw series to analyse.
//!
//! A source lists the entities it knows about and, on request, either hands
//! over the entity's series or reports that it is unavailable. Being
//! unavailable is an ordinary outcome rather than an error, and must never be
//! reported as an empty series.

mod manifest;

use crate::event_detection::RawSeries;
use series_events_common::EntityIdentity;

pub use manifest::{Manifest, ManifestEntry, ManifestError, ManifestSource, SeriesReadError};

/// An entity as listed by a [SeriesSource], before its series is acquired.
#[derive(Debug, Clone, PartialEq)]
pub struct EntityDescriptor {
    pub identity: EntityIdentity,
    pub source_name: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SourceOutcome {
    Available(RawSeries),
    Unavailable { reason: String },
}

pub trait SeriesSource {
    fn entities(&self) -> Vec<EntityDescriptor>;

    fn acquire(&self, entity: &EntityDescriptor) -> SourceOutcome;
}

/// A source whose series are already in memory. Entries with no series are
/// reported as unavailable.
#[derive(Default, Debug, Clone)]
pub struct InMemorySource {
    entries: Vec<(EntityDescriptor, Option<RawSeries>)>,
}

impl InMemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_series(
        mut self,
        identity: EntityIdentity,
        source_name: &str,
        series: Option<RawSeries>,
    ) -> Self {
        self.entries.push((
            EntityDescriptor {
                identity,
                source_name: source_name.to_owned(),
            },
            series,
        ));
        self
    }
}

impl SeriesSource for InMemorySource {
    fn entities(&self) -> Vec<EntityDescriptor> {
        self.entries
            .iter()
            .map(|(descriptor, _)| descriptor.clone())
            .collect()
    }

    fn acquire(&self, entity: &EntityDescriptor) -> SourceOutcome {
        match self
            .entries
            .iter()
            .find(|(descriptor, _)| descriptor == entity)
        {
            Some((_, Some(series))) => SourceOutcome::Available(series.clone()),
            Some((_, None)) => SourceOutcome::Unavailable {
                reason: "no series recorded".to_owned(),
            },
            None => SourceOutcome::Unavailable {
                reason: "entity not known to this source".to_owned(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn in_memory_source() {
        let identity = EntityIdentity::new(0, 0, 0, 1);
        let series = RawSeries::new(vec![1.0, 2.0, 3.0], 5.0);
        let source = InMemorySource::new()
            .with_series(identity, "present", Some(series.clone()))
            .with_series(EntityIdentity::new(0, 0, 0, 2), "missing", None);

        let entities = source.entities();
        assert_eq!(entities.len(), 2);
        assert_eq!(entities[0].identity, identity);
        assert_eq!(entities[0].source_name, "present");

        assert_eq!(source.acquire(&entities[0]), SourceOutcome::Available(series));
        assert!(matches!(
            source.acquire(&entities[1]),
            SourceOutcome::Unavailable { .. }
        ));
        assert!(matches!(
            source.acquire(&EntityDescriptor {
                identity: EntityIdentity::new(9, 9, 9, 9),
                source_name: "unknown".to_owned(),
            }),
            SourceOutcome::Unavailable { .. }
        ));
    }
}
