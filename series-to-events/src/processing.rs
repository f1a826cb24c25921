use crate::{
    error::{EventDetectionError, EventDetectionResult},
    event_detection::{
        AdaptiveThresholdDetector, DetectionConfig, DetectionTrace, EventExtractor, EventRecord,
        ExtractionConfig, RawSeries, SummaryRecord, aggregate,
    },
    sink::SaveToFileFilter,
    source::{EntityDescriptor, SeriesSource, SourceOutcome},
};
use metrics::counter;
use rayon::prelude::*;
use series_events_common::{
    EntityIdentity,
    metrics::{
        failures::{self, FailureKind},
        names::{
            ENTITIES_PROCESSED, ENTITIES_RECEIVED, ENTITIES_SKIPPED, EVENTS_DETECTED, FAILURES,
        },
    },
};
use std::{
    io,
    path::{Path, PathBuf},
};
use tracing::{debug, warn};

/// Why an entity produced no records.
#[derive(Debug, Clone, PartialEq)]
pub enum FailureReason {
    /// The source had no series for the entity.
    Skipped(String),
    Failed(EventDetectionError),
}

#[derive(Debug, Clone, PartialEq)]
pub struct EntityFailure {
    pub identity: EntityIdentity,
    pub source_name: String,
    pub reason: FailureReason,
}

/// Everything computed for one successfully analysed entity.
#[derive(Debug, Clone, PartialEq)]
pub struct EntityAnalysis {
    pub trace: DetectionTrace,
    pub summary: SummaryRecord,
    pub events: Vec<EventRecord>,
}

/// The collected outcomes of a batch, in the order the source listed its entities.
#[derive(Default, Debug, Clone, PartialEq)]
pub struct BatchReport {
    pub summaries: Vec<SummaryRecord>,
    pub events: Vec<EventRecord>,
    pub failures: Vec<EntityFailure>,
}

impl BatchReport {
    pub fn num_processed(&self) -> usize {
        self.summaries.len()
    }

    pub fn num_skipped(&self) -> usize {
        self.failures
            .iter()
            .filter(|failure| matches!(failure.reason, FailureReason::Skipped(_)))
            .count()
    }

    pub fn num_failed(&self) -> usize {
        self.failures.len() - self.num_skipped()
    }
}

impl FromIterator<Result<EntityAnalysis, EntityFailure>> for BatchReport {
    fn from_iter<I: IntoIterator<Item = Result<EntityAnalysis, EntityFailure>>>(iter: I) -> Self {
        let mut report = BatchReport::default();
        for outcome in iter {
            match outcome {
                Ok(analysis) => {
                    report.summaries.push(analysis.summary);
                    report.events.extend(analysis.events);
                }
                Err(failure) => report.failures.push(failure),
            }
        }
        report
    }
}

/// Runs detection, extraction and aggregation on each entity of a source.
#[derive(Debug, Clone)]
pub struct Pipeline {
    detector: AdaptiveThresholdDetector,
    extractor: EventExtractor,
    save_path: Option<PathBuf>,
}

impl Pipeline {
    pub fn new(detection: DetectionConfig, extraction: ExtractionConfig) -> Self {
        Self {
            detector: AdaptiveThresholdDetector::new(detection),
            extractor: EventExtractor::new(extraction),
            save_path: None,
        }
    }

    /// If set, the raw series and detection trace of each analysed entity are
    /// written to this directory.
    pub fn with_save_path(self, save_path: Option<PathBuf>) -> Self {
        Self { save_path, ..self }
    }

    /// The pure per-entity computation: no logging, metrics or file output.
    ///
    /// An identity without a flat export code fails here, so that every record
    /// reaching a [ResultSink](crate::sink::ResultSink) can be exported.
    pub fn analyse(
        &self,
        series: &RawSeries,
        entity: &EntityDescriptor,
    ) -> EventDetectionResult<EntityAnalysis> {
        entity.identity.code()?;
        let trace = self.detector.detect(series)?;
        let positions = self
            .extractor
            .extract_placed(&trace.indicator, series.samples())?;
        let (summary, events) = aggregate(
            &positions,
            series.len(),
            self.detector.config().lag(),
            series.sampling_rate(),
            entity.identity,
            &entity.source_name,
        )?;
        Ok(EntityAnalysis {
            trace,
            summary,
            events,
        })
    }

    #[tracing::instrument(skip_all, fields(identity = %entity.identity, source = %entity.source_name, num_events))]
    pub fn process_entity<S: SeriesSource>(
        &self,
        source: &S,
        entity: &EntityDescriptor,
    ) -> Result<EntityAnalysis, EntityFailure> {
        counter!(ENTITIES_RECEIVED).increment(1);

        let series = match source.acquire(entity) {
            SourceOutcome::Available(series) => series,
            SourceOutcome::Unavailable { reason } => {
                warn!("Skipping {}: {reason}", entity.identity);
                counter!(ENTITIES_SKIPPED).increment(1);
                return Err(EntityFailure {
                    identity: entity.identity,
                    source_name: entity.source_name.clone(),
                    reason: FailureReason::Skipped(reason),
                });
            }
        };

        match self.analyse(&series, entity) {
            Ok(analysis) => {
                if let Some(save_path) = &self.save_path {
                    if let Err(e) =
                        save_diagnostics(save_path, &entity.identity, &series, &analysis.trace)
                    {
                        warn!("Failed to save diagnostics for {}: {e}", entity.identity);
                        counter!(FAILURES, &[failures::get_label(FailureKind::FileWriteFailed)])
                            .increment(1);
                    }
                }
                let num_events = analysis.events.len();
                tracing::Span::current().record("num_events", num_events);
                counter!(ENTITIES_PROCESSED).increment(1);
                counter!(EVENTS_DETECTED).increment(num_events as u64);
                Ok(analysis)
            }
            Err(e) => {
                let kind = e.failure_kind();
                warn!(
                    kind = <&'static str>::from(kind),
                    "Failed to analyse {}: {e}", entity.identity
                );
                counter!(FAILURES, &[failures::get_label(kind)]).increment(1);
                Err(EntityFailure {
                    identity: entity.identity,
                    source_name: entity.source_name.clone(),
                    reason: FailureReason::Failed(e),
                })
            }
        }
    }

    /// Processes every entity of `source` in parallel. A failing entity never
    /// stops the batch; it is recorded in [BatchReport::failures] instead.
    #[tracing::instrument(skip_all, fields(num_entities))]
    pub fn process_batch<S: SeriesSource + Sync>(&self, source: &S) -> BatchReport {
        let entities = source.entities();
        tracing::Span::current().record("num_entities", entities.len());

        let report = entities
            .par_iter()
            .map(|entity| self.process_entity(source, entity))
            .collect::<Vec<_>>()
            .into_iter()
            .collect::<BatchReport>();

        debug!(
            "Processed {}, skipped {}, failed {}",
            report.num_processed(),
            report.num_skipped(),
            report.num_failed()
        );
        report
    }
}

pub(crate) fn get_save_file_name(path: &Path, identity: &EntityIdentity, kind: &str) -> PathBuf {
    path.join(format!(
        "g{0}_b{1}_t{2}_e{3}_{kind}.csv",
        identity.group, identity.batch, identity.timepoint, identity.entity_index
    ))
}

fn save_diagnostics(
    save_path: &Path,
    identity: &EntityIdentity,
    series: &RawSeries,
    trace: &DetectionTrace,
) -> io::Result<()> {
    std::fs::create_dir_all(save_path)?;
    let name = |kind| get_save_file_name(save_path, identity, kind);
    series
        .samples()
        .iter()
        .copied()
        .enumerate()
        .save_to_file(&name("raw"))?;
    trace
        .filtered
        .iter()
        .copied()
        .enumerate()
        .save_to_file(&name("filtered"))?;
    trace
        .moving_mean
        .iter()
        .copied()
        .enumerate()
        .save_to_file(&name("mean"))?;
    trace
        .moving_deviation
        .iter()
        .copied()
        .enumerate()
        .save_to_file(&name("deviation"))?;
    trace
        .indicator
        .iter()
        .copied()
        .enumerate()
        .save_to_file(&name("indicator"))
}
