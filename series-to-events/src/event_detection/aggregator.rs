use super::{Real, SampleIndex, SampleRate};
use crate::error::{DegenerateInputError, EventDetectionResult};
use series_events_common::EntityIdentity;

#[derive(Default, Debug, Clone, Copy, PartialEq)]
pub struct Event {
    pub position: SampleIndex,
    /// `position / sampling_rate`
    pub timestamp: Real,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EventRecord {
    pub identity: EntityIdentity,
    pub event: Event,
}

/// Per-entity summary. A record with `event_count == 0` means the entity was
/// analysed and nothing was found; entities that were not analysed have no record.
#[derive(Debug, Clone, PartialEq)]
pub struct SummaryRecord {
    pub identity: EntityIdentity,
    pub source_name: String,
    pub event_count: usize,
    /// Observation time excluding the `lag`-sample bootstrap window.
    pub effective_duration: Real,
    pub rate: Real,
}

/// Builds the summary and per-event records of one entity.
///
/// # Errors
/// [DegenerateInputError] if `sampling_rate` is not positive and finite, or if
/// the series is no longer than the bootstrap window.
pub fn aggregate(
    events: &[SampleIndex],
    series_length: usize,
    lag: usize,
    sampling_rate: SampleRate,
    identity: EntityIdentity,
    source_name: &str,
) -> EventDetectionResult<(SummaryRecord, Vec<EventRecord>)> {
    if !sampling_rate.is_finite() || sampling_rate <= 0.0 {
        return Err(DegenerateInputError::SamplingRate(sampling_rate).into());
    }
    let effective_duration = series_length as Real / sampling_rate - lag as Real / sampling_rate;
    if effective_duration <= 0.0 {
        return Err(DegenerateInputError::EffectiveDuration(effective_duration).into());
    }

    let records = events
        .iter()
        .map(|&position| EventRecord {
            identity,
            event: Event {
                position,
                timestamp: position as Real / sampling_rate,
            },
        })
        .collect::<Vec<_>>();

    let summary = SummaryRecord {
        identity,
        source_name: source_name.to_owned(),
        event_count: records.len(),
        effective_duration,
        rate: records.len() as Real / effective_duration,
    };
    Ok((summary, records))
}
