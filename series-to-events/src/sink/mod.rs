//! Persistence of the per-entity results.
//!
//! Records carry the structured [EntityIdentity]; the flat numeric code is
//! derived here, at the point where records leave the pipeline.

pub(crate) mod save_to_file;

use crate::event_detection::{EventRecord, Real, SampleIndex, SummaryRecord};
use serde::Serialize;
use series_events_common::{EntityCode, EntityIdentity};
use std::{fs::File, io::Write, path::Path};
use thiserror::Error;
use tracing::{debug, instrument};

pub(crate) use save_to_file::SaveToFileFilter;

pub const SUMMARY_FILE_NAME: &str = "summary.csv";
pub const EVENTS_FILE_NAME: &str = "events.csv";

#[derive(Debug, Error)]
pub enum SinkError {
    #[error("IO Error: {0}")]
    IO(#[from] std::io::Error),
    #[error("CSV Error: {0}")]
    Csv(#[from] csv::Error),
}

pub trait ResultSink {
    fn write_summaries(&mut self, summaries: &[SummaryRecord]) -> Result<(), SinkError>;

    fn write_events(&mut self, events: &[EventRecord]) -> Result<(), SinkError>;
}

/// One line of [SUMMARY_FILE_NAME].
///
/// `id` is empty for an identity with no flat code. The pipeline fails such
/// entities before they produce records, so this only arises for records
/// built elsewhere.
#[derive(Debug, Serialize)]
struct SummaryRow<'a> {
    id: Option<EntityCode>,
    group: u32,
    batch: u32,
    timepoint: u32,
    entity_index: u32,
    source: &'a str,
    event_count: usize,
    effective_duration: Real,
    rate: Real,
}

impl SummaryRow<'_> {
    const HEADER: [&'static str; 9] = [
        "id",
        "group",
        "batch",
        "timepoint",
        "entity_index",
        "source",
        "event_count",
        "effective_duration",
        "rate",
    ];
}

impl<'a> From<&'a SummaryRecord> for SummaryRow<'a> {
    fn from(summary: &'a SummaryRecord) -> Self {
        let EntityIdentity {
            group,
            batch,
            timepoint,
            entity_index,
        } = summary.identity;
        Self {
            id: summary.identity.code().ok(),
            group,
            batch,
            timepoint,
            entity_index,
            source: &summary.source_name,
            event_count: summary.event_count,
            effective_duration: summary.effective_duration,
            rate: summary.rate,
        }
    }
}

/// One line of [EVENTS_FILE_NAME].
#[derive(Debug, Serialize)]
struct EventRow {
    id: Option<EntityCode>,
    group: u32,
    batch: u32,
    timepoint: u32,
    entity_index: u32,
    position: SampleIndex,
    timestamp: Real,
}

impl EventRow {
    const HEADER: [&'static str; 7] = [
        "id",
        "group",
        "batch",
        "timepoint",
        "entity_index",
        "position",
        "timestamp",
    ];
}

impl From<&EventRecord> for EventRow {
    fn from(record: &EventRecord) -> Self {
        let EntityIdentity {
            group,
            batch,
            timepoint,
            entity_index,
        } = record.identity;
        Self {
            id: record.identity.code().ok(),
            group,
            batch,
            timepoint,
            entity_index,
            position: record.event.position,
            timestamp: record.event.timestamp,
        }
    }
}

/// Writes summary and event records as two CSV tables.
///
/// Both tables always have a header line, and every summary record gets a
/// row, including those with no events.
pub struct CsvSink<W: Write> {
    summaries: csv::Writer<W>,
    events: csv::Writer<W>,
}

impl<W: Write> CsvSink<W> {
    /// Writes the header line of each table.
    pub fn new(summaries: W, events: W) -> Result<Self, SinkError> {
        // Headers are written here rather than on the first row, so empty tables keep them.
        let writer = |inner| csv::WriterBuilder::new().has_headers(false).from_writer(inner);
        let mut summaries = writer(summaries);
        summaries.write_record(SummaryRow::HEADER)?;
        let mut events = writer(events);
        events.write_record(EventRow::HEADER)?;
        Ok(Self { summaries, events })
    }

    pub fn finish(self) -> Result<(W, W), SinkError> {
        let summaries = self.summaries.into_inner().map_err(|e| e.into_error())?;
        let events = self.events.into_inner().map_err(|e| e.into_error())?;
        Ok((summaries, events))
    }
}

impl CsvSink<File> {
    /// Creates [SUMMARY_FILE_NAME] and [EVENTS_FILE_NAME] in `dir`, which is created if needed.
    #[instrument(skip_all, fields(dir = %dir.display()))]
    pub fn create(dir: &Path) -> Result<Self, SinkError> {
        std::fs::create_dir_all(dir)?;
        let summaries = File::create(dir.join(SUMMARY_FILE_NAME))?;
        let events = File::create(dir.join(EVENTS_FILE_NAME))?;
        debug!("Created output tables");
        Self::new(summaries, events)
    }
}

impl<W: Write> ResultSink for CsvSink<W> {
    fn write_summaries(&mut self, summaries: &[SummaryRecord]) -> Result<(), SinkError> {
        for summary in summaries {
            self.summaries.serialize(SummaryRow::from(summary))?;
        }
        Ok(())
    }

    fn write_events(&mut self, events: &[EventRecord]) -> Result<(), SinkError> {
        for record in events {
            self.events.serialize(EventRow::from(record))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event_detection::Event;

    fn summary(identity: EntityIdentity, source_name: &str, event_count: usize) -> SummaryRecord {
        SummaryRecord {
            identity,
            source_name: source_name.to_owned(),
            event_count,
            effective_duration: 4.0,
            rate: event_count as f64 / 4.0,
        }
    }

    fn tables(sink: CsvSink<Vec<u8>>) -> (String, String) {
        let (summaries, events) = sink.finish().unwrap();
        (
            String::from_utf8(summaries).unwrap(),
            String::from_utf8(events).unwrap(),
        )
    }

    /// The header serde derives from a row type, as written by a default `csv::Writer`.
    fn derived_header<T: Serialize>(row: T) -> String {
        let mut writer = csv::Writer::from_writer(Vec::new());
        writer.serialize(row).unwrap();
        let text = String::from_utf8(writer.into_inner().unwrap()).unwrap();
        text.lines().next().unwrap().to_owned()
    }

    #[test]
    fn headers_match_row_types() {
        let identity = EntityIdentity::new(1, 2, 3, 4);
        let record = summary(identity, "A1", 0);
        assert_eq!(
            derived_header(SummaryRow::from(&record)),
            SummaryRow::HEADER.join(",")
        );
        let event = EventRecord {
            identity,
            event: Event::default(),
        };
        assert_eq!(
            derived_header(EventRow::from(&event)),
            EventRow::HEADER.join(",")
        );
    }

    #[test]
    fn headers_only() {
        let sink = CsvSink::new(Vec::new(), Vec::new()).unwrap();
        let (summaries, events) = tables(sink);
        assert_eq!(
            summaries,
            "id,group,batch,timepoint,entity_index,source,event_count,effective_duration,rate\n"
        );
        assert_eq!(
            events,
            "id,group,batch,timepoint,entity_index,position,timestamp\n"
        );
    }

    #[test]
    fn zero_event_summary_is_written() {
        let identity = EntityIdentity::new(1, 2, 3, 4);
        let mut sink = CsvSink::new(Vec::new(), Vec::new()).unwrap();
        sink.write_summaries(&[summary(identity, "A1", 0)]).unwrap();
        sink.write_events(&[]).unwrap();

        let (summaries, events) = tables(sink);
        let rows = summaries.lines().collect::<Vec<_>>();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1], "1002003004,1,2,3,4,A1,0,4.0,0.0");
        assert_eq!(events.lines().count(), 1);
    }

    #[test]
    fn event_rows() {
        let identity = EntityIdentity::new(0, 0, 1, 7);
        let mut sink = CsvSink::new(Vec::new(), Vec::new()).unwrap();
        sink.write_summaries(&[summary(identity, "B7", 2)]).unwrap();
        sink.write_events(&[
            EventRecord {
                identity,
                event: Event {
                    position: 20,
                    timestamp: 2.0,
                },
            },
            EventRecord {
                identity,
                event: Event {
                    position: 35,
                    timestamp: 3.5,
                },
            },
        ])
        .unwrap();

        let (summaries, events) = tables(sink);
        assert_eq!(summaries.lines().nth(1), Some("1007,0,0,1,7,B7,2,4.0,0.5"));
        assert_eq!(
            events.lines().skip(1).collect::<Vec<_>>(),
            vec!["1007,0,0,1,7,20,2.0", "1007,0,0,1,7,35,3.5"]
        );
    }

    #[test]
    fn source_names_are_quoted() {
        let mut sink = CsvSink::new(Vec::new(), Vec::new()).unwrap();
        sink.write_summaries(&[
            summary(EntityIdentity::new(0, 0, 0, 1), "a,b", 0),
            summary(EntityIdentity::new(0, 0, 0, 2), "say \"hi\"", 0),
        ])
        .unwrap();
        let (summaries, _) = tables(sink);

        let mut reader = csv::Reader::from_reader(summaries.as_bytes());
        let sources = reader
            .records()
            .map(|record| record.unwrap()[5].to_owned())
            .collect::<Vec<_>>();
        assert_eq!(sources, vec!["a,b", "say \"hi\""]);
    }

    #[test]
    fn identity_without_code_does_not_stop_the_table() {
        let mut sink = CsvSink::new(Vec::new(), Vec::new()).unwrap();
        sink.write_summaries(&[
            summary(EntityIdentity::new(1, 0, 0, 1), "good_a", 0),
            summary(EntityIdentity::new(1, 0, 0, 1000), "wide", 0),
            summary(EntityIdentity::new(1, 0, 0, 2), "good_b", 0),
        ])
        .unwrap();
        let (summaries, _) = tables(sink);
        let rows = summaries.lines().skip(1).collect::<Vec<_>>();
        assert_eq!(rows.len(), 3);
        assert!(rows[1].starts_with(",1,0,0,1000,wide,"));
        assert!(rows[2].starts_with("1000000002,1,0,0,2,good_b,"));
    }
}
