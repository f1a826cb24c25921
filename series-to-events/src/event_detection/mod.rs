//! This module provides tools for converting a raw scalar series into
//! a list of discrete events and a per-entity summary.
//!
//! Typical usage looks like:
//! ```rust
//! use series_events_common::EntityIdentity;
//! use series_to_events::event_detection::{
//!     AdaptiveThresholdDetector, DetectionConfig, EventExtractor, ExtractionConfig, RawSeries,
//!     aggregate,
//! };
//!
//! let mut samples = vec![0.0; 50];
//! samples[35] = 100.0;
//! let series = RawSeries::new(samples, 10.0);
//!
//! let config = DetectionConfig::new(10, 3.0, 0.5).unwrap();
//! let trace = AdaptiveThresholdDetector::new(config).detect(&series).unwrap();
//!
//! let extractor = EventExtractor::new(ExtractionConfig::new(5).unwrap());
//! let positions = extractor.extract(&trace.indicator);
//!
//! let (summary, events) = aggregate(
//!     &positions,
//!     series.len(),
//!     10,
//!     series.sampling_rate(),
//!     EntityIdentity::default(),
//!     "well A1",
//! )
//! .unwrap();
//! assert_eq!(summary.event_count, 1);
//! assert_eq!(events[0].event.position, 35);
//! ```

pub mod aggregator;
pub mod config;
pub mod detector;
pub mod extractor;
pub mod series;
pub(crate) mod stats;

pub use aggregator::{Event, EventRecord, SummaryRecord, aggregate};
pub use config::{DetectionConfig, ExtractionConfig};
pub use detector::{AdaptiveThresholdDetector, DetectionTrace};
pub use extractor::EventExtractor;
pub use series::RawSeries;
pub use series_events_common::{Real, SampleIndex, SampleRate};
