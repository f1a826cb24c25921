//! Detection of transient excursions in scalar time series.
//!
//! Each entity's series passes through an [AdaptiveThresholdDetector](event_detection::AdaptiveThresholdDetector),
//! an [EventExtractor](event_detection::EventExtractor) and the
//! [aggregate](event_detection::aggregate) step, producing one summary record and
//! a list of timestamped events. Entities are independent, and a
//! [Pipeline](processing::Pipeline) processes them in parallel.

pub mod error;
pub mod event_detection;
pub mod parameters;
pub mod processing;
pub mod sink;
pub mod source;
