use super::{DetectionConfig, RawSeries, Real, stats::Stats};
use crate::error::{DegenerateInputError, EventDetectionError, EventDetectionResult};

/// Everything the detector computes for one series, index aligned with the input.
///
/// For indices below `lag` the moving statistics are not defined and are left at zero.
#[derive(Default, Debug, Clone, PartialEq)]
pub struct DetectionTrace {
    /// `1` where a sample was flagged as an excursion of the configured polarity.
    pub indicator: Vec<u8>,
    /// The series the moving statistics are computed from: equal to the raw
    /// series except at out-of-band samples, which are damped by `influence`.
    pub filtered: Vec<Real>,
    pub moving_mean: Vec<Real>,
    pub moving_deviation: Vec<Real>,
}

impl DetectionTrace {
    fn with_len(len: usize) -> Self {
        Self {
            indicator: vec![0; len],
            filtered: vec![0.0; len],
            moving_mean: vec![0.0; len],
            moving_deviation: vec![0.0; len],
        }
    }

    fn set_stats(&mut self, index: usize, stats: Stats) {
        self.moving_mean[index] = stats.mean;
        self.moving_deviation[index] = stats.deviation();
    }

    pub fn len(&self) -> usize {
        self.indicator.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indicator.is_empty()
    }

    pub fn num_flagged(&self) -> usize {
        self.indicator.iter().filter(|&&flag| flag != 0).count()
    }
}

/// Flags samples that lie more than `threshold` moving deviations from the
/// moving mean of the preceding `lag + 1` filtered samples.
///
/// Flagged samples only enter the moving statistics in proportion to
/// `influence`, so a spike cannot inflate the local deviation and mask the
/// events that follow it.
#[derive(Debug, Clone)]
pub struct AdaptiveThresholdDetector {
    config: DetectionConfig,
}

impl AdaptiveThresholdDetector {
    pub fn new(config: DetectionConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &DetectionConfig {
        &self.config
    }

    #[tracing::instrument(skip_all, level = "trace", fields(len = series.len(), num_flagged))]
    pub fn detect(&self, series: &RawSeries) -> EventDetectionResult<DetectionTrace> {
        let samples = series.samples();
        let lag = self.config.lag();
        let required = self.config.min_series_length();
        if samples.len() < required {
            return Err(EventDetectionError::InsufficientData {
                length: samples.len(),
                required,
            });
        }
        if let Some(index) = samples.iter().position(|value| !value.is_finite()) {
            return Err(DegenerateInputError::NonFiniteSample { index }.into());
        }

        let threshold = self.config.threshold();
        let influence = self.config.influence();
        let polarity = self.config.polarity();

        let mut trace = DetectionTrace::with_len(samples.len());

        // Bootstrap: the first lag + 1 samples seed the statistics and are never flagged.
        trace.filtered[..=lag].copy_from_slice(&samples[..=lag]);
        trace.set_stats(lag, Stats::from_window(&trace.filtered[..=lag]));

        for index in (lag + 1)..samples.len() {
            let value = samples[index];
            let deviation = value - trace.moving_mean[index - 1];
            if deviation.abs() > threshold * trace.moving_deviation[index - 1] {
                if polarity.accepts(deviation) {
                    trace.indicator[index] = 1;
                }
                trace.filtered[index] =
                    influence * value + (1.0 - influence) * trace.filtered[index - 1];
            } else {
                trace.filtered[index] = value;
            }
            let stats = Stats::from_window(&trace.filtered[(index - lag)..=index]);
            trace.set_stats(index, stats);
        }

        tracing::Span::current().record("num_flagged", trace.num_flagged());
        Ok(trace)
    }
}
