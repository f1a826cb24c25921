use super::{Real, SampleRate};

/// A finite, ordered sequence of samples taken at a constant rate.
#[derive(Debug, Clone, PartialEq)]
pub struct RawSeries {
    samples: Vec<Real>,
    sampling_rate: SampleRate,
}

impl RawSeries {
    /// `sampling_rate` is in samples per unit time.
    pub fn new(samples: Vec<Real>, sampling_rate: SampleRate) -> Self {
        Self {
            samples,
            sampling_rate,
        }
    }

    pub fn samples(&self) -> &[Real] {
        &self.samples
    }

    pub fn sampling_rate(&self) -> SampleRate {
        self.sampling_rate
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}
