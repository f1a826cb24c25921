use crate::event_detection::Real;
use series_events_common::{IdentityCodeError, metrics::failures::FailureKind};
use thiserror::Error;

pub type EventDetectionResult<T> = Result<T, EventDetectionError>;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigurationError {
    #[error("lag must be at least 1, got {0}")]
    Lag(usize),
    #[error("threshold must be positive and finite, got {0}")]
    Threshold(Real),
    #[error("influence must lie in [0, 1], got {0}")]
    Influence(Real),
    #[error("minimum separation must be at least 1, got {0}")]
    MinSeparation(usize),
    #[error("peak values have length {values} but the indicator has length {indicator}")]
    PeakValueLength { indicator: usize, values: usize },
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum DegenerateInputError {
    #[error("sampling rate {0} is not positive and finite")]
    SamplingRate(Real),
    #[error("effective duration {0} is not positive")]
    EffectiveDuration(Real),
    #[error("sample {index} is not finite")]
    NonFiniteSample { index: usize },
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum EventDetectionError {
    #[error("Configuration Error: {0}")]
    Configuration(#[from] ConfigurationError),
    #[error("Insufficient Data: series has {length} samples, at least {required} required")]
    InsufficientData { length: usize, required: usize },
    #[error("Degenerate Input: {0}")]
    DegenerateInput(#[from] DegenerateInputError),
    #[error("Identity Error: {0}")]
    Identity(#[from] IdentityCodeError),
}

impl EventDetectionError {
    pub fn failure_kind(&self) -> FailureKind {
        match self {
            Self::Configuration(_) => FailureKind::Configuration,
            Self::InsufficientData { .. } => FailureKind::InsufficientData,
            Self::DegenerateInput(_) => FailureKind::DegenerateInput,
            Self::Identity(_) => FailureKind::IdentityOutOfRange,
        }
    }
}
