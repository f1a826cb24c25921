use crate::{
    error::ConfigurationError,
    event_detection::{DetectionConfig, ExtractionConfig, Real},
};
use clap::{Args, ValueEnum};

/// Which side of the moving mean an excursion must lie on to be labelled as an event.
/// Excursions of the other sign are still damped, they are just not labelled.
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Polarity {
    #[default]
    Positive,
    Negative,
    Both,
}

impl Polarity {
    /// `deviation` is the sample minus the preceding moving mean.
    pub fn accepts(self, deviation: Real) -> bool {
        match self {
            Polarity::Positive => deviation > 0.0,
            Polarity::Negative => deviation < 0.0,
            Polarity::Both => deviation != 0.0,
        }
    }
}

/// Where within a run of flagged samples the resulting event is placed.
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum EventPlacement {
    /// The first flagged sample of the run.
    #[default]
    RunStart,
    /// The largest raw sample of the run, ties going to the earliest.
    RunPeak,
}

#[derive(Debug, Clone, Args)]
pub struct DetectorSettings {
    /// Number of trailing samples used to compute the moving mean and deviation
    #[clap(long, env, default_value = "10")]
    pub lag: usize,

    /// Number of deviations a sample must lie from the moving mean to be flagged
    #[clap(long, env, default_value = "3.0")]
    pub threshold: Real,

    /// Weight in [0, 1] given to flagged samples when updating the moving statistics
    #[clap(long, env, default_value = "0.5")]
    pub influence: Real,

    #[clap(long, env, value_enum, default_value_t = Polarity::Positive)]
    pub polarity: Polarity,
}

impl DetectorSettings {
    pub fn to_config(&self) -> Result<DetectionConfig, ConfigurationError> {
        Ok(DetectionConfig::new(self.lag, self.threshold, self.influence)?
            .with_polarity(self.polarity))
    }
}

#[derive(Debug, Clone, Args)]
pub struct ExtractorSettings {
    /// Minimum number of samples between two retained events
    #[clap(long, env, default_value = "5")]
    pub min_separation: usize,

    #[clap(long, env, value_enum, default_value_t = EventPlacement::RunStart)]
    pub placement: EventPlacement,
}

impl ExtractorSettings {
    pub fn to_config(&self) -> Result<ExtractionConfig, ConfigurationError> {
        Ok(ExtractionConfig::new(self.min_separation)?.with_placement(self.placement))
    }
}
