use super::Real;
use crate::{
    error::ConfigurationError,
    parameters::{EventPlacement, Polarity},
};

/// Validated parameters of the [AdaptiveThresholdDetector](super::AdaptiveThresholdDetector).
///
/// The fields can only be set through [DetectionConfig::new], so a detector
/// never sees a partially valid configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct DetectionConfig {
    lag: usize,
    threshold: Real,
    influence: Real,
    polarity: Polarity,
}

impl DetectionConfig {
    pub fn new(lag: usize, threshold: Real, influence: Real) -> Result<Self, ConfigurationError> {
        if lag < 1 {
            return Err(ConfigurationError::Lag(lag));
        }
        if !threshold.is_finite() || threshold <= 0.0 {
            return Err(ConfigurationError::Threshold(threshold));
        }
        if !(0.0..=1.0).contains(&influence) {
            return Err(ConfigurationError::Influence(influence));
        }
        Ok(Self {
            lag,
            threshold,
            influence,
            polarity: Polarity::default(),
        })
    }

    pub fn with_polarity(self, polarity: Polarity) -> Self {
        Self { polarity, ..self }
    }

    pub fn lag(&self) -> usize {
        self.lag
    }

    pub fn threshold(&self) -> Real {
        self.threshold
    }

    pub fn influence(&self) -> Real {
        self.influence
    }

    pub fn polarity(&self) -> Polarity {
        self.polarity
    }

    /// The bootstrap window plus one sample that can actually be tested.
    pub fn min_series_length(&self) -> usize {
        self.lag + 2
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExtractionConfig {
    min_separation: usize,
    placement: EventPlacement,
}

impl ExtractionConfig {
    pub fn new(min_separation: usize) -> Result<Self, ConfigurationError> {
        if min_separation < 1 {
            return Err(ConfigurationError::MinSeparation(min_separation));
        }
        Ok(Self {
            min_separation,
            placement: EventPlacement::default(),
        })
    }

    pub fn with_placement(self, placement: EventPlacement) -> Self {
        Self { placement, ..self }
    }

    pub fn min_separation(&self) -> usize {
        self.min_separation
    }

    pub fn placement(&self) -> EventPlacement {
        self.placement
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_config() {
        let config = DetectionConfig::new(10, 3.0, 0.5).unwrap();
        assert_eq!(config.lag(), 10);
        assert_eq!(config.threshold(), 3.0);
        assert_eq!(config.influence(), 0.5);
        assert_eq!(config.polarity(), Polarity::Positive);
        assert_eq!(config.min_series_length(), 12);
    }

    #[test]
    fn influence_bounds_are_inclusive() {
        assert!(DetectionConfig::new(1, 1.0, 0.0).is_ok());
        assert!(DetectionConfig::new(1, 1.0, 1.0).is_ok());
    }

    #[test]
    fn zero_lag() {
        assert_eq!(
            DetectionConfig::new(0, 3.0, 0.5),
            Err(ConfigurationError::Lag(0))
        );
    }

    #[test]
    fn bad_threshold() {
        assert_eq!(
            DetectionConfig::new(5, 0.0, 0.5),
            Err(ConfigurationError::Threshold(0.0))
        );
        assert_eq!(
            DetectionConfig::new(5, -1.0, 0.5),
            Err(ConfigurationError::Threshold(-1.0))
        );
        assert!(matches!(
            DetectionConfig::new(5, Real::NAN, 0.5),
            Err(ConfigurationError::Threshold(_))
        ));
        assert!(matches!(
            DetectionConfig::new(5, Real::INFINITY, 0.5),
            Err(ConfigurationError::Threshold(_))
        ));
    }

    #[test]
    fn bad_influence() {
        assert_eq!(
            DetectionConfig::new(5, 3.0, 1.5),
            Err(ConfigurationError::Influence(1.5))
        );
        assert_eq!(
            DetectionConfig::new(5, 3.0, -0.1),
            Err(ConfigurationError::Influence(-0.1))
        );
        assert!(matches!(
            DetectionConfig::new(5, 3.0, Real::NAN),
            Err(ConfigurationError::Influence(_))
        ));
    }

    #[test]
    fn zero_min_separation() {
        assert_eq!(
            ExtractionConfig::new(0),
            Err(ConfigurationError::MinSeparation(0))
        );
        assert_eq!(
            ExtractionConfig::new(1).unwrap().placement(),
            EventPlacement::RunStart
        );
    }
}
