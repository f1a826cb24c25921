use super::{ExtractionConfig, Real, SampleIndex};
use crate::{
    error::{ConfigurationError, EventDetectionResult},
    parameters::EventPlacement,
};
use itertools::Itertools;
use std::{collections::BTreeSet, ops::Range};

#[derive(Debug, Clone, Copy, PartialEq)]
struct Candidate {
    position: SampleIndex,
    value: Real,
}

/// Turns a binary indicator into event positions at least `min_separation` apart.
#[derive(Debug, Clone)]
pub struct EventExtractor {
    config: ExtractionConfig,
}

impl EventExtractor {
    pub fn new(config: ExtractionConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ExtractionConfig {
        &self.config
    }

    /// Each run of consecutive flags becomes one candidate at the run's first index.
    /// As all candidates carry the same value, clusters closer than
    /// `min_separation` keep their earliest member.
    pub fn extract(&self, indicator: &[u8]) -> Vec<SampleIndex> {
        let candidates = flagged_runs(indicator)
            .into_iter()
            .map(|run| Candidate {
                position: run.start,
                value: 1.0,
            })
            .collect();
        self.separate(candidates)
    }

    /// Each run of consecutive flags becomes one candidate at the largest of
    /// `values` within the run. Clusters closer than `min_separation` keep
    /// their largest member, ties going to the earliest.
    pub fn extract_peaks(
        &self,
        indicator: &[u8],
        values: &[Real],
    ) -> EventDetectionResult<Vec<SampleIndex>> {
        if values.len() != indicator.len() {
            return Err(ConfigurationError::PeakValueLength {
                indicator: indicator.len(),
                values: values.len(),
            }
            .into());
        }
        let candidates = flagged_runs(indicator)
            .into_iter()
            .filter_map(|run| {
                run.map(|position| Candidate {
                    position,
                    value: values[position],
                })
                .reduce(|peak, candidate| {
                    if candidate.value > peak.value {
                        candidate
                    } else {
                        peak
                    }
                })
            })
            .collect();
        Ok(self.separate(candidates))
    }

    /// Dispatches on the configured [EventPlacement].
    pub fn extract_placed(
        &self,
        indicator: &[u8],
        values: &[Real],
    ) -> EventDetectionResult<Vec<SampleIndex>> {
        match self.config.placement() {
            EventPlacement::RunStart => Ok(self.extract(indicator)),
            EventPlacement::RunPeak => self.extract_peaks(indicator, values),
        }
    }

    /// Greedily retains candidates in descending value order (earliest first on ties),
    /// dropping any that lie within `min_separation` of one already retained.
    fn separate(&self, mut candidates: Vec<Candidate>) -> Vec<SampleIndex> {
        let min_separation = self.config.min_separation();
        candidates.sort_by(|a, b| {
            b.value
                .total_cmp(&a.value)
                .then(a.position.cmp(&b.position))
        });

        let mut retained = BTreeSet::<SampleIndex>::new();
        for candidate in candidates {
            let window = candidate.position.saturating_sub(min_separation - 1)
                ..candidate.position.saturating_add(min_separation);
            if retained.range(window).next().is_none() {
                retained.insert(candidate.position);
            }
        }
        retained.into_iter().collect()
    }
}

/// The index ranges of maximal runs of non-zero flags, in order.
fn flagged_runs(indicator: &[u8]) -> Vec<Range<SampleIndex>> {
    let runs = indicator
        .iter()
        .enumerate()
        .chunk_by(|(_, flag)| **flag != 0);
    (&runs)
        .into_iter()
        .filter(|(flagged, _)| *flagged)
        .filter_map(|(_, mut run)| {
            let (start, _) = run.next()?;
            let end = run.last().map_or(start, |(index, _)| index);
            Some(start..end + 1)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::EventDetectionError;
    use rand::{Rng, SeedableRng, rngs::StdRng};

    fn extractor(min_separation: usize) -> EventExtractor {
        EventExtractor::new(ExtractionConfig::new(min_separation).unwrap())
    }

    fn indicator_from(len: usize, flagged: &[usize]) -> Vec<u8> {
        let mut indicator = vec![0; len];
        for &index in flagged {
            indicator[index] = 1;
        }
        indicator
    }

    #[test]
    fn zero_data() {
        assert!(extractor(3).extract(&[]).is_empty());
    }

    #[test]
    fn no_candidates() {
        assert!(extractor(3).extract(&[0; 20]).is_empty());
    }

    #[test]
    fn runs() {
        let indicator = [1, 1, 0, 0, 1, 0, 1, 1, 1];
        assert_eq!(flagged_runs(&indicator), vec![0..2, 4..5, 6..9]);
    }

    #[test]
    fn run_is_one_event_at_its_start() {
        let indicator = indicator_from(20, &[5, 6, 7, 8, 15]);
        assert_eq!(extractor(1).extract(&indicator), vec![5, 15]);
    }

    #[test]
    fn two_close_pulses_collapse() {
        let indicator = indicator_from(40, &[10, 13]);
        assert_eq!(extractor(10).extract(&indicator), vec![10]);
    }

    #[test]
    fn separation_is_inclusive() {
        let indicator = indicator_from(40, &[10, 15, 19]);
        assert_eq!(extractor(5).extract(&indicator), vec![10, 15]);
        assert_eq!(extractor(4).extract(&indicator), vec![10, 15, 19]);
    }

    #[test]
    fn greedy_from_earliest() {
        // 0 suppresses 3, so 6 survives even though 3 would have suppressed it.
        let indicator = indicator_from(20, &[0, 3, 6]);
        assert_eq!(extractor(5).extract(&indicator), vec![0, 6]);
    }

    #[test]
    fn peaks_prefer_larger_values() {
        let indicator = indicator_from(20, &[2, 3, 4, 7, 8]);
        let mut values = vec![0.0; 20];
        values[2] = 1.0;
        values[3] = 5.0;
        values[4] = 2.0;
        values[7] = 9.0;
        values[8] = 3.0;
        assert_eq!(
            extractor(1).extract_peaks(&indicator, &values),
            Ok(vec![3, 7])
        );
        assert_eq!(
            extractor(6).extract_peaks(&indicator, &values),
            Ok(vec![7])
        );
    }

    #[test]
    fn peak_ties_go_to_earliest() {
        let indicator = indicator_from(10, &[2, 3, 4]);
        let values = vec![4.0; 10];
        assert_eq!(
            extractor(1).extract_peaks(&indicator, &values),
            Ok(vec![2])
        );
    }

    #[test]
    fn peak_values_must_align() {
        let indicator = indicator_from(10, &[2]);
        assert_eq!(
            extractor(1).extract_peaks(&indicator, &[0.0; 9]),
            Err(EventDetectionError::Configuration(
                ConfigurationError::PeakValueLength {
                    indicator: 10,
                    values: 9
                }
            ))
        );
    }

    #[test]
    fn placement_dispatch() {
        let indicator = indicator_from(10, &[2, 3]);
        let mut values = vec![0.0; 10];
        values[3] = 1.0;
        let config = ExtractionConfig::new(1).unwrap();
        assert_eq!(
            EventExtractor::new(config.clone()).extract_placed(&indicator, &values),
            Ok(vec![2])
        );
        assert_eq!(
            EventExtractor::new(config.with_placement(EventPlacement::RunPeak))
                .extract_placed(&indicator, &values),
            Ok(vec![3])
        );
    }

    #[test]
    fn separation_holds_for_random_indicators() {
        let mut rng = StdRng::seed_from_u64(42);
        for min_separation in [1, 2, 7, 25] {
            let indicator: Vec<u8> = (0..1000).map(|_| u8::from(rng.random_bool(0.2))).collect();
            let values: Vec<Real> = (0..1000).map(|_| rng.random_range(0.0..10.0)).collect();
            let extractor = extractor(min_separation);
            for positions in [
                extractor.extract(&indicator),
                extractor.extract_peaks(&indicator, &values).unwrap(),
            ] {
                assert!(!positions.is_empty());
                assert!(positions.iter().all(|&p| indicator[p] == 1));
                assert!(
                    positions
                        .windows(2)
                        .all(|pair| pair[1] - pair[0] >= min_separation)
                );
            }
        }
    }
}
