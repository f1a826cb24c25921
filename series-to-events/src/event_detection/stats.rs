use super::Real;

/// Descriptive statistics of a window of samples.
#[derive(Default, Clone, Copy, Debug, PartialEq)]
pub(crate) struct Stats {
    pub(crate) mean: Real,
    pub(crate) variance: Real,
}

impl Stats {
    /// Mean and population variance using Welford's update,
    /// which avoids the cancellation of the sum-of-squares formula.
    pub(crate) fn from_window(window: &[Real]) -> Self {
        let (count, mean, m2) =
            window
                .iter()
                .fold((0usize, 0.0, 0.0), |(count, mean, m2), &value| {
                    let count = count + 1;
                    let delta = value - mean;
                    let mean = mean + delta / count as Real;
                    (count, mean, m2 + delta * (value - mean))
                });
        if count == 0 {
            return Self::default();
        }
        Self {
            mean,
            variance: (m2 / count as Real).max(0.0),
        }
    }

    pub(crate) fn deviation(&self) -> Real {
        self.variance.sqrt()
    }
}
