/// Incremental arithmetic mean: `mean += (x - mean) / n`.
///
/// Keeps no samples, so memory stays constant regardless of how many observations
/// are folded.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct RunningMean {
    n: u64,
    mean: f64,
}

impl RunningMean {
    pub fn push(&mut self, x: f64) {
        if !x.is_finite() {
            return;
        }

        self.n = self.n.saturating_add(1);
        self.mean += (x - self.mean) / (self.n as f64);
    }

    pub fn mean(&self) -> f64 {
        self.mean
    }

    pub fn count(&self) -> u64 {
        self.n
    }
}

impl FromIterator<f64> for RunningMean {
    fn from_iter<I: IntoIterator<Item = f64>>(iter: I) -> Self {
        let mut m = Self::default();
        iter.into_iter().for_each(|x| m.push(x));
        m
    }
}
