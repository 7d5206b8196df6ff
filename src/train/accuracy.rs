/// Size of the correctness window the digit network is judged on.
pub const DEFAULT_WINDOW: usize = 1000;

/// Circular buffer of the most recent correctness flags.
///
/// Slot `position % size` is overwritten on every record. Slots that were
/// never written count as incorrect, so accuracy only reaches 1.0 once a
/// full window of correct guesses has been seen.
#[derive(Debug, Clone, PartialEq)]
pub struct RollingAccuracy {
    flags: Vec<bool>,
}

impl RollingAccuracy {
    /// `size` must be non-zero.
    pub fn new(size: usize) -> RollingAccuracy {
        assert!(size > 0, "accuracy window must hold at least one flag");
        RollingAccuracy { flags: vec![false; size] }
    }

    pub fn size(&self) -> usize {
        self.flags.len()
    }

    pub fn record(&mut self, position: usize, correct: bool) {
        let size = self.flags.len();
        self.flags[position % size] = correct;
    }

    /// Fraction of `true` flags over the whole window.
    pub fn accuracy(&self) -> f64 {
        let correct = self.flags.iter().filter(|&&c| c).count();
        correct as f64 / self.flags.len() as f64
    }
}

impl Default for RollingAccuracy {
    fn default() -> Self {
        RollingAccuracy::new(DEFAULT_WINDOW)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unfilled_slots_count_as_wrong() {
        let mut window = RollingAccuracy::new(4);
        window.record(0, true);
        window.record(1, true);
        assert_eq!(window.accuracy(), 0.5);
    }

    #[test]
    fn positions_wrap_and_overwrite() {
        let mut window = RollingAccuracy::new(4);
        for i in 0..4 {
            window.record(i, false);
        }
        window.record(5, true);
        window.record(6, true);
        window.record(7, true);
        assert_eq!(window.accuracy(), 0.75);
        window.record(4, true);
        assert_eq!(window.accuracy(), 1.0);
    }

    #[test]
    fn default_is_thousand_wide() {
        assert_eq!(RollingAccuracy::default().size(), 1000);
    }
}
