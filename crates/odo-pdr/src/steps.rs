//! Step-edge detection over the hardware step counter.
//!
//! The counter arrives as a float and is re-based against the first value
//! seen this session, so a warm sensor that already counted steps starts
//! the session at zero. An edge fires when the corrected integer count
//! strictly increases; edge firing alone never triggers estimation — the
//! engine also requires a full observation window.

/// Tracks the monotonic step counter and flags step boundaries.
#[derive(Debug, Clone, Default)]
pub struct StepEdgeDetector {
    step_offset: Option<f64>,
    last_step: Option<u32>,
}

impl StepEdgeDetector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one raw counter value; returns `true` when a step edge fires.
    ///
    /// The first observation latches the session's zero reference and can
    /// never fire. `last` is updated after evaluation regardless of the
    /// outcome.
    pub fn observe(&mut self, raw_step: f64) -> bool {
        let offset = *self.step_offset.get_or_insert(raw_step);
        let corrected = ((raw_step - offset).trunc() as i64).max(0) as u32;

        let edge = matches!(self.last_step, Some(last) if corrected > last);
        self.last_step = Some(corrected);
        edge
    }

    /// Corrected step count after the last observation, if any.
    pub fn corrected_step(&self) -> Option<u32> {
        self.last_step
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_observation_never_fires() {
        let mut d = StepEdgeDetector::new();
        assert!(!d.observe(41.0));
        assert_eq!(d.corrected_step(), Some(0));
    }

    #[test]
    fn test_edge_on_strict_increase() {
        let mut d = StepEdgeDetector::new();
        assert!(!d.observe(10.0));
        assert!(!d.observe(10.0));
        assert!(d.observe(11.0));
        assert!(!d.observe(11.0));
        assert!(d.observe(13.0));
    }

    #[test]
    fn test_counter_below_offset_clamps_to_zero() {
        let mut d = StepEdgeDetector::new();
        d.observe(100.0);
        assert!(!d.observe(95.0));
        assert_eq!(d.corrected_step(), Some(0));
        // recovering past the offset counts from zero again
        assert!(d.observe(101.0));
        assert_eq!(d.corrected_step(), Some(1));
    }

    #[test]
    fn test_corrected_step_non_decreasing_on_monotonic_input() {
        let mut d = StepEdgeDetector::new();
        let mut prev = 0;
        for raw in [5.0, 5.2, 5.9, 6.0, 6.4, 7.1, 9.0, 9.0, 12.5] {
            d.observe(raw);
            let corrected = d.corrected_step().unwrap();
            assert!(corrected >= prev);
            prev = corrected;
        }
    }

    #[test]
    fn test_fractional_counter_truncates() {
        let mut d = StepEdgeDetector::new();
        d.observe(0.0);
        assert!(!d.observe(0.9));
        assert_eq!(d.corrected_step(), Some(0));
        assert!(d.observe(1.1));
        assert_eq!(d.corrected_step(), Some(1));
    }
}
