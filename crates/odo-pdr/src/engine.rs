//! The PDR engine: one instance owns all mutable state for one session.
//!
//! Per incoming frame: integrate heading, append a feature vector to the
//! window, evaluate the step-edge detector, and on a qualifying edge with a
//! full window run the fill-estimate-clear cycle — drain, scale, estimate,
//! clamp, advance the trajectory, record the step.

use tracing::{debug, warn};

use odo_core::{
    EngineConfig, Error, FeatureVector, Position2D, Result, SensorFrame, SessionId,
    StandardScaler, StepLengthEstimator, StepRecord, WalkerProfile,
};

use crate::frame::parse_frame;
use crate::heading::HeadingTracker;
use crate::recorder::{FlushOutcome, SessionRecorder};
use crate::steps::StepEdgeDetector;
use crate::trajectory::{Trajectory, TrajectoryObserver};
use crate::window::WindowBuffer;

/// What one accepted frame produced.
#[derive(Debug)]
pub enum FrameOutcome {
    /// Frame absorbed into heading/window/step state; no estimation ran
    Buffered,
    /// A step edge fired with a full window and the estimate succeeded
    Step(StepRecord),
    /// A step edge fired with a full window but the estimator failed; the
    /// window was still cleared and accumulation restarts
    EstimateSkipped(Error),
}

/// Live dead-reckoning engine for a single session.
pub struct PdrEngine {
    session_id: SessionId,
    config: EngineConfig,
    profile: WalkerProfile,
    scaler: StandardScaler,
    estimator: Box<dyn StepLengthEstimator>,

    heading: HeadingTracker,
    steps: StepEdgeDetector,
    window: WindowBuffer,
    trajectory: Trajectory,
    recorder: SessionRecorder,
}

impl PdrEngine {
    pub fn new(
        config: EngineConfig,
        profile: WalkerProfile,
        scaler: StandardScaler,
        estimator: Box<dyn StepLengthEstimator>,
    ) -> Self {
        Self {
            session_id: SessionId::new(),
            heading: HeadingTracker::new(config.dt_s),
            steps: StepEdgeDetector::new(),
            window: WindowBuffer::new(config.window_size),
            trajectory: Trajectory::new(),
            recorder: SessionRecorder::new(),
            config,
            profile,
            scaler,
            estimator,
        }
    }

    /// Register a trajectory observer (e.g. a live renderer).
    pub fn with_observer(mut self, observer: Box<dyn TrajectoryObserver>) -> Self {
        self.trajectory.add_observer(observer);
        self
    }

    /// Parse and process one raw line. A malformed line returns an error
    /// before any state is touched; the caller logs it and continues.
    pub fn process_line(&mut self, line: &str) -> Result<FrameOutcome> {
        let frame = parse_frame(line)?;
        Ok(self.process_frame(&frame))
    }

    /// Process one already-parsed frame.
    pub fn process_frame(&mut self, frame: &SensorFrame) -> FrameOutcome {
        self.heading.integrate(frame.gz);

        let fv = FeatureVector::from_frame(frame, &self.profile, self.heading.radians());
        self.window.push(fv);

        let edge = self.steps.observe(frame.raw_step);
        if !edge || !self.window.is_full() {
            return FrameOutcome::Buffered;
        }

        debug!(
            corrected_step = self.steps.corrected_step(),
            heading_deg = self.heading.degrees(),
            "step edge with full window"
        );
        self.run_estimation_cycle()
    }

    /// Drain the window, scale it, run the estimator and integrate the
    /// clamped result. The window is consumed even when estimation fails.
    fn run_estimation_cycle(&mut self) -> FrameOutcome {
        let window = self.window.drain();
        let scaled = self.scaler.transform(&window);

        let raw = match self.estimator.estimate(&scaled) {
            Ok(value) if value.is_finite() => value,
            Ok(value) => {
                return FrameOutcome::EstimateSkipped(Error::Estimation(format!(
                    "estimator returned non-finite value {value}"
                )))
            }
            Err(e) => return FrameOutcome::EstimateSkipped(e),
        };

        let length = raw.clamp(self.config.min_step_m, self.config.max_step_m);
        if length != raw {
            warn!(raw, clamped = length, "estimate outside plausible bounds");
        }

        let step_index = self.recorder.next_index();
        let heading_deg = self.heading.degrees();
        let position = self.trajectory.advance(heading_deg, length, step_index);

        let record = StepRecord {
            step_index,
            step_length_m: length,
            x_m: position.x,
            y_m: position.y,
            heading_deg,
        };
        self.recorder.record(record);
        FrameOutcome::Step(record)
    }

    /// Flush the session log to the sink. Delegated to by the session
    /// runner exactly once per session.
    pub fn flush_records(&mut self, out: &mut dyn std::io::Write) -> Result<FlushOutcome> {
        self.recorder.flush(out)
    }

    pub fn session_id(&self) -> SessionId {
        self.session_id
    }

    pub fn position(&self) -> Position2D {
        self.trajectory.position()
    }

    pub fn heading_degrees(&self) -> f64 {
        self.heading.degrees()
    }

    pub fn steps_recorded(&self) -> usize {
        self.recorder.len()
    }

    pub fn window_len(&self) -> usize {
        self.window.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedEstimator(f64);

    impl StepLengthEstimator for FixedEstimator {
        fn estimate(&self, _window: &[FeatureVector]) -> Result<f64> {
            Ok(self.0)
        }
    }

    struct FailingEstimator;

    impl StepLengthEstimator for FailingEstimator {
        fn estimate(&self, _window: &[FeatureVector]) -> Result<f64> {
            Err(Error::Estimation("model unavailable".into()))
        }
    }

    fn engine_with(estimator: Box<dyn StepLengthEstimator>) -> PdrEngine {
        PdrEngine::new(
            EngineConfig::default(),
            WalkerProfile::default(),
            StandardScaler::identity(),
            estimator,
        )
    }

    fn line(step: f64) -> String {
        format!("{step}|0.0|0.0|0.0|0.1|0.2|9.8|0.0")
    }

    #[test]
    fn test_no_edge_fills_window_without_estimation() {
        let mut engine = engine_with(Box::new(FixedEstimator(1.0)));
        for _ in 0..50 {
            let outcome = engine.process_line(&line(7.0)).unwrap();
            assert!(matches!(outcome, FrameOutcome::Buffered));
        }
        assert_eq!(engine.window_len(), 50);
        assert_eq!(engine.steps_recorded(), 0);
    }

    #[test]
    fn test_edge_with_full_window_estimates_once_and_clears() {
        let mut engine = engine_with(Box::new(FixedEstimator(1.0)));
        for _ in 0..50 {
            engine.process_line(&line(7.0)).unwrap();
        }
        let outcome = engine.process_line(&line(8.0)).unwrap();
        match outcome {
            FrameOutcome::Step(record) => {
                assert_eq!(record.step_index, 1);
                assert_eq!(record.step_length_m, 1.0);
            }
            other => panic!("expected a step, got {other:?}"),
        }
        // the cycle consumed the window; only frames after the drain remain
        assert_eq!(engine.window_len(), 0);
        assert_eq!(engine.steps_recorded(), 1);
    }

    #[test]
    fn test_failed_estimate_still_clears_window() {
        let mut engine = engine_with(Box::new(FailingEstimator));
        for _ in 0..50 {
            engine.process_line(&line(7.0)).unwrap();
        }
        let outcome = engine.process_line(&line(8.0)).unwrap();
        assert!(matches!(outcome, FrameOutcome::EstimateSkipped(_)));
        assert_eq!(engine.window_len(), 0);
        assert_eq!(engine.steps_recorded(), 0);
        let pos = engine.position();
        assert_eq!((pos.x, pos.y), (0.0, 0.0));
    }

    #[test]
    fn test_edge_without_full_window_waits() {
        let mut engine = engine_with(Box::new(FixedEstimator(1.0)));
        for _ in 0..10 {
            engine.process_line(&line(7.0)).unwrap();
        }
        let outcome = engine.process_line(&line(8.0)).unwrap();
        assert!(matches!(outcome, FrameOutcome::Buffered));
        assert_eq!(engine.steps_recorded(), 0);
    }

    #[test]
    fn test_low_estimate_clamped_to_minimum() {
        let mut engine = engine_with(Box::new(FixedEstimator(-5.0)));
        for _ in 0..50 {
            engine.process_line(&line(7.0)).unwrap();
        }
        match engine.process_line(&line(8.0)).unwrap() {
            FrameOutcome::Step(record) => assert_eq!(record.step_length_m, 0.3),
            other => panic!("expected a step, got {other:?}"),
        }
    }

    #[test]
    fn test_high_estimate_clamped_to_maximum() {
        let mut engine = engine_with(Box::new(FixedEstimator(10.0)));
        for _ in 0..50 {
            engine.process_line(&line(7.0)).unwrap();
        }
        match engine.process_line(&line(8.0)).unwrap() {
            FrameOutcome::Step(record) => assert_eq!(record.step_length_m, 1.5),
            other => panic!("expected a step, got {other:?}"),
        }
    }

    #[test]
    fn test_non_finite_estimate_skips_position_update() {
        let mut engine = engine_with(Box::new(FixedEstimator(f64::NAN)));
        for _ in 0..50 {
            engine.process_line(&line(7.0)).unwrap();
        }
        let outcome = engine.process_line(&line(8.0)).unwrap();
        assert!(matches!(outcome, FrameOutcome::EstimateSkipped(Error::Estimation(_))));
        let pos = engine.position();
        assert_eq!((pos.x, pos.y), (0.0, 0.0));
    }

    #[test]
    fn test_malformed_line_leaves_state_unchanged() {
        let mut engine = engine_with(Box::new(FixedEstimator(1.0)));
        engine.process_line(&line(7.0)).unwrap();
        engine.process_line("45|0.0|50.0|1.0|0.1|0.2|9.8|0.0").unwrap();

        let heading_before = engine.heading_degrees();
        let window_before = engine.window_len();
        let corrected_before = engine.steps.corrected_step();
        let position_before = engine.position();

        assert!(engine.process_line("1|2|3").is_err());
        assert!(engine.process_line("1|2|x|4|5|6|7|8").is_err());

        assert_eq!(engine.heading_degrees(), heading_before);
        assert_eq!(engine.window_len(), window_before);
        assert_eq!(engine.steps.corrected_step(), corrected_before);
        assert_eq!(engine.position(), position_before);
    }

    #[test]
    fn test_step_indices_are_sequential() {
        let mut engine = engine_with(Box::new(FixedEstimator(0.8)));
        let mut indices = Vec::new();
        let mut step = 7.0;
        for round in 0..3 {
            for _ in 0..50 {
                engine.process_line(&line(step)).unwrap();
            }
            step += 1.0;
            if let FrameOutcome::Step(record) = engine.process_line(&line(step)).unwrap() {
                indices.push(record.step_index);
            } else {
                panic!("round {round} should have recorded a step");
            }
        }
        assert_eq!(indices, vec![1, 2, 3]);
    }

    #[test]
    fn test_position_advances_along_heading() {
        // straight walk at heading 0: every step moves +x by the estimate
        let mut engine = engine_with(Box::new(FixedEstimator(1.0)));
        for _ in 0..50 {
            engine.process_line(&line(7.0)).unwrap();
        }
        engine.process_line(&line(8.0)).unwrap();
        let pos = engine.position();
        assert!((pos.x - 1.0).abs() < 1e-9);
        assert!(pos.y.abs() < 1e-9);
    }
}
