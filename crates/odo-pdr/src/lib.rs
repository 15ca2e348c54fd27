//! # Odo-PDR
//!
//! Live pedestrian dead-reckoning loop: parses a `|`-delimited IMU stream,
//! integrates heading from the gyroscope, detects step edges from the
//! hardware step counter, assembles fixed-size observation windows, invokes
//! the step-length estimator and integrates estimates into a 2D trajectory
//! that is flushed exactly once at session end.
//!
//! All mutable state is owned by a single [`PdrEngine`] per session; the
//! loop is strictly single-threaded and cooperative.

pub mod engine;
pub mod frame;
pub mod heading;
pub mod recorder;
pub mod session;
pub mod source;
pub mod steps;
pub mod trajectory;
pub mod window;

pub use engine::{FrameOutcome, PdrEngine};
pub use frame::parse_frame;
pub use heading::HeadingTracker;
pub use recorder::{FlushOutcome, SessionRecorder};
pub use session::{run_session, SessionSummary, Termination};
pub use source::{FrameSource, ReplaySource, SerialFrameSource, SourceRead};
pub use steps::StepEdgeDetector;
pub use trajectory::{Trajectory, TrajectoryObserver};
pub use window::WindowBuffer;
