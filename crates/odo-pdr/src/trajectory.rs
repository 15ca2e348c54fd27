//! Position integration and trajectory history.
//!
//! The integrator advances a running `(x, y)` by projecting each clamped
//! step length along the current heading. Rendering concerns live behind
//! [`TrajectoryObserver`]: the live plot of the original tooling is just
//! one possible observer and stays outside this crate.

use odo_core::Position2D;

/// Notified after every position update.
pub trait TrajectoryObserver {
    fn on_position(&mut self, position: &Position2D, step_index: u32);
}

/// Running 2D position with append-only history, origin-seeded.
pub struct Trajectory {
    current: Position2D,
    history: Vec<Position2D>,
    observers: Vec<Box<dyn TrajectoryObserver>>,
}

impl Trajectory {
    pub fn new() -> Self {
        let origin = Position2D::origin();
        Self {
            current: origin,
            history: vec![origin],
            observers: Vec::new(),
        }
    }

    pub fn add_observer(&mut self, observer: Box<dyn TrajectoryObserver>) {
        self.observers.push(observer);
    }

    /// Advance by one step: `dx = cos(h)·len`, `dy = sin(h)·len`.
    /// Only invoked after a successful, clamped estimate.
    pub fn advance(&mut self, heading_deg: f64, length_m: f64, step_index: u32) -> Position2D {
        let heading_rad = heading_deg.to_radians();
        self.current.x += heading_rad.cos() * length_m;
        self.current.y += heading_rad.sin() * length_m;
        self.history.push(self.current);

        for observer in &mut self.observers {
            observer.on_position(&self.current, step_index);
        }
        self.current
    }

    pub fn position(&self) -> Position2D {
        self.current
    }

    pub fn history(&self) -> &[Position2D] {
        &self.history
    }

    /// Total path length walked so far.
    pub fn path_length(&self) -> f64 {
        self.history
            .windows(2)
            .map(|pair| pair[0].distance_to(&pair[1]))
            .sum()
    }
}

impl Default for Trajectory {
    fn default() -> Self {
        Self::new()
    }
}
