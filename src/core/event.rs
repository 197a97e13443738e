use crate::core::wall::Wall;
use crate::error::{Error, Result};
use ordered_float::NotNan;

/// What happened in a logged collision.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    /// Particle-particle collision between particles `i < j`.
    Pair { i: usize, j: usize },
    /// Particle `i` reflected off `wall`, transferring `impulse` = 2 m |v_perp|.
    Wall {
        i: usize,
        wall: Wall,
        impulse: NotNan<f64>,
    },
}

/// A collision recorded during a run. The container's log keeps events in the
/// order they were resolved: a step's wall reflections, then its pair collisions.
///
/// - `time`: simulated time at the end of the step in which it was resolved.
/// - `step`: zero-based index of that step.
/// - `kind`: participants (and impulse, for wall hits).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CollisionEvent {
    pub time: NotNan<f64>,
    pub step: u64,
    pub kind: EventKind,
}

impl CollisionEvent {
    /// Create a new event, validating that time is finite and non-NaN.
    pub fn new(time: f64, step: u64, kind: EventKind) -> Result<Self> {
        if !time.is_finite() {
            return Err(Error::InvalidParam("event time must be finite".into()));
        }
        let time = NotNan::new(time)
            .map_err(|_| Error::InvalidParam("event time cannot be NaN".into()))?;
        Ok(Self { time, step, kind })
    }

    /// Build a wall event from the pre-reflection perpendicular velocity.
    pub fn wall_hit(time: f64, step: u64, i: usize, wall: Wall, mass: f64, v_perp: f64) -> Result<Self> {
        let impulse = NotNan::new(2.0 * mass * v_perp.abs())
            .map_err(|_| Error::MathError("wall impulse is NaN".into()))?;
        Self::new(time, step, EventKind::Wall { i, wall, impulse })
    }

    /// Returns the raw f64 event time.
    #[inline]
    pub fn time_f64(&self) -> f64 {
        self.time.into_inner()
    }

    /// Impulse transferred to a wall, or `None` for pair events.
    #[inline]
    pub fn wall_impulse(&self) -> Option<(Wall, f64)> {
        match self.kind {
            EventKind::Wall { wall, impulse, .. } => Some((wall, impulse.into_inner())),
            EventKind::Pair { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_event_rejects_nan_time() {
        let err = CollisionEvent::new(f64::NAN, 0, EventKind::Pair { i: 1, j: 2 }).unwrap_err();
        assert!(err.to_string().contains("finite"));
    }

    #[test]
    fn wall_hit_rejects_nan_impulse() {
        let err = CollisionEvent::wall_hit(1.0, 0, 0, Wall::Left, f64::NAN, 1.0).unwrap_err();
        assert!(matches!(err, Error::MathError(_)));
    }

    #[test]
    fn wall_impulse_uses_speed_magnitude() -> Result<()> {
        let e = CollisionEvent::wall_hit(1.0, 0, 2, Wall::Right, 2.0, -1.5)?;
        assert_eq!(e.wall_impulse(), Some((Wall::Right, 6.0)));
        let p = CollisionEvent::new(1.0, 0, EventKind::Pair { i: 0, j: 1 })?;
        assert_eq!(p.wall_impulse(), None);
        Ok(())
    }
}
