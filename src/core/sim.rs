use crate::config::SimulationConfig;
use crate::core::event::{CollisionEvent, EventKind};
use crate::core::particle::DIM;
use crate::core::wall::{Wall, WALL_MARGIN};
use crate::core::{Particle, Trajectory};
use crate::error::{Error, Result};
use log::debug;
use rand::{rng, rngs::StdRng, Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// Mass given to generated particles.
pub const DEFAULT_MASS: f64 = 1.0;
/// Collision radius given to generated particles.
pub const DEFAULT_RADIUS: f64 = 1.0;

/// Relative slack when deciding whether `total_time / quantum` is a whole number.
const STEP_RATIO_TOL: f64 = 1e-9;

/// Upper bound on the per-particle path capacity reserved before a run.
const MAX_RESERVED_STEPS: usize = 1 << 16;

/// What happens to a particle found inside a wall's margin band.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BoundaryMode {
    /// Flip the perpendicular velocity component only. A particle that
    /// overshoots the margin stays outside until its own motion brings it back,
    /// and may be flipped again on the next step while still in the band.
    #[default]
    Reflect,
    /// Flip the velocity and snap the position onto the margin line.
    ReflectAndClamp,
}

/// Running collision counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CollisionStats {
    /// Resolved particle-particle collisions.
    pub pair: u64,
    /// Reflections per wall, indexed by `Wall::id() - 1`.
    pub wall: [u64; 4],
}

impl CollisionStats {
    /// Reflections off `wall`.
    pub fn wall_hits(&self, wall: Wall) -> u64 {
        self.wall[wall.index()]
    }

    /// Reflections off all four walls.
    pub fn wall_total(&self) -> u64 {
        self.wall.iter().sum()
    }
}

/// Number of fixed steps executed for `total_time`: `ceil(total_time / quantum)`,
/// treating ratios within floating-point noise of an integer as that integer.
///
/// Errors: `Error::InvalidParam` if the ratio is not finite or does not fit in `usize`.
pub fn step_count(total_time: f64, quantum: f64) -> Result<usize> {
    let ratio = total_time / quantum;
    if !ratio.is_finite() || ratio < 0.0 {
        return Err(Error::InvalidParam(format!(
            "total_time / quantum = {ratio} is not a usable step count"
        )));
    }
    let nearest = ratio.round();
    let steps = if (ratio - nearest).abs() <= STEP_RATIO_TOL * nearest.max(1.0) {
        nearest
    } else {
        ratio.ceil()
    };
    // usize::MAX as f64 rounds up to 2^64, so the comparison must be strict.
    if steps >= usize::MAX as f64 {
        return Err(Error::InvalidParam(format!(
            "total_time / quantum = {ratio} exceeds the supported step count"
        )));
    }
    Ok(steps as usize)
}

/// Generate `count` unit-mass, unit-radius particles.
///
/// Positions are uniform integers in `[1, width] x [1, height]`. The speed scale is
/// `proportionality_factor * sqrt(temperature)`; `vx` and `vy` use the sine and cosine
/// of two independently drawn angles, so the resulting speed is not exactly that scale.
pub fn initialize<R: Rng + ?Sized>(
    count: usize,
    bounds: [u32; DIM],
    temperature: f64,
    proportionality_factor: f64,
    rng: &mut R,
) -> Result<Vec<Particle>> {
    initialize_with(
        count,
        bounds,
        temperature,
        proportionality_factor,
        DEFAULT_MASS,
        DEFAULT_RADIUS,
        rng,
    )
}

/// Like [`initialize`], with an explicit particle mass and collision radius.
pub fn initialize_with<R: Rng + ?Sized>(
    count: usize,
    bounds: [u32; DIM],
    temperature: f64,
    proportionality_factor: f64,
    mass: f64,
    radius: f64,
    rng: &mut R,
) -> Result<Vec<Particle>> {
    if count == 0 {
        return Err(Error::InvalidParam("num_particles must be > 0".into()));
    }
    validate_bounds(bounds)?;
    if !temperature.is_finite() || temperature < 0.0 {
        return Err(Error::InvalidParam(
            "temperature must be finite and >= 0".into(),
        ));
    }
    if !proportionality_factor.is_finite() {
        return Err(Error::InvalidParam(
            "proportionality_factor must be finite".into(),
        ));
    }

    let speed = proportionality_factor * temperature.sqrt();
    let mut particles = Vec::with_capacity(count);
    for _ in 0..count {
        let vx = speed * (2.0 * PI * rng.random::<f64>()).sin();
        let vy = speed * (2.0 * PI * rng.random::<f64>()).cos();
        let x = rng.random_range(1..=bounds[0]);
        let y = rng.random_range(1..=bounds[1]);
        particles.push(Particle::new(
            [f64::from(x), f64::from(y)],
            [vx, vy],
            radius,
            mass,
        )?);
    }
    Ok(particles)
}

/// Rectangular container `[0, width] x [0, height]` driving a fixed-step simulation.
///
/// Each step moves every particle by one quantum, reflects it off any wall whose
/// margin band it is in, records its truncated position, then makes one pass over
/// all pairs `i < j` resolving overlaps.
#[derive(Debug)]
pub struct Container {
    time_now: f64,
    steps: u64,
    quantum: f64,
    bounds: [u32; DIM],
    boundary: BoundaryMode,
    pub particles: Vec<Particle>,
    stats: CollisionStats,
    events: Option<Vec<CollisionEvent>>,
}

impl Container {
    /// Wrap an existing particle collection.
    ///
    /// Errors: `Error::InvalidParam` for an empty collection, a zero bound, or a
    /// quantum that is not finite and > 0.
    pub fn new(particles: Vec<Particle>, bounds: [u32; DIM], quantum: f64) -> Result<Self> {
        if particles.is_empty() {
            return Err(Error::InvalidParam("num_particles must be > 0".into()));
        }
        validate_bounds(bounds)?;
        validate_quantum(quantum)?;
        Ok(Self {
            time_now: 0.0,
            steps: 0,
            quantum,
            bounds,
            boundary: BoundaryMode::default(),
            particles,
            stats: CollisionStats::default(),
            events: None,
        })
    }

    /// Build a container with generated particles from `config`.
    ///
    /// With `config.seed` set the layout is reproducible; otherwise it is seeded
    /// from the thread RNG.
    pub fn seeded(config: &SimulationConfig) -> Result<Self> {
        config.validate()?;
        let mut rng: StdRng = match config.seed {
            Some(s) => SeedableRng::seed_from_u64(s),
            None => SeedableRng::seed_from_u64(rng().random()),
        };
        Self::from_rng(config, &mut rng)
    }

    /// Build a container from `config`, drawing initial conditions from `rng`.
    pub fn from_rng<R: Rng + ?Sized>(config: &SimulationConfig, rng: &mut R) -> Result<Self> {
        let c = &config.container;
        let init = &config.initial;
        validate_quantum(c.quantum)?;
        let particles = initialize_with(
            c.num_particles,
            c.bounds,
            init.temperature,
            init.proportionality_factor,
            init.mass,
            init.collision_radius,
            rng,
        )?;
        let mut container = Self::new(particles, c.bounds, c.quantum)?;
        container.boundary = config.boundary;
        Ok(container)
    }

    /// Elapsed simulated time (`steps() * quantum()`).
    pub fn time(&self) -> f64 {
        self.time_now
    }

    /// Steps executed so far.
    pub fn steps(&self) -> u64 {
        self.steps
    }

    /// Time advanced per step.
    pub fn quantum(&self) -> f64 {
        self.quantum
    }

    /// Container size [width, height].
    pub fn bounds(&self) -> [u32; DIM] {
        self.bounds
    }

    /// Number of particles.
    pub fn num_particles(&self) -> usize {
        self.particles.len()
    }

    /// Current wall handling mode.
    pub fn boundary(&self) -> BoundaryMode {
        self.boundary
    }

    /// Change wall handling for subsequent steps.
    pub fn set_boundary(&mut self, boundary: BoundaryMode) {
        self.boundary = boundary;
    }

    /// Positions as a Vec of fixed-size arrays.
    pub fn positions(&self) -> Vec<[f64; DIM]> {
        self.particles.iter().map(|p| p.r).collect()
    }

    /// Velocities as a Vec of fixed-size arrays.
    pub fn velocities(&self) -> Vec<[f64; DIM]> {
        self.particles.iter().map(|p| p.v).collect()
    }

    /// Total kinetic energy.
    pub fn kinetic_energy(&self) -> f64 {
        self.particles.iter().map(Particle::kinetic_energy).sum()
    }

    /// Total linear momentum.
    pub fn momentum(&self) -> [f64; DIM] {
        self.particles.iter().fold([0.0; DIM], |acc, p| {
            let m = p.momentum();
            [acc[0] + m[0], acc[1] + m[1]]
        })
    }

    /// Collision counters accumulated since construction.
    pub fn stats(&self) -> CollisionStats {
        self.stats
    }

    /// Turn the collision event log on or off. Turning it off drops logged events.
    pub fn record_events(&mut self, enabled: bool) {
        match (enabled, self.events.is_some()) {
            (true, false) => self.events = Some(Vec::new()),
            (false, true) => self.events = None,
            _ => {}
        }
    }

    /// Logged events in the order they were resolved (empty when logging is off).
    pub fn events(&self) -> &[CollisionEvent] {
        self.events.as_deref().unwrap_or(&[])
    }

    /// Drop logged events, keeping the log enabled.
    pub fn clear_events(&mut self) {
        if let Some(events) = self.events.as_mut() {
            events.clear();
        }
    }

    /// Simulate for `total_time` and return the positions recorded at every step.
    ///
    /// Runs `ceil(total_time / quantum)` full steps, so the final step may carry
    /// the clock past `total_time`. Any error aborts the run; no partial
    /// trajectory is returned.
    pub fn run(&mut self, total_time: f64) -> Result<Trajectory> {
        if !total_time.is_finite() || total_time <= 0.0 {
            return Err(Error::InvalidParam(
                "total_time must be finite and > 0".into(),
            ));
        }
        let steps = step_count(total_time, self.quantum)?;
        debug!(
            "running {} particles for {} steps of {} (t = {} -> {})",
            self.particles.len(),
            steps,
            self.quantum,
            self.time_now,
            self.time_now + steps as f64 * self.quantum
        );

        let mut trajectory =
            Trajectory::with_particles(self.particles.len(), steps.min(MAX_RESERVED_STEPS));
        for _ in 0..steps {
            self.step(&mut trajectory)?;
        }

        debug!(
            "run finished at t = {}: {} pair collisions, {} wall reflections so far",
            self.time_now,
            self.stats.pair,
            self.stats.wall_total()
        );
        Ok(trajectory)
    }

    /// Execute one step, appending each particle's position to `trajectory`.
    pub fn step(&mut self, trajectory: &mut Trajectory) -> Result<()> {
        let dt = self.quantum;
        let step = self.steps;
        let t_end = (self.steps + 1) as f64 * self.quantum;
        let extent = [f64::from(self.bounds[0]), f64::from(self.bounds[1])];

        for i in 0..self.particles.len() {
            self.particles[i].advance(dt);
            for wall in walls_in_reach(self.particles[i].r, extent) {
                self.reflect(i, wall, t_end, step)?;
            }
            trajectory.record(i, self.particles[i].r);
        }

        // Single pass; velocities changed earlier in the pass are used as-is.
        let n = self.particles.len();
        for i in 0..n {
            for j in (i + 1)..n {
                let (head, tail) = self.particles.split_at_mut(j);
                let (a, b) = (&mut head[i], &mut tail[0]);
                if !a.is_colliding(b) {
                    continue;
                }
                a.resolve_collision(b)?;
                self.stats.pair += 1;
                if let Some(events) = self.events.as_mut() {
                    events.push(CollisionEvent::new(t_end, step, EventKind::Pair { i, j })?);
                }
            }
        }

        self.steps += 1;
        self.time_now = t_end;
        Ok(())
    }

    /// Windowed mechanical pressure from wall impulses logged in the last `window`
    /// of simulated time, per unit wall length. `wall = None` averages over the
    /// whole perimeter.
    ///
    /// Errors: `Error::InvalidParam` if `window` is not finite and > 0 or the
    /// event log is disabled.
    pub fn mechanical_pressure(&self, window: f64, wall: Option<Wall>) -> Result<f64> {
        if !window.is_finite() || window <= 0.0 {
            return Err(Error::InvalidParam("window must be finite and > 0".into()));
        }
        let events = self.events.as_ref().ok_or_else(|| {
            Error::InvalidParam("event log is disabled; enable it with record_events(true)".into())
        })?;
        let since = self.time_now - window;
        let impulse: f64 = events
            .iter()
            .filter(|e| e.time_f64() > since)
            .filter_map(CollisionEvent::wall_impulse)
            .filter(|(w, _)| wall.is_none_or(|want| want == *w))
            .map(|(_, j)| j)
            .sum();
        let length = match wall {
            Some(w) => w.length(self.bounds),
            None => Wall::ALL.iter().map(|w| w.length(self.bounds)).sum(),
        };
        Ok(impulse / (window * length))
    }

    // ============ Internal helpers ============

    fn reflect(&mut self, i: usize, wall: Wall, time: f64, step: u64) -> Result<()> {
        let axis = wall.normal_axis();
        let p = &mut self.particles[i];
        if let Some(events) = self.events.as_mut() {
            events.push(CollisionEvent::wall_hit(time, step, i, wall, p.mass, p.v[axis])?);
        }
        p.reflect_off_wall(wall);
        if self.boundary == BoundaryMode::ReflectAndClamp {
            p.r[axis] = match wall {
                Wall::Left | Wall::Bottom => WALL_MARGIN,
                Wall::Right | Wall::Top => f64::from(self.bounds[axis]) - WALL_MARGIN,
            };
        }
        self.stats.wall[wall.index()] += 1;
        Ok(())
    }
}

// ============ Utility helpers ============

/// Walls whose margin band contains `r`, in check order left, bottom, right, top.
/// Near a corner two walls are returned.
fn walls_in_reach(r: [f64; DIM], extent: [f64; DIM]) -> impl Iterator<Item = Wall> {
    let [x, y] = r;
    let [w, h] = extent;
    [
        (x < WALL_MARGIN, Wall::Left),
        (y < WALL_MARGIN, Wall::Bottom),
        (x > w - WALL_MARGIN, Wall::Right),
        (y > h - WALL_MARGIN, Wall::Top),
    ]
    .into_iter()
    .filter_map(|(hit, wall)| hit.then_some(wall))
}

fn validate_bounds(bounds: [u32; DIM]) -> Result<()> {
    if bounds.contains(&0) {
        return Err(Error::InvalidParam("bounds must be > 0".into()));
    }
    Ok(())
}

fn validate_quantum(quantum: f64) -> Result<()> {
    if !quantum.is_finite() || quantum <= 0.0 {
        return Err(Error::InvalidParam("quantum must be finite and > 0".into()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lone(r: [f64; DIM], v: [f64; DIM]) -> Result<Container> {
        Container::new(vec![Particle::new(r, v, 1.0, 1.0)?], [300, 300], 1.0)
    }

    #[test]
    fn step_count_is_ceiling() -> Result<()> {
        assert_eq!(step_count(1500.0, 2.0)?, 750);
        assert_eq!(step_count(10.0, 3.0)?, 4);
        assert_eq!(step_count(1.0, 0.1)?, 10);
        assert_eq!(step_count(0.3, 0.1)?, 3);
        assert_eq!(step_count(0.5, 2.0)?, 1);
        Ok(())
    }

    #[test]
    fn step_count_rejects_unrepresentable_ratios() {
        assert!(matches!(step_count(1.0, 5e-324), Err(Error::InvalidParam(_))));
        assert!(matches!(step_count(1e300, 1e-300), Err(Error::InvalidParam(_))));
        assert!(step_count(f64::NAN, 1.0).is_err());
    }

    #[test]
    fn tiny_quantum_run_is_an_error_not_a_panic() -> Result<()> {
        let mut c = Container::new(
            vec![Particle::new([150.0, 150.0], [0.0, 0.0], 1.0, 1.0)?],
            [300, 300],
            5e-324,
        )?;
        assert!(matches!(c.run(1.0), Err(Error::InvalidParam(_))));
        assert_eq!(c.steps(), 0);
        Ok(())
    }

    #[test]
    fn walls_in_reach_corner_hits_two() {
        let hits: Vec<Wall> = walls_in_reach([0.2, 99.8], [100.0, 100.0]).collect();
        assert_eq!(hits, vec![Wall::Left, Wall::Top]);
        let none: Vec<Wall> = walls_in_reach([0.5, 99.5], [100.0, 100.0]).collect();
        assert!(none.is_empty());
    }

    #[test]
    fn new_rejects_bad_construction() -> Result<()> {
        let p = Particle::new([1.0, 1.0], [0.0, 0.0], 1.0, 1.0)?;
        assert!(Container::new(Vec::new(), [10, 10], 1.0).is_err());
        assert!(Container::new(vec![p.clone()], [0, 10], 1.0).is_err());
        assert!(Container::new(vec![p.clone()], [10, 10], 0.0).is_err());
        assert!(Container::new(vec![p], [10, 10], f64::NAN).is_err());
        Ok(())
    }

    #[test]
    fn time_tracks_steps() -> Result<()> {
        let mut c = lone([150.0, 150.0], [0.0, 0.0])?;
        c.run(2.5)?;
        assert_eq!(c.steps(), 3);
        assert_eq!(c.time(), 3.0);
        Ok(())
    }

    #[test]
    fn clamp_snaps_onto_margin() -> Result<()> {
        let mut c = lone([0.3, 10.0], [-5.0, 0.0])?;
        c.set_boundary(BoundaryMode::ReflectAndClamp);
        let mut t = Trajectory::with_particles(1, 1);
        c.step(&mut t)?;
        assert_eq!(c.particles[0].r, [WALL_MARGIN, 10.0]);
        assert_eq!(c.particles[0].v, [5.0, 0.0]);
        Ok(())
    }

    #[test]
    fn stats_count_reflections() -> Result<()> {
        let mut c = lone([0.3, 0.3], [-1.0, -1.0])?;
        c.run(1.0)?;
        let stats = c.stats();
        assert_eq!(stats.wall_hits(Wall::Left), 1);
        assert_eq!(stats.wall_hits(Wall::Bottom), 1);
        assert_eq!(stats.wall_total(), 2);
        assert_eq!(stats.pair, 0);
        Ok(())
    }

    #[test]
    fn events_logged_only_when_enabled() -> Result<()> {
        let mut c = lone([0.3, 10.0], [-5.0, 0.0])?;
        c.run(1.0)?;
        assert!(c.events().is_empty());

        c.record_events(true);
        c.run(1.0)?;
        assert_eq!(c.events().len(), 1);
        assert_eq!(c.events()[0].step, 1);
        assert_eq!(c.events()[0].time_f64(), 2.0);

        c.clear_events();
        assert!(c.events().is_empty());
        Ok(())
    }

    #[test]
    fn log_keeps_resolution_order_within_a_step() -> Result<()> {
        let a = Particle::new([0.3, 10.0], [-0.1, 0.0], 1.0, 1.0)?;
        let b = Particle::new([1.0, 10.0], [0.0, 0.0], 1.0, 1.0)?;
        let mut c = Container::new(vec![a, b], [300, 300], 1.0)?;
        c.record_events(true);
        c.run(1.0)?;
        let kinds: Vec<EventKind> = c.events().iter().map(|e| e.kind).collect();
        assert_eq!(kinds.len(), 2);
        assert!(matches!(kinds[0], EventKind::Wall { i: 0, wall: Wall::Left, .. }));
        assert_eq!(kinds[1], EventKind::Pair { i: 0, j: 1 });
        Ok(())
    }

    #[test]
    fn pressure_requires_log_and_positive_window() -> Result<()> {
        let mut c = lone([0.3, 10.0], [-5.0, 0.0])?;
        assert!(c.mechanical_pressure(1.0, None).is_err());
        c.record_events(true);
        assert!(c.mechanical_pressure(0.0, None).is_err());
        c.run(1.0)?;
        // One left-wall hit: impulse 2 * 1 * 5 = 10 over a wall of length 300.
        let p_left = c.mechanical_pressure(1.0, Some(Wall::Left))?;
        assert!((p_left - 10.0 / 300.0).abs() < 1e-12);
        assert_eq!(c.mechanical_pressure(1.0, Some(Wall::Right))?, 0.0);
        let p_all = c.mechanical_pressure(1.0, None)?;
        assert!((p_all - 10.0 / 1200.0).abs() < 1e-12);
        Ok(())
    }
}
