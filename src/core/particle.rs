use crate::core::wall::Wall;
use crate::error::{Error, Result};

/// Fixed spatial dimension (2D).
pub const DIM: usize = 2;

/// A point-mass particle with a circular collision extent in D=2.
///
/// Fields:
/// - `r`: position [x, y]
/// - `v`: velocity [vx, vy]
/// - `radius`: collision radius (>= 0)
/// - `mass`: particle mass (> 0)
#[derive(Debug, Clone, PartialEq)]
pub struct Particle {
    /// Position (x, y).
    pub r: [f64; DIM],
    /// Velocity (vx, vy).
    pub v: [f64; DIM],
    /// Collision radius (>= 0).
    pub radius: f64,
    /// Mass (> 0).
    pub mass: f64,
}

impl Particle {
    /// Create a new particle after validating invariants.
    ///
    /// Errors:
    /// - `Error::InvalidParam` if `mass` is non-positive, `radius` is negative,
    ///   or any component is NaN/inf.
    pub fn new(r: [f64; DIM], v: [f64; DIM], radius: f64, mass: f64) -> Result<Self> {
        if !radius.is_finite() || radius < 0.0 {
            return Err(Error::InvalidParam("radius must be finite and >= 0".into()));
        }
        if !mass.is_finite() || mass <= 0.0 {
            return Err(Error::InvalidParam("mass must be finite and > 0".into()));
        }
        if !r.iter().all(|x| x.is_finite()) {
            return Err(Error::InvalidParam("position must be finite".into()));
        }
        if !v.iter().all(|x| x.is_finite()) {
            return Err(Error::InvalidParam("velocity must be finite".into()));
        }
        Ok(Self {
            r,
            v,
            radius,
            mass,
        })
    }

    /// Explicit Euler drift: `r += v * dt`.
    #[inline]
    pub fn advance(&mut self, dt: f64) {
        for (r_k, &v_k) in self.r.iter_mut().zip(&self.v) {
            *r_k += v_k * dt;
        }
    }

    /// True iff the centers are strictly closer than the sum of the radii.
    /// Tangent particles do not collide.
    #[inline]
    pub fn is_colliding(&self, other: &Particle) -> bool {
        let dsq: f64 = self
            .r
            .iter()
            .zip(&other.r)
            .map(|(a, b)| (a - b) * (a - b))
            .sum();
        let reach = self.radius + other.radius;
        dsq < reach * reach
    }

    /// Exchange momentum with `other` using the 1D elastic formula on each axis.
    ///
    /// With `c1 = (m1 - m2) / (m1 + m2)` and `c2 = 2 m1 / (m1 + m2)`:
    /// `v1' = c1 v1 + c2 v2`, `v2' = c2 v1 - c1 v2`, component by component.
    ///
    /// This is exact for a head-on 1D collision only; in 2D it ignores the line
    /// of centers. Both particles are left untouched on error.
    pub fn resolve_collision(&mut self, other: &mut Particle) -> Result<()> {
        let (m1, m2) = (self.mass, other.mass);
        let total = m1 + m2;
        if total == 0.0 || !total.is_finite() {
            return Err(Error::MathError(format!(
                "cannot resolve collision with mass sum {total}"
            )));
        }
        let c1 = (m1 - m2) / total;
        let c2 = (m1 + m1) / total;

        let mut v1 = [0.0_f64; DIM];
        let mut v2 = [0.0_f64; DIM];
        for k in 0..DIM {
            v1[k] = c1 * self.v[k] + c2 * other.v[k];
            v2[k] = c2 * self.v[k] - c1 * other.v[k];
        }
        if !v1.iter().chain(&v2).all(|x| x.is_finite()) {
            return Err(Error::MathError(
                "collision produced a non-finite velocity".into(),
            ));
        }
        self.v = v1;
        other.v = v2;
        Ok(())
    }

    /// Negate the velocity component perpendicular to `wall`. Position is untouched.
    #[inline]
    pub fn reflect_off_wall(&mut self, wall: Wall) {
        let axis = wall.normal_axis();
        self.v[axis] = -self.v[axis];
    }

    /// Returns the particle's kinetic energy: 1/2 m |v|^2.
    #[inline]
    pub fn kinetic_energy(&self) -> f64 {
        let vsq: f64 = self.v.iter().map(|&c| c * c).sum();
        0.5 * self.mass * vsq
    }

    /// Linear momentum m v.
    #[inline]
    pub fn momentum(&self) -> [f64; DIM] {
        [self.mass * self.v[0], self.mass * self.v[1]]
    }
}
