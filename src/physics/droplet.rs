//! Single droplet record and its pure derived quantities.
//!
//! A droplet is a circular particle with a position, a velocity, a visual
//! stretch factor and a lifecycle marker. The marker is a tri-state float:
//!
//! 1. [`BIRTH_NOT_INITIALIZED`]: spawned but never eligible to activate
//! 2. [`BIRTH_OUTSIDE_CONTACT`]: released from the contact area, pending
//!    reactivation once it stops overlapping its neighbors
//! 3. A non-negative timestamp: active, with the value feeding age-based
//!    rendering animation only
//!
//! The states are ordered: `BIRTH_NOT_INITIALIZED < BIRTH_OUTSIDE_CONTACT <=
//! any real timestamp`, so the two eligibility predicates are plain
//! comparisons.

use glam::Vec2;
use rand::Rng;

/// Birth marker for a droplet that has never been eligible to activate.
pub const BIRTH_NOT_INITIALIZED: f32 = -2.0;

/// Birth marker for a droplet pending reactivation outside the contact area.
pub const BIRTH_OUTSIDE_CONTACT: f32 = -1.0;

/// A single simulated droplet.
#[derive(Debug, Clone)]
pub struct Droplet {
    /// Center position in simulation-space units
    pub position: Vec2,
    /// Current velocity; the vertical component drives downward motion
    pub velocity: Vec2,
    /// Per-axis visual elongation, consumed only by rendering
    pub stretch: Vec2,
    /// Circular collision and visual radius, never negative
    pub radius: f32,
    /// Lifecycle marker, see the module documentation
    pub birth_time: f32,
    /// Distance marched since the last trail shed
    pub distance_since_last_trail: f32,
    /// Marched distance at which the next trail shed happens
    pub next_trail_distance: f32,
}

impl Droplet {
    /// Create a new droplet.
    ///
    /// The trail threshold starts at zero; callers that want trail shedding
    /// draw it via [`Droplet::reset_trail_accumulator`].
    pub fn new(position: Vec2, velocity: Vec2, stretch: Vec2, radius: f32, birth_time: f32) -> Self {
        Self {
            position,
            velocity,
            stretch,
            radius,
            birth_time,
            distance_since_last_trail: 0.0,
            next_trail_distance: 0.0,
        }
    }

    /// A droplet is active once it carries a real birth timestamp.
    pub fn is_active(&self) -> bool {
        self.birth_time >= 0.0
    }

    /// A droplet is eligible for reactivation once it has been released
    /// from the contact area (or is already active).
    pub fn is_outside_contact(&self) -> bool {
        self.birth_time >= BIRTH_OUTSIDE_CONTACT
    }

    /// Mass under the given density factor.
    pub fn mass(&self, density: f32) -> f32 {
        self.radius * self.radius * density
    }

    /// Whether this droplet's circle intersects another's.
    pub fn overlaps(&self, other: &Droplet) -> bool {
        self.position.distance(other.position) <= self.radius + other.radius
    }

    /// Adjust the droplet's area by `delta`, keeping radius arithmetic
    /// conservative: `radius = sqrt(radius^2 + delta)`.
    ///
    /// Callers are expected to keep `radius^2 + delta` non-negative; if the
    /// result would be negative the radius is clamped to zero and a warning
    /// is logged rather than producing a NaN radius.
    pub fn adjust_area(&mut self, delta: f32) {
        let area = self.radius * self.radius + delta;
        if area < 0.0 {
            log::warn!(
                "area adjustment {} on radius {} clamped to zero",
                delta,
                self.radius
            );
            self.radius = 0.0;
        } else {
            self.radius = area.sqrt();
        }
    }

    /// Zero the trail accumulator and redraw the next shed threshold
    /// uniformly from `min..=max`.
    pub fn reset_trail_accumulator<R: Rng>(&mut self, rng: &mut R, min: f32, max: f32) {
        self.distance_since_last_trail = 0.0;
        self.next_trail_distance = rng.gen_range(min..=max);
    }

    /// Seconds since activation, clamped to zero. Inactive droplets have no
    /// age. Rendering uses this for the pop-in animation.
    pub fn age(&self, now: f32) -> f32 {
        if self.is_active() {
            (now - self.birth_time).max(0.0)
        } else {
            0.0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn droplet_at(x: f32, y: f32, radius: f32) -> Droplet {
        Droplet::new(Vec2::new(x, y), Vec2::ZERO, Vec2::ONE, radius, 0.0)
    }

    #[test]
    fn test_birth_state_ordering() {
        assert!(BIRTH_NOT_INITIALIZED < BIRTH_OUTSIDE_CONTACT);
        assert!(BIRTH_OUTSIDE_CONTACT < 0.0);

        let mut droplet = droplet_at(0.0, 0.0, 1.0);
        droplet.birth_time = BIRTH_NOT_INITIALIZED;
        assert!(!droplet.is_active());
        assert!(!droplet.is_outside_contact());

        droplet.birth_time = BIRTH_OUTSIDE_CONTACT;
        assert!(!droplet.is_active());
        assert!(droplet.is_outside_contact());

        droplet.birth_time = 3.5;
        assert!(droplet.is_active());
        assert!(droplet.is_outside_contact());
    }

    #[test]
    fn test_mass() {
        let droplet = droplet_at(0.0, 0.0, 2.0);
        assert!((droplet.mass(25.0) - 100.0).abs() < 1e-6);
    }

    #[test]
    fn test_overlap() {
        let a = droplet_at(0.0, 0.0, 0.5);
        let b = droplet_at(0.8, 0.0, 0.5);
        assert!(a.overlaps(&b)); // 0.5 + 0.5 > 0.8

        let c = droplet_at(1.5, 0.0, 0.5);
        assert!(!a.overlaps(&c)); // 0.5 + 0.5 < 1.5
    }

    #[test]
    fn test_adjust_area_grow_and_shrink() {
        let mut droplet = droplet_at(0.0, 0.0, 1.0);
        droplet.adjust_area(3.0);
        assert!((droplet.radius - 2.0).abs() < 1e-6);

        droplet.adjust_area(-3.0);
        assert!((droplet.radius - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_adjust_area_clamps_to_zero() {
        let mut droplet = droplet_at(0.0, 0.0, 1.0);
        droplet.adjust_area(-2.0);
        assert_eq!(droplet.radius, 0.0);
    }

    #[test]
    fn test_trail_accumulator_reset() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut droplet = droplet_at(0.0, 0.0, 1.0);
        droplet.distance_since_last_trail = 12.0;

        droplet.reset_trail_accumulator(&mut rng, 20.0, 50.0);
        assert_eq!(droplet.distance_since_last_trail, 0.0);
        assert!(droplet.next_trail_distance >= 20.0);
        assert!(droplet.next_trail_distance <= 50.0);
    }

    #[test]
    fn test_age() {
        let mut droplet = droplet_at(0.0, 0.0, 1.0);
        droplet.birth_time = 2.0;
        assert!((droplet.age(2.5) - 0.5).abs() < 1e-6);

        droplet.birth_time = BIRTH_OUTSIDE_CONTACT;
        assert_eq!(droplet.age(2.5), 0.0);
    }
}
