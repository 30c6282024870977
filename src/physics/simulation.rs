//! Frame driver and per-tick simulation stages.
//!
//! [`DropletSimulator::tick`] runs four stages in a fixed order:
//!
//! 1. Kinematics: integrate velocity and position, grow area while marching
//! 2. Boundary: kill droplets that left the bounds, filter the moved set
//! 3. Trail split: shed small dormant droplets behind fast movers
//! 4. Overlap/merge: reactivate isolated dormant droplets, merge overlaps
//!
//! The order is load-bearing: splitting depends on post-clip positions and
//! merging depends on post-split geometry. All randomness flows through the
//! injected generator, so a seeded generator reproduces a run exactly.

use crate::config::{EmitParameters, SimulationConfig};
use crate::physics::droplet::{Droplet, BIRTH_OUTSIDE_CONTACT};
use crate::physics::store::{DropletId, DropletStore};
use glam::Vec2;
use rand::Rng;
use std::collections::BTreeSet;

/// Map a value from `0..1` onto `out_min..out_max`, unclamped.
fn map_range(value: f32, out_min: f32, out_max: f32) -> f32 {
    out_min + (out_max - out_min) * value
}

/// Droplet population simulator.
///
/// Owns the droplet store, the tuning configuration, the injected random
/// source and the accumulated simulation clock. The clock only advances
/// through [`DropletSimulator::tick`]; no process-wide time is read, so
/// tests can drive synthetic time directly.
pub struct DropletSimulator<R: Rng> {
    store: DropletStore,
    config: SimulationConfig,
    rng: R,
    time: f32,
}

impl<R: Rng> DropletSimulator<R> {
    /// Create a simulator with the given configuration and random source.
    pub fn new(config: SimulationConfig, rng: R) -> Self {
        Self {
            store: DropletStore::new(),
            config,
            rng,
            time: 0.0,
        }
    }

    /// Accumulated simulation time in seconds.
    pub fn time(&self) -> f32 {
        self.time
    }

    /// Current configuration.
    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    /// Read-only access to the droplet store.
    pub fn store(&self) -> &DropletStore {
        &self.store
    }

    /// Read-only snapshot iteration for the rendering collaborator.
    pub fn droplets(&self) -> impl Iterator<Item = (DropletId, &Droplet)> {
        self.store.iter()
    }

    /// Advance the simulation by one frame and return the ids of droplets
    /// that moved this tick, post-clip.
    pub fn tick(&mut self, dt: f32, bounds: Vec2) -> BTreeSet<DropletId> {
        self.time += dt;

        let moved = self.advance(dt);
        let moved = self.clip(bounds, &moved);
        self.split_trails(&moved);
        self.resolve_overlaps(&moved);
        moved
    }

    /// Kinematics stage: integrate every droplet, active or not, and report
    /// which ones are in motion.
    ///
    /// Friction selects on the current vertical velocity: a resting droplet
    /// fights static friction and only starts falling once its weight wins.
    /// Velocity never goes negative; droplets do not move upward. A droplet
    /// grows by a random fraction of its marched distance.
    pub fn advance(&mut self, dt: f32) -> BTreeSet<DropletId> {
        let force = self.config.force.clone();
        let growth = self.config.growth.clone();
        let mut moved = BTreeSet::new();

        for id in self.store.ids() {
            let draw: f32 = self.rng.gen_range(0.0..1.0);
            let Some(droplet) = self.store.get_mut(id) else {
                continue;
            };

            let friction = if droplet.velocity.y > 0.0 {
                force.dynamic_friction
            } else {
                force.static_friction
            };
            let downward_force = droplet.mass(force.density) * force.gravity - friction;
            droplet.velocity.y = (droplet.velocity.y + downward_force * dt).max(0.0);

            let step = droplet.velocity * dt * force.velocity_scale;
            droplet.position += step;

            let marched = step.length();
            droplet.distance_since_last_trail += marched;

            let factor = map_range(draw.powf(growth.exponent), growth.factor_min, growth.factor_max);
            droplet.adjust_area(marched * factor);

            if droplet.velocity.y > 0.0 {
                moved.insert(id);
            }
        }

        moved
    }

    /// Boundary stage: kill every droplet whose circle no longer intersects
    /// `[0, bounds.x] x [0, bounds.y]` and return the moved ids that survive.
    pub fn clip(&mut self, bounds: Vec2, moved: &BTreeSet<DropletId>) -> BTreeSet<DropletId> {
        let mut remaining = BTreeSet::new();

        for id in self.store.ids() {
            let Some(droplet) = self.store.get(id) else {
                continue;
            };
            let position = droplet.position;
            let radius = droplet.radius;

            if position.x + radius < 0.0
                || position.y + radius < 0.0
                || position.x - radius > bounds.x
                || position.y - radius > bounds.y
            {
                self.store.kill(id);
            } else if moved.contains(&id) {
                remaining.insert(id);
            }
        }

        remaining
    }

    /// Trail-split stage: fast-moving active droplets that marched past
    /// their shed threshold leave a smaller dormant droplet behind.
    ///
    /// The child spawns offset backward by the parent radius with a little
    /// lateral jitter, stretched in proportion to the parent's downward
    /// speed, and stays dormant until the overlap stage finds it isolated.
    /// The parent loses a fraction of the child's area and some velocity,
    /// simulating drag from shedding mass.
    pub fn split_trails(&mut self, moved: &BTreeSet<DropletId>) {
        let trail = self.config.trail.clone();

        for &id in moved {
            let Some(parent) = self.store.get(id) else {
                continue;
            };
            if !parent.is_active()
                || parent.velocity.length() < trail.split_velocity_threshold
                || parent.distance_since_last_trail < parent.next_trail_distance
            {
                continue;
            }

            let jitter = self
                .rng
                .gen_range(-trail.lateral_jitter..=trail.lateral_jitter);
            let fraction = self
                .rng
                .gen_range(trail.child_radius_min..=trail.child_radius_max);

            let child_position;
            let child_stretch;
            let child_radius;
            {
                let Some(parent) = self.store.get_mut(id) else {
                    continue;
                };
                child_radius = parent.radius * fraction;
                child_position =
                    parent.position + Vec2::new(jitter, -(parent.radius * trail.offset_factor));
                child_stretch = Vec2::new(1.0, 1.0 + parent.velocity.y * trail.stretch_factor);

                // area_loss_factor < 1 keeps the subtracted area below the
                // parent's own, so the clamp in adjust_area never fires here
                parent.adjust_area(-(child_radius * child_radius * trail.area_loss_factor));
                parent.velocity *= trail.velocity_loss_factor;
                parent.reset_trail_accumulator(&mut self.rng, trail.distance_min, trail.distance_max);
            }

            self.spawn(
                child_position,
                Vec2::ZERO,
                child_stretch,
                child_radius,
                BIRTH_OUTSIDE_CONTACT,
            );
        }
    }

    /// Overlap/merge stage.
    ///
    /// Computes every overlapping pair with at least one moved member, each
    /// pair counted once. Dormant droplets appearing in no pair reactivate
    /// with the current simulation time; a trailing droplet becomes real
    /// only once it is clear of its parent and siblings. Overlapping pairs
    /// then merge: the larger droplet absorbs the smaller, gaining a
    /// configured fraction of its area and damping its velocity to conserve
    /// momentum.
    ///
    /// Pairs are discovered in ascending id order and merged in discovery
    /// order; that order decides which droplet survives chained merges and
    /// is what the scenario tests assume. A pair whose member was destroyed
    /// by an earlier merge in the same pass is skipped.
    pub fn resolve_overlaps(&mut self, moved: &BTreeSet<DropletId>) {
        let all_ids = self.store.ids();
        let mut pairs: Vec<(DropletId, DropletId)> = Vec::new();

        for &moved_id in moved {
            let Some(droplet) = self.store.get(moved_id) else {
                continue;
            };
            for &other_id in &all_ids {
                if moved_id == other_id {
                    continue;
                }
                // both-moved pairs would otherwise show up twice
                if moved.contains(&other_id) && moved_id > other_id {
                    continue;
                }
                let Some(other) = self.store.get(other_id) else {
                    continue;
                };
                if droplet.overlaps(other) {
                    pairs.push((moved_id, other_id));
                }
            }
        }

        let mut paired: BTreeSet<DropletId> = BTreeSet::new();
        for &(a, b) in &pairs {
            paired.insert(a);
            paired.insert(b);
        }

        let now = self.time;
        for (id, droplet) in self.store.iter_mut() {
            if droplet.birth_time == BIRTH_OUTSIDE_CONTACT && !paired.contains(&id) {
                droplet.birth_time = now;
            }
        }

        let density = self.config.force.density;
        let gain = self.config.merge.area_gain_factor;
        for (a, b) in pairs {
            // stale-id check: an earlier merge may have consumed either side
            let (Some(first), Some(second)) = (self.store.get(a), self.store.get(b)) else {
                continue;
            };
            let (survivor_id, loser_id, loser_radius) = if first.radius >= second.radius {
                (a, b, second.radius)
            } else {
                (b, a, first.radius)
            };

            if let Some(survivor) = self.store.get_mut(survivor_id) {
                let old_mass = survivor.mass(density);
                survivor.adjust_area(loser_radius * loser_radius * gain);
                let new_mass = survivor.mass(density);
                if new_mass > 0.0 {
                    survivor.velocity *= old_mass / new_mass;
                }
            }
            self.store.kill(loser_id);
        }
    }

    /// Spawn a droplet, drawing its initial trail-shed threshold.
    pub fn spawn(
        &mut self,
        position: Vec2,
        velocity: Vec2,
        stretch: Vec2,
        radius: f32,
        birth_time: f32,
    ) -> DropletId {
        let mut droplet = Droplet::new(position, velocity, stretch, radius, birth_time);
        droplet.reset_trail_accumulator(
            &mut self.rng,
            self.config.trail.distance_min,
            self.config.trail.distance_max,
        );
        self.store.spawn(droplet)
    }

    /// Chance-gated spawn with a shaped random radius, at rest and without
    /// stretch. Returns the new id when the draw passes.
    pub fn emit(
        &mut self,
        params: &EmitParameters,
        position: Vec2,
        birth_time: f32,
    ) -> Option<DropletId> {
        let dice: f32 = self.rng.gen_range(0.0..1.0);
        if dice >= params.chance {
            return None;
        }

        let draw: f32 = self.rng.gen_range(0.0..1.0);
        let radius = map_range(
            draw.powf(params.radius_exponent),
            params.radius_min,
            params.radius_max,
        );
        Some(self.spawn(position, Vec2::ZERO, Vec2::ZERO, radius, birth_time))
    }

    /// Remove and destroy a droplet; absent ids report not-found and no-op.
    pub fn kill(&mut self, id: DropletId) -> bool {
        self.store.kill(id)
    }

    /// Kill every active droplet whose circle intersects the given circle.
    /// Used by the input collaborator for pointer erasing.
    pub fn kill_at(&mut self, center: Vec2, radius: f32) {
        for id in self.store.ids() {
            let Some(droplet) = self.store.get(id) else {
                continue;
            };
            if !droplet.is_active() {
                continue;
            }
            if center.distance(droplet.position) > radius + droplet.radius {
                continue;
            }
            self.store.kill(id);
        }
    }

    /// Mark never-initialized droplets beyond the given circle as dormant,
    /// making them eligible for reactivation once the overlap stage finds
    /// them isolated. Used when a contact point moves away.
    pub fn mark_dormant_outside_contact(&mut self, center: Vec2, radius: f32) {
        for (_, droplet) in self.store.iter_mut() {
            if droplet.is_outside_contact() {
                continue;
            }
            if center.distance(droplet.position) < radius + droplet.radius {
                continue;
            }
            droplet.birth_time = BIRTH_OUTSIDE_CONTACT;
        }
    }

    /// Directly activate every non-active droplet beyond the given circle,
    /// bypassing the overlap stage's reactivation-on-isolation. Low-level
    /// override for the input collaborator.
    pub fn mark_active(&mut self, center: Vec2, radius: f32) {
        let now = self.time;
        for (_, droplet) in self.store.iter_mut() {
            if droplet.is_active() {
                continue;
            }
            if center.distance(droplet.position) < radius + droplet.radius {
                continue;
            }
            droplet.birth_time = now;
        }
    }
}
