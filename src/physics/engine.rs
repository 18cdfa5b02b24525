//! One fixed-order physics step over a [`BodyStore`].
//!
//! Order per step:
//! 1. sum attraction from every other body, clamp to `max_velocity`
//! 2. `vel += force * mass_factor * dt` (clamped), then `pos += vel * dt`
//! 3. mark bodies past `bounds` for eviction
//! 4. pairwise merge scan over unmarked bodies, marking the absorbed one
//! 5. remove every marked body at once and release its id
//!
//! `dt` is multiplied by `time_scale` before any of this.

use log::debug;
use ultraviolet::Vec2;

use crate::bodies::{Body, BodyId, BodyStore};
use crate::error::SettingsError;
use crate::physics::forces::{attraction, clamp_magnitude, mass_factor};
use crate::settings::SimulationSettings;

/// What a step removed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StepReport {
    pub evicted: Vec<BodyId>,
    /// `(survivor, absorbed)` in scan order
    pub absorbed: Vec<(BodyId, BodyId)>,
}

impl StepReport {
    pub fn is_empty(&self) -> bool {
        self.evicted.is_empty() && self.absorbed.is_empty()
    }
}

#[derive(Debug, Clone)]
pub struct PhysicsEngine {
    settings: SimulationSettings,
    forces: Vec<Vec2>,
    marked: Vec<bool>,
}

impl PhysicsEngine {
    /// Validates `settings`; a degenerate configuration is refused here and
    /// never checked again per step.
    pub fn new(settings: SimulationSettings) -> Result<Self, SettingsError> {
        settings.validate()?;
        Ok(Self {
            settings,
            forces: Vec::new(),
            marked: Vec::new(),
        })
    }

    pub fn settings(&self) -> &SimulationSettings {
        &self.settings
    }

    pub fn step(&mut self, store: &mut BodyStore, dt: f32) -> StepReport {
        let dt = dt * self.settings.time_scale;
        let mut report = StepReport::default();

        let bodies = store.bodies_mut();
        if bodies.is_empty() {
            return report;
        }

        self.accumulate_forces(bodies);
        self.integrate(bodies, dt, &mut report);
        self.resolve_merges(bodies, &mut report);

        let removed = store.remove_marked(&self.marked);
        debug_assert_eq!(removed.len(), report.evicted.len() + report.absorbed.len());
        if !report.is_empty() {
            debug!(
                "step removed {} bodies ({} evicted, {} absorbed)",
                removed.len(),
                report.evicted.len(),
                report.absorbed.len()
            );
        }
        report
    }

    fn accumulate_forces(&mut self, bodies: &[Body]) {
        let g = self.settings.gravity_constant;
        let max = self.settings.max_velocity;

        self.forces.clear();
        for (i, bi) in bodies.iter().enumerate() {
            let mut force = Vec2::zero();
            for (j, bj) in bodies.iter().enumerate() {
                if i == j {
                    continue;
                }
                force += attraction(g, bi.pos, bj.pos, bj.mass());
            }
            self.forces.push(clamp_magnitude(force, max));
        }
    }

    fn integrate(&mut self, bodies: &mut [Body], dt: f32, report: &mut StepReport) {
        let max = self.settings.max_velocity;
        let bounds = self.settings.bounds;

        self.marked.clear();
        self.marked.resize(bodies.len(), false);

        for (i, (body, force)) in bodies.iter_mut().zip(&self.forces).enumerate() {
            let dv = *force * mass_factor(body.mass()) * dt;
            body.vel = clamp_magnitude(body.vel + dv, max);
            body.pos += body.vel * dt;

            // No wrap or reset: the body is simply gone after this step
            if body.pos.mag() > bounds {
                self.marked[i] = true;
                report.evicted.push(body.id);
                debug!("body {} left bounds at ({}, {})", body.id, body.pos.x, body.pos.y);
            }
        }
    }

    fn resolve_merges(&mut self, bodies: &mut [Body], report: &mut StepReport) {
        let absorb_rate = self.settings.absorb_rate;
        let exponent = self.settings.mass_exponent;
        let n = bodies.len();

        for i in 0..n {
            for j in (i + 1)..n {
                if self.marked[i] {
                    break;
                }
                if self.marked[j] {
                    continue;
                }

                let distance = (bodies[i].pos - bodies[j].pos).mag();
                if distance >= bodies[i].radius() + bodies[j].radius() {
                    continue;
                }

                let (survivor, absorbed) = if survives(&bodies[i], &bodies[j]) { (i, j) } else { (j, i) };
                // Velocity of the survivor is left as is
                let amount = bodies[absorbed].radius() * absorb_rate;
                bodies[survivor].grow(amount, exponent);
                self.marked[absorbed] = true;

                report.absorbed.push((bodies[survivor].id, bodies[absorbed].id));
                debug!(
                    "body {} absorbed body {} (r={})",
                    bodies[survivor].id,
                    bodies[absorbed].id,
                    bodies[survivor].radius()
                );
            }
        }
    }
}

/// Larger radius wins; equal radii keep the lower id.
fn survives(a: &Body, b: &Body) -> bool {
    if a.radius() != b.radius() {
        a.radius() > b.radius()
    } else {
        a.id < b.id
    }
}
