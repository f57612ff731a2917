//! # Particle Field
//!
//! Decorative point sprites scattered around a stage that declares a
//! [`ParticleEmission`] (in the built-in catalog: every nebula).
//!
//! Placement is polar on a disk with an independent depth axis:
//!
//! ```text
//! angle ~ U[0, 2π)        r ~ U[0, spread]
//! x = cos(angle) * r      y = sin(angle) * r      z ~ U[-spread/2, spread/2]
//! ```
//!
//! Each particle also draws a size, a palette color, a starting rotation and
//! an angular velocity. Particles are never removed one by one: the whole set
//! is replaced on regeneration.

use crate::primitives::{NEBULA_PALETTE, PARTICLE_MAX_SIZE, PARTICLE_MAX_SPIN, PARTICLE_MIN_SIZE};
use crate::types::ParticleEmission;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::f64::consts::TAU;

// =============================================================================
// PARTICLE
// =============================================================================

/// A single nebula sprite.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Particle {
    /// Position in scene units, fixed at spawn.
    pub position: [f64; 3],
    /// Quad half-size.
    pub size: f64,
    /// RGBA color taken from [`NEBULA_PALETTE`].
    pub color: [f64; 4],
    /// Current rotation about the vertical axis, degrees in `[0, 360)`.
    pub rotation: f64,
    /// Angular velocity in degrees per tick.
    pub spin: f64,
}

impl Particle {
    /// Spawn a particle somewhere inside a disk of radius `spread`.
    pub fn spawn<R: Rng + ?Sized>(spread: f64, rng: &mut R) -> Self {
        let spread = spread.max(0.0);
        let half_depth = spread / 2.0;

        let angle = rng.random_range(0.0..TAU);
        let radius = rng.random_range(0.0..=spread);
        let depth = rng.random_range(-half_depth..=half_depth);

        Self {
            position: [angle.cos() * radius, angle.sin() * radius, depth],
            size: rng.random_range(PARTICLE_MIN_SIZE..=PARTICLE_MAX_SIZE),
            color: NEBULA_PALETTE[rng.random_range(0..NEBULA_PALETTE.len())],
            rotation: rng.random_range(0.0..360.0),
            spin: rng.random_range(-PARTICLE_MAX_SPIN..=PARTICLE_MAX_SPIN),
        }
    }

    /// Distance from the disk axis.
    #[must_use]
    pub fn radial_distance(&self) -> f64 {
        self.position[0].hypot(self.position[1])
    }

    /// Rotate by `degrees`, wrapping into `[0, 360)`.
    pub fn rotate(&mut self, degrees: f64) {
        self.rotation = wrap_degrees(self.rotation + degrees);
    }
}

fn wrap_degrees(angle: f64) -> f64 {
    let wrapped = angle.rem_euclid(360.0);
    // rem_euclid can round a tiny negative up to exactly 360.0
    if wrapped >= 360.0 { 0.0 } else { wrapped }
}

// =============================================================================
// ROTATION CLOCK
// =============================================================================

/// How particle rotation relates to simulated time.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub enum RotationClock {
    /// One `spin` step per tick regardless of `dt`. Rotation speed follows
    /// the frame rate.
    #[default]
    PerTick,
    /// `spin * dt * ticks_per_second` per tick. Rotation speed is
    /// independent of the frame rate and matches `PerTick` at the reference
    /// rate.
    Scaled { ticks_per_second: f64 },
}

impl RotationClock {
    /// Number of spin steps a tick of `dt` seconds is worth.
    #[must_use]
    pub fn steps(self, dt: f64) -> f64 {
        match self {
            Self::PerTick => 1.0,
            Self::Scaled { ticks_per_second } => dt * ticks_per_second,
        }
    }
}

// =============================================================================
// PARTICLE FIELD
// =============================================================================

/// The active particle set and the clock that animates it.
#[derive(Debug, Clone, Default)]
pub struct ParticleField {
    particles: Vec<Particle>,
    clock: RotationClock,
}

impl ParticleField {
    /// Create an empty field.
    #[must_use]
    pub fn new(clock: RotationClock) -> Self {
        Self {
            particles: Vec::new(),
            clock,
        }
    }

    /// Generate `count` fresh particles over a disk of radius `spread`.
    pub fn generate<R: Rng + ?Sized>(count: usize, spread: f64, rng: &mut R) -> Vec<Particle> {
        (0..count).map(|_| Particle::spawn(spread, rng)).collect()
    }

    /// Replace the whole set according to `emission`.
    pub fn regenerate<R: Rng + ?Sized>(&mut self, emission: ParticleEmission, rng: &mut R) {
        self.particles = Self::generate(emission.count, emission.spread, rng);
    }

    /// Drop every particle.
    pub fn clear(&mut self) {
        self.particles.clear();
    }

    /// Advance every particle's rotation by one tick.
    pub fn update(&mut self, dt: f64) {
        let steps = self.clock.steps(dt);
        for particle in &mut self.particles {
            particle.rotate(particle.spin * steps);
        }
    }

    /// Get the current particles.
    #[must_use]
    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    /// Get the rotation clock.
    #[must_use]
    pub fn clock(&self) -> RotationClock {
        self.clock
    }

    /// Number of particles.
    #[must_use]
    pub fn len(&self) -> usize {
        self.particles.len()
    }

    /// Check if the field is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaChaRng;

    #[test]
    fn generated_particles_stay_in_bounds() {
        let mut rng = ChaChaRng::seed_from_u64(7);
        let particles = ParticleField::generate(500, 3.0, &mut rng);

        assert_eq!(particles.len(), 500);
        for p in &particles {
            assert!(p.radial_distance() <= 3.0 + 1e-9);
            assert!((-1.5..=1.5).contains(&p.position[2]));
            assert!((PARTICLE_MIN_SIZE..=PARTICLE_MAX_SIZE).contains(&p.size));
            assert!((0.0..360.0).contains(&p.rotation));
            assert!(p.spin.abs() <= PARTICLE_MAX_SPIN);
            assert!(NEBULA_PALETTE.contains(&p.color));
        }
    }

    #[test]
    fn zero_spread_collapses_to_origin() {
        let mut rng = ChaChaRng::seed_from_u64(1);
        let particles = ParticleField::generate(10, 0.0, &mut rng);
        for p in &particles {
            assert_eq!(p.radial_distance(), 0.0);
            assert_eq!(p.position[2], 0.0);
        }
    }

    #[test]
    fn same_seed_same_field() {
        let a = ParticleField::generate(50, 2.0, &mut ChaChaRng::seed_from_u64(99));
        let b = ParticleField::generate(50, 2.0, &mut ChaChaRng::seed_from_u64(99));
        assert_eq!(a, b);
    }

    #[test]
    fn rotation_wraps_both_ways() {
        let mut rng = ChaChaRng::seed_from_u64(3);
        let mut p = Particle::spawn(1.0, &mut rng);

        p.rotation = 359.8;
        p.rotate(0.5);
        assert!((p.rotation - 0.3).abs() < 1e-9);

        p.rotation = 0.2;
        p.rotate(-0.5);
        assert!((p.rotation - 359.7).abs() < 1e-9);
    }

    #[test]
    fn per_tick_clock_ignores_dt() {
        let mut rng = ChaChaRng::seed_from_u64(5);
        let mut field = ParticleField::new(RotationClock::PerTick);
        field.regenerate(
            ParticleEmission {
                count: 4,
                spread: 1.0,
            },
            &mut rng,
        );
        let before: Vec<f64> = field.particles().iter().map(|p| p.rotation).collect();

        field.update(10.0);

        for (p, start) in field.particles().iter().zip(before) {
            assert!((p.rotation - wrap_degrees(start + p.spin)).abs() < 1e-9);
        }
    }

    #[test]
    fn scaled_clock_follows_dt() {
        let clock = RotationClock::Scaled {
            ticks_per_second: 60.0,
        };
        assert!((clock.steps(1.0 / 60.0) - 1.0).abs() < 1e-12);
        assert!((clock.steps(0.5) - 30.0).abs() < 1e-12);
    }

    #[test]
    fn clear_empties_the_field() {
        let mut rng = ChaChaRng::seed_from_u64(5);
        let mut field = ParticleField::default();
        field.regenerate(
            ParticleEmission {
                count: 3,
                spread: 1.0,
            },
            &mut rng,
        );
        assert_eq!(field.len(), 3);
        field.clear();
        assert!(field.is_empty());
    }
}
