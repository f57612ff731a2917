//! # Engine Primitives
//!
//! Hardcoded runtime constants for the stellar engine.
//!
//! The engine starts from a fixed mass domain, fixed input steps and fixed
//! particle sampling ranges. These are compiled into the binary and are
//! immutable at runtime; only the mass-range table itself is configurable.

// =============================================================================
// MASS DOMAIN
// =============================================================================

/// Lower bound of the supported mass domain, in solar masses.
pub const MIN_MASS: f64 = 0.08;

/// Upper bound of the supported mass domain, in solar masses.
pub const MAX_MASS: f64 = 50.0;

/// Mass the simulation starts at (one solar mass).
pub const INITIAL_MASS: f64 = 1.0;

/// Mass change applied by a single mass-up / mass-down input event.
pub const MASS_STEP: f64 = 0.1;

// =============================================================================
// PLAYBACK SPEED
// =============================================================================

/// Slowest allowed playback multiplier.
pub const MIN_SPEED: f64 = 0.1;

/// Fastest allowed playback multiplier.
pub const MAX_SPEED: f64 = 4.0;

/// Factor applied by speed-up (multiply) and speed-down (divide).
pub const SPEED_FACTOR: f64 = 1.5;

/// Nominal duration, in seconds, reported by an interpolated snapshot.
///
/// A transition snapshot is never scheduled; this value only feeds the
/// "time until next stage" readout for the one frame it is shown.
pub const TRANSITION_DISPLAY_SECONDS: f64 = 1.0;

// =============================================================================
// PARTICLES
// =============================================================================

/// Smallest particle quad half-size.
pub const PARTICLE_MIN_SIZE: f64 = 0.02;

/// Largest particle quad half-size.
pub const PARTICLE_MAX_SIZE: f64 = 0.08;

/// Largest absolute angular velocity, in degrees per tick.
pub const PARTICLE_MAX_SPIN: f64 = 0.5;

/// Maximum particles a single stage may declare.
///
/// The largest built-in nebula uses 15,000.
pub const MAX_PARTICLE_COUNT: usize = 100_000;

/// Translucent nebula palette (RGBA). Particles pick one entry uniformly.
pub const NEBULA_PALETTE: [[f64; 4]; 4] = [
    [0.6, 0.4, 0.8, 0.3],
    [0.3, 0.4, 0.8, 0.3],
    [0.8, 0.4, 0.6, 0.3],
    [0.4, 0.6, 0.8, 0.3],
];

/// Seed used when the caller does not supply one.
pub const DEFAULT_SEED: u64 = 0x5741_5253;

// =============================================================================
// TEXTURES
// =============================================================================

/// Reserved texture key meaning "no texture, use the procedural fallback".
pub const NO_TEXTURE: &str = "NO-TEXTURE";
