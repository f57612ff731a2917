//! # Core Type Definitions
//!
//! This module contains the value types shared by every part of the engine:
//! - Visual parameters (`Color`, `TextureRef`)
//! - Stage descriptors (`StageDuration`, `ParticleEmission`, `Stage`)
//! - Error types (`StellarError`)
//!
//! ## Immutability
//!
//! Stages are built once when a catalog is loaded and only ever handed out
//! by shared reference afterwards. Nothing in the engine mutates a `Stage`.

use crate::primitives::NO_TEXTURE;
use serde::{Deserialize, Serialize};
use thiserror::Error;

// =============================================================================
// COLOR
// =============================================================================

/// Three-channel base color, each channel in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Color(pub [f64; 3]);

impl Color {
    /// Create a color from its channels.
    #[must_use]
    pub const fn new(r: f64, g: f64, b: f64) -> Self {
        Self([r, g, b])
    }

    /// Get the channels as an array.
    #[must_use]
    pub const fn channels(self) -> [f64; 3] {
        self.0
    }

    /// Check that every channel is a finite value in `[0, 1]`.
    #[must_use]
    pub fn is_normalized(self) -> bool {
        self.0.iter().all(|c| (0.0..=1.0).contains(c))
    }
}

// =============================================================================
// TEXTURE REFERENCE
// =============================================================================

/// Key of the texture a presenter should wrap around the star.
///
/// The engine never resolves textures. `Procedural` is the reserved
/// [`NO_TEXTURE`] key and tells the presenter to generate its own surface.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum TextureRef {
    /// A named texture asset.
    Asset(String),
    /// No texture; use the procedural fallback.
    Procedural,
}

impl TextureRef {
    /// Build a reference from a raw key, mapping the sentinel to `Procedural`.
    #[must_use]
    pub fn from_key(key: impl Into<String>) -> Self {
        let key = key.into();
        if key == NO_TEXTURE || key.is_empty() {
            Self::Procedural
        } else {
            Self::Asset(key)
        }
    }

    /// Get the raw key, the sentinel for `Procedural`.
    #[must_use]
    pub fn key(&self) -> &str {
        match self {
            Self::Asset(key) => key,
            Self::Procedural => NO_TEXTURE,
        }
    }

    /// Check whether the presenter must fall back to a procedural surface.
    #[must_use]
    pub fn is_procedural(&self) -> bool {
        matches!(self, Self::Procedural)
    }
}

impl From<String> for TextureRef {
    fn from(key: String) -> Self {
        Self::from_key(key)
    }
}

impl From<TextureRef> for String {
    fn from(texture: TextureRef) -> Self {
        texture.key().to_string()
    }
}

impl std::fmt::Display for TextureRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.key())
    }
}

// =============================================================================
// STAGE DESCRIPTORS
// =============================================================================

/// How long a stage lasts before it starts blending into the next one.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StageDuration {
    /// Finite duration, in simulated seconds.
    Finite(f64),
    /// Terminal stage: never transitions.
    Unbounded,
}

impl StageDuration {
    /// Build a finite duration from milliseconds.
    #[must_use]
    pub fn from_millis(ms: u64) -> Self {
        Self::Finite(ms as f64 / 1000.0)
    }

    /// Get the duration in seconds, `None` when unbounded.
    #[must_use]
    pub fn seconds(self) -> Option<f64> {
        match self {
            Self::Finite(secs) => Some(secs),
            Self::Unbounded => None,
        }
    }

    /// Check if this duration marks a terminal stage.
    #[must_use]
    pub fn is_unbounded(self) -> bool {
        matches!(self, Self::Unbounded)
    }
}

/// Ambient particles spawned while a stage is active.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ParticleEmission {
    /// Number of particles in the field.
    pub count: usize,
    /// Radius of the disk the particles are scattered over.
    pub spread: f64,
}

/// One named phase of a star's life.
#[derive(Debug, Clone, PartialEq)]
pub struct Stage {
    /// Display name ("Nebula", "Red Giant", ...).
    pub name: String,
    /// Time spent in the stage before the transition starts.
    pub duration: StageDuration,
    /// Base color of the star.
    pub color: Color,
    /// Radius in scene units. Zero is allowed (a nebula has no body).
    pub radius: f64,
    /// Emission intensity, `>= 0`.
    pub emission: f64,
    /// Texture the presenter should use.
    pub texture: TextureRef,
    /// Human-readable description for the overlay.
    pub description: String,
    /// Seconds spent blending into the next stage.
    pub transition: f64,
    /// Particle field owned by this stage, if any.
    pub particles: Option<ParticleEmission>,
}

impl Stage {
    /// Check if this stage is terminal.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        self.duration.is_unbounded()
    }

    /// Check if this stage owns a particle field.
    #[must_use]
    pub fn emits_particles(&self) -> bool {
        self.particles.is_some()
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.duration {
            StageDuration::Finite(secs) => write!(f, "{} ({:.1}s)", self.name, secs),
            StageDuration::Unbounded => write!(f, "{} (final)", self.name),
        }
    }
}

// =============================================================================
// ERROR TYPES
// =============================================================================

/// Errors that can occur in the stellar engine.
///
/// - Configuration problems are fatal and surface at startup
/// - Contract violations at tick time are clamped, never raised
/// - The engine should never panic
#[derive(Debug, Clone, PartialEq, Error)]
pub enum StellarError {
    /// The mass-range table is malformed or does not cover the mass domain.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// No mass range contains the given mass.
    #[error("Configuration error: no mass range contains {mass} solar masses")]
    NoMatchingRange { mass: f64 },

    /// A catalog file could not be parsed.
    #[error("Deserialization error: {0}")]
    Deserialization(String),

    /// A catalog could not be rendered.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    Io(String),

    /// Caller-supplied input could not be understood.
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

// =============================================================================
// TESTS
// =============================================================================
