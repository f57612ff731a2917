//! # stellar-core
//!
//! The stage timeline engine for the stellar life cycle viewer - THE ENGINE.
//!
//! A star of a given mass walks an ordered sequence of stages (nebula,
//! protostar, main sequence, ... remnant). This crate decides which stage is
//! showing, for how long, and how two adjacent stages blend into each other.
//! It produces a snapshot per tick; drawing that snapshot is someone else's
//! job.
//!
//! ## Layout
//!
//! - `catalog` → validated mass-range table (built-in or TOML)
//! - `classifier` → mass → range
//! - `timeline` → the stage state machine
//! - `particles` → nebula particle field
//! - `session` → mass / speed / pause controls and the `Presenter` seam
//!
//! ## Architectural Constraints
//!
//! The ENGINE:
//! - Is synchronous and single-threaded: one `tick` per frame
//! - Is deterministic given its inputs and a particle seed
//! - Never resolves textures or touches a window
//! - Never panics on caller input; bad deltas are clamped

// =============================================================================
// MODULES
// =============================================================================

pub mod catalog;
pub mod classifier;
pub mod interpolation;
pub mod particles;
pub mod primitives;
pub mod session;
pub mod timeline;
pub mod types;

// =============================================================================
// RE-EXPORTS: Core Types (from types module)
// =============================================================================

pub use types::{Color, ParticleEmission, Stage, StageDuration, StellarError, TextureRef};

// =============================================================================
// RE-EXPORTS: Engine
// =============================================================================

pub use catalog::{Catalog, MassRange, MassRangeId, builtin_catalog};
pub use classifier::clamp_mass;
pub use interpolation::{ease, interpolate, interpolate_color};
pub use particles::{Particle, ParticleField, RotationClock};
pub use session::{FrameView, InputEvent, Presenter, Simulation, SimulationConfig, SpeedControl};
pub use timeline::{StageSnapshot, StageTimeline, TimelineConfig, TimelinePhase, TransitionInfo};
