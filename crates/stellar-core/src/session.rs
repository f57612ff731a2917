//! # Simulation Session
//!
//! Combines the stage timeline with the interactive controls:
//! - mass (classified into a range; a range change restarts the star)
//! - playback speed (applied to every tick's `dt`)
//! - pause (ticks keep producing frames but time stands still)
//!
//! ## Frame Flow
//!
//! ```text
//! InputEvent* ──▶ Simulation::handle ──▶ Simulation::tick(frame_seconds)
//!                                             │
//!                                             ▼
//!                                        FrameView ──▶ Presenter::present
//! ```
//!
//! The speed multiplier survives a mass change; everything owned by the
//! timeline does not.

use crate::catalog::{Catalog, MassRange, MassRangeId};
use crate::classifier::clamp_mass;
use crate::primitives::{INITIAL_MASS, MASS_STEP, MAX_SPEED, MIN_SPEED, SPEED_FACTOR};
use crate::timeline::{StageSnapshot, StageTimeline, TimelineConfig};
use crate::types::StellarError;

// =============================================================================
// SPEED CONTROL
// =============================================================================

/// Playback multiplier clamped to `[MIN_SPEED, MAX_SPEED]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpeedControl {
    multiplier: f64,
}

impl Default for SpeedControl {
    fn default() -> Self {
        Self { multiplier: 1.0 }
    }
}

impl SpeedControl {
    /// Create a control at `multiplier`, clamped.
    #[must_use]
    pub fn new(multiplier: f64) -> Self {
        let mut speed = Self::default();
        speed.set(multiplier);
        speed
    }

    /// Get the current multiplier.
    #[must_use]
    pub fn multiplier(self) -> f64 {
        self.multiplier
    }

    /// Set the multiplier, clamped. Non-finite input is ignored.
    pub fn set(&mut self, multiplier: f64) {
        if multiplier.is_finite() {
            self.multiplier = multiplier.clamp(MIN_SPEED, MAX_SPEED);
        } else {
            tracing::warn!(multiplier, "Ignoring non-finite speed multiplier");
        }
    }

    /// Multiply by `SPEED_FACTOR`, up to `MAX_SPEED`.
    pub fn faster(&mut self) {
        self.set(self.multiplier * SPEED_FACTOR);
    }

    /// Divide by `SPEED_FACTOR`, down to `MIN_SPEED`.
    pub fn slower(&mut self) {
        self.set(self.multiplier / SPEED_FACTOR);
    }

    /// Scale a wall-clock delta into simulated time.
    #[must_use]
    pub fn scale(self, wall_seconds: f64) -> f64 {
        wall_seconds * self.multiplier
    }
}

// =============================================================================
// INPUT
// =============================================================================

/// A discrete user action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InputEvent {
    /// Add `MASS_STEP` solar masses.
    MassUp,
    /// Remove `MASS_STEP` solar masses.
    MassDown,
    /// Multiply playback speed by `SPEED_FACTOR`.
    SpeedUp,
    /// Divide playback speed by `SPEED_FACTOR`.
    SpeedDown,
    /// Freeze or resume simulated time.
    TogglePause,
}

impl InputEvent {
    /// Parse the CLI spelling of an event.
    pub fn parse(name: &str) -> Result<Self, StellarError> {
        match name.trim() {
            "mass-up" => Ok(Self::MassUp),
            "mass-down" => Ok(Self::MassDown),
            "speed-up" => Ok(Self::SpeedUp),
            "speed-down" => Ok(Self::SpeedDown),
            "pause" => Ok(Self::TogglePause),
            other => Err(StellarError::InvalidInput(format!(
                "unknown action '{}' (expected mass-up, mass-down, speed-up, speed-down, pause)",
                other
            ))),
        }
    }
}

// =============================================================================
// FRAME VIEW
// =============================================================================

/// Everything a presenter needs to draw one frame.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameView<'a> {
    /// 1-based frame counter.
    pub frame: u64,
    pub mass: f64,
    pub range_name: &'a str,
    pub speed: f64,
    pub paused: bool,
    pub snapshot: StageSnapshot<'a>,
}

impl FrameView<'_> {
    /// Wall-clock seconds until the stage ends at the current speed.
    #[must_use]
    pub fn remaining_wall_seconds(&self) -> Option<f64> {
        self.snapshot.remaining().map(|secs| secs / self.speed)
    }
}

/// Consumer of frame views (renderer, HUD, recorder).
///
/// # Extension Point
///
/// The engine ships no presenters. Rendering backends implement this trait
/// and receive one view per tick; the view borrows engine state and must be
/// consumed before the next tick.
pub trait Presenter {
    /// Draw or record one frame.
    fn present(&mut self, view: &FrameView<'_>) -> Result<(), StellarError>;

    /// Flush any buffered output after the last frame.
    fn finish(&mut self) -> Result<(), StellarError> {
        Ok(())
    }
}

// =============================================================================
// SIMULATION
// =============================================================================

/// Starting conditions for a [`Simulation`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimulationConfig {
    /// Initial mass; clamped into the domain.
    pub mass: f64,
    /// Initial playback multiplier; clamped.
    pub speed: f64,
    pub timeline: TimelineConfig,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            mass: INITIAL_MASS,
            speed: 1.0,
            timeline: TimelineConfig::default(),
        }
    }
}

/// An interactive run over one catalog.
#[derive(Debug, Clone)]
pub struct Simulation<'c> {
    catalog: &'c Catalog,
    mass: f64,
    range_id: MassRangeId,
    speed: SpeedControl,
    paused: bool,
    frame: u64,
    timeline: StageTimeline<'c>,
}

impl<'c> Simulation<'c> {
    /// Start a simulation at `config.mass`.
    pub fn new(catalog: &'c Catalog, config: SimulationConfig) -> Result<Self, StellarError> {
        let mass = clamp_mass(config.mass);
        let (range_id, range) = catalog.classify_range(mass)?;

        tracing::info!(
            mass,
            range = range.name(),
            speed = config.speed,
            seed = config.timeline.seed,
            "Simulation started"
        );

        Ok(Self {
            catalog,
            mass,
            range_id,
            speed: SpeedControl::new(config.speed),
            paused: false,
            frame: 0,
            timeline: StageTimeline::new(range, config.timeline),
        })
    }

    /// Move the mass by `delta`, clamped. Returns `true` when the mass
    /// crossed into another range and the star was restarted.
    pub fn adjust_mass(&mut self, delta: f64) -> Result<bool, StellarError> {
        self.set_mass(self.mass + delta)
    }

    /// Set the mass, clamped. Returns `true` when the range changed.
    pub fn set_mass(&mut self, mass: f64) -> Result<bool, StellarError> {
        let mass = clamp_mass(mass);
        let (range_id, range) = self.catalog.classify_range(mass)?;
        self.mass = mass;

        if range_id == self.range_id {
            return Ok(false);
        }

        tracing::info!(
            mass,
            from = self.timeline.range().name(),
            to = range.name(),
            "Mass range changed, restarting star"
        );
        self.range_id = range_id;
        self.timeline.reset(range);
        Ok(true)
    }

    /// Apply one input event.
    pub fn handle(&mut self, event: InputEvent) -> Result<(), StellarError> {
        match event {
            InputEvent::MassUp => {
                self.adjust_mass(MASS_STEP)?;
            }
            InputEvent::MassDown => {
                self.adjust_mass(-MASS_STEP)?;
            }
            InputEvent::SpeedUp => self.speed.faster(),
            InputEvent::SpeedDown => self.speed.slower(),
            InputEvent::TogglePause => {
                self.paused = !self.paused;
                tracing::debug!(paused = self.paused, "Pause toggled");
            }
        }
        Ok(())
    }

    /// Run one frame of `frame_seconds` wall-clock time.
    ///
    /// While paused the frame counter still moves but the timeline is only
    /// observed, not advanced.
    pub fn tick(&mut self, frame_seconds: f64) -> FrameView<'_> {
        self.frame = self.frame.saturating_add(1);
        let range_name = self.timeline.range().name();

        let snapshot = if self.paused {
            self.timeline.snapshot()
        } else {
            self.timeline.advance(self.speed.scale(frame_seconds))
        };

        FrameView {
            frame: self.frame,
            mass: self.mass,
            range_name,
            speed: self.speed.multiplier(),
            paused: self.paused,
            snapshot,
        }
    }

    /// Observe the current frame without ticking.
    #[must_use]
    pub fn view(&self) -> FrameView<'_> {
        FrameView {
            frame: self.frame,
            mass: self.mass,
            range_name: self.timeline.range().name(),
            speed: self.speed.multiplier(),
            paused: self.paused,
            snapshot: self.timeline.snapshot(),
        }
    }

    /// Get the current mass.
    #[must_use]
    pub fn mass(&self) -> f64 {
        self.mass
    }

    /// Get the active range id.
    #[must_use]
    pub fn range_id(&self) -> MassRangeId {
        self.range_id
    }

    /// Get the active range.
    #[must_use]
    pub fn range(&self) -> &'c MassRange {
        self.timeline.range()
    }

    /// Get the speed control.
    #[must_use]
    pub fn speed(&self) -> SpeedControl {
        self.speed
    }

    /// Check if simulated time is frozen.
    #[must_use]
    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Number of frames ticked so far.
    #[must_use]
    pub fn frame(&self) -> u64 {
        self.frame
    }

    /// Get the underlying timeline.
    #[must_use]
    pub fn timeline(&self) -> &StageTimeline<'c> {
        &self.timeline
    }
}

// =============================================================================
// TESTS
// =============================================================================
