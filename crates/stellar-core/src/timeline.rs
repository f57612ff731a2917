//! # Stage Timeline
//!
//! The state machine that walks a mass range's stage sequence.
//!
//! ## States
//!
//! | Phase | Meaning | Leaves when |
//! |-------|---------|-------------|
//! | `Steady(i)` | Showing stage `i` as declared | stage time `>=` duration |
//! | `Transitioning(i, j, te)` | Blending `i` into `j = i + 1` | `te / transition(i) >= 1` |
//! | `Steady(last)` | Terminal stage | never |
//!
//! ## Tick Rules
//!
//! - `dt` arrives already scaled by the playback speed.
//! - The tick that finishes a stage still reports that stage; the blend
//!   becomes visible on the following tick.
//! - The tick that finishes a transition reports the destination stage
//!   exactly, with zero elapsed time.
//! - Particles rotate only while a particle-owning stage is steady, and are
//!   dropped when any stage after the first is committed.
//! - Negative or non-finite `dt` is clamped to zero.

use crate::catalog::MassRange;
use crate::interpolation::{interpolate, interpolate_color};
use crate::particles::{Particle, ParticleField, RotationClock};
use crate::primitives::{DEFAULT_SEED, TRANSITION_DISPLAY_SECONDS};
use crate::types::{Color, Stage, StageDuration, TextureRef};
use rand::SeedableRng;
use rand_chacha::ChaChaRng;

// =============================================================================
// PHASE
// =============================================================================

/// Where the timeline is within its stage sequence.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TimelinePhase {
    /// Showing a single stage.
    Steady { index: usize },
    /// Blending `from` into `to`; `elapsed` is time spent in the blend.
    Transitioning { from: usize, to: usize, elapsed: f64 },
}

impl TimelinePhase {
    /// Index of the stage that currently owns the timeline.
    #[must_use]
    pub fn stage_index(self) -> usize {
        match self {
            Self::Steady { index } => index,
            Self::Transitioning { from, .. } => from,
        }
    }

    /// Check if a blend is in progress.
    #[must_use]
    pub fn is_transitioning(self) -> bool {
        matches!(self, Self::Transitioning { .. })
    }
}

// =============================================================================
// SNAPSHOT
// =============================================================================

/// Blend position reported by an interpolated snapshot.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TransitionInfo {
    pub from: usize,
    pub to: usize,
    /// Linear progress in `[0, 1)`; easing is already applied to the values.
    pub progress: f64,
}

/// Read-only output of one tick, consumed by a presenter before the next.
#[derive(Debug, Clone, PartialEq)]
pub struct StageSnapshot<'a> {
    /// Stage name, or `"A -> B"` while blending.
    pub name: String,
    pub color: Color,
    pub radius: f64,
    pub emission: f64,
    /// Texture of the stage, or of the source stage while blending.
    pub texture: TextureRef,
    pub description: String,
    /// Stage duration; a fixed nominal second while blending.
    pub duration: StageDuration,
    /// Simulated seconds spent in the stage; zero while blending.
    pub elapsed: f64,
    /// Index of the owning stage (the source stage while blending).
    pub stage_index: usize,
    pub transition: Option<TransitionInfo>,
    pub particles: &'a [Particle],
}

impl<'a> StageSnapshot<'a> {
    fn of_stage(stage: &Stage, index: usize, elapsed: f64, particles: &'a [Particle]) -> Self {
        Self {
            name: stage.name.clone(),
            color: stage.color,
            radius: stage.radius,
            emission: stage.emission,
            texture: stage.texture.clone(),
            description: stage.description.clone(),
            duration: stage.duration,
            elapsed,
            stage_index: index,
            transition: None,
            particles,
        }
    }

    fn blended(
        from: &Stage,
        to: &Stage,
        info: TransitionInfo,
        particles: &'a [Particle],
    ) -> Self {
        let p = info.progress;
        Self {
            name: format!("{} -> {}", from.name, to.name),
            color: interpolate_color(from.color, to.color, p),
            radius: interpolate(from.radius, to.radius, p),
            emission: interpolate(from.emission, to.emission, p),
            texture: from.texture.clone(),
            description: format!("Transitioning from {} to {}", from.name, to.name),
            duration: StageDuration::Finite(TRANSITION_DISPLAY_SECONDS),
            elapsed: 0.0,
            stage_index: info.from,
            transition: Some(info),
            particles,
        }
    }

    /// Simulated seconds left before the stage ends, `None` when terminal.
    #[must_use]
    pub fn remaining(&self) -> Option<f64> {
        self.duration
            .seconds()
            .map(|duration| (duration - self.elapsed).max(0.0))
    }

    /// Check if this snapshot shows the declared parameters of `stage`.
    #[must_use]
    pub fn shows(&self, stage: &Stage) -> bool {
        self.transition.is_none()
            && self.name == stage.name
            && self.color == stage.color
            && self.radius == stage.radius
            && self.emission == stage.emission
            && self.texture == stage.texture
            && self.description == stage.description
    }
}

// =============================================================================
// CONFIGURATION
// =============================================================================

/// Knobs that do not come from the catalog.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimelineConfig {
    /// Seed for particle placement.
    pub seed: u64,
    /// How particle rotation relates to `dt`.
    pub clock: RotationClock,
}

impl Default for TimelineConfig {
    fn default() -> Self {
        Self {
            seed: DEFAULT_SEED,
            clock: RotationClock::PerTick,
        }
    }
}

// =============================================================================
// STAGE TIMELINE
// =============================================================================

/// Position, timers and particles for one run through a mass range.
#[derive(Debug, Clone)]
pub struct StageTimeline<'c> {
    range: &'c MassRange,
    phase: TimelinePhase,
    stage_elapsed: f64,
    total_elapsed: f64,
    field: ParticleField,
    rng: ChaChaRng,
}

impl<'c> StageTimeline<'c> {
    /// Start a timeline at stage 0 of `range`.
    #[must_use]
    pub fn new(range: &'c MassRange, config: TimelineConfig) -> Self {
        let mut timeline = Self {
            range,
            phase: TimelinePhase::Steady { index: 0 },
            stage_elapsed: 0.0,
            total_elapsed: 0.0,
            field: ParticleField::new(config.clock),
            rng: ChaChaRng::seed_from_u64(config.seed),
        };
        timeline.reset(range);
        timeline
    }

    /// Restart at stage 0 of `range`: zero all timers and rebuild the
    /// particle field from stage 0. An abrupt cut, not a blend.
    pub fn reset(&mut self, range: &'c MassRange) {
        self.range = range;
        self.phase = TimelinePhase::Steady { index: 0 };
        self.stage_elapsed = 0.0;
        self.total_elapsed = 0.0;

        match range.stage(0).and_then(|s| s.particles) {
            Some(emission) => self.field.regenerate(emission, &mut self.rng),
            None => self.field.clear(),
        }

        tracing::debug!(
            range = range.name(),
            particles = self.field.len(),
            "Timeline reset"
        );
    }

    /// Advance by `dt` simulated seconds and report the result.
    pub fn advance(&mut self, dt: f64) -> StageSnapshot<'_> {
        let dt = sanitize_dt(dt);
        self.total_elapsed += dt;
        let range = self.range;

        match self.phase {
            TimelinePhase::Steady { index } => {
                let stage = &range.stages()[index];
                self.stage_elapsed += dt;

                if stage.emits_particles() {
                    self.field.update(dt);
                }

                if let StageDuration::Finite(duration) = stage.duration {
                    if self.stage_elapsed >= duration {
                        self.phase = TimelinePhase::Transitioning {
                            from: index,
                            to: index + 1,
                            elapsed: 0.0,
                        };
                        tracing::debug!(
                            range = range.name(),
                            stage = %stage.name,
                            "Stage complete, transition started"
                        );
                    }
                }

                StageSnapshot::of_stage(stage, index, self.stage_elapsed, self.field.particles())
            }
            TimelinePhase::Transitioning { from, to, elapsed } => {
                let elapsed = elapsed + dt;
                let source = &range.stages()[from];
                let progress = transition_progress(source, elapsed);

                if progress >= 1.0 {
                    return self.commit(to);
                }

                self.phase = TimelinePhase::Transitioning { from, to, elapsed };
                let info = TransitionInfo { from, to, progress };
                StageSnapshot::blended(source, &range.stages()[to], info, self.field.particles())
            }
        }
    }

    fn commit(&mut self, index: usize) -> StageSnapshot<'_> {
        let range = self.range;
        let stage = &range.stages()[index];
        self.phase = TimelinePhase::Steady { index };
        self.stage_elapsed = 0.0;

        // Particles only live through the opening stage of a sequence.
        if index > 0 {
            self.field.clear();
        }

        tracing::debug!(
            range = range.name(),
            stage = %stage.name,
            index,
            terminal = stage.is_terminal(),
            "Stage committed"
        );

        StageSnapshot::of_stage(stage, index, 0.0, self.field.particles())
    }

    /// Report the current state without advancing time.
    #[must_use]
    pub fn snapshot(&self) -> StageSnapshot<'_> {
        let stages = self.range.stages();
        match self.phase {
            TimelinePhase::Steady { index } => StageSnapshot::of_stage(
                &stages[index],
                index,
                self.stage_elapsed,
                self.field.particles(),
            ),
            TimelinePhase::Transitioning { from, to, elapsed } => {
                let info = TransitionInfo {
                    from,
                    to,
                    progress: transition_progress(&stages[from], elapsed),
                };
                StageSnapshot::blended(&stages[from], &stages[to], info, self.field.particles())
            }
        }
    }

    /// Get the active mass range.
    #[must_use]
    pub fn range(&self) -> &'c MassRange {
        self.range
    }

    /// Get the current phase.
    #[must_use]
    pub fn phase(&self) -> TimelinePhase {
        self.phase
    }

    /// Index of the stage that currently owns the timeline.
    #[must_use]
    pub fn stage_index(&self) -> usize {
        self.phase.stage_index()
    }

    /// Get the stage that currently owns the timeline.
    #[must_use]
    pub fn current_stage(&self) -> &'c Stage {
        &self.range.stages()[self.stage_index()]
    }

    /// Simulated seconds spent in the current stage.
    #[must_use]
    pub fn stage_elapsed(&self) -> f64 {
        self.stage_elapsed
    }

    /// Simulated seconds since the last reset.
    #[must_use]
    pub fn total_elapsed(&self) -> f64 {
        self.total_elapsed
    }

    /// Get the current particle set.
    #[must_use]
    pub fn particles(&self) -> &[Particle] {
        self.field.particles()
    }

    /// Check if the terminal stage has been committed.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        match self.phase {
            TimelinePhase::Steady { index } => index == self.range.terminal_index(),
            TimelinePhase::Transitioning { .. } => false,
        }
    }
}

fn transition_progress(source: &Stage, elapsed: f64) -> f64 {
    if source.transition > 0.0 {
        (elapsed / source.transition).clamp(0.0, 1.0)
    } else {
        1.0
    }
}

fn sanitize_dt(dt: f64) -> f64 {
    if dt.is_finite() && dt >= 0.0 {
        dt
    } else {
        tracing::warn!(dt, "Rejected tick delta, clamping to zero");
        0.0
    }
}

// =============================================================================
// TESTS
// =============================================================================
