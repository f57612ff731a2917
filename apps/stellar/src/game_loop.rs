//! # Headless Game Loop
//!
//! Fixed-step driver: each frame applies the scripted input for that frame,
//! ticks the simulation once, and hands the view to a presenter.
//!
//! A frame is presented when any of these holds:
//! - its number is a multiple of `every`
//! - the displayed stage name differs from the last presented frame
//! - it is the final frame

use crate::script::InputScript;
use serde::Serialize;
use stellar_core::{Presenter, Simulation, StellarError};

/// Loop parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LoopOptions {
    /// Frames to run.
    pub frames: u64,
    /// Wall-clock seconds per frame (`1 / fps`).
    pub frame_seconds: f64,
    /// Present every N-th frame; 0 is treated as 1.
    pub every: u64,
}

/// What happened during a run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunSummary {
    pub frames: u64,
    pub presented: u64,
    pub range_changes: u64,
    /// Simulated seconds, after speed scaling and excluding paused frames.
    pub simulated_seconds: f64,
    pub final_mass: f64,
    pub final_range: String,
    pub final_stage: String,
    pub terminal: bool,
}

/// Run `sim` for `options.frames` frames.
pub fn run<P: Presenter + ?Sized>(
    sim: &mut Simulation<'_>,
    script: &InputScript,
    options: LoopOptions,
    presenter: &mut P,
) -> Result<RunSummary, StellarError> {
    let every = options.every.max(1);
    let mut presented = 0u64;
    let mut range_changes = 0u64;
    let mut simulated_seconds = 0.0;
    let mut last_stage: Option<String> = None;

    tracing::debug!(
        frames = options.frames,
        frame_seconds = options.frame_seconds,
        every,
        scripted = script.len(),
        "Loop starting"
    );

    for frame in 1..=options.frames {
        let range_before = sim.range_id();
        for &event in script.events_at(frame) {
            sim.handle(event)?;
        }
        if sim.range_id() != range_before {
            range_changes += 1;
        }
        if !sim.is_paused() {
            simulated_seconds += sim.speed().scale(options.frame_seconds);
        }

        let view = sim.tick(options.frame_seconds);
        let stage_changed = last_stage.as_deref() != Some(view.snapshot.name.as_str());

        if frame % every == 0 || stage_changed || frame == options.frames {
            presenter.present(&view)?;
            presented += 1;
            if stage_changed {
                last_stage = Some(view.snapshot.name.clone());
            }
        }
    }

    presenter.finish()?;

    let timeline = sim.timeline();
    let summary = RunSummary {
        frames: options.frames,
        presented,
        range_changes,
        simulated_seconds,
        final_mass: sim.mass(),
        final_range: sim.range().name().to_string(),
        final_stage: timeline.current_stage().name.clone(),
        terminal: timeline.is_terminal(),
    };

    tracing::info!(
        frames = summary.frames,
        presented = summary.presented,
        range = %summary.final_range,
        stage = %summary.final_stage,
        "Loop finished"
    );
    Ok(summary)
}
