//! # CLI Command Implementations
//!
//! This module contains the actual implementations of CLI commands.

use crate::game_loop::{self, LoopOptions, RunSummary};
use crate::presenter::{JsonPresenter, TextPresenter};
use crate::script::InputScript;
use std::io::{BufWriter, Write};
use std::path::Path;
use stellar_core::{
    Catalog, MassRange, Presenter, RotationClock, Simulation, SimulationConfig, StellarError,
    TimelineConfig, builtin_catalog, clamp_mass, primitives::DEFAULT_SEED,
};

// =============================================================================
// FILE SIZE LIMITS
// =============================================================================

/// Maximum catalog file size (1 MB).
///
/// The built-in table is a few kilobytes; anything this large is not a catalog.
const MAX_CATALOG_FILE_SIZE: u64 = 1024 * 1024;

/// Validate file size before reading.
fn validate_file_size(path: &Path, max_size: u64) -> Result<(), StellarError> {
    let metadata = std::fs::metadata(path)
        .map_err(|e| StellarError::Io(format!("Cannot read file metadata: {}", e)))?;

    if metadata.len() > max_size {
        return Err(StellarError::InvalidInput(format!(
            "File size {} bytes exceeds maximum allowed {} bytes",
            metadata.len(),
            max_size
        )));
    }
    Ok(())
}

/// Load the catalog named on the command line, or the built-in table.
pub fn load_catalog(path: Option<&Path>) -> Result<Catalog, StellarError> {
    match path {
        Some(path) => {
            validate_file_size(path, MAX_CATALOG_FILE_SIZE)?;
            Catalog::load(path)
        }
        None => builtin_catalog().cloned(),
    }
}

fn print_json(value: &serde_json::Value) {
    println!("{}", serde_json::to_string_pretty(value).unwrap_or_default());
}

// =============================================================================
// RUN COMMAND
// =============================================================================

/// Options for `stellar run`.
#[derive(Debug, Clone, PartialEq)]
pub struct RunOptions {
    pub frames: u64,
    pub fps: f64,
    pub mass: f64,
    pub speed: f64,
    pub seed: Option<u64>,
    pub events: Vec<String>,
    pub every: u64,
    pub frame_independent_particles: bool,
    pub format: String,
}

/// Resolve the particle seed: flag, then `STELLAR_SEED`, then the default.
pub fn resolve_seed(flag: Option<u64>) -> Result<u64, StellarError> {
    if let Some(seed) = flag {
        return Ok(seed);
    }
    match std::env::var("STELLAR_SEED") {
        Ok(raw) => raw.trim().parse().map_err(|_| {
            StellarError::InvalidInput(format!("STELLAR_SEED '{}' is not a u64", raw))
        }),
        Err(_) => Ok(DEFAULT_SEED),
    }
}

/// Turn command-line options into simulation and loop settings.
pub fn prepare_run(
    options: &RunOptions,
) -> Result<(SimulationConfig, LoopOptions, InputScript), StellarError> {
    if !options.fps.is_finite() || options.fps <= 0.0 {
        return Err(StellarError::InvalidInput(format!(
            "fps must be a positive number, got {}",
            options.fps
        )));
    }

    let clock = if options.frame_independent_particles {
        RotationClock::Scaled {
            ticks_per_second: options.fps,
        }
    } else {
        RotationClock::PerTick
    };

    let config = SimulationConfig {
        mass: options.mass,
        speed: options.speed,
        timeline: TimelineConfig {
            seed: resolve_seed(options.seed)?,
            clock,
        },
    };
    let loop_options = LoopOptions {
        frames: options.frames,
        frame_seconds: 1.0 / options.fps,
        every: options.every,
    };
    let script = InputScript::parse(&options.events)?;

    Ok((config, loop_options, script))
}

/// Frame output format for `stellar run`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameFormat {
    Text,
    Json,
}

impl FrameFormat {
    /// Resolve `--format`. `--json-mode` always selects JSON.
    pub fn resolve(format: &str, json_mode: bool) -> Result<Self, StellarError> {
        match (format, json_mode) {
            ("text" | "json", true) | ("json", false) => Ok(Self::Json),
            ("text", false) => Ok(Self::Text),
            (other, _) => Err(StellarError::InvalidInput(format!(
                "Unknown format '{}'. Use: text, json",
                other
            ))),
        }
    }
}

/// Run the headless loop.
pub fn cmd_run(
    catalog: &Catalog,
    json_mode: bool,
    options: &RunOptions,
) -> Result<(), StellarError> {
    let format = FrameFormat::resolve(&options.format, json_mode)?;
    let (config, loop_options, script) = prepare_run(options)?;
    let mut sim = Simulation::new(catalog, config)?;

    let out = BufWriter::new(std::io::stdout().lock());
    let mut presenter: Box<dyn Presenter> = match format {
        FrameFormat::Text => Box::new(TextPresenter::new(out)),
        FrameFormat::Json => Box::new(JsonPresenter::new(out)),
    };

    let summary = game_loop::run(&mut sim, &script, loop_options, presenter.as_mut())?;
    drop(presenter);

    match format {
        FrameFormat::Text => print_summary(&summary),
        FrameFormat::Json if json_mode => {
            let value = serde_json::to_value(&summary)
                .map_err(|e| StellarError::Serialization(e.to_string()))?;
            println!("{}", serde_json::json!({ "summary": value }));
        }
        FrameFormat::Json => {}
    }
    Ok(())
}

fn print_summary(summary: &RunSummary) {
    println!();
    println!("Run Summary");
    println!("===========");
    println!("Frames:        {}", summary.frames);
    println!("Presented:     {}", summary.presented);
    println!("Range changes: {}", summary.range_changes);
    println!("Simulated:     {:.1}s", summary.simulated_seconds);
    println!(
        "Final:         {} ({}, {:.2} solar masses){}",
        summary.final_stage,
        summary.final_range,
        summary.final_mass,
        if summary.terminal { " [terminal]" } else { "" }
    );
}

// =============================================================================
// RANGES COMMAND
// =============================================================================

/// List mass ranges.
pub fn cmd_ranges(catalog: &Catalog, json_mode: bool) -> Result<(), StellarError> {
    if json_mode {
        let ranges: Vec<_> = catalog
            .ranges()
            .iter()
            .map(|range| {
                serde_json::json!({
                    "name": range.name(),
                    "min": range.min(),
                    "max": range.max(),
                    "stages": range.stages().iter().map(|s| s.name.as_str()).collect::<Vec<_>>(),
                    "lifetime": range.lifetime()
                })
            })
            .collect();
        print_json(&serde_json::json!({ "ranges": ranges }));
        return Ok(());
    }

    println!("Mass Ranges");
    println!("===========");
    for range in catalog.ranges() {
        let stages: Vec<&str> = range.stages().iter().map(|s| s.name.as_str()).collect();
        println!(
            "{:<14} {:>6.2} - {:>5.2} M  {}",
            range.name(),
            range.min(),
            range.max(),
            stages.join(" -> ")
        );
    }
    Ok(())
}

// =============================================================================
// CLASSIFY COMMAND
// =============================================================================

/// Classify a mass.
pub fn cmd_classify(catalog: &Catalog, json_mode: bool, mass: f64) -> Result<(), StellarError> {
    let clamped = clamp_mass(mass);
    let (id, range) = catalog.classify_range(clamped)?;

    if json_mode {
        print_json(&serde_json::json!({
            "mass": mass,
            "clamped": clamped,
            "range_id": id.0,
            "range": range.name()
        }));
        return Ok(());
    }

    if clamped != mass {
        println!("Mass {} clamped to {}", mass, clamped);
    }
    println!(
        "{:.2} solar masses -> {} [{} - {}]",
        clamped,
        range.name(),
        range.min(),
        range.max()
    );
    Ok(())
}

// =============================================================================
// SCHEDULE COMMAND
// =============================================================================

/// One row of a stage schedule.
#[derive(Debug, Clone, PartialEq)]
pub struct ScheduleEntry<'a> {
    pub index: usize,
    pub name: &'a str,
    /// Simulated seconds from the start of the range at which the stage begins.
    pub starts_at: f64,
    /// `None` for the terminal stage.
    pub duration: Option<f64>,
    pub transition: f64,
}

/// Stage start times at speed 1.0. A stage begins after every earlier
/// stage's duration and transition have elapsed.
#[must_use]
pub fn schedule(range: &MassRange) -> Vec<ScheduleEntry<'_>> {
    let mut start = 0.0;
    range
        .stages()
        .iter()
        .enumerate()
        .map(|(index, stage)| {
            let entry = ScheduleEntry {
                index,
                name: &stage.name,
                starts_at: start,
                duration: stage.duration.seconds(),
                transition: stage.transition,
            };
            start += stage.duration.seconds().unwrap_or(0.0) + stage.transition;
            entry
        })
        .collect()
}

/// Show the stage schedule for a mass.
pub fn cmd_schedule(catalog: &Catalog, json_mode: bool, mass: f64) -> Result<(), StellarError> {
    let (_, range) = catalog.classify_range(clamp_mass(mass))?;
    let entries = schedule(range);

    if json_mode {
        let stages: Vec<_> = entries
            .iter()
            .map(|e| {
                serde_json::json!({
                    "index": e.index,
                    "name": e.name,
                    "starts_at": e.starts_at,
                    "duration": e.duration,
                    "transition": e.transition
                })
            })
            .collect();
        print_json(&serde_json::json!({
            "range": range.name(),
            "stages": stages
        }));
        return Ok(());
    }

    println!("Stage Schedule: {}", range.name());
    println!("===============");
    for e in &entries {
        match e.duration {
            Some(duration) => println!(
                "{:>2}. {:<22} at {:>5.1}s  for {:.1}s (+{:.1}s transition)",
                e.index, e.name, e.starts_at, duration, e.transition
            ),
            None => println!(
                "{:>2}. {:<22} at {:>5.1}s  (final)",
                e.index, e.name, e.starts_at
            ),
        }
    }
    Ok(())
}

// =============================================================================
// CATALOG COMMAND
// =============================================================================

/// Print the active catalog as TOML.
pub fn cmd_catalog(catalog: &Catalog) -> Result<(), StellarError> {
    let rendered = catalog.to_toml_string()?;
    let mut stdout = std::io::stdout().lock();
    stdout
        .write_all(rendered.as_bytes())
        .map_err(|e| StellarError::Io(e.to_string()))
}

// =============================================================================
// VALIDATE COMMAND
// =============================================================================

/// Validate a catalog file.
pub fn cmd_validate(path: &Path, json_mode: bool) -> Result<(), StellarError> {
    let catalog = load_catalog(Some(path))?;

    if json_mode {
        print_json(&serde_json::json!({
            "file": path.to_string_lossy(),
            "valid": true,
            "ranges": catalog.len(),
            "stages": catalog.ranges().iter().map(|r| r.stages().len()).sum::<usize>()
        }));
        return Ok(());
    }

    println!("Catalog OK: {}", path.display());
    for range in catalog.ranges() {
        println!(
            "  {:<14} {} stages, {:.1}s to remnant",
            range.name(),
            range.stages().len(),
            range.lifetime()
        );
    }
    Ok(())
}
