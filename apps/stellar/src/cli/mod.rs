//! # Stellar CLI Module
//!
//! This module implements the CLI interface for the stellar viewer.
//!
//! ## Available Commands
//!
//! - `run` - Run the headless loop and print frames
//! - `ranges` - List mass ranges and their stage sequences
//! - `classify` - Show which range a mass falls into
//! - `schedule` - Show the stage schedule for a mass
//! - `catalog` - Print the active catalog as TOML
//! - `validate` - Check a catalog file without running it

mod commands;

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use stellar_core::StellarError;

pub use commands::*;

// =============================================================================
// CLI STRUCTURE
// =============================================================================

/// Stellar - life cycle of a star, one stage at a time
///
/// Pick a mass, watch the star walk from nebula to remnant.
#[derive(Parser, Debug)]
#[command(name = "stellar")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress banner output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Mass-range catalog (TOML); the built-in table when omitted
    #[arg(short = 'C', long, global = true)]
    pub catalog: Option<PathBuf>,

    /// Output in JSON format (for programmatic access)
    #[arg(long, global = true)]
    pub json_mode: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the headless loop
    Run {
        /// Number of frames to simulate
        #[arg(short = 'n', long, default_value = "600")]
        frames: u64,

        /// Frames per second (wall clock)
        #[arg(long, default_value = "60")]
        fps: f64,

        /// Initial mass in solar masses
        #[arg(short, long, default_value = "1.0", allow_negative_numbers = true)]
        mass: f64,

        /// Initial playback speed multiplier
        #[arg(short, long, default_value = "1.0")]
        speed: f64,

        /// Particle seed (falls back to STELLAR_SEED)
        #[arg(long)]
        seed: Option<u64>,

        /// Scripted input, FRAME:ACTION or START-END:ACTION (repeatable)
        #[arg(short, long = "event")]
        events: Vec<String>,

        /// Present every N-th frame (stage changes are always shown)
        #[arg(long, default_value = "60")]
        every: u64,

        /// Scale particle rotation by dt instead of one step per frame
        #[arg(long)]
        frame_independent_particles: bool,

        /// Frame output format (text, json)
        #[arg(short = 'f', long, default_value = "text")]
        format: String,
    },

    /// List mass ranges
    Ranges,

    /// Classify a mass into its range
    Classify {
        /// Mass in solar masses (clamped into the domain)
        #[arg(short, long, allow_negative_numbers = true)]
        mass: f64,
    },

    /// Show the stage schedule for a mass
    Schedule {
        /// Mass in solar masses (clamped into the domain)
        #[arg(short, long, default_value = "1.0", allow_negative_numbers = true)]
        mass: f64,
    },

    /// Print the active catalog as TOML
    Catalog,

    /// Validate a catalog file
    Validate {
        /// Path to the catalog file
        #[arg(short, long)]
        file: PathBuf,
    },
}

// =============================================================================
// COMMAND EXECUTION
// =============================================================================

/// Execute the CLI with parsed arguments.
pub fn execute(cli: Cli) -> Result<(), StellarError> {
    let json_mode = cli.json_mode;

    // `validate` reads its own file; everything else needs the active catalog.
    if let Some(Commands::Validate { file }) = &cli.command {
        return cmd_validate(file, json_mode);
    }

    let catalog = load_catalog(cli.catalog.as_deref())?;

    match cli.command {
        Some(Commands::Run {
            frames,
            fps,
            mass,
            speed,
            seed,
            events,
            every,
            frame_independent_particles,
            format,
        }) => cmd_run(
            &catalog,
            json_mode,
            &RunOptions {
                frames,
                fps,
                mass,
                speed,
                seed,
                events,
                every,
                frame_independent_particles,
                format,
            },
        ),
        Some(Commands::Ranges) => cmd_ranges(&catalog, json_mode),
        Some(Commands::Classify { mass }) => cmd_classify(&catalog, json_mode, mass),
        Some(Commands::Schedule { mass }) => cmd_schedule(&catalog, json_mode, mass),
        Some(Commands::Catalog) => cmd_catalog(&catalog),
        Some(Commands::Validate { .. }) => Ok(()),
        None => {
            // No subcommand - list ranges by default
            cmd_ranges(&catalog, json_mode)
        }
    }
}
