//! # stellar
//!
//! Headless front-end for the stellar life cycle engine.
//!
//! - `cli` → clap commands
//! - `script` → frame-stamped input events
//! - `presenter` → text HUD and JSON-lines output
//! - `game_loop` → fixed-step driver tying them together

pub mod cli;
pub mod game_loop;
pub mod presenter;
pub mod script;
