//! # Presenters
//!
//! Terminal implementations of [`stellar_core::Presenter`].
//!
//! | Presenter | Output |
//! |-----------|--------|
//! | [`TextPresenter`] | Human-readable HUD block per frame |
//! | [`JsonPresenter`] | One JSON object per line |
//!
//! Both write to any `io::Write`, so tests can capture into a `Vec<u8>`.

use std::io::Write;
use stellar_core::{FrameView, Presenter, StellarError, TextureRef};

fn io_error(e: std::io::Error) -> StellarError {
    StellarError::Io(format!("Cannot write frame: {}", e))
}

// =============================================================================
// TEXT PRESENTER
// =============================================================================

/// Renders the on-screen HUD as plain text.
#[derive(Debug)]
pub struct TextPresenter<W: Write> {
    out: W,
}

impl<W: Write> TextPresenter<W> {
    /// Create a presenter writing to `out`.
    pub fn new(out: W) -> Self {
        Self { out }
    }

    /// Recover the writer.
    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> Presenter for TextPresenter<W> {
    fn present(&mut self, view: &FrameView<'_>) -> Result<(), StellarError> {
        let snap = &view.snapshot;
        let mut status = format!("[frame {}] speed {:.2}x", view.frame, view.speed);
        if view.paused {
            status.push_str(" (paused)");
        }

        writeln!(self.out, "{}", status).map_err(io_error)?;
        writeln!(
            self.out,
            "  Star Mass: {:.2} solar masses ({})",
            view.mass, view.range_name
        )
        .map_err(io_error)?;
        writeln!(self.out, "  Stage: {}", snap.name).map_err(io_error)?;
        writeln!(self.out, "  {}", snap.description).map_err(io_error)?;

        let countdown = match view.remaining_wall_seconds() {
            Some(secs) => writeln!(self.out, "  Time until next stage: {:.1}s", secs),
            None => writeln!(self.out, "  Final stage"),
        };
        countdown.map_err(io_error)?;

        if !snap.particles.is_empty() {
            writeln!(self.out, "  Particles: {}", snap.particles.len()).map_err(io_error)?;
        }
        Ok(())
    }

    fn finish(&mut self) -> Result<(), StellarError> {
        self.out.flush().map_err(io_error)
    }
}

// =============================================================================
// JSON PRESENTER
// =============================================================================

/// Emits one JSON object per presented frame.
#[derive(Debug)]
pub struct JsonPresenter<W: Write> {
    out: W,
}

impl<W: Write> JsonPresenter<W> {
    /// Create a presenter writing to `out`.
    pub fn new(out: W) -> Self {
        Self { out }
    }

    /// Recover the writer.
    pub fn into_inner(self) -> W {
        self.out
    }
}

/// Build the JSON record for one frame.
#[must_use]
pub fn frame_json(view: &FrameView<'_>) -> serde_json::Value {
    let snap = &view.snapshot;
    let texture = match &snap.texture {
        TextureRef::Asset(path) => serde_json::Value::String(path.clone()),
        TextureRef::Procedural => serde_json::Value::Null,
    };
    let transition = snap.transition.map(|info| {
        serde_json::json!({
            "from": info.from,
            "to": info.to,
            "progress": info.progress
        })
    });

    serde_json::json!({
        "frame": view.frame,
        "mass": view.mass,
        "range": view.range_name,
        "speed": view.speed,
        "paused": view.paused,
        "stage": snap.name,
        "stage_index": snap.stage_index,
        "description": snap.description,
        "color": snap.color.channels(),
        "radius": snap.radius,
        "emission": snap.emission,
        "texture": texture,
        "elapsed": snap.elapsed,
        "remaining": view.remaining_wall_seconds(),
        "transition": transition,
        "particles": snap.particles.len()
    })
}

impl<W: Write> Presenter for JsonPresenter<W> {
    fn present(&mut self, view: &FrameView<'_>) -> Result<(), StellarError> {
        let line = serde_json::to_string(&frame_json(view))
            .map_err(|e| StellarError::Serialization(e.to_string()))?;
        writeln!(self.out, "{}", line).map_err(io_error)
    }

    fn finish(&mut self) -> Result<(), StellarError> {
        self.out.flush().map_err(io_error)
    }
}

// =============================================================================
// TESTS
// =============================================================================
