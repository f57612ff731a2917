//! # Scripted Input
//!
//! Frame-stamped input events for the headless loop.
//!
//! ## Syntax
//!
//! - `FRAME:ACTION` fires once on `FRAME` (1-based)
//! - `START-END:ACTION` fires on every frame from `START` to `END` inclusive,
//!   the same as holding a key down
//!
//! Actions: `mass-up`, `mass-down`, `speed-up`, `speed-down`, `pause`.

use std::collections::BTreeMap;
use stellar_core::{InputEvent, StellarError};

/// Maximum number of frames a single held-key entry may span.
///
/// Prevents a typo like `1-999999999:mass-up` from allocating gigabytes.
pub const MAX_HOLD_FRAMES: u64 = 100_000;

/// Input events keyed by the frame they fire on.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InputScript {
    events: BTreeMap<u64, Vec<InputEvent>>,
}

impl InputScript {
    /// Create an empty script.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a list of entries.
    pub fn parse<S: AsRef<str>>(entries: &[S]) -> Result<Self, StellarError> {
        let mut script = Self::new();
        for entry in entries {
            script.add_entry(entry.as_ref())?;
        }
        Ok(script)
    }

    /// Parse one entry and add its events.
    pub fn add_entry(&mut self, entry: &str) -> Result<(), StellarError> {
        let (frames, action) = entry
            .split_once(':')
            .ok_or_else(|| invalid(entry, "expected FRAME:ACTION or START-END:ACTION"))?;
        let event = InputEvent::parse(action)?;

        let (start, end) = match frames.split_once('-') {
            Some((start, end)) => (parse_frame(entry, start)?, parse_frame(entry, end)?),
            None => {
                let frame = parse_frame(entry, frames)?;
                (frame, frame)
            }
        };

        if start > end {
            return Err(invalid(entry, "range start is after its end"));
        }
        if end - start >= MAX_HOLD_FRAMES {
            return Err(invalid(entry, "held range is too long"));
        }

        for frame in start..=end {
            self.push(frame, event);
        }
        Ok(())
    }

    /// Schedule `event` on `frame`.
    pub fn push(&mut self, frame: u64, event: InputEvent) {
        self.events.entry(frame).or_default().push(event);
    }

    /// Events for `frame`, in the order they were added.
    #[must_use]
    pub fn events_at(&self, frame: u64) -> &[InputEvent] {
        self.events.get(&frame).map(Vec::as_slice).unwrap_or_default()
    }

    /// Total number of scheduled events.
    #[must_use]
    pub fn len(&self) -> usize {
        self.events.values().map(Vec::len).sum()
    }

    /// Check if nothing is scheduled.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Last frame with an event.
    #[must_use]
    pub fn last_frame(&self) -> Option<u64> {
        self.events.keys().next_back().copied()
    }
}

fn parse_frame(entry: &str, raw: &str) -> Result<u64, StellarError> {
    let frame: u64 = raw
        .trim()
        .parse()
        .map_err(|_| invalid(entry, "frame is not a number"))?;
    if frame == 0 {
        return Err(invalid(entry, "frames are numbered from 1"));
    }
    Ok(frame)
}

fn invalid(entry: &str, reason: &str) -> StellarError {
    StellarError::InvalidInput(format!("event '{}': {}", entry, reason))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_frame_entry() {
        let script = InputScript::parse(&["10:speed-up"]).expect("parse");
        assert_eq!(script.events_at(10), &[InputEvent::SpeedUp]);
        assert!(script.events_at(9).is_empty());
        assert_eq!(script.len(), 1);
    }

    #[test]
    fn held_range_fires_every_frame() {
        let script = InputScript::parse(&["5-7:mass-up"]).expect("parse");
        assert_eq!(script.len(), 3);
        assert_eq!(script.last_frame(), Some(7));
        for frame in 5..=7 {
            assert_eq!(script.events_at(frame), &[InputEvent::MassUp]);
        }
    }

    #[test]
    fn events_on_same_frame_keep_order() {
        let script = InputScript::parse(&["3:pause", "3:speed-down"]).expect("parse");
        assert_eq!(
            script.events_at(3),
            &[InputEvent::TogglePause, InputEvent::SpeedDown]
        );
    }

    #[test]
    fn malformed_entries_rejected() {
        for bad in ["mass-up", "0:mass-up", "x:pause", "9-3:pause", "4:fly"] {
            assert!(
                matches!(InputScript::parse(&[bad]), Err(StellarError::InvalidInput(_))),
                "{}",
                bad
            );
        }
    }

    #[test]
    fn oversized_hold_rejected() {
        let entry = format!("1-{}:mass-up", MAX_HOLD_FRAMES + 1);
        assert!(InputScript::parse(&[entry]).is_err());
    }
}
