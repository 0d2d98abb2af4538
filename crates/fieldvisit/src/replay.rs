//! Replay recorded pen strokes into a signature surface.
//!
//! A strokes file is a JSON array of strokes, each an array of `[x, y]`
//! points in client coordinates:
//!
//! ```json
//! [[[20, 100], [80, 40], [160, 110]], [[30, 120], [200, 120]]]
//! ```

use fieldvisit_core::{SignatureCapture, SignatureError};
use fieldvisit_protocol::{PointerEvent, PointerPhase};
use serde::Deserialize;
use std::path::Path;
use thiserror::Error;

/// One continuous pen stroke.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(transparent)]
pub struct Stroke(pub Vec<[f64; 2]>);

#[derive(Debug, Error)]
pub enum ReplayError {
    #[error("failed to read strokes: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse strokes: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("signature error: {0}")]
    Signature(#[from] SignatureError),
}

/// Parse strokes from JSON text.
pub fn parse_strokes(contents: &str) -> Result<Vec<Stroke>, ReplayError> {
    Ok(serde_json::from_str(contents)?)
}

/// Read strokes from a JSON file.
pub fn load_strokes(path: &Path) -> Result<Vec<Stroke>, ReplayError> {
    let contents = std::fs::read_to_string(path)?;
    parse_strokes(&contents)
}

/// Convert one stroke into start/move/end pointer events.
pub fn stroke_events(stroke: &Stroke) -> Vec<PointerEvent> {
    let Some((first, rest)) = stroke.0.split_first() else {
        return Vec::new();
    };
    let mut events = vec![PointerEvent::mouse(PointerPhase::Start, first[0], first[1])];
    events.extend(
        rest.iter()
            .map(|[x, y]| PointerEvent::mouse(PointerPhase::Move, *x, *y)),
    );
    let [x, y] = *rest.last().unwrap_or(first);
    events.push(PointerEvent::mouse(PointerPhase::End, x, y));
    events
}

/// Draw every stroke onto the surface in order.
pub fn replay(capture: &mut SignatureCapture, strokes: &[Stroke]) -> Result<(), ReplayError> {
    for stroke in strokes {
        for event in stroke_events(stroke) {
            capture.handle(event)?;
        }
    }
    Ok(())
}
