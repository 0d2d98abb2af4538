//! Device-neutral pointer input for signature capture.

use serde::{Deserialize, Serialize};

/// Phase of a pointer interaction.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PointerPhase {
    Start,
    Move,
    End,
}

/// Input device that produced the event.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum PointerSource {
    #[default]
    Mouse,
    Touch,
}

/// A single touch contact in client coordinates.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct TouchPoint {
    pub id: u64,
    pub x: f64,
    pub y: f64,
}

/// Pointer event in raw client (screen) coordinates.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct PointerEvent {
    /// Pointer identifier; mouse events use 0.
    pub id: u64,
    pub x: f64,
    pub y: f64,
    pub phase: PointerPhase,
    #[serde(default)]
    pub source: PointerSource,
}

impl PointerEvent {
    /// Mouse event at client coordinates.
    pub fn mouse(phase: PointerPhase, x: f64, y: f64) -> Self {
        Self {
            id: 0,
            x,
            y,
            phase,
            source: PointerSource::Mouse,
        }
    }

    /// Map a touch event onto a pointer event using the first touch point.
    ///
    /// Returns `None` for start/move events without any touch points. An end
    /// event with no remaining touches still ends the stroke.
    pub fn from_touches(phase: PointerPhase, touches: &[TouchPoint]) -> Option<Self> {
        match touches.first() {
            Some(touch) => Some(Self {
                id: touch.id,
                x: touch.x,
                y: touch.y,
                phase,
                source: PointerSource::Touch,
            }),
            None if phase == PointerPhase::End => Some(Self {
                id: 0,
                x: 0.0,
                y: 0.0,
                phase,
                source: PointerSource::Touch,
            }),
            None => None,
        }
    }
}
