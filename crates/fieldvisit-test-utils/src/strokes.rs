use fieldvisit_core::{SignatureCapture, SignatureError};
use fieldvisit_protocol::{PointerEvent, PointerPhase, TouchPoint};

/// Mouse events for one stroke through `points`.
pub fn mouse_stroke(points: &[(f64, f64)]) -> Vec<PointerEvent> {
    let mut events = Vec::with_capacity(points.len() + 1);
    for (index, (x, y)) in points.iter().enumerate() {
        let phase = if index == 0 {
            PointerPhase::Start
        } else {
            PointerPhase::Move
        };
        events.push(PointerEvent::mouse(phase, *x, *y));
    }
    if let Some((x, y)) = points.last() {
        events.push(PointerEvent::mouse(PointerPhase::End, *x, *y));
    }
    events
}

/// Single-finger touch events for one stroke through `points`.
pub fn touch_stroke(points: &[(f64, f64)]) -> Vec<PointerEvent> {
    let mut events: Vec<PointerEvent> = points
        .iter()
        .enumerate()
        .filter_map(|(index, (x, y))| {
            let phase = if index == 0 {
                PointerPhase::Start
            } else {
                PointerPhase::Move
            };
            PointerEvent::from_touches(phase, &[TouchPoint { id: 1, x: *x, y: *y }])
        })
        .collect();
    if !points.is_empty() {
        events.extend(PointerEvent::from_touches(PointerPhase::End, &[]));
    }
    events
}

/// Feed events into a capture surface.
pub fn draw(
    capture: &mut SignatureCapture,
    events: impl IntoIterator<Item = PointerEvent>,
) -> Result<(), SignatureError> {
    for event in events {
        capture.handle(event)?;
    }
    Ok(())
}
