//! Test helpers shared across fieldvisit crates.

pub mod clock;
pub mod directory;
pub mod notify;
pub mod store;
pub mod strokes;

pub use clock::FixedClock;
pub use directory::ScriptedDirectory;
pub use notify::RecordingSink;
pub use store::FailingStore;
pub use strokes::{draw, mouse_stroke, touch_stroke};
