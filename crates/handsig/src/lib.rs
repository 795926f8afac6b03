//! Hand-pose signal core.
//!
//! Turns raw 21-point hand landmarks (MediaPipe index convention, normalized
//! image coordinates) into the small set of signals the viewer runs on:
//!
//! - [`features::extract`]: one landmark set -> one [`GestureFrame`]
//!   (tension, palm position, cursor position, pinch flag).
//! - [`release::ReleaseDetector`]: debounced clench-then-release events.
//! - [`channel::HandChannel`]: a single mutable state record for per-tick
//!   consumers plus deduplicated change notices for the UI.
//! - [`wire`]: the JSON-lines protocol spoken by detector processes.
//!
//! Everything here is pure and synchronous; no hand (or a malformed landmark
//! set) degrades to the absent state rather than an error.

pub mod channel;
pub mod features;
pub mod landmarks;
pub mod release;
pub mod wire;

pub use channel::{HandChannel, HandState, UiDelta};
pub use features::{extract, GestureFrame};
pub use landmarks::LandmarkSet;
pub use release::ReleaseDetector;
