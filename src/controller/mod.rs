//! Controller subsystem for gamepad input handling
//!
//! Turns a polled gamepad into discrete answer presses:
//!
//! 1. [`gamepad_source`] - Probing the backend and sampling button levels
//! 2. [`edge_detector`] - Rising-edge detection against the previous sample
//! 3. [`poller`] - Fixed-cadence sampling loop with start/stop lifecycle
//!
//! # Architecture
//!
//! ```text
//! Gamepad ──► GamepadSource ──► EdgeDetector ──► PressEvent
//!             (levels)          (edges, mapped by ButtonMap)
//! ```
//!
//! The loop samples once per frame (16ms by default). Holding a button
//! yields exactly one press, not one per frame.

pub mod button_map;
pub mod edge_detector;
pub mod gamepad_source;
pub mod poller;

pub use button_map::{ButtonMap, FaceButton, FACE_BUTTONS};
pub use edge_detector::{EdgeDetector, PressEvent};
pub use gamepad_source::{
    probe_gamepads, Capability, DeviceButtons, DeviceId, GamepadSource, GilrsBackend,
};
pub use poller::{PollerHandle, PollerSettings, PressSink};

/// Errors of the gamepad input pipeline
#[derive(Debug, thiserror::Error)]
pub enum CollectorError {
    /// The host offers no usable gamepad backend
    #[error("Gamepad backend unavailable: {0}")]
    Unavailable(String),

    /// A press could not be handed on to the session
    #[error("Failed to send press event: {0}")]
    EventSendError(String),
}
