//! Polled gamepad backend
//!
//! The input layer only ever asks for the current pressed level of every
//! button on every connected device. There is no push model: a device that
//! fires no events still has to be sampled each tick.
//!
//! The gilrs backend is probed exactly once at start-up. A missing or
//! unsupported backend yields [`Capability::Absent`] and the rest of the
//! application keeps running without gamepad input.

use gilrs::{Button, GamepadId, Gilrs};
use statum::{machine, state};
use std::fmt;
use tracing::{debug, error, info, warn};

use super::CollectorError;

/// Stable identifier for a connected device
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DeviceId(pub usize);

impl fmt::Display for DeviceId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<GamepadId> for DeviceId {
    fn from(id: GamepadId) -> Self {
        DeviceId(usize::from(id))
    }
}

/// Current button levels of a single device, in device order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceButtons {
    pub device: DeviceId,
    pub pressed: Vec<bool>,
}

impl DeviceButtons {
    pub fn new(device: DeviceId, pressed: Vec<bool>) -> Self {
        Self { device, pressed }
    }
}

/// Anything that can report the button levels of the connected devices
pub trait GamepadSource: Send + 'static {
    /// Samples all currently connected devices.
    fn connected_devices(&mut self) -> Vec<DeviceButtons>;
}

impl GamepadSource for Box<dyn GamepadSource> {
    fn connected_devices(&mut self) -> Vec<DeviceButtons> {
        (**self).connected_devices()
    }
}

/// Result of probing an optional host capability
#[derive(Debug)]
pub enum Capability<T> {
    Present(T),
    Absent(String),
}

// Standard gamepad button order. Index 0 is the bottom face button.
const STANDARD_ORDER: [Button; 17] = [
    Button::South,
    Button::East,
    Button::West,
    Button::North,
    Button::LeftTrigger,
    Button::RightTrigger,
    Button::LeftTrigger2,
    Button::RightTrigger2,
    Button::Select,
    Button::Start,
    Button::LeftThumb,
    Button::RightThumb,
    Button::DPadUp,
    Button::DPadDown,
    Button::DPadLeft,
    Button::DPadRight,
    Button::Mode,
];

#[state]
#[derive(Debug, Clone)]
pub enum BackendState {
    Probing,
    Ready,
}

#[machine]
#[derive(Debug)]
pub struct GilrsBackend<S: BackendState> {
    // Gilrs context
    gilrs: Gilrs,
}

impl GilrsBackend<Probing> {
    pub fn create() -> Result<Self, CollectorError> {
        info!("Initializing gilrs gamepad interface");
        let gilrs = match Gilrs::new() {
            Ok(g) => {
                info!("Successfully initialized gilrs");
                g
            }
            Err(e) => {
                error!("Failed to initialize gilrs: {}", e);
                return Err(CollectorError::Unavailable(e.to_string()));
            }
        };

        Ok(Self::new(gilrs))
    }

    pub fn initialize(self) -> GilrsBackend<Ready> {
        let count = self.gilrs.gamepads().count();
        if count == 0 {
            warn!("No gamepad connected yet, polling will pick devices up on connect");
        } else {
            info!("Found {} gamepads:", count);
            for (id, gamepad) in self.gilrs.gamepads() {
                info!("  ID: {}, Name: {}", id, gamepad.name());
            }
        }

        self.transition()
    }
}

impl GamepadSource for GilrsBackend<Ready> {
    fn connected_devices(&mut self) -> Vec<DeviceButtons> {
        // gilrs only refreshes its cached state while events are drained
        while let Some(event) = self.gilrs.next_event() {
            debug!("Drained gilrs event: {:?}", event.event);
        }

        self.gilrs
            .gamepads()
            .filter(|(_, gamepad)| gamepad.is_connected())
            .map(|(id, gamepad)| {
                let pressed = STANDARD_ORDER
                    .iter()
                    .map(|button| gamepad.is_pressed(*button))
                    .collect();
                DeviceButtons::new(DeviceId::from(id), pressed)
            })
            .collect()
    }
}

/// Probes the host for gamepad support. Called once at start-up.
pub fn probe_gamepads() -> Capability<GilrsBackend<Ready>> {
    match GilrsBackend::<Probing>::create() {
        Ok(backend) => Capability::Present(backend.initialize()),
        Err(e) => {
            warn!("Gamepad input disabled: {}", e);
            Capability::Absent(e.to_string())
        }
    }
}
