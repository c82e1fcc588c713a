use std::fmt;
use tokio::runtime::Handle;
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use super::gate::InputGate;
use crate::controller::{
    Capability, CollectorError, GamepadSource, PollerHandle, PollerSettings, PressEvent,
};

/// What the gamepad toggle currently shows
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputStatus {
    Off,
    On,
    Unavailable(String),
}

impl fmt::Display for InputStatus {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            InputStatus::Off => write!(f, "Gamepad: OFF"),
            InputStatus::On => write!(f, "Gamepad: ON"),
            InputStatus::Unavailable(reason) => write!(f, "Gamepad unavailable: {}", reason),
        }
    }
}

/// Couples the gamepad poller to the input gate
///
/// Presses leave the poller through a sink that checks the gate at emission
/// time. When the gate is closed the press is dropped, not queued.
#[derive(Clone)]
pub struct GamepadBinding {
    gate: InputGate,
    poller: Option<PollerHandle<Box<dyn GamepadSource>>>,
    unavailable: Option<String>,
    press_tx: mpsc::Sender<PressEvent>,
}

impl GamepadBinding {
    pub fn new<S: GamepadSource>(
        capability: Capability<S>,
        gate: InputGate,
        settings: Option<PollerSettings>,
        press_tx: mpsc::Sender<PressEvent>,
        runtime: Handle,
    ) -> Self {
        let (poller, unavailable) = match capability {
            Capability::Present(source) => {
                let source: Box<dyn GamepadSource> = Box::new(source);
                (Some(PollerHandle::new(source, settings, runtime)), None)
            }
            Capability::Absent(reason) => {
                warn!("Gamepad binding running without a backend: {}", reason);
                (None, Some(reason))
            }
        };

        Self {
            gate,
            poller,
            unavailable,
            press_tx,
        }
    }

    /// Opens the gate and starts polling. No-op if already on.
    pub fn enable(&self) -> InputStatus {
        let Some(poller) = &self.poller else {
            return self.status();
        };
        if self.gate.is_enabled() {
            return self.status();
        }

        self.gate.enable();
        let gate = self.gate.clone();
        let press_tx = self.press_tx.clone();
        poller.start(move |event| {
            if !gate.is_enabled() {
                debug!("Gate closed, dropping press for choice {}", event.choice_index);
                return;
            }
            if let Err(e) = press_tx.try_send(event) {
                let err = CollectorError::EventSendError(e.to_string());
                error!("{}", err);
            }
        });
        info!("Gamepad input enabled");
        self.status()
    }

    /// Closes the gate and stops polling. No-op if already off.
    pub fn disable(&self) -> InputStatus {
        if !self.gate.is_enabled() {
            return self.status();
        }
        self.gate.disable();
        if let Some(poller) = &self.poller {
            poller.stop();
        }
        info!("Gamepad input disabled");
        self.status()
    }

    pub fn set_enabled(&self, enabled: bool) -> InputStatus {
        if enabled {
            self.enable()
        } else {
            self.disable()
        }
    }

    pub fn status(&self) -> InputStatus {
        if let Some(reason) = &self.unavailable {
            InputStatus::Unavailable(reason.clone())
        } else if self.gate.is_enabled() {
            InputStatus::On
        } else {
            InputStatus::Off
        }
    }

    pub fn gate(&self) -> &InputGate {
        &self.gate
    }

    /// Samples once outside the regular cadence.
    pub fn poll_once(&self) -> usize {
        self.poller.as_ref().map_or(0, PollerHandle::poll_once)
    }
}
