use chrono::{DateTime, Local};
use std::collections::HashMap;
use tracing::{debug, info};

use super::button_map::ButtonMap;
use super::gamepad_source::{DeviceButtons, DeviceId};

/// A mapped button went from released to pressed
#[derive(Debug, Clone, PartialEq)]
pub struct PressEvent {
    pub device: DeviceId,
    pub player_id: String,
    pub choice_index: u8,
    pub timestamp: DateTime<Local>,
}

/// Turns sampled button levels into rising-edge press events.
///
/// Holds the previous sample of every device it has seen. Snapshots of
/// devices that disappear are kept; they are overwritten the next time the
/// device is sampled.
#[derive(Debug, Default)]
pub struct EdgeDetector {
    map: ButtonMap,
    snapshots: HashMap<DeviceId, Vec<bool>>,
}

impl EdgeDetector {
    pub fn new(map: ButtonMap) -> Self {
        Self {
            map,
            snapshots: HashMap::new(),
        }
    }

    /// Compares one sample against the stored snapshots.
    ///
    /// Every connected device gets its snapshot replaced by the current
    /// sample, whether or not any of its buttons are mapped.
    pub fn sample(&mut self, devices: &[DeviceButtons]) -> Vec<PressEvent> {
        let mut events = Vec::new();

        for device in devices {
            let previous = self.snapshots.get(&device.device);

            for (index, &pressed) in device.pressed.iter().enumerate() {
                let was_pressed = previous
                    .and_then(|buttons| buttons.get(index).copied())
                    .unwrap_or(false);
                if !pressed || was_pressed {
                    continue;
                }
                if let Some(choice_index) = self.map.choice_for(index) {
                    let event = PressEvent {
                        device: device.device,
                        player_id: format!("p{}", device.device),
                        choice_index,
                        timestamp: Local::now(),
                    };
                    info!(
                        "Press on device {}: button {} -> choice {} at {}",
                        device.device,
                        index,
                        choice_index,
                        event.timestamp.format("%H:%M:%S.%3f")
                    );
                    events.push(event);
                } else {
                    debug!("Unmapped button {} pressed on device {}", index, device.device);
                }
            }

            self.snapshots.insert(device.device, device.pressed.clone());
        }

        events
    }

    /// Records the current levels as the baseline without emitting.
    ///
    /// Buttons already held when polling starts are treated as held, so they
    /// only produce an event after being released and pressed again.
    pub fn prime(&mut self, devices: &[DeviceButtons]) {
        for device in devices {
            self.snapshots.insert(device.device, device.pressed.clone());
        }
        debug!("Primed snapshots for {} devices", devices.len());
    }

    /// Forgets every stored snapshot.
    pub fn reset(&mut self) {
        if !self.snapshots.is_empty() {
            debug!("Clearing {} device snapshots", self.snapshots.len());
        }
        self.snapshots.clear();
    }

    pub fn tracked_devices(&self) -> usize {
        self.snapshots.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pad(device: usize, pressed: &[usize]) -> DeviceButtons {
        let mut buttons = vec![false; 17];
        for &index in pressed {
            buttons[index] = true;
        }
        DeviceButtons::new(DeviceId(device), buttons)
    }

    fn choices(events: &[PressEvent]) -> Vec<u8> {
        events.iter().map(|e| e.choice_index).collect()
    }

    #[test]
    fn held_button_emits_once_over_many_ticks() {
        let mut detector = EdgeDetector::default();
        let mut emitted = Vec::new();
        for _ in 0..50 {
            emitted.extend(detector.sample(&[pad(0, &[1])]));
        }
        assert_eq!(choices(&emitted), vec![1]);
    }

    #[test]
    fn release_and_press_again_emits_again() {
        let mut detector = EdgeDetector::default();
        assert_eq!(choices(&detector.sample(&[pad(0, &[0])])), vec![2]);
        assert!(detector.sample(&[pad(0, &[])]).is_empty());
        assert_eq!(choices(&detector.sample(&[pad(0, &[0])])), vec![2]);
    }

    #[test]
    fn unmapped_buttons_update_snapshot_without_events() {
        let mut detector = EdgeDetector::default();
        assert!(detector.sample(&[pad(0, &[9, 12])]).is_empty());
        assert_eq!(detector.tracked_devices(), 1);
    }

    #[test]
    fn devices_are_tracked_independently() {
        let mut detector = EdgeDetector::default();
        let events = detector.sample(&[pad(0, &[1]), pad(1, &[3])]);
        assert_eq!(choices(&events), vec![1, 4]);
        assert_eq!(events[0].player_id, "p0");
        assert_eq!(events[1].player_id, "p1");

        // device 0 keeps holding, device 1 presses a new button
        let events = detector.sample(&[pad(0, &[1]), pad(1, &[3, 2])]);
        assert_eq!(choices(&events), vec![3]);
        assert_eq!(events[0].device, DeviceId(1));
    }

    #[test]
    fn reset_forgets_held_state() {
        let mut detector = EdgeDetector::default();
        detector.sample(&[pad(0, &[1])]);
        detector.reset();
        assert_eq!(detector.tracked_devices(), 0);
        assert_eq!(choices(&detector.sample(&[pad(0, &[1])])), vec![1]);
    }

    #[test]
    fn primed_buttons_need_a_release_first() {
        let mut detector = EdgeDetector::default();
        detector.prime(&[pad(0, &[1, 0])]);
        assert!(detector.sample(&[pad(0, &[1, 0])]).is_empty());
        assert!(detector.sample(&[pad(0, &[0])]).is_empty());
        assert_eq!(choices(&detector.sample(&[pad(0, &[0, 1])])), vec![1]);
    }

    #[test]
    fn disconnected_device_keeps_snapshot_and_stays_silent() {
        let mut detector = EdgeDetector::default();
        detector.sample(&[pad(0, &[1])]);
        assert!(detector.sample(&[]).is_empty());
        assert_eq!(detector.tracked_devices(), 1);

        // reappearing while still held is treated as held
        assert!(detector.sample(&[pad(0, &[1])]).is_empty());
    }

    #[test]
    fn shorter_previous_vector_counts_missing_buttons_as_released() {
        let mut detector = EdgeDetector::default();
        detector.sample(&[DeviceButtons::new(DeviceId(0), vec![false])]);
        assert_eq!(choices(&detector.sample(&[pad(0, &[3])])), vec![4]);
    }
}
