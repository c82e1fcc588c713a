//! Fixed face-button table for four-choice quizzes
//!
//! Device button indices follow the standard gamepad layout. The "×" button
//! reports at index 0, not 1, so the table is spelled out entry by entry
//! instead of deriving choices from a linear offset.

/// One row of the face-button table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FaceButton {
    /// Button index as reported by the device
    pub device_index: usize,
    /// 1-based choice index submitted to the server
    pub choice_index: u8,
    /// Label printed on the controller
    pub label: &'static str,
}

pub const FACE_BUTTONS: [FaceButton; 4] = [
    FaceButton {
        device_index: 1,
        choice_index: 1,
        label: "○",
    },
    FaceButton {
        device_index: 0,
        choice_index: 2,
        label: "×",
    },
    FaceButton {
        device_index: 2,
        choice_index: 3,
        label: "△",
    },
    FaceButton {
        device_index: 3,
        choice_index: 4,
        label: "□",
    },
];

/// Maps a device button index to a quiz choice
#[derive(Debug, Clone)]
pub struct ButtonMap {
    entries: Vec<FaceButton>,
}

impl Default for ButtonMap {
    fn default() -> Self {
        Self {
            entries: FACE_BUTTONS.to_vec(),
        }
    }
}

impl ButtonMap {
    pub fn choice_for(&self, device_index: usize) -> Option<u8> {
        self.entries
            .iter()
            .find(|entry| entry.device_index == device_index)
            .map(|entry| entry.choice_index)
    }

    pub fn label_for_choice(&self, choice_index: u8) -> Option<&'static str> {
        self.entries
            .iter()
            .find(|entry| entry.choice_index == choice_index)
            .map(|entry| entry.label)
    }

    pub fn choice_count(&self) -> usize {
        self.entries.len()
    }
}
