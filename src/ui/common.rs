//! Shared colors and labels for the quiz screen

use eframe::egui::Color32;

use crate::controller::ButtonMap;
use crate::input::InputStatus;

/// Dark theme palette
pub struct UiColors;

impl UiColors {
    pub const BORDER: Color32 = Color32::from_rgb(60, 60, 60);

    /// Correct answers and an active gamepad
    pub const ACTIVE: Color32 = Color32::from_rgb(50, 200, 20);

    pub const INACTIVE: Color32 = Color32::from_rgb(140, 140, 140);

    /// Wrong answers and request failures
    pub const ERROR: Color32 = Color32::from_rgb(220, 60, 50);
}

/// Button caption for a 1-based choice, prefixed with its face button.
pub fn choice_caption(map: &ButtonMap, choice_index: u8, text: &str) -> String {
    match map.label_for_choice(choice_index) {
        Some(label) => format!("{}  {}", label, text),
        None => text.to_string(),
    }
}

pub fn status_color(status: &InputStatus) -> Color32 {
    match status {
        InputStatus::On => UiColors::ACTIVE,
        InputStatus::Off => UiColors::INACTIVE,
        InputStatus::Unavailable(_) => UiColors::ERROR,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn captions_follow_face_button_table() {
        let map = ButtonMap::default();
        assert_eq!(choice_caption(&map, 1, "A"), "○  A");
        assert_eq!(choice_caption(&map, 2, "B"), "×  B");
        assert_eq!(choice_caption(&map, 4, "D"), "□  D");
        assert_eq!(choice_caption(&map, 5, "E"), "E");
    }
}
