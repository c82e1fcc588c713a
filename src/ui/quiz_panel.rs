use eframe::egui::{self, vec2, Button, Frame, RichText, Stroke, Ui};
use tokio::sync::mpsc;
use tracing::warn;

use super::common::{choice_caption, UiColors};
use crate::controller::ButtonMap;
use crate::session::{SessionCommand, SessionView};

/// Question, choices and verdict for the current frame
pub struct QuizPanel {
    commands: mpsc::Sender<SessionCommand>,
    buttons: ButtonMap,
}

impl QuizPanel {
    pub fn new(commands: mpsc::Sender<SessionCommand>) -> Self {
        Self {
            commands,
            buttons: ButtonMap::default(),
        }
    }

    fn send(&self, command: SessionCommand) {
        if let Err(e) = self.commands.try_send(command) {
            warn!("Dropped UI command: {}", e);
        }
    }

    pub fn render(&self, ui: &mut Ui, view: &SessionView) {
        let width = ui.available_width();

        ui.horizontal(|ui| {
            ui.label(RichText::new(&view.progress).size(18.0));
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                ui.label(RichText::new(&view.score).size(18.0));
            });
        });
        ui.separator();

        Frame::new()
            .fill(ui.visuals().extreme_bg_color)
            .inner_margin(12)
            .stroke(Stroke::new(1.0, UiColors::BORDER))
            .show(ui, |ui| {
                ui.set_width(width - 24.0);
                ui.heading(&view.prompt);
            });
        ui.add_space(8.0);

        for (i, text) in view.choices.iter().enumerate() {
            let Ok(choice) = u8::try_from(i + 1) else {
                break;
            };
            let caption = choice_caption(&self.buttons, choice, text);
            let button = Button::new(RichText::new(caption).size(20.0)).min_size(vec2(width, 40.0));
            if ui.add_enabled(view.answer_enabled, button).clicked() {
                self.send(SessionCommand::SubmitAnswer(choice));
            }
        }

        if let Some(result) = &view.result {
            ui.add_space(8.0);
            let color = if result.correct {
                UiColors::ACTIVE
            } else {
                UiColors::ERROR
            };
            ui.label(RichText::new(&result.text).size(22.0).color(color));
            ui.label(&view.explanation);
        }

        if let Some(error) = &view.error {
            ui.add_space(8.0);
            ui.colored_label(UiColors::ERROR, error);
        }

        if view.advance_enabled {
            ui.add_space(8.0);
            let next = Button::new(RichText::new("Next").size(20.0)).min_size(vec2(width / 3.0, 36.0));
            if ui.add(next).clicked() {
                self.send(SessionCommand::Advance);
            }
        }
    }
}
