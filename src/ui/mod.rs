//! # Quiz screen
//!
//! Immediate-mode egui front end. The screen is rebuilt every frame from the
//! latest [`SessionView`] published by the session controller; user actions
//! go back as [`SessionCommand`]s. The UI never touches session state
//! directly.
//!
//! Layout:
//! - **Top Panel**: quiz picker, gamepad toggle and its status
//! - **Central Panel**: progress, question, choices, verdict
//! - **Bottom Panel**: server address

pub mod common;
pub mod quiz_panel;

use eframe::egui::{self, ComboBox, RichText};
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tracing::{info, warn};

use crate::input::GamepadBinding;
use crate::session::{SessionCommand, SessionView};

use self::common::status_color;
use self::quiz_panel::QuizPanel;

pub struct QuizpadUI {
    views: watch::Receiver<SessionView>,
    commands: mpsc::Sender<SessionCommand>,
    binding: GamepadBinding,
    quiz_panel: QuizPanel,
    /// Mirrors the gate for the toggle widget
    gamepad_enabled: bool,
    server_url: String,
}

impl QuizpadUI {
    pub fn new(
        cc: &eframe::CreationContext<'_>,
        views: watch::Receiver<SessionView>,
        commands: mpsc::Sender<SessionCommand>,
        binding: GamepadBinding,
        server_url: String,
    ) -> Self {
        cc.egui_ctx.set_theme(egui::Theme::Dark);
        let gamepad_enabled = binding.gate().is_enabled();
        QuizpadUI {
            views,
            quiz_panel: QuizPanel::new(commands.clone()),
            commands,
            binding,
            gamepad_enabled,
            server_url,
        }
    }

    fn send(&self, command: SessionCommand) {
        if let Err(e) = self.commands.try_send(command) {
            warn!("Dropped UI command: {}", e);
        }
    }

    fn render_top(&mut self, ui: &mut egui::Ui, view: &SessionView) {
        ui.horizontal_centered(|ui| {
            let selected = view.selected_quiz.clone().unwrap_or_default();
            let mut choice = selected.clone();
            ComboBox::from_id_salt("quiz_selector")
                .selected_text(if selected.is_empty() {
                    "Select quiz"
                } else {
                    selected.as_str()
                })
                .show_ui(ui, |ui| {
                    for quiz in &view.quizzes {
                        ui.selectable_value(&mut choice, quiz.clone(), quiz);
                    }
                });
            if choice != selected {
                info!("Quiz picker changed to {}", choice);
                self.send(SessionCommand::SelectQuiz(choice));
            }

            if ui.button("Reload").clicked() {
                self.send(SessionCommand::Init);
            }

            ui.separator();
            if ui.checkbox(&mut self.gamepad_enabled, "Gamepad").changed() {
                self.binding.set_enabled(self.gamepad_enabled);
            }
            let status = self.binding.status();
            // the toggle snaps back if the backend is missing
            self.gamepad_enabled = self.binding.gate().is_enabled();
            ui.label(RichText::new(status.to_string()).color(status_color(&status)));
        });
    }
}

impl eframe::App for QuizpadUI {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        ctx.request_repaint_after(Duration::from_millis(33));
        let view = self.views.borrow_and_update().clone();

        egui::TopBottomPanel::top("top_panel")
            .show_separator_line(false)
            .show(ctx, |ui| self.render_top(ui, &view));

        egui::TopBottomPanel::bottom("bottom_panel")
            .show_separator_line(false)
            .show(ctx, |ui| {
                ui.label(format!("Server: {}", self.server_url));
            });

        egui::CentralPanel::default().show(ctx, |ui| self.quiz_panel.render(ui, &view));
    }
}
