use color_eyre::{eyre::eyre, Result};
use eframe::egui;
use quizpad::api::HttpQuizApi;
use quizpad::config::AppConfig;
use quizpad::controller::{probe_gamepads, PollerSettings};
use quizpad::input::{GamepadBinding, InputGate};
use quizpad::session::{SessionCommand, SessionController, SessionDriver};
use quizpad::ui::QuizpadUI;
use std::sync::Arc;
use tokio::runtime::Handle;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;

#[tokio::main]
async fn main() -> Result<()> {
    setup()?;

    let config = AppConfig::load_or_default()?;
    info!("Using quiz server {}", config.server_url);

    let api = HttpQuizApi::new(config.server_url.clone(), config.request_timeout())
        .map_err(|e| eyre!("Failed to build HTTP client: {}", e))?;
    let server_url = api.server_url().to_string();
    let controller = SessionController::new(Arc::new(api), config.player_id.clone());

    // Gamepad presses and UI commands meet in the driver
    let (press_tx, press_rx) = mpsc::channel(64);
    let (command_tx, command_rx) = mpsc::channel(64);

    let gate = InputGate::default();
    let binding = GamepadBinding::new(
        probe_gamepads(),
        gate.clone(),
        Some(PollerSettings {
            poll_interval_ms: config.poll_interval_ms,
        }),
        press_tx,
        Handle::current(),
    );

    let cancel = CancellationToken::new();
    let driver = SessionDriver::new(controller.clone(), gate, command_rx, press_rx);
    let driver_handle = tokio::spawn(driver.run(cancel.clone()));

    command_tx
        .send(SessionCommand::Init)
        .await
        .map_err(|e| eyre!("Failed to start session: {}", e))?;

    if config.gamepad_on_start {
        info!("Gamepad input on at start-up: {}", binding.enable());
    }

    // Blocks until the window closes
    info!("Starting UI");
    let mut native_options = eframe::NativeOptions::default();
    native_options.viewport = egui::ViewportBuilder::default().with_fullscreen(config.fullscreen);

    let views = controller.subscribe();
    let ui_binding = binding.clone();
    let ui_result = eframe::run_native(
        "Quizpad",
        native_options,
        Box::new(move |cc| {
            Ok(Box::new(QuizpadUI::new(
                cc, views, command_tx, ui_binding, server_url,
            )))
        }),
    );

    info!("UI closed, shutting down");
    binding.disable();
    cancel.cancel();
    if let Err(e) = driver_handle.await {
        warn!("Session driver ended abnormally: {}", e);
    }

    ui_result.map_err(|e| eyre!("UI failed: {}", e))
}

fn setup() -> Result<()> {
    if std::env::var("RUST_LIB_BACKTRACE").is_err() {
        std::env::set_var("RUST_LIB_BACKTRACE", "0")
    }
    color_eyre::install()?;
    if std::env::var("RUST_LOG").is_err() {
        std::env::set_var("RUST_LOG", "info")
    }
    setup_logging_env();
    Ok(())
}

fn setup_logging_env() {
    FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .with_target(false)
        .with_thread_ids(true)
        .with_file(true)
        .with_line_number(true)
        .pretty()
        .init();
}
