use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use super::controller::SessionController;
use crate::controller::PressEvent;
use crate::input::InputGate;

/// Requests the view layer can make of the session
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionCommand {
    /// List the quizzes and load the current question
    Init,
    /// Reload the current question
    Refresh,
    /// Answer with a 1-based choice index
    SubmitAnswer(u8),
    Advance,
    SelectQuiz(String),
}

/// Routes view commands and gamepad presses into the session controller
///
/// Both sources end up in the same controller calls, so a press and a click
/// on the same choice are indistinguishable to the session. Each command
/// runs on its own task; the controller's guards decide which of a burst of
/// concurrent submissions goes out.
pub struct SessionDriver {
    controller: SessionController,
    gate: InputGate,
    commands: mpsc::Receiver<SessionCommand>,
    presses: mpsc::Receiver<PressEvent>,
}

impl SessionDriver {
    pub fn new(
        controller: SessionController,
        gate: InputGate,
        commands: mpsc::Receiver<SessionCommand>,
        presses: mpsc::Receiver<PressEvent>,
    ) -> Self {
        Self {
            controller,
            gate,
            commands,
            presses,
        }
    }

    /// Runs until cancelled or until the command channel closes.
    pub async fn run(mut self, cancel: CancellationToken) {
        info!("Session driver started");
        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    info!("Session driver cancelled");
                    break;
                }
                command = self.commands.recv() => {
                    let Some(command) = command else {
                        info!("Command channel closed, stopping session driver");
                        break;
                    };
                    self.dispatch(command);
                }
                Some(press) = self.presses.recv() => {
                    // the toggle may have closed between emission and receipt
                    if !self.gate.is_enabled() {
                        debug!("Gate closed, dropping press from {}", press.player_id);
                        continue;
                    }
                    debug!(
                        "Press from {} selects choice {}",
                        press.player_id, press.choice_index
                    );
                    self.dispatch(SessionCommand::SubmitAnswer(press.choice_index));
                }
            }
        }
    }

    fn dispatch(&self, command: SessionCommand) {
        let controller = self.controller.clone();
        debug!("Dispatching {:?}", command);
        tokio::spawn(async move {
            match command {
                SessionCommand::Init => controller.init().await,
                SessionCommand::Refresh => controller.fetch_question().await,
                SessionCommand::SubmitAnswer(choice) => controller.submit_answer(choice).await,
                SessionCommand::Advance => controller.advance().await,
                SessionCommand::SelectQuiz(name) => controller.select_quiz(&name).await,
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controller::DeviceId;
    use crate::session::test_support::{answer, question, ScriptedApi};
    use crate::session::SessionPhase;
    use chrono::Local;
    use std::sync::Arc;
    use std::time::Duration;

    struct Harness {
        api: Arc<ScriptedApi>,
        controller: SessionController,
        gate: InputGate,
        commands: mpsc::Sender<SessionCommand>,
        presses: mpsc::Sender<PressEvent>,
        cancel: CancellationToken,
    }

    fn start(api: ScriptedApi) -> Harness {
        let api = Arc::new(api);
        let controller = SessionController::new(api.clone(), "p0");
        let gate = InputGate::default();
        gate.enable();
        let (commands, command_rx) = mpsc::channel(8);
        let (presses, press_rx) = mpsc::channel(8);
        let cancel = CancellationToken::new();
        let driver = SessionDriver::new(controller.clone(), gate.clone(), command_rx, press_rx);
        tokio::spawn(driver.run(cancel.clone()));

        Harness {
            api,
            controller,
            gate,
            commands,
            presses,
            cancel,
        }
    }

    fn press(choice_index: u8) -> PressEvent {
        PressEvent {
            device: DeviceId(0),
            player_id: "p0".into(),
            choice_index,
            timestamp: Local::now(),
        }
    }

    async fn wait_for_phase(controller: &SessionController, phase: SessionPhase) {
        let mut views = controller.subscribe();
        tokio::time::timeout(Duration::from_secs(2), views.wait_for(|v| v.phase == phase))
            .await
            .expect("phase reached in time")
            .expect("view channel open");
    }

    #[tokio::test]
    async fn gamepad_press_submits_like_a_click() {
        let api = ScriptedApi::new();
        api.push_question(Ok(question(7, 3, 2)));
        api.push_answer(Ok(answer(true, "B", 3)));
        let h = start(api);

        h.commands.send(SessionCommand::Refresh).await.expect("send");
        wait_for_phase(&h.controller, SessionPhase::AwaitingAnswer).await;

        h.presses.send(press(2)).await.expect("send");
        wait_for_phase(&h.controller, SessionPhase::Answered).await;

        let requests = h.api.answer_requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].choice_index, 2);
        assert_eq!(h.controller.view().score, "Score: 3");
        h.cancel.cancel();
    }

    #[tokio::test]
    async fn burst_of_presses_yields_one_submission() {
        let api = ScriptedApi::holding_answers();
        api.push_question(Ok(question(7, 3, 2)));
        api.push_answer(Ok(answer(false, "B", 2)));
        let h = start(api);

        h.commands.send(SessionCommand::Refresh).await.expect("send");
        wait_for_phase(&h.controller, SessionPhase::AwaitingAnswer).await;

        h.presses.send(press(1)).await.expect("send");
        h.api.answer_received.notified().await;
        h.presses.send(press(3)).await.expect("send");
        h.commands
            .send(SessionCommand::SubmitAnswer(4))
            .await
            .expect("send");
        tokio::time::sleep(Duration::from_millis(50)).await;

        h.api.answer_release.notify_one();
        wait_for_phase(&h.controller, SessionPhase::Answered).await;
        assert_eq!(h.api.answer_requests().len(), 1);
        assert_eq!(h.api.answer_requests()[0].choice_index, 1);
        h.cancel.cancel();
    }

    #[tokio::test]
    async fn press_received_after_gate_closes_is_dropped() {
        let api = ScriptedApi::new();
        api.push_question(Ok(question(7, 3, 2)));
        let h = start(api);

        h.commands.send(SessionCommand::Refresh).await.expect("send");
        wait_for_phase(&h.controller, SessionPhase::AwaitingAnswer).await;

        h.gate.disable();
        h.presses.send(press(2)).await.expect("send");
        tokio::time::sleep(Duration::from_millis(50)).await;

        assert!(h.api.answer_requests().is_empty());
        assert_eq!(h.controller.state().phase, SessionPhase::AwaitingAnswer);
        h.cancel.cancel();
    }

    #[tokio::test]
    async fn driver_stops_when_commands_close() {
        let api = Arc::new(ScriptedApi::new());
        let controller = SessionController::new(api, "p0");
        let (commands, command_rx) = mpsc::channel(1);
        let (_presses, press_rx) = mpsc::channel(1);
        let driver = SessionDriver::new(controller, InputGate::default(), command_rx, press_rx);
        let task = tokio::spawn(driver.run(CancellationToken::new()));

        drop(commands);

        tokio::time::timeout(Duration::from_secs(2), task)
            .await
            .expect("driver exits")
            .expect("driver task");
    }
}
