//! Session Controller - the quiz state machine
//!
//! ```text
//! Loading ──► AwaitingAnswer ──► Answered ──► Loading ...
//!    │                                  └───► Finished (until select_quiz)
//!    └──► Finished
//! ```
//!
//! All state lives behind one synchronous lock that is never held across
//! an `.await`. Every operation decides whether it may proceed, and sets
//! its guard, before the request future is even created. Responses are
//! re-checked against the state they land in, since nothing cancels a
//! request that is already on the wire.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::watch;
use tracing::{debug, error, info, warn};

use super::state::{AnswerOutcome, FinalScore, Question, SessionPhase, SessionState, SessionView};
use crate::api::{AnswerRequest, ApiError, QuestionPayload, QuizApi};

struct Shared {
    session: SessionState,
    error: Option<String>,
}

struct Inner {
    api: Arc<dyn QuizApi>,
    player_id: String,
    shared: Mutex<Shared>,
    view_tx: watch::Sender<SessionView>,
}

/// Owns the quiz session and is the only writer of [`SessionState`]
///
/// Cheap to clone; clones drive the same session.
#[derive(Clone)]
pub struct SessionController {
    inner: Arc<Inner>,
}

fn user_message(err: &ApiError, fallback: &str) -> String {
    err.server_message()
        .map(str::to_string)
        .unwrap_or_else(|| fallback.to_string())
}

impl SessionController {
    pub fn new(api: Arc<dyn QuizApi>, player_id: impl Into<String>) -> Self {
        let session = SessionState::default();
        let (view_tx, _) = watch::channel(session.view(None));

        Self {
            inner: Arc::new(Inner {
                api,
                player_id: player_id.into(),
                shared: Mutex::new(Shared {
                    session,
                    error: None,
                }),
                view_tx,
            }),
        }
    }

    /// Render state updates for the view layer
    pub fn subscribe(&self) -> watch::Receiver<SessionView> {
        self.inner.view_tx.subscribe()
    }

    pub fn state(&self) -> SessionState {
        self.lock().session.clone()
    }

    pub fn view(&self) -> SessionView {
        self.inner.view_tx.borrow().clone()
    }

    fn lock(&self) -> MutexGuard<'_, Shared> {
        self.inner
            .shared
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    // Mutates under the lock and republishes the view before releasing it.
    fn update<R>(&self, f: impl FnOnce(&mut Shared) -> R) -> R {
        let mut shared = self.lock();
        let result = f(&mut shared);
        let view = shared.session.view(shared.error.as_deref());
        self.inner.view_tx.send_replace(view);
        result
    }

    /// Lists the quizzes, then loads the current question.
    pub async fn init(&self) {
        self.load_quizzes().await;
        self.fetch_question().await;
    }

    /// Refreshes the quiz list shown by the catalog picker.
    pub async fn load_quizzes(&self) {
        match self.inner.api.list_quizzes().await {
            Ok(list) => {
                info!("Server offers {} quizzes", list.files.len());
                self.update(|shared| {
                    let session = &mut shared.session;
                    session.selected_quiz = list.selected.or_else(|| list.files.first().cloned());
                    session.quizzes = list.files;
                });
            }
            Err(e) => warn!("Failed to list quizzes: {}", e),
        }
    }

    /// Loads whatever question the server considers current.
    pub async fn fetch_question(&self) {
        let generation = self.update(|shared| {
            let session = &mut shared.session;
            session.fetch_generation += 1;
            if !session.finished {
                session.phase = SessionPhase::Loading;
            }
            session.fetch_generation
        });
        debug!("Fetching question (generation {})", generation);

        let result = self.inner.api.current_question().await;

        self.update(|shared| {
            if shared.session.fetch_generation != generation {
                debug!("Discarding superseded question response {}", generation);
                return;
            }
            let session = &mut shared.session;
            match result {
                Ok(QuestionPayload::Finished(body)) => {
                    if body.selected_quiz.is_some() {
                        session.selected_quiz = body.selected_quiz;
                    }
                    info!("Quiz finished with {} / {}", body.score, body.total);
                    session.finished = true;
                    session.submitting = false;
                    session.phase = SessionPhase::Finished;
                    session.final_score = Some(FinalScore {
                        score: body.score,
                        total: body.total,
                    });
                    shared.error = None;
                }
                Ok(QuestionPayload::Question(body)) => {
                    if session.finished {
                        debug!("Ignoring question {} for a finished session", body.id);
                        return;
                    }
                    if body.selected_quiz.is_some() {
                        session.selected_quiz = body.selected_quiz.clone();
                    }
                    let question = Question::from(body);
                    info!(
                        "Question {} ({} / {}) loaded",
                        question.id, question.index, question.total
                    );
                    // an answer still on the wire for this same question keeps its guard
                    let same_question = session
                        .current_question
                        .as_ref()
                        .is_some_and(|current| current.id == question.id);
                    if !same_question {
                        session.submitting = false;
                    } else if session.submitting {
                        debug!("Answer for question {} still in flight", question.id);
                    }
                    session.current_question = Some(question);
                    session.answered = false;
                    session.outcome = None;
                    session.phase = SessionPhase::AwaitingAnswer;
                    shared.error = None;
                }
                Err(e) => {
                    error!("Failed to fetch question: {}", e);
                    shared.error = Some(user_message(&e, "Failed to load question"));
                }
            }
        });
    }

    /// Submits `choice_index` (1-based) for the current question.
    ///
    /// Calls that arrive while an answer is in flight, after the question
    /// was answered, or once the quiz is finished do nothing.
    pub async fn submit_answer(&self, choice_index: u8) {
        let player_id = self.inner.player_id.clone();
        let request = self.update(|shared| {
            let session = &mut shared.session;
            if !session.accepts_answer(choice_index) {
                debug!(
                    "Ignoring answer {} (phase {:?}, answered {}, submitting {})",
                    choice_index, session.phase, session.answered, session.submitting
                );
                return None;
            }
            let question = session.current_question.as_ref()?;
            let request = AnswerRequest {
                id: question.id.clone(),
                choice_index,
                player_id,
            };
            session.submitting = true;
            Some(request)
        });
        let Some(request) = request else {
            return;
        };

        info!(
            "Submitting choice {} for question {}",
            request.choice_index, request.id
        );
        let result = self.inner.api.submit_answer(&request).await;

        self.update(|shared| {
            let session = &mut shared.session;
            let still_current = !session.finished
                && session
                    .current_question
                    .as_ref()
                    .is_some_and(|question| question.id == request.id);
            if !still_current {
                debug!("Discarding stale answer response for question {}", request.id);
                return;
            }

            session.submitting = false;
            match result {
                Ok(response) => {
                    info!(
                        "Question {} answered: correct={}, score={}",
                        request.id, response.correct, response.score
                    );
                    session.answered = true;
                    session.phase = SessionPhase::Answered;
                    let choices = session
                        .current_question
                        .as_ref()
                        .map(|question| question.choices.as_slice())
                        .unwrap_or_default();
                    session.outcome = Some(AnswerOutcome::new(response, choices));
                    shared.error = None;
                }
                Err(e) => {
                    error!("Failed to submit answer: {}", e);
                    shared.error = Some(user_message(&e, "Failed to submit answer"));
                }
            }
        });
    }

    /// Moves the server on to the next question, then loads it.
    pub async fn advance(&self) {
        let proceed = self.update(|shared| {
            let session = &mut shared.session;
            if !session.can_advance() {
                debug!("Ignoring advance in phase {:?}", session.phase);
                return false;
            }
            session.phase = SessionPhase::Loading;
            true
        });
        if !proceed {
            return;
        }

        match self.inner.api.advance().await {
            Ok(()) => self.fetch_question().await,
            Err(e) => {
                error!("Failed to advance: {}", e);
                self.update(|shared| {
                    let session = &mut shared.session;
                    if session.phase == SessionPhase::Loading && session.answered {
                        session.phase = SessionPhase::Answered;
                    }
                    shared.error = Some(user_message(&e, "Failed to advance"));
                });
            }
        }
    }

    /// Switches the server to another quiz file and starts it over.
    pub async fn select_quiz(&self, name: &str) {
        if name.is_empty() {
            return;
        }
        info!("Selecting quiz {}", name);

        match self.inner.api.select_quiz(name).await {
            Ok(response) => {
                self.update(|shared| {
                    let session = &mut shared.session;
                    session.selected_quiz = response.selected.or_else(|| Some(name.to_string()));
                    session.finished = false;
                    session.final_score = None;
                    session.answered = false;
                    session.outcome = None;
                    session.phase = SessionPhase::Loading;
                    shared.error = None;
                });
                self.fetch_question().await;
            }
            Err(e) => {
                error!("Failed to select quiz {}: {}", name, e);
                self.update(|shared| {
                    shared.error = Some(user_message(&e, "Failed to switch quiz"));
                });
            }
        }
    }
}

#[cfg(test)]
#[path = "tests/controller_tests.rs"]
mod tests;
