//! Scripted stand-in for the quiz server

use async_trait::async_trait;
use serde_json::{json, Value};
use std::collections::VecDeque;
use std::sync::Mutex;
use tokio::sync::Notify;

use crate::api::{
    AnswerRequest, AnswerResponse, ApiError, QuestionPayload, QuizApi, QuizList,
    SelectQuizResponse,
};

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Call {
    ListQuizzes,
    SelectQuiz(String),
    CurrentQuestion,
    SubmitAnswer(AnswerRequest),
    Advance,
}

/// Replays queued responses in order. An empty queue answers with a 503.
#[derive(Default)]
pub(crate) struct ScriptedApi {
    quiz_lists: Mutex<VecDeque<Result<QuizList, ApiError>>>,
    selections: Mutex<VecDeque<Result<SelectQuizResponse, ApiError>>>,
    questions: Mutex<VecDeque<Result<QuestionPayload, ApiError>>>,
    answers: Mutex<VecDeque<Result<AnswerResponse, ApiError>>>,
    advances: Mutex<VecDeque<Result<(), ApiError>>>,
    calls: Mutex<Vec<Call>>,
    hold_answers: bool,
    /// Signalled every time an answer request arrives
    pub answer_received: Notify,
    /// Lets one held answer response through
    pub answer_release: Notify,
}

pub(crate) fn payload(value: Value) -> QuestionPayload {
    serde_json::from_value(value).expect("question payload")
}

pub(crate) fn question(id: i64, index: u32, score: i64) -> QuestionPayload {
    payload(json!({
        "id": id,
        "question": format!("Question {id}"),
        "choices": ["A", "B", "C", "D"],
        "index": index,
        "total": 10,
        "score": score
    }))
}

pub(crate) fn answer(correct: bool, correct_choice: &str, score: i64) -> AnswerResponse {
    serde_json::from_value(json!({
        "correct": correct,
        "correct_choice": correct_choice,
        "score": score
    }))
    .expect("answer response")
}

pub(crate) fn rejected(message: &str) -> ApiError {
    ApiError::Rejected {
        status: 400,
        message: message.to_string(),
    }
}

fn unavailable() -> ApiError {
    ApiError::Status { status: 503 }
}

impl ScriptedApi {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Answer requests block until [`Self::answer_release`] is notified.
    pub(crate) fn holding_answers() -> Self {
        Self {
            hold_answers: true,
            ..Self::default()
        }
    }

    pub(crate) fn push_quiz_list(&self, result: Result<QuizList, ApiError>) {
        self.quiz_lists.lock().expect("lock").push_back(result);
    }

    pub(crate) fn push_selection(&self, result: Result<SelectQuizResponse, ApiError>) {
        self.selections.lock().expect("lock").push_back(result);
    }

    pub(crate) fn push_question(&self, result: Result<QuestionPayload, ApiError>) {
        self.questions.lock().expect("lock").push_back(result);
    }

    pub(crate) fn push_answer(&self, result: Result<AnswerResponse, ApiError>) {
        self.answers.lock().expect("lock").push_back(result);
    }

    pub(crate) fn push_advance(&self, result: Result<(), ApiError>) {
        self.advances.lock().expect("lock").push_back(result);
    }

    pub(crate) fn calls(&self) -> Vec<Call> {
        self.calls.lock().expect("lock").clone()
    }

    pub(crate) fn answer_requests(&self) -> Vec<AnswerRequest> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                Call::SubmitAnswer(request) => Some(request),
                _ => None,
            })
            .collect()
    }

    fn record(&self, call: Call) {
        self.calls.lock().expect("lock").push(call);
    }
}

fn next<T>(queue: &Mutex<VecDeque<Result<T, ApiError>>>) -> Result<T, ApiError> {
    queue
        .lock()
        .expect("lock")
        .pop_front()
        .unwrap_or_else(|| Err(unavailable()))
}

#[async_trait]
impl QuizApi for ScriptedApi {
    async fn list_quizzes(&self) -> Result<QuizList, ApiError> {
        self.record(Call::ListQuizzes);
        next(&self.quiz_lists)
    }

    async fn select_quiz(&self, filename: &str) -> Result<SelectQuizResponse, ApiError> {
        self.record(Call::SelectQuiz(filename.to_string()));
        next(&self.selections)
    }

    async fn current_question(&self) -> Result<QuestionPayload, ApiError> {
        self.record(Call::CurrentQuestion);
        next(&self.questions)
    }

    async fn submit_answer(&self, request: &AnswerRequest) -> Result<AnswerResponse, ApiError> {
        self.record(Call::SubmitAnswer(request.clone()));
        self.answer_received.notify_one();
        if self.hold_answers {
            self.answer_release.notified().await;
        }
        next(&self.answers)
    }

    async fn advance(&self) -> Result<(), ApiError> {
        self.record(Call::Advance);
        next(&self.advances)
    }
}
