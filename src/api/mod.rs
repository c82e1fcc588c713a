//! # Quiz Server API
//!
//! Request/response contract with the quiz server. Every operation is a
//! single round-trip; nothing here retries or streams.
//!
//! | operation        | request                         | success                          |
//! |------------------|---------------------------------|----------------------------------|
//! | list quizzes     | `GET /api/quizzes`              | [`QuizList`]                     |
//! | select quiz      | `POST /api/select_quiz`         | [`SelectQuizResponse`]           |
//! | current question | `GET /api/question`             | [`QuestionPayload`]              |
//! | submit answer    | `POST /api/answer`              | [`AnswerResponse`]               |
//! | advance          | `POST /api/next`                | acknowledgement only             |
//!
//! Failures carry `{ "error": "..." }`; that message is kept verbatim in
//! [`ApiError::Rejected`] so it can be shown to the player as-is.

pub mod http;
pub mod types;

use async_trait::async_trait;

pub use http::HttpQuizApi;
pub use types::{
    AnswerRequest, AnswerResponse, CorrectChoice, ErrorBody, FinishedBody, QuestionBody, QuestionId,
    QuestionPayload, QuizList, SelectQuizRequest, SelectQuizResponse,
};

/// Errors of a single API round-trip
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The request never completed (connect, timeout, body read)
    #[error("Request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// Non-success status with a server-provided message
    #[error("{message}")]
    Rejected { status: u16, message: String },

    /// Non-success status without a readable message
    #[error("Server answered with status {status}")]
    Status { status: u16 },

    /// Success status but the body did not match the contract
    #[error("Invalid response: {0}")]
    Decode(String),
}

impl ApiError {
    /// Message supplied by the server, if there was one
    pub fn server_message(&self) -> Option<&str> {
        match self {
            ApiError::Rejected { message, .. } => Some(message),
            _ => None,
        }
    }
}

/// The quiz server as seen by the session controller
#[async_trait]
pub trait QuizApi: Send + Sync {
    async fn list_quizzes(&self) -> Result<QuizList, ApiError>;
    async fn select_quiz(&self, filename: &str) -> Result<SelectQuizResponse, ApiError>;
    async fn current_question(&self) -> Result<QuestionPayload, ApiError>;
    async fn submit_answer(&self, request: &AnswerRequest) -> Result<AnswerResponse, ApiError>;
    async fn advance(&self) -> Result<(), ApiError>;
}
