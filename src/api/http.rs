use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::{debug, warn};

use super::types::{
    AnswerRequest, AnswerResponse, ErrorBody, QuestionPayload, QuizList, SelectQuizRequest,
    SelectQuizResponse,
};
use super::{ApiError, QuizApi};

/// reqwest-backed client for the quiz server
///
/// The server tracks progress in a cookie session, so the client keeps a
/// cookie store for its whole lifetime.
pub struct HttpQuizApi {
    http: Client,
    server_url: String,
}

impl HttpQuizApi {
    pub fn new(server_url: impl Into<String>, timeout: Duration) -> Result<Self, ApiError> {
        let http = Client::builder()
            .cookie_store(true)
            .timeout(timeout)
            .build()?;
        let server_url = server_url.into().trim_end_matches('/').to_string();
        debug!("Quiz API client for {}", server_url);
        Ok(Self { http, server_url })
    }

    pub fn server_url(&self) -> &str {
        &self.server_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.server_url, path)
    }
}

async fn check_status(res: Response) -> Result<Response, ApiError> {
    let status = res.status();
    if status.is_success() {
        return Ok(res);
    }

    let body = res.text().await.unwrap_or_default();
    let err = match serde_json::from_str::<ErrorBody>(&body) {
        Ok(ErrorBody { error }) => ApiError::Rejected {
            status: status.as_u16(),
            message: error,
        },
        Err(_) => ApiError::Status {
            status: status.as_u16(),
        },
    };
    warn!("Quiz server rejected request: {}", err);
    Err(err)
}

async fn decode<T: DeserializeOwned>(res: Response) -> Result<T, ApiError> {
    let res = check_status(res).await?;
    res.json::<T>()
        .await
        .map_err(|e| ApiError::Decode(e.to_string()))
}

#[async_trait]
impl QuizApi for HttpQuizApi {
    async fn list_quizzes(&self) -> Result<QuizList, ApiError> {
        let res = self.http.get(self.url("/api/quizzes")).send().await?;
        decode(res).await
    }

    async fn select_quiz(&self, filename: &str) -> Result<SelectQuizResponse, ApiError> {
        let res = self
            .http
            .post(self.url("/api/select_quiz"))
            .json(&SelectQuizRequest { filename })
            .send()
            .await?;
        decode(res).await
    }

    async fn current_question(&self) -> Result<QuestionPayload, ApiError> {
        let res = self.http.get(self.url("/api/question")).send().await?;
        decode(res).await
    }

    async fn submit_answer(&self, request: &AnswerRequest) -> Result<AnswerResponse, ApiError> {
        let res = self
            .http
            .post(self.url("/api/answer"))
            .json(request)
            .send()
            .await?;
        decode(res).await
    }

    async fn advance(&self) -> Result<(), ApiError> {
        let res = self.http.post(self.url("/api/next")).send().await?;
        check_status(res).await?;
        Ok(())
    }
}

#[cfg(test)]
#[path = "tests/http_tests.rs"]
mod tests;
