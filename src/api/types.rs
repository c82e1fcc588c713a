//! Wire types of the quiz server's JSON contract

use serde::{Deserialize, Serialize};
use std::fmt;

/// Question identifier as sent by the server, echoed back unchanged
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum QuestionId {
    Number(i64),
    Text(String),
}

impl fmt::Display for QuestionId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            QuestionId::Number(n) => write!(f, "{}", n),
            QuestionId::Text(s) => write!(f, "{}", s),
        }
    }
}

impl From<i64> for QuestionId {
    fn from(id: i64) -> Self {
        QuestionId::Number(id)
    }
}

impl From<&str> for QuestionId {
    fn from(id: &str) -> Self {
        QuestionId::Text(id.to_string())
    }
}

/// `GET /api/quizzes`
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct QuizList {
    #[serde(default)]
    pub files: Vec<String>,
    #[serde(default)]
    pub selected: Option<String>,
}

/// `POST /api/select_quiz` body
#[derive(Debug, Serialize)]
pub struct SelectQuizRequest<'a> {
    pub filename: &'a str,
}

/// `POST /api/select_quiz` success body
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SelectQuizResponse {
    #[serde(default)]
    pub ok: bool,
    #[serde(default)]
    pub selected: Option<String>,
    #[serde(default)]
    pub total: Option<u32>,
}

/// `GET /api/question`: either the current question or the final tally
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum QuestionPayload {
    Question(QuestionBody),
    Finished(FinishedBody),
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct QuestionBody {
    pub id: QuestionId,
    pub question: String,
    pub choices: Vec<String>,
    pub index: u32,
    pub total: u32,
    pub score: i64,
    #[serde(default)]
    pub selected_quiz: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct FinishedBody {
    pub finished: bool,
    pub total: u32,
    pub score: i64,
    #[serde(default)]
    pub selected_quiz: Option<String>,
}

/// `POST /api/answer` body
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnswerRequest {
    pub id: QuestionId,
    pub choice_index: u8,
    pub player_id: String,
}

/// Correct answer as reported by the server
///
/// Quiz-engine servers send the 1-based choice index; others send the
/// choice text itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CorrectChoice {
    Index(u8),
    Label(String),
}

impl CorrectChoice {
    /// Text of the correct choice, looked up in `choices` for an index.
    pub fn label(&self, choices: &[String]) -> String {
        match self {
            CorrectChoice::Index(index) => usize::from(*index)
                .checked_sub(1)
                .and_then(|i| choices.get(i))
                .cloned()
                .unwrap_or_else(|| index.to_string()),
            CorrectChoice::Label(label) => label.clone(),
        }
    }
}

impl fmt::Display for CorrectChoice {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            CorrectChoice::Index(index) => write!(f, "{}", index),
            CorrectChoice::Label(label) => write!(f, "{}", label),
        }
    }
}

/// `POST /api/answer` success body
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AnswerResponse {
    pub correct: bool,
    pub correct_choice: CorrectChoice,
    #[serde(default)]
    pub explanation: Option<String>,
    pub score: i64,
    #[serde(default)]
    pub player_score: Option<i64>,
}

/// Failure body used by every endpoint
#[derive(Debug, Clone, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn finished_payload_is_not_mistaken_for_a_question() {
        let payload: QuestionPayload = serde_json::from_value(json!({
            "finished": true,
            "total": 10,
            "score": 7,
            "players": {"p0": {"score": 7}},
            "selected_quiz": "capitals.xlsx"
        }))
        .expect("finished payload");

        match payload {
            QuestionPayload::Finished(body) => {
                assert!(body.finished);
                assert_eq!((body.total, body.score), (10, 7));
                assert_eq!(body.selected_quiz.as_deref(), Some("capitals.xlsx"));
            }
            other => panic!("unexpected payload: {other:?}"),
        }
    }

    #[test]
    fn question_ids_keep_their_json_type() {
        let numeric: QuestionBody = serde_json::from_value(json!({
            "id": 7, "question": "Q", "choices": ["A", "B", "C", "D"],
            "index": 3, "total": 10, "score": 2
        }))
        .expect("numeric id");
        assert_eq!(numeric.id, QuestionId::Number(7));

        let text: QuestionBody = serde_json::from_value(json!({
            "id": "q-7", "question": "Q", "choices": ["A", "B", "C", "D"],
            "index": 3, "total": 10, "score": 2
        }))
        .expect("text id");
        assert_eq!(text.id, QuestionId::Text("q-7".into()));

        let request = AnswerRequest {
            id: text.id,
            choice_index: 2,
            player_id: "p0".into(),
        };
        assert_eq!(
            serde_json::to_value(&request).expect("serialize"),
            json!({"id": "q-7", "choice_index": 2, "player_id": "p0"})
        );
    }

    #[test]
    fn null_explanation_is_none() {
        let response: AnswerResponse = serde_json::from_value(json!({
            "correct": false, "correct_choice": "B", "explanation": null, "score": 3
        }))
        .expect("answer response");
        assert_eq!(response.explanation, None);
        assert_eq!(response.player_score, None);
    }

    #[test]
    fn numeric_correct_choice_resolves_to_its_text() {
        let response: AnswerResponse = serde_json::from_value(json!({
            "correct": true, "correct_choice": 2, "explanation": "x",
            "score": 1, "player_score": 1
        }))
        .expect("answer response");
        assert_eq!(response.correct_choice, CorrectChoice::Index(2));

        let choices: Vec<String> = vec!["A".into(), "B".into(), "C".into(), "D".into()];
        assert_eq!(response.correct_choice.label(&choices), "B");
        assert_eq!(CorrectChoice::Index(0).label(&choices), "0");
        assert_eq!(CorrectChoice::Index(9).label(&choices), "9");
        assert_eq!(CorrectChoice::Label("Paris".into()).label(&choices), "Paris");
    }
}
