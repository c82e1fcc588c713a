use crate::api::{AnswerResponse, QuestionBody, QuestionId};

/// Where the session's state machine currently is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionPhase {
    /// A question (or an advance) is being fetched
    #[default]
    Loading,
    /// A question is shown and no answer has been accepted yet
    AwaitingAnswer,
    /// The answer was evaluated; advancing is possible
    Answered,
    /// No questions left. Only a new quiz selection leaves this phase.
    Finished,
}

/// The question currently on screen
#[derive(Debug, Clone, PartialEq)]
pub struct Question {
    pub id: QuestionId,
    pub prompt: String,
    pub choices: Vec<String>,
    /// 1-based position within the quiz
    pub index: u32,
    pub total: u32,
    pub score: i64,
}

impl From<QuestionBody> for Question {
    fn from(body: QuestionBody) -> Self {
        Self {
            id: body.id,
            prompt: body.question,
            choices: body.choices,
            index: body.index,
            total: body.total,
            score: body.score,
        }
    }
}

/// Server verdict for the current question
#[derive(Debug, Clone, PartialEq)]
pub struct AnswerOutcome {
    pub correct: bool,
    pub correct_choice: String,
    pub explanation: Option<String>,
    pub score: i64,
}

impl AnswerOutcome {
    /// Builds the verdict, naming the correct choice by its text.
    pub fn new(response: AnswerResponse, choices: &[String]) -> Self {
        Self {
            correct: response.correct,
            correct_choice: response.correct_choice.label(choices),
            explanation: response.explanation,
            score: response.score,
        }
    }
}

/// Score snapshot taken when the quiz runs out of questions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FinalScore {
    pub score: i64,
    pub total: u32,
}

/// Everything the session controller knows about the running quiz
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionState {
    pub phase: SessionPhase,
    pub current_question: Option<Question>,
    pub answered: bool,
    pub finished: bool,
    /// Set before an answer request goes out, cleared when it resolves
    pub submitting: bool,
    pub selected_quiz: Option<String>,
    pub quizzes: Vec<String>,
    pub outcome: Option<AnswerOutcome>,
    pub final_score: Option<FinalScore>,
    pub fetch_generation: u64,
}

impl SessionState {
    /// Whether an answer for `choice_index` would be accepted right now.
    pub fn accepts_answer(&self, choice_index: u8) -> bool {
        let Some(question) = &self.current_question else {
            return false;
        };
        !self.answered
            && !self.finished
            && !self.submitting
            && self.phase == SessionPhase::AwaitingAnswer
            && choice_index >= 1
            && usize::from(choice_index) <= question.choices.len()
    }

    pub fn can_advance(&self) -> bool {
        self.answered && !self.finished && self.phase == SessionPhase::Answered
    }

    fn score(&self) -> Option<i64> {
        if let Some(final_score) = &self.final_score {
            if self.finished {
                return Some(final_score.score);
            }
        }
        match (&self.outcome, &self.current_question) {
            (Some(outcome), _) if self.answered => Some(outcome.score),
            (_, Some(question)) => Some(question.score),
            _ => None,
        }
    }

    /// Derives the render state shown by the view layer.
    pub fn view(&self, error: Option<&str>) -> SessionView {
        let (prompt, choices, progress) = match (&self.final_score, &self.current_question) {
            (Some(final_score), _) if self.finished => (
                "All questions answered".to_string(),
                Vec::new(),
                format!("{} / {}", final_score.total, final_score.total),
            ),
            (_, Some(question)) => (
                question.prompt.clone(),
                question.choices.clone(),
                format!("{} / {}", question.index, question.total),
            ),
            _ => (String::new(), Vec::new(), String::new()),
        };

        let (result, explanation) = match &self.outcome {
            Some(outcome) if self.answered && !self.finished => (
                Some(ResultLine {
                    text: if outcome.correct { "Correct!" } else { "Incorrect" }.to_string(),
                    correct: outcome.correct,
                }),
                format!(
                    "Answer: {} / {}",
                    outcome.correct_choice,
                    outcome.explanation.as_deref().unwrap_or("")
                ),
            ),
            _ => (None, String::new()),
        };

        let answer_enabled = self.current_question.as_ref().is_some_and(|question| {
            (1..=question.choices.len()).any(|choice| {
                u8::try_from(choice).is_ok_and(|choice| self.accepts_answer(choice))
            })
        });

        SessionView {
            phase: self.phase,
            selected_quiz: self.selected_quiz.clone(),
            quizzes: self.quizzes.clone(),
            prompt,
            choices,
            progress,
            score: self.score().map(|s| format!("Score: {}", s)).unwrap_or_default(),
            result,
            explanation,
            answer_enabled,
            advance_enabled: self.can_advance(),
            error: error.map(str::to_string),
        }
    }
}

/// Verdict line under the question
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultLine {
    pub text: String,
    pub correct: bool,
}

/// Render state published to the view layer
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionView {
    pub phase: SessionPhase,
    pub selected_quiz: Option<String>,
    pub quizzes: Vec<String>,
    pub prompt: String,
    pub choices: Vec<String>,
    pub progress: String,
    pub score: String,
    pub result: Option<ResultLine>,
    pub explanation: String,
    pub answer_enabled: bool,
    pub advance_enabled: bool,
    pub error: Option<String>,
}
