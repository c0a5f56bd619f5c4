use std::sync::Arc;

use quiz_core::model::QuestionId;
use quiz_core::scoring::resolve_answer_index;
use tracing::warn;

use crate::api::{QuestionApi, QuestionDetail};
use crate::error::ApiError;

/// Feedback shown after answering a practice question.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnswerFeedback {
    pub correct: bool,
    /// Text of the correct choice, if the index points at one.
    pub correct_choice: Option<String>,
    /// The backend recorded the attempt.
    pub recorded: bool,
}

/// Free practice on single questions.
#[derive(Clone)]
pub struct PracticeService {
    questions: Arc<dyn QuestionApi>,
}

impl PracticeService {
    #[must_use]
    pub fn new(questions: Arc<dyn QuestionApi>) -> Self {
        Self { questions }
    }

    /// # Errors
    ///
    /// Returns `ApiError` when the question cannot be loaded.
    pub async fn load(&self, id: QuestionId) -> Result<QuestionDetail, ApiError> {
        self.questions.get_question(id).await
    }

    /// Check `selected` (0-based) and report the attempt. A failed report
    /// only clears `recorded`.
    pub async fn answer(&self, question: &QuestionDetail, selected: usize) -> AnswerFeedback {
        let expected = resolve_answer_index(question.answer, question.choices.len());
        let chosen = i32::try_from(selected).unwrap_or(i32::MAX);
        let correct = chosen == expected;
        let correct_choice = usize::try_from(expected)
            .ok()
            .and_then(|i| question.choices.get(i))
            .cloned();

        let recorded = match self
            .questions
            .answer_question(question.id, correct, chosen)
            .await
        {
            Ok(ack) => ack.is_success(),
            Err(err) => {
                warn!(question = %question.id, error = %err, "practice answer not recorded");
                false
            }
        };

        AnswerFeedback {
            correct,
            correct_choice,
            recorded,
        }
    }
}
