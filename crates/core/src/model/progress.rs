use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::QuestionId;

/// Lifecycle of an assignment from the student's point of view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProgressState {
    NotStarted,
    InProgress,
    Completed,
}

/// Locally tracked answers for one assignment.
///
/// Maps each answered question to the zero-based index of the chosen
/// choice. Choice indices are stored as given; range checks belong to the
/// caller that knows the question's choices.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AssignmentProgress {
    answers: BTreeMap<QuestionId, i32>,
    completed: bool,
}

impl AssignmentProgress {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn from_parts(answers: BTreeMap<QuestionId, i32>, completed: bool) -> Self {
        Self { answers, completed }
    }

    #[must_use]
    pub fn answers(&self) -> &BTreeMap<QuestionId, i32> {
        &self.answers
    }

    #[must_use]
    pub fn answer(&self, question: QuestionId) -> Option<i32> {
        self.answers.get(&question).copied()
    }

    #[must_use]
    pub fn answered(&self) -> usize {
        self.answers.len()
    }

    #[must_use]
    pub fn is_completed(&self) -> bool {
        self.completed
    }

    /// Upserts the choice for `question`.
    pub fn record(&mut self, question: QuestionId, choice: i32) {
        self.answers.insert(question, choice);
    }

    pub fn set_completed(&mut self, done: bool) {
        self.completed = done;
    }

    /// True when every one of `total` questions has an answer.
    #[must_use]
    pub fn is_ready_to_submit(&self, total: usize) -> bool {
        self.answers.len() == total
    }

    #[must_use]
    pub fn state(&self) -> ProgressState {
        if self.completed {
            ProgressState::Completed
        } else if self.answers.is_empty() {
            ProgressState::NotStarted
        } else {
            ProgressState::InProgress
        }
    }

    /// Converts into the persisted shape.
    #[must_use]
    pub fn to_record(&self) -> ProgressRecord {
        ProgressRecord {
            answers: self
                .answers
                .iter()
                .map(|(id, choice)| (id.to_string(), *choice))
                .collect(),
            completed: self.completed,
        }
    }
}

//
// ─── PERSISTED SHAPE ───────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ProgressRecordError {
    #[error("invalid question id key: {0:?}")]
    InvalidQuestionKey(String),
}

/// Stored form of `AssignmentProgress`: question ids are stringified keys.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressRecord {
    #[serde(default)]
    pub answers: BTreeMap<String, i32>,
    #[serde(default)]
    pub completed: bool,
}

impl ProgressRecord {
    /// Rehydrate the domain progress.
    ///
    /// # Errors
    ///
    /// Returns `ProgressRecordError::InvalidQuestionKey` if a key is not a
    /// question id.
    pub fn into_progress(self) -> Result<AssignmentProgress, ProgressRecordError> {
        let mut answers = BTreeMap::new();
        for (key, choice) in self.answers {
            let id = key
                .parse::<QuestionId>()
                .map_err(|_| ProgressRecordError::InvalidQuestionKey(key.clone()))?;
            answers.insert(id, choice);
        }
        Ok(AssignmentProgress::from_parts(answers, self.completed))
    }
}
