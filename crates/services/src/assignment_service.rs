use std::sync::Arc;

use futures::future::join_all;
use quiz_core::model::{AssignmentId, AssignmentProgress, QuestionId};
use quiz_core::scoring::{SubmissionResult, resolve_answer_index};
use storage::repository::{ProgressRepository, StorageError};
use tracing::{debug, info, warn};

use crate::api::{AssignmentApi, AssignmentQuestion, QuestionApi};
use crate::error::AssignmentError;

/// Value sent as `whether` when finishing an assignment.
const FINISHED: i32 = 1;

/// How many of an assignment's questions have an answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Completion {
    pub answered: usize,
    pub total: usize,
}

impl Completion {
    /// Fraction answered in `0.0..=1.0`; zero for an empty assignment.
    #[must_use]
    pub fn ratio(&self) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        let answered = u32::try_from(self.answered.min(self.total)).unwrap_or(u32::MAX);
        let total = u32::try_from(self.total).unwrap_or(u32::MAX);
        f64::from(answered) / f64::from(total)
    }
}

/// What happened to a submission attempt.
#[derive(Debug, Clone, PartialEq)]
pub enum SubmissionOutcome {
    /// Not every question has an answer; nothing was sent.
    Incomplete { answered: usize, total: usize },
    /// The backend accepted the result and the assignment is completed.
    Submitted(SubmissionResult),
    /// The backend answered with a non-success code.
    Rejected {
        result: SubmissionResult,
        message: String,
    },
    /// The result could not be delivered.
    Failed {
        result: SubmissionResult,
        reason: String,
    },
}

impl SubmissionOutcome {
    #[must_use]
    pub fn is_submitted(&self) -> bool {
        matches!(self, Self::Submitted(_))
    }
}

/// Tracks per-assignment answers locally and scores submissions.
#[derive(Clone)]
pub struct AssignmentService {
    assignments: Arc<dyn AssignmentApi>,
    questions: Arc<dyn QuestionApi>,
    progress: Arc<dyn ProgressRepository>,
}

impl AssignmentService {
    #[must_use]
    pub fn new(
        assignments: Arc<dyn AssignmentApi>,
        questions: Arc<dyn QuestionApi>,
        progress: Arc<dyn ProgressRepository>,
    ) -> Self {
        Self {
            assignments,
            questions,
            progress,
        }
    }

    /// Questions of an assignment in backend order; empty when unavailable.
    pub async fn assignment_questions(&self, assignment: AssignmentId) -> Vec<AssignmentQuestion> {
        match self.assignments.select_assignment(assignment).await {
            Ok(list) => list,
            Err(err) => {
                warn!(%assignment, error = %err, "assignment questions unavailable");
                Vec::new()
            }
        }
    }

    /// Stored progress, or an empty record when none is stored or the stored
    /// record cannot be read.
    pub async fn get_progress(&self, assignment: AssignmentId) -> AssignmentProgress {
        match self.progress.load_progress(assignment).await {
            Ok(Some(progress)) => progress,
            Ok(None) => AssignmentProgress::new(),
            Err(err) => {
                warn!(%assignment, error = %err, "discarding unreadable progress");
                AssignmentProgress::new()
            }
        }
    }

    /// Progress to modify and save back. Only a corrupt record reads as
    /// empty; any other storage failure aborts the write so the stored
    /// answers are not replaced.
    async fn load_for_update(
        &self,
        assignment: AssignmentId,
    ) -> Result<AssignmentProgress, AssignmentError> {
        match self.progress.load_progress(assignment).await {
            Ok(progress) => Ok(progress.unwrap_or_default()),
            Err(StorageError::Serialization(reason)) => {
                warn!(%assignment, %reason, "overwriting corrupt progress");
                Ok(AssignmentProgress::new())
            }
            Err(err) => Err(err.into()),
        }
    }

    /// Record `choice` for `question` and persist before returning.
    ///
    /// # Errors
    ///
    /// Returns `AssignmentError::Storage` if the stored record cannot be read
    /// or the new one cannot be saved.
    pub async fn record_answer(
        &self,
        assignment: AssignmentId,
        question: QuestionId,
        choice: i32,
    ) -> Result<AssignmentProgress, AssignmentError> {
        let mut progress = self.load_for_update(assignment).await?;
        progress.record(question, choice);
        self.progress.save_progress(assignment, &progress).await?;
        debug!(%assignment, %question, choice, "answer recorded");
        Ok(progress)
    }

    /// # Errors
    ///
    /// Returns `AssignmentError::Storage` if the stored record cannot be read
    /// or the new one cannot be saved.
    pub async fn mark_completed(
        &self,
        assignment: AssignmentId,
        done: bool,
    ) -> Result<(), AssignmentError> {
        let mut progress = self.load_for_update(assignment).await?;
        progress.set_completed(done);
        self.progress.save_progress(assignment, &progress).await?;
        Ok(())
    }

    pub async fn completion(&self, assignment: AssignmentId, total: usize) -> Completion {
        let progress = self.get_progress(assignment).await;
        Completion {
            answered: progress.answered(),
            total,
        }
    }

    /// Score the stored answers against `questions` and report the result.
    ///
    /// Every question must be answered first. Correct answers are fetched
    /// concurrently; a question whose answer cannot be fetched counts as
    /// wrong. Only an acknowledged submission marks the assignment completed.
    pub async fn submit(
        &self,
        assignment: AssignmentId,
        questions: &[AssignmentQuestion],
    ) -> SubmissionOutcome {
        let progress = self.get_progress(assignment).await;
        let total = questions.len();
        if !progress.is_ready_to_submit(total) {
            return SubmissionOutcome::Incomplete {
                answered: progress.answered(),
                total,
            };
        }

        let checks = questions
            .iter()
            .map(|q| self.is_correct(q.id, progress.answer(q.id)));
        let correct = join_all(checks).await.into_iter().filter(|ok| *ok).count();
        let result = SubmissionResult::score(correct, total);

        match self
            .assignments
            .finish_assignment(assignment, FINISHED, result.accuracy)
            .await
        {
            Ok(ack) if ack.is_success() => {
                if let Err(err) = self.mark_completed(assignment, true).await {
                    warn!(%assignment, error = %err, "submitted but completion not saved");
                }
                info!(%assignment, correct, total, accuracy = result.accuracy, "assignment submitted");
                SubmissionOutcome::Submitted(result.acknowledged(true))
            }
            Ok(ack) => SubmissionOutcome::Rejected {
                message: ack.message_or("Submission was not accepted"),
                result,
            },
            Err(err) => {
                warn!(%assignment, error = %err, "submission failed");
                SubmissionOutcome::Failed {
                    reason: err.to_string(),
                    result,
                }
            }
        }
    }

    async fn is_correct(&self, question: QuestionId, chosen: Option<i32>) -> bool {
        let Some(chosen) = chosen else {
            return false;
        };
        match self.questions.get_question(question).await {
            Ok(detail) => resolve_answer_index(detail.answer, detail.choices.len()) == chosen,
            Err(err) => {
                warn!(%question, error = %err, "correct answer unavailable, counting as wrong");
                false
            }
        }
    }
}
