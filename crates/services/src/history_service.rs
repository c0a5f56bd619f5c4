use std::sync::Arc;

use futures::stream::{self, Stream, StreamExt};
use tracing::warn;

use crate::api::{AnswerRecord, QuestionApi, RecommendApi};
use crate::error::ApiError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HistoryFilter {
    #[default]
    All,
    Correct,
    Wrong,
}

impl HistoryFilter {
    #[must_use]
    pub fn matches(self, record: &AnswerRecord) -> bool {
        match self {
            Self::All => true,
            Self::Correct => record.correct,
            Self::Wrong => !record.correct,
        }
    }

    #[must_use]
    pub fn apply(self, records: &[AnswerRecord]) -> Vec<AnswerRecord> {
        records.iter().filter(|r| self.matches(r)).cloned().collect()
    }
}

/// The student's past answers.
#[derive(Clone)]
pub struct HistoryService {
    recommend: Arc<dyn RecommendApi>,
    questions: Arc<dyn QuestionApi>,
}

impl HistoryService {
    #[must_use]
    pub fn new(recommend: Arc<dyn RecommendApi>, questions: Arc<dyn QuestionApi>) -> Self {
        Self {
            recommend,
            questions,
        }
    }

    /// Records without titles, in backend order.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` when the history cannot be fetched.
    pub async fn answer_history(&self) -> Result<Vec<AnswerRecord>, ApiError> {
        self.recommend.trigger_recommend().await
    }

    /// Fills in title and image one record at a time. Records whose question
    /// cannot be fetched come through unchanged.
    pub fn enrich(
        &self,
        records: Vec<AnswerRecord>,
    ) -> impl Stream<Item = AnswerRecord> + Send + 'static {
        let questions = Arc::clone(&self.questions);
        stream::iter(records).then(move |mut record| {
            let questions = Arc::clone(&questions);
            async move {
                match questions.get_question(record.question_id).await {
                    Ok(detail) => {
                        record.title = Some(detail.question).filter(|t| !t.trim().is_empty());
                        record.image = detail.image;
                    }
                    Err(err) => {
                        warn!(question = %record.question_id, error = %err, "history title unavailable");
                    }
                }
                record
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quiz_core::model::QuestionId;

    #[test]
    fn filters_split_by_correctness() {
        let records = vec![
            AnswerRecord::new(QuestionId::new(1), true),
            AnswerRecord::new(QuestionId::new(2), false),
            AnswerRecord::new(QuestionId::new(3), true),
        ];
        assert_eq!(HistoryFilter::All.apply(&records).len(), 3);
        let correct: Vec<u64> = HistoryFilter::Correct
            .apply(&records)
            .iter()
            .map(|r| r.question_id.value())
            .collect();
        assert_eq!(correct, vec![1, 3]);
        assert_eq!(HistoryFilter::Wrong.apply(&records).len(), 1);
    }
}
