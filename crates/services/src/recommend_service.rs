use std::collections::HashSet;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use futures::future;
use futures::stream::{self, Stream, StreamExt};
use quiz_core::model::QuestionId;
use tracing::{debug, warn};

use crate::api::{QuestionApi, RecommendApi};
use crate::error::{ApiError, RecommendError};

/// A recommended question ready for listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecommendedPractice {
    pub id: QuestionId,
    pub title: String,
    pub image: Option<String>,
}

impl RecommendedPractice {
    fn placeholder(id: QuestionId) -> Self {
        Self {
            id,
            title: format!("Question #{id}"),
            image: None,
        }
    }
}

/// Starts recommendation runs and hands out ids not shown before.
pub struct RecommendService {
    recommend: Arc<dyn RecommendApi>,
    questions: Arc<dyn QuestionApi>,
    seen: Mutex<HashSet<QuestionId>>,
    attempts: u32,
    retry_delay: Duration,
}

impl RecommendService {
    pub const DEFAULT_ATTEMPTS: u32 = 4;
    pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_millis(800);

    #[must_use]
    pub fn new(recommend: Arc<dyn RecommendApi>, questions: Arc<dyn QuestionApi>) -> Self {
        Self {
            recommend,
            questions,
            seen: Mutex::new(HashSet::new()),
            attempts: Self::DEFAULT_ATTEMPTS,
            retry_delay: Self::DEFAULT_RETRY_DELAY,
        }
    }

    #[must_use]
    pub fn with_retry(mut self, attempts: u32, retry_delay: Duration) -> Self {
        self.attempts = attempts.max(1);
        self.retry_delay = retry_delay;
        self
    }

    /// Forget which ids were already handed out.
    pub fn reset_seen(&self) {
        self.seen
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }

    /// Trigger a run, then poll until it yields ids not handed out before.
    ///
    /// # Errors
    ///
    /// Returns `RecommendError::Trigger` when the run is refused and
    /// `RecommendError::NoneAvailable` when polling found nothing new.
    pub async fn recommended_ids(&self) -> Result<Vec<QuestionId>, RecommendError> {
        self.recommend
            .trigger_recommend()
            .await
            .map_err(RecommendError::Trigger)?;

        for attempt in 1..=self.attempts {
            let ids = match self.recommend.recommended_ids().await {
                Ok(ids) => ids,
                Err(err) => {
                    warn!(attempt, error = %err, "recommendation poll failed");
                    Vec::new()
                }
            };
            let fresh = self.take_unseen(ids);
            if !fresh.is_empty() {
                debug!(attempt, count = fresh.len(), "recommendations ready");
                return Ok(fresh);
            }
            if attempt < self.attempts {
                tokio::time::sleep(self.retry_delay).await;
            }
        }
        Err(RecommendError::NoneAvailable)
    }

    /// Looks up each id in turn. Ids the backend no longer knows are skipped;
    /// ids whose lookup fails in transit get a placeholder title.
    pub fn practice_stream(
        &self,
        ids: Vec<QuestionId>,
    ) -> impl Stream<Item = RecommendedPractice> + Send + 'static {
        let questions = Arc::clone(&self.questions);
        stream::iter(ids)
            .then(move |id| {
                let questions = Arc::clone(&questions);
                async move { describe(questions.as_ref(), id).await }
            })
            .filter_map(future::ready)
    }

    fn take_unseen(&self, ids: Vec<QuestionId>) -> Vec<QuestionId> {
        let mut seen = self.seen.lock().unwrap_or_else(PoisonError::into_inner);
        ids.into_iter().filter(|id| seen.insert(*id)).collect()
    }
}

async fn describe(questions: &dyn QuestionApi, id: QuestionId) -> Option<RecommendedPractice> {
    match questions.get_question(id).await {
        Ok(detail) => {
            let title = if detail.question.trim().is_empty() {
                format!("Question #{id}")
            } else {
                detail.question
            };
            Some(RecommendedPractice {
                id,
                title,
                image: detail.image,
            })
        }
        Err(ApiError::EmptyData | ApiError::Business { .. }) => None,
        Err(err) => {
            warn!(question = %id, error = %err, "recommended question lookup failed");
            Some(RecommendedPractice::placeholder(id))
        }
    }
}
