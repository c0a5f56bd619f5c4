use std::collections::BTreeSet;
use std::sync::Arc;

use quiz_core::model::{Facet, FilterState, collect_values, local_options};
use tracing::{debug, warn};

use crate::api::{QuestionApi, QuestionQuery};

/// Computes which values of a facet remain selectable under the current
/// filters by sampling a bounded number of search pages.
#[derive(Clone)]
pub struct FacetNarrower {
    questions: Arc<dyn QuestionApi>,
    max_pages: u32,
}

impl FacetNarrower {
    pub const DEFAULT_MAX_PAGES: u32 = 3;

    #[must_use]
    pub fn new(questions: Arc<dyn QuestionApi>) -> Self {
        Self {
            questions,
            max_pages: Self::DEFAULT_MAX_PAGES,
        }
    }

    #[must_use]
    pub fn with_max_pages(mut self, max_pages: u32) -> Self {
        self.max_pages = max_pages.max(1);
        self
    }

    /// Distinct values of `target` compatible with `state`, sorted.
    ///
    /// Before any interaction the static defaults are returned in declared
    /// order; a selected `target` yields just that value. Otherwise up to
    /// `max_pages` pages are sampled with `target` unconstrained, stopping at
    /// the first empty or failed page. An empty result means the caller should
    /// keep its last-known-good list.
    pub async fn compute_options(&self, target: Facet, state: &FilterState) -> Vec<String> {
        if let Some(local) = local_options(target, state) {
            return local;
        }

        let scoped = state.without(target);
        let mut seen = BTreeSet::new();
        for page in 1..=self.max_pages {
            let query = QuestionQuery::from_filters(&scoped, page);
            match self.questions.query_questions(&query).await {
                Ok(result) if result.items.is_empty() => break,
                Ok(result) => {
                    collect_values(target, result.items.iter().map(|q| &q.facets), &mut seen);
                }
                Err(err) => {
                    warn!(facet = target.as_str(), page, error = %err, "facet sampling stopped");
                    break;
                }
            }
        }
        debug!(facet = target.as_str(), found = seen.len(), "facet options sampled");
        seen.into_iter().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{Ack, QuestionDetail, QuestionPage};
    use crate::error::ApiError;
    use async_trait::async_trait;
    use quiz_core::model::{NewQuestion, QuestionId, SUBJECT_DEFAULTS};
    use std::sync::Mutex;

    /// Fails the test if the network is touched.
    struct Unreachable;

    #[async_trait]
    impl QuestionApi for Unreachable {
        async fn query_questions(&self, _: &QuestionQuery) -> Result<QuestionPage, ApiError> {
            panic!("no request expected");
        }
        async fn get_question(&self, _: QuestionId) -> Result<QuestionDetail, ApiError> {
            panic!("no request expected");
        }
        async fn answer_question(&self, _: QuestionId, _: bool, _: i32) -> Result<Ack, ApiError> {
            panic!("no request expected");
        }
        async fn upload_question(&self, _: &NewQuestion) -> Result<Ack, ApiError> {
            panic!("no request expected");
        }
    }

    struct FailingPages {
        calls: Mutex<u32>,
    }

    #[async_trait]
    impl QuestionApi for FailingPages {
        async fn query_questions(&self, _: &QuestionQuery) -> Result<QuestionPage, ApiError> {
            *self.calls.lock().unwrap() += 1;
            Err(ApiError::HttpStatus(reqwest::StatusCode::BAD_GATEWAY))
        }
        async fn get_question(&self, _: QuestionId) -> Result<QuestionDetail, ApiError> {
            unreachable!()
        }
        async fn answer_question(&self, _: QuestionId, _: bool, _: i32) -> Result<Ack, ApiError> {
            unreachable!()
        }
        async fn upload_question(&self, _: &NewQuestion) -> Result<Ack, ApiError> {
            unreachable!()
        }
    }

    #[tokio::test]
    async fn pristine_state_returns_defaults_without_requests() {
        let narrower = FacetNarrower::new(Arc::new(Unreachable));
        let options = narrower
            .compute_options(Facet::Subject, &FilterState::default())
            .await;
        assert_eq!(options, SUBJECT_DEFAULTS.to_vec());
    }

    #[tokio::test]
    async fn selected_target_is_its_own_option() {
        let narrower = FacetNarrower::new(Arc::new(Unreachable));
        let mut state = FilterState::default();
        state.set(Facet::Subject, Some("language science".into()));
        let options = narrower.compute_options(Facet::Subject, &state).await;
        assert_eq!(options, vec!["language science".to_owned()]);
    }

    #[tokio::test]
    async fn failure_on_first_page_yields_empty() {
        let api = Arc::new(FailingPages {
            calls: Mutex::new(0),
        });
        let narrower = FacetNarrower::new(api.clone());
        let mut state = FilterState::default();
        state.set(Facet::Grade, Some("grade3".into()));
        let options = narrower.compute_options(Facet::Topic, &state).await;
        assert!(options.is_empty());
        assert_eq!(*api.calls.lock().unwrap(), 1);
    }
}
