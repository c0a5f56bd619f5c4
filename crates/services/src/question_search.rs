use std::sync::Arc;

use quiz_core::model::{Facet, FacetOptions, FacetSample, FilterState, QuestionId};
use tracing::{debug, warn};

use crate::api::{QuestionApi, QuestionQuery, QuestionSummary};
use crate::error::ApiError;
use crate::facet_service::FacetNarrower;

/// Result of loading a page into the search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchUpdate {
    /// Items added by this load.
    pub loaded: usize,
    pub total_count: u32,
    /// Selections dropped because they left their facet's option list.
    pub cleared: Vec<Facet>,
}

/// State of the question browsing screen: filters, loaded results and the
/// option lists offered to each facet picker.
pub struct QuestionSearch {
    questions: Arc<dyn QuestionApi>,
    narrower: FacetNarrower,
    filters: FilterState,
    options: FacetOptions,
    items: Vec<QuestionSummary>,
    page: u32,
    total_count: u32,
}

impl QuestionSearch {
    #[must_use]
    pub fn new(questions: Arc<dyn QuestionApi>) -> Self {
        let narrower = FacetNarrower::new(Arc::clone(&questions));
        Self {
            questions,
            narrower,
            filters: FilterState::default(),
            options: FacetOptions::default(),
            items: Vec::new(),
            page: 1,
            total_count: 0,
        }
    }

    #[must_use]
    pub fn filters(&self) -> &FilterState {
        &self.filters
    }

    #[must_use]
    pub fn items(&self) -> &[QuestionSummary] {
        &self.items
    }

    #[must_use]
    pub fn page(&self) -> u32 {
        self.page
    }

    #[must_use]
    pub fn total_count(&self) -> u32 {
        self.total_count
    }

    /// Select or clear a facet. Takes effect on the next `apply`.
    pub fn select(&mut self, facet: Facet, value: Option<String>) {
        self.filters.set(facet, value);
    }

    pub fn set_query(&mut self, query: &str) {
        self.filters.set_query(query);
    }

    /// Options for a picker: narrowed values, or the last-known-good list
    /// when narrowing found nothing.
    pub async fn options_for(&self, facet: Facet) -> Vec<String> {
        let computed = self.narrower.compute_options(facet, &self.filters).await;
        self.options.or_fallback(facet, computed)
    }

    /// Refresh the results with the current filters, then compute the
    /// options for `facet`. A failed refresh keeps the previous results and
    /// option lists.
    pub async fn open_picker(&mut self, facet: Facet) -> Vec<String> {
        if let Err(err) = self.apply().await {
            warn!(facet = facet.as_str(), error = %err, "picker opened without fresh results");
        }
        self.options_for(facet).await
    }

    /// Reload from the first page with the current filters.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` when the page cannot be fetched; loaded items are
    /// left as they were.
    pub async fn apply(&mut self) -> Result<SearchUpdate, ApiError> {
        let result = self
            .questions
            .query_questions(&QuestionQuery::from_filters(&self.filters, 1))
            .await?
            .checked()?;
        self.page = 1;
        self.total_count = result.total_count;
        self.items = result.items;
        let cleared = self.maintain();
        debug!(items = self.items.len(), cleared = cleared.len(), "search applied");
        Ok(SearchUpdate {
            loaded: self.items.len(),
            total_count: self.total_count,
            cleared,
        })
    }

    /// Append the next page. The page counter only advances when the page
    /// had items.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` when the page cannot be fetched.
    pub async fn load_next_page(&mut self) -> Result<SearchUpdate, ApiError> {
        let next = self.page + 1;
        let result = self
            .questions
            .query_questions(&QuestionQuery::from_filters(&self.filters, next))
            .await?
            .checked()?;
        let loaded = result.items.len();
        if loaded > 0 {
            self.page = next;
            self.items.extend(result.items);
        }
        self.total_count = result.total_count.max(self.total_count);
        let cleared = self.maintain();
        Ok(SearchUpdate {
            loaded,
            total_count: self.total_count,
            cleared,
        })
    }

    /// The question after `current` in the loaded list, loading another page
    /// when `current` is the last one.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` when the next page cannot be fetched.
    pub async fn next_question_id(
        &mut self,
        current: QuestionId,
    ) -> Result<Option<QuestionId>, ApiError> {
        let Some(pos) = self.position(current) else {
            return Ok(None);
        };
        if pos + 1 >= self.items.len() {
            self.load_next_page().await?;
        }
        Ok(self.items.get(pos + 1).map(|q| q.id))
    }

    #[must_use]
    pub fn prev_question_id(&self, current: QuestionId) -> Option<QuestionId> {
        let pos = self.position(current)?;
        pos.checked_sub(1)
            .and_then(|prev| self.items.get(prev))
            .map(|q| q.id)
    }

    fn position(&self, id: QuestionId) -> Option<usize> {
        self.items.iter().position(|q| q.id == id)
    }

    fn maintain(&mut self) -> Vec<Facet> {
        let samples: Vec<FacetSample> = self.items.iter().map(|q| q.facets.clone()).collect();
        self.options.rebuild(&mut self.filters, &samples)
    }
}
