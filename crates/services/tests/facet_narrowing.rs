mod common;

use std::sync::Arc;

use common::{FakeBackend, page, summary};
use quiz_core::model::{Facet, FilterState, QuestionId};
use services::{FacetNarrower, QuestionSearch};

fn grade3() -> FilterState {
    let mut state = FilterState::default();
    state.set(Facet::Grade, Some("grade3".into()));
    state
}

#[tokio::test]
async fn samples_pages_until_empty_and_sorts() {
    let backend = Arc::new(
        FakeBackend::new()
            .with_page(1, page(vec![summary(1, "grade3", "natural science", "Plants", "biology")]))
            .with_page(2, page(vec![summary(2, "grade3", "social science", "Maps", "geography")]))
            .with_page(3, page(Vec::new())),
    );
    let narrower = FacetNarrower::new(backend.clone());

    let options = narrower.compute_options(Facet::Subject, &grade3()).await;
    assert_eq!(options, vec!["natural science", "social science"]);
    assert_eq!(backend.query_count(), 3);
}

#[tokio::test]
async fn stops_at_first_empty_page() {
    let backend = Arc::new(
        FakeBackend::new()
            .with_page(1, page(vec![summary(1, "grade3", "natural science", "Plants", "biology")]))
            .with_page(2, page(Vec::new()))
            .with_page(3, page(vec![summary(3, "grade3", "language science", "Verbs", "grammar")])),
    );
    let narrower = FacetNarrower::new(backend.clone());

    let options = narrower.compute_options(Facet::Subject, &grade3()).await;
    assert_eq!(options, vec!["natural science"]);
    assert_eq!(backend.query_count(), 2);
}

#[tokio::test]
async fn failed_page_keeps_values_already_seen() {
    let backend = Arc::new(
        FakeBackend::new()
            .with_page(1, page(vec![summary(1, "grade3", "natural science", "Plants", "biology")])),
    );
    let narrower = FacetNarrower::new(backend.clone());

    let options = narrower.compute_options(Facet::Topic, &grade3()).await;
    assert_eq!(options, vec!["biology"]);
    assert_eq!(backend.query_count(), 2);
}

#[tokio::test]
async fn target_facet_is_left_unconstrained_in_queries() {
    let backend = Arc::new(FakeBackend::new().with_page(1, page(Vec::new())));
    let narrower = FacetNarrower::new(backend.clone());
    let mut state = grade3();
    state.set(Facet::Topic, Some("biology".into()));
    state.set_query("cell");

    let _ = narrower.compute_options(Facet::Category, &state).await;
    let queries = backend.queries.lock().unwrap().clone();
    assert_eq!(queries.len(), 1);
    assert_eq!(queries[0].grade, "grade3");
    assert_eq!(queries[0].topic, "biology");
    assert_eq!(queries[0].category, "");
    assert_eq!(queries[0].question_name, "cell");
    assert_eq!(queries[0].page, 1);
}

#[tokio::test]
async fn reported_error_message_does_not_discard_samples() {
    let mut flagged = page(vec![summary(1, "grade3", "natural science", "Plants", "biology")]);
    flagged.error_message = Some("index is rebuilding".into());
    let backend = Arc::new(
        FakeBackend::new()
            .with_page(1, flagged)
            .with_page(2, page(Vec::new())),
    );
    let narrower = FacetNarrower::new(backend.clone());

    let options = narrower.compute_options(Facet::Subject, &grade3()).await;
    assert_eq!(options, vec!["natural science"]);
    assert_eq!(backend.query_count(), 2);

    // The search screen still refuses the page.
    let mut search = QuestionSearch::new(backend.clone());
    assert!(search.apply().await.is_err());
    assert!(search.items().is_empty());
}

#[tokio::test]
async fn max_pages_bounds_sampling() {
    let backend = Arc::new(
        FakeBackend::new()
            .with_page(1, page(vec![summary(1, "grade3", "natural science", "Plants", "biology")]))
            .with_page(2, page(vec![summary(2, "grade3", "social science", "Maps", "geography")])),
    );
    let narrower = FacetNarrower::new(backend.clone()).with_max_pages(1);

    let options = narrower.compute_options(Facet::Subject, &grade3()).await;
    assert_eq!(options, vec!["natural science"]);
    assert_eq!(backend.query_count(), 1);
}

#[tokio::test]
async fn search_clears_selection_missing_from_results() {
    let backend = Arc::new(FakeBackend::new().with_page(
        1,
        page(vec![
            summary(1, "grade3", "natural science", "Plants", "biology"),
            summary(2, "grade3", "natural science", "Weather", "earth-science"),
        ]),
    ));
    let mut search = QuestionSearch::new(backend.clone());
    search.select(Facet::Grade, Some("grade3".into()));
    search.select(Facet::Subject, Some("social science".into()));

    let update = search.apply().await.unwrap();
    assert_eq!(update.loaded, 2);
    assert_eq!(update.cleared, vec![Facet::Subject]);
    assert_eq!(search.filters().get(Facet::Grade), Some("grade3"));
    assert!(search.filters().get(Facet::Subject).is_none());
}

#[tokio::test]
async fn search_pages_and_navigates() {
    let backend = Arc::new(
        FakeBackend::new()
            .with_page(1, page(vec![summary(1, "grade3", "natural science", "Plants", "biology")]))
            .with_page(2, page(vec![summary(2, "grade3", "natural science", "Plants", "biology")]))
            .with_page(3, page(Vec::new())),
    );
    let mut search = QuestionSearch::new(backend.clone());
    search.apply().await.unwrap();
    assert_eq!(search.items().len(), 1);

    let next = search.next_question_id(QuestionId::new(1)).await.unwrap();
    assert_eq!(next, Some(QuestionId::new(2)));
    assert_eq!(search.page(), 2);

    let none = search.next_question_id(QuestionId::new(2)).await.unwrap();
    assert_eq!(none, None);
    assert_eq!(search.page(), 2);

    assert_eq!(search.prev_question_id(QuestionId::new(2)), Some(QuestionId::new(1)));
    assert_eq!(search.prev_question_id(QuestionId::new(1)), None);
}

#[tokio::test]
async fn picker_falls_back_to_last_known_options() {
    let backend = Arc::new(FakeBackend::new());
    let mut search = QuestionSearch::new(backend.clone());
    search.select(Facet::Grade, Some("grade12".into()));

    let subjects = search.options_for(Facet::Subject).await;
    assert_eq!(
        subjects,
        vec!["language science", "natural science", "social science"]
    );
}

#[tokio::test]
async fn picker_loads_results_before_narrowing() {
    let backend = Arc::new(
        FakeBackend::new()
            .with_page(1, page(vec![summary(1, "grade3", "natural science", "Plants", "biology")]))
            .with_page(2, page(Vec::new())),
    );
    let mut search = QuestionSearch::new(backend.clone());
    search.select(Facet::Grade, Some("grade3".into()));

    let topics = search.open_picker(Facet::Topic).await;
    assert_eq!(topics, vec!["biology"]);
    assert_eq!(search.items().len(), 1);
    // One page for the results, two for sampling.
    assert_eq!(backend.query_count(), 3);
}

#[tokio::test]
async fn failed_narrowing_falls_back_to_loaded_options() {
    let backend = Arc::new(FakeBackend::new().with_page(
        1,
        page(vec![summary(1, "grade3", "natural science", "Plants", "biology")]),
    ));
    let mut search = QuestionSearch::new(backend.clone());
    search.select(Facet::Grade, Some("grade3".into()));
    search.apply().await.unwrap();

    backend.pages.lock().unwrap().clear();
    let topics = search.options_for(Facet::Topic).await;
    assert_eq!(topics, vec!["biology"]);
}
