mod common;

use std::sync::Arc;
use std::time::Duration;

use common::{FakeBackend, ack, detail};
use futures::StreamExt;
use quiz_core::model::{Facet, QuestionId, UploadDraft};
use services::api::AnswerRecord;
use services::{
    HistoryFilter, HistoryService, PracticeService, RecommendError, RecommendService,
    UploadError, UploadService,
};

fn ids(raw: &[u64]) -> Vec<QuestionId> {
    raw.iter().copied().map(QuestionId::new).collect()
}

fn recommender(backend: &Arc<FakeBackend>) -> RecommendService {
    RecommendService::new(backend.clone(), backend.clone()).with_retry(4, Duration::ZERO)
}

#[tokio::test]
async fn polls_until_unseen_ids_appear() {
    let backend = Arc::new(FakeBackend::new());
    *backend.history.lock().unwrap() = Some(Vec::new());
    backend
        .recommended
        .lock()
        .unwrap()
        .extend([Vec::new(), ids(&[3, 3, 5])]);
    let svc = recommender(&backend);

    assert_eq!(svc.recommended_ids().await.unwrap(), ids(&[3, 5]));
    assert_eq!(*backend.polls.lock().unwrap(), 2);

    // Ids handed out once are not offered again.
    backend
        .recommended
        .lock()
        .unwrap()
        .extend([ids(&[3, 5]), ids(&[5, 8])]);
    assert_eq!(svc.recommended_ids().await.unwrap(), ids(&[8]));

    svc.reset_seen();
    backend.recommended.lock().unwrap().push_back(ids(&[3]));
    assert_eq!(svc.recommended_ids().await.unwrap(), ids(&[3]));
}

#[tokio::test]
async fn gives_up_after_four_empty_polls() {
    let backend = Arc::new(FakeBackend::new());
    *backend.history.lock().unwrap() = Some(Vec::new());
    let svc = recommender(&backend);

    let err = svc.recommended_ids().await.unwrap_err();
    assert!(matches!(err, RecommendError::NoneAvailable));
    assert_eq!(*backend.polls.lock().unwrap(), 4);
}

#[tokio::test]
async fn refused_trigger_skips_polling() {
    let backend = Arc::new(FakeBackend::new());
    let svc = recommender(&backend);

    let err = svc.recommended_ids().await.unwrap_err();
    assert!(matches!(err, RecommendError::Trigger(_)));
    assert_eq!(*backend.polls.lock().unwrap(), 0);
}

#[tokio::test]
async fn practice_stream_uses_placeholder_for_unreachable_questions() {
    let backend = Arc::new(FakeBackend::new().with_detail(detail(1, 1, 4)));
    let svc = recommender(&backend);

    let items: Vec<_> = svc.practice_stream(ids(&[1, 2])).collect().await;
    assert_eq!(items.len(), 2);
    assert_eq!(items[0].title, "Question 1");
    assert_eq!(items[1].title, "Question #2");

    // A second stream starts again from the first id.
    let again: Vec<_> = svc.practice_stream(ids(&[1, 2])).collect().await;
    assert_eq!(again, items);
}

#[tokio::test]
async fn history_filters_and_enriches() {
    let backend = Arc::new(FakeBackend::new().with_detail(detail(1, 1, 4)));
    *backend.history.lock().unwrap() = Some(vec![
        AnswerRecord::new(QuestionId::new(1), true),
        AnswerRecord::new(QuestionId::new(2), false),
    ]);
    let svc = HistoryService::new(backend.clone(), backend.clone());

    let records = svc.answer_history().await.unwrap();
    assert_eq!(HistoryFilter::Wrong.apply(&records).len(), 1);

    let enriched: Vec<_> = svc.enrich(records).collect().await;
    assert_eq!(enriched[0].title.as_deref(), Some("Question 1"));
    assert!(enriched[1].title.is_none());
    assert!(!enriched[1].correct);
}

#[tokio::test]
async fn practice_answer_resolves_index_and_reports() {
    let backend = Arc::new(FakeBackend::new().with_detail(detail(4, 2, 4)));
    let svc = PracticeService::new(backend.clone());

    let question = svc.load(QuestionId::new(4)).await.unwrap();
    let feedback = svc.answer(&question, 1).await;
    assert!(feedback.correct);
    assert_eq!(feedback.correct_choice.as_deref(), Some("choice 1"));
    assert!(feedback.recorded);

    let wrong = svc.answer(&question, 3).await;
    assert!(!wrong.correct);
    assert_eq!(
        backend.answers.lock().unwrap().clone(),
        vec![(QuestionId::new(4), true, 1), (QuestionId::new(4), false, 3)]
    );
}

#[tokio::test]
async fn upload_validates_before_sending() {
    let backend = Arc::new(FakeBackend::new());
    let svc = UploadService::new(backend.clone());

    let mut draft = UploadDraft {
        question: "Which planet is largest?".into(),
        options: "Mars, Jupiter，Venus".into(),
        answer: "x".into(),
        ..UploadDraft::default()
    };
    let err = svc.upload(&draft).await.unwrap_err();
    assert!(matches!(err, UploadError::Invalid(_)));
    assert!(backend.uploads.lock().unwrap().is_empty());

    draft.answer = "1".into();
    draft.facets.set(Facet::Subject, Some("natural science".into()));
    *backend.upload_ack.lock().unwrap() = Some(ack(0, Some("duplicate question")));
    let err = svc.upload(&draft).await.unwrap_err();
    assert!(matches!(err, UploadError::Rejected(ref m) if m == "duplicate question"));

    *backend.upload_ack.lock().unwrap() = Some(ack(1, None));
    svc.upload(&draft).await.unwrap();
    let sent = backend.uploads.lock().unwrap().clone();
    assert_eq!(sent.len(), 2);
    assert_eq!(sent[1].options, vec!["Mars", "Jupiter", "Venus"]);
    assert_eq!(sent[1].subject, "natural science");
    assert_eq!(sent[1].grade, "other");
}
