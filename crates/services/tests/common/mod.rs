#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

use async_trait::async_trait;
use quiz_core::model::{
    AnnouncementId, AssignmentId, ClassId, FacetSample, NewQuestion, QuestionId,
};
use reqwest::StatusCode;
use services::api::{
    Ack, Announcement, AnswerRecord, AssignmentApi, AssignmentQuestion, ClassApi, ClassDetail,
    JoinKey, QuestionApi, QuestionDetail, QuestionPage, QuestionQuery, QuestionSummary,
    RecommendApi, StudentClass,
};
use services::ApiError;

pub fn unavailable() -> ApiError {
    ApiError::HttpStatus(StatusCode::SERVICE_UNAVAILABLE)
}

pub fn ack(code: i32, message: Option<&str>) -> Ack {
    Ack {
        code,
        message: message.map(str::to_owned),
    }
}

pub fn summary(id: u64, grade: &str, subject: &str, category: &str, topic: &str) -> QuestionSummary {
    QuestionSummary {
        id: QuestionId::new(id),
        image: None,
        question: format!("Question {id}"),
        choices: vec!["a".into(), "b".into(), "c".into(), "d".into()],
        answer: 1,
        hint: None,
        task: None,
        skill: None,
        lecture: None,
        solution: None,
        facets: FacetSample {
            grade: Some(grade.into()),
            subject: Some(subject.into()),
            category: Some(category.into()),
            topic: Some(topic.into()),
        },
    }
}

pub fn page(items: Vec<QuestionSummary>) -> QuestionPage {
    let total = u32::try_from(items.len()).unwrap();
    QuestionPage {
        items,
        total_count: total,
        page: 1,
        page_size: 10,
        error_message: None,
    }
}

pub fn detail(id: u64, answer: i32, choices: usize) -> QuestionDetail {
    QuestionDetail {
        id: QuestionId::new(id),
        image: None,
        question: format!("Question {id}"),
        choices: (0..choices).map(|i| format!("choice {i}")).collect(),
        answer,
    }
}

pub fn assignment_question(id: u64) -> AssignmentQuestion {
    AssignmentQuestion {
        id: QuestionId::new(id),
        image: None,
        question: format!("Question {id}"),
        choices: vec!["a".into(), "b".into(), "c".into(), "d".into()],
        answer: 0,
    }
}

pub fn announcement(id: u64, title: &str, created: Vec<i32>) -> Announcement {
    Announcement {
        announcement_id: Some(AnnouncementId::new(id)),
        title: title.into(),
        content: String::new(),
        create_time: quiz_core::time::WireTimestamp::new(created),
        class_id: None,
        class_name: None,
        status: None,
    }
}

/// In-process stand-in for the backend.
///
/// Pages are served by page number; anything not configured fails like an
/// unreachable server.
#[derive(Default)]
pub struct FakeBackend {
    pub pages: Mutex<HashMap<u32, QuestionPage>>,
    pub queries: Mutex<Vec<QuestionQuery>>,
    pub details: Mutex<HashMap<QuestionId, QuestionDetail>>,
    pub detail_calls: Mutex<u32>,
    pub answers: Mutex<Vec<(QuestionId, bool, i32)>>,
    pub uploads: Mutex<Vec<NewQuestion>>,
    pub upload_ack: Mutex<Option<Ack>>,
    pub assignment_questions: Mutex<HashMap<AssignmentId, Vec<AssignmentQuestion>>>,
    pub finish_ack: Mutex<Option<Ack>>,
    pub finished: Mutex<Vec<(AssignmentId, i32, f64)>>,
    pub classes: Mutex<Vec<StudentClass>>,
    pub class_details: Mutex<HashMap<ClassId, ClassDetail>>,
    pub announcements: Mutex<HashMap<ClassId, Vec<Announcement>>>,
    pub checked: Mutex<Vec<AnnouncementId>>,
    pub join_ack: Mutex<Option<Ack>>,
    pub joins: Mutex<Vec<JoinKey>>,
    pub leave_ack: Mutex<Option<Ack>>,
    pub history: Mutex<Option<Vec<AnswerRecord>>>,
    pub triggers: Mutex<u32>,
    pub recommended: Mutex<VecDeque<Vec<QuestionId>>>,
    pub polls: Mutex<u32>,
}

impl FakeBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_page(self, number: u32, page: QuestionPage) -> Self {
        self.pages.lock().unwrap().insert(number, page);
        self
    }

    pub fn with_detail(self, detail: QuestionDetail) -> Self {
        self.details.lock().unwrap().insert(detail.id, detail);
        self
    }

    pub fn with_finish_ack(self, ack: Ack) -> Self {
        *self.finish_ack.lock().unwrap() = Some(ack);
        self
    }

    pub fn query_count(&self) -> usize {
        self.queries.lock().unwrap().len()
    }

    pub fn finish_count(&self) -> usize {
        self.finished.lock().unwrap().len()
    }
}

#[async_trait]
impl QuestionApi for FakeBackend {
    async fn query_questions(&self, query: &QuestionQuery) -> Result<QuestionPage, ApiError> {
        self.queries.lock().unwrap().push(query.clone());
        self.pages
            .lock()
            .unwrap()
            .get(&query.page)
            .cloned()
            .ok_or_else(unavailable)
    }

    async fn get_question(&self, id: QuestionId) -> Result<QuestionDetail, ApiError> {
        *self.detail_calls.lock().unwrap() += 1;
        self.details
            .lock()
            .unwrap()
            .get(&id)
            .cloned()
            .ok_or_else(unavailable)
    }

    async fn answer_question(
        &self,
        id: QuestionId,
        correct: bool,
        choice: i32,
    ) -> Result<Ack, ApiError> {
        self.answers.lock().unwrap().push((id, correct, choice));
        Ok(ack(1, None))
    }

    async fn upload_question(&self, question: &NewQuestion) -> Result<Ack, ApiError> {
        self.uploads.lock().unwrap().push(question.clone());
        self.upload_ack.lock().unwrap().clone().ok_or_else(unavailable)
    }
}

#[async_trait]
impl AssignmentApi for FakeBackend {
    async fn select_assignment(
        &self,
        id: AssignmentId,
    ) -> Result<Vec<AssignmentQuestion>, ApiError> {
        self.assignment_questions
            .lock()
            .unwrap()
            .get(&id)
            .cloned()
            .ok_or_else(unavailable)
    }

    async fn finish_assignment(
        &self,
        id: AssignmentId,
        status: i32,
        accuracy: f64,
    ) -> Result<Ack, ApiError> {
        self.finished.lock().unwrap().push((id, status, accuracy));
        self.finish_ack.lock().unwrap().clone().ok_or_else(unavailable)
    }
}

#[async_trait]
impl ClassApi for FakeBackend {
    async fn view_classes(&self) -> Result<Vec<StudentClass>, ApiError> {
        Ok(self.classes.lock().unwrap().clone())
    }

    async fn select_class(&self, id: ClassId) -> Result<ClassDetail, ApiError> {
        self.class_details
            .lock()
            .unwrap()
            .get(&id)
            .cloned()
            .ok_or_else(unavailable)
    }

    async fn select_announcements(&self, class: ClassId) -> Result<Vec<Announcement>, ApiError> {
        self.announcements
            .lock()
            .unwrap()
            .get(&class)
            .cloned()
            .ok_or_else(unavailable)
    }

    async fn check_announcement(&self, id: AnnouncementId) -> Result<Ack, ApiError> {
        self.checked.lock().unwrap().push(id);
        Ok(ack(1, None))
    }

    async fn join_class(&self, key: &JoinKey) -> Result<Ack, ApiError> {
        self.joins.lock().unwrap().push(key.clone());
        self.join_ack.lock().unwrap().clone().ok_or_else(unavailable)
    }

    async fn leave_class(&self, _id: ClassId) -> Result<Ack, ApiError> {
        self.leave_ack.lock().unwrap().clone().ok_or_else(unavailable)
    }
}

#[async_trait]
impl RecommendApi for FakeBackend {
    async fn trigger_recommend(&self) -> Result<Vec<AnswerRecord>, ApiError> {
        *self.triggers.lock().unwrap() += 1;
        self.history.lock().unwrap().clone().ok_or_else(unavailable)
    }

    async fn recommended_ids(&self) -> Result<Vec<QuestionId>, ApiError> {
        *self.polls.lock().unwrap() += 1;
        Ok(self
            .recommended
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_default())
    }
}

pub fn student_class(id: u64, name: &str) -> StudentClass {
    StudentClass {
        class_id: ClassId::new(id),
        class_name: name.into(),
        description: String::new(),
    }
}
