use serde::{Deserialize, Serialize};

use quiz_core::model::{
    AnnouncementId, AssignmentId, ClassId, Facet, FacetSample, FilterState, QuestionId, UserId,
};
use quiz_core::time::WireTimestamp;

use crate::error::ApiError;

/// Application-level success code carried in every envelope.
pub const BUSINESS_SUCCESS: i32 = 1;

/// The backend's `{code, msg, data}` wrapper.
#[derive(Debug, Clone, Deserialize)]
pub struct Envelope<T> {
    pub code: i32,
    #[serde(default)]
    pub msg: Option<String>,
    #[serde(default = "Option::default")]
    pub data: Option<T>,
}

impl<T> Envelope<T> {
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.code == BUSINESS_SUCCESS
    }

    /// The payload of a successful envelope.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Business` for a non-success code and
    /// `ApiError::EmptyData` when the payload is missing.
    pub fn into_data(self) -> Result<T, ApiError> {
        if !self.is_success() {
            return Err(ApiError::Business {
                code: self.code,
                message: self.msg.unwrap_or_default(),
            });
        }
        self.data.ok_or(ApiError::EmptyData)
    }

    #[must_use]
    pub fn ack(&self) -> Ack {
        Ack {
            code: self.code,
            message: self.msg.clone().filter(|m| !m.trim().is_empty()),
        }
    }
}

/// Code and message of a command whose payload is ignored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ack {
    pub code: i32,
    pub message: Option<String>,
}

impl Ack {
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.code == BUSINESS_SUCCESS
    }

    #[must_use]
    pub fn message_or(&self, fallback: &str) -> String {
        self.message.clone().unwrap_or_else(|| fallback.to_owned())
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct ListData<T> {
    #[serde(default = "Vec::new")]
    pub list: Vec<T>,
}

//
// ─── QUESTIONS ─────────────────────────────────────────────────────────────────
//

/// Filters for one page of the question search.
///
/// The free-text query travels as `questionName`; `keyword` is always sent
/// blank.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QuestionQuery {
    pub question_name: String,
    pub grade: String,
    pub subject: String,
    pub topic: String,
    pub category: String,
    pub page: u32,
}

impl QuestionQuery {
    /// Query for `page` with every selected facet of `filters`; unselected
    /// facets are sent blank.
    #[must_use]
    pub fn from_filters(filters: &FilterState, page: u32) -> Self {
        let facet = |f: Facet| filters.get(f).unwrap_or_default().to_owned();
        Self {
            question_name: filters.query.clone(),
            grade: facet(Facet::Grade),
            subject: facet(Facet::Subject),
            topic: facet(Facet::Topic),
            category: facet(Facet::Category),
            page,
        }
    }

    pub(crate) fn to_params(&self) -> Vec<(&'static str, String)> {
        vec![
            ("keyword", String::new()),
            ("questionName", self.question_name.clone()),
            ("grade", self.grade.clone()),
            ("subject", self.subject.clone()),
            ("topic", self.topic.clone()),
            ("category", self.category.clone()),
            ("page", self.page.to_string()),
            ("questionIndex", "-1".to_owned()),
        ]
    }
}

/// A search result row.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionSummary {
    pub id: QuestionId,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub question: String,
    #[serde(default)]
    pub choices: Vec<String>,
    #[serde(default)]
    pub answer: i32,
    #[serde(default)]
    pub hint: Option<String>,
    #[serde(default)]
    pub task: Option<String>,
    #[serde(default)]
    pub skill: Option<String>,
    #[serde(default)]
    pub lecture: Option<String>,
    #[serde(default)]
    pub solution: Option<String>,
    #[serde(flatten)]
    pub facets: FacetSample,
}

/// One page of search results.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QuestionPage {
    pub items: Vec<QuestionSummary>,
    pub total_count: u32,
    pub page: u32,
    pub page_size: u32,
    /// Top-level `errorMessage` of the response, when not blank.
    pub error_message: Option<String>,
}

impl QuestionPage {
    /// Fails the page when the backend reported an error message.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Business` with code `0` carrying the message.
    pub fn checked(self) -> Result<Self, ApiError> {
        match self.error_message {
            Some(message) => Err(ApiError::Business { code: 0, message }),
            None => Ok(self),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct QuestionPageBody {
    #[serde(default)]
    pub data: Option<QuestionPageData>,
    #[serde(default)]
    pub error_message: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct QuestionPageData {
    #[serde(default)]
    pub items: Option<Vec<QuestionSummary>>,
    #[serde(default)]
    pub total_count: u32,
    #[serde(default)]
    pub page: u32,
    #[serde(default)]
    pub page_size: u32,
}

impl QuestionPageBody {
    /// Missing data is an empty page. Only the top-level error message is
    /// kept; the nested one is ignored.
    pub(crate) fn into_page(self) -> QuestionPage {
        let error_message = self.error_message.filter(|m| !m.trim().is_empty());
        match self.data {
            Some(data) => QuestionPage {
                items: data.items.unwrap_or_default(),
                total_count: data.total_count,
                page: data.page,
                page_size: data.page_size,
                error_message,
            },
            None => QuestionPage {
                error_message,
                ..QuestionPage::default()
            },
        }
    }
}

/// Single question with its correct answer as stored by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct QuestionDetail {
    pub id: QuestionId,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub question: String,
    #[serde(default)]
    pub choices: Vec<String>,
    pub answer: i32,
}

//
// ─── CLASSES & ASSIGNMENTS ─────────────────────────────────────────────────────
//

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentClass {
    pub class_id: ClassId,
    #[serde(default)]
    pub class_name: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassDetail {
    pub class_id: ClassId,
    #[serde(default)]
    pub class_name: String,
    #[serde(default)]
    pub list: Vec<ClassAssignment>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassAssignment {
    pub assignment_id: AssignmentId,
    #[serde(default)]
    pub assignment_name: String,
    #[serde(default)]
    pub expire_time: Option<WireTimestamp>,
    #[serde(default)]
    pub whether_finish: i32,
    #[serde(default)]
    pub finish_time: Option<WireTimestamp>,
}

impl ClassAssignment {
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.whether_finish == 1 || self.finish_time.as_ref().is_some_and(|t| !t.parts().is_empty())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AssignmentQuestion {
    pub id: QuestionId,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub question: String,
    #[serde(default)]
    pub choices: Vec<String>,
    #[serde(default)]
    pub answer: i32,
}

/// How a class is located when joining.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JoinKey {
    ByName(String),
    ByToken(String),
}

impl JoinKey {
    #[must_use]
    pub fn access_type(&self) -> &'static str {
        match self {
            Self::ByName(_) => "byName",
            Self::ByToken(_) => "byLink",
        }
    }

    #[must_use]
    pub fn key(&self) -> &str {
        match self {
            Self::ByName(k) | Self::ByToken(k) => k.trim(),
        }
    }
}

//
// ─── ANNOUNCEMENTS ─────────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Announcement {
    #[serde(default, alias = "id")]
    pub announcement_id: Option<AnnouncementId>,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub create_time: WireTimestamp,
    #[serde(default)]
    pub class_id: Option<ClassId>,
    #[serde(default)]
    pub class_name: Option<String>,
    /// `1` once read.
    #[serde(default)]
    pub status: Option<i32>,
}

impl Announcement {
    #[must_use]
    pub fn is_read(&self) -> bool {
        self.status == Some(1)
    }
}

//
// ─── ACCOUNT ───────────────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResult {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
    #[serde(default)]
    pub current_authority: Option<String>,
    #[serde(default)]
    pub user_id: Option<UserId>,
    #[serde(default)]
    pub user_name: Option<String>,
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub msg: Option<String>,
}

impl LoginResult {
    /// Signed in as a student.
    #[must_use]
    pub fn is_student_login(&self) -> bool {
        let eq = |v: &Option<String>, want: &str| {
            v.as_deref().is_some_and(|s| s.eq_ignore_ascii_case(want))
        };
        eq(&self.status, "ok") && eq(&self.current_authority, "student")
    }

    #[must_use]
    pub fn failure_message(&self) -> String {
        self.message
            .clone()
            .or_else(|| self.msg.clone())
            .filter(|m| !m.trim().is_empty())
            .unwrap_or_else(|| "Incorrect email or password".to_owned())
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct RegisterRequest {
    pub address: String,
    pub email: String,
    pub gender: String,
    pub group: String,
    pub name: String,
    pub password: String,
    pub phone: String,
    pub signature: String,
    pub tags: Vec<String>,
    pub title: String,
}

//
// ─── DASHBOARD, RECOMMENDATIONS, HISTORY ───────────────────────────────────────
//

/// A rate sent either as a number or as numeric text.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub(crate) enum RateValue {
    Number(f64),
    Text(String),
}

impl RateValue {
    pub(crate) fn as_f64(&self) -> f64 {
        match self {
            Self::Number(n) => *n,
            Self::Text(s) => s.trim().parse().unwrap_or(0.0),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct DashboardData {
    #[serde(default)]
    pub accuracy_rates: Option<Vec<RateValue>>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RecommendIds {
    #[serde(default, alias = "ids")]
    pub question_ids: Vec<QuestionId>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct HistoryData {
    #[serde(default)]
    pub records: Vec<HistoryRecordWire>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct HistoryRecordWire {
    pub question_id: Option<QuestionId>,
    #[serde(default)]
    pub is_correct: i32,
}

/// One answered question in the student's history.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnswerRecord {
    pub question_id: QuestionId,
    pub correct: bool,
    pub title: Option<String>,
    pub image: Option<String>,
}

impl AnswerRecord {
    #[must_use]
    pub fn new(question_id: QuestionId, correct: bool) -> Self {
        Self {
            question_id,
            correct,
            title: None,
            image: None,
        }
    }
}

impl HistoryData {
    /// Records without a question id are dropped.
    pub(crate) fn into_records(self) -> Vec<AnswerRecord> {
        self.records
            .into_iter()
            .filter_map(|r| {
                r.question_id
                    .map(|id| AnswerRecord::new(id, r.is_correct == 1))
            })
            .collect()
    }
}
