//! Backend collaborator: REST-shaped traits, wire types and the reqwest client.

mod http;
mod session;
mod types;

use async_trait::async_trait;

use quiz_core::model::{AnnouncementId, AssignmentId, ClassId, NewQuestion, QuestionId};

use crate::error::ApiError;

pub use http::HttpClassroomApi;
pub use session::{ClientConfig, SessionContext, DEFAULT_BASE_URL};
pub use types::{
    Ack, Announcement, AnswerRecord, AssignmentQuestion, BUSINESS_SUCCESS, ClassAssignment,
    ClassDetail, Envelope, JoinKey, LoginRequest, LoginResult, QuestionDetail, QuestionPage,
    QuestionQuery, QuestionSummary, RegisterRequest, StudentClass,
};

/// Question search, lookup and authoring.
#[async_trait]
pub trait QuestionApi: Send + Sync {
    /// One page of questions matching `query`. A reported error message is
    /// carried on the page; see `QuestionPage::checked`.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` on transport failure or an undecodable body.
    async fn query_questions(&self, query: &QuestionQuery) -> Result<QuestionPage, ApiError>;

    /// # Errors
    ///
    /// Returns `ApiError::Business` or `ApiError::EmptyData` when the backend
    /// has no such question, or a transport error.
    async fn get_question(&self, id: QuestionId) -> Result<QuestionDetail, ApiError>;

    /// Report a practice answer.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` on transport failure.
    async fn answer_question(
        &self,
        id: QuestionId,
        correct: bool,
        choice: i32,
    ) -> Result<Ack, ApiError>;

    /// # Errors
    ///
    /// Returns `ApiError` on transport failure.
    async fn upload_question(&self, question: &NewQuestion) -> Result<Ack, ApiError>;
}

/// Assignment contents and submission.
#[async_trait]
pub trait AssignmentApi: Send + Sync {
    /// # Errors
    ///
    /// Returns `ApiError` on transport or business failure.
    async fn select_assignment(
        &self,
        id: AssignmentId,
    ) -> Result<Vec<AssignmentQuestion>, ApiError>;

    /// # Errors
    ///
    /// Returns `ApiError` on transport failure; business codes are in the `Ack`.
    async fn finish_assignment(
        &self,
        id: AssignmentId,
        status: i32,
        accuracy: f64,
    ) -> Result<Ack, ApiError>;
}

/// Class membership and announcements.
#[async_trait]
pub trait ClassApi: Send + Sync {
    /// # Errors
    ///
    /// Returns `ApiError` on transport or business failure.
    async fn view_classes(&self) -> Result<Vec<StudentClass>, ApiError>;

    /// # Errors
    ///
    /// Returns `ApiError` on transport or business failure.
    async fn select_class(&self, id: ClassId) -> Result<ClassDetail, ApiError>;

    /// # Errors
    ///
    /// Returns `ApiError` on transport or business failure.
    async fn select_announcements(&self, class: ClassId) -> Result<Vec<Announcement>, ApiError>;

    /// # Errors
    ///
    /// Returns `ApiError` on transport failure.
    async fn check_announcement(&self, id: AnnouncementId) -> Result<Ack, ApiError>;

    /// # Errors
    ///
    /// Returns `ApiError` on transport failure.
    async fn join_class(&self, key: &JoinKey) -> Result<Ack, ApiError>;

    /// # Errors
    ///
    /// Returns `ApiError` on transport failure.
    async fn leave_class(&self, id: ClassId) -> Result<Ack, ApiError>;
}

/// Sign-in, registration and the personal dashboard.
#[async_trait]
pub trait AccountApi: Send + Sync {
    /// # Errors
    ///
    /// Returns `ApiError` on transport failure.
    async fn login(&self, request: &LoginRequest) -> Result<LoginResult, ApiError>;

    /// # Errors
    ///
    /// Returns `ApiError` on transport failure.
    async fn register(&self, request: &RegisterRequest) -> Result<Ack, ApiError>;

    /// Daily accuracy fractions, most recent day first.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` on transport or business failure.
    async fn dashboard(&self) -> Result<Vec<f64>, ApiError>;
}

/// Recommendation pipeline and answer history.
#[async_trait]
pub trait RecommendApi: Send + Sync {
    /// Starts a recommendation run; the response carries the answer history.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` on transport or business failure.
    async fn trigger_recommend(&self) -> Result<Vec<AnswerRecord>, ApiError>;

    /// Ids produced by the latest run, possibly empty while it is running.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` on transport or business failure.
    async fn recommended_ids(&self) -> Result<Vec<QuestionId>, ApiError>;
}
