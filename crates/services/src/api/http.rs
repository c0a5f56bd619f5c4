use std::sync::Arc;

use async_trait::async_trait;
use reqwest::{Method, Response};
use serde::de::DeserializeOwned;

use quiz_core::model::{AnnouncementId, AssignmentId, ClassId, NewQuestion, QuestionId};

use super::session::SessionContext;
use super::types::{
    Ack, Announcement, AnswerRecord, AssignmentQuestion, ClassDetail, DashboardData, Envelope,
    HistoryData, JoinKey, ListData, LoginRequest, LoginResult, QuestionDetail, QuestionPage,
    QuestionPageBody, QuestionQuery, RateValue, RecommendIds, RegisterRequest, StudentClass,
};
use super::{AccountApi, AssignmentApi, ClassApi, QuestionApi, RecommendApi};
use crate::error::ApiError;

/// reqwest implementation of every backend trait.
#[derive(Clone)]
pub struct HttpClassroomApi {
    session: Arc<SessionContext>,
}

impl HttpClassroomApi {
    #[must_use]
    pub fn new(session: Arc<SessionContext>) -> Self {
        Self { session }
    }

    #[must_use]
    pub fn session(&self) -> Arc<SessionContext> {
        Arc::clone(&self.session)
    }

    async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&str, String)],
    ) -> Result<T, ApiError> {
        self.send_query(Method::GET, path, params).await
    }

    async fn send_query<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        params: &[(&str, String)],
    ) -> Result<T, ApiError> {
        let response = self
            .session
            .request(method, path)?
            .query(params)
            .send()
            .await?;
        read_json(response).await
    }

    async fn post_json<B: serde::Serialize + Sync, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        let response = self
            .session
            .request(Method::POST, path)?
            .json(body)
            .send()
            .await?;
        read_json(response).await
    }

    async fn ack(
        &self,
        method: Method,
        path: &str,
        params: &[(&str, String)],
    ) -> Result<Ack, ApiError> {
        let envelope: Envelope<serde_json::Value> = self.send_query(method, path, params).await?;
        Ok(envelope.ack())
    }
}

async fn read_json<T: DeserializeOwned>(response: Response) -> Result<T, ApiError> {
    let status = response.status();
    if !status.is_success() {
        return Err(ApiError::HttpStatus(status));
    }
    Ok(response.json().await?)
}

#[async_trait]
impl QuestionApi for HttpClassroomApi {
    async fn query_questions(&self, query: &QuestionQuery) -> Result<QuestionPage, ApiError> {
        let body: QuestionPageBody = self.get("viewQuestion", &query.to_params()).await?;
        Ok(body.into_page())
    }

    async fn get_question(&self, id: QuestionId) -> Result<QuestionDetail, ApiError> {
        let envelope: Envelope<QuestionDetail> =
            self.get("doquestion", &[("id", id.to_string())]).await?;
        envelope.into_data()
    }

    async fn answer_question(
        &self,
        id: QuestionId,
        correct: bool,
        choice: i32,
    ) -> Result<Ack, ApiError> {
        let params = [
            ("id", id.to_string()),
            ("correct", u8::from(correct).to_string()),
            ("param", choice.to_string()),
        ];
        self.ack(Method::GET, "answerQuestion", &params).await
    }

    async fn upload_question(&self, question: &NewQuestion) -> Result<Ack, ApiError> {
        let envelope: Envelope<serde_json::Value> =
            self.post_json("upload-question", question).await?;
        Ok(envelope.ack())
    }
}

#[async_trait]
impl AssignmentApi for HttpClassroomApi {
    async fn select_assignment(
        &self,
        id: AssignmentId,
    ) -> Result<Vec<AssignmentQuestion>, ApiError> {
        let envelope: Envelope<ListData<AssignmentQuestion>> = self
            .get("selectAssignment", &[("assignmentId", id.to_string())])
            .await?;
        Ok(envelope.into_data()?.list)
    }

    async fn finish_assignment(
        &self,
        id: AssignmentId,
        status: i32,
        accuracy: f64,
    ) -> Result<Ack, ApiError> {
        let params = [
            ("assignmentId", id.to_string()),
            ("whether", status.to_string()),
            ("accuracy", format!("{accuracy:.2}")),
        ];
        self.ack(Method::POST, "finishAssignment", &params).await
    }
}

#[async_trait]
impl ClassApi for HttpClassroomApi {
    async fn view_classes(&self) -> Result<Vec<StudentClass>, ApiError> {
        let envelope: Envelope<ListData<StudentClass>> = self.get("viewClass", &[]).await?;
        Ok(envelope.into_data()?.list)
    }

    async fn select_class(&self, id: ClassId) -> Result<ClassDetail, ApiError> {
        let envelope: Envelope<ClassDetail> =
            self.get("selectClass", &[("classId", id.to_string())]).await?;
        envelope.into_data()
    }

    async fn select_announcements(&self, class: ClassId) -> Result<Vec<Announcement>, ApiError> {
        let envelope: Envelope<ListData<Announcement>> = self
            .get("selectAnnouncement", &[("classId", class.to_string())])
            .await?;
        Ok(envelope.into_data()?.list)
    }

    async fn check_announcement(&self, id: AnnouncementId) -> Result<Ack, ApiError> {
        self.ack(
            Method::POST,
            "checkAnnouncement",
            &[("announcementId", id.to_string())],
        )
        .await
    }

    async fn join_class(&self, key: &JoinKey) -> Result<Ack, ApiError> {
        let params = [
            ("accessType", key.access_type().to_owned()),
            ("key", key.key().to_owned()),
        ];
        self.ack(Method::POST, "joinClass", &params).await
    }

    async fn leave_class(&self, id: ClassId) -> Result<Ack, ApiError> {
        self.ack(Method::POST, "leaveClass", &[("classId", id.to_string())])
            .await
    }
}

#[async_trait]
impl AccountApi for HttpClassroomApi {
    async fn login(&self, request: &LoginRequest) -> Result<LoginResult, ApiError> {
        self.post_json("login", request).await
    }

    async fn register(&self, request: &RegisterRequest) -> Result<Ack, ApiError> {
        let envelope: Envelope<serde_json::Value> = self.post_json("register", request).await?;
        Ok(envelope.ack())
    }

    async fn dashboard(&self) -> Result<Vec<f64>, ApiError> {
        let envelope: Envelope<DashboardData> = self.get("dashboard", &[]).await?;
        let rates = envelope.into_data()?.accuracy_rates.unwrap_or_default();
        Ok(rates.iter().map(RateValue::as_f64).collect())
    }
}

#[async_trait]
impl RecommendApi for HttpClassroomApi {
    async fn trigger_recommend(&self) -> Result<Vec<AnswerRecord>, ApiError> {
        let envelope: Envelope<HistoryData> =
            self.send_query(Method::PUT, "recommend", &[]).await?;
        if !envelope.is_success() {
            return Err(ApiError::Business {
                code: envelope.code,
                message: envelope.msg.unwrap_or_default(),
            });
        }
        Ok(envelope.data.unwrap_or_default().into_records())
    }

    async fn recommended_ids(&self) -> Result<Vec<QuestionId>, ApiError> {
        let envelope: Envelope<RecommendIds> = self.get("getRecommend", &[]).await?;
        if !envelope.is_success() {
            return Err(ApiError::Business {
                code: envelope.code,
                message: envelope.msg.unwrap_or_default(),
            });
        }
        Ok(envelope.data.unwrap_or_default().question_ids)
    }
}
