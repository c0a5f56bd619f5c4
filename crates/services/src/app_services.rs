use std::sync::Arc;

use storage::repository::Storage;

use crate::account_service::AccountService;
use crate::announcement_service::AnnouncementService;
use crate::api::{ClientConfig, HttpClassroomApi, SessionContext};
use crate::assignment_service::AssignmentService;
use crate::class_service::ClassService;
use crate::dashboard_service::DashboardService;
use crate::error::AppServicesError;
use crate::history_service::HistoryService;
use crate::practice_service::PracticeService;
use crate::question_search::QuestionSearch;
use crate::recommend_service::RecommendService;
use crate::upload_service::UploadService;
use crate::Clock;

/// Assembles app-facing services around one HTTP session.
#[derive(Clone)]
pub struct AppServices {
    context: Arc<SessionContext>,
    api: Arc<HttpClassroomApi>,
    account: Arc<AccountService>,
    assignments: Arc<AssignmentService>,
    announcements: Arc<AnnouncementService>,
    classes: Arc<ClassService>,
    dashboard: Arc<DashboardService>,
    recommendations: Arc<RecommendService>,
    history: Arc<HistoryService>,
    practice: Arc<PracticeService>,
    uploads: Arc<UploadService>,
}

impl AppServices {
    /// Build services backed by `SQLite` storage.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError` if storage initialization fails or the HTTP
    /// client cannot be built.
    pub async fn new_sqlite(
        db_url: &str,
        config: ClientConfig,
        clock: Clock,
    ) -> Result<Self, AppServicesError> {
        let storage = Storage::sqlite(db_url).await?;
        Self::new(storage, config, clock)
    }

    /// # Errors
    ///
    /// Returns `AppServicesError::Api` if the HTTP client cannot be built.
    pub fn new(
        storage: Storage,
        config: ClientConfig,
        clock: Clock,
    ) -> Result<Self, AppServicesError> {
        let context = Arc::new(SessionContext::new(config)?);
        let api = Arc::new(HttpClassroomApi::new(Arc::clone(&context)));

        let account = Arc::new(AccountService::new(
            api.clone(),
            Arc::clone(&storage.sessions),
            Arc::clone(&context),
        ));
        let assignments = Arc::new(AssignmentService::new(
            api.clone(),
            api.clone(),
            Arc::clone(&storage.progress),
        ));
        let announcements = Arc::new(AnnouncementService::new(api.clone()));
        let classes = Arc::new(ClassService::new(api.clone(), clock));
        let dashboard = Arc::new(DashboardService::new(api.clone()));
        let recommendations = Arc::new(RecommendService::new(api.clone(), api.clone()));
        let history = Arc::new(HistoryService::new(api.clone(), api.clone()));
        let practice = Arc::new(PracticeService::new(api.clone()));
        let uploads = Arc::new(UploadService::new(api.clone()));

        Ok(Self {
            context,
            api,
            account,
            assignments,
            announcements,
            classes,
            dashboard,
            recommendations,
            history,
            practice,
            uploads,
        })
    }

    #[must_use]
    pub fn context(&self) -> Arc<SessionContext> {
        Arc::clone(&self.context)
    }

    /// A fresh search screen state.
    #[must_use]
    pub fn question_search(&self) -> QuestionSearch {
        QuestionSearch::new(self.api.clone())
    }

    #[must_use]
    pub fn account(&self) -> Arc<AccountService> {
        Arc::clone(&self.account)
    }

    #[must_use]
    pub fn assignments(&self) -> Arc<AssignmentService> {
        Arc::clone(&self.assignments)
    }

    #[must_use]
    pub fn announcements(&self) -> Arc<AnnouncementService> {
        Arc::clone(&self.announcements)
    }

    #[must_use]
    pub fn classes(&self) -> Arc<ClassService> {
        Arc::clone(&self.classes)
    }

    #[must_use]
    pub fn dashboard(&self) -> Arc<DashboardService> {
        Arc::clone(&self.dashboard)
    }

    #[must_use]
    pub fn recommendations(&self) -> Arc<RecommendService> {
        Arc::clone(&self.recommendations)
    }

    #[must_use]
    pub fn history(&self) -> Arc<HistoryService> {
        Arc::clone(&self.history)
    }

    #[must_use]
    pub fn practice(&self) -> Arc<PracticeService> {
        Arc::clone(&self.practice)
    }

    #[must_use]
    pub fn uploads(&self) -> Arc<UploadService> {
        Arc::clone(&self.uploads)
    }
}
