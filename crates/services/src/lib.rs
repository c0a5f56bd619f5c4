#![forbid(unsafe_code)]

pub mod account_service;
pub mod announcement_service;
pub mod api;
pub mod app_services;
pub mod assignment_service;
pub mod class_service;
pub mod dashboard_service;
pub mod error;
pub mod facet_service;
pub mod history_service;
pub mod practice_service;
pub mod question_search;
pub mod recommend_service;
pub mod upload_service;

pub use quiz_core::Clock;

pub use account_service::AccountService;
pub use announcement_service::{AnnouncementService, MarkRead};
pub use api::{ClientConfig, HttpClassroomApi, SessionContext};
pub use app_services::AppServices;
pub use assignment_service::{AssignmentService, Completion, SubmissionOutcome};
pub use class_service::{
    AssignmentStatus, ClassAssignments, ClassService, JoinOutcome, LeaveOutcome,
};
pub use dashboard_service::{AccuracySeries, DashboardService, DayWindow};
pub use error::{
    AccountError, ApiError, AppServicesError, AssignmentError, ClassError, RecommendError,
    UploadError,
};
pub use facet_service::FacetNarrower;
pub use history_service::{HistoryFilter, HistoryService};
pub use practice_service::{AnswerFeedback, PracticeService};
pub use question_search::{QuestionSearch, SearchUpdate};
pub use recommend_service::{RecommendService, RecommendedPractice};
pub use upload_service::UploadService;
