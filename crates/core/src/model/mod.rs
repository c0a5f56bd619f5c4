mod account;
mod facet;
mod ids;
mod progress;
mod upload;

pub use account::{UserSession, local_part};
pub use facet::{
    CATEGORY_DEFAULTS, Facet, FacetOptions, FacetSample, FilterState, GRADE_DEFAULTS,
    SUBJECT_DEFAULTS, TOPIC_DEFAULTS, UnknownFacet, collect_values, local_options,
};
pub use ids::{AnnouncementId, AssignmentId, ClassId, ParseIdError, QuestionId, UserId};
pub use progress::{AssignmentProgress, ProgressRecord, ProgressRecordError, ProgressState};
pub use upload::{NewQuestion, UNSPECIFIED_FACET, UploadDraft, UploadDraftError};
