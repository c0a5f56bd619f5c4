use std::sync::Arc;

use quiz_core::model::UploadDraft;
use tracing::info;

use crate::api::QuestionApi;
use crate::error::UploadError;

#[derive(Clone)]
pub struct UploadService {
    questions: Arc<dyn QuestionApi>,
}

impl UploadService {
    #[must_use]
    pub fn new(questions: Arc<dyn QuestionApi>) -> Self {
        Self { questions }
    }

    /// Validate and upload a question.
    ///
    /// # Errors
    ///
    /// Returns `UploadError::Invalid` before any request for a bad draft,
    /// `UploadError::Rejected` with the backend message, or `UploadError::Api`.
    pub async fn upload(&self, draft: &UploadDraft) -> Result<(), UploadError> {
        let question = draft.validate()?;
        let ack = self.questions.upload_question(&question).await?;
        if !ack.is_success() {
            return Err(UploadError::Rejected(ack.message_or("Upload failed")));
        }
        info!(subject = %question.subject, grade = %question.grade, "question uploaded");
        Ok(())
    }
}
