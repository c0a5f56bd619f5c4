use thiserror::Error;

use crate::model::{ParseIdError, ProgressRecordError, UnknownFacet, UploadDraftError};

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    #[error(transparent)]
    ParseId(#[from] ParseIdError),
    #[error(transparent)]
    Facet(#[from] UnknownFacet),
    #[error(transparent)]
    ProgressRecord(#[from] ProgressRecordError),
    #[error(transparent)]
    UploadDraft(#[from] UploadDraftError),
}
