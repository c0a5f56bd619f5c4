use quiz_core::model::{AssignmentId, UserId};

use crate::repository::StorageError;

pub(crate) fn ser<E: core::fmt::Display>(e: E) -> StorageError {
    StorageError::Serialization(e.to_string())
}

pub(crate) fn conn<E: core::fmt::Display>(e: E) -> StorageError {
    StorageError::Connection(e.to_string())
}

pub(crate) fn assignment_id_to_i64(id: AssignmentId) -> Result<i64, StorageError> {
    i64::try_from(id.value())
        .map_err(|_| StorageError::Serialization("assignment_id overflow".into()))
}

pub(crate) fn user_id_to_i64(id: Option<UserId>) -> Result<Option<i64>, StorageError> {
    id.map(|u| {
        i64::try_from(u.value()).map_err(|_| StorageError::Serialization("user_id overflow".into()))
    })
    .transpose()
}

pub(crate) fn user_id_from_i64(v: Option<i64>) -> Result<Option<UserId>, StorageError> {
    v.map(|raw| {
        u64::try_from(raw)
            .map(UserId::new)
            .map_err(|_| StorageError::Serialization("user_id sign overflow".into()))
    })
    .transpose()
}
