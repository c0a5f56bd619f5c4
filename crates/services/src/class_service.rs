use std::sync::Arc;

use chrono::NaiveDateTime;
use quiz_core::Clock;
use quiz_core::model::{AssignmentProgress, ClassId};
use quiz_core::time::WireTimestamp;
use tracing::{debug, info};
use uuid::Uuid;

use crate::api::{ClassApi, ClassAssignment, JoinKey, StudentClass};
use crate::error::{ApiError, ClassError};

/// Code the backend uses for leaving a class the student already left.
const ALREADY_LEFT: i32 = 2;

/// A class with its assignments, unexpired first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassAssignments {
    pub class_id: ClassId,
    pub class_name: String,
    pub assignments: Vec<ClassAssignment>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JoinOutcome {
    Joined { message: String },
    Rejected { code: i32, message: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeaveOutcome {
    pub left: bool,
    pub message: String,
}

/// True when the assignment has an expiry strictly before `now`.
#[must_use]
pub fn is_expired(assignment: &ClassAssignment, now: NaiveDateTime) -> bool {
    assignment
        .expire_time
        .as_ref()
        .and_then(WireTimestamp::to_naive)
        .is_some_and(|expiry| now > expiry)
}

/// Status badge of an assignment in a class listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssignmentStatus {
    Expired,
    Completed,
    InProgress,
    New,
}

impl AssignmentStatus {
    /// Expiry wins over completion; local answers make an open assignment
    /// in progress.
    #[must_use]
    pub fn of(
        assignment: &ClassAssignment,
        now: NaiveDateTime,
        local: &AssignmentProgress,
    ) -> Self {
        if is_expired(assignment, now) {
            Self::Expired
        } else if assignment.is_finished() {
            Self::Completed
        } else if local.answered() > 0 {
            Self::InProgress
        } else {
            Self::New
        }
    }

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Expired => "expired",
            Self::Completed => "completed",
            Self::InProgress => "in progress",
            Self::New => "new",
        }
    }
}

/// Moves expired assignments after the others, keeping order within each group.
pub fn order_by_expiry(assignments: &mut [ClassAssignment], now: NaiveDateTime) {
    assignments.sort_by_key(|a| is_expired(a, now));
}

#[derive(Clone)]
pub struct ClassService {
    classes: Arc<dyn ClassApi>,
    clock: Clock,
}

impl ClassService {
    #[must_use]
    pub fn new(classes: Arc<dyn ClassApi>, clock: Clock) -> Self {
        Self { classes, clock }
    }

    /// # Errors
    ///
    /// Returns `ApiError` when the list cannot be fetched.
    pub async fn list_classes(&self) -> Result<Vec<StudentClass>, ApiError> {
        self.classes.view_classes().await
    }

    /// # Errors
    ///
    /// Returns `ApiError` when the class cannot be fetched.
    pub async fn class_assignments(&self, class: ClassId) -> Result<ClassAssignments, ApiError> {
        let detail = self.classes.select_class(class).await?;
        let mut assignments = detail.list;
        order_by_expiry(&mut assignments, self.clock.local_now());
        Ok(ClassAssignments {
            class_id: detail.class_id,
            class_name: detail.class_name,
            assignments,
        })
    }

    /// Join a class by name or invitation token.
    ///
    /// Tokens are checked locally and never sent when malformed.
    ///
    /// # Errors
    ///
    /// Returns `ClassError::EmptyName`/`ClassError::InvalidToken` for bad input
    /// and `ClassError::Api` on transport failure.
    pub async fn join_class(&self, key: JoinKey) -> Result<JoinOutcome, ClassError> {
        match &key {
            JoinKey::ByName(name) if name.trim().is_empty() => return Err(ClassError::EmptyName),
            JoinKey::ByToken(token) => {
                if !is_hyphenated_uuid(token.trim()) {
                    return Err(ClassError::InvalidToken(token.clone()));
                }
            }
            JoinKey::ByName(_) => {}
        }

        let ack = self.classes.join_class(&key).await?;
        debug!(access = key.access_type(), code = ack.code, "join class answered");
        if ack.is_success() {
            info!(access = key.access_type(), "joined class");
            return Ok(JoinOutcome::Joined {
                message: ack.message_or("Joined the class"),
            });
        }
        let fallback = if ack.code == 0 {
            "Unable to join right now, please try again later"
        } else {
            "Failed to join, please try again later"
        };
        Ok(JoinOutcome::Rejected {
            code: ack.code,
            message: ack.message_or(fallback),
        })
    }

    /// Leave a class; leaving one already left also counts as success.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` on transport failure.
    pub async fn leave_class(&self, class: ClassId) -> Result<LeaveOutcome, ApiError> {
        let ack = self.classes.leave_class(class).await?;
        let outcome = match ack.code {
            1 => LeaveOutcome {
                left: true,
                message: ack.message_or("Left the class"),
            },
            ALREADY_LEFT => LeaveOutcome {
                left: true,
                message: ack.message_or("You already left this class"),
            },
            _ => LeaveOutcome {
                left: false,
                message: ack.message_or("Failed to leave the class"),
            },
        };
        Ok(outcome)
    }
}

/// The 8-4-4-4-12 form; braces, URNs and bare hex are refused.
fn is_hyphenated_uuid(token: &str) -> bool {
    token.len() == 36 && Uuid::try_parse(token).is_ok()
}
