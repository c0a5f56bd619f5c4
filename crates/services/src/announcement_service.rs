use std::collections::HashSet;
use std::sync::{Arc, Mutex, PoisonError};

use futures::future::join_all;
use quiz_core::model::{AnnouncementId, ClassId};
use tracing::{debug, warn};

use crate::api::{Announcement, ClassApi, StudentClass};

/// Result of asking to mark an announcement read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkRead {
    /// The request was sent; `acknowledged` is the backend's verdict.
    Sent { acknowledged: bool },
    /// Another call for the same id is still running.
    InFlight,
}

/// Announcements across the student's classes.
pub struct AnnouncementService {
    classes: Arc<dyn ClassApi>,
    marking: Mutex<HashSet<AnnouncementId>>,
}

impl AnnouncementService {
    #[must_use]
    pub fn new(classes: Arc<dyn ClassApi>) -> Self {
        Self {
            classes,
            marking: Mutex::new(HashSet::new()),
        }
    }

    /// Joined classes; empty when unavailable.
    pub async fn joined_classes(&self) -> Vec<StudentClass> {
        match self.classes.view_classes().await {
            Ok(list) => list,
            Err(err) => {
                warn!(error = %err, "class list unavailable");
                Vec::new()
            }
        }
    }

    /// Announcements newest first.
    ///
    /// With `only` set just that class is fetched; otherwise every class in
    /// `joined` is fetched concurrently and a failing class contributes
    /// nothing. Each item is stamped with its class id, and with the joined
    /// class name when it carries none of its own.
    pub async fn announcements(
        &self,
        joined: &[StudentClass],
        only: Option<ClassId>,
    ) -> Vec<Announcement> {
        let targets: Vec<&StudentClass> = match only {
            Some(id) => joined.iter().filter(|c| c.class_id == id).collect(),
            None => joined.iter().collect(),
        };

        let mut merged: Vec<Announcement> = match (only, targets.is_empty()) {
            (Some(id), true) => self.fetch_class(id, None).await,
            _ => join_all(
                targets
                    .iter()
                    .map(|c| self.fetch_class(c.class_id, Some(c.class_name.as_str()))),
            )
            .await
            .into_iter()
            .flatten()
            .collect(),
        };

        merged.sort_by_key(|a| std::cmp::Reverse(a.create_time.sort_key()));
        debug!(count = merged.len(), "announcements merged");
        merged
    }

    async fn fetch_class(&self, class: ClassId, name: Option<&str>) -> Vec<Announcement> {
        match self.classes.select_announcements(class).await {
            Ok(items) => items
                .into_iter()
                .map(|mut a| {
                    a.class_id = Some(class);
                    if a.class_name.is_none() {
                        a.class_name = name.map(str::to_owned);
                    }
                    a
                })
                .collect(),
            Err(err) => {
                warn!(%class, error = %err, "announcements unavailable for class");
                Vec::new()
            }
        }
    }

    /// Mark an announcement read. A second call for the same id while the
    /// first is running is dropped.
    pub async fn mark_read(&self, id: AnnouncementId) -> MarkRead {
        let Some(_guard) = InFlight::claim(&self.marking, id) else {
            return MarkRead::InFlight;
        };
        let acknowledged = match self.classes.check_announcement(id).await {
            Ok(ack) => ack.is_success(),
            Err(err) => {
                warn!(announcement = %id, error = %err, "mark read failed");
                false
            }
        };
        MarkRead::Sent { acknowledged }
    }
}

/// Holds an id in the in-flight set until dropped.
struct InFlight<'a> {
    set: &'a Mutex<HashSet<AnnouncementId>>,
    id: AnnouncementId,
}

impl<'a> InFlight<'a> {
    fn claim(set: &'a Mutex<HashSet<AnnouncementId>>, id: AnnouncementId) -> Option<Self> {
        let inserted = set
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(id);
        inserted.then_some(Self { set, id })
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.set
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&self.id);
    }
}
