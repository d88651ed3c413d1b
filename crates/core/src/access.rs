//! Collaborator interfaces and the template visibility filter.
//!
//! The permission engine and the project/tracker registry live outside this
//! crate. They are injected as trait objects so the filter can be exercised
//! with a stub oracle.

use async_trait::async_trait;

use crate::error::CoreError;
use crate::note_template::Visibility;
use crate::positioning::{sort_by_position, Positioned};
use crate::types::DbId;

/// The fields a permission decision may depend on.
#[derive(Debug, Clone, Copy)]
pub struct TemplateRef<'a> {
    pub id: DbId,
    pub project_id: DbId,
    pub tracker_id: DbId,
    pub author_id: Option<DbId>,
    pub visibility: Visibility,
    pub role_ids: &'a [DbId],
}

/// Authoritative permission checks.
#[async_trait]
pub trait PermissionOracle: Send + Sync {
    /// May `user_id` see a restricted template in listings?
    async fn can_view(&self, user_id: DbId, template: TemplateRef<'_>) -> Result<bool, CoreError>;

    /// May `user_id` create, edit, reorder, or delete templates in the project?
    async fn can_manage(&self, user_id: DbId, project_id: DbId) -> Result<bool, CoreError>;

    /// May `user_id` list and load templates in the project at all?
    async fn can_show(&self, user_id: DbId, project_id: DbId) -> Result<bool, CoreError>;
}

/// Knows which trackers are enabled for which project.
#[async_trait]
pub trait TrackerRegistry: Send + Sync {
    async fn tracker_enabled(&self, project_id: DbId, tracker_id: DbId)
        -> Result<bool, CoreError>;
}

/// A stored template the filter can judge.
pub trait FilterCandidate: Positioned {
    fn template_ref(&self) -> TemplateRef<'_>;
    fn is_enabled(&self) -> bool;
}

/// Selects the templates visible to one user in one `(project, tracker)` group.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VisibilityFilter {
    pub user_id: DbId,
    pub project_id: DbId,
    pub tracker_id: DbId,
}

impl VisibilityFilter {
    pub fn new(user_id: DbId, project_id: DbId, tracker_id: DbId) -> Self {
        Self {
            user_id,
            project_id,
            tracker_id,
        }
    }

    /// Group membership and `enabled`, no permission check.
    pub fn matches_base<T: FilterCandidate>(&self, candidate: &T) -> bool {
        let t = candidate.template_ref();
        t.project_id == self.project_id && t.tracker_id == self.tracker_id && candidate.is_enabled()
    }

    /// Whether `candidate` is visible. Restricted templates cost one oracle call.
    pub async fn admits<T: FilterCandidate>(
        &self,
        candidate: &T,
        oracle: &dyn PermissionOracle,
    ) -> Result<bool, CoreError> {
        if !self.matches_base(candidate) {
            return Ok(false);
        }
        let template = candidate.template_ref();
        if !template.visibility.is_restricted() {
            return Ok(true);
        }
        oracle.can_view(self.user_id, template).await
    }

    /// Keep the visible candidates, ordered by position.
    pub async fn apply<T: FilterCandidate>(
        &self,
        candidates: Vec<T>,
        oracle: &dyn PermissionOracle,
    ) -> Result<Vec<T>, CoreError> {
        let mut visible = Vec::with_capacity(candidates.len());
        for candidate in candidates {
            if self.admits(&candidate, oracle).await? {
                visible.push(candidate);
            }
        }
        sort_by_position(&mut visible);
        Ok(visible)
    }
}
