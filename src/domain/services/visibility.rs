use std::sync::Arc;
use crate::domain::{
    models::session::{Session, SessionVisibility},
    ports::{ClientDirectory, GroupDirectory, ParticipantRepository},
};
use crate::error::AppError;

/// Decides who may see and who may join a session. Rules are checked in
/// order and the first match wins; an active registration always grants
/// visibility regardless of the session's visibility setting.
pub struct VisibilityEvaluator {
    groups: Arc<dyn GroupDirectory>,
    clients: Arc<dyn ClientDirectory>,
    participants: Arc<dyn ParticipantRepository>,
}

impl VisibilityEvaluator {
    pub fn new(
        groups: Arc<dyn GroupDirectory>,
        clients: Arc<dyn ClientDirectory>,
        participants: Arc<dyn ParticipantRepository>,
    ) -> Self {
        Self { groups, clients, participants }
    }

    pub async fn can_view(&self, session: &Session, user_id: &str) -> Result<bool, AppError> {
        if session.instructor_id == user_id {
            return Ok(true);
        }

        match session.visibility {
            SessionVisibility::Public => return Ok(true),
            SessionVisibility::Group => {
                if let Some(group_id) = &session.group_id
                    && self.groups.is_active_member(group_id, user_id).await?
                {
                    return Ok(true);
                }
            }
            SessionVisibility::Clients => {
                if self.clients.is_active_client(&session.instructor_id, user_id).await? {
                    return Ok(true);
                }
            }
            SessionVisibility::Private => {}
        }

        let registration = self.participants.find(&session.id, user_id).await?;
        Ok(registration.is_some_and(|p| p.status.is_active()))
    }

    /// Join gate: view access plus not being the session's own instructor.
    pub async fn can_join(&self, session: &Session, user_id: &str) -> Result<bool, AppError> {
        if session.instructor_id == user_id {
            return Ok(false);
        }
        self.can_view(session, user_id).await
    }
}
