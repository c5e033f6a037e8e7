use std::sync::Arc;
use chrono::{DateTime, Duration, Utc};
use serde_json::json;
use tracing::{info, warn};

use crate::domain::{
    models::{
        notification::NotificationKind,
        participant::{ParticipantStatus, SessionParticipant},
        session::{NewSessionParams, Session, SessionPatch, SessionStatus},
    },
    ports::{ClientDirectory, GroupDirectory, MemberSessionQuery, ParticipantRepository, SessionRepository},
    services::{notify::Notifier, recurrence, visibility::VisibilityEvaluator},
};
use crate::error::AppError;

pub const CANCEL_CUTOFF_HOURS: i64 = 2;
pub const CHECK_IN_OPENS_BEFORE_MIN: i64 = 15;
pub const CHECK_IN_CLOSES_AFTER_MIN: i64 = 30;

const MIN_DURATION_MIN: i32 = 5;
const MAX_DURATION_MIN: i32 = 480;
const MAX_PAGE_SIZE: u32 = 100;

pub struct SessionService {
    sessions: Arc<dyn SessionRepository>,
    participants: Arc<dyn ParticipantRepository>,
    groups: Arc<dyn GroupDirectory>,
    clients: Arc<dyn ClientDirectory>,
    visibility: VisibilityEvaluator,
    notifier: Notifier,
}

impl SessionService {
    pub fn new(
        sessions: Arc<dyn SessionRepository>,
        participants: Arc<dyn ParticipantRepository>,
        groups: Arc<dyn GroupDirectory>,
        clients: Arc<dyn ClientDirectory>,
        notifier: Notifier,
    ) -> Self {
        let visibility = VisibilityEvaluator::new(groups.clone(), clients.clone(), participants.clone());

        Self { sessions, participants, groups, clients, visibility, notifier }
    }

    pub async fn create(&self, params: NewSessionParams) -> Result<Session, AppError> {
        validate_duration(params.duration_min)?;
        if let Some(rule) = &params.recurrence_rule {
            rule.validate().map_err(AppError::Validation)?;
        }
        if params.is_recurring && params.recurrence_rule.is_none() {
            return Err(AppError::Validation("Recurring sessions require a recurrence rule".to_string()));
        }
        if let Some(group_id) = &params.group_id
            && !self.groups.is_active_member(group_id, &params.instructor_id).await?
        {
            return Err(AppError::Forbidden("You are not an active member of this group".to_string()));
        }

        let session = Session::new(params);
        let created = self.sessions.create(&session).await?;
        info!("Session created: {} by instructor {}", created.id, created.instructor_id);
        Ok(created)
    }

    pub async fn get_session(&self, session_id: &str, user_id: &str) -> Result<Session, AppError> {
        let session = self.load(session_id).await?;
        if !self.visibility.can_view(&session, user_id).await? {
            return Err(AppError::Forbidden("You do not have access to this session".to_string()));
        }
        Ok(session)
    }

    pub async fn update(&self, session_id: &str, user_id: &str, patch: SessionPatch) -> Result<Session, AppError> {
        let mut session = self.load(session_id).await?;
        ensure_owner(&session, user_id)?;

        let was_cancelled = session.status == SessionStatus::Cancelled;

        if let Some(title) = patch.title {
            session.title = title;
        }
        if let Some(description) = patch.description {
            session.description = description;
        }
        if let Some(session_type) = patch.session_type {
            session.session_type = session_type;
        }
        if let Some(visibility) = patch.visibility {
            session.visibility = visibility;
        }
        if let Some(scheduled_at) = patch.scheduled_at {
            session.scheduled_at = scheduled_at;
        }
        if let Some(duration_min) = patch.duration_min {
            validate_duration(duration_min)?;
            session.duration_min = duration_min;
        }
        if let Some(location) = patch.location {
            session.location = if location.is_empty() { None } else { Some(location) };
        }
        if let Some(max_participants) = patch.max_participants {
            session.max_participants = Some(max_participants);
        }
        if let Some(price) = patch.price {
            session.price = Some(price);
        }
        if let Some(currency) = patch.currency {
            session.currency = currency;
        }
        if let Some(group_id) = patch.group_id {
            if group_id.is_empty() {
                session.group_id = None;
            } else {
                if !self.groups.is_active_member(&group_id, user_id).await? {
                    return Err(AppError::Forbidden("You are not an active member of this group".to_string()));
                }
                session.group_id = Some(group_id);
            }
        }
        if let Some(status) = patch.status {
            session.status = status;
        }
        if let Some(rule) = patch.recurrence_rule {
            rule.validate().map_err(AppError::Validation)?;
            session.recurrence_rule = Some(sqlx::types::Json(rule));
        }
        if let Some(is_recurring) = patch.is_recurring {
            session.is_recurring = is_recurring;
        }
        if session.is_recurring && session.recurrence_rule.is_none() {
            return Err(AppError::Validation("Recurring sessions require a recurrence rule".to_string()));
        }

        session.updated_at = Utc::now();
        let updated = self.sessions.update(&session).await?;

        if !was_cancelled && updated.status == SessionStatus::Cancelled {
            self.notify_participants(&updated, NotificationKind::SessionCancelled).await;
        }

        Ok(updated)
    }

    pub async fn delete(&self, session_id: &str, user_id: &str) -> Result<(), AppError> {
        let session = self.load(session_id).await?;
        ensure_owner(&session, user_id)?;

        // Only a session that actually went away gets announced.
        self.sessions.soft_delete(&session.id, Utc::now()).await?;
        self.notify_participants(&session, NotificationKind::SessionDeleted).await;
        info!("Session deleted: {}", session.id);
        Ok(())
    }

    pub async fn clone_session(
        &self,
        session_id: &str,
        user_id: &str,
        scheduled_at: DateTime<Utc>,
    ) -> Result<Session, AppError> {
        let session = self.load(session_id).await?;
        ensure_owner(&session, user_id)?;

        let copy = session.duplicate_at(scheduled_at);
        let created = self.sessions.create(&copy).await?;
        info!("Session {} cloned as {}", session.id, created.id);
        Ok(created)
    }

    pub async fn join_session(&self, session_id: &str, user_id: &str) -> Result<SessionParticipant, AppError> {
        let session = self.load(session_id).await?;
        if session.instructor_id == user_id {
            return Err(AppError::Validation("Instructors cannot join their own session".to_string()));
        }
        if !self.visibility.can_join(&session, user_id).await? {
            return Err(AppError::Forbidden("You do not have access to this session".to_string()));
        }

        let participant = self.participants.register(&session.id, user_id).await?;

        self.notifier.dispatch(
            &session.instructor_id,
            NotificationKind::ParticipantJoined,
            json!({
                "session_id": session.id,
                "session_title": session.title,
                "user_id": user_id,
            }),
        );
        info!("User {} joined session {}", user_id, session.id);
        Ok(participant)
    }

    pub async fn leave_session(&self, session_id: &str, user_id: &str) -> Result<SessionParticipant, AppError> {
        let now = Utc::now();
        let session = self.load(session_id).await?;
        let mut registration = self
            .participants
            .find(&session.id, user_id)
            .await?
            .filter(|p| p.status.is_active())
            .ok_or(AppError::NotFound("No active registration for this session".to_string()))?;

        match registration.status {
            ParticipantStatus::Registered | ParticipantStatus::Confirmed => {}
            _ => {
                return Err(AppError::Conflict("Registration can no longer be cancelled".to_string()));
            }
        }

        let cutoff = session.scheduled_at - Duration::hours(CANCEL_CUTOFF_HOURS);
        if now > cutoff {
            return Err(AppError::Conflict(format!(
                "Cancellations must be made at least {} hours before the session starts",
                CANCEL_CUTOFF_HOURS
            )));
        }

        registration.status = ParticipantStatus::Cancelled;
        registration.updated_at = now;
        let updated = self.participants.update(&registration).await?;

        self.notifier.dispatch(
            &session.instructor_id,
            NotificationKind::ParticipantLeft,
            json!({
                "session_id": session.id,
                "session_title": session.title,
                "user_id": user_id,
            }),
        );
        info!("User {} left session {}", user_id, session.id);
        Ok(updated)
    }

    pub async fn confirm_registration(&self, session_id: &str, user_id: &str) -> Result<SessionParticipant, AppError> {
        let session = self.load(session_id).await?;
        let mut registration = self
            .participants
            .find(&session.id, user_id)
            .await?
            .filter(|p| p.status.is_active())
            .ok_or(AppError::NotFound("No active registration for this session".to_string()))?;

        if registration.status != ParticipantStatus::Registered {
            return Err(AppError::Conflict("Registration is not awaiting confirmation".to_string()));
        }

        registration.status = ParticipantStatus::Confirmed;
        registration.updated_at = Utc::now();
        self.participants.update(&registration).await
    }

    pub async fn self_check_in(&self, session_id: &str, user_id: &str) -> Result<SessionParticipant, AppError> {
        let now = Utc::now();
        let session = self.load(session_id).await?;
        let mut registration = self
            .participants
            .find(&session.id, user_id)
            .await?
            .filter(|p| p.status.is_active())
            .ok_or(AppError::NotFound("No active registration for this session".to_string()))?;

        match registration.status {
            ParticipantStatus::Registered | ParticipantStatus::Confirmed => {}
            _ => {
                return Err(AppError::Conflict("Registration is not eligible for check-in".to_string()));
            }
        }

        let opens = session.scheduled_at - Duration::minutes(CHECK_IN_OPENS_BEFORE_MIN);
        let closes = session.scheduled_at + Duration::minutes(CHECK_IN_CLOSES_AFTER_MIN);
        if now < opens || now > closes {
            return Err(AppError::Conflict(format!(
                "Check-in is open from {} minutes before to {} minutes after the session starts",
                CHECK_IN_OPENS_BEFORE_MIN, CHECK_IN_CLOSES_AFTER_MIN
            )));
        }

        registration.status = ParticipantStatus::Attended;
        registration.checked_in_at = Some(now);
        registration.updated_at = now;
        let updated = self.participants.update(&registration).await?;
        info!("User {} checked in to session {}", user_id, session.id);
        Ok(updated)
    }

    pub async fn update_participant_status(
        &self,
        session_id: &str,
        participant_user_id: &str,
        user_id: &str,
        new_status: ParticipantStatus,
    ) -> Result<SessionParticipant, AppError> {
        let now = Utc::now();
        let session = self.load(session_id).await?;
        ensure_owner(&session, user_id)?;

        let mut registration = self
            .participants
            .find(&session.id, participant_user_id)
            .await?
            .ok_or(AppError::NotFound("Participant not found for this session".to_string()))?;

        let changed = registration.status != new_status;
        if new_status == ParticipantStatus::Attended && registration.checked_in_at.is_none() {
            registration.checked_in_at = Some(now);
        }
        registration.status = new_status;
        registration.updated_at = now;
        let updated = self.participants.update(&registration).await?;

        if changed {
            self.notifier.dispatch(
                participant_user_id,
                NotificationKind::StatusChanged,
                json!({
                    "session_id": session.id,
                    "session_title": session.title,
                    "status": updated.status,
                }),
            );
        }
        Ok(updated)
    }

    pub async fn list_participants(&self, session_id: &str, user_id: &str) -> Result<Vec<SessionParticipant>, AppError> {
        let session = self.load(session_id).await?;
        ensure_owner(&session, user_id)?;
        self.participants.list_by_session(&session.id).await
    }

    pub async fn my_sessions(&self, user_id: &str, page: u32, limit: u32) -> Result<Vec<Session>, AppError> {
        let group_ids = self.groups.list_group_ids(user_id).await?;
        let client_instructor_ids = self.clients.list_active_instructor_ids(user_id).await?;
        let (limit, offset) = page_bounds(page, limit);

        self.sessions
            .list_for_member(&MemberSessionQuery {
                user_id: user_id.to_string(),
                group_ids,
                client_instructor_ids,
                limit,
                offset,
            })
            .await
    }

    pub async fn discover(&self, page: u32, limit: u32, search: Option<&str>) -> Result<Vec<Session>, AppError> {
        let (limit, offset) = page_bounds(page, limit);
        self.sessions.list_public_upcoming(Utc::now(), search, limit, offset).await
    }

    pub async fn preview_occurrences(
        &self,
        session_id: &str,
        user_id: &str,
        weeks: u32,
    ) -> Result<Vec<DateTime<Utc>>, AppError> {
        let session = self.load(session_id).await?;
        if !self.visibility.can_view(&session, user_id).await? {
            return Err(AppError::Forbidden("You do not have access to this session".to_string()));
        }
        let rule = session
            .recurrence_rule
            .as_ref()
            .ok_or(AppError::Validation("Session has no recurrence rule".to_string()))?;
        recurrence::validate_horizon(weeks).map_err(AppError::Validation)?;

        Ok(recurrence::compute_occurrences(session.scheduled_at, &rule.0, weeks, true))
    }

    async fn load(&self, session_id: &str) -> Result<Session, AppError> {
        self.sessions
            .find_by_id(session_id)
            .await?
            .ok_or(AppError::NotFound("Session not found".to_string()))
    }

    // The caller's write has already landed; a failed roster read only
    // costs the fan-out, never the operation's result.
    async fn notify_participants(&self, session: &Session, kind: NotificationKind) {
        let participants = match self.participants.list_by_session(&session.id).await {
            Ok(rows) => rows,
            Err(err) => {
                warn!("Skipping {} fan-out for session {}: {}", kind.as_str(), session.id, err);
                return;
            }
        };
        let context = json!({
            "session_id": session.id,
            "session_title": session.title,
            "scheduled_at": session.scheduled_at.to_rfc3339(),
        });

        let mut notified = 0;
        for participant in participants.iter().filter(|p| p.status.is_active()) {
            self.notifier.dispatch(&participant.user_id, kind, context.clone());
            notified += 1;
        }
        info!("Dispatched {} notification to {} participants of session {}", kind.as_str(), notified, session.id);
    }
}

fn ensure_owner(session: &Session, user_id: &str) -> Result<(), AppError> {
    if session.instructor_id != user_id {
        return Err(AppError::Forbidden("Only the instructor may manage this session".to_string()));
    }
    Ok(())
}

fn validate_duration(duration_min: i32) -> Result<(), AppError> {
    if !(MIN_DURATION_MIN..=MAX_DURATION_MIN).contains(&duration_min) {
        return Err(AppError::Validation(format!(
            "Duration must be between {} and {} minutes",
            MIN_DURATION_MIN, MAX_DURATION_MIN
        )));
    }
    Ok(())
}

fn page_bounds(page: u32, limit: u32) -> (i64, i64) {
    let page = page.max(1) as i64;
    let limit = limit.clamp(1, MAX_PAGE_SIZE) as i64;
    (limit, (page - 1) * limit)
}
