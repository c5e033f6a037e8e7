use serde::Serialize;

/// Notification kinds emitted by this service. Delivery is handled by the
/// platform's notification service; these only name the event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NotificationKind {
    SessionCancelled,
    SessionDeleted,
    ParticipantJoined,
    ParticipantLeft,
    StatusChanged,
}

impl NotificationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationKind::SessionCancelled => "SESSION_CANCELLED",
            NotificationKind::SessionDeleted => "SESSION_DELETED",
            NotificationKind::ParticipantJoined => "PARTICIPANT_JOINED",
            NotificationKind::ParticipantLeft => "PARTICIPANT_LEFT",
            NotificationKind::StatusChanged => "STATUS_CHANGED",
        }
    }
}
