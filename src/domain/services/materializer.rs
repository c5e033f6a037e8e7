use std::collections::HashSet;
use std::sync::Arc;
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::info;

use crate::domain::{models::session::Session, ports::SessionRepository, services::recurrence};
use crate::error::AppError;

#[derive(Debug, Serialize)]
pub struct MaterializedBatch {
    pub created_count: usize,
    pub created_sessions: Vec<Session>,
}

/// Turns a recurring template into concrete session rows for upcoming
/// occurrences. The template itself is never touched; instances that
/// already exist (same instructor, same title, exact start time) are
/// skipped, so repeated calls are idempotent.
pub struct InstanceMaterializer {
    sessions: Arc<dyn SessionRepository>,
}

impl InstanceMaterializer {
    pub fn new(sessions: Arc<dyn SessionRepository>) -> Self {
        Self { sessions }
    }

    pub async fn generate_instances(
        &self,
        template_id: &str,
        user_id: &str,
        horizon_weeks: u32,
    ) -> Result<MaterializedBatch, AppError> {
        let template = self
            .sessions
            .find_by_id(template_id)
            .await?
            .ok_or(AppError::NotFound("Session not found".to_string()))?;

        if template.instructor_id != user_id {
            return Err(AppError::Forbidden("Only the instructor may generate instances".to_string()));
        }
        if !template.is_recurring {
            return Err(AppError::Validation("Session is not recurring".to_string()));
        }
        let rule = template
            .recurrence_rule
            .as_ref()
            .ok_or(AppError::Validation("Recurring session has no recurrence rule".to_string()))?;
        recurrence::validate_horizon(horizon_weeks).map_err(AppError::Validation)?;

        // The template's own slot is never re-created.
        let occurrences = recurrence::compute_occurrences(template.scheduled_at, &rule.0, horizon_weeks, false);
        let (Some(&from), Some(&to)) = (occurrences.first(), occurrences.last()) else {
            return Ok(MaterializedBatch { created_count: 0, created_sessions: Vec::new() });
        };

        let taken: HashSet<DateTime<Utc>> = self
            .sessions
            .scheduled_times_matching(&template.instructor_id, &template.title, from, to)
            .await?
            .into_iter()
            .collect();

        let mut created_sessions = Vec::new();
        for occurrence in occurrences {
            if taken.contains(&occurrence) {
                continue;
            }
            let instance = template.duplicate_at(occurrence);
            created_sessions.push(self.sessions.create(&instance).await?);
        }

        info!(
            "Materialized {} instances of session {} over {} weeks",
            created_sessions.len(),
            template.id,
            horizon_weeks
        );
        Ok(MaterializedBatch { created_count: created_sessions.len(), created_sessions })
    }
}
