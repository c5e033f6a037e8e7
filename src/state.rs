use std::sync::Arc;
use crate::domain::ports::{
    ClientDirectory, GroupDirectory, NotificationSender, ParticipantRepository,
    SessionRepository,
};
use crate::domain::services::materializer::InstanceMaterializer;
use crate::domain::services::session_service::SessionService;
use crate::config::Config;

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub session_repo: Arc<dyn SessionRepository>,
    pub participant_repo: Arc<dyn ParticipantRepository>,
    pub group_directory: Arc<dyn GroupDirectory>,
    pub client_directory: Arc<dyn ClientDirectory>,
    pub notification_sender: Arc<dyn NotificationSender>,
    pub session_service: Arc<SessionService>,
    pub materializer: Arc<InstanceMaterializer>,
}
