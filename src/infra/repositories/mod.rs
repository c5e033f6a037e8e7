pub mod sqlite_client_directory;
pub mod sqlite_group_directory;
pub mod sqlite_participant_repo;
pub mod sqlite_session_repo;

pub mod postgres_client_directory;
pub mod postgres_group_directory;
pub mod postgres_participant_repo;
pub mod postgres_session_repo;
