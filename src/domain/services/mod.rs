pub mod materializer;
pub mod notify;
pub mod recurrence;
pub mod session_service;
pub mod visibility;
