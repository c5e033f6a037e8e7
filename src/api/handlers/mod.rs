pub mod health;
pub mod participant;
pub mod recurrence;
pub mod session;
