pub mod notification;
pub mod participant;
pub mod session;
