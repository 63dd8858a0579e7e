pub mod health;
pub mod metrics;
pub mod orders;
pub mod outbox;
pub mod reporting;
pub mod sessions;
pub mod todolist;
