pub mod cache;
pub mod matchmaking;
pub mod notify;
pub mod opponent;
pub mod queue;
