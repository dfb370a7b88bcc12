pub mod analytics;
pub mod auth;
pub mod ride;
pub mod simulation;
pub mod user;
