pub mod admin;
pub mod auth;
pub mod health;
pub mod ride;
pub mod simulation;
pub mod user;
pub mod v1;
