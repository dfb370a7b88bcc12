use crate::model::{id::UserId, role::Role};

pub mod event;

#[derive(Debug, PartialEq, Eq)]
pub struct User {
    pub user_id: UserId,
    pub user_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub company: Option<String>,
    pub role: Role,
}

#[derive(Debug, Clone)]
pub struct RideRequester {
    pub user_id: UserId,
    pub user_name: String,
    pub email: String,
    pub company: Option<String>,
}

#[derive(Debug, Clone)]
pub struct ActionAdmin {
    pub user_id: UserId,
    pub user_name: String,
    pub email: String,
}
