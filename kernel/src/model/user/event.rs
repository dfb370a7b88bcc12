use crate::model::id::UserId;

pub struct CreateUser {
    pub user_name: String,
    pub email: String,
    pub password: String,
    pub phone: Option<String>,
    pub company: Option<String>,
}

#[derive(Debug)]
pub struct UpdateUserProfile {
    pub user_id: UserId,
    pub user_name: Option<String>,
    pub phone: Option<String>,
    pub company: Option<String>,
}

pub struct UpdateUserPassword {
    pub user_id: UserId,
    pub current_password: String,
    pub new_password: String,
}
