use derive_new::new;
use garde::Validate;
use kernel::model::{
    id::UserId,
    role::Role,
    user::{
        event::{CreateUser, UpdateUserPassword, UpdateUserProfile},
        User,
    },
};
use serde::{Deserialize, Serialize};
use strum::VariantNames;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, VariantNames)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum RoleName {
    Admin,
    User,
}

impl From<Role> for RoleName {
    fn from(value: Role) -> Self {
        match value {
            Role::Admin => Self::Admin,
            Role::User => Self::User,
        }
    }
}

impl From<RoleName> for Role {
    fn from(value: RoleName) -> Self {
        match value {
            RoleName::Admin => Self::Admin,
            RoleName::User => Self::User,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UsersResponse {
    pub items: Vec<UserResponse>,
}

impl From<Vec<User>> for UsersResponse {
    fn from(value: Vec<User>) -> Self {
        Self {
            items: value.into_iter().map(UserResponse::from).collect(),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub user_id: UserId,
    pub user_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub company: Option<String>,
    pub role: RoleName,
}

impl From<User> for UserResponse {
    fn from(value: User) -> Self {
        let User {
            user_id,
            user_name,
            email,
            phone,
            company,
            role,
        } = value;
        Self {
            user_id,
            user_name,
            email,
            phone,
            company,
            role: RoleName::from(role),
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserRequest {
    #[garde(length(min = 2))]
    pub name: String,
    #[garde(email)]
    pub email: String,
    #[garde(length(min = 6))]
    pub password: String,
    #[garde(skip)]
    pub phone: Option<String>,
    #[garde(inner(length(min = 2)))]
    pub company: Option<String>,
}

impl From<CreateUserRequest> for CreateUser {
    fn from(value: CreateUserRequest) -> Self {
        let CreateUserRequest {
            name,
            email,
            password,
            phone,
            company,
        } = value;
        Self {
            user_name: name,
            email,
            password,
            phone,
            company,
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserProfileRequest {
    #[garde(inner(length(min = 2)))]
    pub name: Option<String>,
    #[garde(skip)]
    pub phone: Option<String>,
    #[garde(inner(length(min = 2)))]
    pub company: Option<String>,
}

#[derive(new)]
pub struct UpdateUserProfileRequestWithUserId(UserId, UpdateUserProfileRequest);

impl From<UpdateUserProfileRequestWithUserId> for UpdateUserProfile {
    fn from(value: UpdateUserProfileRequestWithUserId) -> Self {
        let UpdateUserProfileRequestWithUserId(
            user_id,
            UpdateUserProfileRequest {
                name,
                phone,
                company,
            },
        ) = value;
        UpdateUserProfile {
            user_id,
            user_name: name,
            phone,
            company,
        }
    }
}

#[derive(Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserPasswordRequest {
    #[garde(length(min = 1))]
    current_password: String,
    #[garde(length(min = 6))]
    new_password: String,
}

#[derive(new)]
pub struct UpdateUserPasswordRequestWithUserId(UserId, UpdateUserPasswordRequest);

impl From<UpdateUserPasswordRequestWithUserId> for UpdateUserPassword {
    fn from(value: UpdateUserPasswordRequestWithUserId) -> Self {
        let UpdateUserPasswordRequestWithUserId(
            user_id,
            UpdateUserPasswordRequest {
                current_password,
                new_password,
            },
        ) = value;
        UpdateUserPassword {
            user_id,
            current_password,
            new_password,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registration_enforces_the_field_rules() {
        let req: CreateUserRequest = serde_json::from_value(serde_json::json!({
            "name": "J",
            "email": "john@example.com",
            "password": "password123"
        }))
        .unwrap();
        assert!(req.validate(&()).is_err());

        let req: CreateUserRequest = serde_json::from_value(serde_json::json!({
            "name": "John Doe",
            "email": "not-an-email",
            "password": "password123"
        }))
        .unwrap();
        assert!(req.validate(&()).is_err());

        let req: CreateUserRequest = serde_json::from_value(serde_json::json!({
            "name": "John Doe",
            "email": "john@example.com",
            "password": "short"
        }))
        .unwrap();
        assert!(req.validate(&()).is_err());

        let req: CreateUserRequest = serde_json::from_value(serde_json::json!({
            "name": "John Doe",
            "email": "john@example.com",
            "password": "password123",
            "company": "Tech Corp"
        }))
        .unwrap();
        assert!(req.validate(&()).is_ok());
    }
}
