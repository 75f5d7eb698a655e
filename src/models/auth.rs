// src/models/auth.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::models::user::{Role, User, UserStatus};

// Login credentials; the organisation is part of the identity.
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct LoginPayload {
    #[validate(length(min = 1, message = "username is required"))]
    #[schema(example = "john_doe")]
    pub username: String,

    #[validate(length(min = 1, message = "password is required"))]
    pub password: String,

    #[validate(length(min = 1, message = "org_id is required"))]
    #[schema(example = "ORG1")]
    pub org_id: String,
}

/// Claims carried inside the JWT.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claims {
    pub user_id: String,
    pub uid: Uuid,
    pub username: String,
    pub role: Role,
    pub status: UserStatus,
    pub mobile_number: String,
    pub org_uuid: Uuid,
    pub iat: i64, // Issued at
    pub exp: i64, // Expiration time
}

impl Claims {
    pub fn for_user(user: &User, issued_at: DateTime<Utc>, expires_at: DateTime<Utc>) -> Self {
        Self {
            user_id: user.user_id.clone(),
            uid: user.uid,
            username: user.username.clone(),
            role: user.role,
            status: user.status,
            mobile_number: user.mobile_number.clone(),
            org_uuid: user.org_uuid,
            iat: issued_at.timestamp(),
            exp: expires_at.timestamp(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct LoginResponse {
    pub uid: Uuid,
    pub user_id: String,
    pub username: String,
    pub role: Role,
    pub status: UserStatus,
    pub mobile_number: String,
    pub org_uuid: Uuid,
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct MessageResponse {
    #[schema(example = "Password updated successfully")]
    pub message: String,
}
