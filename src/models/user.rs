// src/models/user.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::models::{history::UpdateHistory, organisation::OrganisationStatus, text_enum};

text_enum! {
    /// Operator role; the hierarchy between roles lives in `services::rbac`.
    pub enum Role {
        Admin => "Admin",
        OperationsLead => "Operations Lead",
        FieldLead => "Field Lead",
        FieldExecutive => "Field Executive",
        Owner => "Owner",
        OperationsExecutive => "Operations Executive",
    }
}

text_enum! {
    pub enum UserStatus {
        Created => "Created",
        Confirmed => "Confirmed",
        Verified => "Verified",
        Active => "Active",
        Inactive => "Inactive",
        Disabled => "Disabled",
        Banned => "Banned",
    }
}

impl UserStatus {
    /// Statuses a successful login promotes to `Active`.
    pub fn activates_on_login(&self) -> bool {
        matches!(self, UserStatus::Created | UserStatus::Confirmed | UserStatus::Verified)
    }
}

/// A user as stored. The password hash never leaves the server.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct User {
    pub uid: Uuid,

    #[schema(example = "112345")]
    pub user_id: String,

    #[schema(example = "john_doe")]
    pub username: String,

    #[serde(skip_serializing)]
    #[schema(ignore)]
    pub password_hash: String,

    pub role: Role,
    pub status: UserStatus,

    #[schema(example = "9876543210")]
    pub mobile_number: String,

    pub org_uuid: Uuid,
    pub org_status: OrganisationStatus,

    #[schema(example = "User is active and verified")]
    pub remarks: String,

    pub created_time: DateTime<Utc>,
    pub updated_time: DateTime<Utc>,
    pub update_history: Vec<UpdateHistory>,
}

impl User {
    pub fn is_active(&self) -> bool {
        self.status == UserStatus::Active
    }
}

// ---
// Payloads
// ---

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateUserPayload {
    #[validate(length(min = 1, message = "user_id is required"))]
    #[schema(example = "112345")]
    pub user_id: String,

    #[validate(length(min = 1, message = "username is required"))]
    #[schema(example = "john_doe")]
    pub username: String,

    #[validate(length(min = 6, message = "Password must be at least 6 characters"))]
    pub password: String,

    pub role: Role,

    #[serde(default)]
    pub mobile_number: String,

    #[serde(default)]
    pub remarks: String,
}

/// Creates the first privileged account of an organisation (API-key protected).
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct BootstrapUserPayload {
    #[validate(length(min = 1, message = "org_id is required"))]
    #[schema(example = "ORG1")]
    pub org_id: String,

    #[validate(length(min = 1, message = "user_id is required"))]
    pub user_id: String,

    #[validate(length(min = 1, message = "username is required"))]
    pub username: String,

    #[validate(length(min = 6, message = "Password must be at least 6 characters"))]
    pub password: String,

    #[serde(default)]
    pub mobile_number: String,

    #[serde(default)]
    pub remarks: String,
}

/// Full replacement of the editable user fields.
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct UpdateUserPayload {
    #[validate(length(min = 1, message = "user_id is required"))]
    pub user_id: String,

    #[validate(length(min = 1, message = "username is required"))]
    pub username: String,

    pub role: Role,
    pub status: UserStatus,

    #[serde(default)]
    pub mobile_number: String,

    #[serde(default)]
    pub remarks: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct SetPasswordPayload {
    #[validate(length(min = 6, message = "Password must be at least 6 characters"))]
    pub password: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_wire_strings_contain_spaces() {
        assert_eq!(serde_json::to_string(&Role::OperationsLead).unwrap(), "\"Operations Lead\"");
        let role: Role = serde_json::from_str("\"Field Executive\"").unwrap();
        assert_eq!(role, Role::FieldExecutive);
        assert!(serde_json::from_str::<Role>("\"FieldExecutive\"").is_err());
    }

    #[test]
    fn login_promotes_only_pre_active_statuses() {
        let promoted: Vec<_> = UserStatus::ALL
            .iter()
            .filter(|s| s.activates_on_login())
            .collect();
        assert_eq!(promoted, [&UserStatus::Created, &UserStatus::Confirmed, &UserStatus::Verified]);
    }

    #[test]
    fn password_hash_is_never_serialised() {
        let user = User {
            uid: Uuid::new_v4(),
            user_id: "u1".into(),
            username: "alice".into(),
            password_hash: "$2b$04$secret".into(),
            role: Role::Owner,
            status: UserStatus::Active,
            mobile_number: String::new(),
            org_uuid: Uuid::new_v4(),
            org_status: OrganisationStatus::Active,
            remarks: String::new(),
            created_time: Utc::now(),
            updated_time: Utc::now(),
            update_history: vec![],
        };
        let json = serde_json::to_value(&user).unwrap();
        assert!(json.get("password_hash").is_none());
        assert!(json.get("password").is_none());
        assert_eq!(json["role"], "Owner");
    }
}
