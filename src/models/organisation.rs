// src/models/organisation.rs

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::models::text_enum;

text_enum! {
    /// Lifecycle of a tenant organisation.
    pub enum OrganisationStatus {
        Created => "Created",
        Active => "Active",
        InActive => "InActive",
    }
}

impl Default for OrganisationStatus {
    fn default() -> Self {
        OrganisationStatus::Created
    }
}

/// Tenant boundary owning a set of users.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Organisation {
    #[schema(example = "ORG1")]
    pub org_id: String,

    #[schema(example = "550e8400-e29b-41d4-a716-446655440000")]
    pub org_uuid: Uuid,

    #[schema(example = "Acme Corp")]
    pub org_name: String,

    pub status: OrganisationStatus,
}

impl Organisation {
    pub fn is_active(&self) -> bool {
        self.status == OrganisationStatus::Active
    }
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateOrganisationPayload {
    #[validate(length(min = 1, message = "org_id is required"))]
    #[schema(example = "ORG1")]
    pub org_id: String,

    #[validate(length(min = 1, message = "org_name is required"))]
    #[schema(example = "Acme Corp")]
    pub org_name: String,

    // Defaults to Created.
    #[serde(default)]
    pub status: Option<OrganisationStatus>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateOrganisationPayload {
    #[validate(length(min = 1, message = "org_id is required"))]
    #[schema(example = "ORG1")]
    pub org_id: String,

    #[validate(length(min = 1, message = "org_name is required"))]
    #[schema(example = "Acme Corp")]
    pub org_name: String,

    pub status: OrganisationStatus,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_wire_strings() {
        assert_eq!(serde_json::to_string(&OrganisationStatus::InActive).unwrap(), "\"InActive\"");
        assert_eq!("Active".parse::<OrganisationStatus>().unwrap(), OrganisationStatus::Active);
        assert!("Inactive".parse::<OrganisationStatus>().is_err());
    }

    #[test]
    fn create_payload_status_is_optional() {
        let payload: CreateOrganisationPayload =
            serde_json::from_str(r#"{"org_id":"ORG1","org_name":"Acme"}"#).unwrap();
        assert!(payload.status.is_none());
        assert!(payload.validate().is_ok());
    }
}
