// src/middleware/tenancy.rs

use axum::{extract::FromRequestParts, http::request::Parts};

use crate::common::error::{ApiError, AppError};

// Header naming the organisation a bearer request acts in.
pub const ORG_ID_HEADER: &str = "org_id";

/// Business key of the organisation the request targets.
#[derive(Debug, Clone)]
pub struct OrganisationHeader(pub String);

impl<S> FromRequestParts<S> for OrganisationHeader
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let value = parts
            .headers
            .get(ORG_ID_HEADER)
            .ok_or_else(|| AppError::BadRequest("The org_id header is required".into()))?;

        let org_id = value
            .to_str()
            .map_err(|_| AppError::BadRequest("The org_id header contains invalid characters".into()))?
            .trim();

        if org_id.is_empty() {
            return Err(AppError::BadRequest("The org_id header is required".into()).into());
        }

        Ok(OrganisationHeader(org_id.to_string()))
    }
}
