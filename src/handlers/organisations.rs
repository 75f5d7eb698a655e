// src/handlers/organisations.rs

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};

use crate::{
    common::error::{ApiError, ErrorBody},
    config::AppState,
    middleware::{
        api_key::{OrgKey, OrgReadKey, RequireApiKey},
        json::ValidJson,
    },
    models::organisation::{CreateOrganisationPayload, Organisation, UpdateOrganisationPayload},
};

#[utoipa::path(
    post,
    path = "/api/v1/organisations",
    tag = "Organisations",
    request_body = CreateOrganisationPayload,
    responses(
        (status = 201, description = "Organisation created", body = Organisation),
        (status = 400, description = "Invalid payload", body = ErrorBody),
        (status = 401, description = "Invalid API key", body = ErrorBody),
        (status = 409, description = "org_id already in use", body = ErrorBody)
    ),
    security(("api_key" = []))
)]
pub async fn create_organisation(
    State(app_state): State<AppState>,
    _key: RequireApiKey<OrgKey>,
    ValidJson(payload): ValidJson<CreateOrganisationPayload>,
) -> Result<impl IntoResponse, ApiError> {
    let organisation = app_state.organisation_service.create(payload).await?;
    Ok((StatusCode::CREATED, Json(organisation)))
}

/// Replaces an organisation. Deactivating it also deactivates its users.
#[utoipa::path(
    put,
    path = "/api/v1/organisations/{org_id}",
    tag = "Organisations",
    request_body = UpdateOrganisationPayload,
    params(
        ("org_id" = String, Path, description = "Current business key of the organisation")
    ),
    responses(
        (status = 200, description = "Organisation updated", body = Organisation),
        (status = 401, description = "Invalid API key", body = ErrorBody),
        (status = 404, description = "Organisation not found", body = ErrorBody)
    ),
    security(("api_key" = []))
)]
pub async fn update_organisation(
    State(app_state): State<AppState>,
    _key: RequireApiKey<OrgKey>,
    Path(org_id): Path<String>,
    ValidJson(payload): ValidJson<UpdateOrganisationPayload>,
) -> Result<impl IntoResponse, ApiError> {
    let organisation = app_state.organisation_service.update(&org_id, payload).await?;
    Ok(Json(organisation))
}

#[utoipa::path(
    get,
    path = "/api/v1/organisations",
    tag = "Organisations",
    responses(
        (status = 200, description = "All organisations", body = Vec<Organisation>),
        (status = 401, description = "Invalid API key", body = ErrorBody)
    ),
    security(("api_key" = []))
)]
pub async fn list_organisations(
    State(app_state): State<AppState>,
    _key: RequireApiKey<OrgReadKey>,
) -> Result<impl IntoResponse, ApiError> {
    let organisations = app_state.organisation_service.list().await?;
    Ok(Json(organisations))
}
