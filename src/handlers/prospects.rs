// src/handlers/prospects.rs

use axum::{
    extract::{rejection::QueryRejection, Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use utoipa::IntoParams;
use uuid::Uuid;

use crate::{
    common::error::{ApiError, AppError, ErrorBody},
    config::AppState,
    db::Pagination,
    handlers::parse_uid,
    middleware::{
        auth::{AnyRole, ProspectCreators, RequireRole},
        json::ValidJson,
    },
    models::prospect::{Prospect, ProspectCount, ProspectPayload},
};

/// `skip`/`limit` as received; validated into a [`Pagination`].
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct PageParams {
    /// Number of prospects to skip (default 0)
    pub skip: Option<String>,
    /// Maximum number of prospects to return (default 10, 0 for all)
    pub limit: Option<String>,
}

impl PageParams {
    pub fn into_pagination(self) -> Result<Pagination, AppError> {
        let defaults = Pagination::default();
        Ok(Pagination {
            skip: parse_window("skip", self.skip, defaults.skip)?,
            limit: parse_window("limit", self.limit, defaults.limit)?,
        })
    }
}

fn parse_window(name: &str, raw: Option<String>, default: u64) -> Result<u64, AppError> {
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(default),
        Some(value) => value.parse::<u64>().map_err(|_| {
            AppError::BadRequest(format!("Invalid '{name}' parameter: must be a non-negative integer"))
        }),
    }
}

#[utoipa::path(
    post,
    path = "/api/v1/prospects",
    tag = "Prospects",
    request_body = ProspectPayload,
    params(("org_id" = String, Header, description = "Business key of the caller's organisation")),
    responses(
        (status = 201, description = "Prospect created", body = Prospect),
        (status = 400, description = "Invalid payload", body = ErrorBody),
        (status = 403, description = "Role may not create prospects", body = ErrorBody)
    ),
    security(("api_jwt" = []))
)]
pub async fn create_prospect(
    State(app_state): State<AppState>,
    caller: RequireRole<ProspectCreators>,
    ValidJson(payload): ValidJson<ProspectPayload>,
) -> Result<impl IntoResponse, ApiError> {
    let prospect = app_state.prospect_service.create(&caller, payload).await?;
    Ok((StatusCode::CREATED, Json(prospect)))
}

#[utoipa::path(
    get,
    path = "/api/v1/prospects/{uid}",
    tag = "Prospects",
    params(
        ("uid" = Uuid, Path, description = "System identifier of the prospect"),
        ("org_id" = String, Header, description = "Business key of the caller's organisation")
    ),
    responses(
        (status = 200, description = "Prospect found", body = Prospect),
        (status = 404, description = "Prospect not found", body = ErrorBody)
    ),
    security(("api_jwt" = []))
)]
pub async fn get_prospect(
    State(app_state): State<AppState>,
    _caller: RequireRole<AnyRole>,
    Path(uid): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let prospect = app_state.prospect_service.find(parse_uid(&uid)?).await?;
    Ok(Json(prospect))
}

/// Full replacement; the change summary lands in `update_history`.
#[utoipa::path(
    put,
    path = "/api/v1/prospects/{uid}",
    tag = "Prospects",
    request_body = ProspectPayload,
    params(
        ("uid" = Uuid, Path, description = "System identifier of the prospect"),
        ("org_id" = String, Header, description = "Business key of the caller's organisation")
    ),
    responses(
        (status = 200, description = "Prospect updated", body = Prospect),
        (status = 404, description = "Prospect not found", body = ErrorBody)
    ),
    security(("api_jwt" = []))
)]
pub async fn update_prospect(
    State(app_state): State<AppState>,
    caller: RequireRole<AnyRole>,
    Path(uid): Path<String>,
    ValidJson(payload): ValidJson<ProspectPayload>,
) -> Result<impl IntoResponse, ApiError> {
    let uid = parse_uid(&uid)?;
    let prospect = app_state.prospect_service.update(&caller, uid, payload).await?;
    Ok(Json(prospect))
}

#[utoipa::path(
    get,
    path = "/api/v1/prospects",
    tag = "Prospects",
    params(
        PageParams,
        ("org_id" = String, Header, description = "Business key of the caller's organisation")
    ),
    responses(
        (status = 200, description = "One page of prospects in creation order", body = Vec<Prospect>),
        (status = 400, description = "Invalid skip or limit", body = ErrorBody)
    ),
    security(("api_jwt" = []))
)]
pub async fn list_prospects(
    State(app_state): State<AppState>,
    _caller: RequireRole<AnyRole>,
    params: Result<Query<PageParams>, QueryRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Query(params) = params.map_err(|rejection| AppError::BadRequest(rejection.body_text()))?;
    let prospects = app_state.prospect_service.list(params.into_pagination()?).await?;
    Ok(Json(prospects))
}

#[utoipa::path(
    get,
    path = "/api/v1/prospects/count",
    tag = "Prospects",
    params(("org_id" = String, Header, description = "Business key of the caller's organisation")),
    responses((status = 200, description = "Total number of prospects", body = ProspectCount)),
    security(("api_jwt" = []))
)]
pub async fn count_prospects(
    State(app_state): State<AppState>,
    _caller: RequireRole<AnyRole>,
) -> Result<impl IntoResponse, ApiError> {
    let count = app_state.prospect_service.count().await?;
    Ok(Json(ProspectCount { count }))
}
