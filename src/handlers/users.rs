// src/handlers/users.rs

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use uuid::Uuid;

use crate::{
    common::error::{ApiError, ErrorBody},
    config::AppState,
    handlers::parse_uid,
    middleware::{
        api_key::{RequireApiKey, UserKey},
        auth::{AnyRole, RequireRole, UserManagers},
        json::ValidJson,
    },
    models::{
        auth::{LoginPayload, LoginResponse, MessageResponse},
        user::{
            BootstrapUserPayload, CreateUserPayload, Role, SetPasswordPayload, UpdateUserPayload,
            User, UserStatus,
        },
    },
};

#[utoipa::path(
    post,
    path = "/api/v1/users/login",
    tag = "Auth",
    request_body = LoginPayload,
    responses(
        (status = 200, description = "Authenticated", body = LoginResponse),
        (status = 400, description = "Invalid payload", body = ErrorBody),
        (status = 401, description = "Invalid organisation or credentials", body = ErrorBody)
    )
)]
pub async fn login(
    State(app_state): State<AppState>,
    ValidJson(payload): ValidJson<LoginPayload>,
) -> Result<impl IntoResponse, ApiError> {
    let response = app_state.auth_service.login(&payload).await?;
    Ok(Json(response))
}

#[utoipa::path(
    post,
    path = "/api/v1/users",
    tag = "Users",
    request_body = CreateUserPayload,
    params(("org_id" = String, Header, description = "Business key of the caller's organisation")),
    responses(
        (status = 201, description = "User created", body = User),
        (status = 403, description = "Role may not create this user", body = ErrorBody),
        (status = 409, description = "Username already taken", body = ErrorBody)
    ),
    security(("api_jwt" = []))
)]
pub async fn create_user(
    State(app_state): State<AppState>,
    caller: RequireRole<UserManagers>,
    ValidJson(payload): ValidJson<CreateUserPayload>,
) -> Result<impl IntoResponse, ApiError> {
    let user = app_state.user_service.create(&caller, payload).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

#[utoipa::path(
    post,
    path = "/api/v1/users/admin/create",
    tag = "Users",
    request_body = BootstrapUserPayload,
    responses(
        (status = 201, description = "Admin created", body = User),
        (status = 401, description = "Invalid API key", body = ErrorBody),
        (status = 404, description = "Organisation not found", body = ErrorBody)
    ),
    security(("api_key" = []))
)]
pub async fn create_admin(
    State(app_state): State<AppState>,
    _key: RequireApiKey<UserKey>,
    ValidJson(payload): ValidJson<BootstrapUserPayload>,
) -> Result<impl IntoResponse, ApiError> {
    let user = app_state.user_service.bootstrap(payload, Role::Admin).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

#[utoipa::path(
    post,
    path = "/api/v1/users/owner/create",
    tag = "Users",
    request_body = BootstrapUserPayload,
    responses(
        (status = 201, description = "Owner created", body = User),
        (status = 401, description = "Invalid API key", body = ErrorBody),
        (status = 404, description = "Organisation not found", body = ErrorBody)
    ),
    security(("api_key" = []))
)]
pub async fn create_owner(
    State(app_state): State<AppState>,
    _key: RequireApiKey<UserKey>,
    ValidJson(payload): ValidJson<BootstrapUserPayload>,
) -> Result<impl IntoResponse, ApiError> {
    let user = app_state.user_service.bootstrap(payload, Role::Owner).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

#[utoipa::path(
    get,
    path = "/api/v1/users",
    tag = "Users",
    params(("org_id" = String, Header, description = "Business key of the caller's organisation")),
    responses(
        (status = 200, description = "Users of the caller's organisation", body = Vec<User>)
    ),
    security(("api_jwt" = []))
)]
pub async fn list_users(
    State(app_state): State<AppState>,
    caller: RequireRole<UserManagers>,
) -> Result<impl IntoResponse, ApiError> {
    let users = app_state.user_service.list(&caller).await?;
    Ok(Json(users))
}

#[utoipa::path(
    get,
    path = "/api/v1/users/{user_id}",
    tag = "Users",
    params(
        ("user_id" = String, Path, description = "Business identifier of the user"),
        ("org_id" = String, Header, description = "Business key of the caller's organisation")
    ),
    responses(
        (status = 200, description = "User found", body = User),
        (status = 404, description = "User not found", body = ErrorBody)
    ),
    security(("api_jwt" = []))
)]
pub async fn get_user(
    State(app_state): State<AppState>,
    caller: RequireRole<UserManagers>,
    Path(user_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let user = app_state.user_service.find_by_user_id(&caller, &user_id).await?;
    Ok(Json(user))
}

#[utoipa::path(
    put,
    path = "/api/v1/users/uid/{uid}",
    tag = "Users",
    request_body = UpdateUserPayload,
    params(
        ("uid" = Uuid, Path, description = "System identifier of the user"),
        ("org_id" = String, Header, description = "Business key of the caller's organisation")
    ),
    responses(
        (status = 200, description = "User updated", body = User),
        (status = 403, description = "Role may not update this user", body = ErrorBody),
        (status = 404, description = "User not found", body = ErrorBody)
    ),
    security(("api_jwt" = []))
)]
pub async fn update_user(
    State(app_state): State<AppState>,
    caller: RequireRole<UserManagers>,
    Path(uid): Path<String>,
    ValidJson(payload): ValidJson<UpdateUserPayload>,
) -> Result<impl IntoResponse, ApiError> {
    let uid = parse_uid(&uid)?;
    let user = app_state.user_service.update(&caller, uid, payload).await?;
    Ok(Json(user))
}

#[utoipa::path(
    put,
    path = "/api/v1/users/uid/{uid}/setpassword",
    tag = "Users",
    request_body = SetPasswordPayload,
    params(
        ("uid" = Uuid, Path, description = "System identifier of the user"),
        ("org_id" = String, Header, description = "Business key of the caller's organisation")
    ),
    responses(
        (status = 200, description = "Password updated", body = MessageResponse),
        (status = 403, description = "Role may not set this password", body = ErrorBody),
        (status = 404, description = "User not found", body = ErrorBody)
    ),
    security(("api_jwt" = []))
)]
pub async fn set_password(
    State(app_state): State<AppState>,
    caller: RequireRole<AnyRole>,
    Path(uid): Path<String>,
    ValidJson(payload): ValidJson<SetPasswordPayload>,
) -> Result<impl IntoResponse, ApiError> {
    let uid = parse_uid(&uid)?;
    app_state
        .user_service
        .set_password(&caller, uid, &payload.password)
        .await?;
    Ok(Json(MessageResponse { message: "Password updated successfully".into() }))
}

#[utoipa::path(
    get,
    path = "/api/v1/users/roles",
    tag = "Users",
    params(("org_id" = String, Header, description = "Business key of the caller's organisation")),
    responses((status = 200, description = "Every user role", body = Vec<Role>)),
    security(("api_jwt" = []))
)]
pub async fn list_roles(_caller: RequireRole<AnyRole>) -> impl IntoResponse {
    Json(Role::ALL)
}

#[utoipa::path(
    get,
    path = "/api/v1/users/statuses",
    tag = "Users",
    params(("org_id" = String, Header, description = "Business key of the caller's organisation")),
    responses((status = 200, description = "Every user status", body = Vec<UserStatus>)),
    security(("api_jwt" = []))
)]
pub async fn list_statuses(_caller: RequireRole<AnyRole>) -> impl IntoResponse {
    Json(UserStatus::ALL)
}
