// src/middleware/auth.rs

use std::marker::PhantomData;

use axum::{
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};
use axum_extra::{
    headers::{authorization::Bearer, Authorization},
    TypedHeader,
};

use crate::{
    common::error::{ApiError, AppError},
    config::AppState,
    middleware::tenancy::OrganisationHeader,
    models::user::Role,
    services::AuthContext,
};

/// The set of roles a route admits.
pub trait RolePolicy: Send + Sync + 'static {
    const ALLOWED: &'static [Role];
}

/// Bearer-token guard. Resolves the caller, checks the `org_id` header
/// against the token and admits only the roles of `P`.
pub struct RequireRole<P> {
    pub ctx: AuthContext,
    _policy: PhantomData<P>,
}

impl<P> std::ops::Deref for RequireRole<P> {
    type Target = AuthContext;

    fn deref(&self) -> &Self::Target {
        &self.ctx
    }
}

impl<P, S> FromRequestParts<S> for RequireRole<P>
where
    P: RolePolicy,
    S: Send + Sync,
    AppState: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let app_state = AppState::from_ref(state);

        // A. Bearer token
        let TypedHeader(Authorization(bearer)) =
            TypedHeader::<Authorization<Bearer>>::from_request_parts(parts, state)
                .await
                .map_err(|_| AppError::MissingToken)?;
        let claims = app_state.auth_service.verify_token(bearer.token())?;

        // B. Organisation, user and their statuses
        let OrganisationHeader(org_id) = OrganisationHeader::from_request_parts(parts, state).await?;
        let ctx = app_state.auth_service.resolve(claims, &org_id).await?;

        // C. Role
        if !P::ALLOWED.contains(&ctx.user.role) {
            tracing::warn!(
                uid = %ctx.user.uid,
                role = %ctx.user.role,
                path = %parts.uri.path(),
                "role not allowed on route"
            );
            return Err(AppError::Forbidden(format!(
                "Access denied: role '{}' is not allowed",
                ctx.user.role
            ))
            .into());
        }

        Ok(RequireRole { ctx, _policy: PhantomData })
    }
}

// ---
// ROUTE POLICIES
// ---

/// Routes that create, list, read or update users.
pub struct UserManagers;
impl RolePolicy for UserManagers {
    const ALLOWED: &'static [Role] = &[
        Role::Admin,
        Role::Owner,
        Role::OperationsLead,
        Role::OperationsExecutive,
    ];
}

/// Prospect creation: everyone except field executives.
pub struct ProspectCreators;
impl RolePolicy for ProspectCreators {
    const ALLOWED: &'static [Role] = &[
        Role::Admin,
        Role::Owner,
        Role::OperationsLead,
        Role::OperationsExecutive,
        Role::FieldLead,
    ];
}

pub struct AnyRole;
impl RolePolicy for AnyRole {
    const ALLOWED: &'static [Role] = Role::ALL;
}
