// src/middleware/api_key.rs

use std::marker::PhantomData;

use axum::{
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};
use subtle::ConstantTimeEq;

use crate::{
    common::error::{ApiError, AppError},
    config::{AppConfig, AppState},
};

pub const API_KEY_HEADER: &str = "x-api-key";

/// Which configured keys a route accepts.
pub trait ApiKeyScope: Send + Sync + 'static {
    fn keys(config: &AppConfig) -> Vec<&str>;
}

/// Static shared-secret guard for administrative routes.
pub struct RequireApiKey<K>(PhantomData<K>);

impl<K, S> FromRequestParts<S> for RequireApiKey<K>
where
    K: ApiKeyScope,
    S: Send + Sync,
    AppState: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let app_state = AppState::from_ref(state);

        let provided = parts
            .headers
            .get(API_KEY_HEADER)
            .map(|value| value.as_bytes())
            .ok_or(AppError::InvalidApiKey)?;

        // Every key is compared so timing does not reveal which one matched.
        let matched = K::keys(&app_state.config)
            .into_iter()
            .fold(false, |acc, key| acc | constant_time_eq(provided, key.as_bytes()));

        if !matched {
            tracing::warn!(path = %parts.uri.path(), "rejected API key");
            return Err(AppError::InvalidApiKey.into());
        }
        Ok(RequireApiKey(PhantomData))
    }
}

fn constant_time_eq(provided: &[u8], expected: &[u8]) -> bool {
    if provided.len() != expected.len() {
        let _ = expected.ct_eq(expected);
        return false;
    }
    provided.ct_eq(expected).into()
}

// ---
// SCOPES
// ---

/// Organisation management.
pub struct OrgKey;
impl ApiKeyScope for OrgKey {
    fn keys(config: &AppConfig) -> Vec<&str> {
        vec![config.org_api_key.as_str()]
    }
}

/// Organisation listing: the management key or the optional read-only key.
pub struct OrgReadKey;
impl ApiKeyScope for OrgReadKey {
    fn keys(config: &AppConfig) -> Vec<&str> {
        let mut keys = vec![config.org_api_key.as_str()];
        keys.extend(config.org_read_api_key.as_deref());
        keys
    }
}

/// Admin/Owner bootstrap.
pub struct UserKey;
impl ApiKeyScope for UserKey {
    fn keys(config: &AppConfig) -> Vec<&str> {
        vec![config.user_api_key.as_str()]
    }
}
