// src/services/auth.rs

use std::sync::Arc;

use bcrypt::{hash, verify};
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};

use crate::{
    common::error::AppError,
    db::{OrganisationStore, UserStore},
    models::{
        auth::{Claims, LoginPayload, LoginResponse},
        history::{now, UpdateHistory},
        organisation::Organisation,
        user::{User, UserStatus},
    },
};

/// Identity resolved for an authenticated request.
#[derive(Debug, Clone)]
pub struct AuthContext {
    pub claims: Claims,
    pub organisation: Organisation,
    pub user: User,
}

impl AuthContext {
    pub fn username(&self) -> &str {
        &self.user.username
    }
}

#[derive(Clone)]
pub struct AuthService {
    organisations: Arc<dyn OrganisationStore>,
    users: Arc<dyn UserStore>,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    token_ttl: Duration,
    bcrypt_cost: u32,
}

impl AuthService {
    pub fn new(
        organisations: Arc<dyn OrganisationStore>,
        users: Arc<dyn UserStore>,
        jwt_secret: &str,
        token_ttl: Duration,
        bcrypt_cost: u32,
    ) -> Self {
        Self {
            organisations,
            users,
            encoding_key: EncodingKey::from_secret(jwt_secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(jwt_secret.as_bytes()),
            token_ttl,
            bcrypt_cost,
        }
    }

    pub async fn login(&self, payload: &LoginPayload) -> Result<LoginResponse, AppError> {
        let organisation = self
            .organisations
            .find_organisation(&payload.org_id)
            .await?
            .filter(Organisation::is_active)
            .ok_or(AppError::InvalidOrganisation)?;

        let mut user = self
            .users
            .find_user_by_username(organisation.org_uuid, &payload.username)
            .await?
            .ok_or(AppError::InvalidCredentials)?;

        if !self.verify_password(&payload.password, &user.password_hash).await? {
            return Err(AppError::InvalidCredentials);
        }

        if user.status.activates_on_login() {
            let entry = UpdateHistory::new(
                format!("status changed from '{}' to '{}'", user.status, UserStatus::Active),
                user.username.clone(),
            );
            user.status = UserStatus::Active;
            user.updated_time = entry.timestamp;
            user.update_history.push(entry);
            self.users.replace_user(&user).await?;
            tracing::info!(uid = %user.uid, "user activated on first login");
        } else if !user.is_active() {
            return Err(AppError::Unauthenticated("Access denied: Inactive user".into()));
        }

        let (token, expires_at) = self.issue_token(&user)?;
        tracing::info!(uid = %user.uid, org_id = %organisation.org_id, "user logged in");

        Ok(LoginResponse {
            uid: user.uid,
            user_id: user.user_id,
            username: user.username,
            role: user.role,
            status: user.status,
            mobile_number: user.mobile_number,
            org_uuid: user.org_uuid,
            token,
            expires_at,
        })
    }

    /// Resolves the caller behind verified claims for the organisation named
    /// in the `org_id` header. Role checks are left to the caller.
    pub async fn resolve(&self, claims: Claims, org_id: &str) -> Result<AuthContext, AppError> {
        let organisation = self
            .organisations
            .find_organisation(org_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Organisation not found".into()))?;

        if organisation.org_uuid != claims.org_uuid {
            return Err(AppError::Forbidden("Organisation mismatch".into()));
        }
        if !organisation.is_active() {
            return Err(AppError::Forbidden("Access denied: Inactive organisation".into()));
        }

        let user = self
            .users
            .find_user(claims.uid)
            .await?
            .ok_or_else(|| AppError::Unauthenticated("User not found".into()))?;

        if !user.is_active() {
            return Err(AppError::Forbidden("Access denied: Inactive user".into()));
        }

        Ok(AuthContext { claims, organisation, user })
    }

    pub fn issue_token(&self, user: &User) -> Result<(String, DateTime<Utc>), AppError> {
        let issued_at = now();
        let expires_at = issued_at + self.token_ttl;
        let claims = Claims::for_user(user, issued_at, expires_at);

        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)?;
        Ok((token, expires_at))
    }

    pub fn verify_token(&self, token: &str) -> Result<Claims, AppError> {
        let validation = Validation::new(Algorithm::HS256);
        decode::<Claims>(token, &self.decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(|_| AppError::InvalidToken)
    }

    pub async fn hash_password(&self, password: &str) -> Result<String, AppError> {
        let password = password.to_owned();
        let cost = self.bcrypt_cost;
        let hashed = tokio::task::spawn_blocking(move || hash(&password, cost))
            .await
            .map_err(|e| anyhow::anyhow!("Hashing task failed: {}", e))??;
        Ok(hashed)
    }

    pub async fn verify_password(&self, password: &str, password_hash: &str) -> Result<bool, AppError> {
        let password = password.to_owned();
        let password_hash = password_hash.to_owned();
        let valid = tokio::task::spawn_blocking(move || verify(&password, &password_hash))
            .await
            .map_err(|e| anyhow::anyhow!("Password verification task failed: {}", e))??;
        Ok(valid)
    }
}
