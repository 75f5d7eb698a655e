// src/config.rs

use std::{fmt, sync::Arc, time::Duration};

use anyhow::{bail, Context};
use sqlx::postgres::PgPoolOptions;

use crate::{
    db::{MemoryStore, OrganisationRepository, ProspectRepository, UserRepository},
    services::{AuthService, OrganisationService, ProspectService, UserService},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageBackend {
    Postgres,
    Memory,
}

/// Everything read from the environment at startup. Immutable afterwards.
#[derive(Clone)]
pub struct AppConfig {
    pub storage: StorageBackend,
    pub database_url: Option<String>,
    pub db_max_connections: u32,
    pub jwt_secret: String,
    pub jwt_expiry_hours: i64,
    pub org_api_key: String,
    pub org_read_api_key: Option<String>,
    pub user_api_key: String,
    pub bcrypt_cost: u32,
    pub bind_addr: String,
    pub cors_origins: Vec<String>,
}

// Secrets stay out of logs.
impl fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppConfig")
            .field("storage", &self.storage)
            .field("database_url", &self.database_url.as_ref().map(|_| "<redacted>"))
            .field("db_max_connections", &self.db_max_connections)
            .field("jwt_secret", &"<redacted>")
            .field("jwt_expiry_hours", &self.jwt_expiry_hours)
            .field("org_api_key", &"<redacted>")
            .field("org_read_api_key", &self.org_read_api_key.as_ref().map(|_| "<redacted>"))
            .field("user_api_key", &"<redacted>")
            .field("bcrypt_cost", &self.bcrypt_cost)
            .field("bind_addr", &self.bind_addr)
            .field("cors_origins", &self.cors_origins)
            .finish()
    }
}

impl AppConfig {
    /// Reads the process environment, after loading `.env` when present.
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let required = |key: &str| var(key).with_context(|| format!("{key} must be set"));

        let storage = match var("STORAGE_BACKEND").as_deref() {
            None | Some("postgres") => StorageBackend::Postgres,
            Some("memory") => StorageBackend::Memory,
            Some(other) => bail!("STORAGE_BACKEND must be 'postgres' or 'memory', got '{other}'"),
        };

        let database_url = var("DATABASE_URL");
        if storage == StorageBackend::Postgres && database_url.is_none() {
            bail!("DATABASE_URL must be set when STORAGE_BACKEND is postgres");
        }

        let jwt_expiry_hours: i64 = parse_or(var("JWT_EXPIRY_HOURS"), "JWT_EXPIRY_HOURS", 24)?;
        if jwt_expiry_hours <= 0 {
            bail!("JWT_EXPIRY_HOURS must be positive");
        }

        let cors_origins = var("CORS_ORIGINS")
            .unwrap_or_else(|| "http://localhost:3000".to_string())
            .split(',')
            .map(|origin| origin.trim().to_string())
            .filter(|origin| !origin.is_empty())
            .collect();

        Ok(Self {
            storage,
            database_url,
            db_max_connections: parse_or(var("DB_MAX_CONNECTIONS"), "DB_MAX_CONNECTIONS", 5)?,
            jwt_secret: required("JWT_SECRET")?,
            jwt_expiry_hours,
            org_api_key: required("ORG_API_KEY")?,
            org_read_api_key: var("ORG_READ_API_KEY"),
            user_api_key: required("USER_API_KEY")?,
            bcrypt_cost: parse_or(var("BCRYPT_COST"), "BCRYPT_COST", bcrypt::DEFAULT_COST)?,
            bind_addr: var("BIND_ADDR").unwrap_or_else(|| "0.0.0.0:9000".to_string()),
            cors_origins,
        })
    }
}

fn parse_or<T>(value: Option<String>, key: &str, default: T) -> anyhow::Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match value {
        Some(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("{key} has an invalid value '{raw}'")),
        None => Ok(default),
    }
}

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub auth_service: AuthService,
    pub organisation_service: OrganisationService,
    pub user_service: UserService,
    pub prospect_service: ProspectService,
}

impl AppState {
    /// Builds the state for the configured backend; Postgres migrations run here.
    pub async fn connect(config: AppConfig) -> anyhow::Result<Self> {
        match config.storage {
            StorageBackend::Memory => {
                tracing::warn!("Using the in-memory store; data is lost on restart");
                Ok(Self::in_memory(config))
            }
            StorageBackend::Postgres => {
                let url = config
                    .database_url
                    .as_deref()
                    .context("DATABASE_URL must be set")?;

                let pool = PgPoolOptions::new()
                    .max_connections(config.db_max_connections)
                    .acquire_timeout(Duration::from_secs(3))
                    .connect(url)
                    .await
                    .context("Failed to connect to the database")?;
                tracing::info!("Database connection established");

                sqlx::migrate!()
                    .run(&pool)
                    .await
                    .context("Failed to run database migrations")?;
                tracing::info!("Database migrations applied");

                Ok(Self::assemble(
                    config,
                    Arc::new(OrganisationRepository::new(pool.clone())),
                    Arc::new(UserRepository::new(pool.clone())),
                    Arc::new(ProspectRepository::new(pool)),
                ))
            }
        }
    }

    pub fn in_memory(config: AppConfig) -> Self {
        let store = Arc::new(MemoryStore::new());
        Self::assemble(config, store.clone(), store.clone(), store)
    }

    // Dependency graph.
    fn assemble(
        config: AppConfig,
        organisations: Arc<dyn crate::db::OrganisationStore>,
        users: Arc<dyn crate::db::UserStore>,
        prospects: Arc<dyn crate::db::ProspectStore>,
    ) -> Self {
        let auth_service = AuthService::new(
            organisations.clone(),
            users.clone(),
            &config.jwt_secret,
            chrono::Duration::hours(config.jwt_expiry_hours),
            config.bcrypt_cost,
        );
        let organisation_service = OrganisationService::new(organisations.clone(), users.clone());
        let user_service = UserService::new(organisations, users, auth_service.clone());
        let prospect_service = ProspectService::new(prospects);

        Self {
            config: Arc::new(config),
            auth_service,
            organisation_service,
            user_service,
            prospect_service,
        }
    }
}
