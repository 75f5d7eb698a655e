// src/db/user_repo.rs

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{types::Json, PgPool};
use uuid::Uuid;

use crate::{
    common::error::{conflict_on_unique, AppError},
    db::store::UserStore,
    models::{
        history::{now, UpdateHistory},
        organisation::OrganisationStatus,
        user::{User, UserStatus},
    },
};

#[derive(sqlx::FromRow)]
struct UserRow {
    uid: Uuid,
    user_id: String,
    username: String,
    password_hash: String,
    role: String,
    status: String,
    mobile_number: String,
    org_uuid: Uuid,
    org_status: String,
    remarks: String,
    created_time: DateTime<Utc>,
    updated_time: DateTime<Utc>,
    update_history: Json<Vec<UpdateHistory>>,
}

impl TryFrom<UserRow> for User {
    type Error = AppError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        Ok(User {
            uid: row.uid,
            user_id: row.user_id,
            username: row.username,
            password_hash: row.password_hash,
            role: row.role.try_into().map_err(anyhow::Error::from)?,
            status: row.status.try_into().map_err(anyhow::Error::from)?,
            mobile_number: row.mobile_number,
            org_uuid: row.org_uuid,
            org_status: row.org_status.try_into().map_err(anyhow::Error::from)?,
            remarks: row.remarks,
            created_time: row.created_time,
            updated_time: row.updated_time,
            update_history: row.update_history.0,
        })
    }
}

const SELECT_USER: &str = r#"
    SELECT
        uid, user_id, username, password_hash, role, status, mobile_number,
        org_uuid, org_status, remarks, created_time, updated_time, update_history
    FROM users
"#;

fn username_taken(user: &User) -> impl FnOnce() -> String + '_ {
    move || format!("Username '{}' already exists in this organisation", user.username)
}

// Responsible for every interaction with the 'users' table.
#[derive(Clone)]
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserStore for UserRepository {
    async fn insert_user(&self, user: &User) -> Result<(), AppError> {
        sqlx::query(
            r#"
            INSERT INTO users (
                uid, user_id, username, password_hash, role, status, mobile_number,
                org_uuid, org_status, remarks, created_time, updated_time, update_history
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
            "#,
        )
        .bind(user.uid)
        .bind(&user.user_id)
        .bind(&user.username)
        .bind(&user.password_hash)
        .bind(user.role.as_str())
        .bind(user.status.as_str())
        .bind(&user.mobile_number)
        .bind(user.org_uuid)
        .bind(user.org_status.as_str())
        .bind(&user.remarks)
        .bind(user.created_time)
        .bind(user.updated_time)
        .bind(Json(&user.update_history))
        .execute(&self.pool)
        .await
        .map_err(|e| conflict_on_unique(e, username_taken(user)))?;
        Ok(())
    }

    async fn find_user(&self, uid: Uuid) -> Result<Option<User>, AppError> {
        let sql = format!("{SELECT_USER} WHERE uid = $1");
        let row = sqlx::query_as::<_, UserRow>(&sql)
            .bind(uid)
            .fetch_optional(&self.pool)
            .await?;
        row.map(User::try_from).transpose()
    }

    async fn find_user_by_username(&self, org_uuid: Uuid, username: &str) -> Result<Option<User>, AppError> {
        let sql = format!("{SELECT_USER} WHERE org_uuid = $1 AND username = $2");
        let row = sqlx::query_as::<_, UserRow>(&sql)
            .bind(org_uuid)
            .bind(username)
            .fetch_optional(&self.pool)
            .await?;
        row.map(User::try_from).transpose()
    }

    async fn find_user_by_user_id(&self, org_uuid: Uuid, user_id: &str) -> Result<Option<User>, AppError> {
        // user_id is not unique; the earliest account wins.
        let sql = format!("{SELECT_USER} WHERE org_uuid = $1 AND user_id = $2 ORDER BY created_time LIMIT 1");
        let row = sqlx::query_as::<_, UserRow>(&sql)
            .bind(org_uuid)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?;
        row.map(User::try_from).transpose()
    }

    async fn list_users(&self, org_uuid: Uuid) -> Result<Vec<User>, AppError> {
        let sql = format!("{SELECT_USER} WHERE org_uuid = $1 ORDER BY created_time, username");
        sqlx::query_as::<_, UserRow>(&sql)
            .bind(org_uuid)
            .fetch_all(&self.pool)
            .await?
            .into_iter()
            .map(User::try_from)
            .collect()
    }

    async fn replace_user(&self, user: &User) -> Result<bool, AppError> {
        let result = sqlx::query(
            r#"
            UPDATE users
            SET user_id = $2, username = $3, password_hash = $4, role = $5, status = $6,
                mobile_number = $7, org_status = $8, remarks = $9, updated_time = $10,
                update_history = $11
            WHERE uid = $1
            "#,
        )
        .bind(user.uid)
        .bind(&user.user_id)
        .bind(&user.username)
        .bind(&user.password_hash)
        .bind(user.role.as_str())
        .bind(user.status.as_str())
        .bind(&user.mobile_number)
        .bind(user.org_status.as_str())
        .bind(&user.remarks)
        .bind(user.updated_time)
        .bind(Json(&user.update_history))
        .execute(&self.pool)
        .await
        .map_err(|e| conflict_on_unique(e, username_taken(user)))?;
        Ok(result.rows_affected() > 0)
    }

    async fn sync_org_status(
        &self,
        org_uuid: Uuid,
        org_status: OrganisationStatus,
        deactivate: bool,
    ) -> Result<u64, AppError> {
        let result = sqlx::query(
            r#"
            UPDATE users
            SET org_status = $2,
                status = CASE WHEN $3 THEN $4 ELSE status END,
                updated_time = $5
            WHERE org_uuid = $1
            "#,
        )
        .bind(org_uuid)
        .bind(org_status.as_str())
        .bind(deactivate)
        .bind(UserStatus::Inactive.as_str())
        .bind(now())
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected())
    }
}
