// src/db/organisation_repo.rs

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::{conflict_on_unique, AppError},
    db::store::OrganisationStore,
    models::organisation::Organisation,
};

// Raw row; enums are stored as their wire text.
#[derive(sqlx::FromRow)]
struct OrganisationRow {
    org_id: String,
    org_uuid: Uuid,
    org_name: String,
    status: String,
}

impl TryFrom<OrganisationRow> for Organisation {
    type Error = AppError;

    fn try_from(row: OrganisationRow) -> Result<Self, Self::Error> {
        Ok(Organisation {
            org_id: row.org_id,
            org_uuid: row.org_uuid,
            org_name: row.org_name,
            status: row.status.try_into().map_err(anyhow::Error::from)?,
        })
    }
}

const SELECT_ORGANISATION: &str = "SELECT org_id, org_uuid, org_name, status FROM organisations";

// Responsible for every interaction with the 'organisations' table.
#[derive(Clone)]
pub struct OrganisationRepository {
    pool: PgPool,
}

impl OrganisationRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl OrganisationStore for OrganisationRepository {
    async fn insert_organisation(&self, org: &Organisation) -> Result<(), AppError> {
        sqlx::query(
            r#"
            INSERT INTO organisations (org_id, org_uuid, org_name, status)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(&org.org_id)
        .bind(org.org_uuid)
        .bind(&org.org_name)
        .bind(org.status.as_str())
        .execute(&self.pool)
        .await
        .map_err(|e| {
            conflict_on_unique(e, || format!("Organisation '{}' already exists", org.org_id))
        })?;
        Ok(())
    }

    async fn find_organisation(&self, org_id: &str) -> Result<Option<Organisation>, AppError> {
        let sql = format!("{SELECT_ORGANISATION} WHERE org_id = $1");
        let row = sqlx::query_as::<_, OrganisationRow>(&sql)
            .bind(org_id)
            .fetch_optional(&self.pool)
            .await?;
        row.map(Organisation::try_from).transpose()
    }

    async fn replace_organisation(&self, org: &Organisation) -> Result<bool, AppError> {
        let result = sqlx::query(
            r#"
            UPDATE organisations
            SET org_id = $2, org_name = $3, status = $4
            WHERE org_uuid = $1
            "#,
        )
        .bind(org.org_uuid)
        .bind(&org.org_id)
        .bind(&org.org_name)
        .bind(org.status.as_str())
        .execute(&self.pool)
        .await
        .map_err(|e| {
            conflict_on_unique(e, || format!("Organisation '{}' already exists", org.org_id))
        })?;
        Ok(result.rows_affected() > 0)
    }

    async fn list_organisations(&self) -> Result<Vec<Organisation>, AppError> {
        let sql = format!("{SELECT_ORGANISATION} ORDER BY created_at, org_id");
        sqlx::query_as::<_, OrganisationRow>(&sql)
            .fetch_all(&self.pool)
            .await?
            .into_iter()
            .map(Organisation::try_from)
            .collect()
    }
}
