// src/db/prospect_repo.rs

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{postgres::PgArguments, query::Query, types::Json, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::store::{Pagination, ProspectStore},
    models::{
        history::UpdateHistory,
        prospect::{EmploymentType, Prospect},
    },
};

#[derive(sqlx::FromRow)]
struct ProspectRow {
    uid: Uuid,
    prospect_id: String,
    applicant_name: String,
    name_verified: bool,
    mobile_number: String,
    mobile_verified: bool,
    gender: String,
    age: i32,
    residential_address: String,
    res_address_verified: bool,
    years_of_stay: i32,
    number_of_family_members: i32,
    reference_name: String,
    reference_relation: String,
    reference_mobile: String,
    employment_type: Option<String>,
    office_address: String,
    off_address_verified: bool,
    years_in_current_office: i32,
    role: String,
    role_verified: bool,
    emp_id: String,
    emp_id_verified: bool,
    status: String,
    previous_experience: String,
    gross_salary: f64,
    net_salary: f64,
    colleague_name: String,
    colleague_designation: String,
    colleague_mobile: String,
    uploaded_images: Vec<String>,
    remarks: String,
    created_by: String,
    created_time: DateTime<Utc>,
    updated_by: String,
    updated_time: DateTime<Utc>,
    update_history: Json<Vec<UpdateHistory>>,
}

impl TryFrom<ProspectRow> for Prospect {
    type Error = AppError;

    fn try_from(row: ProspectRow) -> Result<Self, Self::Error> {
        let employment_type = row
            .employment_type
            .map(EmploymentType::try_from)
            .transpose()
            .map_err(anyhow::Error::from)?;

        Ok(Prospect {
            uid: row.uid,
            prospect_id: row.prospect_id,
            applicant_name: row.applicant_name,
            name_verified: row.name_verified,
            mobile_number: row.mobile_number,
            mobile_verified: row.mobile_verified,
            gender: row.gender,
            age: row.age,
            residential_address: row.residential_address,
            res_address_verified: row.res_address_verified,
            years_of_stay: row.years_of_stay,
            number_of_family_members: row.number_of_family_members,
            reference_name: row.reference_name,
            reference_relation: row.reference_relation,
            reference_mobile: row.reference_mobile,
            employment_type,
            office_address: row.office_address,
            off_address_verified: row.off_address_verified,
            years_in_current_office: row.years_in_current_office,
            role: row.role,
            role_verified: row.role_verified,
            emp_id: row.emp_id,
            emp_id_verified: row.emp_id_verified,
            status: row.status.try_into().map_err(anyhow::Error::from)?,
            previous_experience: row.previous_experience,
            gross_salary: row.gross_salary,
            net_salary: row.net_salary,
            colleague_name: row.colleague_name,
            colleague_designation: row.colleague_designation,
            colleague_mobile: row.colleague_mobile,
            uploaded_images: row.uploaded_images,
            remarks: row.remarks,
            created_by: row.created_by,
            created_time: row.created_time,
            updated_by: row.updated_by,
            updated_time: row.updated_time,
            update_history: row.update_history.0,
        })
    }
}

// Column order shared by SELECT, INSERT and UPDATE; `uid` is always $1.
const COLUMNS: &str = "uid, prospect_id, applicant_name, name_verified, mobile_number, \
    mobile_verified, gender, age, residential_address, res_address_verified, years_of_stay, \
    number_of_family_members, reference_name, reference_relation, reference_mobile, \
    employment_type, office_address, off_address_verified, years_in_current_office, role, \
    role_verified, emp_id, emp_id_verified, status, previous_experience, gross_salary, \
    net_salary, colleague_name, colleague_designation, colleague_mobile, uploaded_images, \
    remarks, created_by, created_time, updated_by, updated_time, update_history";

fn column_names() -> impl Iterator<Item = &'static str> {
    COLUMNS.split(',').map(str::trim)
}

// Binds every column in `COLUMNS` order.
fn bind_all<'q>(query: Query<'q, Postgres, PgArguments>, p: &'q Prospect) -> Query<'q, Postgres, PgArguments> {
    query
        .bind(p.uid)
        .bind(&p.prospect_id)
        .bind(&p.applicant_name)
        .bind(p.name_verified)
        .bind(&p.mobile_number)
        .bind(p.mobile_verified)
        .bind(&p.gender)
        .bind(p.age)
        .bind(&p.residential_address)
        .bind(p.res_address_verified)
        .bind(p.years_of_stay)
        .bind(p.number_of_family_members)
        .bind(&p.reference_name)
        .bind(&p.reference_relation)
        .bind(&p.reference_mobile)
        .bind(p.employment_type.map(|t| t.as_str()))
        .bind(&p.office_address)
        .bind(p.off_address_verified)
        .bind(p.years_in_current_office)
        .bind(&p.role)
        .bind(p.role_verified)
        .bind(&p.emp_id)
        .bind(p.emp_id_verified)
        .bind(p.status.as_str())
        .bind(&p.previous_experience)
        .bind(p.gross_salary)
        .bind(p.net_salary)
        .bind(&p.colleague_name)
        .bind(&p.colleague_designation)
        .bind(&p.colleague_mobile)
        .bind(&p.uploaded_images)
        .bind(&p.remarks)
        .bind(&p.created_by)
        .bind(p.created_time)
        .bind(&p.updated_by)
        .bind(p.updated_time)
        .bind(Json(&p.update_history))
}

fn insert_sql() -> String {
    let placeholders = (1..=column_names().count())
        .map(|i| format!("${i}"))
        .collect::<Vec<_>>()
        .join(", ");
    format!("INSERT INTO prospects ({COLUMNS}) VALUES ({placeholders})")
}

fn update_sql() -> String {
    let assignments = column_names()
        .enumerate()
        .skip(1)
        .map(|(i, col)| format!("{col} = ${}", i + 1))
        .collect::<Vec<_>>()
        .join(", ");
    format!("UPDATE prospects SET {assignments} WHERE uid = $1")
}

// Responsible for every interaction with the 'prospects' table.
#[derive(Clone)]
pub struct ProspectRepository {
    pool: PgPool,
    insert_sql: String,
    update_sql: String,
}

impl ProspectRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool, insert_sql: insert_sql(), update_sql: update_sql() }
    }
}

#[async_trait]
impl ProspectStore for ProspectRepository {
    async fn insert_prospect(&self, prospect: &Prospect) -> Result<(), AppError> {
        bind_all(sqlx::query(&self.insert_sql), prospect)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn find_prospect(&self, uid: Uuid) -> Result<Option<Prospect>, AppError> {
        let sql = format!("SELECT {COLUMNS} FROM prospects WHERE uid = $1");
        let row = sqlx::query_as::<_, ProspectRow>(&sql)
            .bind(uid)
            .fetch_optional(&self.pool)
            .await?;
        row.map(Prospect::try_from).transpose()
    }

    async fn replace_prospect(&self, prospect: &Prospect) -> Result<bool, AppError> {
        let result = bind_all(sqlx::query(&self.update_sql), prospect)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn list_prospects(&self, page: Pagination) -> Result<Vec<Prospect>, AppError> {
        let sql = format!("SELECT {COLUMNS} FROM prospects ORDER BY seq LIMIT $2 OFFSET $1");
        sqlx::query_as::<_, ProspectRow>(&sql)
            .bind(i64::try_from(page.skip).unwrap_or(i64::MAX))
            // NULL is LIMIT ALL.
            .bind(page.max_rows().map(|n| i64::try_from(n).unwrap_or(i64::MAX)))
            .fetch_all(&self.pool)
            .await?
            .into_iter()
            .map(Prospect::try_from)
            .collect()
    }

    async fn count_prospects(&self) -> Result<u64, AppError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM prospects")
            .fetch_one(&self.pool)
            .await?;
        Ok(count.max(0) as u64)
    }
}
