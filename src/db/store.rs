// src/db/store.rs

//! Storage seams. Services only see these traits; the Postgres repositories
//! and the in-memory store both implement them.

use async_trait::async_trait;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::{
        organisation::{Organisation, OrganisationStatus},
        prospect::Prospect,
        user::User,
    },
};

/// Window over an ordered listing. A `limit` of 0 means no limit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub skip: u64,
    pub limit: u64,
}

impl Pagination {
    pub fn max_rows(&self) -> Option<u64> {
        (self.limit > 0).then_some(self.limit)
    }
}

impl Default for Pagination {
    fn default() -> Self {
        Self { skip: 0, limit: 10 }
    }
}

#[async_trait]
pub trait OrganisationStore: Send + Sync {
    /// Fails with `Conflict` when `org_id` is taken.
    async fn insert_organisation(&self, org: &Organisation) -> Result<(), AppError>;

    async fn find_organisation(&self, org_id: &str) -> Result<Option<Organisation>, AppError>;

    /// Replaces the row keyed by `org.org_uuid`. Returns `false` when absent.
    async fn replace_organisation(&self, org: &Organisation) -> Result<bool, AppError>;

    async fn list_organisations(&self) -> Result<Vec<Organisation>, AppError>;
}

#[async_trait]
pub trait UserStore: Send + Sync {
    /// Fails with `Conflict` when the username is taken inside the organisation.
    async fn insert_user(&self, user: &User) -> Result<(), AppError>;

    async fn find_user(&self, uid: Uuid) -> Result<Option<User>, AppError>;

    async fn find_user_by_username(&self, org_uuid: Uuid, username: &str) -> Result<Option<User>, AppError>;

    async fn find_user_by_user_id(&self, org_uuid: Uuid, user_id: &str) -> Result<Option<User>, AppError>;

    async fn list_users(&self, org_uuid: Uuid) -> Result<Vec<User>, AppError>;

    /// Replaces the row keyed by `user.uid`. Returns `false` when absent.
    async fn replace_user(&self, user: &User) -> Result<bool, AppError>;

    /// Mirrors an organisation status change into its members; with
    /// `deactivate` every member's own status also becomes `Inactive`.
    /// Returns the number of users touched.
    async fn sync_org_status(
        &self,
        org_uuid: Uuid,
        org_status: OrganisationStatus,
        deactivate: bool,
    ) -> Result<u64, AppError>;
}

#[async_trait]
pub trait ProspectStore: Send + Sync {
    async fn insert_prospect(&self, prospect: &Prospect) -> Result<(), AppError>;

    async fn find_prospect(&self, uid: Uuid) -> Result<Option<Prospect>, AppError>;

    /// Replaces the row keyed by `prospect.uid`. Returns `false` when absent.
    async fn replace_prospect(&self, prospect: &Prospect) -> Result<bool, AppError>;

    /// Prospects in creation order.
    async fn list_prospects(&self, page: Pagination) -> Result<Vec<Prospect>, AppError>;

    async fn count_prospects(&self) -> Result<u64, AppError>;
}
