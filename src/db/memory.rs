// src/db/memory.rs

//! Process-local store used by the test-suite and by `STORAGE_BACKEND=memory`.
//! Vectors keep insertion order, which is the listing order.

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::store::{OrganisationStore, Pagination, ProspectStore, UserStore},
    models::{
        history::now,
        organisation::{Organisation, OrganisationStatus},
        prospect::Prospect,
        user::{User, UserStatus},
    },
};

#[derive(Debug, Default)]
pub struct MemoryStore {
    organisations: RwLock<Vec<Organisation>>,
    users: RwLock<Vec<User>>,
    prospects: RwLock<Vec<Prospect>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn org_id_taken(org_id: &str) -> AppError {
    AppError::Conflict(format!("Organisation '{org_id}' already exists"))
}

fn username_taken(username: &str) -> AppError {
    AppError::Conflict(format!("Username '{username}' already exists in this organisation"))
}

#[async_trait]
impl OrganisationStore for MemoryStore {
    async fn insert_organisation(&self, org: &Organisation) -> Result<(), AppError> {
        let mut orgs = self.organisations.write().await;
        if orgs.iter().any(|o| o.org_id == org.org_id) {
            return Err(org_id_taken(&org.org_id));
        }
        orgs.push(org.clone());
        Ok(())
    }

    async fn find_organisation(&self, org_id: &str) -> Result<Option<Organisation>, AppError> {
        let orgs = self.organisations.read().await;
        Ok(orgs.iter().find(|o| o.org_id == org_id).cloned())
    }

    async fn replace_organisation(&self, org: &Organisation) -> Result<bool, AppError> {
        let mut orgs = self.organisations.write().await;
        if orgs.iter().any(|o| o.org_id == org.org_id && o.org_uuid != org.org_uuid) {
            return Err(org_id_taken(&org.org_id));
        }
        match orgs.iter_mut().find(|o| o.org_uuid == org.org_uuid) {
            Some(slot) => {
                *slot = org.clone();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn list_organisations(&self) -> Result<Vec<Organisation>, AppError> {
        Ok(self.organisations.read().await.clone())
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn insert_user(&self, user: &User) -> Result<(), AppError> {
        let mut users = self.users.write().await;
        if users.iter().any(|u| u.org_uuid == user.org_uuid && u.username == user.username) {
            return Err(username_taken(&user.username));
        }
        users.push(user.clone());
        Ok(())
    }

    async fn find_user(&self, uid: Uuid) -> Result<Option<User>, AppError> {
        let users = self.users.read().await;
        Ok(users.iter().find(|u| u.uid == uid).cloned())
    }

    async fn find_user_by_username(&self, org_uuid: Uuid, username: &str) -> Result<Option<User>, AppError> {
        let users = self.users.read().await;
        Ok(users
            .iter()
            .find(|u| u.org_uuid == org_uuid && u.username == username)
            .cloned())
    }

    async fn find_user_by_user_id(&self, org_uuid: Uuid, user_id: &str) -> Result<Option<User>, AppError> {
        let users = self.users.read().await;
        Ok(users
            .iter()
            .find(|u| u.org_uuid == org_uuid && u.user_id == user_id)
            .cloned())
    }

    async fn list_users(&self, org_uuid: Uuid) -> Result<Vec<User>, AppError> {
        let users = self.users.read().await;
        Ok(users.iter().filter(|u| u.org_uuid == org_uuid).cloned().collect())
    }

    async fn replace_user(&self, user: &User) -> Result<bool, AppError> {
        let mut users = self.users.write().await;
        let clash = users
            .iter()
            .any(|u| u.uid != user.uid && u.org_uuid == user.org_uuid && u.username == user.username);
        if clash {
            return Err(username_taken(&user.username));
        }
        match users.iter_mut().find(|u| u.uid == user.uid) {
            Some(slot) => {
                *slot = user.clone();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn sync_org_status(
        &self,
        org_uuid: Uuid,
        org_status: OrganisationStatus,
        deactivate: bool,
    ) -> Result<u64, AppError> {
        let mut users = self.users.write().await;
        let timestamp = now();
        let mut touched = 0;
        for user in users.iter_mut().filter(|u| u.org_uuid == org_uuid) {
            user.org_status = org_status;
            if deactivate {
                user.status = UserStatus::Inactive;
            }
            user.updated_time = timestamp;
            touched += 1;
        }
        Ok(touched)
    }
}

#[async_trait]
impl ProspectStore for MemoryStore {
    async fn insert_prospect(&self, prospect: &Prospect) -> Result<(), AppError> {
        self.prospects.write().await.push(prospect.clone());
        Ok(())
    }

    async fn find_prospect(&self, uid: Uuid) -> Result<Option<Prospect>, AppError> {
        let prospects = self.prospects.read().await;
        Ok(prospects.iter().find(|p| p.uid == uid).cloned())
    }

    async fn replace_prospect(&self, prospect: &Prospect) -> Result<bool, AppError> {
        let mut prospects = self.prospects.write().await;
        match prospects.iter_mut().find(|p| p.uid == prospect.uid) {
            Some(slot) => {
                *slot = prospect.clone();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn list_prospects(&self, page: Pagination) -> Result<Vec<Prospect>, AppError> {
        let prospects = self.prospects.read().await;
        let skip = usize::try_from(page.skip).unwrap_or(usize::MAX);
        let limit = page
            .max_rows()
            .map_or(usize::MAX, |n| usize::try_from(n).unwrap_or(usize::MAX));
        Ok(prospects.iter().skip(skip).take(limit).cloned().collect())
    }

    async fn count_prospects(&self) -> Result<u64, AppError> {
        Ok(self.prospects.read().await.len() as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{prospect::ProspectPayload, user::Role};

    fn org(org_id: &str) -> Organisation {
        Organisation {
            org_id: org_id.into(),
            org_uuid: Uuid::new_v4(),
            org_name: "Acme".into(),
            status: OrganisationStatus::Active,
        }
    }

    fn member(org: &Organisation, username: &str) -> User {
        User {
            uid: Uuid::new_v4(),
            user_id: format!("id-{username}"),
            username: username.into(),
            password_hash: String::new(),
            role: Role::FieldLead,
            status: UserStatus::Active,
            mobile_number: String::new(),
            org_uuid: org.org_uuid,
            org_status: org.status,
            remarks: String::new(),
            created_time: now(),
            updated_time: now(),
            update_history: vec![],
        }
    }

    #[tokio::test]
    async fn duplicate_org_id_conflicts() {
        let store = MemoryStore::new();
        store.insert_organisation(&org("ORG1")).await.unwrap();
        let err = store.insert_organisation(&org("ORG1")).await.unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
    }

    #[tokio::test]
    async fn usernames_are_unique_per_organisation() {
        let store = MemoryStore::new();
        let (a, b) = (org("A"), org("B"));
        store.insert_user(&member(&a, "sam")).await.unwrap();
        store.insert_user(&member(&b, "sam")).await.unwrap();
        let err = store.insert_user(&member(&a, "sam")).await.unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
    }

    #[tokio::test]
    async fn deactivation_sync_only_touches_members() {
        let store = MemoryStore::new();
        let (a, b) = (org("A"), org("B"));
        for user in [member(&a, "x"), member(&a, "y"), member(&b, "z")] {
            store.insert_user(&user).await.unwrap();
        }

        let touched = store
            .sync_org_status(a.org_uuid, OrganisationStatus::InActive, true)
            .await
            .unwrap();
        assert_eq!(touched, 2);

        for user in store.list_users(a.org_uuid).await.unwrap() {
            assert_eq!(user.status, UserStatus::Inactive);
            assert_eq!(user.org_status, OrganisationStatus::InActive);
        }
        let other = store.list_users(b.org_uuid).await.unwrap();
        assert_eq!(other[0].status, UserStatus::Active);
    }

    #[tokio::test]
    async fn prospects_page_in_creation_order() {
        let store = MemoryStore::new();
        for id in ["P1", "P2", "P3"] {
            let payload = ProspectPayload { prospect_id: id.into(), ..Default::default() };
            store
                .insert_prospect(&Prospect::from_payload(payload, "alice"))
                .await
                .unwrap();
        }

        let page = store.list_prospects(Pagination { skip: 1, limit: 5 }).await.unwrap();
        let ids: Vec<_> = page.iter().map(|p| p.prospect_id.as_str()).collect();
        assert_eq!(ids, ["P2", "P3"]);
        assert_eq!(store.count_prospects().await.unwrap(), 3);

        let rest = store.list_prospects(Pagination { skip: 1, limit: 0 }).await.unwrap();
        assert_eq!(rest.len(), 2);
    }
}
