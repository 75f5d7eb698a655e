// src/services/organisation_service.rs

use std::sync::Arc;

use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{OrganisationStore, UserStore},
    models::organisation::{
        CreateOrganisationPayload, Organisation, OrganisationStatus, UpdateOrganisationPayload,
    },
};

#[derive(Clone)]
pub struct OrganisationService {
    organisations: Arc<dyn OrganisationStore>,
    users: Arc<dyn UserStore>,
}

impl OrganisationService {
    pub fn new(organisations: Arc<dyn OrganisationStore>, users: Arc<dyn UserStore>) -> Self {
        Self { organisations, users }
    }

    pub async fn create(&self, payload: CreateOrganisationPayload) -> Result<Organisation, AppError> {
        let organisation = Organisation {
            org_id: payload.org_id,
            org_uuid: Uuid::new_v4(),
            org_name: payload.org_name,
            status: payload.status.unwrap_or_default(),
        };
        self.organisations.insert_organisation(&organisation).await?;

        tracing::info!(
            org_id = %organisation.org_id,
            org_uuid = %organisation.org_uuid,
            "organisation created"
        );
        Ok(organisation)
    }

    /// Replaces an organisation keyed by its current `org_id`. A status change
    /// is mirrored into every member. Any update leaving the organisation
    /// `InActive` deactivates all members, including ones added since it was
    /// first deactivated.
    ///
    /// The organisation write and the member cascade are separate statements,
    /// so a failure in between leaves members on the old status.
    pub async fn update(
        &self,
        org_id: &str,
        payload: UpdateOrganisationPayload,
    ) -> Result<Organisation, AppError> {
        let existing = self
            .organisations
            .find_organisation(org_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Organisation not found".into()))?;

        let updated = Organisation {
            org_id: payload.org_id,
            org_uuid: existing.org_uuid,
            org_name: payload.org_name,
            status: payload.status,
        };
        if !self.organisations.replace_organisation(&updated).await? {
            return Err(AppError::NotFound("Organisation not found".into()));
        }

        let deactivate = updated.status == OrganisationStatus::InActive;
        if deactivate || updated.status != existing.status {
            let touched = self
                .users
                .sync_org_status(updated.org_uuid, updated.status, deactivate)
                .await?;
            tracing::info!(
                org_id = %updated.org_id,
                from = %existing.status,
                to = %updated.status,
                users = touched,
                "organisation status cascaded to members"
            );
        }

        Ok(updated)
    }

    pub async fn list(&self) -> Result<Vec<Organisation>, AppError> {
        self.organisations.list_organisations().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        db::MemoryStore,
        models::{
            history::now,
            user::{Role, User, UserStatus},
        },
    };

    fn service() -> (Arc<MemoryStore>, OrganisationService) {
        let store = Arc::new(MemoryStore::new());
        (store.clone(), OrganisationService::new(store.clone(), store))
    }

    fn create(org_id: &str, status: Option<OrganisationStatus>) -> CreateOrganisationPayload {
        CreateOrganisationPayload { org_id: org_id.into(), org_name: "Acme".into(), status }
    }

    async fn add_member(store: &MemoryStore, org: &Organisation, username: &str) -> User {
        let user = User {
            uid: Uuid::new_v4(),
            user_id: username.into(),
            username: username.into(),
            password_hash: String::new(),
            role: Role::FieldExecutive,
            status: UserStatus::Active,
            mobile_number: String::new(),
            org_uuid: org.org_uuid,
            org_status: org.status,
            remarks: String::new(),
            created_time: now(),
            updated_time: now(),
            update_history: vec![],
        };
        store.insert_user(&user).await.unwrap();
        user
    }

    #[tokio::test]
    async fn status_defaults_to_created() {
        let (_, svc) = service();
        let org = svc.create(create("ORG1", None)).await.unwrap();
        assert_eq!(org.status, OrganisationStatus::Created);
    }

    #[tokio::test]
    async fn duplicate_org_id_is_a_conflict() {
        let (_, svc) = service();
        svc.create(create("ORG1", None)).await.unwrap();
        let err = svc.create(create("ORG1", None)).await.unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
    }

    #[tokio::test]
    async fn deactivation_cascades_to_members() {
        let (store, svc) = service();
        let org = svc.create(create("ORG1", Some(OrganisationStatus::Active))).await.unwrap();
        let a = add_member(&store, &org, "a").await;
        let b = add_member(&store, &org, "b").await;

        let payload = UpdateOrganisationPayload {
            org_id: "ORG1".into(),
            org_name: "Acme".into(),
            status: OrganisationStatus::InActive,
        };
        let updated = svc.update("ORG1", payload).await.unwrap();
        assert_eq!(updated.org_uuid, org.org_uuid);

        for uid in [a.uid, b.uid] {
            let user = store.find_user(uid).await.unwrap().unwrap();
            assert_eq!(user.status, UserStatus::Inactive);
            assert_eq!(user.org_status, OrganisationStatus::InActive);
        }
    }

    #[tokio::test]
    async fn activation_only_mirrors_org_status() {
        let (store, svc) = service();
        let org = svc.create(create("ORG1", None)).await.unwrap();
        let member = add_member(&store, &org, "a").await;

        let payload = UpdateOrganisationPayload {
            org_id: "ORG-ONE".into(),
            org_name: "Acme Ltd".into(),
            status: OrganisationStatus::Active,
        };
        svc.update("ORG1", payload).await.unwrap();

        let user = store.find_user(member.uid).await.unwrap().unwrap();
        assert_eq!(user.status, UserStatus::Active);
        assert_eq!(user.org_status, OrganisationStatus::Active);
        assert!(store.find_organisation("ORG1").await.unwrap().is_none());
        let renamed = store.find_organisation("ORG-ONE").await.unwrap().unwrap();
        assert_eq!(renamed.org_uuid, org.org_uuid);
    }

    #[tokio::test]
    async fn repeated_deactivation_catches_late_members() {
        let (store, svc) = service();
        let org = svc.create(create("ORG1", Some(OrganisationStatus::InActive))).await.unwrap();
        let mut late = add_member(&store, &org, "late").await;
        late.status = UserStatus::Created;
        store.replace_user(&late).await.unwrap();

        let payload = UpdateOrganisationPayload {
            org_id: "ORG1".into(),
            org_name: "Acme".into(),
            status: OrganisationStatus::InActive,
        };
        svc.update("ORG1", payload).await.unwrap();

        let user = store.find_user(late.uid).await.unwrap().unwrap();
        assert_eq!(user.status, UserStatus::Inactive);
        assert_eq!(user.org_status, OrganisationStatus::InActive);
    }

    #[tokio::test]
    async fn updating_unknown_organisation_is_not_found() {
        let (_, svc) = service();
        let payload = UpdateOrganisationPayload {
            org_id: "X".into(),
            org_name: "X".into(),
            status: OrganisationStatus::Active,
        };
        assert!(matches!(svc.update("X", payload).await, Err(AppError::NotFound(_))));
    }
}
