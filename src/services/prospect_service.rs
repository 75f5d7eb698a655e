// src/services/prospect_service.rs

use std::sync::Arc;

use uuid::Uuid;

use crate::{
    common::{audit::prospect_changes, error::AppError},
    db::{Pagination, ProspectStore},
    models::{
        history::UpdateHistory,
        prospect::{Prospect, ProspectPayload},
    },
    services::auth::AuthContext,
};

#[derive(Clone)]
pub struct ProspectService {
    prospects: Arc<dyn ProspectStore>,
}

impl ProspectService {
    pub fn new(prospects: Arc<dyn ProspectStore>) -> Self {
        Self { prospects }
    }

    pub async fn create(&self, ctx: &AuthContext, payload: ProspectPayload) -> Result<Prospect, AppError> {
        let prospect = Prospect::from_payload(payload, ctx.username());
        self.prospects.insert_prospect(&prospect).await?;

        tracing::info!(uid = %prospect.uid, actor = ctx.username(), "prospect created");
        Ok(prospect)
    }

    pub async fn find(&self, uid: Uuid) -> Result<Prospect, AppError> {
        self.prospects
            .find_prospect(uid)
            .await?
            .ok_or_else(|| AppError::NotFound("Prospect not found".into()))
    }

    /// Replaces the prospect with `payload` and appends one history entry
    /// describing what changed (possibly an empty description).
    pub async fn update(
        &self,
        ctx: &AuthContext,
        uid: Uuid,
        payload: ProspectPayload,
    ) -> Result<Prospect, AppError> {
        let mut prospect = self.find(uid).await?;

        let changes = prospect_changes(&prospect, &payload);
        let entry = UpdateHistory::new(changes.summary(), ctx.username());

        prospect.apply(payload);
        prospect.updated_by = ctx.username().to_string();
        prospect.updated_time = entry.timestamp;
        prospect.update_history.push(entry);

        if !self.prospects.replace_prospect(&prospect).await? {
            return Err(AppError::NotFound("Prospect not found".into()));
        }

        tracing::info!(
            uid = %prospect.uid,
            actor = ctx.username(),
            changes = changes.entries().len(),
            "prospect updated"
        );
        Ok(prospect)
    }

    pub async fn list(&self, page: Pagination) -> Result<Vec<Prospect>, AppError> {
        self.prospects.list_prospects(page).await
    }

    pub async fn count(&self) -> Result<u64, AppError> {
        self.prospects.count_prospects().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        db::MemoryStore,
        models::{
            auth::Claims,
            history::now,
            organisation::{Organisation, OrganisationStatus},
            prospect::ProspectStatus,
            user::{Role, User, UserStatus},
        },
    };

    fn context(username: &str) -> AuthContext {
        let organisation = Organisation {
            org_id: "ORG1".into(),
            org_uuid: Uuid::new_v4(),
            org_name: "Acme".into(),
            status: OrganisationStatus::Active,
        };
        let user = User {
            uid: Uuid::new_v4(),
            user_id: "1".into(),
            username: username.into(),
            password_hash: String::new(),
            role: Role::FieldLead,
            status: UserStatus::Active,
            mobile_number: String::new(),
            org_uuid: organisation.org_uuid,
            org_status: organisation.status,
            remarks: String::new(),
            created_time: now(),
            updated_time: now(),
            update_history: vec![],
        };
        let claims = Claims::for_user(&user, now(), now());
        AuthContext { claims, organisation, user }
    }

    fn service() -> ProspectService {
        ProspectService::new(Arc::new(MemoryStore::new()))
    }

    #[tokio::test]
    async fn update_overwrites_and_records_changes() {
        let svc = service();
        let creator = context("alice");
        let editor = context("bob");

        let created = svc
            .create(&creator, ProspectPayload { applicant_name: "A".into(), ..Default::default() })
            .await
            .unwrap();

        let payload = ProspectPayload {
            applicant_name: "B".into(),
            status: Some(ProspectStatus::OnVisit),
            ..Default::default()
        };
        let updated = svc.update(&editor, created.uid, payload).await.unwrap();

        assert_eq!(updated.applicant_name, "B");
        assert_eq!(updated.status, ProspectStatus::OnVisit);
        assert_eq!(updated.created_by, "alice");
        assert_eq!(updated.updated_by, "bob");
        assert_eq!(updated.update_history.len(), 2);
        assert_eq!(updated.update_history[1].comment, "ApplicantName updated, Status updated");
        assert_eq!(updated.update_history[1].actor, "bob");

        assert_eq!(svc.find(created.uid).await.unwrap(), updated);
    }

    #[tokio::test]
    async fn clearing_a_field_overwrites_silently() {
        let svc = service();
        let ctx = context("alice");
        let created = svc
            .create(&ctx, ProspectPayload { applicant_name: "A".into(), ..Default::default() })
            .await
            .unwrap();

        let updated = svc.update(&ctx, created.uid, ProspectPayload::default()).await.unwrap();
        assert_eq!(updated.applicant_name, "");
        assert_eq!(updated.update_history.len(), 2);
        assert_eq!(updated.update_history[1].comment, "");
    }

    #[tokio::test]
    async fn unknown_prospect_is_not_found() {
        let svc = service();
        let err = svc
            .update(&context("alice"), Uuid::new_v4(), ProspectPayload::default())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn count_ignores_window() {
        let svc = service();
        let ctx = context("alice");
        for _ in 0..3 {
            svc.create(&ctx, ProspectPayload::default()).await.unwrap();
        }
        let page = svc.list(Pagination { skip: 0, limit: 2 }).await.unwrap();
        assert_eq!(page.len(), 2);
        assert_eq!(svc.count().await.unwrap(), 3);
    }
}
