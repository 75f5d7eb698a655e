// src/services/user_service.rs

use std::sync::Arc;

use uuid::Uuid;

use crate::{
    common::{audit::user_changes, error::AppError},
    db::{OrganisationStore, UserStore},
    models::{
        history::UpdateHistory,
        organisation::Organisation,
        user::{
            BootstrapUserPayload, CreateUserPayload, Role, UpdateUserPayload, User, UserStatus,
        },
    },
    services::{
        auth::{AuthContext, AuthService},
        rbac,
    },
};

/// Actor recorded for accounts created through the API-key bootstrap routes.
pub const SYSTEM_ACTOR: &str = "system";

// Fields shared by every way a user comes into existence.
struct NewUser {
    user_id: String,
    username: String,
    password: String,
    role: Role,
    mobile_number: String,
    remarks: String,
}

#[derive(Clone)]
pub struct UserService {
    organisations: Arc<dyn OrganisationStore>,
    users: Arc<dyn UserStore>,
    auth: AuthService,
}

impl UserService {
    pub fn new(
        organisations: Arc<dyn OrganisationStore>,
        users: Arc<dyn UserStore>,
        auth: AuthService,
    ) -> Self {
        Self { organisations, users, auth }
    }

    /// Creates a user inside the caller's organisation.
    pub async fn create(&self, ctx: &AuthContext, payload: CreateUserPayload) -> Result<User, AppError> {
        rbac::ensure_can_manage(ctx.user.role, payload.role)?;

        let new_user = NewUser {
            user_id: payload.user_id,
            username: payload.username,
            password: payload.password,
            role: payload.role,
            mobile_number: payload.mobile_number,
            remarks: payload.remarks,
        };
        self.insert(&ctx.organisation, new_user, ctx.username()).await
    }

    /// Creates the first Admin or Owner of an organisation.
    pub async fn bootstrap(&self, payload: BootstrapUserPayload, role: Role) -> Result<User, AppError> {
        let organisation = self
            .organisations
            .find_organisation(&payload.org_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Organisation not found".into()))?;

        let new_user = NewUser {
            user_id: payload.user_id,
            username: payload.username,
            password: payload.password,
            role,
            mobile_number: payload.mobile_number,
            remarks: payload.remarks,
        };
        self.insert(&organisation, new_user, SYSTEM_ACTOR).await
    }

    async fn insert(&self, organisation: &Organisation, new_user: NewUser, actor: &str) -> Result<User, AppError> {
        let password_hash = self.auth.hash_password(&new_user.password).await?;
        let created = UpdateHistory::new("User created", actor);

        let user = User {
            uid: Uuid::new_v4(),
            user_id: new_user.user_id,
            username: new_user.username,
            password_hash,
            role: new_user.role,
            status: UserStatus::Created,
            mobile_number: new_user.mobile_number,
            org_uuid: organisation.org_uuid,
            org_status: organisation.status,
            remarks: new_user.remarks,
            created_time: created.timestamp,
            updated_time: created.timestamp,
            update_history: vec![created],
        };
        self.users.insert_user(&user).await?;

        tracing::info!(
            uid = %user.uid,
            role = %user.role,
            org_id = %organisation.org_id,
            actor,
            "user created"
        );
        Ok(user)
    }

    pub async fn list(&self, ctx: &AuthContext) -> Result<Vec<User>, AppError> {
        self.users.list_users(ctx.organisation.org_uuid).await
    }

    pub async fn find_by_user_id(&self, ctx: &AuthContext, user_id: &str) -> Result<User, AppError> {
        self.users
            .find_user_by_user_id(ctx.organisation.org_uuid, user_id)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".into()))
    }

    // Users of other organisations are reported as missing.
    async fn member(&self, ctx: &AuthContext, uid: Uuid) -> Result<User, AppError> {
        self.users
            .find_user(uid)
            .await?
            .filter(|user| user.org_uuid == ctx.organisation.org_uuid)
            .ok_or_else(|| AppError::NotFound("User not found".into()))
    }

    /// Full replacement of the editable fields, recorded as one history entry.
    pub async fn update(
        &self,
        ctx: &AuthContext,
        uid: Uuid,
        payload: UpdateUserPayload,
    ) -> Result<User, AppError> {
        let mut user = self.member(ctx, uid).await?;
        rbac::ensure_can_manage(ctx.user.role, user.role)?;
        rbac::ensure_can_manage(ctx.user.role, payload.role)?;

        let changes = user_changes(&user, &payload);
        let entry = UpdateHistory::new(changes.summary(), ctx.username());

        user.user_id = payload.user_id;
        user.username = payload.username;
        user.role = payload.role;
        user.status = payload.status;
        user.mobile_number = payload.mobile_number;
        user.remarks = payload.remarks;
        user.updated_time = entry.timestamp;
        user.update_history.push(entry);

        if !self.users.replace_user(&user).await? {
            return Err(AppError::NotFound("User not found".into()));
        }

        tracing::info!(uid = %user.uid, actor = ctx.username(), changes = changes.entries().len(), "user updated");
        Ok(user)
    }

    pub async fn set_password(&self, ctx: &AuthContext, uid: Uuid, password: &str) -> Result<(), AppError> {
        let mut user = self.member(ctx, uid).await?;
        rbac::ensure_can_set_password(ctx.user.role, user.role)?;

        user.password_hash = self.auth.hash_password(password).await?;
        let entry = UpdateHistory::new("password updated", ctx.username());
        user.updated_time = entry.timestamp;
        user.update_history.push(entry);

        if !self.users.replace_user(&user).await? {
            return Err(AppError::NotFound("User not found".into()));
        }

        tracing::info!(uid = %user.uid, actor = ctx.username(), "password updated");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        db::MemoryStore,
        models::{history::now, organisation::OrganisationStatus},
    };
    use chrono::Duration;

    struct Fixture {
        store: Arc<MemoryStore>,
        auth: AuthService,
        users: UserService,
        org: Organisation,
    }

    async fn fixture() -> Fixture {
        let store = Arc::new(MemoryStore::new());
        let auth = AuthService::new(store.clone(), store.clone(), "secret", Duration::hours(1), 4);
        let users = UserService::new(store.clone(), store.clone(), auth.clone());
        let org = Organisation {
            org_id: "ORG1".into(),
            org_uuid: Uuid::new_v4(),
            org_name: "Acme".into(),
            status: OrganisationStatus::Active,
        };
        store.insert_organisation(&org).await.unwrap();
        Fixture { store, auth, users, org }
    }

    impl Fixture {
        async fn context(&self, role: Role) -> AuthContext {
            let user = self
                .users
                .bootstrap(
                    BootstrapUserPayload {
                        org_id: self.org.org_id.clone(),
                        user_id: format!("{role}"),
                        username: format!("caller-{}", Uuid::new_v4()),
                        password: "secret1".into(),
                        mobile_number: String::new(),
                        remarks: String::new(),
                    },
                    role,
                )
                .await
                .unwrap();
            let (token, _) = self.auth.issue_token(&user).unwrap();
            AuthContext {
                claims: self.auth.verify_token(&token).unwrap(),
                organisation: self.org.clone(),
                user,
            }
        }
    }

    fn create(username: &str, role: Role) -> CreateUserPayload {
        CreateUserPayload {
            user_id: format!("id-{username}"),
            username: username.into(),
            password: "secret1".into(),
            role,
            mobile_number: "9876543210".into(),
            remarks: String::new(),
        }
    }

    fn replacement(user: &User) -> UpdateUserPayload {
        UpdateUserPayload {
            user_id: user.user_id.clone(),
            username: user.username.clone(),
            role: user.role,
            status: user.status,
            mobile_number: user.mobile_number.clone(),
            remarks: user.remarks.clone(),
        }
    }

    #[tokio::test]
    async fn create_records_creator_and_hashes_password() {
        let f = fixture().await;
        let ctx = f.context(Role::Owner).await;

        let user = f.users.create(&ctx, create("bob", Role::FieldLead)).await.unwrap();
        assert_eq!(user.status, UserStatus::Created);
        assert_eq!(user.org_uuid, f.org.org_uuid);
        assert_ne!(user.password_hash, "secret1");
        assert!(f.auth.verify_password("secret1", &user.password_hash).await.unwrap());
        assert_eq!(user.update_history.len(), 1);
        assert_eq!(user.update_history[0].comment, "User created");
        assert_eq!(user.update_history[0].actor, ctx.username());
    }

    #[tokio::test]
    async fn create_enforces_role_matrix() {
        let f = fixture().await;
        let ctx = f.context(Role::OperationsExecutive).await;

        let err = f.users.create(&ctx, create("boss", Role::Admin)).await.unwrap_err();
        assert!(matches!(err, AppError::Forbidden(_)));
        f.users.create(&ctx, create("field", Role::FieldExecutive)).await.unwrap();
    }

    #[tokio::test]
    async fn duplicate_username_conflicts() {
        let f = fixture().await;
        let ctx = f.context(Role::Admin).await;
        f.users.create(&ctx, create("bob", Role::FieldLead)).await.unwrap();
        let err = f.users.create(&ctx, create("bob", Role::FieldLead)).await.unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
    }

    #[tokio::test]
    async fn bootstrap_uses_system_actor_and_payload_org() {
        let f = fixture().await;
        let owner = f.context(Role::Owner).await.user;
        assert_eq!(owner.role, Role::Owner);
        assert_eq!(owner.update_history[0].actor, SYSTEM_ACTOR);

        let err = f
            .users
            .bootstrap(
                BootstrapUserPayload {
                    org_id: "MISSING".into(),
                    user_id: "1".into(),
                    username: "x".into(),
                    password: "secret1".into(),
                    mobile_number: String::new(),
                    remarks: String::new(),
                },
                Role::Admin,
            )
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn update_appends_diff_entry() {
        let f = fixture().await;
        let ctx = f.context(Role::Owner).await;
        let bob = f.users.create(&ctx, create("bob", Role::FieldLead)).await.unwrap();

        let payload = UpdateUserPayload { role: Role::OperationsLead, ..replacement(&bob) };
        let updated = f.users.update(&ctx, bob.uid, payload).await.unwrap();

        assert_eq!(updated.role, Role::OperationsLead);
        assert_eq!(updated.update_history.len(), 2);
        assert_eq!(
            updated.update_history[1].comment,
            "role changed from 'Field Lead' to 'Operations Lead'"
        );
        assert_eq!(updated.password_hash, bob.password_hash);
    }

    #[tokio::test]
    async fn update_checks_current_and_requested_role() {
        let f = fixture().await;
        let owner = f.context(Role::Owner).await;
        let exec = f.context(Role::OperationsExecutive).await;
        let field = f.users.create(&owner, create("f", Role::FieldLead)).await.unwrap();
        let lead = f.users.create(&owner, create("l", Role::OperationsLead)).await.unwrap();

        // Promotion beyond the caller's reach.
        let promote = UpdateUserPayload { role: Role::Admin, ..replacement(&field) };
        assert!(matches!(f.users.update(&exec, field.uid, promote).await, Err(AppError::Forbidden(_))));

        // Target already beyond the caller's reach.
        let demote = UpdateUserPayload { role: Role::FieldLead, ..replacement(&lead) };
        assert!(matches!(f.users.update(&exec, lead.uid, demote).await, Err(AppError::Forbidden(_))));
    }

    #[tokio::test]
    async fn other_organisations_are_invisible() {
        let f = fixture().await;
        let ctx = f.context(Role::Owner).await;

        let other = Organisation {
            org_id: "ORG2".into(),
            org_uuid: Uuid::new_v4(),
            org_name: "Other".into(),
            status: OrganisationStatus::Active,
        };
        f.store.insert_organisation(&other).await.unwrap();
        let stranger = User {
            uid: Uuid::new_v4(),
            user_id: "s".into(),
            username: "stranger".into(),
            password_hash: String::new(),
            role: Role::FieldLead,
            status: UserStatus::Active,
            mobile_number: String::new(),
            org_uuid: other.org_uuid,
            org_status: other.status,
            remarks: String::new(),
            created_time: now(),
            updated_time: now(),
            update_history: vec![],
        };
        f.store.insert_user(&stranger).await.unwrap();

        let err = f.users.update(&ctx, stranger.uid, replacement(&stranger)).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
        assert!(f.users.find_by_user_id(&ctx, "s").await.is_err());
        assert!(f.users.list(&ctx).await.unwrap().iter().all(|u| u.org_uuid == f.org.org_uuid));
    }

    #[tokio::test]
    async fn set_password_follows_password_matrix() {
        let f = fixture().await;
        let owner = f.context(Role::Owner).await;
        let field = f.users.create(&owner, create("f", Role::FieldLead)).await.unwrap();
        let admin = f.users.create(&owner, create("a", Role::Admin)).await.unwrap();

        let err = f.users.set_password(&owner, field.uid, "newpass").await.unwrap_err();
        assert!(matches!(err, AppError::Forbidden(_)));

        f.users.set_password(&owner, admin.uid, "newpass").await.unwrap();
        let stored = f.store.find_user(admin.uid).await.unwrap().unwrap();
        assert!(f.auth.verify_password("newpass", &stored.password_hash).await.unwrap());
        assert_eq!(stored.update_history.last().unwrap().comment, "password updated");
    }
}
