pub mod auth;
pub mod organisation_service;
pub mod prospect_service;
pub mod rbac;
pub mod user_service;

pub use auth::{AuthContext, AuthService};
pub use organisation_service::OrganisationService;
pub use prospect_service::ProspectService;
pub use user_service::UserService;
