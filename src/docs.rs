// src/docs.rs

use utoipa::OpenApi;
use utoipa::openapi::security::{ApiKey, ApiKeyValue, Http, HttpAuthScheme, SecurityScheme};

use crate::{common, handlers, models};

#[derive(OpenApi)]
#[openapi(
    paths(
        // --- Organisations ---
        handlers::organisations::create_organisation,
        handlers::organisations::update_organisation,
        handlers::organisations::list_organisations,

        // --- Auth ---
        handlers::users::login,

        // --- Users ---
        handlers::users::create_user,
        handlers::users::create_admin,
        handlers::users::create_owner,
        handlers::users::list_users,
        handlers::users::get_user,
        handlers::users::update_user,
        handlers::users::set_password,
        handlers::users::list_roles,
        handlers::users::list_statuses,

        // --- Prospects ---
        handlers::prospects::create_prospect,
        handlers::prospects::get_prospect,
        handlers::prospects::update_prospect,
        handlers::prospects::list_prospects,
        handlers::prospects::count_prospects,
    ),
    components(
        schemas(
            common::error::ErrorBody,
            models::history::UpdateHistory,

            // --- Organisations ---
            models::organisation::OrganisationStatus,
            models::organisation::Organisation,
            models::organisation::CreateOrganisationPayload,
            models::organisation::UpdateOrganisationPayload,

            // --- Auth ---
            models::auth::LoginPayload,
            models::auth::LoginResponse,
            models::auth::MessageResponse,

            // --- Users ---
            models::user::Role,
            models::user::UserStatus,
            models::user::User,
            models::user::CreateUserPayload,
            models::user::BootstrapUserPayload,
            models::user::UpdateUserPayload,
            models::user::SetPasswordPayload,

            // --- Prospects ---
            models::prospect::EmploymentType,
            models::prospect::ProspectStatus,
            models::prospect::Prospect,
            models::prospect::ProspectPayload,
            models::prospect::ProspectCount,
        )
    ),
    tags(
        (name = "Organisations", description = "Tenant registration and lifecycle"),
        (name = "Auth", description = "Login and token issuance"),
        (name = "Users", description = "Members of an organisation"),
        (name = "Prospects", description = "Field verification records")
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "api_jwt",
            SecurityScheme::Http(
                Http::new(HttpAuthScheme::Bearer)
            ),
        );
        components.add_security_scheme(
            "api_key",
            SecurityScheme::ApiKey(ApiKey::Header(ApiKeyValue::new("X-API-Key"))),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_lists_every_route() {
        let doc = ApiDoc::openapi();
        let paths: Vec<&str> = doc.paths.paths.keys().map(String::as_str).collect();
        for expected in [
            "/api/v1/organisations",
            "/api/v1/organisations/{org_id}",
            "/api/v1/users/login",
            "/api/v1/users/uid/{uid}/setpassword",
            "/api/v1/prospects/{uid}",
            "/api/v1/prospects/count",
        ] {
            assert!(paths.contains(&expected), "missing {expected}");
        }
    }

    #[test]
    fn both_security_schemes_are_registered() {
        let doc = ApiDoc::openapi();
        let schemes = &doc.components.expect("components").security_schemes;
        assert!(schemes.contains_key("api_jwt"));
        assert!(schemes.contains_key("api_key"));
    }
}
