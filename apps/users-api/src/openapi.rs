use utoipa::{
    Modify, OpenApi,
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
};

/// Registers the `bearer_auth` scheme referenced by the users endpoints
struct BearerAuth;

impl Modify for BearerAuth {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(crate::api::auth::login),
    components(
        schemas(axum_helpers::ErrorResponse, crate::api::auth::LoginResponse),
        responses(axum_helpers::errors::responses::InternalServerErrorResponse)
    ),
    info(
        title = "Users API",
        version = "0.1.0",
        description = "CRUD for users behind JWT authentication"
    ),
    nest(
        (path = "/api/users", api = domain_users::handlers::ApiDoc)
    ),
    modifiers(&BearerAuth)
)]
pub struct ApiDoc;
