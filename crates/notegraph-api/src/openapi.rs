//! OpenAPI document served at `/openapi.json` and browsed at `/docs`.

use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use notegraph_core::{AccessToken, Note, NoteInDb, User};

use crate::handlers;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Notegraph API",
        description = "Token-authenticated note storage on a vector database"
    ),
    paths(
        handlers::auth::login,
        handlers::auth::register,
        handlers::notes::create_note,
        handlers::notes::list_notes,
        handlers::notes::get_note,
        handlers::notes::update_note,
        handlers::system::health_check,
    ),
    components(schemas(User, AccessToken, Note, NoteInDb, handlers::auth::LoginForm)),
    modifiers(&BearerSecurity),
    tags(
        (name = "Auth", description = "Registration and token issuance"),
        (name = "Notes", description = "Note CRUD"),
        (name = "System", description = "Health checks")
    )
)]
pub struct ApiDoc;

struct BearerSecurity;

impl Modify for BearerSecurity {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}
