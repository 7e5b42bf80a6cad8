//! Users API
//!
//! JWT-protected CRUD over users, backed by either a seeded in-memory
//! store or PostgreSQL (`DB_TYPE`).

use axum::Router;
use axum_helpers::create_router;

pub mod api;
pub mod config;
pub mod openapi;
pub mod state;

pub use config::Config;
pub use state::{AppState, Storage};

/// Assembles the full application router: public routes at the root,
/// protected routes under `/api`, Swagger UI and the shared layers.
pub fn build_router(state: &AppState) -> std::io::Result<Router> {
    create_router::<openapi::ApiDoc>(api::public_routes(state), api::routes(state))
}
