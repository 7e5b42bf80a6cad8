use axum::{Router, middleware, routing::get};
use axum_helpers::{health_router, jwt_auth_middleware};

use crate::state::AppState;

pub mod auth;
pub mod health;
pub mod users;

/// Creates the protected API routes without the `/api` prefix.
/// The `/api` prefix is added by `create_router`; every route requires a bearer token.
pub fn routes(state: &AppState) -> Router {
    Router::new()
        .nest("/users", users::router(state))
        .layer(middleware::from_fn_with_state(
            state.jwt_auth.clone(),
            jwt_auth_middleware,
        ))
}

/// Unauthenticated routes mounted at the root: `/login`, `/health`, `/ready`.
pub fn public_routes(state: &AppState) -> Router {
    Router::new()
        .merge(auth::router(state))
        .merge(health_router(state.config.app))
        .merge(
            Router::new()
                .route("/ready", get(health::ready_handler))
                .with_state(state.clone()),
        )
}
