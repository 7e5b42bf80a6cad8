//! Stub login: issues a token without checking credentials.

use axum::{Json, Router, extract::State, routing::post};
use axum_helpers::{
    AppError, JwtAuth, LOGIN_TOKEN_TTL, errors::responses::InternalServerErrorResponse,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::state::AppState;

/// Subject of every token issued by `/login`
pub const LOGIN_SUBJECT: &str = "anonymous";

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct LoginResponse {
    /// HS256 bearer token, valid for 72 hours
    pub token: String,
}

pub fn router(state: &AppState) -> Router {
    Router::new()
        .route("/login", post(login))
        .with_state(state.jwt_auth.clone())
}

/// Issue an access token
#[utoipa::path(
    post,
    path = "/login",
    tag = "auth",
    responses(
        (status = 200, description = "Token issued", body = LoginResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
pub async fn login(State(jwt_auth): State<JwtAuth>) -> Result<Json<LoginResponse>, AppError> {
    let token = jwt_auth
        .create_token(LOGIN_SUBJECT, LOGIN_TOKEN_TTL)
        .map_err(|e| AppError::InternalServerError(format!("Failed to sign token: {}", e)))?;

    tracing::info!(sub = LOGIN_SUBJECT, "Issued login token");
    Ok(Json(LoginResponse { token }))
}
