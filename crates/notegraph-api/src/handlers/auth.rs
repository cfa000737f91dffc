//! Token issuance and user registration.

use axum::extract::{Query, State};
use axum::response::IntoResponse;
use axum::{Form, Json};
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};

use notegraph_core::{AccessToken, Error, User};

use crate::error::ApiError;
use crate::state::AppState;

/// OAuth2 password-grant style form.
#[derive(Deserialize, ToSchema)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

#[derive(Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct PasswordQuery {
    /// Plaintext password; stored only as a salted hash.
    pub password: String,
}

/// Exchange username and password for a bearer token.
#[utoipa::path(
    post,
    path = "/token",
    tag = "Auth",
    request_body(content = LoginForm, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 200, description = "Token issued", body = AccessToken),
        (status = 400, description = "Incorrect username or password")
    )
)]
pub async fn login(
    State(state): State<AppState>,
    Form(form): Form<LoginForm>,
) -> Result<impl IntoResponse, ApiError> {
    // Bad credentials on this endpoint are a 400, not a 401 challenge.
    let token = state
        .auth
        .login(&form.username, &form.password)
        .await
        .map_err(|e| match e {
            Error::Unauthorized(msg) => ApiError::BadRequest(msg),
            other => other.into(),
        })?;
    Ok(Json(token))
}

/// Register a user.
#[utoipa::path(
    post,
    path = "/users",
    tag = "Auth",
    params(PasswordQuery),
    request_body = User,
    responses(
        (status = 200, description = "User registered", body = User),
        (status = 400, description = "Username already registered or empty field")
    )
)]
pub async fn register(
    State(state): State<AppState>,
    Query(query): Query<PasswordQuery>,
    Json(user): Json<User>,
) -> Result<impl IntoResponse, ApiError> {
    let user = state.auth.register(user, &query.password).await?;
    Ok(Json(user))
}
