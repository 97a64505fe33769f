use auth::AuthServicePort;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;

use super::token_pair_data;
use super::ApiError;
use super::ApiSuccess;
use super::TokenPairData;
use crate::inbound::http::router::AppState;

const MAX_USERNAME_LENGTH: usize = 50;
const MAX_PASSWORD_LENGTH: usize = 128;

pub async fn login(
    State(state): State<AppState>,
    Json(body): Json<LoginRequest>,
) -> Result<ApiSuccess<TokenPairData>, ApiError> {
    body.validate()?;

    let pair = state
        .auth_service
        .login(&body.username, &body.password)
        .await?;

    Ok(ApiSuccess::new(
        StatusCode::OK,
        token_pair_data(&state, pair).await,
    ))
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoginRequest {
    username: String,
    password: String,
}

impl LoginRequest {
    fn validate(&self) -> Result<(), ApiError> {
        if self.username.trim().is_empty() || self.password.is_empty() {
            return Err(ApiError::BadRequest(
                "Username and password are required".to_string(),
            ));
        }
        if self.username.chars().count() > MAX_USERNAME_LENGTH {
            return Err(ApiError::BadRequest(format!(
                "Username must not exceed {} characters",
                MAX_USERNAME_LENGTH
            )));
        }
        if self.password.chars().count() > MAX_PASSWORD_LENGTH {
            return Err(ApiError::BadRequest(format!(
                "Password must not exceed {} characters",
                MAX_PASSWORD_LENGTH
            )));
        }
        Ok(())
    }
}
