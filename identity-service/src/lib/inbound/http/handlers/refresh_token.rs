use auth::AuthServicePort;
use axum::extract::State;
use axum::http::HeaderMap;
use axum::http::StatusCode;

use super::token_pair_data;
use super::ApiError;
use super::ApiSuccess;
use super::TokenPairData;
use crate::inbound::http::middleware::bearer_token;
use crate::inbound::http::router::AppState;

/// Rotate a refresh token presented as `Authorization: Bearer <refreshToken>`.
pub async fn refresh_token(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<ApiSuccess<TokenPairData>, ApiError> {
    let token = bearer_token(&headers)?;

    let pair = state.auth_service.refresh(token).await?;

    Ok(ApiSuccess::new(
        StatusCode::OK,
        token_pair_data(&state, pair).await,
    ))
}
