use auth::AuthServicePort;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Extension;

use crate::inbound::http::handlers::ApiError;
use crate::inbound::http::middleware::AuthenticatedUser;
use crate::inbound::http::router::AppState;
use crate::user::ports::UserServicePort;

/// Delete the caller's account. The presenting access token is revoked first so a
/// failed revocation leaves the account intact.
pub async fn delete_current_user(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthenticatedUser>,
) -> Result<StatusCode, ApiError> {
    state.auth_service.logout(&caller.access_token).await?;

    state.user_service.delete_user(&caller.user_id).await?;

    Ok(StatusCode::NO_CONTENT)
}
