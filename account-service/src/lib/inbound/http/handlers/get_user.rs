use axum::extract::Path;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Extension;

use super::parse_user_id;
use super::ApiError;
use super::ApiSuccess;
use crate::domain::user::models::PublicUser;
use crate::inbound::http::middleware::AuthenticatedUser;
use crate::inbound::http::router::AppState;

pub async fn get_user(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthenticatedUser>,
    Path(user_id): Path<String>,
) -> Result<ApiSuccess<PublicUser>, ApiError> {
    let user_id = parse_user_id(&user_id)?;
    tracing::debug!(caller = %caller.user_id, user_id = %user_id, "Fetching user");

    state
        .auth_service
        .find_user_by_id(&user_id)
        .await
        .map_err(ApiError::from)
        .map(|user| ApiSuccess::new(StatusCode::OK, user))
}
