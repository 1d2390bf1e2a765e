use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use crate::error::AppError;
use crate::services::auth::{AnonymousPrincipal, Identity, Principal};
use crate::state::AppState;

/// Handler で、認証済みの Principal を受け取るための extractor
/// Anonymous または Identity 未設定（ミドルウェア未適用）の場合は 401 を返す
pub struct CurrentUser(pub Principal);

/// AllowAny な handler 用。Authenticated / Anonymous のどちらも受け取る
/// ミドルウェア未適用の場合は Anonymous として扱う
pub struct CurrentIdentity(pub Identity);

impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        _state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        match parts.extensions.get::<Identity>() {
            Some(Identity::Authenticated(principal)) => Ok(CurrentUser(principal.clone())),
            Some(Identity::Anonymous(_)) | None => Err(AppError::unauthorized(
                "NOT_AUTHENTICATED",
                "authentication credentials were not provided",
            )),
        }
    }
}

impl FromRequestParts<AppState> for CurrentIdentity {
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        _state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let identity = parts
            .extensions
            .get::<Identity>()
            .cloned()
            .unwrap_or(Identity::Anonymous(AnonymousPrincipal));

        Ok(CurrentIdentity(identity))
    }
}
