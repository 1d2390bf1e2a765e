/*
 * Responsibility
 * - v1 の URL 構造を定義
 * - public_routes(): /health (access token middleware の外側)
 * - routes(): /users/create (AllowAny), /users/profile (認証必須)
 * - 認証の要否は extractor (CurrentUser / CurrentIdentity) で handler ごとに宣言する
 */
use axum::{
    Router,
    routing::{get, post},
};

use crate::state::AppState;

use crate::api::v1::handlers::{
    health::health,
    profiles::{create_profile, get_profile, update_profile},
};

pub fn public_routes() -> Router<AppState> {
    Router::new().route("/health", get(health))
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/users/create", post(create_profile))
        .route("/users/profile", get(get_profile).patch(update_profile))
}
