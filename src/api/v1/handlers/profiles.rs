/*
 * Responsibility
 * - /users 系 handler (profile の作成・参照・部分更新)
 * - Json を extractor で受け、DTO validation → ProfileStore 呼び出し
 * - profile の id は token の user_id (UUID) と一致する
 */
use axum::{Json, extract::State, http::StatusCode};
use uuid::Uuid;

use crate::{
    api::v1::{
        dto::profiles::{CreateProfileRequest, ProfileResponse, UpdateProfileRequest},
        extractors::{CurrentIdentity, CurrentUser, JsonBody},
    },
    error::AppError,
    services::auth::Principal,
    state::AppState,
};

// Created right after sign-up by the authorization flow, so anonymous callers are allowed.
pub async fn create_profile(
    State(state): State<AppState>,
    CurrentIdentity(identity): CurrentIdentity,
    JsonBody(req): JsonBody<CreateProfileRequest>,
) -> Result<(StatusCode, Json<ProfileResponse>), AppError> {
    req.validate()
        .map_err(|msg| AppError::bad_request("VALIDATION_ERROR", msg))?;

    let row = state.profiles.create(req.into_new_profile()).await?;

    tracing::info!(
        profile_id = %row.id,
        authenticated = identity.is_authenticated(),
        created_by = identity.principal().map(Principal::id).unwrap_or("-"),
        "profile created"
    );

    Ok((StatusCode::CREATED, Json(row.into())))
}

pub async fn get_profile(
    State(state): State<AppState>,
    CurrentUser(principal): CurrentUser,
) -> Result<Json<ProfileResponse>, AppError> {
    let id = profile_id(&principal)?;
    let row = state.profiles.get(id).await?;

    Ok(Json(row.into()))
}

pub async fn update_profile(
    State(state): State<AppState>,
    CurrentUser(principal): CurrentUser,
    JsonBody(req): JsonBody<UpdateProfileRequest>,
) -> Result<Json<ProfileResponse>, AppError> {
    let id = profile_id(&principal)?;
    req.validate()
        .map_err(|msg| AppError::bad_request("VALIDATION_ERROR", msg))?;

    let row = state.profiles.update(id, req.into_patch()).await?;

    Ok(Json(row.into()))
}

// A user_id that is not a UUID can never match a stored profile.
fn profile_id(principal: &Principal) -> Result<Uuid, AppError> {
    Uuid::parse_str(principal.id()).map_err(|_| {
        tracing::debug!(user_id = %principal.id(), "principal id is not a profile id");
        AppError::not_found("User")
    })
}
