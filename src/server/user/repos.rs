use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};

use crate::auth::RequireUser;
use crate::server::AppState;
use crate::server::dto::{CreateRepoRequest, GrantAccessRequest, UpdateRepoRequest};
use crate::server::response::{ApiError, ApiResponse};

/// GET /repos - Repos the caller holds any role on
pub async fn list_repos(
    auth: RequireUser,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    let repos = state.services.repos.list_repos(&auth.user)?;
    Ok::<_, ApiError>(Json(ApiResponse::success(repos)))
}

/// POST /repos - Create a repo owned by the caller
pub async fn create_repo(
    auth: RequireUser,
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateRepoRequest>,
) -> impl IntoResponse {
    let repo = state.services.repos.create_repo(&auth.user, &req.name)?;
    Ok::<_, ApiError>((StatusCode::CREATED, Json(ApiResponse::success(repo))))
}

/// GET /repos/{id}
pub async fn get_repo(
    auth: RequireUser,
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> impl IntoResponse {
    let repo = state.services.repos.get_repo(&auth.user, id)?;
    Ok::<_, ApiError>(Json(ApiResponse::success(repo)))
}

/// PATCH /repos/{id} - Rename
pub async fn update_repo(
    auth: RequireUser,
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    Json(req): Json<UpdateRepoRequest>,
) -> impl IntoResponse {
    let repo = state.services.repos.rename_repo(&auth.user, id, &req.name)?;
    Ok::<_, ApiError>(Json(ApiResponse::success(repo)))
}

/// DELETE /repos/{id} - Owner only; removes boxes, media and blobs
pub async fn delete_repo(
    auth: RequireUser,
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> impl IntoResponse {
    state.services.repos.delete_repo(&auth.user, id).await?;
    Ok::<_, ApiError>(StatusCode::NO_CONTENT)
}

/// GET /repos/{id}/access
pub async fn list_access(
    auth: RequireUser,
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> impl IntoResponse {
    let access = state.services.repos.list_access(&auth.user, id)?;
    Ok::<_, ApiError>(Json(ApiResponse::success(access)))
}

/// POST /repos/{id}/access - Grant a role to another user
pub async fn grant_access(
    auth: RequireUser,
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    Json(req): Json<GrantAccessRequest>,
) -> impl IntoResponse {
    let access = state
        .services
        .repos
        .grant_access(&auth.user, id, &req.user_id, req.role)?;
    Ok::<_, ApiError>((StatusCode::CREATED, Json(ApiResponse::success(access))))
}
