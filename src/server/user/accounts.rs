use std::sync::Arc;

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};

use crate::auth::RequireUser;
use crate::server::AppState;
use crate::server::dto::CreateAccountRequest;
use crate::server::response::{ApiError, ApiResponse};

pub async fn create_account(
    auth: RequireUser,
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateAccountRequest>,
) -> impl IntoResponse {
    let account = state
        .services
        .accounts
        .create_account(&auth.user, req.account_type, req.paid_months)?;

    Ok::<_, ApiError>((StatusCode::CREATED, Json(ApiResponse::success(account))))
}

pub async fn current_account(
    auth: RequireUser,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    let account = state.services.accounts.current_account(&auth.user)?;
    Ok::<_, ApiError>(Json(ApiResponse::success(account)))
}

pub async fn list_accounts(
    auth: RequireUser,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    let accounts = state.services.accounts.list_accounts(&auth.user)?;
    Ok::<_, ApiError>(Json(ApiResponse::success(accounts)))
}
