use axum::{extract::State, http::StatusCode, response::IntoResponse};

use crate::{AppState, routes::crm_error_response, utils::success_to_api_response};

use super::model::{ReloadResponse, StatsResponse};

#[axum::debug_handler]
pub async fn list_groups(State(state): State<AppState>) -> impl IntoResponse {
    (StatusCode::OK, success_to_api_response(state.crm.groups()))
}

#[axum::debug_handler]
pub async fn list_members(State(state): State<AppState>) -> impl IntoResponse {
    (StatusCode::OK, success_to_api_response(state.crm.members()))
}

#[axum::debug_handler]
pub async fn member_stats(State(state): State<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        success_to_api_response(StatsResponse::from(state.crm.group_counts())),
    )
}

/// 重新执行首次加载
#[axum::debug_handler]
pub async fn reload(State(state): State<AppState>) -> impl IntoResponse {
    match state.crm.load_initial().await {
        Ok(()) => (
            StatusCode::OK,
            success_to_api_response(ReloadResponse {
                groups: state.crm.groups().len(),
                members: state.crm.members().len(),
            }),
        ),
        Err(e) => crm_error_response(e),
    }
}
