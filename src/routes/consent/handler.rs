use axum::{
    extract::{Json, State},
    http::StatusCode,
    response::IntoResponse,
};

use crate::{
    AppState,
    utils::{error_codes, error_to_api_response, success_to_api_response},
};

use super::model::{CheckRequest, ConsentResponse, SignatureRequest};

#[axum::debug_handler]
pub async fn get_consent(State(state): State<AppState>) -> impl IntoResponse {
    let form = state.consent.lock().await.clone();
    (StatusCode::OK, success_to_api_response(ConsentResponse::from(form)))
}

#[axum::debug_handler]
pub async fn check_consent(
    State(state): State<AppState>,
    Json(req): Json<CheckRequest>,
) -> impl IntoResponse {
    let mut form = state.consent.lock().await;
    form.set_checked(req.checked);
    (
        StatusCode::OK,
        success_to_api_response(ConsentResponse::from(form.clone())),
    )
}

#[axum::debug_handler]
pub async fn sign(
    State(state): State<AppState>,
    Json(req): Json<SignatureRequest>,
) -> impl IntoResponse {
    let mut form = state.consent.lock().await;
    form.set_signature(req.signature);
    (
        StatusCode::OK,
        success_to_api_response(ConsentResponse::from(form.clone())),
    )
}

#[axum::debug_handler]
pub async fn confirm(State(state): State<AppState>) -> impl IntoResponse {
    let mut form = state.consent.lock().await;
    match form.confirm() {
        Ok(()) => (
            StatusCode::OK,
            success_to_api_response(ConsentResponse::from(form.clone())),
        ),
        Err(e) => (
            StatusCode::OK,
            error_to_api_response(error_codes::VALIDATION_ERROR, e.to_string()),
        ),
    }
}

/// 不签名直接关闭对话框
#[axum::debug_handler]
pub async fn close(State(state): State<AppState>) -> impl IntoResponse {
    let mut form = state.consent.lock().await;
    form.close();
    (
        StatusCode::OK,
        success_to_api_response(ConsentResponse::from(form.clone())),
    )
}
