use axum::{
    extract::{Json, State},
    http::StatusCode,
    response::IntoResponse,
};

use crate::{
    AppState,
    crm::{DraftField, DraftView},
    routes::crm_error_response,
    utils::{error_codes, error_to_api_response, success_to_api_response},
};

use super::model::UpdateFieldRequest;

#[axum::debug_handler]
pub async fn get_draft(State(state): State<AppState>) -> impl IntoResponse {
    (StatusCode::OK, success_to_api_response(state.crm.draft()))
}

#[axum::debug_handler]
pub async fn update_field(
    State(state): State<AppState>,
    Json(req): Json<UpdateFieldRequest>,
) -> impl IntoResponse {
    let field = match req.field.parse::<DraftField>() {
        Ok(field) => field,
        Err(e) => {
            return (
                StatusCode::OK,
                error_to_api_response::<DraftView>(error_codes::NOT_FOUND, e.to_string()),
            );
        }
    };

    state.crm.update_field(field, req.value);
    (StatusCode::OK, success_to_api_response(state.crm.draft()))
}

#[axum::debug_handler]
pub async fn submit(State(state): State<AppState>) -> impl IntoResponse {
    match state.crm.submit().await {
        Ok(receipt) => (StatusCode::CREATED, success_to_api_response(receipt)),
        Err(e) => crm_error_response(e),
    }
}
