pub mod consent;
pub mod draft;
pub mod member;

use axum::{Json, http::StatusCode};

use crate::{
    error::CrmError,
    result::ApiResponse,
    utils::{error_codes, error_to_api_response},
};

/// 控制器错误到响应的统一映射
pub(crate) fn crm_error_response<T>(e: CrmError) -> (StatusCode, Json<ApiResponse<T>>) {
    match e {
        CrmError::MissingFields(fields) => (
            StatusCode::OK,
            error_to_api_response(
                error_codes::VALIDATION_ERROR,
                format!(
                    "필수 항목을 입력해주세요: {}",
                    fields.iter().map(|f| f.label()).collect::<Vec<_>>().join(", ")
                ),
            ),
        ),
        CrmError::Store(e) => (
            StatusCode::BAD_GATEWAY,
            error_to_api_response(error_codes::INTERNAL_ERROR, e.to_string()),
        ),
        CrmError::Cancelled => (
            StatusCode::SERVICE_UNAVAILABLE,
            error_to_api_response(
                error_codes::INTERNAL_ERROR,
                "서버가 종료 중입니다.".to_string(),
            ),
        ),
    }
}
