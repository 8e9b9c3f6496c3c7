use std::sync::Arc;

use axum::{
    Router,
    middleware::{from_fn, from_fn_with_state},
    routing::{get, post, put},
};
use tower_http::trace::TraceLayer;

use crate::{
    AppState,
    middleware::{RateLimiter, log_errors, rate_limit},
    routes,
};

// 只读接口，直接返回控制器的本地副本
fn read_routes() -> Router<AppState> {
    Router::new()
        .route("/groups", get(routes::member::list_groups))
        .route("/members", get(routes::member::list_members))
        .route("/members/stats", get(routes::member::member_stats))
        .route("/draft", get(routes::draft::get_draft))
        .route("/consent", get(routes::consent::get_consent))
}

// 会改变状态的接口，配置了 Redis 时受限流保护
fn write_routes(rate_limiter: Option<Arc<RateLimiter>>) -> Router<AppState> {
    let router = Router::new()
        .route("/members/reload", post(routes::member::reload))
        .route("/draft", put(routes::draft::update_field))
        .route("/draft/submit", post(routes::draft::submit))
        .route("/consent/check", post(routes::consent::check_consent))
        .route("/consent/signature", put(routes::consent::sign))
        .route("/consent/confirm", post(routes::consent::confirm))
        .route("/consent/close", post(routes::consent::close));

    match rate_limiter {
        Some(limiter) => router.route_layer(from_fn_with_state(limiter, rate_limit)),
        None => router,
    }
}

pub fn create_router(state: AppState, rate_limiter: Option<Arc<RateLimiter>>) -> Router {
    let api = Router::new()
        .merge(read_routes())
        .merge(write_routes(rate_limiter));

    let base = state.config.api_base_uri.trim_end_matches('/');
    let router = if base.is_empty() {
        api
    } else {
        Router::new().nest(base, api)
    };

    let router = router
        .layer(from_fn(log_errors))
        .layer(TraceLayer::new_for_http());

    // 开发模式下放开跨域，方便前端本地调试
    #[cfg(debug_assertions)]
    let router = router.layer(tower_http::cors::CorsLayer::permissive());

    router.with_state(state)
}
