use axum::{
    body::{Body, to_bytes},
    http::{Request, header},
    middleware::Next,
    response::Response,
};
use tracing::error;

// 只截断日志，响应体原样返回
const MAX_LOGGED_CHARS: usize = 4096;

/// 5xx 响应把响应体记进日志，便于追查存储端的报错
pub async fn log_errors(req: Request<Body>, next: Next) -> Response {
    let method = req.method().clone();
    let uri = req.uri().clone();
    let response = next.run(req).await;

    if !response.status().is_server_error() {
        return response;
    }

    let (mut parts, body) = response.into_parts();
    let bytes = match to_bytes(body, usize::MAX).await {
        Ok(b) => b,
        Err(e) => {
            error!("{} {} failed, unreadable body: {}", method, uri, e);
            return Response::from_parts(parts, Body::empty());
        }
    };

    let text = String::from_utf8_lossy(&bytes);
    let logged: String = text.chars().take(MAX_LOGGED_CHARS).collect();
    error!(
        "{} {} failed - Status: {}, Body: {}{}",
        method,
        uri,
        parts.status,
        logged,
        if logged.len() < text.len() { "…" } else { "" }
    );

    parts.headers.remove(header::CONTENT_LENGTH);
    Response::from_parts(parts, Body::from(bytes))
}
