use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::Body,
    extract::{ConnectInfo, State},
    http::{Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use redis::AsyncCommands;

use crate::{
    config::Config,
    utils::{error_codes, error_to_api_response},
};

const RATE_LIMIT_PREFIX: &str = "crm:rate_limit:";

/// 写操作限流：同一来源 IP 在窗口内的请求数
#[derive(Clone)]
pub struct RateLimiter {
    redis: Arc<redis::Client>,
    window: Duration,
    max_requests: u32,
}

fn client_ip(req: &Request<Body>) -> String {
    let remote_ip = req
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ci| ci.0.ip().to_string());

    req.headers()
        .get("x-real-ip")
        .and_then(|h| h.to_str().ok())
        .or_else(|| {
            req.headers()
                .get("x-forwarded-for")
                .and_then(|h| h.to_str().ok())
                .and_then(|s| s.split(',').find(|ip| !ip.trim().is_empty()))
        })
        .or(remote_ip.as_deref())
        .unwrap_or("unknown")
        .trim()
        .to_string()
}

impl RateLimiter {
    pub fn new(redis: redis::Client, config: &Config) -> Self {
        Self {
            redis: Arc::new(redis),
            window: config.rate_limit_window(),
            max_requests: config.rate_limit_requests,
        }
    }

    /// 返回本窗口内的计数；首次计数时设置过期时间
    async fn hit(&self, ip: &str) -> redis::RedisResult<u32> {
        let key = format!("{}{}", RATE_LIMIT_PREFIX, ip);
        let mut conn = self.redis.get_multiplexed_async_connection().await?;

        let count: u32 = conn.incr(&key, 1).await?;
        if count == 1 {
            let _: () = conn.expire(&key, self.window.as_secs() as i64).await?;
        }
        Ok(count)
    }
}

pub async fn rate_limit(
    State(limiter): State<Arc<RateLimiter>>,
    req: Request<Body>,
    next: Next,
) -> Response {
    let ip = client_ip(&req);

    match limiter.hit(&ip).await {
        Ok(count) if count > limiter.max_requests => {
            tracing::warn!("Rate limit exceeded for {} ({} requests)", ip, count);
            (
                StatusCode::TOO_MANY_REQUESTS,
                error_to_api_response::<()>(
                    error_codes::RATE_LIMIT,
                    format!(
                        "요청이 너무 많습니다. {}초 후에 다시 시도해주세요.",
                        limiter.window.as_secs()
                    ),
                ),
            )
                .into_response()
        }
        Ok(_) => next.run(req).await,
        Err(e) => {
            // Redis 不可用时放行，表单不能因此卡住
            tracing::warn!("Rate limiter unavailable, letting request through: {}", e);
            next.run(req).await
        }
    }
}
