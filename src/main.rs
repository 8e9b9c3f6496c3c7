use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;

use mini_crm::{
    AppState,
    config::{Config, StoreBackend},
    crm::CrmController,
    middleware::RateLimiter,
    router::create_router,
    store::{MemberStore, MemoryStore, PgStore, SupabaseStore},
};
use sqlx::Executor;
use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

async fn build_store(config: &Config) -> Result<Arc<dyn MemberStore>, Box<dyn std::error::Error>> {
    let store: Arc<dyn MemberStore> = match config.store_backend {
        StoreBackend::Postgres => {
            let database_url = config
                .database_url
                .as_deref()
                .ok_or("DATABASE_URL is required")?;
            let pool = PgPoolOptions::new()
                .max_connections(5)
                .after_connect(|conn, _meta| {
                    Box::pin(async move {
                        conn.execute("SET application_name = 'mini_crm';").await?;
                        Ok(())
                    })
                })
                .connect(database_url)
                .await?;

            let store = PgStore::new(pool);
            if config.run_migrations {
                store.migrate().await?;
            }
            Arc::new(store)
        }
        StoreBackend::Supabase => {
            let url = config.supabase_url.as_deref().ok_or("SUPABASE_URL is required")?;
            let key = config.supabase_key.clone().ok_or("SUPABASE_KEY is required")?;
            Arc::new(SupabaseStore::new(url, key))
        }
        StoreBackend::Memory => {
            tracing::warn!("Using in-memory store, data is lost on restart");
            Arc::new(MemoryStore::new())
        }
    };
    Ok(store)
}

async fn shutdown_signal(crm: Arc<CrmController>) {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
    }
    tracing::info!("Shutdown signal received");
    // 未完成的存储调用立即返回，结果不再写回
    crm.shutdown();
}

#[tokio::main]
async fn main() {
    // 初始化日志
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env().expect("Failed to load configuration");
    tracing::info!("Using {:?} member store", config.store_backend);

    let store = build_store(&config)
        .await
        .expect("Failed to initialize member store");

    let crm = Arc::new(CrmController::new(store, config.crm_settings()));

    // 首次加载失败不致命，页面照常可用
    if let Err(e) = crm.load_initial().await {
        tracing::warn!("Initial load incomplete: {}", e);
    }

    let rate_limiter = match config.redis_url.as_deref() {
        Some(url) => {
            let client = redis::Client::open(url).expect("Failed to create Redis client");
            Some(Arc::new(RateLimiter::new(client, &config)))
        }
        None => {
            tracing::info!("REDIS_URL not set, rate limiting disabled");
            None
        }
    };

    let state = AppState::new(crm.clone(), config.clone());
    let app = create_router(state, rate_limiter);

    let addr = SocketAddr::new(
        config.server_host.parse().unwrap_or_else(|_| {
            tracing::warn!("Invalid server_host, falling back to dual-stack default");
            IpAddr::V6(std::net::Ipv6Addr::UNSPECIFIED)
        }),
        config.server_port,
    );
    tracing::info!("Server listening on {}", addr);

    axum::serve(
        tokio::net::TcpListener::bind(&addr)
            .await
            .expect("Failed to bind"),
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal(crm))
    .await
    .expect("Failed to start server");

    tracing::info!("Server stopped");
}
