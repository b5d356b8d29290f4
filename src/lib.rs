//! CareerCompass Backend - library for app logic and testing

pub mod ai;
pub mod config;
pub mod db;
pub mod logging;
pub mod notify;
pub mod routes;

use axum::{
    http::{HeaderValue, Method},
    middleware,
    routing::{get, patch, post},
    Router,
};
use std::net::SocketAddr;
use tower_http::{
    compression::CompressionLayer, cors::CorsLayer, limit::RequestBodyLimitLayer, trace::TraceLayer,
};

/// Configure CORS from environment variables.
/// Uses ALLOWED_ORIGINS (comma-separated) or FRONTEND_ORIGIN.
/// Falls back to the local SPA dev servers.
pub fn configure_cors() -> CorsLayer {
    let allowed_origins = std::env::var("ALLOWED_ORIGINS")
        .ok()
        .and_then(|s| {
            let origins: Vec<HeaderValue> = s
                .split(',')
                .filter_map(|origin| origin.trim().parse().ok())
                .collect();
            if origins.is_empty() {
                None
            } else {
                Some(origins)
            }
        })
        .or_else(|| {
            std::env::var("FRONTEND_ORIGIN")
                .ok()
                .and_then(|s| s.parse().ok())
                .map(|origin| vec![origin])
        })
        .unwrap_or_else(|| {
            vec![
                "http://localhost:3000".parse().unwrap(),
                "http://127.0.0.1:3000".parse().unwrap(),
            ]
        });

    CorsLayer::new()
        .allow_origin(allowed_origins)
        .allow_methods([Method::GET, Method::POST, Method::PATCH])
        .allow_headers([axum::http::header::CONTENT_TYPE])
}

/// Create and configure the application router.
pub fn create_app() -> Router {
    let cors = configure_cors();
    tracing::info!("CORS configured");

    Router::new()
        .route("/api/logs", post(routes::logs::receive_client_logs))
        .route("/api/packages", get(routes::packages::list_packages))
        .route("/api/packages/{id}", get(routes::packages::get_package))
        .route("/api/resources", get(routes::resources::list_resources))
        .route(
            "/api/resources/{id}/download",
            post(routes::resources::create_resource_download),
        )
        .route(
            "/api/resources/{id}/downloads",
            get(routes::resources::list_resource_downloads),
        )
        .route(
            "/api/blog",
            get(routes::blog::list_posts).post(routes::blog::create_post),
        )
        .route("/api/blog/generate", post(routes::blog::generate_post))
        .route("/api/blog/improve", post(routes::blog::improve_post))
        .route("/api/blog/{id}", get(routes::blog::get_post))
        .route(
            "/api/contact",
            post(routes::contact::create_contact_submission),
        )
        .route("/api/bookings", post(routes::bookings::create_booking))
        .route(
            "/api/bookings/{id}",
            get(routes::bookings::get_booking).patch(routes::bookings::update_booking),
        )
        .route("/api/payments", post(routes::payments::create_payment))
        .route(
            "/api/payments/webhook",
            post(routes::payments::payment_webhook),
        )
        .route(
            "/api/notifications",
            get(routes::notifications::list_notifications),
        )
        .route(
            "/api/notifications/{id}/read",
            patch(routes::notifications::mark_notification_read),
        )
        .route("/health", get(routes::health::health_ping))
        .route("/health/detailed", get(routes::health::health_detailed))
        .route("/health/database", get(routes::health::health_database))
        .route("/health/ready", get(routes::health::health_ready))
        .layer(logging::middleware::propagate_request_id_layer())
        .layer(middleware::from_fn(logging::middleware::log_request))
        .layer(logging::middleware::request_id_layer())
        .layer(TraceLayer::new_for_http())
        // Compress responses with gzip/br/zstd automatically
        .layer(CompressionLayer::new())
        // Global 2 MB request body cap — prevents unbounded buffering
        .layer(RequestBodyLimitLayer::new(2 * 1024 * 1024))
        .layer(cors)
}

/// Run the server (used by main).
pub async fn run() {
    dotenvy::dotenv().ok();

    // Guards MUST be held for the programme's lifetime; dropping them early
    // shuts down background log-writer threads and loses buffered log lines.
    let _log_guards = logging::init();

    let app_config = config::init();
    routes::health::init_start_time();

    if app_config.is_production() && !app_config.ai.is_configured() {
        tracing::warn!(
            "No completion API key set. Blog generation endpoints will answer 503 \
             until COMPLETION_API_KEY (or OPENAI_API_KEY) is configured."
        );
    }

    if std::env::var("DATABASE_URL").is_ok() {
        match db::init_pool(None).await {
            Ok(pool) => {
                if let Err(e) = db::run_migrations(&pool).await {
                    tracing::error!("Failed to run database migrations: {}", e);
                } else if let Err(e) = db::seed_defaults(&pool).await {
                    tracing::error!("Failed to seed reference data: {}", e);
                }
            }
            Err(e) => {
                tracing::warn!(
                    "Failed to initialize database pool: {}. Continuing without database.",
                    e
                );
            }
        }
    } else {
        tracing::info!("DATABASE_URL not set. Running without database connection.");
    }

    let app = create_app();

    let addr: SocketAddr = format!("{}:{}", app_config.host, app_config.port)
        .parse()
        .expect("Invalid HOST/PORT configuration");
    tracing::info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await
    .expect("Server error");
}
