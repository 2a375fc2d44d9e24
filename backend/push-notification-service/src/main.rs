use actix_web::{middleware, web, App, HttpServer};
use anyhow::Context;
use push_notification_service::{
    build_cors, build_dispatcher, cors_headers, handlers, metrics, Config,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,actix_web=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting push notification service");

    // Missing secrets stop startup before any network call is made.
    let config = Config::from_env().context("Failed to load configuration")?;

    tracing::info!(
        env = %config.app.env,
        protocol = config.push.protocol.name(),
        fcm_base_url = %config.push.endpoints.fcm_base_url,
        "Push dispatcher configured"
    );

    let dispatcher = web::Data::new(build_dispatcher(&config));
    let addr = format!("0.0.0.0:{}", config.app.port);

    tracing::info!("Starting HTTP server on {}", addr);

    HttpServer::new(move || {
        App::new()
            .app_data(dispatcher.clone())
            .wrap(cors_headers())
            .wrap(build_cors())
            .wrap(middleware::Logger::default())
            .wrap(metrics::MetricsMiddleware)
            .route("/health", web::get().to(|| async { "OK" }))
            .route("/metrics", web::get().to(metrics::serve_metrics))
            .configure(handlers::register_routes)
    })
    .bind(&addr)
    .with_context(|| format!("Failed to bind {}", addr))?
    .run()
    .await
    .context("HTTP server error")
}
