pub mod config;
pub mod error;
pub mod handlers;
pub mod metrics;
pub mod services;

use actix_cors::Cors;
use actix_web::middleware::DefaultHeaders;
use nova_fcm_dispatch::PushDispatcher;
use std::sync::Arc;

pub use config::Config;
pub use error::{AppError, Result};
pub use services::SupabaseProfileStore;

/// Headers browser clients of the push endpoint send
pub const CORS_ALLOWED_HEADERS: [&str; 4] =
    ["authorization", "x-client-info", "apikey", "content-type"];

/// Any origin, method and header list is accepted, so every preflight gets a 200.
/// Responses carry `Access-Control-Allow-Origin: *`.
pub fn build_cors() -> Cors {
    Cors::default()
        .allow_any_origin()
        .send_wildcard()
        .allow_any_method()
        .allow_any_header()
        .expose_headers(CORS_ALLOWED_HEADERS)
        .max_age(3600)
}

/// CORS headers for responses the `Cors` middleware leaves alone, such as a bare
/// `OPTIONS` without an `Origin`. Headers already set are not overwritten.
pub fn cors_headers() -> DefaultHeaders {
    DefaultHeaders::new()
        .add(("Access-Control-Allow-Origin", "*"))
        .add(("Access-Control-Allow-Headers", CORS_ALLOWED_HEADERS.join(", ")))
}

/// Wire the Supabase profile store and the configured FCM protocol together
pub fn build_dispatcher(config: &Config) -> PushDispatcher {
    let http_client = reqwest::Client::new();
    let profile_store = Arc::new(SupabaseProfileStore::new(&config.profile_store, http_client));
    PushDispatcher::new(
        config.push.protocol.clone(),
        config.push.endpoints.clone(),
        profile_store,
    )
}
