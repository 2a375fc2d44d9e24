/// Push dispatch handlers
use actix_web::{error::InternalError, web, HttpRequest, HttpResponse, ResponseError};
use nova_fcm_dispatch::{PushDispatcher, PushRequest};
use serde::Serialize;
use serde_json::Value;
use tracing::error;

use crate::error::{AppError, Result};
use crate::metrics;

/// Successful dispatch envelope
#[derive(Debug, Serialize)]
pub struct PushResponse {
    pub success: bool,
    pub result: Value,
}

/// Send one push notification
///
/// POST /
/// POST /api/v1/push/send
pub async fn send_push(
    dispatcher: web::Data<PushDispatcher>,
    req: web::Json<PushRequest>,
) -> Result<HttpResponse> {
    let request = req.into_inner();
    let protocol = dispatcher.protocol().name();

    match dispatcher.dispatch(&request).await {
        Ok(result) => {
            metrics::record_dispatch(protocol, "success");
            Ok(HttpResponse::Ok().json(PushResponse {
                success: true,
                result,
            }))
        }
        Err(e) => {
            error!(
                protocol = protocol,
                kind = e.kind(),
                "Push notification error: {}",
                e
            );
            metrics::record_dispatch(protocol, e.kind());
            Err(AppError::from(e))
        }
    }
}

/// CORS preflight without an `Origin` header still gets an empty 200
pub async fn preflight() -> HttpResponse {
    HttpResponse::Ok().finish()
}

/// Malformed request bodies use the same `{"error": ...}` envelope
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(|err, _req: &HttpRequest| {
        let response = AppError::BadRequest(err.to_string()).error_response();
        InternalError::from_response(err, response).into()
    })
}

pub fn register_routes(cfg: &mut web::ServiceConfig) {
    cfg.app_data(json_config())
        .service(
            web::resource("/")
                .route(web::post().to(send_push))
                .route(web::method(actix_web::http::Method::OPTIONS).to(preflight)),
        )
        .service(
            web::resource("/api/v1/push/send")
                .route(web::post().to(send_push))
                .route(web::method(actix_web::http::Method::OPTIONS).to(preflight)),
        );
}
