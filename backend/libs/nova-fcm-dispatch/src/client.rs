use serde::Serialize;
use serde_json::Value;
use tracing::{info, warn};

use crate::errors::DispatchError;
use crate::models::{FcmV1Request, LegacyFcmRequest, PushMessage};
use crate::token_exchange::{diagnostic_body, AccessToken};

/// Production FCM host
pub const FCM_API_BASE_URL: &str = "https://fcm.googleapis.com";

/// How a single delivery is authenticated
#[derive(Clone)]
pub enum DispatchAuth {
    /// HTTP v1 API, OAuth2 bearer token scoped to a project
    V1 {
        project_id: String,
        access_token: AccessToken,
    },
    /// Legacy HTTP API with a static server key
    Legacy { server_key: String },
}

impl DispatchAuth {
    pub fn protocol(&self) -> &'static str {
        match self {
            DispatchAuth::V1 { .. } => "v1",
            DispatchAuth::Legacy { .. } => "legacy",
        }
    }
}

/// Firebase Cloud Messaging delivery client
///
/// Assembles the platform payload and performs exactly one send request.
#[derive(Debug, Clone)]
pub struct FcmDispatchClient {
    base_url: String,
    http_client: reqwest::Client,
}

impl FcmDispatchClient {
    /// Create a client for the given FCM host (no trailing slash needed)
    pub fn new(base_url: impl Into<String>, http_client: reqwest::Client) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            http_client,
        }
    }

    pub fn v1_send_url(&self, project_id: &str) -> String {
        format!("{}/v1/projects/{}/messages:send", self.base_url, project_id)
    }

    pub fn legacy_send_url(&self) -> String {
        format!("{}/fcm/send", self.base_url)
    }

    /// Deliver `message` and return the upstream response body
    pub async fn dispatch(
        &self,
        message: &PushMessage,
        auth: &DispatchAuth,
    ) -> Result<Value, DispatchError> {
        if message.token.is_empty() {
            return Err(DispatchError::NoTargetSpecified);
        }

        match auth {
            DispatchAuth::V1 {
                project_id,
                access_token,
            } => {
                let url = self.v1_send_url(project_id);
                let authorization = format!("Bearer {}", access_token.as_str());
                let body = FcmV1Request::from(message);
                self.post(&url, &authorization, &body, auth.protocol())
                    .await
            }
            DispatchAuth::Legacy { server_key } => {
                let url = self.legacy_send_url();
                let authorization = format!("key={}", server_key);
                let body = LegacyFcmRequest::from(message);
                self.post(&url, &authorization, &body, auth.protocol())
                    .await
            }
        }
    }

    async fn post<B: Serialize>(
        &self,
        url: &str,
        authorization: &str,
        body: &B,
        protocol: &'static str,
    ) -> Result<Value, DispatchError> {
        let response = self
            .http_client
            .post(url)
            .header("Authorization", authorization)
            .header("Content-Type", "application/json")
            .json(body)
            .send()
            .await
            .map_err(|e| DispatchError::DeliveryFailed(format!("send request failed: {}", e)))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| DispatchError::DeliveryFailed(format!("failed to read response: {}", e)))?;

        let payload = serde_json::from_str::<Value>(&text)
            .unwrap_or_else(|_| Value::String(text.clone()));

        if !status.is_success() || reports_error(&payload) {
            warn!(
                protocol = protocol,
                status = status.as_u16(),
                "FCM rejected the message"
            );
            return Err(DispatchError::DeliveryFailed(diagnostic_body(&text)));
        }

        info!(
            protocol = protocol,
            status = status.as_u16(),
            "Push notification delivered"
        );
        Ok(payload)
    }
}

/// Errors FCM reports inside a 2xx body: a top-level `error` member, or a
/// legacy `failure` count.
fn reports_error(payload: &Value) -> bool {
    if payload.get("error").is_some() {
        return true;
    }
    payload
        .get("failure")
        .and_then(Value::as_u64)
        .map(|failures| failures > 0)
        .unwrap_or(false)
}
