use chrono::Utc;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, info};

use crate::assertion::build_and_sign;
use crate::client::{DispatchAuth, FcmDispatchClient, FCM_API_BASE_URL};
use crate::credential::ServiceAccountCredential;
use crate::errors::DispatchError;
use crate::models::{PushMessage, PushRequest};
use crate::resolver::{resolve, ProfileStore};
use crate::token_exchange::{exchange, GOOGLE_TOKEN_URI};

/// Which FCM protocol this dispatcher speaks, fixed by the configured credential
#[derive(Clone)]
pub enum PushProtocol {
    /// HTTP v1 with the full service account key document
    V1 { service_account_json: String },
    /// Legacy HTTP API with a static server key
    Legacy { server_key: String },
}

impl PushProtocol {
    pub fn name(&self) -> &'static str {
        match self {
            PushProtocol::V1 { .. } => "v1",
            PushProtocol::Legacy { .. } => "legacy",
        }
    }
}

impl std::fmt::Debug for PushProtocol {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "PushProtocol::{}", self.name())
    }
}

/// Upstream endpoints, overridable for staging and tests
#[derive(Debug, Clone)]
pub struct DispatchEndpoints {
    pub fcm_base_url: String,
    pub token_uri: String,
}

impl Default for DispatchEndpoints {
    fn default() -> Self {
        Self {
            fcm_base_url: FCM_API_BASE_URL.to_string(),
            token_uri: GOOGLE_TOKEN_URI.to_string(),
        }
    }
}

/// Push dispatch pipeline
///
/// resolve target → (load credential → sign assertion → exchange token) →
/// deliver. Every step is awaited in order; nothing is shared between calls
/// beyond the immutable configuration and the HTTP connection pool.
pub struct PushDispatcher {
    protocol: PushProtocol,
    token_uri: String,
    http_client: reqwest::Client,
    fcm: FcmDispatchClient,
    profile_store: Arc<dyn ProfileStore>,
}

impl PushDispatcher {
    pub fn new(
        protocol: PushProtocol,
        endpoints: DispatchEndpoints,
        profile_store: Arc<dyn ProfileStore>,
    ) -> Self {
        let http_client = reqwest::Client::new();
        Self {
            protocol,
            token_uri: endpoints.token_uri,
            fcm: FcmDispatchClient::new(endpoints.fcm_base_url, http_client.clone()),
            http_client,
            profile_store,
        }
    }

    pub fn protocol(&self) -> &PushProtocol {
        &self.protocol
    }

    /// Perform one delivery attempt for `request`
    pub async fn dispatch(&self, request: &PushRequest) -> Result<Value, DispatchError> {
        let token = resolve(
            request.fcm_token.as_deref(),
            request.recipient_id.as_deref(),
            self.profile_store.as_ref(),
        )
        .await?;

        let message = PushMessage::new(token, request);
        let auth = self.authenticate().await?;

        info!(
            protocol = auth.protocol(),
            recipient_id = request.recipient_id.as_deref().unwrap_or("-"),
            "Dispatching push notification"
        );

        self.fcm.dispatch(&message, &auth).await
    }

    async fn authenticate(&self) -> Result<DispatchAuth, DispatchError> {
        match &self.protocol {
            PushProtocol::V1 {
                service_account_json,
            } => {
                let credential = ServiceAccountCredential::load(service_account_json)?;
                debug!(issuer = %credential.client_email, "Creating JWT for service account");

                let assertion = build_and_sign(&credential, Utc::now(), &self.token_uri)?;
                let access_token = exchange(&self.http_client, &self.token_uri, &assertion).await?;

                Ok(DispatchAuth::V1 {
                    project_id: credential.project_id,
                    access_token,
                })
            }
            PushProtocol::Legacy { server_key } => Ok(DispatchAuth::Legacy {
                server_key: server_key.clone(),
            }),
        }
    }
}
