use thiserror::Error;

/// Push dispatch error taxonomy
///
/// Every variant is terminal for the current dispatch attempt. Nothing is
/// retried here; callers decide whether to re-invoke.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DispatchError {
    #[error("No FCM token provided or found")]
    NoTargetSpecified,

    #[error("Recipient FCM token not found")]
    RecipientTokenNotFound,

    #[error("Invalid service account key: {0}")]
    CredentialMalformed(String),

    #[error("Firebase project ID not found in service account key")]
    ProjectIdentifierMissing,

    #[error("Failed to parse private key: {0}")]
    InvalidKeyMaterial(String),

    #[error("Failed to sign JWT: {0}")]
    SigningFailed(String),

    #[error("Failed to get access token: {0}")]
    TokenExchangeFailed(String),

    #[error("FCM API error: {0}")]
    DeliveryFailed(String),

    #[error("{0} environment variable not set")]
    UpstreamConfigurationMissing(String),
}

impl DispatchError {
    /// Stable machine-readable name of the error kind, used for metrics labels
    pub fn kind(&self) -> &'static str {
        match self {
            DispatchError::NoTargetSpecified => "no_target_specified",
            DispatchError::RecipientTokenNotFound => "recipient_token_not_found",
            DispatchError::CredentialMalformed(_) => "credential_malformed",
            DispatchError::ProjectIdentifierMissing => "project_identifier_missing",
            DispatchError::InvalidKeyMaterial(_) => "invalid_key_material",
            DispatchError::SigningFailed(_) => "signing_failed",
            DispatchError::TokenExchangeFailed(_) => "token_exchange_failed",
            DispatchError::DeliveryFailed(_) => "delivery_failed",
            DispatchError::UpstreamConfigurationMissing(_) => "upstream_configuration_missing",
        }
    }

    /// True for operational faults (missing secrets) as opposed to caller input faults
    pub fn is_infrastructure(&self) -> bool {
        matches!(self, DispatchError::UpstreamConfigurationMissing(_))
    }
}

/// Profile store lookup failure
#[derive(Error, Debug)]
pub enum ProfileStoreError {
    #[error("Profile store request failed: {0}")]
    Request(String),

    #[error("Profile store returned status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Failed to parse profile store response: {0}")]
    Parse(String),
}
