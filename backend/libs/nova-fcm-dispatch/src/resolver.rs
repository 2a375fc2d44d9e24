use async_trait::async_trait;
use tracing::{debug, warn};

use crate::errors::{DispatchError, ProfileStoreError};

/// Point lookup of a recipient's stored device token
#[async_trait]
pub trait ProfileStore: Send + Sync {
    /// `Ok(None)` when the profile or its token field does not exist
    async fn fetch_device_token(
        &self,
        recipient_id: &str,
    ) -> Result<Option<String>, ProfileStoreError>;
}

/// Resolve the device token to deliver to.
///
/// An explicit token wins and the store is never consulted. Otherwise the
/// recipient's profile is looked up exactly once.
pub async fn resolve(
    explicit_token: Option<&str>,
    recipient_id: Option<&str>,
    store: &dyn ProfileStore,
) -> Result<String, DispatchError> {
    if let Some(token) = explicit_token.filter(|t| !t.is_empty()) {
        return Ok(token.to_string());
    }

    let recipient_id = recipient_id
        .filter(|id| !id.is_empty())
        .ok_or(DispatchError::NoTargetSpecified)?;

    match store.fetch_device_token(recipient_id).await {
        Ok(Some(token)) if !token.is_empty() => {
            debug!(recipient_id = %recipient_id, "Resolved device token from profile");
            Ok(token)
        }
        Ok(_) => {
            debug!(recipient_id = %recipient_id, "Profile has no device token");
            Err(DispatchError::RecipientTokenNotFound)
        }
        Err(e) => {
            warn!(recipient_id = %recipient_id, error = %e, "Profile lookup failed");
            Err(DispatchError::RecipientTokenNotFound)
        }
    }
}
