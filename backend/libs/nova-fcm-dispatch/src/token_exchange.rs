use serde_json::Value;
use tracing::{debug, warn};

use crate::assertion::SignedAssertion;
use crate::errors::DispatchError;

/// Google OAuth2 token endpoint; also the `aud` claim of the assertion
pub const GOOGLE_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";

pub const JWT_BEARER_GRANT_TYPE: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";

/// Short-lived OAuth2 bearer token
///
/// Not cached: every dispatch performs its own exchange.
#[derive(Clone, PartialEq, Eq)]
pub struct AccessToken(String);

impl AccessToken {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "AccessToken(<{} chars>)", self.0.len())
    }
}

/// Exchange a signed assertion for an access token.
///
/// One form-encoded POST, no retry and no timeout beyond the client's own.
pub async fn exchange(
    http_client: &reqwest::Client,
    token_uri: &str,
    assertion: &SignedAssertion,
) -> Result<AccessToken, DispatchError> {
    let jwt = assertion.compact();
    let params = [
        ("grant_type", JWT_BEARER_GRANT_TYPE),
        ("assertion", jwt.as_str()),
    ];

    let response = http_client
        .post(token_uri)
        .form(&params)
        .send()
        .await
        .map_err(|e| DispatchError::TokenExchangeFailed(e.to_string()))?;

    let status = response.status();
    let body = response
        .text()
        .await
        .map_err(|e| DispatchError::TokenExchangeFailed(e.to_string()))?;

    debug!(status = status.as_u16(), "Token endpoint responded");

    match extract_access_token(&body) {
        Some(token) => Ok(token),
        None => {
            warn!(
                status = status.as_u16(),
                "Token response has no access_token"
            );
            Err(DispatchError::TokenExchangeFailed(diagnostic_body(&body)))
        }
    }
}

fn extract_access_token(body: &str) -> Option<AccessToken> {
    let value: Value = serde_json::from_str(body).ok()?;
    value
        .get("access_token")
        .and_then(Value::as_str)
        .filter(|token| !token.is_empty())
        .map(AccessToken::new)
}

/// Upstream body as compact JSON, or the raw text when it is not JSON
pub(crate) fn diagnostic_body(body: &str) -> String {
    match serde_json::from_str::<Value>(body) {
        Ok(value) => value.to_string(),
        Err(_) => body.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_access_token() {
        let token = extract_access_token(
            r#"{"access_token":"ya29.abc","expires_in":3599,"token_type":"Bearer"}"#,
        )
        .unwrap();
        assert_eq!(token.as_str(), "ya29.abc");
    }

    #[test]
    fn test_missing_or_empty_access_token() {
        assert!(extract_access_token(r#"{"error":"invalid_grant"}"#).is_none());
        assert!(extract_access_token(r#"{"access_token":""}"#).is_none());
        assert!(extract_access_token(r#"{"access_token":12}"#).is_none());
        assert!(extract_access_token("<html>bad gateway</html>").is_none());
    }

    #[test]
    fn test_diagnostic_body_compacts_json() {
        assert_eq!(
            diagnostic_body("{ \"error\" : \"invalid_grant\" }"),
            r#"{"error":"invalid_grant"}"#
        );
        assert_eq!(diagnostic_body("upstream down"), "upstream down");
    }

    #[test]
    fn test_access_token_debug_hides_value() {
        let token = AccessToken::new("ya29.secret");
        assert!(!format!("{:?}", token).contains("secret"));
    }
}
