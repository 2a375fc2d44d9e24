use nova_fcm_dispatch::{DispatchEndpoints, DispatchError, PushProtocol};
use std::env;

pub const SUPABASE_URL: &str = "SUPABASE_URL";
pub const SUPABASE_SERVICE_ROLE_KEY: &str = "SUPABASE_SERVICE_ROLE_KEY";
pub const FIREBASE_SERVICE_ACCOUNT_KEY: &str = "FIREBASE_SERVICE_ACCOUNT_KEY";
pub const FCM_SERVER_KEY: &str = "FCM_SERVER_KEY";

#[derive(Debug, Clone)]
pub struct Config {
    pub app: AppConfig,
    pub profile_store: ProfileStoreConfig,
    pub push: PushConfig,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub env: String,
    pub port: u16,
}

/// Supabase PostgREST access for the `profiles` table
#[derive(Clone)]
pub struct ProfileStoreConfig {
    pub url: String,
    pub service_role_key: String,
}

impl std::fmt::Debug for ProfileStoreConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProfileStoreConfig")
            .field("url", &self.url)
            .field("service_role_key", &"<redacted>")
            .finish()
    }
}

#[derive(Debug, Clone)]
pub struct PushConfig {
    pub protocol: PushProtocol,
    pub endpoints: DispatchEndpoints,
}

impl Config {
    /// Load from the process environment (and `.env` when present)
    pub fn from_env() -> Result<Self, DispatchError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load from an arbitrary key lookup. Empty values count as unset.
    ///
    /// Fails with `UpstreamConfigurationMissing` when the profile store or
    /// both push credentials are absent. A service account key takes
    /// precedence over the legacy server key.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, DispatchError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let require = |key: &str| {
            get(key).ok_or_else(|| DispatchError::UpstreamConfigurationMissing(key.to_string()))
        };

        let port = match get("APP_PORT") {
            Some(raw) => raw.parse().map_err(|_| {
                DispatchError::UpstreamConfigurationMissing("APP_PORT (valid u16)".to_string())
            })?,
            None => 8000,
        };

        let protocol = match (get(FIREBASE_SERVICE_ACCOUNT_KEY), get(FCM_SERVER_KEY)) {
            (Some(service_account_json), _) => PushProtocol::V1 {
                service_account_json,
            },
            (None, Some(server_key)) => PushProtocol::Legacy { server_key },
            (None, None) => {
                return Err(DispatchError::UpstreamConfigurationMissing(
                    FIREBASE_SERVICE_ACCOUNT_KEY.to_string(),
                ))
            }
        };

        let defaults = DispatchEndpoints::default();

        Ok(Config {
            app: AppConfig {
                env: get("APP_ENV").unwrap_or_else(|| "development".to_string()),
                port,
            },
            profile_store: ProfileStoreConfig {
                url: require(SUPABASE_URL)?,
                service_role_key: require(SUPABASE_SERVICE_ROLE_KEY)?,
            },
            push: PushConfig {
                protocol,
                endpoints: DispatchEndpoints {
                    fcm_base_url: get("FCM_API_BASE_URL").unwrap_or(defaults.fcm_base_url),
                    token_uri: get("GOOGLE_TOKEN_URI").unwrap_or(defaults.token_uri),
                },
            },
        })
    }
}
