/// Supabase profile store
///
/// Reads `profiles.fcm_token` through the PostgREST API using the service
/// role key, so row level security does not hide other users' tokens.
use async_trait::async_trait;
use nova_fcm_dispatch::{ProfileStore, ProfileStoreError};
use serde::Deserialize;
use tracing::debug;

use crate::config::ProfileStoreConfig;

#[derive(Debug, Deserialize)]
struct ProfileRow {
    fcm_token: Option<String>,
}

pub struct SupabaseProfileStore {
    base_url: String,
    service_role_key: String,
    http_client: reqwest::Client,
}

impl SupabaseProfileStore {
    pub fn new(config: &ProfileStoreConfig, http_client: reqwest::Client) -> Self {
        Self {
            base_url: config.url.trim_end_matches('/').to_string(),
            service_role_key: config.service_role_key.clone(),
            http_client,
        }
    }

    fn profiles_url(&self) -> String {
        format!("{}/rest/v1/profiles", self.base_url)
    }
}

#[async_trait]
impl ProfileStore for SupabaseProfileStore {
    async fn fetch_device_token(
        &self,
        recipient_id: &str,
    ) -> Result<Option<String>, ProfileStoreError> {
        let id_filter = format!("eq.{}", recipient_id);
        let response = self
            .http_client
            .get(self.profiles_url())
            .query(&[("select", "fcm_token"), ("id", id_filter.as_str())])
            .header("apikey", &self.service_role_key)
            .header("Authorization", format!("Bearer {}", self.service_role_key))
            .send()
            .await
            .map_err(|e| ProfileStoreError::Request(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ProfileStoreError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let rows: Vec<ProfileRow> = response
            .json()
            .await
            .map_err(|e| ProfileStoreError::Parse(e.to_string()))?;

        debug!(recipient_id = %recipient_id, rows = rows.len(), "Profile lookup completed");

        Ok(rows.into_iter().next().and_then(|row| row.fcm_token))
    }
}
