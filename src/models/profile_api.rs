//! Client for the hosted profile service.
//!
//! The service is a Postgres-backed REST endpoint (PostgREST dialect) with
//! one `profiles` table, one row per user. The client is deliberately thin:
//! single-row select and insert, no retry, no reconciliation. Read failures
//! collapse to "no profile"; write failures surface as a boolean so the
//! caller decides what the user sees.

use reqwest::header;
use tracing::{debug, warn};

use crate::config::ProfileService;
use crate::errors::Error;

use super::profile::{NewProfile, Profile};

#[derive(Debug, Clone)]
pub struct ProfileApi {
    client: reqwest::Client,
    base_url: String,
    anon_key: String,
    access_token: Option<String>,
}

impl ProfileApi {
    pub fn new(base_url: String, anon_key: String, access_token: Option<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            anon_key,
            access_token,
        }
    }

    /// Builds a client from configuration, or `None` when the service is not
    /// configured — the app then runs fully local.
    pub fn from_config(service: &ProfileService) -> Option<Self> {
        match (&service.base_url, &service.anon_key) {
            (Some(url), Some(key)) => Some(Self::new(
                url.clone(),
                key.clone(),
                service.access_token.clone(),
            )),
            _ => None,
        }
    }

    fn bearer(&self) -> &str {
        self.access_token.as_deref().unwrap_or(&self.anon_key)
    }

    /// Fetches the profile row for `user_id`.
    ///
    /// Any failure — offline, HTTP error, undecodable row — is logged and
    /// reported as absent; the caller cannot tell the difference and is not
    /// expected to.
    pub async fn get_profile(&self, user_id: &str) -> Option<Profile> {
        match self.try_get(user_id).await {
            Ok(profile) => profile,
            Err(e) => {
                warn!(error = %e, "failed to fetch profile, treating as absent");
                None
            }
        }
    }

    async fn try_get(&self, user_id: &str) -> Result<Option<Profile>, Error> {
        let response = self
            .client
            .get(format!("{}/rest/v1/profiles", self.base_url))
            .header("apikey", &self.anon_key)
            .bearer_auth(self.bearer())
            .query(&[
                ("id", format!("eq.{user_id}")),
                ("select", "*".to_string()),
                ("limit", "1".to_string()),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Error::Http(response.status()));
        }

        let mut rows: Vec<Profile> = response.json().await?;
        debug!(found = !rows.is_empty(), "profile lookup");
        Ok(if rows.is_empty() {
            None
        } else {
            Some(rows.remove(0))
        })
    }

    /// Inserts the profile row for `user_id`. Returns whether the insert
    /// succeeded. No idempotency key: calling this twice for one user is a
    /// uniqueness violation on the backing table.
    pub async fn create_profile(&self, user_id: &str, profile: &NewProfile) -> bool {
        match self.try_insert(user_id, profile).await {
            Ok(()) => true,
            Err(e) => {
                warn!(error = %e, "failed to create profile");
                false
            }
        }
    }

    async fn try_insert(&self, user_id: &str, profile: &NewProfile) -> Result<(), Error> {
        let mut body = match serde_json::to_value(profile)? {
            serde_json::Value::Object(map) => map,
            _ => unreachable!("NewProfile serializes to an object"),
        };
        body.insert("id".to_string(), serde_json::Value::String(user_id.to_string()));

        let response = self
            .client
            .post(format!("{}/rest/v1/profiles", self.base_url))
            .header("apikey", &self.anon_key)
            .bearer_auth(self.bearer())
            .header(header::CONTENT_TYPE, "application/json")
            .header("Prefer", "return=minimal")
            .json(&serde_json::Value::Object(body))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Error::Http(response.status()));
        }
        Ok(())
    }
}
