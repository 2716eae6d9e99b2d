//! HTTP client for the ClipVault sync server
//!
//! Only sealed payloads cross the wire. The session token lives in the
//! local store; a 401 from the server invalidates it immediately so the
//! next call fails fast instead of retrying a dead session.

use std::sync::Arc;
use std::time::Duration;

use clipvault_domain::{ClipboardItem, SecurityEvent};
use clipvault_storage::{keys, LocalStore, LocalStoreExt};
use reqwest::{Client, Response, StatusCode};
use serde::Serialize;
use tracing::{debug, warn};
use url::Url;

use crate::error::{SyncError, SyncResult};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);
const USER_AGENT: &str = concat!("clipvault/", env!("CARGO_PKG_VERSION"));

#[derive(Serialize)]
struct DeviceRegistration<'a> {
    name: &'a str,
}

/// Client for the ClipVault sync API.
pub struct RemoteClient {
    client: Client,
    base_url: Url,
    store: Arc<dyn LocalStore>,
}

impl RemoteClient {
    pub fn new(base_url: &str, store: Arc<dyn LocalStore>) -> SyncResult<Self> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .user_agent(USER_AGENT)
            .build()?;
        Ok(Self {
            client,
            base_url: Url::parse(base_url)?,
            store,
        })
    }

    /// Persist the session token for subsequent requests.
    pub fn set_session_token(&self, token: &str) -> SyncResult<()> {
        self.store.set_json(keys::SESSION_TOKEN, &token)?;
        Ok(())
    }

    fn session_token(&self) -> SyncResult<String> {
        self.store
            .get_json::<String>(keys::SESSION_TOKEN)?
            .ok_or(SyncError::SessionInvalid)
    }

    /// Ask the server whether the stored session is still live. A missing
    /// token short-circuits to `false` without a network call.
    pub async fn verify_session(&self) -> SyncResult<bool> {
        let token = match self.store.get_json::<String>(keys::SESSION_TOKEN)? {
            Some(token) => token,
            None => return Ok(false),
        };

        let url = self.base_url.join("api/auth/session")?;
        let response = self.client.get(url).bearer_auth(token).send().await?;
        match self.check_status(response).await {
            Ok(_) => Ok(true),
            Err(SyncError::SessionInvalid) => Ok(false),
            Err(err) => Err(err),
        }
    }

    /// Upload one sealed clipboard item.
    pub async fn persist_item(&self, item: &ClipboardItem) -> SyncResult<()> {
        let url = self.base_url.join("api/clipboard/")?;
        let response = self
            .client
            .post(url)
            .bearer_auth(self.session_token()?)
            .json(item)
            .send()
            .await?;
        self.check_status(response).await?;
        debug!(item_id = %item.id, "clipboard item persisted remotely");
        Ok(())
    }

    /// Upload one audit event.
    pub async fn persist_event(&self, event: &SecurityEvent) -> SyncResult<()> {
        let url = self.base_url.join("api/audit/")?;
        let response = self
            .client
            .post(url)
            .bearer_auth(self.session_token()?)
            .json(event)
            .send()
            .await?;
        self.check_status(response).await?;
        Ok(())
    }

    /// Register this device under `name` and remember the name locally.
    pub async fn register_device(&self, name: &str) -> SyncResult<()> {
        let url = self.base_url.join("api/devices/")?;
        let response = self
            .client
            .post(url)
            .bearer_auth(self.session_token()?)
            .json(&DeviceRegistration { name })
            .send()
            .await?;
        self.check_status(response).await?;
        self.store.set_json(keys::DEVICE_NAME, &name)?;
        Ok(())
    }

    /// Map non-success statuses to errors. 401 drops the stored token so
    /// later calls do not reuse a session the server has rejected.
    async fn check_status(&self, response: Response) -> SyncResult<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        if status == StatusCode::UNAUTHORIZED {
            if let Err(err) = self.store.remove(keys::SESSION_TOKEN) {
                warn!(%err, "failed to clear rejected session token");
            }
            return Err(SyncError::SessionInvalid);
        }
        let message = response.text().await.unwrap_or_default();
        Err(SyncError::HttpStatus {
            status: status.as_u16(),
            message,
        })
    }
}
