// # HTTP Remote Client
//
// This crate provides the RemoteClient implementation that talks to the
// contact service over HTTP with JSON bodies and Basic Auth.
//
// ## Implementation Status
//
// - ✅ One HTTP request per engine call (`fetch_all` → GET, `create` → POST)
// - ✅ Full error propagation to the engine (the engine decides what a failure means)
// - ✅ HTTP timeout configured (30 seconds by default)
// - ✅ Specific error handling for HTTP status codes (401, 403, 404, 409, 429, 5xx)
// - ❌ NO retry logic (a failed create is retried by the next pass)
// - ❌ NO caching (every fetch returns what the server holds now)
// - ❌ NO background tasks
//
// ## Trust Level: Untrusted (Remote Client)
//
// **Allowed Capabilities**:
// - ✅ Perform HTTP/HTTPS calls to the configured base URL only
// - ✅ Parse the service's responses
//
// **Forbidden Capabilities**:
// - ❌ Spawn tasks or threads
// - ❌ Access the local store (owned by SyncEngine)
// - ❌ Decide what to push or pull (owned by SyncEngine)
//
// ## Security Requirements
//
// - The password NEVER appears in logs or Debug output
// - Credentials are fixed for the lifetime of a client
//
// ## API Reference
//
// - List contacts: GET `{base}/contacts/api/v1.0/contacts`
// - Create contact: POST `{base}/contacts/api/v1.0/contact/create`

pub mod wire;

use async_trait::async_trait;
use contacts_core::traits::{RemoteClient, RemoteClientFactory};
use contacts_core::{Contact, Error, Result, SyncConfig};
use reqwest::StatusCode;
use std::time::Duration;

use crate::wire::{ContactList, ContactPayload};

/// Path of the list endpoint, relative to the base URL
pub const LIST_CONTACTS_PATH: &str = "/contacts/api/v1.0/contacts";

/// Path of the create endpoint, relative to the base URL
pub const CREATE_CONTACT_PATH: &str = "/contacts/api/v1.0/contact/create";

/// Default HTTP timeout for API requests (30 seconds)
const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(30);

const REMOTE_NAME: &str = "http";

/// Contact service client
///
/// # Trust Level: Untrusted
///
/// This client is isolated, stateless, and single-shot. Deciding what to
/// push and what to pull is owned by `SyncEngine`.
///
/// # Security
///
/// The Debug implementation intentionally does NOT expose the password.
pub struct HttpRemoteClient {
    /// Base URL without trailing slash
    base_url: String,

    /// Basic Auth username
    username: String,

    /// Basic Auth password
    /// ⚠️ NEVER log this value
    password: String,

    /// HTTP client for API requests
    client: reqwest::Client,
}

// Custom Debug implementation that hides the password
impl std::fmt::Debug for HttpRemoteClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpRemoteClient")
            .field("base_url", &self.base_url)
            .field("username", &self.username)
            .field("password", &"<REDACTED>")
            .finish()
    }
}

impl HttpRemoteClient {
    /// Create a new client with the default timeout
    ///
    /// # Errors
    ///
    /// - `Error::Config`: empty base URL or username, or a base URL that is
    ///   not `http://` / `https://`
    /// - `Error::Http`: the HTTP client could not be built
    pub fn new(
        base_url: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Result<Self> {
        Self::with_timeout(base_url, username, password, DEFAULT_HTTP_TIMEOUT)
    }

    /// Create a new client with an explicit request timeout
    pub fn with_timeout(
        base_url: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self> {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        let username = username.into();

        if base_url.is_empty() {
            return Err(Error::config("Contact server base URL cannot be empty"));
        }
        if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
            return Err(Error::config(format!(
                "Contact server base URL must start with http:// or https://: {}",
                base_url
            )));
        }
        if username.is_empty() {
            return Err(Error::config("Contact server username cannot be empty"));
        }

        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::http(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            base_url,
            username,
            password: password.into(),
            client,
        })
    }

    /// Base URL the client talks to, without trailing slash
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

/// Map a non-2xx response to an error
fn status_error(status: StatusCode, body: &str, action: &str) -> Error {
    match status.as_u16() {
        401 | 403 => Error::auth(format!(
            "Invalid credentials or insufficient permissions. Status: {}",
            status
        )),
        404 => Error::not_found(format!("{}: endpoint not found. Status: {}", action, status)),
        409 => Error::remote(
            REMOTE_NAME,
            format!("Conflict: contact already exists. Status: {}", status),
        ),
        429 => Error::rate_limited(format!("Please retry later. Status: {}", status)),
        500..=599 => Error::remote(
            REMOTE_NAME,
            format!("Server error (transient): {} - {}", status, body),
        ),
        _ => Error::remote(REMOTE_NAME, format!("{} failed: {} - {}", action, status, body)),
    }
}

async fn error_for(response: reqwest::Response, action: &str) -> Error {
    let status = response.status();
    let body = response
        .text()
        .await
        .unwrap_or_else(|_| "Unable to read error response".to_string());
    status_error(status, &body, action)
}

#[async_trait]
impl RemoteClient for HttpRemoteClient {
    /// Fetch the full remote contact list
    ///
    /// ```http
    /// GET /contacts/api/v1.0/contacts
    /// Authorization: Basic <credentials>
    /// ```
    async fn fetch_all(&self) -> Result<Vec<Contact>> {
        let url = self.url(LIST_CONTACTS_PATH);
        tracing::debug!("Fetching remote contacts from {}", url);

        let response = self
            .client
            .get(&url)
            .basic_auth(&self.username, Some(&self.password))
            .send()
            .await
            .map_err(|e| Error::http(format!("HTTP request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(error_for(response, "List contacts").await);
        }

        let body = response
            .text()
            .await
            .map_err(|e| Error::http(format!("Failed to read response: {}", e)))?;
        let list: ContactList = serde_json::from_str(&body)?;
        let contacts = list.into_contacts()?;

        tracing::debug!("Remote returned {} contact(s)", contacts.len());
        Ok(contacts)
    }

    /// Create one contact
    ///
    /// ```http
    /// POST /contacts/api/v1.0/contact/create
    /// Authorization: Basic <credentials>
    /// Content-Type: application/json
    ///
    /// { "uuid": "…", "name": "…", "email": "…", "address": "…", "favorite": false }
    /// ```
    async fn create(&self, contact: &Contact) -> Result<()> {
        let url = self.url(CREATE_CONTACT_PATH);
        tracing::debug!("Creating remote contact {}", contact.id());

        let response = self
            .client
            .post(&url)
            .basic_auth(&self.username, Some(&self.password))
            .json(&ContactPayload::from(contact))
            .send()
            .await
            .map_err(|e| Error::http(format!("HTTP request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(error_for(response, "Create contact").await);
        }

        Ok(())
    }

    fn remote_name(&self) -> &'static str {
        REMOTE_NAME
    }
}

/// Factory for creating HTTP remote clients
#[derive(Debug, Clone)]
pub struct HttpRemoteFactory {
    timeout: Duration,
}

impl HttpRemoteFactory {
    /// Create a factory whose clients use the default 30 second timeout
    pub fn new() -> Self {
        Self {
            timeout: DEFAULT_HTTP_TIMEOUT,
        }
    }

    /// Use `timeout` for every request of the clients this factory builds
    pub fn with_timeout(timeout: Duration) -> Self {
        Self { timeout }
    }
}

impl Default for HttpRemoteFactory {
    fn default() -> Self {
        Self::new()
    }
}

impl RemoteClientFactory for HttpRemoteFactory {
    fn create(&self, config: &SyncConfig) -> Result<Box<dyn RemoteClient>> {
        if config.password.is_empty() {
            return Err(Error::config("Contact server password is required"));
        }

        Ok(Box::new(HttpRemoteClient::with_timeout(
            config.server_base_url.clone(),
            config.username.clone(),
            config.password.clone(),
            self.timeout,
        )?))
    }
}
