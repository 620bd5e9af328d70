//! Client for the Cloud Logging `entries:write` API.

use std::{
    collections::BTreeMap,
    fmt, io,
    sync::Arc,
    time::{Duration, Instant},
};

use serde::Serialize;
use ureq::{Agent, AgentBuilder};

use super::{CloudError, GceResource, MetadataClient};
use crate::handlers::Credentials;

/// Default `entries:write` endpoint.
pub const DEFAULT_LOGGING_ENDPOINT: &str = "https://logging.googleapis.com/v2/entries:write";
/// Timeout for a single write request.
pub const WRITE_TIMEOUT: Duration = Duration::from_secs(10);
/// Tokens are refreshed this long before they expire.
const TOKEN_REFRESH_MARGIN: Duration = Duration::from_secs(60);

/// One log entry in an `entries:write` request.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct LogEntry<'a> {
    pub severity: &'static str,
    pub text_payload: &'a str,
    pub timestamp: String,
}

/// Body of an `entries:write` request.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct WriteRequest<'a> {
    pub log_name: &'a str,
    pub resource: &'a GceResource,
    pub labels: &'a BTreeMap<String, String>,
    pub entries: Vec<LogEntry<'a>>,
}

enum TokenSource {
    Static(String),
    Metadata(MetadataClient),
}

struct CachedToken {
    value: String,
    refresh_at: Instant,
}

/// Authenticated client scoped to one project.
pub struct CloudLoggingClient {
    project_id: String,
    endpoint: String,
    agent: Agent,
    source: TokenSource,
    cached: Option<CachedToken>,
}

impl fmt::Debug for CloudLoggingClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CloudLoggingClient")
            .field("project_id", &self.project_id)
            .field("endpoint", &self.endpoint)
            .finish_non_exhaustive()
    }
}

impl CloudLoggingClient {
    /// Create a client for `project_id`.
    ///
    /// Without explicit `credentials` the instance's default service-account
    /// token is requested from `metadata` on first use.
    pub fn new(
        project_id: impl Into<String>,
        credentials: Option<Credentials>,
        metadata: MetadataClient,
    ) -> Result<Self, CloudError> {
        let tls = native_tls::TlsConnector::new().map_err(|e| CloudError::Client(e.to_string()))?;
        let agent = AgentBuilder::new()
            .tls_connector(Arc::new(tls))
            .timeout(WRITE_TIMEOUT)
            .build();
        let source = match credentials {
            Some(Credentials::AccessToken(token)) => TokenSource::Static(token),
            None => TokenSource::Metadata(metadata),
        };
        Ok(Self {
            project_id: project_id.into(),
            endpoint: DEFAULT_LOGGING_ENDPOINT.to_string(),
            agent,
            source,
            cached: None,
        })
    }

    /// Send writes to `endpoint` instead of the public API.
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    pub fn project_id(&self) -> &str {
        &self.project_id
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Full resource name for `log_name` in this project.
    pub fn log_path(&self, log_name: &str) -> String {
        format!("projects/{}/logs/{log_name}", self.project_id)
    }

    fn token(&mut self) -> Result<String, CloudError> {
        let metadata = match &self.source {
            TokenSource::Static(token) => return Ok(token.clone()),
            TokenSource::Metadata(metadata) => metadata,
        };
        if let Some(cached) = &self.cached {
            if Instant::now() < cached.refresh_at {
                return Ok(cached.value.clone());
            }
        }
        let fresh = metadata.service_account_token()?;
        let lifetime = Duration::from_secs(fresh.expires_in).saturating_sub(TOKEN_REFRESH_MARGIN);
        self.cached = Some(CachedToken {
            value: fresh.access_token.clone(),
            refresh_at: Instant::now() + lifetime,
        });
        Ok(fresh.access_token)
    }

    /// POST one `entries:write` request.
    pub(crate) fn write(&mut self, request: &WriteRequest<'_>) -> io::Result<()> {
        let token = self.token().map_err(io::Error::other)?;
        let body = serde_json::to_string(request).map_err(io::Error::other)?;
        self.agent
            .post(&self.endpoint)
            .set("Authorization", &format!("Bearer {token}"))
            .set("Content-Type", "application/json")
            .send_string(&body)
            .map(|_| ())
            .map_err(|err| match err {
                ureq::Error::Status(code, _) => {
                    io::Error::other(format!("entries:write returned HTTP {code}"))
                }
                ureq::Error::Transport(transport) => io::Error::other(transport),
            })
    }
}
