//! Google Compute Engine instance metadata lookups.
//!
//! Values are plain-text `GET`s against the metadata server with the
//! `Metadata-Flavor: Google` header. Every lookup is a single attempt with a
//! short timeout; callers fetch once and cache.

use std::{fmt, time::Duration};

use serde::Deserialize;
use ureq::{Agent, AgentBuilder};

use super::CloudError;

/// Base URL of the metadata server reachable from GCE hosts.
pub const DEFAULT_METADATA_ENDPOINT: &str = "http://metadata.google.internal/computeMetadata/v1";
/// Per-request timeout for metadata lookups.
pub const METADATA_TIMEOUT: Duration = Duration::from_secs(5);

/// Identity of the instance the process runs on.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InstanceMetadata {
    pub project_id: String,
    pub hostname: String,
    pub instance_id: String,
    /// Short zone name, e.g. `europe-west1-d`.
    pub zone: String,
}

/// Service-account token as returned by the metadata server.
#[derive(Clone, Deserialize)]
pub(crate) struct TokenResponse {
    pub access_token: String,
    #[serde(default)]
    pub expires_in: u64,
}

/// Minimal client for the instance metadata service.
#[derive(Clone)]
pub struct MetadataClient {
    agent: Agent,
    endpoint: String,
    timeout: Duration,
}

impl fmt::Debug for MetadataClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MetadataClient")
            .field("endpoint", &self.endpoint)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl Default for MetadataClient {
    fn default() -> Self {
        Self::with_endpoint(DEFAULT_METADATA_ENDPOINT)
    }
}

impl MetadataClient {
    /// Client for the standard metadata server.
    pub fn new() -> Self {
        Self::default()
    }

    /// Client for a metadata server at `endpoint`, e.g. an emulator.
    pub fn with_endpoint(endpoint: impl Into<String>) -> Self {
        let endpoint = endpoint.into().trim_end_matches('/').to_string();
        Self {
            agent: AgentBuilder::new().build(),
            endpoint,
            timeout: METADATA_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// URL for `key` under `data_type` (`project` or `instance`).
    pub fn url(&self, data_type: &str, key: &str) -> String {
        format!("{}/{data_type}/{key}", self.endpoint)
    }

    /// Fetch one metadata value.
    ///
    /// # Errors
    ///
    /// [`CloudError::Metadata`] for transport failures and non-success
    /// statuses, [`CloudError::EmptyMetadata`] when the body is blank.
    pub fn get(&self, data_type: &str, key: &str) -> Result<String, CloudError> {
        let url = self.url(data_type, key);
        let failed = |source: Box<dyn std::error::Error + Send + Sync>| CloudError::Metadata {
            key: key.to_string(),
            data_type: data_type.to_string(),
            url: url.clone(),
            source,
        };
        let response = self
            .agent
            .get(&url)
            .set("Metadata-Flavor", "Google")
            .timeout(self.timeout)
            .call()
            .map_err(|err| match err {
                ureq::Error::Status(code, _) => failed(format!("HTTP status {code}").into()),
                ureq::Error::Transport(transport) => failed(Box::new(transport)),
            })?;
        let body = response.into_string().map_err(|err| failed(Box::new(err)))?;
        if body.trim().is_empty() {
            return Err(CloudError::EmptyMetadata { url });
        }
        Ok(body)
    }

    /// Project id of the host.
    pub fn project_id(&self) -> Result<String, CloudError> {
        self.get("project", "project-id")
    }

    /// Fetch project, host name, instance id and zone in that order. An
    /// explicit `project_id` skips the project lookup.
    pub fn instance(&self, project_id: Option<String>) -> Result<InstanceMetadata, CloudError> {
        let project_id = match project_id {
            Some(id) => id,
            None => self.project_id()?,
        };
        let hostname = self.get("instance", "name")?;
        let instance_id = self.get("instance", "id")?;
        let zone = short_zone(&self.get("instance", "zone")?).to_string();
        Ok(InstanceMetadata {
            project_id,
            hostname,
            instance_id,
            zone,
        })
    }

    /// Default service-account token for the instance.
    pub(crate) fn service_account_token(&self) -> Result<TokenResponse, CloudError> {
        let body = self.get("instance", "service-accounts/default/token")?;
        serde_json::from_str(&body)
            .map_err(|err| CloudError::Token(format!("malformed token response: {err}")))
    }
}

/// `projects/123/zones/europe-west1-d` → `europe-west1-d`.
pub fn short_zone(zone: &str) -> &str {
    zone.rsplit('/').next().unwrap_or(zone)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cloud::test_support::MetadataServer;
    use rstest::rstest;

    #[rstest]
    #[case("projects/123/zones/europe-west1-d", "europe-west1-d")]
    #[case("us-east1-b", "us-east1-b")]
    #[case("projects/123/zones/", "")]
    fn shortens_zone(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(short_zone(input), expected);
    }

    #[test]
    fn sends_flavor_header_and_returns_body() {
        let server = MetadataServer::spawn(vec![("/project/project-id", 200, "my-project")]);
        let client = MetadataClient::with_endpoint(server.base_url());
        assert_eq!(client.project_id().expect("lookup succeeds"), "my-project");
        let request = server.requests().pop().expect("one request recorded");
        assert_eq!(request.header("metadata-flavor"), Some("Google"));
    }

    #[test]
    fn empty_body_is_an_error() {
        let server = MetadataServer::spawn(vec![("/instance/name", 200, "  \n")]);
        let client = MetadataClient::with_endpoint(server.base_url());
        let err = client.get("instance", "name").unwrap_err();
        assert!(matches!(err, CloudError::EmptyMetadata { ref url } if url.ends_with("/instance/name")));
    }

    #[test]
    fn error_status_names_key_type_and_url() {
        let server = MetadataServer::spawn(vec![]);
        let client = MetadataClient::with_endpoint(server.base_url());
        let err = client.get("instance", "zone").unwrap_err();
        let text = err.to_string();
        assert!(matches!(err, CloudError::Metadata { .. }));
        assert!(text.contains("\"zone\""), "{text}");
        assert!(text.contains("\"instance\""), "{text}");
        assert!(text.contains(&client.url("instance", "zone")), "{text}");
    }

    #[test]
    fn transport_failure_is_an_error() {
        let addr = {
            let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("bind");
            listener.local_addr().expect("addr")
        };
        let client = MetadataClient::with_endpoint(format!("http://{addr}"))
            .with_timeout(Duration::from_secs(1));
        assert!(matches!(
            client.get("project", "project-id"),
            Err(CloudError::Metadata { .. })
        ));
    }

    #[test]
    fn instance_lookup_splits_zone() {
        let server = MetadataServer::gce("proj", "host-1", "42", "projects/9/zones/us-central1-a");
        let client = MetadataClient::with_endpoint(server.base_url());
        let info = client.instance(None).expect("instance metadata");
        assert_eq!(
            info,
            InstanceMetadata {
                project_id: "proj".into(),
                hostname: "host-1".into(),
                instance_id: "42".into(),
                zone: "us-central1-a".into(),
            }
        );
    }

    #[test]
    fn explicit_project_skips_lookup() {
        let server = MetadataServer::gce("proj", "host-1", "42", "zone-a");
        let client = MetadataClient::with_endpoint(server.base_url());
        let info = client.instance(Some("other".into())).expect("instance metadata");
        assert_eq!(info.project_id, "other");
        assert!(server.requests().iter().all(|r| r.path != "/project/project-id"));
    }
}
