//! Option bag shared by every handler factory.
//!
//! [`HandlerOptions`] carries everything `setup_logging` forwards to the
//! builders. Each builder reads the fields it understands and ignores the
//! rest, so one value can drive any combination of handlers.

use std::{collections::BTreeMap, fmt};

use serde::{Deserialize, Deserializer};

use crate::syslog::{AddressArg, Facility, Protocol};

/// Explicit credentials for the cloud logging client.
///
/// When no credentials are supplied the client asks the metadata server
/// for a service-account token.
#[derive(Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Credentials {
    /// A ready-made OAuth2 bearer token.
    AccessToken(String),
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Credentials::AccessToken(_) => f.write_str("AccessToken(<redacted>)"),
        }
    }
}

/// Options forwarded to handler builders.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct HandlerOptions {
    /// Program name embedded in default formats. Filled in by
    /// [`setup_logging`](crate::setup_logging).
    pub progname: String,
    pub fmt: Option<String>,
    pub datefmt: Option<String>,
    pub address: Option<AddressArg>,
    #[serde(deserialize_with = "code_or_name")]
    pub proto: Option<Protocol>,
    #[serde(deserialize_with = "code_or_name")]
    pub facility: Option<Facility>,
    pub project_id: Option<String>,
    pub credentials: Option<Credentials>,
    pub debug_thread_worker: bool,
    /// Base URL of the instance metadata service.
    pub metadata_endpoint: Option<String>,
    /// Cloud log name; defaults to the program name.
    pub log_name: Option<String>,
    /// Anything else, passed untouched to custom handler factories.
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

impl HandlerOptions {
    pub fn new(progname: impl Into<String>) -> Self {
        Self {
            progname: progname.into(),
            ..Self::default()
        }
    }

    pub fn with_progname(mut self, progname: impl Into<String>) -> Self {
        self.progname = progname.into();
        self
    }

    pub fn with_fmt(mut self, fmt: impl Into<String>) -> Self {
        self.fmt = Some(fmt.into());
        self
    }

    pub fn with_datefmt(mut self, datefmt: impl Into<String>) -> Self {
        self.datefmt = Some(datefmt.into());
        self
    }

    pub fn with_address(mut self, address: AddressArg) -> Self {
        self.address = Some(address);
        self
    }

    pub fn with_proto(mut self, proto: Protocol) -> Self {
        self.proto = Some(proto);
        self
    }

    pub fn with_facility(mut self, facility: Facility) -> Self {
        self.facility = Some(facility);
        self
    }

    pub fn with_project_id(mut self, project_id: impl Into<String>) -> Self {
        self.project_id = Some(project_id.into());
        self
    }

    pub fn with_credentials(mut self, credentials: Credentials) -> Self {
        self.credentials = Some(credentials);
        self
    }

    pub fn with_debug_thread_worker(mut self, enabled: bool) -> Self {
        self.debug_thread_worker = enabled;
        self
    }

    pub fn with_metadata_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.metadata_endpoint = Some(endpoint.into());
        self
    }

    pub fn with_log_name(mut self, log_name: impl Into<String>) -> Self {
        self.log_name = Some(log_name.into());
        self
    }

    pub fn with_extra(mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.extra.insert(key.into(), value.into());
        self
    }

    /// Look up a free-form option by key.
    pub fn extra(&self, key: &str) -> Option<&serde_json::Value> {
        self.extra.get(key)
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum CodeOrName {
    Code(u8),
    Name(String),
}

/// Accept either a numeric code (`2`) or a name (`"udp"`).
fn code_or_name<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: TryFrom<u8> + std::str::FromStr,
    <T as TryFrom<u8>>::Error: fmt::Display,
    <T as std::str::FromStr>::Err: fmt::Display,
{
    let raw = Option::<CodeOrName>::deserialize(deserializer)?;
    raw.map(|raw| match raw {
        CodeOrName::Code(code) => T::try_from(code).map_err(serde::de::Error::custom),
        CodeOrName::Name(name) => name.parse().map_err(serde::de::Error::custom),
    })
    .transpose()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserialises_codes_names_and_extras() {
        let opts: HandlerOptions = serde_json::from_str(
            r#"{
                "fmt": "%(message)s",
                "address": ["logs.example", "1514"],
                "proto": 1,
                "facility": "daemon",
                "credentials": {"access_token": "secret"},
                "team": "infra"
            }"#,
        )
        .expect("options must deserialise");
        assert_eq!(opts.fmt.as_deref(), Some("%(message)s"));
        assert_eq!(opts.address, Some(AddressArg::host_port("logs.example", Some("1514"))));
        assert_eq!(opts.proto, Some(Protocol::Tcp));
        assert_eq!(opts.facility, Some(Facility::DAEMON));
        assert_eq!(opts.credentials, Some(Credentials::AccessToken("secret".into())));
        assert_eq!(opts.extra("team"), Some(&serde_json::json!("infra")));
        assert!(!opts.debug_thread_worker);
    }

    #[test]
    fn rejects_unknown_protocol_codes() {
        let err = serde_json::from_str::<HandlerOptions>(r#"{"proto": 7}"#).unwrap_err();
        assert!(err.to_string().contains("protocol"), "{err}");
    }

    #[test]
    fn credentials_are_redacted_in_debug_output() {
        let opts = HandlerOptions::new("prog").with_credentials(Credentials::AccessToken("ya29.secret".into()));
        assert!(!format!("{opts:?}").contains("ya29"));
    }
}
