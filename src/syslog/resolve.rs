//! Destination resolution for the syslog handler.
//!
//! Precedence is explicit arguments, then the `SYSLOG_HOST`/`SYSLOG_PORT`
//! environment variables, then the platform's local socket. The process
//! environment is captured once into a [`SyslogEnvironment`] so resolution
//! itself stays a pure function.

use std::{env, path::Path};

use serde::Deserialize;

use super::transport::{Protocol, SyslogAddress};
use crate::handlers::HandlerBuildError;

/// Standard syslog UDP port.
pub const SYSLOG_UDP_PORT: u16 = 514;
/// Local syslog socket on most Unix systems.
pub const DEFAULT_SOCKET_PATH: &str = "/dev/log";
/// Local syslog socket on macOS.
pub const DARWIN_SOCKET_PATH: &str = "/var/run/syslog";
/// Environment variable naming a remote syslog host.
pub const SYSLOG_HOST_VAR: &str = "SYSLOG_HOST";
/// Environment variable naming the remote syslog port.
pub const SYSLOG_PORT_VAR: &str = "SYSLOG_PORT";

/// Classification of where syslog output should go by default.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EnvironmentKind {
    /// Local `/dev/log` socket.
    Default,
    /// Remote host named by `SYSLOG_HOST`.
    Remote,
    /// macOS `/var/run/syslog` socket.
    Darwin,
}

/// Snapshot of the environment facts syslog resolution depends on.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SyslogEnvironment {
    pub syslog_host: Option<String>,
    pub syslog_port: Option<String>,
    pub is_darwin: bool,
    pub darwin_socket_present: bool,
}

impl SyslogEnvironment {
    /// Capture the current process environment and platform.
    pub fn detect() -> Self {
        Self {
            syslog_host: env::var(SYSLOG_HOST_VAR).ok(),
            syslog_port: env::var(SYSLOG_PORT_VAR).ok(),
            is_darwin: cfg!(target_os = "macos"),
            darwin_socket_present: Path::new(DARWIN_SOCKET_PATH).exists(),
        }
    }

    /// Environment pointing at a remote syslog host.
    pub fn remote(host: impl Into<String>, port: Option<String>) -> Self {
        Self {
            syslog_host: Some(host.into()),
            syslog_port: port,
            ..Self::default()
        }
    }

    /// A macOS host with the local syslog socket present.
    pub fn darwin() -> Self {
        Self {
            is_darwin: true,
            darwin_socket_present: true,
            ..Self::default()
        }
    }

    /// Classify the environment. A non-empty `SYSLOG_HOST` wins over any
    /// platform detection.
    pub fn kind(&self) -> EnvironmentKind {
        if self.syslog_host.as_deref().is_some_and(|h| !h.is_empty()) {
            return EnvironmentKind::Remote;
        }
        if self.is_darwin && self.darwin_socket_present {
            return EnvironmentKind::Darwin;
        }
        EnvironmentKind::Default
    }
}

/// Syslog destination as supplied by the caller, before defaults apply.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(from = "RawAddress")]
pub enum AddressArg {
    /// Unix socket path, used verbatim.
    Path(String),
    /// Network host with an optional, still textual, port.
    HostPort { host: String, port: Option<String> },
}

impl AddressArg {
    pub fn path(path: impl Into<String>) -> Self {
        AddressArg::Path(path.into())
    }

    pub fn host_port(host: impl Into<String>, port: Option<impl ToString>) -> Self {
        AddressArg::HostPort {
            host: host.into(),
            port: port.map(|p| p.to_string()),
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawPort {
    Number(u64),
    Text(String),
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawAddress {
    Path(String),
    Pair(String, Option<RawPort>),
}

impl From<RawAddress> for AddressArg {
    fn from(raw: RawAddress) -> Self {
        match raw {
            RawAddress::Path(path) => AddressArg::Path(path),
            RawAddress::Pair(host, port) => AddressArg::HostPort {
                host,
                port: port.map(|p| match p {
                    RawPort::Number(n) => n.to_string(),
                    RawPort::Text(s) => s,
                }),
            },
        }
    }
}

/// Coerce a textual port to an integer, failing fast on malformed input.
pub fn coerce_port(value: &str) -> Result<u16, HandlerBuildError> {
    value
        .trim()
        .parse::<u16>()
        .map_err(|source| HandlerBuildError::InvalidPort {
            value: value.to_string(),
            source,
        })
}

/// Resolve the final syslog destination.
pub fn resolve_address(
    explicit: Option<&AddressArg>,
    environment: &SyslogEnvironment,
) -> Result<SyslogAddress, HandlerBuildError> {
    match explicit {
        Some(AddressArg::HostPort { host, port }) => {
            let port = match port {
                Some(p) => coerce_port(p)?,
                None => SYSLOG_UDP_PORT,
            };
            return Ok(SyslogAddress::Inet {
                host: host.clone(),
                port,
            });
        }
        Some(AddressArg::Path(path)) if !path.is_empty() => {
            return Ok(SyslogAddress::Unix(path.into()));
        }
        _ => {}
    }

    match environment.kind() {
        EnvironmentKind::Default => Ok(SyslogAddress::Unix(DEFAULT_SOCKET_PATH.into())),
        EnvironmentKind::Darwin => Ok(SyslogAddress::Unix(DARWIN_SOCKET_PATH.into())),
        EnvironmentKind::Remote => {
            let port = match environment.syslog_port.as_deref() {
                Some(p) => coerce_port(p)?,
                None => SYSLOG_UDP_PORT,
            };
            Ok(SyslogAddress::Inet {
                host: environment.syslog_host.clone().unwrap_or_default(),
                port,
            })
        }
    }
}

/// Explicit protocol if given, otherwise UDP.
pub fn resolve_protocol(explicit: Option<Protocol>) -> Protocol {
    explicit.unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rstest::rstest;

    fn inet(host: &str, port: u16) -> SyslogAddress {
        SyslogAddress::Inet {
            host: host.into(),
            port,
        }
    }

    #[rstest]
    #[case(SyslogEnvironment::default(), EnvironmentKind::Default)]
    #[case(SyslogEnvironment::darwin(), EnvironmentKind::Darwin)]
    #[case(SyslogEnvironment::remote("logs", None), EnvironmentKind::Remote)]
    #[case(SyslogEnvironment { darwin_socket_present: false, ..SyslogEnvironment::darwin() }, EnvironmentKind::Default)]
    #[case(SyslogEnvironment { syslog_host: Some(String::new()), ..SyslogEnvironment::default() }, EnvironmentKind::Default)]
    #[case(SyslogEnvironment { syslog_host: Some("logs".into()), ..SyslogEnvironment::darwin() }, EnvironmentKind::Remote)]
    fn classifies_environment(#[case] env: SyslogEnvironment, #[case] expected: EnvironmentKind) {
        assert_eq!(env.kind(), expected);
    }

    #[rstest]
    #[case(SyslogEnvironment::default(), SyslogAddress::Unix("/dev/log".into()))]
    #[case(SyslogEnvironment::darwin(), SyslogAddress::Unix("/var/run/syslog".into()))]
    #[case(SyslogEnvironment::remote("logs", None), inet("logs", 514))]
    #[case(SyslogEnvironment::remote("logs", Some("1514".into())), inet("logs", 1514))]
    fn environment_defaults(#[case] env: SyslogEnvironment, #[case] expected: SyslogAddress) {
        assert_eq!(resolve_address(None, &env).expect("must resolve"), expected);
    }

    #[rstest]
    #[case(AddressArg::host_port("localhost", Some(1514)), inet("localhost", 1514))]
    #[case(AddressArg::host_port("localhost", None::<u16>), inet("localhost", 514))]
    #[case(AddressArg::host_port("localhost", Some(" 601 ")), inet("localhost", 601))]
    #[case(AddressArg::path("/tmp/log.sock"), SyslogAddress::Unix("/tmp/log.sock".into()))]
    fn explicit_addresses_win_over_environment(
        #[case] arg: AddressArg,
        #[case] expected: SyslogAddress,
    ) {
        let env = SyslogEnvironment::remote("elsewhere", Some("9999".into()));
        assert_eq!(resolve_address(Some(&arg), &env).expect("must resolve"), expected);
    }

    #[test]
    fn empty_path_falls_back_to_environment() {
        let env = SyslogEnvironment::remote("logs", None);
        let resolved = resolve_address(Some(&AddressArg::path("")), &env).expect("must resolve");
        assert_eq!(resolved, inet("logs", 514));
    }

    #[rstest]
    #[case(Some(AddressArg::host_port("localhost", Some("syslog"))), SyslogEnvironment::default())]
    #[case(None, SyslogEnvironment::remote("logs", Some("51a".into())))]
    #[case(None, SyslogEnvironment::remote("logs", Some("70000".into())))]
    fn malformed_ports_fail_fast(#[case] arg: Option<AddressArg>, #[case] env: SyslogEnvironment) {
        let err = resolve_address(arg.as_ref(), &env).unwrap_err();
        assert!(matches!(err, HandlerBuildError::InvalidPort { .. }), "{err:?}");
    }

    #[test]
    fn protocol_defaults_to_udp() {
        assert_eq!(resolve_protocol(None), Protocol::Udp);
        assert_eq!(resolve_protocol(Some(Protocol::Tcp)), Protocol::Tcp);
    }

    #[test]
    fn deserialises_paths_and_pairs() {
        let path: AddressArg = serde_json::from_str(r#""/dev/log""#).expect("path");
        assert_eq!(path, AddressArg::path("/dev/log"));
        let pair: AddressArg = serde_json::from_str(r#"["logs", 1514]"#).expect("pair");
        assert_eq!(pair, AddressArg::host_port("logs", Some(1514)));
        let no_port: AddressArg = serde_json::from_str(r#"["logs", null]"#).expect("pair");
        assert_eq!(no_port, AddressArg::host_port("logs", None::<u16>));
    }

    proptest! {
        #[test]
        fn host_without_port_resolves_to_514(host in "[a-z][a-z0-9.-]{0,20}") {
            let arg = AddressArg::host_port(host.clone(), None::<u16>);
            let resolved = resolve_address(Some(&arg), &SyslogEnvironment::default()).unwrap();
            prop_assert_eq!(resolved, inet(&host, 514));
        }

        #[test]
        fn syslog_host_always_means_remote(
            host in "[a-z]{1,12}",
            is_darwin in any::<bool>(),
            present in any::<bool>(),
        ) {
            let env = SyslogEnvironment {
                syslog_host: Some(host),
                syslog_port: None,
                is_darwin,
                darwin_socket_present: present,
            };
            prop_assert_eq!(env.kind(), EnvironmentKind::Remote);
        }
    }
}
