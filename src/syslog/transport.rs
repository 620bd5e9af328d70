//! Transport primitives for the syslog handler.

use std::{
    fmt,
    io::{self, Write},
    net::{Ipv4Addr, Ipv6Addr, SocketAddr, TcpStream, ToSocketAddrs, UdpSocket},
    path::PathBuf,
    str::FromStr,
    time::Duration,
};

#[cfg(unix)]
use std::os::unix::net::{UnixDatagram, UnixStream};

use thiserror::Error;

/// Default connection timeout applied when establishing TCP connections.
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// Socket type used to reach the syslog daemon.
///
/// The numeric codes follow the BSD socket constants: `1` is a stream
/// socket (TCP), `2` a datagram socket (UDP).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Protocol {
    Tcp,
    #[default]
    Udp,
}

/// Returned when a protocol name or code is not recognised.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown syslog protocol: {0:?}")]
pub struct ProtocolParseError(pub String);

impl Protocol {
    pub fn code(self) -> u8 {
        match self {
            Protocol::Tcp => 1,
            Protocol::Udp => 2,
        }
    }
}

impl TryFrom<u8> for Protocol {
    type Error = ProtocolParseError;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        match code {
            1 => Ok(Protocol::Tcp),
            2 => Ok(Protocol::Udp),
            other => Err(ProtocolParseError(other.to_string())),
        }
    }
}

impl FromStr for Protocol {
    type Err = ProtocolParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "1" | "tcp" | "stream" => Ok(Protocol::Tcp),
            "2" | "udp" | "dgram" | "datagram" => Ok(Protocol::Udp),
            _ => Err(ProtocolParseError(s.to_string())),
        }
    }
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Protocol::Tcp => "tcp",
            Protocol::Udp => "udp",
        })
    }
}

/// Resolved syslog destination.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum SyslogAddress {
    /// Unix domain socket path.
    Unix(PathBuf),
    /// Network host and port.
    Inet { host: String, port: u16 },
}

impl fmt::Display for SyslogAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SyslogAddress::Unix(path) => write!(f, "{}", path.display()),
            SyslogAddress::Inet { host, port } => write!(f, "{host}:{port}"),
        }
    }
}

/// Open socket to a syslog daemon.
pub(crate) enum SyslogConnection {
    Udp { socket: UdpSocket, target: SocketAddr },
    Tcp(TcpStream),
    #[cfg(unix)]
    UnixDatagram(UnixDatagram),
    #[cfg(unix)]
    UnixStream(UnixStream),
}

impl SyslogConnection {
    /// Send one framed message.
    pub fn send(&mut self, frame: &[u8]) -> io::Result<()> {
        match self {
            SyslogConnection::Udp { socket, target } => socket.send_to(frame, *target).map(|_| ()),
            SyslogConnection::Tcp(stream) => stream.write_all(frame),
            #[cfg(unix)]
            SyslogConnection::UnixDatagram(socket) => socket.send(frame).map(|_| ()),
            #[cfg(unix)]
            SyslogConnection::UnixStream(stream) => stream.write_all(frame),
        }
    }

    /// Flush the underlying writer.
    pub fn flush(&mut self) -> io::Result<()> {
        match self {
            SyslogConnection::Tcp(stream) => stream.flush(),
            #[cfg(unix)]
            SyslogConnection::UnixStream(stream) => stream.flush(),
            _ => Ok(()),
        }
    }

    /// Whether this is a Unix domain socket connection.
    pub fn is_local(&self) -> bool {
        match self {
            #[cfg(unix)]
            SyslogConnection::UnixDatagram(_) | SyslogConnection::UnixStream(_) => true,
            _ => false,
        }
    }
}

fn resolve(host: &str, port: u16) -> io::Result<Vec<SocketAddr>> {
    let addrs: Vec<SocketAddr> = (host, port).to_socket_addrs()?.collect();
    if addrs.is_empty() {
        return Err(io::Error::new(
            io::ErrorKind::NotFound,
            format!("could not resolve {host}:{port}"),
        ));
    }
    Ok(addrs)
}

fn connect_udp(host: &str, port: u16) -> io::Result<SyslogConnection> {
    let target = resolve(host, port)?[0];
    let local: SocketAddr = if target.is_ipv4() {
        (Ipv4Addr::UNSPECIFIED, 0).into()
    } else {
        (Ipv6Addr::UNSPECIFIED, 0).into()
    };
    let socket = UdpSocket::bind(local)?;
    Ok(SyslogConnection::Udp { socket, target })
}

fn connect_tcp(host: &str, port: u16, timeout: Duration) -> io::Result<SyslogConnection> {
    let mut last_err = None;
    for addr in resolve(host, port)? {
        match TcpStream::connect_timeout(&addr, timeout) {
            Ok(stream) => return Ok(SyslogConnection::Tcp(stream)),
            Err(err) => last_err = Some(err),
        }
    }
    Err(last_err.unwrap_or_else(|| {
        io::Error::new(
            io::ErrorKind::TimedOut,
            format!("unable to connect to {host}:{port}"),
        )
    }))
}

#[cfg(unix)]
fn connect_unix(path: &std::path::Path, protocol: Protocol) -> io::Result<SyslogConnection> {
    match protocol {
        Protocol::Udp => {
            let socket = UnixDatagram::unbound()?;
            socket.connect(path)?;
            Ok(SyslogConnection::UnixDatagram(socket))
        }
        Protocol::Tcp => Ok(SyslogConnection::UnixStream(UnixStream::connect(path)?)),
    }
}

#[cfg(not(unix))]
fn connect_unix(_path: &std::path::Path, _protocol: Protocol) -> io::Result<SyslogConnection> {
    Err(io::Error::new(
        io::ErrorKind::Unsupported,
        "unix domain sockets are not supported on this platform",
    ))
}

/// Open a connection to `address` using `protocol`.
///
/// For Unix paths the protocol selects a datagram (`Udp`) or stream (`Tcp`)
/// socket. UDP sockets bind an ephemeral local port and never connect.
pub(crate) fn connect(
    address: &SyslogAddress,
    protocol: Protocol,
    connect_timeout: Duration,
) -> io::Result<SyslogConnection> {
    match address {
        SyslogAddress::Unix(path) => connect_unix(path, protocol),
        SyslogAddress::Inet { host, port } => match protocol {
            Protocol::Udp => connect_udp(host, *port),
            Protocol::Tcp => connect_tcp(host, *port, connect_timeout),
        },
    }
}
