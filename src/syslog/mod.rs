//! Syslog output: destination resolution, framing and the handler itself.

pub mod facility;
mod handler;
pub mod resolve;
pub mod transport;

pub use facility::{Facility, FacilityParseError};
pub use handler::{SyslogHandler, frame};
pub use resolve::{
    AddressArg, EnvironmentKind, SyslogEnvironment, resolve_address, resolve_protocol,
};
pub use transport::{Protocol, ProtocolParseError, SyslogAddress};
