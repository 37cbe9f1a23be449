//! The top-level error type tying the codec, transport, and multiplexer
//! together.

use std::fmt;

use dns::{Header, WireError};


/// Something that can go wrong sending a query and waiting for its reply.
#[derive(Debug)]
pub enum Error {

    /// The wire decode failed before a usable header could be recovered.
    Protocol(WireError),

    /// The wire decode failed after the header was recovered; the header is
    /// kept so the right in-flight query can still be failed.
    Message {

        /// The header that was successfully parsed before the failure.
        header: Header,

        /// The underlying wire-format violation.
        inner: WireError,
    },

    /// The query's per-call deadline elapsed before a reply arrived.
    Timeout,

    /// The query was cancelled by a call to `cancel_all`.
    Cancelled,

    /// No nameservers were supplied, and none could be discovered.
    MissingNameservers,

    /// `/etc/resolv.conf` (or its platform equivalent) could not be read or
    /// parsed.
    Config(ConfigError),

    /// The transport channel failed; this closes the connection, and every
    /// other in-flight query on it fails with the same error.
    Transport(dns_transport::Error),

    /// All 65,536 transaction IDs are currently in use.
    ResourceExhausted,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Protocol(e) => write!(f, "protocol error: {:?}", e),
            Self::Message { inner, .. } => write!(f, "message decode error: {:?}", inner),
            Self::Timeout => write!(f, "query timed out"),
            Self::Cancelled => write!(f, "query was cancelled"),
            Self::MissingNameservers => write!(f, "no nameservers configured"),
            Self::Config(e) => write!(f, "configuration error: {}", e),
            Self::Transport(e) => write!(f, "transport error: {}", e),
            Self::ResourceExhausted => write!(f, "no free transaction IDs"),
        }
    }
}

impl std::error::Error for Error {}

impl From<dns_transport::Error> for Error {
    fn from(inner: dns_transport::Error) -> Self {
        Self::Transport(inner)
    }
}

impl From<ConfigError> for Error {
    fn from(inner: ConfigError) -> Self {
        Self::Config(inner)
    }
}


/// Something that can go wrong reading `/etc/resolv.conf` or the platform's
/// local nameserver configuration.
#[derive(Debug)]
pub enum ConfigError {

    /// There was a problem reading the configuration file.
    Io(std::io::Error),

    /// The system information was read successfully, but contained no
    /// usable nameserver.
    NoNameserver,

    /// The name passed to `send_query` could not be encoded as a sequence
    /// of DNS labels.
    InvalidName(String),

    /// There was an error accessing the network configuration (Windows
    /// adapter enumeration).
    #[cfg(windows)]
    Windows(ipconfig::error::Error),

    /// This platform has no known way of discovering nameservers, so the
    /// caller must supply one explicitly.
    #[cfg(all(not(unix), not(windows)))]
    UnsupportedPlatform,
}

impl From<std::io::Error> for ConfigError {
    fn from(inner: std::io::Error) -> Self {
        Self::Io(inner)
    }
}

#[cfg(windows)]
impl From<ipconfig::error::Error> for ConfigError {
    fn from(inner: ipconfig::error::Error) -> Self {
        Self::Windows(inner)
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(e) => write!(f, "error reading network configuration: {}", e),
            Self::NoNameserver => write!(f, "no nameserver found"),
            Self::InvalidName(name) => write!(f, "{:?} is not a valid domain name", name),
            #[cfg(windows)]
            Self::Windows(e) => write!(f, "error reading network configuration: {}", e),
            #[cfg(all(not(unix), not(windows)))]
            Self::UnsupportedPlatform => write!(f, "cannot automatically detect nameservers on this platform"),
        }
    }
}

impl std::error::Error for ConfigError {}
