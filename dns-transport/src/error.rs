//! Something that can go wrong opening a channel or moving bytes over it.

use std::fmt;

/// A transport-level failure: anything that happens below the wire codec,
/// while opening a connection or while moving framed bytes over it.
#[derive(Debug)]
pub enum Error {

    /// There was a problem with the underlying network I/O.
    Io(std::io::Error),

    /// There was a problem making a TLS request.
    #[cfg(any(feature = "with_nativetls", feature = "with_nativetls_vendored"))]
    TlsError(native_tls::Error),

    /// There was a problem _establishing_ a TLS request.
    #[cfg(any(feature = "with_nativetls", feature = "with_nativetls_vendored"))]
    TlsHandshakeError(native_tls::HandshakeError<std::net::TcpStream>),

    /// There was a problem with the rustls client configuration or session.
    #[cfg(feature = "with_rustls")]
    RustlsError(rustls::Error),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(e) => write!(f, "network I/O error: {}", e),
            #[cfg(any(feature = "with_nativetls", feature = "with_nativetls_vendored"))]
            Self::TlsError(e) => write!(f, "TLS error: {}", e),
            #[cfg(any(feature = "with_nativetls", feature = "with_nativetls_vendored"))]
            Self::TlsHandshakeError(e) => write!(f, "TLS handshake error: {}", e),
            #[cfg(feature = "with_rustls")]
            Self::RustlsError(e) => write!(f, "rustls error: {}", e),
        }
    }
}

impl std::error::Error for Error {}


impl From<std::io::Error> for Error {
    fn from(inner: std::io::Error) -> Self {
        Self::Io(inner)
    }
}

#[cfg(any(feature = "with_nativetls", feature = "with_nativetls_vendored"))]
impl From<native_tls::Error> for Error {
    fn from(inner: native_tls::Error) -> Self {
        Self::TlsError(inner)
    }
}

#[cfg(any(feature = "with_nativetls", feature = "with_nativetls_vendored"))]
impl From<native_tls::HandshakeError<std::net::TcpStream>> for Error {
    fn from(inner: native_tls::HandshakeError<std::net::TcpStream>) -> Self {
        Self::TlsHandshakeError(inner)
    }
}

#[cfg(feature = "with_rustls")]
impl From<rustls::Error> for Error {
    fn from(inner: rustls::Error) -> Self {
        Self::RustlsError(inner)
    }
}
