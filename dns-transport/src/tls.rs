//! Establishing the TLS session used by DNS-over-TLS (DoT).
//!
//! DoT is plain TCP with a TLS session wrapped around it; from the framer's
//! point of view the result is just another `Read + Write` stream. Which
//! concrete stream type that is depends on which TLS provider feature is
//! enabled, which is why callers only ever see it through the boxed
//! `ReadWrite` trait object.

use std::net::{SocketAddr, TcpStream, ToSocketAddrs};

use crate::channel::ReadWrite;
use crate::error::Error;

/// Resolves `host` to a socket address on the given port. If `host` is
/// already a bare IP address, that address is used directly.
pub(crate) fn resolve(host: &str, port: u16) -> Result<SocketAddr, Error> {
    if let Ok(ip) = host.parse() {
        return Ok(SocketAddr::new(ip, port));
    }

    (host, port).to_socket_addrs()?
        .next()
        .ok_or_else(|| Error::Io(std::io::Error::new(std::io::ErrorKind::NotFound, "could not resolve DoT host")))
}

cfg_if::cfg_if! {
    if #[cfg(any(feature = "with_nativetls", feature = "with_nativetls_vendored"))] {
        pub(crate) fn wrap(domain: &str, tcp: TcpStream) -> Result<Box<dyn ReadWrite>, Error> {
            let connector = native_tls::TlsConnector::new()?;
            let stream = connector.connect(domain, tcp)?;
            Ok(Box::new(stream))
        }
    } else if #[cfg(feature = "with_rustls")] {
        use std::sync::Arc;

        pub(crate) fn wrap(domain: &str, tcp: TcpStream) -> Result<Box<dyn ReadWrite>, Error> {
            let mut roots = rustls::RootCertStore::empty();
            roots.add_trust_anchors(webpki_roots::TLS_SERVER_ROOTS.iter().map(|ta| {
                rustls::OwnedTrustAnchor::from_subject_spki_name_constraints(ta.subject, ta.spki, ta.name_constraints)
            }));

            let config = rustls::ClientConfig::builder()
                .with_safe_defaults()
                .with_root_certificates(roots)
                .with_no_client_auth();

            let server_name = rustls::ServerName::try_from(domain)
                .map_err(|_| Error::Io(std::io::Error::new(std::io::ErrorKind::InvalidInput, "invalid DoT server name")))?;

            let conn = rustls::ClientConnection::new(Arc::new(config), server_name)?;
            Ok(Box::new(rustls::StreamOwned::new(conn, tcp)))
        }
    } else {
        pub(crate) fn wrap(_domain: &str, _tcp: TcpStream) -> Result<Box<dyn ReadWrite>, Error> {
            Err(Error::Io(std::io::Error::new(std::io::ErrorKind::Other, "no TLS provider feature enabled")))
        }
    }
}
