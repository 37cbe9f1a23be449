//! Per-connection knobs: the things that would otherwise be scattered across
//! a resolver's call sites.

use std::time::Duration;


/// Options controlling how a [`Connection`](crate::Connection) behaves, set
/// once when the connection is opened.
#[derive(Debug, Clone)]
pub struct ConnectionOptions {

    /// How long to wait for a reply before a query fails with
    /// [`Error::Timeout`](crate::Error::Timeout).
    pub ttl: Duration,

    /// Whether this connection speaks to a multicast group (mDNS) rather
    /// than a single nameserver. A multicast connection clears the
    /// `recursion_desired` flag on every outgoing query, since there is no
    /// recursive resolver on the other end to ask.
    pub is_multicast: bool,
}

impl Default for ConnectionOptions {
    fn default() -> Self {
        Self {
            ttl: Duration::from_secs(30),
            is_multicast: false,
        }
    }
}
