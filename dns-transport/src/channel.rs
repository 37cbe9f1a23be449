//! Opening UDP, TCP, and DNS-over-TLS channels.
//!
//! A `Channel` is a uniform surface over the three wire modes the
//! multiplexer can run on: it doesn't care whether a frame of bytes left
//! the process as a UDP datagram or through a TLS-wrapped TCP stream.
//! Multi-server failover is not a channel concern — a channel talks to
//! exactly one remote, chosen at construction time.

use std::io::{Read, Write};
use std::net::{IpAddr, Ipv4Addr, SocketAddr, TcpStream, UdpSocket};
use std::sync::Mutex;
use std::time::Duration;

use log::*;
use socket2::{Domain, Protocol, Socket, Type};

use crate::error::Error;
use crate::framer::{read_frame, write_frame};

/// The standard mDNS multicast group and port (RFC 6762 §3).
const MDNS_ADDR: (Ipv4Addr, u16) = (Ipv4Addr::new(224, 0, 0, 251), 5353);

/// The standard DNS-over-TLS port (RFC 7858).
const DOT_PORT: u16 = 853;

/// The standard plaintext DNS port.
const DNS_PORT: u16 = 53;


/// A channel on which whole DNS messages can be sent and received, already
/// opened and framed.
pub trait Channel: Send + Sync {

    /// Writes one already-encoded message as a single frame.
    fn send_frame(&self, bytes: &[u8]) -> Result<(), Error>;

    /// Blocks until one complete frame has arrived, and returns its bytes.
    fn recv_frame(&self) -> Result<Vec<u8>, Error>;
}


/// A channel over a connected UDP socket. Framing is the identity: one
/// datagram is one message, in both directions.
pub struct UdpChannel {
    socket: UdpSocket,
    send_lock: Mutex<()>,
}

impl UdpChannel {

    /// Opens a UDP socket and connects it to the first IPv4 nameserver in
    /// the list, or the first nameserver of any family if there isn't one.
    pub fn udp(nameservers: &[IpAddr]) -> Result<Self, Error> {
        let preferred = nameservers.iter().find(|ip| ip.is_ipv4())
            .or_else(|| nameservers.first())
            .ok_or_else(|| Error::Io(std::io::Error::new(std::io::ErrorKind::InvalidInput, "no nameservers given")))?;

        let local = match preferred {
            IpAddr::V4(_) => SocketAddr::from((Ipv4Addr::UNSPECIFIED, 0)),
            IpAddr::V6(_) => SocketAddr::from((std::net::Ipv6Addr::UNSPECIFIED, 0)),
        };

        info!("Opening UDP socket bound to {:?}", local);
        let domain = if preferred.is_ipv4() { Domain::IPV4 } else { Domain::IPV6 };
        let socket = reusable_udp_socket(domain)?;
        socket.bind(&local.into())?;
        socket.connect(&SocketAddr::from((*preferred, DNS_PORT)).into())?;

        Ok(Self { socket: socket.into(), send_lock: Mutex::new(()) })
    }

    /// Opens a UDP socket joined to the mDNS multicast group. Callers are
    /// responsible for clearing `recursion_desired` on outbound queries sent
    /// over this channel.
    pub fn udp_multicast() -> Result<Self, Error> {
        info!("Opening multicast UDP socket");
        let socket = reusable_udp_socket(Domain::IPV4)?;
        socket.bind(&SocketAddr::from((Ipv4Addr::UNSPECIFIED, MDNS_ADDR.1)).into())?;

        let socket: UdpSocket = socket.into();
        socket.join_multicast_v4(&MDNS_ADDR.0, &Ipv4Addr::UNSPECIFIED)?;
        socket.connect(MDNS_ADDR)?;

        Ok(Self { socket, send_lock: Mutex::new(()) })
    }
}

/// Builds a UDP socket with `SO_REUSEADDR` (and, on platforms that have it,
/// `SO_REUSEPORT`) set before bind, so that several resolver instances (or an
/// mDNS responder sharing the same multicast group) can bind the same
/// address. `std::net::UdpSocket` has no way to set these before binding.
fn reusable_udp_socket(domain: Domain) -> Result<Socket, Error> {
    let socket = Socket::new(domain, Type::DGRAM, Some(Protocol::UDP))?;
    socket.set_reuse_address(true)?;

    #[cfg(unix)]
    socket.set_reuse_port(true)?;

    Ok(socket)
}

impl Channel for UdpChannel {
    fn send_frame(&self, bytes: &[u8]) -> Result<(), Error> {
        let _guard = self.send_lock.lock().unwrap();
        let len = self.socket.send(bytes)?;
        debug!("Sent {} bytes over UDP", len);
        Ok(())
    }

    fn recv_frame(&self) -> Result<Vec<u8>, Error> {
        let mut buf = vec![0_u8; 4096];
        let len = self.socket.recv(&mut buf)?;
        buf.truncate(len);
        debug!("Received {} bytes over UDP", len);
        Ok(buf)
    }
}


/// A channel over a reliable byte stream (TCP, or TLS over TCP for DoT),
/// with the 2-byte length-prefix framing from RFC 1035 §4.2.2 applied to
/// every message in either direction.
pub struct StreamChannel<S: Read + Write + Send> {
    stream: Mutex<S>,
}

impl StreamChannel<TcpStream> {

    /// Connects to the given nameserver on the standard DNS-over-TCP port.
    pub fn tcp(nameserver: IpAddr) -> Result<Self, Error> {
        info!("Opening TCP connection to {:?}", nameserver);
        let stream = TcpStream::connect((nameserver, DNS_PORT))?;
        Ok(Self { stream: Mutex::new(stream) })
    }
}

impl<S: Read + Write + Send> Channel for StreamChannel<S> {
    fn send_frame(&self, bytes: &[u8]) -> Result<(), Error> {
        let mut stream = self.stream.lock().unwrap();
        write_frame(&mut *stream, bytes)?;
        debug!("Sent {} bytes over stream", bytes.len());
        Ok(())
    }

    fn recv_frame(&self) -> Result<Vec<u8>, Error> {
        let mut stream = self.stream.lock().unwrap();
        let frame = read_frame(&mut *stream)?;
        debug!("Received {} bytes over stream", frame.len());
        Ok(frame)
    }
}


/// A boxed, object-safe byte stream, used so that DoT's concrete TLS stream
/// type (which depends on which TLS provider feature is enabled) doesn't
/// leak into `StreamChannel`'s type parameter.
pub trait ReadWrite: Read + Write + Send {}
impl<T: Read + Write + Send> ReadWrite for T {}

impl StreamChannel<Box<dyn ReadWrite>> {

    /// Resolves `host`, connects on the standard DoT port, and wraps the
    /// connection in TLS. `host` is used as the SNI server name unless it's
    /// a bare IP address.
    pub fn dot(host: &str, timeout: Option<Duration>) -> Result<Self, Error> {
        let addr = crate::tls::resolve(host, DOT_PORT)?;
        info!("Opening DoT connection to {:?}", addr);

        let tcp = match timeout {
            Some(t) => TcpStream::connect_timeout(&addr, t)?,
            None    => TcpStream::connect(addr)?,
        };

        let stream = crate::tls::wrap(host, tcp)?;
        Ok(Self { stream: Mutex::new(stream) })
    }
}
