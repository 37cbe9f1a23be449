//! Adding and stripping transport framing.
//!
//! DNS messages travel in one of two framing modes: a datagram carries
//! exactly one message with no framing at all, while a byte stream (TCP, or
//! TLS over TCP for DoT) prefixes each message with its length as a 16-bit
//! big-endian count of the bytes that follow (RFC 1035 §4.2.2). The stream
//! framer is written against `Read`/`Write` rather than `TcpStream`
//! directly, so that it works identically whether the stream is plain TCP or
//! wrapped in TLS.

use std::io::{self, Read, Write};

use byteorder::{BigEndian, ReadBytesExt, WriteBytesExt};


/// Writes one message to a stream, prefixed by its 2-byte big-endian length.
pub fn write_frame<W: Write>(writer: &mut W, bytes: &[u8]) -> io::Result<()> {
    let len = u16::try_from(bytes.len())
        .map_err(|_| io::Error::new(io::ErrorKind::InvalidInput, "message too long to frame"))?;

    writer.write_u16::<BigEndian>(len)?;
    writer.write_all(bytes)?;
    Ok(())
}

/// Reads one length-prefixed message from a stream, blocking (and looping
/// over partial reads) until the full frame has arrived.
pub fn read_frame<R: Read>(reader: &mut R) -> io::Result<Vec<u8>> {
    let len = reader.read_u16::<BigEndian>()?;
    let mut buf = vec![0_u8; usize::from(len)];
    reader.read_exact(&mut buf)?;
    Ok(buf)
}
