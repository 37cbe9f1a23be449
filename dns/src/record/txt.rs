use std::fmt;
use std::io;

use log::*;

use crate::strings::CompressionMap;
use crate::wire::*;


/// A **TXT** record, which holds one or more arbitrary descriptive strings.
///
/// # Encoding
///
/// The text encoding is not specified, but this crate treats each segment as
/// UTF-8. Invalid bytes are turned into the replacement character.
///
/// # References
///
/// - [RFC 1035 §3.3.14](https://tools.ietf.org/html/rfc1035) — Domain Names, Implementation and Specification (November 1987)
#[derive(PartialEq, Debug, Clone)]
pub struct TXT {

    /// The length-prefixed strings that make up this record's rdata, in
    /// the order they appeared on the wire.
    pub strings: Vec<String>,
}

impl fmt::Display for TXT {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for s in &self.strings {
            write!(f, "{}", s)?;
        }

        Ok(())
    }
}

impl Wire for TXT {
    const NAME: &'static str = "TXT";
    const RR_TYPE: u16 = 16;

    fn read(len: u16, c: &mut Cursor<&[u8]>) -> Result<Self, WireError> {
        let mut strings = Vec::new();
        let mut consumed = 0_usize;

        while consumed < len as usize {
            let segment_len = c.read_u8()?;
            consumed += 1;

            let mut buf = Vec::with_capacity(usize::from(segment_len));
            for _ in 0 .. segment_len {
                buf.push(c.read_u8()?);
            }
            consumed += usize::from(segment_len);

            strings.push(String::from_utf8_lossy(&buf).to_string());
        }

        if consumed != len as usize {
            warn!("Expected length {} but read {} bytes", len, consumed);
        }
        else {
            debug!("Length {} is correct", len);
        }

        Ok(TXT { strings })
    }

    fn write(&self, bytes: &mut Vec<u8>, _offset: usize, _dictionary: &mut CompressionMap) -> io::Result<()> {
        for s in &self.strings {
            let mut remaining = s.as_bytes();
            loop {
                let chunk_len = remaining.len().min(255);
                bytes.write_u8(chunk_len as u8)?;
                bytes.extend_from_slice(&remaining[.. chunk_len]);
                remaining = &remaining[chunk_len ..];
                if remaining.is_empty() {
                    break;
                }
            }
        }

        Ok(())
    }
}
