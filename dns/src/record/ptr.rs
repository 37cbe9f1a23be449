use std::io;

use crate::strings::{CompressionMap, Labels, ReadLabels, WriteLabels};
use crate::wire::*;


/// A **PTR** record, which holds a _pointer_ to a canonical name. This is
/// most often used for reverse DNS lookups.
///
/// # References
///
/// - [RFC 1035 §3.3.14](https://tools.ietf.org/html/rfc1035) — Domain Names, Implementation and Specification (November 1987)
#[derive(PartialEq, Debug, Clone)]
pub struct PTR {

    /// The domain name contained in the record.
    pub domain: Labels,
}

impl Wire for PTR {
    const NAME: &'static str = "PTR";
    const RR_TYPE: u16 = 12;

    fn read(_len: u16, c: &mut Cursor<&[u8]>) -> Result<Self, WireError> {
        let domain = c.read_labels()?;
        Ok(PTR { domain })
    }

    fn write(&self, bytes: &mut Vec<u8>, offset: usize, dictionary: &mut CompressionMap) -> io::Result<()> {
        bytes.write_labels(&self.domain, offset, dictionary)
    }
}
