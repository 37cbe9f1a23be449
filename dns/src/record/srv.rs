use std::io;

use log::{debug, warn};

use crate::strings::{CompressionMap, Labels, ReadLabels, WriteLabels};
use crate::wire::*;


/// A **SRV** record, which contains an IP address as well as a port number,
/// for specifying the location of services more precisely.
///
/// # References
///
/// - [RFC 2782](https://tools.ietf.org/html/rfc2782) — A DNS RR for specifying the location of services (February 2000)
#[derive(PartialEq, Debug, Clone)]
pub struct SRV {

    /// The priority of this host among all that get returned. Lower values
    /// are higher priority.
    pub priority: u16,

    /// A weight to choose among results with the same priority. Higher values
    /// are higher priority.
    pub weight: u16,

    /// The port the service is serving on.
    pub port: u16,

    /// The hostname of the machine the service is running on.
    pub target: Labels,
}

impl Wire for SRV {
    const NAME: &'static str = "SRV";
    const RR_TYPE: u16 = 33;

    fn read(len: u16, c: &mut Cursor<&[u8]>) -> Result<Self, WireError> {
        let priority = c.read_u16::<BigEndian>()?;
        let weight   = c.read_u16::<BigEndian>()?;
        let port     = c.read_u16::<BigEndian>()?;
        let target   = c.read_labels()?;

        let got_length = 3 * 2 + target.wire_len();
        if got_length != len as usize {
            warn!("Expected length {} but got {}", len, got_length);
        }
        else {
            debug!("Length {} is correct", len);
        }

        Ok(SRV { priority, weight, port, target })
    }

    fn write(&self, bytes: &mut Vec<u8>, offset: usize, dictionary: &mut CompressionMap) -> io::Result<()> {
        bytes.write_u16::<BigEndian>(self.priority)?;
        bytes.write_u16::<BigEndian>(self.weight)?;
        bytes.write_u16::<BigEndian>(self.port)?;
        bytes.write_labels(&self.target, offset + 6, dictionary)
    }
}
