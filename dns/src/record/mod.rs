//! All the DNS record types, as well as how to parse each type.

use std::io;

use byteorder::ReadBytesExt;

use crate::strings::CompressionMap;
use crate::wire::{Cursor, Wire, WireError};


mod a;
pub use self::a::A;

mod aaaa;
pub use self::aaaa::AAAA;

mod cname;
pub use self::cname::CNAME;

mod mx;
pub use self::mx::MX;

mod ns;
pub use self::ns::NS;

mod ptr;
pub use self::ptr::PTR;

mod srv;
pub use self::srv::SRV;

mod txt;
pub use self::txt::TXT;


/// A record that's been parsed from a byte buffer.
#[derive(PartialEq, Debug, Clone)]
pub enum Record {

    /// An **A** record.
    A(A),

    /// An **AAAA** record.
    AAAA(AAAA),

    /// A **CNAME** record.
    CNAME(CNAME),

    /// A **MX** record.
    MX(MX),

    /// A **NS** record.
    NS(NS),

    /// A **PTR** record.
    PTR(PTR),

    /// A **SRV** record.
    SRV(SRV),

    /// A **TXT** record.
    TXT(TXT),

    /// A record with a type that we don't recognise, kept as opaque bytes so
    /// the rest of the message can still round-trip unchanged.
    Other {

        /// The raw type number found in the packet.
        qtype: u16,

        /// The undecodable bytes that were in this record.
        bytes: Vec<u8>,
    },
}

impl Record {

    /// Reads a record's rdata body, dispatching on the given qtype number.
    /// Falls back to `Other` for any type number this crate doesn't model.
    pub(crate) fn from_bytes(qtype: u16, len: u16, c: &mut Cursor<&[u8]>) -> Result<Self, WireError> {
        Ok(match qtype {
            A::RR_TYPE     => Self::A(A::read(len, c)?),
            AAAA::RR_TYPE  => Self::AAAA(AAAA::read(len, c)?),
            CNAME::RR_TYPE => Self::CNAME(CNAME::read(len, c)?),
            MX::RR_TYPE    => Self::MX(MX::read(len, c)?),
            NS::RR_TYPE    => Self::NS(NS::read(len, c)?),
            PTR::RR_TYPE   => Self::PTR(PTR::read(len, c)?),
            SRV::RR_TYPE   => Self::SRV(SRV::read(len, c)?),
            TXT::RR_TYPE   => Self::TXT(TXT::read(len, c)?),
            _ => {
                let mut bytes = Vec::with_capacity(usize::from(len));
                for _ in 0 .. len {
                    bytes.push(c.read_u8()?);
                }
                Self::Other { qtype, bytes }
            }
        })
    }

    /// The numeric type of this record, as it would appear on the wire.
    pub fn rr_type(&self) -> u16 {
        match self {
            Self::A(_)     => A::RR_TYPE,
            Self::AAAA(_)  => AAAA::RR_TYPE,
            Self::CNAME(_) => CNAME::RR_TYPE,
            Self::MX(_)    => MX::RR_TYPE,
            Self::NS(_)    => NS::RR_TYPE,
            Self::PTR(_)   => PTR::RR_TYPE,
            Self::SRV(_)   => SRV::RR_TYPE,
            Self::TXT(_)   => TXT::RR_TYPE,
            Self::Other { qtype, .. } => *qtype,
        }
    }

    /// This record's type name, such as `"A"` or `"CNAME"`, for logging and
    /// display. Unrecognised types are named after their raw qtype number.
    pub fn type_name(&self) -> std::borrow::Cow<'static, str> {
        match self {
            Self::A(_)     => A::NAME.into(),
            Self::AAAA(_)  => AAAA::NAME.into(),
            Self::CNAME(_) => CNAME::NAME.into(),
            Self::MX(_)    => MX::NAME.into(),
            Self::NS(_)    => NS::NAME.into(),
            Self::PTR(_)   => PTR::NAME.into(),
            Self::SRV(_)   => SRV::NAME.into(),
            Self::TXT(_)   => TXT::NAME.into(),
            Self::Other { qtype, .. } => qtype.to_string().into(),
        }
    }

    /// Writes this record's rdata body, sharing the message-wide compression
    /// dictionary with any names it contains.
    pub(crate) fn write_rdata(&self, bytes: &mut Vec<u8>, offset: usize, dictionary: &mut CompressionMap) -> io::Result<()> {
        match self {
            Self::A(r)     => r.write(bytes, offset, dictionary),
            Self::AAAA(r)  => r.write(bytes, offset, dictionary),
            Self::CNAME(r) => r.write(bytes, offset, dictionary),
            Self::MX(r)    => r.write(bytes, offset, dictionary),
            Self::NS(r)    => r.write(bytes, offset, dictionary),
            Self::PTR(r)   => r.write(bytes, offset, dictionary),
            Self::SRV(r)   => r.write(bytes, offset, dictionary),
            Self::TXT(r)   => r.write(bytes, offset, dictionary),
            Self::Other { bytes: raw, .. } => { bytes.extend_from_slice(raw); Ok(()) }
        }
    }
}
