//! Encoding and decoding the DNS wire protocol.
//!
//! A `Message` is encoded by writing the header, then each of the four
//! sections in turn, sharing a single name-compression dictionary across the
//! whole buffer. It is decoded the same way, except that names may refer
//! backwards into any part of the buffer already produced, via RFC 1035
//! §4.1.4 pointers — so the cursor used for decoding always ranges over the
//! entire message, never just the section currently being read.

pub(crate) use std::io::Cursor;
pub(crate) use byteorder::{BigEndian, ReadBytesExt, WriteBytesExt};

use std::io;
use log::*;

use crate::record::Record;
use crate::strings::{CompressionMap, Labels, ReadLabels, WriteLabels};
use crate::types::*;


impl Message {

    /// Serialises this message into a vector of bytes, applying name
    /// compression across the whole buffer.
    pub fn to_bytes(&self) -> io::Result<Vec<u8>> {
        let mut bytes = Vec::with_capacity(64);
        let mut dictionary = CompressionMap::new();

        bytes.write_u16::<BigEndian>(self.header.id)?;
        bytes.write_u16::<BigEndian>(self.header.flags.to_u16())?;
        bytes.write_u16::<BigEndian>(u16::try_from_usize(self.questions.len()))?;
        bytes.write_u16::<BigEndian>(u16::try_from_usize(self.answers.len()))?;
        bytes.write_u16::<BigEndian>(u16::try_from_usize(self.authorities.len()))?;
        bytes.write_u16::<BigEndian>(u16::try_from_usize(self.additionals.len()))?;

        for question in &self.questions {
            bytes.write_labels(&question.qname, bytes_offset(&bytes), &mut dictionary)?;
            bytes.write_u16::<BigEndian>(question.qtype)?;
            bytes.write_u16::<BigEndian>(question.qclass.to_u16())?;
        }

        for section in [&self.answers, &self.authorities, &self.additionals] {
            for rr in section {
                write_resource_record(&mut bytes, rr, &mut dictionary)?;
            }
        }

        Ok(bytes)
    }
}

/// The current length of a buffer being built, as an absolute offset within
/// the final message (names can only be compressed as pointers as long as
/// this fits in 14 bits).
fn bytes_offset(bytes: &[u8]) -> usize {
    bytes.len()
}

trait TryFromUsize {
    fn try_from_usize(n: usize) -> Self;
}

impl TryFromUsize for u16 {
    fn try_from_usize(n: usize) -> Self {
        // Record/question counts beyond 65535 can't be represented in the
        // wire format; a caller building a message with that many entries
        // has already done something nonsensical.
        u16::try_from(n).expect("too many entries in one section for the 16-bit wire count")
    }
}

fn write_resource_record(bytes: &mut Vec<u8>, rr: &ResourceRecord, dictionary: &mut CompressionMap) -> io::Result<()> {
    bytes.write_labels(&rr.qname, bytes_offset(bytes), dictionary)?;
    bytes.write_u16::<BigEndian>(rr.record.rr_type())?;
    bytes.write_u16::<BigEndian>(rr.qclass.to_u16())?;
    bytes.write_u32::<BigEndian>(rr.ttl)?;

    // The rdata is built into a scratch buffer first so its length can be
    // written ahead of it; it shares the same compression dictionary and
    // absolute offset space as the rest of the message, because pointers
    // inside rdata (e.g. a CNAME target) reference the whole buffer.
    let rdata_offset = bytes_offset(bytes) + 2;
    let mut rdata = Vec::new();
    rr.record.write_rdata(&mut rdata, rdata_offset, dictionary)?;

    bytes.write_u16::<BigEndian>(u16::try_from_usize(rdata.len()))?;
    bytes.extend_from_slice(&rdata);
    Ok(())
}


impl Message {

    /// Reads bytes off of the given slice, parsing them into a message.
    ///
    /// If a header can be recovered before the failure, it is carried in the
    /// returned `MessageError` so that a caller tracking in-flight queries by
    /// transaction ID can still fail the right one.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, MessageError> {
        trace!("Parsing message ({} bytes)", bytes.len());
        let mut c = Cursor::new(bytes);

        let header = match read_header(&mut c) {
            Ok(header) => header,
            Err(error) => return Err(MessageError { header: None, inner: error }),
        };

        (|| {
            let mut questions = Vec::new();
            for _ in 0 .. header.qdcount {
                questions.push(read_question(&mut c)?);
            }

            let mut answers = Vec::new();
            for _ in 0 .. header.ancount {
                answers.push(read_resource_record(&mut c)?);
            }

            let mut authorities = Vec::new();
            for _ in 0 .. header.nscount {
                authorities.push(read_resource_record(&mut c)?);
            }

            let mut additionals = Vec::new();
            for _ in 0 .. header.arcount {
                additionals.push(read_resource_record(&mut c)?);
            }

            Ok(Self { header, questions, answers, authorities, additionals })
        })().map_err(|error| MessageError { header: Some(header), inner: error })
    }
}

fn read_header(c: &mut Cursor<&[u8]>) -> Result<Header, WireError> {
    let id = c.read_u16::<BigEndian>()?;
    let flags = Flags::from_u16(c.read_u16::<BigEndian>()?);
    let qdcount = c.read_u16::<BigEndian>()?;
    let ancount = c.read_u16::<BigEndian>()?;
    let nscount = c.read_u16::<BigEndian>()?;
    let arcount = c.read_u16::<BigEndian>()?;
    Ok(Header { id, flags, qdcount, ancount, nscount, arcount })
}

fn read_question(c: &mut Cursor<&[u8]>) -> Result<Question, WireError> {
    let qname = c.read_labels()?;
    let qtype = c.read_u16::<BigEndian>()?;
    let qclass = QClass::from_u16(c.read_u16::<BigEndian>()?);
    Ok(Question { qname, qclass, qtype })
}

fn read_resource_record(c: &mut Cursor<&[u8]>) -> Result<ResourceRecord, WireError> {
    let qname = c.read_labels()?;
    let qtype = c.read_u16::<BigEndian>()?;
    let qclass = QClass::from_u16(c.read_u16::<BigEndian>()?);
    let ttl = c.read_u32::<BigEndian>()?;
    let record_length = c.read_u16::<BigEndian>()?;
    let record = Record::from_bytes(qtype, record_length, c)?;
    Ok(ResourceRecord { qname, qclass, ttl, record })
}


impl QClass {
    fn from_u16(uu: u16) -> Self {
        match uu {
            0x0001 => Self::IN,
            0x0003 => Self::CH,
            0x0004 => Self::HS,
                 _ => Self::Other(uu),
        }
    }

    fn to_u16(self) -> u16 {
        match self {
            Self::IN        => 0x0001,
            Self::CH        => 0x0003,
            Self::HS        => 0x0004,
            Self::Other(uu) => uu,
        }
    }
}


impl Flags {

    /// The set of flags that represents a standard query packet, with
    /// recursion desired set (the core clears it again for multicast).
    pub fn query() -> Self {
        Self::from_u16(0b_0000_0001_0000_0000)
    }

    /// Converts the flags into a two-byte number.
    pub fn to_u16(self) -> u16 {                 // 0123 4567 89AB CDEF
        let mut                          bits  = 0b_0000_0000_0000_0000_u16;
        if self.response               { bits |= 0b_1000_0000_0000_0000; }
        bits |= self.opcode.to_bits();
        if self.authoritative          { bits |= 0b_0000_0100_0000_0000; }
        if self.truncated              { bits |= 0b_0000_0010_0000_0000; }
        if self.recursion_desired      { bits |= 0b_0000_0001_0000_0000; }
        if self.recursion_available    { bits |= 0b_0000_0000_1000_0000; }
        if self.authentic_data         { bits |= 0b_0000_0000_0010_0000; }
        if self.checking_disabled      { bits |= 0b_0000_0000_0001_0000; }

        bits | self.error_code.map_or(0, ErrorCode::to_bits)
    }

    /// Extracts the flags from the given two-byte number.
    pub fn from_u16(bits: u16) -> Self {
        let has_bit = |bit| bits & bit == bit;

        Self {
            response:               has_bit(0b_1000_0000_0000_0000),
            opcode:                 Opcode::from_bits((bits.to_be_bytes()[0] & 0b_0111_1000) >> 3),
            authoritative:          has_bit(0b_0000_0100_0000_0000),
            truncated:              has_bit(0b_0000_0010_0000_0000),
            recursion_desired:      has_bit(0b_0000_0001_0000_0000),
            recursion_available:    has_bit(0b_0000_0000_1000_0000),
            authentic_data:         has_bit(0b_0000_0000_0010_0000),
            checking_disabled:      has_bit(0b_0000_0000_0001_0000),
            error_code:             ErrorCode::from_bits(bits & 0b_1111),
        }
    }
}


impl Opcode {

    /// Extracts the opcode from this four-bit number, which should have been
    /// extracted from the packet and shifted to be in the range 0–15.
    fn from_bits(bits: u8) -> Self {
        if bits == 0 { Self::Query } else { Self::Other(bits) }
    }

    /// Packs the opcode back into its four-bit position within the flags.
    fn to_bits(self) -> u16 {
        match self {
            Self::Query      => 0,
            Self::Other(bits) => u16::from(bits) << 11,
        }
    }
}


impl ErrorCode {

    /// Extracts the rcode from the last four bits of the flags field.
    fn from_bits(bits: u16) -> Option<Self> {
        match bits {
            0 => None,
            1 => Some(Self::FormatError),
            2 => Some(Self::ServerFailure),
            3 => Some(Self::NXDomain),
            4 => Some(Self::NotImplemented),
            5 => Some(Self::QueryRefused),
            n => Some(Self::Other(n)),
        }
    }

    /// Packs the rcode back into the last four bits of the flags field.
    fn to_bits(self) -> u16 {
        match self {
            Self::FormatError    => 1,
            Self::ServerFailure  => 2,
            Self::NXDomain       => 3,
            Self::NotImplemented => 4,
            Self::QueryRefused   => 5,
            Self::Other(n)       => n,
        }
    }
}


/// Trait for encoding and decoding a record body from bytes read over the
/// wire. Implemented once per supported record type.
pub trait Wire: Sized {

    /// This record's type as a string, such as `"A"` or `"CNAME"`.
    const NAME: &'static str;

    /// The number signifying that a record is of this type.
    /// See <https://www.iana.org/assignments/dns-parameters/dns-parameters.xhtml#dns-parameters-4>
    const RR_TYPE: u16;

    /// Read at most `len` bytes from the given `Cursor`. This cursor ranges
    /// over the complete message — by this point, we have read the entire
    /// response into a buffer — so that any names in the rdata can follow
    /// pointers anywhere in the message.
    fn read(len: u16, c: &mut Cursor<&[u8]>) -> Result<Self, WireError>;

    /// Write this record's rdata body into `bytes`, which is a scratch
    /// buffer whose first byte will end up at absolute offset `offset` once
    /// it's appended to the message; `dictionary` is shared with the rest of
    /// the message so that names here can both use and contribute to the
    /// message-wide compression table.
    fn write(&self, bytes: &mut Vec<u8>, offset: usize, dictionary: &mut CompressionMap) -> io::Result<()>;
}


/// Helper macro to get the qtype number of a record type at compile-time.
#[macro_export]
macro_rules! qtype {
    ($type:ty) => {
        <$type as $crate::Wire>::RR_TYPE
    }
}


/// Something that can go wrong deciphering a record.
#[derive(PartialEq, Debug)]
pub enum WireError {

    /// There was an IO error reading from the cursor.
    /// Almost all the time, this means that the buffer was too short.
    IO,
    // (io::Error is not PartialEq so we don't propagate it)

    /// When the DNS standard requires records of this type to have a certain
    /// fixed or minimum length, but the response specified a different one.
    WrongRecordLength {

        /// The length of the record's data, as specified in the packet.
        stated_length: u16,

        /// The length of the record that the DNS specification mandates.
        mandated_length: MandatedLength,
    },

    /// When a record's length doesn't exactly match a simple expected size
    /// (used by fixed-width records that don't bother with `MandatedLength`).
    WrongLength {

        /// The length the DNS specification mandates.
        expected: u16,

        /// The length actually found in the packet.
        got: u16,
    },

    /// When the length of this record as specified in the packet differs
    /// from the computed length, as determined by reading labels.
    WrongLabelLength {

        /// The length of the record's data, as specified in the packet.
        expected: u16,

        /// The computed length of the record's data, based on the number of
        /// bytes consumed by reading labels from the packet.
        got: u16,
    },

    /// A label length byte had its top two bits set to `01` or `10`, which
    /// RFC 1035 §4.1.4 reserves and never assigns a meaning to.
    InvalidLabelLength(u8),

    /// When the data contained a name with a cycle of compression pointers.
    /// Contains the vector of offsets that was being checked.
    TooMuchRecursion(Box<[u16]>),

    /// When the data contained a name with a pointer to an offset outside of
    /// the packet, or into the 12-byte header, where a name can never start.
    OutOfBounds(u16),
}

impl From<io::Error> for WireError {
    fn from(ioe: io::Error) -> Self {
        error!("IO error -> {:?}", ioe);
        Self::IO
    }
}


/// The length (or length class) that a fixed-format record type mandates.
#[derive(PartialEq, Debug, Copy, Clone)]
pub enum MandatedLength {

    /// The record must be exactly this many bytes long.
    Exactly(u16),

    /// The record must be at least this many bytes long.
    AtLeast(u16),
}


/// An error produced while decoding a `Message`, carrying the header if one
/// could be recovered before the failure occurred. A multiplexer matching
/// in-flight queries by transaction ID uses `header` to fail only the
/// offending query; when it's `None`, nothing in the packet can be trusted
/// enough to know which query (if any) this was meant to answer.
#[derive(PartialEq, Debug)]
pub struct MessageError {

    /// The header, if it was successfully parsed before the error occurred.
    pub header: Option<Header>,

    /// The underlying wire-format violation.
    pub inner: WireError,
}


#[cfg(test)]
mod test {
    use super::*;
    use crate::record::{Record, A};
    use crate::qtype;
    use pretty_assertions::assert_eq;
    use std::net::Ipv4Addr;

    #[test]
    fn a_record_round_trip() {
        let message = Message {
            header: Header {
                id: 0xABCD,
                flags: Flags::query(),
                qdcount: 1, ancount: 0, nscount: 0, arcount: 0,
            },
            questions: vec![
                Question {
                    qname: Labels::encode("www.example.com").unwrap(),
                    qclass: QClass::IN,
                    qtype: qtype!(A),
                },
            ],
            answers: Vec::new(),
            authorities: Vec::new(),
            additionals: Vec::new(),
        };

        let bytes = message.to_bytes().unwrap();

        assert_eq!(&bytes[.. 12], &[
            0xAB, 0xCD, 0x01, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
        ]);

        assert_eq!(&bytes[12 ..], &[
            0x03, 0x77, 0x77, 0x77, 0x07, 0x65, 0x78, 0x61, 0x6d, 0x70, 0x6c, 0x65,
            0x03, 0x63, 0x6f, 0x6d, 0x00, 0x00, 0x01, 0x00, 0x01,
        ]);
    }

    #[test]
    fn pointer_decode() {
        let buf: Vec<u8> = vec![
            0x00, 0x00,  // id
            0x81, 0x80,  // flags: standard response
            0x00, 0x00,  // qdcount
            0x00, 0x01,  // ancount
            0x00, 0x00,  // nscount
            0x00, 0x00,  // arcount
            // answer, starting at offset 12:
            0x03, b'f', b'o', b'o', 0x00,  // name "foo."
            0x00, 0x05,  // type CNAME
            0x00, 0x01,  // class IN
            0x00, 0x00, 0x00, 0x3c,  // ttl
            0x00, 0x02,  // rdlength
            0xc0, 0x0c,  // rdata: pointer back to offset 12 ("foo.")
        ];

        let message = Message::from_bytes(&buf).unwrap();
        match &message.answers[0].record {
            Record::CNAME(cname) => assert_eq!(cname.domain, Labels::encode("foo.").unwrap()),
            other => panic!("expected CNAME, got {:?}", other),
        }
    }

    #[test]
    fn pointer_cycle_is_rejected() {
        let buf: Vec<u8> = vec![
            0x00, 0x00,  // id
            0x81, 0x80,  // flags
            0x00, 0x00,  // qdcount
            0x00, 0x01,  // ancount
            0x00, 0x00,  // nscount
            0x00, 0x00,  // arcount
            0xc0, 0x0c,  // name: pointer to offset 12, i.e. itself
            0x00, 0x05,
            0x00, 0x01,
            0x00, 0x00, 0x00, 0x3c,
            0x00, 0x00,
        ];

        let err = Message::from_bytes(&buf).unwrap_err();
        assert_eq!(err.header.unwrap().ancount, 1);
        assert!(matches!(err.inner, WireError::TooMuchRecursion(_)));
    }

    #[test]
    fn counts_consistency() {
        let buf: Vec<u8> = vec![
            0x00, 0x00, 0x01, 0x00,
            0x00, 0x01, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
            0x03, b'f', b'o', b'o', 0x00,
            0x00, 0x01, 0x00, 0x01,
        ];

        let message = Message::from_bytes(&buf).unwrap();
        assert_eq!(message.questions.len(), usize::from(message.header.qdcount));
        assert_eq!(message.answers.len(), usize::from(message.header.ancount));
        assert_eq!(message.authorities.len(), usize::from(message.header.nscount));
        assert_eq!(message.additionals.len(), usize::from(message.header.arcount));
    }

    #[test]
    fn short_buffer_has_no_header() {
        let err = Message::from_bytes(&[0x00, 0x01]).unwrap_err();
        assert_eq!(err.header, None);
    }

    #[test]
    fn header_only_round_trips_through_udp_sized_buffer() {
        // Regression guard for invariant 1: a message built with every
        // supported record type decodes back to the same logical message.
        let message = Message {
            header: Header { id: 1, flags: Flags::query(), qdcount: 1, ancount: 0, nscount: 0, arcount: 0 },
            questions: vec![Question {
                qname: Labels::encode("a.b.c.").unwrap(),
                qclass: QClass::IN,
                qtype: qtype!(A),
            }],
            answers: vec![ResourceRecord {
                qname: Labels::encode("a.b.c.").unwrap(),
                qclass: QClass::IN,
                ttl: 60,
                record: Record::A(A { address: Ipv4Addr::new(1, 2, 3, 4) }),
            }],
            authorities: Vec::new(),
            additionals: Vec::new(),
        };

        let bytes = message.to_bytes().unwrap();
        let decoded = Message::from_bytes(&bytes).unwrap();
        assert_eq!(decoded, message);
    }
}
