//! The value types that make up a DNS packet.
//!
//! DNS queries and responses are the same shape on the wire — both are a
//! header followed by four record sections — so there is a single `Message`
//! type here rather than separate request/response types. A freshly-built
//! query just happens to have empty answer/authority/additional sections and
//! the `response` flag bit clear.

use crate::record::Record;
use crate::strings::Labels;


/// A complete DNS packet: the 12-byte header plus its four record sections.
#[derive(PartialEq, Debug, Clone)]
pub struct Message {

    /// The 12-byte header.
    pub header: Header,

    /// The questions section.
    pub questions: Vec<Question>,

    /// The answers section.
    pub answers: Vec<ResourceRecord>,

    /// The authoritative nameservers section.
    pub authorities: Vec<ResourceRecord>,

    /// The additional records section.
    pub additionals: Vec<ResourceRecord>,
}

impl Message {

    /// Builds a standard query message: one question, no answers, the given
    /// transaction ID, and `recursion_desired` set unless `flags` already
    /// says otherwise.
    pub fn query(transaction_id: u16, flags: Flags, question: Question) -> Self {
        Self {
            header: Header {
                id: transaction_id,
                flags,
                qdcount: 1,
                ancount: 0,
                nscount: 0,
                arcount: 0,
            },
            questions: vec![question],
            answers: Vec::new(),
            authorities: Vec::new(),
            additionals: Vec::new(),
        }
    }
}


/// The 12-byte header that begins every DNS packet.
#[derive(PartialEq, Debug, Copy, Clone)]
pub struct Header {

    /// The transaction ID of this packet. This is used to make sure
    /// different DNS packets don't answer each other's questions.
    pub id: u16,

    /// The flags that accompany every DNS packet.
    pub flags: Flags,

    /// The number of entries in the questions section.
    pub qdcount: u16,

    /// The number of entries in the answers section.
    pub ancount: u16,

    /// The number of entries in the authorities section.
    pub nscount: u16,

    /// The number of entries in the additionals section.
    pub arcount: u16,
}


/// A DNS question section entry.
#[derive(PartialEq, Debug, Clone)]
pub struct Question {

    /// The domain name being queried.
    pub qname: Labels,

    /// The class number.
    pub qclass: QClass,

    /// The type number.
    pub qtype: TypeInt,
}


/// A single entry in an answer, authority, or additional section: the common
/// envelope (name, class, TTL) plus the type-specific record body.
#[derive(PartialEq, Debug, Clone)]
pub struct ResourceRecord {

    /// The domain name this record answers for.
    pub qname: Labels,

    /// This record's class.
    pub qclass: QClass,

    /// The time-to-live duration, in seconds.
    pub ttl: u32,

    /// The record body contained in this entry.
    pub record: Record,
}


/// A DNS record class. Of these, the only one that's in regular use anymore
/// is the Internet class.
#[derive(PartialEq, Debug, Copy, Clone)]
pub enum QClass {

    /// The **Internet** class.
    IN,

    /// The **Chaosnet** class.
    CH,

    /// The **Hesiod** class.
    HS,

    /// A class number that does not map to any known class.
    Other(u16),
}


/// The number representing a record type, such as `1` for an **A** record, or
/// `15` for an **MX** record.
pub type TypeInt = u16;


/// The flags that accompany every DNS packet.
#[derive(PartialEq, Debug, Copy, Clone)]
pub struct Flags {

    /// Whether this packet is a response packet (the `QR` bit).
    pub response: bool,

    /// Number representing the operation being performed.
    pub opcode: Opcode,

    /// In a response, whether the server is providing authoritative DNS responses.
    pub authoritative: bool,

    /// In a response, whether this message has been truncated by the transport.
    pub truncated: bool,

    /// In a query, whether the server may query other nameservers recursively.
    /// It is up to the server whether it will actually do this.
    pub recursion_desired: bool,

    /// In a response, whether the server allows recursive query support.
    pub recursion_available: bool,

    /// In a response, whether the server is marking this data as authentic.
    pub authentic_data: bool,

    /// In a request, whether the server should disable its authenticity
    /// checking for the request's queries.
    pub checking_disabled: bool,

    /// In a response, a code indicating an error if one occurred.
    pub error_code: Option<ErrorCode>,
}


/// The four-bit `OPCODE` field of the header flags.
#[derive(PartialEq, Debug, Copy, Clone)]
pub enum Opcode {

    /// A standard query — the only kind the core ever sends.
    Query,

    /// Some other opcode, as seen on the wire (inverse query, status,
    /// notify, update, or an unassigned value), kept verbatim so that a
    /// decoded message can always be re-encoded byte-for-byte.
    Other(u8),
}


/// A code indicating an error.
#[derive(PartialEq, Debug, Copy, Clone)]
pub enum ErrorCode {

    /// The server was unable to interpret the query.
    FormatError,

    /// There was a problem with the server.
    ServerFailure,

    /// The domain name referenced in the query does not exist.
    NXDomain,

    /// The server does not support one of the requested features.
    NotImplemented,

    /// The server was able to interpret the query, but refused to fulfil it.
    QueryRefused,

    /// An error code we don't know the meaning of.
    Other(u16),
}
