//! Reading and writing domain names in the DNS wire protocol.

use std::cmp::Ordering;
use std::convert::TryFrom;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::io::{self, Write};

use byteorder::WriteBytesExt;
use log::*;

use crate::wire::*;


/// Domain names in the DNS protocol are encoded as **Labels**, which are
/// segments of ASCII characters prefixed by their length. When written out,
/// each segment is followed by a dot.
///
/// The maximum length of a segment is 63 bytes (so its length byte's top two
/// bits are always clear), and a name is at most 255 bytes once fully
/// materialised.
///
/// Two `Labels` are equal, and compare equal for ordering purposes, when
/// their segments match case-insensitively — this is how DNS names are
/// matched on the wire — but the original case of each segment is always
/// kept around for display and for re-emission.
#[derive(Debug, Clone)]
pub struct Labels {
    segments: Vec<(u8, String)>,
}

#[cfg(feature = "with_idna")]
fn label_to_ascii(label: &str) -> Result<String, unic_idna::Errors> {
    let flags = unic_idna::Flags { use_std3_ascii_rules: false, transitional_processing: false, verify_dns_length: true };
    unic_idna::to_ascii(label, flags)
}

#[cfg(not(feature = "with_idna"))]
fn label_to_ascii(label: &str) -> Result<String, ()> {
    Ok(label.to_owned())
}

impl Labels {

    /// Creates a new empty set of labels, which represent the root of the DNS
    /// as a domain with no name.
    pub fn root() -> Self {
        Self { segments: Vec::new() }
    }

    /// Encodes the given input string as labels. If any segment is too long,
    /// returns that segment as an error.
    pub fn encode(input: &str) -> Result<Self, &str> {
        let mut segments = Vec::new();

        for label in input.split('.') {
            if label.is_empty() {
                continue;
            }

            let label_idn = label_to_ascii(label)
                    .map_err(|e| {
                        warn!("Could not encode label {:?}: {:?}", label, e);
                        label
                    })?;

            match u8::try_from(label_idn.len()) {
                Ok(length) if length <= 63 => {
                    segments.push((length, label_idn));
                }
                _ => {
                    warn!("Could not encode label {:?}: too long", label);
                    return Err(label);
                }
            }
        }

        Ok(Self { segments })
    }

    /// Returns the number of segments.
    pub fn len(&self) -> usize {
        self.segments.len()
    }

    /// Whether this is the root name (no segments).
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Returns the wire length of this name once emitted uncompressed,
    /// including the terminating zero byte.
    pub fn wire_len(&self) -> usize {
        self.segments.iter().map(|(len, _)| usize::from(*len) + 1).sum::<usize>() + 1
    }

    /// Returns a new set of labels concatenating two names.
    pub fn extend(&self, other: &Self) -> Self {
        let mut segments = self.segments.clone();
        segments.extend_from_slice(&other.segments);
        Self { segments }
    }

    /// Iterates over the suffixes of this name, starting at the full name
    /// and ending at the root, pairing each with the index of its first
    /// segment. Used by the encoder's compression pass.
    pub(crate) fn suffixes(&self) -> impl Iterator<Item = (usize, Labels)> + '_ {
        (0 .. self.segments.len()).map(move |start| {
            (start, Labels { segments: self.segments[start ..].to_vec() })
        })
    }

    /// A lowercased, length-prefixed byte string uniquely identifying this
    /// name for case-insensitive comparison and for use as a compression
    /// dictionary key.
    fn normalized_key(&self) -> Vec<u8> {
        let mut key = Vec::new();
        for (len, seg) in &self.segments {
            key.push(*len);
            key.extend(seg.to_ascii_lowercase().into_bytes());
        }
        key
    }
}

impl PartialEq for Labels {
    fn eq(&self, other: &Self) -> bool {
        self.normalized_key() == other.normalized_key()
    }
}

impl Eq for Labels {}

impl PartialOrd for Labels {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Labels {
    fn cmp(&self, other: &Self) -> Ordering {
        self.normalized_key().cmp(&other.normalized_key())
    }
}

impl Hash for Labels {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.normalized_key().hash(state);
    }
}

impl fmt::Display for Labels {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (_, segment) in &self.segments {
            write!(f, "{}.", segment)?;
        }

        Ok(())
    }
}


/// An extension for `Cursor` that enables reading compressed domain names
/// from DNS packets. The cursor must range over the *entire* message, not
/// just the current record's rdata, because pointers are offsets into the
/// whole buffer.
pub(crate) trait ReadLabels {

    /// Read and expand a compressed domain name.
    fn read_labels(&mut self) -> Result<Labels, WireError>;
}

impl ReadLabels for Cursor<&[u8]> {
    fn read_labels(&mut self) -> Result<Labels, WireError> {
        let mut labels = Labels { segments: Vec::new() };
        read_string_recursive(&mut labels, self, &mut Vec::new())?;
        Ok(labels)
    }
}


/// An extension for `Write` that enables writing domain names, with RFC 1035
/// name compression: a name whose suffix has already been emitted earlier in
/// the message is replaced by a two-byte back-pointer to that offset.
pub(crate) trait WriteLabels {

    /// Write a domain name at the given absolute offset within the overall
    /// message, updating the compression dictionary with any new suffixes
    /// that were emitted (and are still within the 14-bit pointer range).
    fn write_labels(&mut self, input: &Labels, offset: usize, dictionary: &mut CompressionMap) -> io::Result<()>;
}

/// The maximum offset nameable by a 14-bit compression pointer.
const MAX_POINTER_OFFSET: usize = 0x3FFF;

/// Maps normalized name suffixes to the byte offset, within the message
/// being built, at which that suffix was first written. Local to a single
/// `encode` call; discarded afterward.
#[derive(Default)]
pub struct CompressionMap {
    offsets: std::collections::HashMap<Vec<u8>, usize>,
}

impl CompressionMap {
    /// Creates a fresh, empty compression dictionary.
    pub fn new() -> Self {
        Self::default()
    }
}

impl<W: Write> WriteLabels for W {
    fn write_labels(&mut self, input: &Labels, offset: usize, dictionary: &mut CompressionMap) -> io::Result<()> {
        let mut pos = offset;

        for (start, suffix) in input.suffixes() {
            if suffix.is_empty() {
                break;
            }

            if let Some(&pointer_offset) = dictionary.offsets.get(&suffix.normalized_key()) {
                let pointer = 0xC000_u16 | u16::try_from(pointer_offset).unwrap();
                self.write_u16::<BigEndian>(pointer)?;
                return Ok(());
            }

            if pos <= MAX_POINTER_OFFSET {
                dictionary.offsets.insert(suffix.normalized_key(), pos);
            }

            let (length, label) = &input.segments[start];
            self.write_u8(*length)?;
            self.write_all(label.as_bytes())?;
            pos += 1 + usize::from(*length);
        }

        self.write_u8(0)?;  // terminate the name
        Ok(())
    }
}


const RECURSION_LIMIT: usize = 8;

/// Reads bytes from the given cursor into the given buffer, using the list of
/// recursions to track backtracking positions.
fn read_string_recursive(labels: &mut Labels, c: &mut Cursor<&[u8]>, recursions: &mut Vec<u16>) -> Result<(), WireError> {
    let mut materialized_bytes = 0_usize;

    loop {
        let byte = c.read_u8()?;

        if byte == 0 {
            break;
        }

        else if byte >= 0b_1100_0000 {
            let name_one = byte - 0b1100_0000;
            let name_two = c.read_u8()?;
            let offset = u16::from_be_bytes([name_one, name_two]);

            if offset < 12 {
                warn!("Pointer ({}) into header area decoding string", offset);
                return Err(WireError::OutOfBounds(offset));
            }

            if recursions.contains(&offset) {
                warn!("Hit previous offset ({}) decoding string", offset);
                return Err(WireError::TooMuchRecursion(recursions.clone().into_boxed_slice()));
            }

            recursions.push(offset);

            if recursions.len() >= RECURSION_LIMIT {
                warn!("Hit recursion limit ({}) decoding string", RECURSION_LIMIT);
                return Err(WireError::TooMuchRecursion(recursions.clone().into_boxed_slice()));
            }

            trace!("Backtracking to offset {}", offset);
            let new_pos = c.position();
            c.set_position(u64::from(offset));

            read_string_recursive(labels, c, recursions)?;

            c.set_position(new_pos);
            break;
        }

        else if byte >= 0b_0100_0000 {
            // top bits `01` or `10` are reserved by RFC 1035 §4.1.4
            return Err(WireError::InvalidLabelLength(byte));
        }

        // Otherwise, treat the byte as the length of a label, and read that
        // many characters.
        else {
            materialized_bytes += usize::from(byte) + 1;
            if materialized_bytes > 255 {
                warn!("Name exceeded 255 bytes while decoding");
                return Err(WireError::TooMuchRecursion(recursions.clone().into_boxed_slice()));
            }

            let mut name_buf = Vec::new();

            for _ in 0 .. byte {
                name_buf.push(c.read_u8()?);
            }

            let string = String::from_utf8_lossy(&name_buf).to_string();
            labels.segments.push((byte, string));
        }
    }

    Ok(())
}


#[cfg(test)]
mod test {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn nothing() {
        let buf: &[u8] = &[
            0x00,  // end reading
        ];

        assert_eq!(Cursor::new(buf).read_labels(), Ok(Labels::root()));
    }

    #[test]
    fn one_label() {
        let buf: &[u8] = &[
            0x03,  // label of length 3
            b'o', b'n', b'e',  // label
            0x00,  // end reading
        ];

        assert_eq!(Cursor::new(buf).read_labels(), Ok(Labels::encode("one.").unwrap()));
    }

    #[test]
    fn two_labels() {
        let buf: &[u8] = &[
            0x03,  // label of length 3
            b'o', b'n', b'e',  // label
            0x03,  // label of length 3
            b't', b'w', b'o',  // label
            0x00,  // end reading
        ];

        assert_eq!(Cursor::new(buf).read_labels(), Ok(Labels::encode("one.two.").unwrap()));
    }

    #[test]
    fn extremely_long_label() {
        let mut buf: Vec<u8> = vec![
            0x3f,  // label of length 63 (the maximum)
        ];

        buf.extend(vec![0x65; 63]);
        buf.push(0x00);

        assert!(Cursor::new(&*buf).read_labels().is_ok());
    }

    #[test]
    fn case_insensitive_equality() {
        assert_eq!(Labels::encode("Example.COM").unwrap(), Labels::encode("example.com").unwrap());
    }

    #[test]
    fn reserved_label_length_bits() {
        let buf: &[u8] = &[0b_0100_0000];
        assert_eq!(Cursor::new(buf).read_labels(), Err(WireError::InvalidLabelLength(0b_0100_0000)));
    }

    #[test]
    fn immediate_recursion_within_header() {
        // Offset 0 is inside the 12-byte header, which is never a valid
        // pointer target.
        let buf: &[u8] = &[0xc0, 0x00];
        assert_eq!(Cursor::new(buf).read_labels(), Err(WireError::OutOfBounds(0)));
    }
}
