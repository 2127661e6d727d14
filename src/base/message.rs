//! Reading and writing DNS messages.
//!
//! [`MessageReader`] is a forward-only cursor over a received message
//! buffer. It hands out questions and resource records in wire order;
//! record data stays borrowed from the buffer until it is copied out
//! into an owned [`Record`] whose body is decoded into [`RecordData`].
//! [`MessageWriter`] is its counterpart for building query messages.

use super::header::{Header, HEADER_LEN};
use super::iana::{Class, Rtype};
use super::name::Dname;
use super::rdata::{SoaData, SrvData};
use super::{FormError, ParseError};
use bytes::Bytes;
use std::net::{Ipv4Addr, Ipv6Addr};

//------------ Question ------------------------------------------------------

/// A question of a DNS message.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Question {
    /// The name to ask about.
    pub qname: Dname,

    /// The record type to ask for.
    pub qtype: Rtype,

    /// The class to ask in.
    pub qclass: Class,
}

impl Question {
    /// Creates a new Internet-class question.
    pub fn new(qname: Dname, qtype: Rtype) -> Self {
        Question {
            qname,
            qtype,
            qclass: Class::In,
        }
    }
}

//------------ MessageWriter -------------------------------------------------

/// Writes a query message into a caller-provided buffer.
///
/// The write methods return `false` when the buffer is too small; the
/// caller is expected to retry with a larger buffer. A failed write
/// leaves the cursor untouched.
#[derive(Debug)]
pub struct MessageWriter<'a> {
    target: &'a mut [u8],
    pos: usize,
}

impl<'a> MessageWriter<'a> {
    /// Creates a writer filling `target` from the start.
    pub fn new(target: &'a mut [u8]) -> Self {
        MessageWriter { target, pos: 0 }
    }

    /// Returns the number of bytes written so far.
    pub fn pos(&self) -> usize {
        self.pos
    }

    /// Writes the message header.
    pub fn write_header(&mut self, header: Header) -> bool {
        if !header.compose(self.target, self.pos) {
            return false;
        }
        self.pos += HEADER_LEN;
        true
    }

    /// Writes a question.
    pub fn write_question(&mut self, question: &Question) -> bool {
        let name_len = match question.qname.compose(self.target, self.pos) {
            Some(len) => len,
            None => return false,
        };
        let end = self.pos + name_len + 4;
        if self.target.len() < end {
            return false;
        }
        let mut pos = self.pos + name_len;
        self.target[pos..pos + 2]
            .copy_from_slice(&question.qtype.to_int().to_be_bytes());
        pos += 2;
        self.target[pos..pos + 2]
            .copy_from_slice(&question.qclass.to_int().to_be_bytes());
        self.pos = end;
        true
    }
}

//------------ MessageReader -------------------------------------------------

/// A forward-only reader over a received DNS message.
///
/// The reader owns its buffer; the transport hands the pooled receive
/// buffer over wholesale. For TCP the message does not start at the
/// buffer's first byte, so the reader carries explicit message bounds.
/// Compression pointers are always resolved against the full message.
#[derive(Debug)]
pub struct MessageReader<B> {
    /// The buffer holding the message.
    buf: B,

    /// Offset of the first message byte in the buffer.
    start: usize,

    /// Length of the message.
    len: usize,

    /// The cursor, relative to `start`.
    pos: usize,
}

impl<B: AsRef<[u8]>> MessageReader<B> {
    /// Creates a reader over the whole of `buf`.
    pub fn new(buf: B) -> Self {
        let len = buf.as_ref().len();
        MessageReader {
            buf,
            start: 0,
            len,
            pos: 0,
        }
    }

    /// Creates a reader over `len` bytes of `buf` starting at `start`.
    ///
    /// # Panics
    ///
    /// Panics if the bounds lie outside the buffer.
    pub fn with_bounds(buf: B, start: usize, len: usize) -> Self {
        assert!(start + len <= buf.as_ref().len());
        MessageReader {
            buf,
            start,
            len,
            pos: 0,
        }
    }

    /// Returns the full message as a byte slice.
    pub fn message(&self) -> &[u8] {
        &self.buf.as_ref()[self.start..self.start + self.len]
    }

    /// Reads the message header, advancing the cursor past it.
    pub fn read_header(&mut self) -> Result<Header, ParseError> {
        let header = Header::parse(self.message())?;
        self.pos = HEADER_LEN;
        Ok(header)
    }

    /// Reads the next question.
    pub fn read_question(&mut self) -> Result<Question, ParseError> {
        let (qname, consumed) = Dname::parse(self.message(), self.pos)?;
        let pos = self.pos + consumed;
        let fields = self
            .message()
            .get(pos..pos + 4)
            .ok_or(ParseError::ShortInput)?;
        let qtype = Rtype::from_int(u16::from_be_bytes([fields[0], fields[1]]));
        let qclass =
            Class::from_int(u16::from_be_bytes([fields[2], fields[3]]));
        self.pos = pos + 4;
        Ok(Question {
            qname,
            qtype,
            qclass,
        })
    }

    /// Reads the next resource record.
    ///
    /// The returned record borrows its data from the reader's buffer;
    /// use [`ParsedRecord::to_owned`] to copy it out before reading on.
    pub fn read_record(&mut self) -> Result<ParsedRecord<'_>, ParseError> {
        let (name, consumed) = Dname::parse(self.message(), self.pos)?;
        let mut pos = self.pos + consumed;
        let fields = self
            .message()
            .get(pos..pos + 10)
            .ok_or(ParseError::ShortInput)?;
        let rtype = Rtype::from_int(u16::from_be_bytes([fields[0], fields[1]]));
        let class =
            Class::from_int(u16::from_be_bytes([fields[2], fields[3]]));
        let ttl = u32::from_be_bytes([
            fields[4], fields[5], fields[6], fields[7],
        ]);
        let rdlen = usize::from(u16::from_be_bytes([fields[8], fields[9]]));
        pos += 10;
        self.message()
            .get(pos..pos + rdlen)
            .ok_or(ParseError::ShortInput)?;
        self.pos = pos + rdlen;
        Ok(ParsedRecord {
            msg: self.message(),
            name,
            rtype,
            class,
            ttl,
            data_start: pos,
            data_len: rdlen,
        })
    }
}

//------------ ParsedRecord --------------------------------------------------

/// A resource record whose data still lives in the message buffer.
#[derive(Clone, Debug)]
pub struct ParsedRecord<'a> {
    /// The full message, needed to expand compressed names in the data.
    msg: &'a [u8],

    /// The owner name of the record.
    pub name: Dname,

    /// The record type.
    pub rtype: Rtype,

    /// The record class.
    pub class: Class,

    /// The time-to-live in seconds.
    pub ttl: u32,

    /// Offset of the record data in the message.
    data_start: usize,

    /// Length of the record data.
    data_len: usize,
}

impl<'a> ParsedRecord<'a> {
    /// Returns the raw record data.
    pub fn data(&self) -> &'a [u8] {
        &self.msg[self.data_start..self.data_start + self.data_len]
    }

    /// Copies the record out of the message buffer.
    ///
    /// Record bodies the resolver understands are decoded here, while
    /// the message with its compression context is still at hand;
    /// everything else is copied as an opaque blob.
    pub fn to_owned(&self) -> Result<Record, ParseError> {
        let data = match self.rtype {
            Rtype::A => {
                let data: [u8; 4] = self
                    .data()
                    .try_into()
                    .map_err(|_| FormError::new("invalid A record data"))?;
                RecordData::A(Ipv4Addr::from(data))
            }
            Rtype::Aaaa => {
                let data: [u8; 16] = self
                    .data()
                    .try_into()
                    .map_err(|_| FormError::new("invalid AAAA record data"))?;
                RecordData::Aaaa(Ipv6Addr::from(data))
            }
            Rtype::Cname => {
                let (target, _) = Dname::parse(self.msg, self.data_start)?;
                RecordData::Cname(target)
            }
            Rtype::Srv => {
                RecordData::Srv(SrvData::parse(self.msg, self.data_start)?)
            }
            Rtype::Soa => {
                RecordData::Soa(SoaData::parse(self.msg, self.data_start)?)
            }
            Rtype::Txt => RecordData::Txt(Bytes::copy_from_slice(self.data())),
            _ => RecordData::Other(Bytes::copy_from_slice(self.data())),
        };
        Ok(Record {
            name: self.name.clone(),
            rtype: self.rtype,
            class: self.class,
            ttl: self.ttl,
            data,
        })
    }
}

//------------ Record --------------------------------------------------------

/// An owned resource record, detached from its message buffer.
#[derive(Clone, Debug)]
pub struct Record {
    /// The owner name of the record.
    pub name: Dname,

    /// The record type.
    pub rtype: Rtype,

    /// The record class.
    pub class: Class,

    /// The time-to-live in seconds.
    pub ttl: u32,

    /// The decoded record data.
    pub data: RecordData,
}

//------------ RecordData ----------------------------------------------------

/// The decoded data of an owned record.
///
/// Types outside the resolver's vocabulary are preserved as opaque
/// bytes. Names inside decoded bodies are fully expanded, so owned
/// records never depend on the message they came from.
#[derive(Clone, Debug)]
pub enum RecordData {
    /// An IPv4 address.
    A(Ipv4Addr),

    /// An IPv6 address.
    Aaaa(Ipv6Addr),

    /// The target of an alias.
    Cname(Dname),

    /// An SRV record body.
    Srv(SrvData),

    /// A SOA record body.
    Soa(SoaData),

    /// TXT record data, still in character-string encoding.
    Txt(Bytes),

    /// The data of any other record type.
    Other(Bytes),
}

//============ Testing =======================================================
