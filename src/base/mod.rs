//! The DNS wire format.
//!
//! This module contains everything needed to compose query messages and
//! pick apart response messages: domain names with compression support,
//! the fixed message header, a forward-only message reader and the query
//! writer, and decoders for the record bodies the resolver understands.

pub use self::header::Header;
pub use self::iana::{Class, Opcode, Rcode, Rtype};
pub use self::message::{
    MessageReader, MessageWriter, ParsedRecord, Question, Record, RecordData,
};
pub use self::name::Dname;
pub use self::rdata::{SoaData, SrvData};

pub mod header;
pub mod iana;
pub mod message;
pub mod name;
pub mod rdata;

use core::fmt;

//------------ FormError -----------------------------------------------------

/// A message violated the wire format.
///
/// Carries a static description of what exactly was wrong.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct FormError(&'static str);

impl FormError {
    /// Creates a new form error with the given description.
    pub(crate) const fn new(msg: &'static str) -> Self {
        FormError(msg)
    }
}

impl fmt::Display for FormError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.0)
    }
}

//------------ ParseError ----------------------------------------------------

/// An error happened while parsing message data.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ParseError {
    /// The message ended before the data was complete.
    ShortInput,

    /// The data violated the wire format.
    Form(FormError),
}

impl From<FormError> for ParseError {
    fn from(err: FormError) -> Self {
        ParseError::Form(err)
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            ParseError::ShortInput => f.write_str("unexpected end of input"),
            ParseError::Form(err) => err.fmt(f),
        }
    }
}

impl std::error::Error for ParseError {}
