//! IANA definitions used by the resolver.
//!
//! Only the parameters the resolver actually touches are modelled here.
//! Record types other than the handful we decode are carried through as
//! their raw values.

use core::fmt;

//------------ Rtype ---------------------------------------------------------

/// A resource record type.
///
/// The variants cover the types the resolver decodes; everything else is
/// preserved under [`Rtype::Other`] and treated as opaque data.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Rtype {
    /// An IPv4 host address. [RFC 1035]
    A,

    /// An authoritative name server. [RFC 1035]
    Ns,

    /// The canonical name for an alias. [RFC 1035]
    Cname,

    /// The start of a zone of authority. [RFC 1035]
    Soa,

    /// Text strings. [RFC 1035]
    Txt,

    /// An IPv6 host address. [RFC 3596]
    Aaaa,

    /// The location of a service. [RFC 2782]
    Srv,

    /// Any other record type.
    Other(u16),
}

impl Rtype {
    /// Returns the type for the given raw integer value.
    pub fn from_int(value: u16) -> Self {
        match value {
            1 => Rtype::A,
            2 => Rtype::Ns,
            5 => Rtype::Cname,
            6 => Rtype::Soa,
            16 => Rtype::Txt,
            28 => Rtype::Aaaa,
            33 => Rtype::Srv,
            _ => Rtype::Other(value),
        }
    }

    /// Returns the raw integer value for this type.
    pub fn to_int(self) -> u16 {
        match self {
            Rtype::A => 1,
            Rtype::Ns => 2,
            Rtype::Cname => 5,
            Rtype::Soa => 6,
            Rtype::Txt => 16,
            Rtype::Aaaa => 28,
            Rtype::Srv => 33,
            Rtype::Other(value) => value,
        }
    }
}

impl From<u16> for Rtype {
    fn from(value: u16) -> Self {
        Rtype::from_int(value)
    }
}

impl fmt::Display for Rtype {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Rtype::A => f.write_str("A"),
            Rtype::Ns => f.write_str("NS"),
            Rtype::Cname => f.write_str("CNAME"),
            Rtype::Soa => f.write_str("SOA"),
            Rtype::Txt => f.write_str("TXT"),
            Rtype::Aaaa => f.write_str("AAAA"),
            Rtype::Srv => f.write_str("SRV"),
            Rtype::Other(value) => write!(f, "TYPE{}", value),
        }
    }
}

//------------ Class ---------------------------------------------------------

/// A resource record class.
///
/// The resolver only ever deals in the Internet class but keeps unknown
/// classes around so received records survive a round trip.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Class {
    /// The Internet class.
    In,

    /// Any other class.
    Other(u16),
}

impl Class {
    pub fn from_int(value: u16) -> Self {
        match value {
            1 => Class::In,
            _ => Class::Other(value),
        }
    }

    pub fn to_int(self) -> u16 {
        match self {
            Class::In => 1,
            Class::Other(value) => value,
        }
    }
}

impl From<u16> for Class {
    fn from(value: u16) -> Self {
        Class::from_int(value)
    }
}

impl fmt::Display for Class {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Class::In => f.write_str("IN"),
            Class::Other(value) => write!(f, "CLASS{}", value),
        }
    }
}

//------------ Opcode --------------------------------------------------------

/// The opcode of a DNS message.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Opcode {
    /// A standard query.
    Query,

    /// Any other operation.
    Other(u8),
}

impl Opcode {
    pub fn from_int(value: u8) -> Self {
        match value {
            0 => Opcode::Query,
            _ => Opcode::Other(value),
        }
    }

    pub fn to_int(self) -> u8 {
        match self {
            Opcode::Query => 0,
            Opcode::Other(value) => value,
        }
    }
}

//------------ Rcode ---------------------------------------------------------

/// The response code of a DNS message.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Rcode {
    /// No error condition. [RFC 1035]
    NoError,

    /// The server was unable to interpret the query. [RFC 1035]
    FormErr,

    /// The server failed to process the query. [RFC 1035]
    ServFail,

    /// The queried domain name does not exist. [RFC 1035]
    NXDomain,

    /// The server does not support the requested kind of query. [RFC 1035]
    NotImp,

    /// The server refused to process the query. [RFC 1035]
    Refused,

    /// Any other response code.
    Other(u8),
}

impl Rcode {
    pub fn from_int(value: u8) -> Self {
        match value {
            0 => Rcode::NoError,
            1 => Rcode::FormErr,
            2 => Rcode::ServFail,
            3 => Rcode::NXDomain,
            4 => Rcode::NotImp,
            5 => Rcode::Refused,
            _ => Rcode::Other(value),
        }
    }

    pub fn to_int(self) -> u8 {
        match self {
            Rcode::NoError => 0,
            Rcode::FormErr => 1,
            Rcode::ServFail => 2,
            Rcode::NXDomain => 3,
            Rcode::NotImp => 4,
            Rcode::Refused => 5,
            Rcode::Other(value) => value,
        }
    }
}

impl fmt::Display for Rcode {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Rcode::NoError => f.write_str("NOERROR"),
            Rcode::FormErr => f.write_str("FORMERR"),
            Rcode::ServFail => f.write_str("SERVFAIL"),
            Rcode::NXDomain => f.write_str("NXDOMAIN"),
            Rcode::NotImp => f.write_str("NOTIMP"),
            Rcode::Refused => f.write_str("REFUSED"),
            Rcode::Other(value) => write!(f, "RCODE{}", value),
        }
    }
}

//============ Testing =======================================================
