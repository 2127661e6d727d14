//! Processing answers.
//!
//! The query engine turns a raw response into a [`DnsResponse`] with
//! owned record sections; the submodules then extract the typed results
//! the public API returns. This module also interprets empty answers
//! per RFC 2308: a NODATA response is recognized by a SOA and no NS in
//! the authority section, NXDOMAIN by its response code, and both yield
//! a negative caching time of the minimum of the SOA's TTL and its
//! MINIMUM field.

pub mod addr;
pub mod srv;
pub mod txt;

pub use self::addr::AddressResult;
pub use self::srv::ServiceResult;
pub use self::txt::TxtResult;

use crate::base::{
    Header, MessageReader, ParseError, Record, RecordData, Rtype,
};
use std::time::{Duration, Instant};

//------------ DnsResponse ---------------------------------------------------

/// A fully read response message.
///
/// All records are owned copies; the pooled receive buffer is gone by
/// the time a value of this type exists. The message-wide expiry is the
/// moment the shortest-lived record of the message dies. A response
/// without any records has no meaningful expiry and must never be
/// cached; its `expires_at` equals `started_at`.
#[derive(Clone, Debug)]
pub struct DnsResponse {
    /// The header of the response.
    pub header: Header,

    /// When the query producing this response was started.
    pub started_at: Instant,

    /// When the response as a whole expires.
    pub expires_at: Instant,

    /// The answer section.
    pub answers: Vec<Record>,

    /// The authority section.
    pub authorities: Vec<Record>,

    /// The additional section.
    pub additionals: Vec<Record>,
}

impl DnsResponse {
    /// Reads the three record sections off `reader`.
    ///
    /// The reader must be positioned after the question section. The
    /// header's counts are trusted to a point: running out of message
    /// early is a parse error rather than a silently shorter response.
    pub fn read<B: AsRef<[u8]>>(
        reader: &mut MessageReader<B>,
        header: Header,
        started_at: Instant,
    ) -> Result<Self, ParseError> {
        let answers = Self::read_section(reader, header.ancount())?;
        let authorities = Self::read_section(reader, header.nscount())?;
        let additionals = Self::read_section(reader, header.arcount())?;

        let min_ttl = answers
            .iter()
            .chain(&authorities)
            .chain(&additionals)
            .map(|record| record.ttl)
            .min();
        let expires_at = match min_ttl {
            Some(ttl) => started_at + Duration::from_secs(ttl.into()),
            None => started_at,
        };

        Ok(DnsResponse {
            header,
            started_at,
            expires_at,
            answers,
            authorities,
            additionals,
        })
    }

    fn read_section<B: AsRef<[u8]>>(
        reader: &mut MessageReader<B>,
        count: u16,
    ) -> Result<Vec<Record>, ParseError> {
        let mut records = Vec::with_capacity(count.into());
        for _ in 0..count {
            records.push(reader.read_record()?.to_owned()?);
        }
        Ok(records)
    }

    /// Returns whether the response contains any records at all.
    pub fn has_records(&self) -> bool {
        !self.answers.is_empty()
            || !self.authorities.is_empty()
            || !self.additionals.is_empty()
    }
}

//------------ NegativeAnswer ------------------------------------------------

/// What an answerless response means for caching.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum NegativeAnswer {
    /// The name exists but has no records of the queried type.
    ///
    /// Cache an empty result for the (name, type) pair until the given
    /// time.
    NoData(Instant),

    /// The name does not exist at all.
    ///
    /// Cache the nonexistence of the name itself until the given time,
    /// refuting queries of every type.
    NameError(Instant),

    /// Nothing may be cached from this response.
    Uncacheable,
}

/// Interprets a response without usable answers per RFC 2308.
pub fn classify_negative(response: &DnsResponse) -> NegativeAnswer {
    use crate::base::Rcode;

    match response.header.rcode() {
        Rcode::NoError => {
            // A delegation also has an empty answer section but carries
            // NS records; only a SOA without NS marks true NODATA.
            if response
                .authorities
                .iter()
                .any(|record| record.rtype == Rtype::Ns)
            {
                return NegativeAnswer::Uncacheable;
            }
            match negative_expiry(response) {
                Some(expires_at) => NegativeAnswer::NoData(expires_at),
                None => NegativeAnswer::Uncacheable,
            }
        }
        Rcode::NXDomain => match negative_expiry(response) {
            Some(expires_at) => NegativeAnswer::NameError(expires_at),
            None => NegativeAnswer::Uncacheable,
        },
        _ => NegativeAnswer::Uncacheable,
    }
}

/// Computes the negative caching time from the authority SOA, if any.
fn negative_expiry(response: &DnsResponse) -> Option<Instant> {
    response.authorities.iter().find_map(|record| {
        match record.data {
            RecordData::Soa(ref soa) => {
                let ttl = record.ttl.min(soa.minimum);
                Some(
                    response.started_at + Duration::from_secs(ttl.into()),
                )
            }
            _ => None,
        }
    })
}

//============ Testing =======================================================

#[cfg(test)]
mod test {
    use super::*;
    use crate::base::{Class, Dname, Rcode, SoaData};
    use core::str::FromStr;

    fn soa_record(name: &str, ttl: u32, minimum: u32) -> Record {
        Record {
            name: Dname::from_str(name).unwrap(),
            rtype: Rtype::Soa,
            class: Class::In,
            ttl,
            data: RecordData::Soa(SoaData {
                mname: Dname::from_str("ns.example.com").unwrap(),
                rname: Dname::from_str("admin.example.com").unwrap(),
                serial: 1,
                refresh: 3600,
                retry: 600,
                expire: 86400,
                minimum,
            }),
        }
    }

    fn ns_record(name: &str) -> Record {
        Record {
            name: Dname::from_str(name).unwrap(),
            rtype: Rtype::Ns,
            class: Class::In,
            ttl: 3600,
            data: RecordData::Other(bytes::Bytes::new()),
        }
    }

    fn response(rcode: Rcode, authorities: Vec<Record>) -> DnsResponse {
        let mut header = Header::new();
        header.set_qr(true);
        header.set_rcode(rcode);
        let started_at = Instant::now();
        DnsResponse {
            header,
            started_at,
            expires_at: started_at,
            answers: Vec::new(),
            authorities,
            additionals: Vec::new(),
        }
    }

    #[test]
    fn nodata_uses_min_of_soa_ttl_and_minimum() {
        let resp = response(
            Rcode::NoError,
            vec![soa_record("example.com", 60, 300)],
        );
        assert_eq!(
            classify_negative(&resp),
            NegativeAnswer::NoData(
                resp.started_at + Duration::from_secs(60)
            )
        );

        let resp = response(
            Rcode::NoError,
            vec![soa_record("example.com", 300, 60)],
        );
        assert_eq!(
            classify_negative(&resp),
            NegativeAnswer::NoData(
                resp.started_at + Duration::from_secs(60)
            )
        );
    }

    #[test]
    fn delegation_is_not_nodata() {
        let resp = response(
            Rcode::NoError,
            vec![
                soa_record("example.com", 60, 300),
                ns_record("example.com"),
            ],
        );
        assert_eq!(classify_negative(&resp), NegativeAnswer::Uncacheable);
    }

    #[test]
    fn nxdomain_needs_a_soa() {
        let resp = response(
            Rcode::NXDomain,
            vec![soa_record("example.com", 120, 300)],
        );
        assert_eq!(
            classify_negative(&resp),
            NegativeAnswer::NameError(
                resp.started_at + Duration::from_secs(120)
            )
        );

        let resp = response(Rcode::NXDomain, Vec::new());
        assert_eq!(classify_negative(&resp), NegativeAnswer::Uncacheable);
    }

    #[test]
    fn other_rcodes_are_uncacheable() {
        let resp = response(
            Rcode::ServFail,
            vec![soa_record("example.com", 60, 300)],
        );
        assert_eq!(classify_negative(&resp), NegativeAnswer::Uncacheable);
    }
}
