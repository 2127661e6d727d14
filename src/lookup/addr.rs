//! Looking up host addresses.

use super::DnsResponse;
use crate::base::{Dname, RecordData, Rtype};
use std::net::IpAddr;
use std::time::{Duration, Instant};

//------------ AddressResult -------------------------------------------------

/// A single address found for a host name.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct AddressResult {
    /// When the underlying record expires.
    pub expires_at: Instant,

    /// The address.
    pub address: IpAddr,
}

//------------ Answer processing ---------------------------------------------

/// Extracts the addresses answering `qname` from a response.
///
/// Servers return the CNAME chain and the terminal address records in
/// the same answer section, in chain order. A single pass tracks the
/// current alias: CNAME records for it redirect the chain, records of
/// the queried type for it are results, everything else is ignored. If
/// the chain does not reach any address record the result is empty.
pub(crate) fn process_answers(
    response: &DnsResponse,
    qname: &Dname,
    qtype: Rtype,
) -> Vec<AddressResult> {
    let mut alias = qname.clone();
    let mut results = Vec::new();
    for record in &response.answers {
        if record.name != alias {
            continue;
        }
        match record.data {
            RecordData::Cname(ref target) => {
                alias = target.clone();
            }
            RecordData::A(address) if qtype == Rtype::A => {
                results.push(AddressResult {
                    expires_at: expires(response.started_at, record.ttl),
                    address: IpAddr::V4(address),
                });
            }
            RecordData::Aaaa(address) if qtype == Rtype::Aaaa => {
                results.push(AddressResult {
                    expires_at: expires(response.started_at, record.ttl),
                    address: IpAddr::V6(address),
                });
            }
            _ => {}
        }
    }
    results
}

fn expires(started_at: Instant, ttl: u32) -> Instant {
    started_at + Duration::from_secs(ttl.into())
}

//============ Testing =======================================================

#[cfg(test)]
mod test {
    use super::*;
    use crate::base::{Class, Header, Record};
    use core::str::FromStr;
    use std::net::Ipv4Addr;

    fn name(s: &str) -> Dname {
        Dname::from_str(s).unwrap()
    }

    fn a_record(owner: &str, ttl: u32, addr: [u8; 4]) -> Record {
        Record {
            name: name(owner),
            rtype: Rtype::A,
            class: Class::In,
            ttl,
            data: RecordData::A(Ipv4Addr::from(addr)),
        }
    }

    fn cname_record(owner: &str, target: &str) -> Record {
        Record {
            name: name(owner),
            rtype: Rtype::Cname,
            class: Class::In,
            ttl: 3600,
            data: RecordData::Cname(name(target)),
        }
    }

    fn response(answers: Vec<Record>) -> DnsResponse {
        let started_at = Instant::now();
        DnsResponse {
            header: Header::new(),
            started_at,
            expires_at: started_at,
            answers,
            authorities: Vec::new(),
            additionals: Vec::new(),
        }
    }

    #[test]
    fn direct_answer() {
        let resp = response(vec![a_record(
            "www.example.com",
            3600,
            [172, 213, 245, 111],
        )]);
        let found =
            process_answers(&resp, &name("www.example.com"), Rtype::A);
        assert_eq!(found.len(), 1);
        assert_eq!(
            found[0].address,
            IpAddr::V4(Ipv4Addr::new(172, 213, 245, 111))
        );
        assert_eq!(
            found[0].expires_at,
            resp.started_at + Duration::from_secs(3600)
        );
    }

    #[test]
    fn follows_cname_chain() {
        let resp = response(vec![
            cname_record("www.example.com", "www.example2.com"),
            cname_record("www.example2.com", "www.example3.com"),
            a_record("www.example3.com", 3600, [172, 213, 245, 111]),
        ]);
        let found =
            process_answers(&resp, &name("www.example.com"), Rtype::A);
        assert_eq!(found.len(), 1);
        assert_eq!(
            found[0].address,
            IpAddr::V4(Ipv4Addr::new(172, 213, 245, 111))
        );
    }

    #[test]
    fn broken_chain_finds_nothing() {
        let resp = response(vec![
            cname_record("www.example.com", "www.example2.com"),
            cname_record("www.example2.com", "www.example3.com"),
            a_record("www.example4.com", 3600, [172, 213, 245, 111]),
        ]);
        assert!(process_answers(&resp, &name("www.example.com"), Rtype::A)
            .is_empty());
    }

    #[test]
    fn unrelated_owners_are_skipped() {
        let resp = response(vec![
            a_record("other.example.com", 3600, [192, 0, 2, 1]),
            a_record("www.example.com", 3600, [192, 0, 2, 2]),
        ]);
        let found =
            process_answers(&resp, &name("www.example.com"), Rtype::A);
        assert_eq!(found.len(), 1);
        assert_eq!(
            found[0].address,
            IpAddr::V4(Ipv4Addr::new(192, 0, 2, 2))
        );
    }

    #[test]
    fn family_filter() {
        let resp = response(vec![a_record(
            "www.example.com",
            3600,
            [192, 0, 2, 1],
        )]);
        assert!(process_answers(
            &resp,
            &name("www.example.com"),
            Rtype::Aaaa
        )
        .is_empty());
    }
}
