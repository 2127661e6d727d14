//! Looking up services.

use super::addr::AddressResult;
use super::DnsResponse;
use crate::base::{Dname, RecordData};
use std::net::IpAddr;
use std::time::{Duration, Instant};

//------------ ServiceResult -------------------------------------------------

/// A single service instance found through an SRV lookup.
///
/// The `addresses` are whatever the server volunteered in the
/// additional section for the target host; an empty list means the
/// caller has to resolve the target itself. Results keep the order of
/// the SRV records in the answer; applying the RFC 2782 priority and
/// weight selection rules is left to the caller.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ServiceResult {
    /// When the underlying SRV record expires.
    pub expires_at: Instant,

    /// The priority of this instance. Lower is preferred.
    pub priority: u16,

    /// The relative weight among instances of equal priority.
    pub weight: u16,

    /// The port the service listens on.
    pub port: u16,

    /// The host providing the service.
    pub target: Dname,

    /// Addresses of the target from the additional section.
    pub addresses: Vec<AddressResult>,
}

//------------ Answer processing ---------------------------------------------

/// Extracts service instances from a response.
///
/// Every SRV answer becomes one result, stitched together with the A
/// and AAAA records of its target from the additional section.
pub(crate) fn process_answers(response: &DnsResponse) -> Vec<ServiceResult> {
    let mut results = Vec::new();
    for record in &response.answers {
        let srv = match record.data {
            RecordData::Srv(ref srv) => srv,
            _ => continue,
        };
        results.push(ServiceResult {
            expires_at: response.started_at
                + Duration::from_secs(record.ttl.into()),
            priority: srv.priority,
            weight: srv.weight,
            port: srv.port,
            target: srv.target.clone(),
            addresses: target_addresses(response, &srv.target),
        });
    }
    results
}

/// Collects the additional-section addresses for `target`.
fn target_addresses(
    response: &DnsResponse,
    target: &Dname,
) -> Vec<AddressResult> {
    response
        .additionals
        .iter()
        .filter(|record| record.name == *target)
        .filter_map(|record| {
            let address = match record.data {
                RecordData::A(address) => IpAddr::V4(address),
                RecordData::Aaaa(address) => IpAddr::V6(address),
                _ => return None,
            };
            Some(AddressResult {
                expires_at: response.started_at
                    + Duration::from_secs(record.ttl.into()),
                address,
            })
        })
        .collect()
}

//============ Testing =======================================================

#[cfg(test)]
mod test {
    use super::*;
    use crate::base::{Class, Header, Record, Rtype, SrvData};
    use core::str::FromStr;
    use std::net::Ipv4Addr;
    use std::time::Instant;

    fn name(s: &str) -> Dname {
        Dname::from_str(s).unwrap()
    }

    fn srv_record(
        owner: &str,
        priority: u16,
        weight: u16,
        port: u16,
        target: &str,
    ) -> Record {
        Record {
            name: name(owner),
            rtype: Rtype::Srv,
            class: Class::In,
            ttl: 3600,
            data: RecordData::Srv(SrvData {
                priority,
                weight,
                port,
                target: name(target),
            }),
        }
    }

    fn a_record(owner: &str, addr: [u8; 4]) -> Record {
        Record {
            name: name(owner),
            rtype: Rtype::A,
            class: Class::In,
            ttl: 3600,
            data: RecordData::A(Ipv4Addr::from(addr)),
        }
    }

    fn response(
        answers: Vec<Record>,
        additionals: Vec<Record>,
    ) -> DnsResponse {
        let started_at = Instant::now();
        DnsResponse {
            header: Header::new(),
            started_at,
            expires_at: started_at,
            answers,
            authorities: Vec::new(),
            additionals,
        }
    }

    #[test]
    fn stitches_additional_addresses() {
        let resp = response(
            vec![srv_record(
                "_s0._tcp.example.com",
                1,
                2,
                8080,
                "www.example.com",
            )],
            vec![a_record("www.example.com", [172, 213, 245, 111])],
        );
        let found = process_answers(&resp);
        assert_eq!(found.len(), 1);
        let service = &found[0];
        assert_eq!(service.priority, 1);
        assert_eq!(service.weight, 2);
        assert_eq!(service.port, 8080);
        assert_eq!(service.target, name("www.example.com"));
        assert_eq!(service.addresses.len(), 1);
        assert_eq!(
            service.addresses[0].address,
            IpAddr::V4(Ipv4Addr::new(172, 213, 245, 111))
        );
    }

    #[test]
    fn unrelated_additionals_are_ignored() {
        let resp = response(
            vec![srv_record(
                "_s0._tcp.example.com",
                0,
                0,
                443,
                "a.example.com",
            )],
            vec![
                a_record("b.example.com", [192, 0, 2, 1]),
                a_record("a.example.com", [192, 0, 2, 2]),
            ],
        );
        let found = process_answers(&resp);
        assert_eq!(found[0].addresses.len(), 1);
        assert_eq!(
            found[0].addresses[0].address,
            IpAddr::V4(Ipv4Addr::new(192, 0, 2, 2))
        );
    }

    #[test]
    fn keeps_answer_order() {
        let resp = response(
            vec![
                srv_record("_s._tcp.example.com", 5, 0, 1, "a.example.com"),
                srv_record("_s._tcp.example.com", 1, 0, 2, "b.example.com"),
            ],
            Vec::new(),
        );
        let found = process_answers(&resp);
        assert_eq!(found[0].port, 1);
        assert_eq!(found[1].port, 2);
        assert!(found[0].addresses.is_empty());
    }
}
