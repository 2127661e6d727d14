//! Looking up text records.

use super::DnsResponse;
use crate::base::rdata::CharStrIter;
use crate::base::RecordData;
use bytes::Bytes;

//------------ TxtResult -----------------------------------------------------

/// The data of a single TXT record.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct TxtResult {
    /// The time-to-live of the record in seconds.
    pub ttl: u32,

    /// The raw record data, still in character-string encoding.
    pub data: Bytes,
}

impl TxtResult {
    /// Returns an iterator over the character strings of the record.
    pub fn strings(&self) -> CharStrIter<'_> {
        CharStrIter::new(&self.data)
    }
}

//------------ Answer processing ---------------------------------------------

/// Extracts the TXT records from a response.
pub(crate) fn process_answers(response: &DnsResponse) -> Vec<TxtResult> {
    response
        .answers
        .iter()
        .filter_map(|record| match record.data {
            RecordData::Txt(ref data) => Some(TxtResult {
                ttl: record.ttl,
                data: data.clone(),
            }),
            _ => None,
        })
        .collect()
}

//============ Testing =======================================================

#[cfg(test)]
mod test {
    use super::*;
    use crate::base::{Class, Dname, Header, Record, Rtype};
    use core::str::FromStr;
    use std::time::Instant;

    #[test]
    fn collects_txt_answers() {
        let started_at = Instant::now();
        let resp = DnsResponse {
            header: Header::new(),
            started_at,
            expires_at: started_at,
            answers: vec![
                Record {
                    name: Dname::from_str("example.com").unwrap(),
                    rtype: Rtype::Txt,
                    class: Class::In,
                    ttl: 120,
                    data: RecordData::Txt(Bytes::from_static(
                        b"\x05hello\x05world",
                    )),
                },
                Record {
                    name: Dname::from_str("example.com").unwrap(),
                    rtype: Rtype::A,
                    class: Class::In,
                    ttl: 120,
                    data: RecordData::A([192, 0, 2, 1].into()),
                },
            ],
            authorities: Vec::new(),
            additionals: Vec::new(),
        };
        let found = process_answers(&resp);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].ttl, 120);
        let strings: Vec<_> = found[0].strings().collect();
        assert_eq!(strings, vec![&b"hello"[..], &b"world"[..]]);
    }
}
