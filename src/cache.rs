//! Caching lookup results.
//!
//! The cache keeps typed results keyed by name and record type, plus a
//! second map recording names that are known not to exist at all – an
//! NXDOMAIN refutes every record type for a name, so nonexistence is
//! keyed on the name alone. Keys compare byte-exactly; callers that
//! care about DNS case folding normalize before they get here.
//!
//! Expiry is lazy: reads skip stale entries but leave them in place,
//! the next insert for the key simply overwrites. There is also no
//! single-flight coordination, so two concurrent misses on the same key
//! will both drive the upstream and the later insert wins.

use crate::base::{Dname, Rtype};
use crate::lookup::{AddressResult, ServiceResult, TxtResult};
use dashmap::DashMap;
use std::time::Instant;
use tracing::trace;

//------------ CachedResult --------------------------------------------------

/// The payload of a positive cache entry.
#[derive(Clone, Debug)]
pub enum CachedResult {
    /// Addresses, from an A or AAAA lookup.
    Addresses(Vec<AddressResult>),

    /// Service instances, from an SRV lookup.
    Services(Vec<ServiceResult>),

    /// Text records, from a TXT lookup.
    Texts(Vec<TxtResult>),
}

impl CachedResult {
    /// Returns the empty result for the given query type.
    pub(crate) fn empty(rtype: Rtype) -> Self {
        match rtype {
            Rtype::Srv => CachedResult::Services(Vec::new()),
            Rtype::Txt => CachedResult::Texts(Vec::new()),
            _ => CachedResult::Addresses(Vec::new()),
        }
    }
}

//------------ ResultCache ---------------------------------------------------

/// A concurrent cache of typed lookup results.
#[derive(Debug, Default)]
pub struct ResultCache {
    /// Positive results keyed by name and type.
    positive: DashMap<CacheKey, Entry>,

    /// Expiry times of names known not to exist.
    negative: DashMap<Dname, Instant>,
}

#[derive(Clone, Debug, Eq, Hash, PartialEq)]
struct CacheKey {
    name: Dname,
    rtype: Rtype,
}

#[derive(Clone, Debug)]
struct Entry {
    created_at: Instant,
    expires_at: Instant,
    result: CachedResult,
}

impl ResultCache {
    /// Creates an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Looks up a positive entry.
    ///
    /// A fresh negative entry for the name answers first: the name does
    /// not exist, so the result is a definitive empty list regardless
    /// of type. Otherwise the keyed entry is returned if it is still
    /// alive at `now`.
    pub fn get(
        &self,
        name: &Dname,
        rtype: Rtype,
        now: Instant,
    ) -> Option<CachedResult> {
        if let Some(expires_at) = self.negative.get(name) {
            if now < *expires_at {
                trace!(name = %name, "negative cache hit");
                return Some(CachedResult::empty(rtype));
            }
        }
        let key = CacheKey {
            name: name.clone(),
            rtype,
        };
        let entry = self.positive.get(&key)?;
        if now >= entry.expires_at {
            return None;
        }
        trace!(
            name = %name, %rtype,
            age = ?now.duration_since(entry.created_at),
            "cache hit"
        );
        Some(entry.result.clone())
    }

    /// Inserts a positive entry, overwriting any previous one.
    pub fn insert(
        &self,
        name: Dname,
        rtype: Rtype,
        expires_at: Instant,
        result: CachedResult,
        now: Instant,
    ) {
        self.positive.insert(
            CacheKey { name, rtype },
            Entry {
                created_at: now,
                expires_at,
                result,
            },
        );
    }

    /// Records that a name does not exist, overwriting any previous
    /// expiry.
    pub fn insert_nonexistent(&self, name: Dname, expires_at: Instant) {
        self.negative.insert(name, expires_at);
    }
}

//============ Testing =======================================================
