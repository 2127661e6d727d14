//! The resolver.
//!
//! [`Resolver`] is the public face of the crate. It relays every query
//! to the configured upstream servers in order, falls back to TCP when
//! an answer comes back truncated, and keeps typed results in a shared
//! cache. Values are cheap to clone and safe to use from many tasks at
//! once; each call owns its sockets and composes its own cancellation
//! from the caller's token, the resolver-wide gate, and the configured
//! timeout.

use crate::base::name::FromStrError;
use crate::base::{
    Dname, Header, MessageReader, Question, Rcode, Rtype,
};
use crate::cache::{CachedResult, ResultCache};
use crate::conf::ResolvConf;
use crate::error::Error;
use crate::lookup::{
    addr, classify_negative, srv, txt, AddressResult, DnsResponse,
    NegativeAnswer, ServiceResult, TxtResult,
};
use crate::net::pool::{BufferPool, PooledBuf};
use crate::net::{tcp, udp};
use futures_util::future::join;
use parking_lot::{Mutex, RwLock};
use std::io;
use std::mem;
use std::net::SocketAddr;
use std::str::FromStr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

//------------ Module Configuration ------------------------------------------

/// The timeout applied to a lookup unless configured otherwise.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

//------------ AddressFamily -------------------------------------------------

/// Which address families an address lookup should return.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum AddressFamily {
    /// IPv4 addresses only.
    V4,

    /// IPv6 addresses only.
    V6,

    /// Both families.
    Unspecified,
}

//------------ Resolver ------------------------------------------------------

/// A DNS stub resolver.
///
/// The resolver does not recurse itself; it forwards every question to
/// one of a set of pre-configured servers, which is what the resolver
/// part of the C library does as well. Results come back as typed
/// values and are cached until their records expire, with negative
/// answers cached per RFC 2308.
///
/// Values can be cloned cheaply, all clones share the cache and the
/// cancellation gate. Any number of lookups may run concurrently.
#[derive(Clone, Debug)]
pub struct Resolver(Arc<ResolverInner>);

#[derive(Debug)]
struct ResolverInner {
    /// The configuration, immutable from here on.
    conf: ResolvConf,

    /// The shared result cache.
    cache: ResultCache,

    /// The receive buffer pool.
    pool: Arc<BufferPool>,

    /// The timeout applied to each lookup. `None` means unbounded.
    timeout: RwLock<Option<Duration>>,

    /// The gate cancelling all pending lookups.
    ///
    /// [`Resolver::cancel_all_pending`] swaps in a fresh token before
    /// firing the old one, so the operations are not serialized through
    /// anything but this mutex.
    gate: Mutex<CancellationToken>,

    /// Whether the resolver has been closed.
    closed: AtomicBool,
}

/// # Creation
///
impl Resolver {
    /// Creates a new resolver using the system's configuration.
    pub fn new() -> Self {
        Self::from_conf(ResolvConf::system())
    }

    /// Creates a new resolver using the given configuration.
    pub fn from_conf(conf: ResolvConf) -> Self {
        Resolver(Arc::new(ResolverInner {
            conf,
            cache: ResultCache::new(),
            pool: Arc::new(BufferPool::new()),
            timeout: RwLock::new(Some(DEFAULT_TIMEOUT)),
            gate: Mutex::new(CancellationToken::new()),
            closed: AtomicBool::new(false),
        }))
    }

    /// Creates a new resolver asking the given server.
    pub fn from_server(server: SocketAddr) -> Self {
        Self::from_servers([server])
    }

    /// Creates a new resolver asking the given servers in order.
    pub fn from_servers(
        servers: impl IntoIterator<Item = SocketAddr>,
    ) -> Self {
        let mut conf = ResolvConf::new();
        conf.servers.extend(servers);
        conf.finalize();
        Self::from_conf(conf)
    }
}

/// # Configuration
///
impl Resolver {
    /// Returns the configuration the resolver was created with.
    pub fn conf(&self) -> &ResolvConf {
        &self.0.conf
    }

    /// Returns the current lookup timeout.
    pub fn timeout(&self) -> Option<Duration> {
        *self.0.timeout.read()
    }

    /// Sets the lookup timeout. `None` disables the timeout entirely.
    ///
    /// # Panics
    ///
    /// Panics if the timeout is zero.
    pub fn set_timeout(&self, timeout: Option<Duration>) {
        if let Some(timeout) = timeout {
            assert!(!timeout.is_zero(), "timeout must be positive");
        }
        *self.0.timeout.write() = timeout;
    }
}

/// # Lookups
///
impl Resolver {
    /// Resolves a host name into its addresses.
    ///
    /// Follows CNAME chains the server returns alongside the address
    /// records. With [`AddressFamily::Unspecified`] both the A and the
    /// AAAA lookup run and the results are concatenated, IPv4 first.
    pub async fn resolve_addresses(
        &self,
        name: &str,
        family: AddressFamily,
        cancel: &CancellationToken,
    ) -> Result<Vec<AddressResult>, Error> {
        self.check_open();
        let qname = parse_query_name(name)?;
        match family {
            AddressFamily::V4 => {
                self.lookup_addresses(qname, Rtype::A, cancel).await
            }
            AddressFamily::V6 => {
                self.lookup_addresses(qname, Rtype::Aaaa, cancel).await
            }
            AddressFamily::Unspecified => {
                let (found4, found6) = join(
                    self.lookup_addresses(qname.clone(), Rtype::A, cancel),
                    self.lookup_addresses(qname, Rtype::Aaaa, cancel),
                )
                .await;
                // One of the two lookups may fail as long as the other
                // provides an answer.
                match (found4, found6) {
                    (Ok(mut found), Ok(found6)) => {
                        found.extend(found6);
                        Ok(found)
                    }
                    (Ok(found), Err(_)) | (Err(_), Ok(found)) => Ok(found),
                    (Err(err), Err(_)) => Err(err),
                }
            }
        }
    }

    /// Resolves a service name into its SRV instances.
    ///
    /// `name` is the full service name, `_service._proto.domain`. The
    /// returned instances keep the server's order; RFC 2782 selection
    /// is left to the caller.
    pub async fn resolve_service(
        &self,
        name: &str,
        cancel: &CancellationToken,
    ) -> Result<Vec<ServiceResult>, Error> {
        self.check_open();
        let qname = parse_query_name(name)?;
        match self.lookup(qname, Rtype::Srv, cancel).await? {
            CachedResult::Services(found) => Ok(found),
            _ => Ok(Vec::new()),
        }
    }

    /// Resolves the TXT records of a name.
    pub async fn resolve_text(
        &self,
        name: &str,
        cancel: &CancellationToken,
    ) -> Result<Vec<TxtResult>, Error> {
        self.check_open();
        let qname = parse_query_name(name)?;
        match self.lookup(qname, Rtype::Txt, cancel).await? {
            CachedResult::Texts(found) => Ok(found),
            _ => Ok(Vec::new()),
        }
    }
}

/// # Teardown
///
impl Resolver {
    /// Cancels every lookup currently in flight.
    ///
    /// Lookups started afterwards are unaffected: a fresh gate is
    /// swapped in atomically before the old one fires.
    pub fn cancel_all_pending(&self) {
        let old = {
            let mut gate = self.0.gate.lock();
            mem::replace(&mut *gate, CancellationToken::new())
        };
        old.cancel();
    }

    /// Closes the resolver, cancelling every lookup in flight.
    ///
    /// Closing is idempotent. Using the resolver afterwards is a
    /// programmer error and panics.
    pub fn close(&self) {
        if !self.0.closed.swap(true, Ordering::SeqCst) {
            self.0.gate.lock().cancel();
        }
    }

    fn check_open(&self) {
        assert!(
            !self.0.closed.load(Ordering::SeqCst),
            "resolver used after close"
        );
    }
}

impl Default for Resolver {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for ResolverInner {
    fn drop(&mut self) {
        self.gate.lock().cancel();
    }
}

/// # Query Engine
///
impl Resolver {
    async fn lookup_addresses(
        &self,
        qname: Dname,
        rtype: Rtype,
        cancel: &CancellationToken,
    ) -> Result<Vec<AddressResult>, Error> {
        match self.lookup(qname, rtype, cancel).await? {
            CachedResult::Addresses(found) => Ok(found),
            _ => Ok(Vec::new()),
        }
    }

    /// Runs a single-type lookup through cache and servers.
    async fn lookup(
        &self,
        qname: Dname,
        rtype: Rtype,
        cancel: &CancellationToken,
    ) -> Result<CachedResult, Error> {
        let gate = self.0.gate.lock().clone();
        if cancel.is_cancelled() || gate.is_cancelled() {
            return Err(Error::Cancelled);
        }

        if let Some(hit) = self.0.cache.get(&qname, rtype, Instant::now()) {
            return Ok(hit);
        }

        let question = Question::new(qname, rtype);
        let timeout = self.timeout();
        // The cancellation arms come first so a timeout that races a
        // cancellation still reports the cancellation.
        tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(Error::Cancelled),
            _ = gate.cancelled() => Err(Error::Cancelled),
            _ = sleep_or_forever(timeout) => Err(Error::Timeout),
            res = self.query_servers(&question) => res,
        }
    }

    /// Asks each configured server in turn until one gives an answer.
    async fn query_servers(
        &self,
        question: &Question,
    ) -> Result<CachedResult, Error> {
        let mut last_response: Option<Exchange> = None;
        let mut last_err: Option<Error> = None;

        for &server in &self.0.conf.servers {
            let started_at = Instant::now();
            debug!(
                server = %server,
                name = %question.qname,
                qtype = %question.qtype,
                "sending query"
            );
            let (reader, header) =
                match udp::exchange(&self.0.pool, server, question).await {
                    Ok(exchange) => exchange,
                    Err(Error::Io(err)) => {
                        // The server may be down or unreachable; that
                        // is no reason to give up on the others.
                        warn!(
                            server = %server, error = %err,
                            "server unreachable, trying next"
                        );
                        last_err = Some(Error::Io(err));
                        continue;
                    }
                    Err(err) => return Err(err),
                };

            let (mut reader, header) = if header.tc() {
                debug!(
                    server = %server,
                    "answer truncated, retrying over TCP"
                );
                tcp::exchange(&self.0.pool, server, question).await?
            } else {
                (reader, header)
            };

            validate_question(&mut reader, header, question)?;

            if header.rcode() == Rcode::NoError {
                let response =
                    DnsResponse::read(&mut reader, header, started_at)?;
                return Ok(self.process(question, response));
            }

            debug!(
                server = %server,
                rcode = %header.rcode(),
                "server answered with an error, trying next"
            );
            last_response = Some(Exchange {
                reader,
                header,
                started_at,
            });
        }

        // No server said NoError. The best response we kept may still
        // be meaningful: NXDOMAIN is an answer, not a failure.
        match last_response {
            Some(mut exchange) => {
                let response = DnsResponse::read(
                    &mut exchange.reader,
                    exchange.header,
                    exchange.started_at,
                )?;
                Ok(self.process(question, response))
            }
            None => Err(last_err.unwrap_or_else(|| {
                Error::Io(io::Error::new(
                    io::ErrorKind::NotFound,
                    "no servers available",
                ))
            })),
        }
    }

    /// Turns a response into a typed result and feeds the cache.
    fn process(
        &self,
        question: &Question,
        response: DnsResponse,
    ) -> CachedResult {
        let rcode = response.header.rcode();
        if rcode == Rcode::NoError && !response.answers.is_empty() {
            let result = match question.qtype {
                Rtype::Srv => {
                    CachedResult::Services(srv::process_answers(&response))
                }
                Rtype::Txt => {
                    CachedResult::Texts(txt::process_answers(&response))
                }
                rtype => CachedResult::Addresses(addr::process_answers(
                    &response,
                    &question.qname,
                    rtype,
                )),
            };
            self.0.cache.insert(
                question.qname.clone(),
                question.qtype,
                response.expires_at,
                result.clone(),
                Instant::now(),
            );
            return result;
        }

        match classify_negative(&response) {
            NegativeAnswer::NoData(expires_at) => {
                debug!(
                    name = %question.qname,
                    qtype = %question.qtype,
                    "caching empty answer"
                );
                self.0.cache.insert(
                    question.qname.clone(),
                    question.qtype,
                    expires_at,
                    CachedResult::empty(question.qtype),
                    Instant::now(),
                );
            }
            NegativeAnswer::NameError(expires_at) => {
                debug!(name = %question.qname, "caching nonexistent name");
                self.0
                    .cache
                    .insert_nonexistent(question.qname.clone(), expires_at);
            }
            NegativeAnswer::Uncacheable => {}
        }
        CachedResult::empty(question.qtype)
    }
}

//------------ Exchange ------------------------------------------------------

/// A finished exchange kept around for later interpretation.
#[derive(Debug)]
struct Exchange {
    reader: MessageReader<PooledBuf>,
    header: Header,
    started_at: Instant,
}

//------------ Helpers -------------------------------------------------------

/// Validates the name a lookup was called with.
fn parse_query_name(name: &str) -> Result<Dname, Error> {
    match Dname::from_str(name) {
        Ok(qname) => Ok(qname),
        Err(FromStrError::LongName) => Err(Error::Argument("name too long")),
        Err(_) => Err(Error::protocol("invalid domain name")),
    }
}

/// Checks that a response echoes the question that was asked.
///
/// Advances the reader past the question section. The name comparison
/// is byte-exact; a server echoing the question in different case is
/// out of luck, the records it returns would not match the chain walk
/// either.
fn validate_question<B: AsRef<[u8]>>(
    reader: &mut MessageReader<B>,
    header: Header,
    question: &Question,
) -> Result<(), Error> {
    if header.qdcount() != 1 {
        return Err(Error::protocol("unexpected question count"));
    }
    let echoed = reader.read_question()?;
    if echoed != *question {
        return Err(Error::protocol("response question does not match query"));
    }
    Ok(())
}

/// Sleeps for the given duration, or forever without one.
async fn sleep_or_forever(timeout: Option<Duration>) {
    match timeout {
        Some(timeout) => tokio::time::sleep(timeout).await,
        None => std::future::pending::<()>().await,
    }
}

//============ Testing =======================================================
