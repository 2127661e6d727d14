//! Resolver configuration.
//!
//! A [`ResolvConf`] names the upstream servers to ask and carries the
//! handful of options the resolver understands. On Unix-like systems
//! the system configuration is read from `/etc/resolv.conf` in the
//! glibc format; only the `nameserver`, `search`, and `domain` lines
//! are consumed, everything else is skipped.

use crate::base::Dname;
use core::fmt;
use std::io;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::Path;
use std::str::{self, FromStr};

//------------ Module Configuration ------------------------------------------

/// The standard DNS port.
pub const DEFAULT_PORT: u16 = 53;

/// Where Unix-like systems keep the resolver configuration.
#[cfg(unix)]
const RESOLV_CONF_PATH: &str = "/etc/resolv.conf";

//------------ ResolvOptions -------------------------------------------------

/// Options for the resolver configuration.
#[derive(Clone, Debug, Default)]
pub struct ResolvOptions {
    /// The default domain from a `domain` line.
    ///
    /// Carried for completeness; the resolver queries names exactly as
    /// given and does not append this.
    pub default_domain: Option<Dname>,

    /// The search list from a `search` line.
    ///
    /// Like the default domain, parsed but not applied to queries.
    pub search: Vec<Dname>,

    /// Whether the hosts file should be consulted before the network.
    ///
    /// Accepted but not currently honored by any lookup path.
    pub use_hosts_file: bool,
}

//------------ ResolvConf ----------------------------------------------------

/// Resolver configuration.
///
/// Collects the servers to query, in the order to try them, plus the
/// options above. A configuration without servers is unusable; call
/// [`finalize`][Self::finalize] to fall back to the local host the way
/// glibc does, or use [`system`][Self::system] which takes care of
/// everything.
#[derive(Clone, Debug)]
pub struct ResolvConf {
    /// Addresses of the servers to query, in order.
    pub servers: Vec<SocketAddr>,

    /// Default options.
    pub options: ResolvOptions,
}

/// # Management
///
impl ResolvConf {
    /// Creates a new, empty configuration.
    pub fn new() -> Self {
        ResolvConf {
            servers: Vec::new(),
            options: ResolvOptions::default(),
        }
    }

    /// Finalizes the configuration for actual use.
    ///
    /// If no server is configured, `127.0.0.1:53` is added. This is
    /// what glibc does, and it keeps the contract that a configuration
    /// always names at least one server.
    pub fn finalize(&mut self) {
        if self.servers.is_empty() {
            self.servers.push(SocketAddr::new(
                IpAddr::V4(Ipv4Addr::LOCALHOST),
                DEFAULT_PORT,
            ));
        }
    }

    /// Creates the system configuration.
    ///
    /// On Unix-like systems this reads `/etc/resolv.conf`; a missing or
    /// unreadable file simply yields the fallback configuration. Other
    /// systems get the fallback directly, since enumerating their
    /// configured servers is left to platform-specific callers that can
    /// hand a populated configuration to the resolver.
    pub fn system() -> Self {
        let mut conf = ResolvConf::new();
        #[cfg(unix)]
        let _ = conf.parse_file(RESOLV_CONF_PATH);
        conf.finalize();
        conf
    }
}

/// # Parsing the Configuration File
///
impl ResolvConf {
    /// Parses the configuration from a file.
    pub fn parse_file<P: AsRef<Path>>(
        &mut self,
        path: P,
    ) -> Result<(), ConfError> {
        let mut file = std::fs::File::open(path)?;
        self.parse(&mut file)
    }

    /// Parses the configuration from a reader.
    ///
    /// The format is that of the `/etc/resolv.conf` file.
    pub fn parse<R: io::Read>(
        &mut self,
        reader: &mut R,
    ) -> Result<(), ConfError> {
        use std::io::BufRead;

        for line in io::BufReader::new(reader).lines() {
            let line = line?;
            let line = line.trim();
            if line.is_empty()
                || line.starts_with(';')
                || line.starts_with('#')
            {
                continue;
            }

            let mut words = line.split_whitespace();
            match words.next() {
                Some("nameserver") => self.parse_nameserver(words)?,
                Some("domain") => self.parse_domain(words)?,
                Some("search") => self.parse_search(words)?,
                // Anything else, glibc options included, is not ours.
                _ => {}
            }
        }
        Ok(())
    }

    fn parse_nameserver(
        &mut self,
        mut words: str::SplitWhitespace,
    ) -> Result<(), ConfError> {
        let addr = IpAddr::from_str(next_word(&mut words)?)
            .map_err(|_| ConfError::Parse)?;
        self.servers.push(SocketAddr::new(addr, DEFAULT_PORT));
        no_more_words(words)
    }

    fn parse_domain(
        &mut self,
        mut words: str::SplitWhitespace,
    ) -> Result<(), ConfError> {
        let domain = Dname::from_str(next_word(&mut words)?)
            .map_err(|_| ConfError::Parse)?;
        self.options.default_domain = Some(domain);
        no_more_words(words)
    }

    fn parse_search(
        &mut self,
        words: str::SplitWhitespace,
    ) -> Result<(), ConfError> {
        let mut search = Vec::new();
        for word in words {
            search.push(
                Dname::from_str(word).map_err(|_| ConfError::Parse)?,
            );
        }
        self.options.search = search;
        Ok(())
    }
}

//------------ Private Helpers -----------------------------------------------

/// Returns a reference to the next word or an error.
fn next_word<'a>(
    words: &mut str::SplitWhitespace<'a>,
) -> Result<&'a str, ConfError> {
    words.next().ok_or(ConfError::Parse)
}

/// Returns nothing but errors out if there are words left.
fn no_more_words(mut words: str::SplitWhitespace) -> Result<(), ConfError> {
    match words.next() {
        Some(..) => Err(ConfError::Parse),
        None => Ok(()),
    }
}

//------------ ConfError -----------------------------------------------------

/// An error happened while reading a configuration file.
#[derive(Debug)]
pub enum ConfError {
    /// The file is not a proper configuration file.
    Parse,

    /// Something happened while reading.
    Io(io::Error),
}

impl From<io::Error> for ConfError {
    fn from(err: io::Error) -> Self {
        ConfError::Io(err)
    }
}

impl fmt::Display for ConfError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            ConfError::Parse => f.write_str("error parsing configuration"),
            ConfError::Io(ref err) => err.fmt(f),
        }
    }
}

impl std::error::Error for ConfError {}

//============ Testing =======================================================
