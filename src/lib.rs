//! Asynchronous DNS stub resolving.
//!
//! A stub resolver does not answer questions itself. It forwards them
//! to one of a set of pre-configured recursive servers, which is what
//! the resolver part of the C library does as well. This crate provides
//! such a resolver for applications that want a drop-in replacement for
//! the operating system's, with a few things the system one lacks:
//! typed results, a shared result cache with RFC 2308 negative caching,
//! and cooperative cancellation.
//!
//! The central type is [`Resolver`]. It is created from an explicit
//! server list or from the system configuration in `/etc/resolv.conf`
//! and offers three lookups:
//!
//! * [`resolve_addresses`][Resolver::resolve_addresses] for the A and
//!   AAAA records of a host, following CNAME chains;
//! * [`resolve_service`][Resolver::resolve_service] for SRV records,
//!   complete with whatever addresses the server volunteered for the
//!   targets;
//! * [`resolve_text`][Resolver::resolve_text] for TXT records.
//!
//! Queries go out over UDP first and are retried over TCP when the
//! server truncates its answer. Each lookup takes a
//! [`CancellationToken`] and observes the resolver-wide gate fired by
//! [`cancel_all_pending`][Resolver::cancel_all_pending] and
//! [`close`][Resolver::close] as well as the configured timeout.
//!
//! ```no_run
//! use stub_resolv::{AddressFamily, CancellationToken, Resolver};
//!
//! # async fn example() -> Result<(), stub_resolv::Error> {
//! let resolver = Resolver::new();
//! let addrs = resolver
//!     .resolve_addresses(
//!         "www.example.com",
//!         AddressFamily::Unspecified,
//!         &CancellationToken::new(),
//!     )
//!     .await?;
//! for addr in addrs {
//!     println!("{}", addr.address);
//! }
//! # Ok(())
//! # }
//! ```

pub use self::cache::CachedResult;
pub use self::conf::{ResolvConf, ResolvOptions};
pub use self::error::Error;
pub use self::lookup::{AddressResult, ServiceResult, TxtResult};
pub use self::resolver::{AddressFamily, Resolver};

/// The cancellation token lookups take, re-exported from `tokio-util`.
pub use tokio_util::sync::CancellationToken;

pub mod base;
pub mod cache;
pub mod conf;
pub mod error;
pub mod lookup;
pub mod resolver;

mod net;
