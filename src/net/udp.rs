//! The UDP transport.

use super::pool::{BufferPool, PooledBuf, UDP_BUF_SIZE};
use crate::base::header::HEADER_LEN;
use crate::base::{Header, MessageReader, Question};
use crate::error::Error;
use std::io;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::UdpSocket;
use tracing::trace;

/// Performs a single query/response exchange over UDP.
///
/// The socket is connected to the server, so the kernel already filters
/// datagrams from other sources. Anything that is too short, carries
/// the wrong transaction id, or is not a response is dropped and the
/// receive loop keeps going: a late answer to an earlier query on a
/// reused port must not satisfy this one, and stray multicast traffic
/// must not abort it.
pub async fn exchange(
    pool: &Arc<BufferPool>,
    addr: SocketAddr,
    question: &Question,
) -> Result<(MessageReader<PooledBuf>, Header), Error> {
    let (mut buf, len, id) = super::build_query(pool, UDP_BUF_SIZE, 0, question);
    let sock = bind(addr.is_ipv4()).await?;
    sock.connect(addr).await?;
    sock.send(&buf[..len]).await?;
    loop {
        let n = sock.recv(&mut buf).await?;
        if n < HEADER_LEN {
            trace!(server = %addr, len = n, "dropping short datagram");
            continue;
        }
        let header = match Header::parse(&buf[..n]) {
            Ok(header) => header,
            Err(_) => continue,
        };
        if header.id() != id || !header.qr() {
            trace!(
                server = %addr,
                id = header.id(),
                "dropping datagram that does not answer this query"
            );
            continue;
        }
        let mut reader = MessageReader::with_bounds(buf, 0, n);
        reader.read_header()?;
        return Ok((reader, header));
    }
}

/// Creates an unbound-port UDP socket of the right address family.
async fn bind(v4: bool) -> Result<UdpSocket, io::Error> {
    let local: SocketAddr = if v4 {
        ([0u8; 4], 0).into()
    } else {
        ([0u16; 8], 0).into()
    };
    UdpSocket::bind(local).await
}
