//! The TCP transport.

use super::pool::{BufferPool, PooledBuf, TCP_BUF_SIZE};
use crate::base::header::HEADER_LEN;
use crate::base::{Header, MessageReader, ParseError, Question};
use crate::error::Error;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tracing::trace;

/// Performs a single query/response exchange over TCP.
///
/// DNS over TCP frames each message with a two-octet big-endian length,
/// RFC 1035 section 4.2.2. The query is built two bytes into the rented
/// buffer so one buffer carries the complete frame. If the announced
/// response is larger than the buffer, a bigger one is rented and the
/// bytes read so far move across.
pub async fn exchange(
    pool: &Arc<BufferPool>,
    addr: SocketAddr,
    question: &Question,
) -> Result<(MessageReader<PooledBuf>, Header), Error> {
    let (mut buf, end, id) = super::build_query(pool, TCP_BUF_SIZE, 2, question);
    let query_len = (end - 2) as u16;
    buf[..2].copy_from_slice(&query_len.to_be_bytes());

    let mut sock = TcpStream::connect(addr).await?;
    sock.write_all(&buf[..end]).await?;

    let mut filled = 0;
    while filled < 2 {
        filled += read_some(&mut sock, &mut buf[filled..]).await?;
    }
    let resp_len = usize::from(u16::from_be_bytes([buf[0], buf[1]]));
    if resp_len < HEADER_LEN {
        return Err(ParseError::ShortInput.into());
    }
    let total = 2 + resp_len;
    if buf.len() < total {
        trace!(server = %addr, len = resp_len, "growing TCP receive buffer");
        let mut bigger = pool.rent(total);
        bigger[..filled].copy_from_slice(&buf[..filled]);
        buf = bigger;
    }
    while filled < total {
        filled += read_some(&mut sock, &mut buf[filled..total]).await?;
    }

    let header = Header::parse(&buf[2..total])?;
    if header.id() != id || !header.qr() {
        return Err(Error::protocol("response does not answer this query"));
    }
    let mut reader = MessageReader::with_bounds(buf, 2, resp_len);
    reader.read_header()?;
    Ok((reader, header))
}

/// Reads at least one byte, treating end-of-stream as a protocol error.
///
/// The server closing the connection before the announced length has
/// arrived leaves a truncated message, not an i/o condition.
async fn read_some(
    sock: &mut TcpStream,
    buf: &mut [u8],
) -> Result<usize, Error> {
    let n = sock.read(buf).await?;
    if n == 0 {
        return Err(Error::protocol("connection closed mid-message"));
    }
    Ok(n)
}
