//! Talking to a server.
//!
//! This module performs single query/response exchanges over UDP and
//! TCP. An exchange builds the query into a rented buffer, sends it,
//! and returns a [`MessageReader`] positioned after the header together
//! with the parsed header. Timeouts and cancellation are composed
//! around these futures by the query engine; every socket operation in
//! here is a suspension point observing them.

pub mod pool;
pub mod tcp;
pub mod udp;

use crate::base::{Header, MessageWriter, Question};
use self::pool::{BufferPool, PooledBuf};
use std::sync::Arc;

/// Builds a query for `question` into a rented buffer.
///
/// The message starts at `reserve` bytes into the buffer so the TCP
/// transport can prepend its length field. Returns the buffer, the
/// total number of used bytes, and the transaction id.
fn build_query(
    pool: &Arc<BufferPool>,
    size: usize,
    reserve: usize,
    question: &Question,
) -> (PooledBuf, usize, u16) {
    let header = Header::for_query();
    let mut buf = pool.rent(size);
    loop {
        let mut writer = MessageWriter::new(&mut buf[reserve..]);
        if writer.write_header(header) && writer.write_question(question) {
            let pos = writer.pos();
            return (buf, reserve + pos, header.id());
        }
        let size = buf.len() * 2;
        buf = pool.rent(size);
    }
}
