//! Receive buffer pooling.
//!
//! Every exchange rents a buffer, fills it, and hands it to the message
//! reader, which keeps it alive as long as borrowed record data is in
//! use. Returning the buffer on drop means the pool gets it back on
//! every exit path, including cancellation.

use parking_lot::Mutex;
use std::ops;
use std::sync::Arc;

//------------ Module Configuration ------------------------------------------

/// The buffer size for UDP exchanges.
///
/// RFC 1035 limits plain DNS over UDP to 512 bytes; anything bigger
/// comes back truncated and is retried over TCP.
pub const UDP_BUF_SIZE: usize = 512;

/// The initial buffer size for TCP exchanges.
pub const TCP_BUF_SIZE: usize = 8192;

/// How many buffers of each size class the pool keeps around.
const MAX_POOLED: usize = 32;

//------------ BufferPool ----------------------------------------------------

/// A pool of receive buffers in two size classes.
///
/// Requests above the large class are served with a plain allocation
/// that is simply dropped on return.
#[derive(Debug, Default)]
pub struct BufferPool {
    /// Idle buffers of [`UDP_BUF_SIZE`].
    small: Mutex<Vec<Vec<u8>>>,

    /// Idle buffers of [`TCP_BUF_SIZE`].
    large: Mutex<Vec<Vec<u8>>>,
}

impl BufferPool {
    /// Creates an empty pool.
    pub fn new() -> Self {
        Self::default()
    }

    /// Rents a zeroed buffer of at least `size` bytes.
    pub fn rent(self: &Arc<Self>, size: usize) -> PooledBuf {
        let (freelist, size) = match size {
            0..=UDP_BUF_SIZE => (Some(&self.small), UDP_BUF_SIZE),
            _ if size <= TCP_BUF_SIZE => (Some(&self.large), TCP_BUF_SIZE),
            _ => (None, size),
        };
        let mut buf = freelist
            .and_then(|list| list.lock().pop())
            .unwrap_or_default();
        buf.clear();
        buf.resize(size, 0);
        PooledBuf {
            buf,
            pool: freelist.map(|_| self.clone()),
        }
    }

    /// Puts a buffer back on its freelist.
    fn give_back(&self, buf: Vec<u8>) {
        let freelist = match buf.len() {
            UDP_BUF_SIZE => &self.small,
            TCP_BUF_SIZE => &self.large,
            _ => return,
        };
        let mut list = freelist.lock();
        if list.len() < MAX_POOLED {
            list.push(buf);
        }
    }
}

//------------ PooledBuf -----------------------------------------------------

/// A buffer rented from a [`BufferPool`].
///
/// Dereferences to its byte contents and returns itself to the pool
/// when dropped.
#[derive(Debug)]
pub struct PooledBuf {
    buf: Vec<u8>,
    pool: Option<Arc<BufferPool>>,
}

impl ops::Deref for PooledBuf {
    type Target = [u8];

    fn deref(&self) -> &Self::Target {
        &self.buf
    }
}

impl ops::DerefMut for PooledBuf {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.buf
    }
}

impl AsRef<[u8]> for PooledBuf {
    fn as_ref(&self) -> &[u8] {
        &self.buf
    }
}

impl Drop for PooledBuf {
    fn drop(&mut self) {
        if let Some(pool) = self.pool.take() {
            pool.give_back(std::mem::take(&mut self.buf));
        }
    }
}

//============ Testing =======================================================
