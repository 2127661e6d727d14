//! A loopback DNS server for exercising the resolver end to end.
//!
//! The server listens on an ephemeral port on both UDP and TCP and
//! answers every query with a canned set of records, echoing the
//! transaction id and the question. In truncating mode the UDP side
//! only ever sends an empty answer with the TC bit set, forcing the
//! client over to TCP. A sinkhole server accepts datagrams and stays
//! silent, for timeout tests.

use std::net::SocketAddr;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, UdpSocket};
use tokio::task::JoinHandle;

//------------ Rec -----------------------------------------------------------

/// A record the server hands out.
#[derive(Clone, Debug)]
pub struct Rec {
    owner: String,
    rtype: u16,
    ttl: u32,
    rdata: Vec<u8>,
}

impl Rec {
    pub fn a(owner: &str, ttl: u32, addr: [u8; 4]) -> Self {
        Rec {
            owner: owner.into(),
            rtype: 1,
            ttl,
            rdata: addr.to_vec(),
        }
    }

    pub fn aaaa(owner: &str, ttl: u32, addr: [u8; 16]) -> Self {
        Rec {
            owner: owner.into(),
            rtype: 28,
            ttl,
            rdata: addr.to_vec(),
        }
    }

    pub fn cname(owner: &str, ttl: u32, target: &str) -> Self {
        Rec {
            owner: owner.into(),
            rtype: 5,
            ttl,
            rdata: encode_name(target),
        }
    }

    pub fn srv(
        owner: &str,
        ttl: u32,
        priority: u16,
        weight: u16,
        port: u16,
        target: &str,
    ) -> Self {
        let mut rdata = Vec::new();
        rdata.extend_from_slice(&priority.to_be_bytes());
        rdata.extend_from_slice(&weight.to_be_bytes());
        rdata.extend_from_slice(&port.to_be_bytes());
        rdata.extend_from_slice(&encode_name(target));
        Rec {
            owner: owner.into(),
            rtype: 33,
            ttl,
            rdata,
        }
    }

    pub fn txt(owner: &str, ttl: u32, strings: &[&[u8]]) -> Self {
        let mut rdata = Vec::new();
        for s in strings {
            rdata.push(s.len() as u8);
            rdata.extend_from_slice(s);
        }
        Rec {
            owner: owner.into(),
            rtype: 16,
            ttl,
            rdata,
        }
    }

    fn write_into(&self, buf: &mut Vec<u8>) {
        buf.extend_from_slice(&encode_name(&self.owner));
        buf.extend_from_slice(&self.rtype.to_be_bytes());
        buf.extend_from_slice(&1u16.to_be_bytes());
        buf.extend_from_slice(&self.ttl.to_be_bytes());
        buf.extend_from_slice(&(self.rdata.len() as u16).to_be_bytes());
        buf.extend_from_slice(&self.rdata);
    }
}

fn encode_name(name: &str) -> Vec<u8> {
    let mut out = Vec::new();
    for label in name.split('.').filter(|l| !l.is_empty()) {
        out.push(label.len() as u8);
        out.extend_from_slice(label.as_bytes());
    }
    out.push(0);
    out
}

//------------ Canned --------------------------------------------------------

/// The sections every answer is built from.
#[derive(Clone, Debug, Default)]
pub struct Canned {
    pub answers: Vec<Rec>,
    pub additionals: Vec<Rec>,
}

impl Canned {
    pub fn answers(answers: Vec<Rec>) -> Self {
        Canned {
            answers,
            additionals: Vec::new(),
        }
    }

    /// Builds a response to the given query.
    fn respond(&self, query: &[u8], truncated: bool) -> Option<Vec<u8>> {
        let question = question_bytes(query)?;
        let mut reply = Vec::new();
        reply.extend_from_slice(&query[..2]);
        let flags: u16 = if truncated { 0x8380 } else { 0x8180 };
        reply.extend_from_slice(&flags.to_be_bytes());
        reply.extend_from_slice(&1u16.to_be_bytes());
        let answers: &[Rec] = if truncated { &[] } else { &self.answers };
        let additionals: &[Rec] =
            if truncated { &[] } else { &self.additionals };
        reply.extend_from_slice(&(answers.len() as u16).to_be_bytes());
        reply.extend_from_slice(&0u16.to_be_bytes());
        reply.extend_from_slice(&(additionals.len() as u16).to_be_bytes());
        reply.extend_from_slice(question);
        for rec in answers.iter().chain(additionals) {
            rec.write_into(&mut reply);
        }
        Some(reply)
    }
}

/// Returns the question section of a query message.
fn question_bytes(query: &[u8]) -> Option<&[u8]> {
    let mut pos = 12;
    loop {
        let len = *query.get(pos)? as usize;
        pos += 1;
        if len == 0 {
            break;
        }
        pos += len;
    }
    pos += 4;
    query.get(12..pos)
}

//------------ TestServer ----------------------------------------------------

/// A running loopback DNS server.
pub struct TestServer {
    pub addr: SocketAddr,
    tasks: Vec<JoinHandle<()>>,
}

impl TestServer {
    /// Starts a server answering from `canned` on both transports.
    pub async fn start(canned: Canned) -> Self {
        Self::start_inner(canned, false).await
    }

    /// Starts a server that truncates every UDP answer.
    pub async fn start_truncating(canned: Canned) -> Self {
        Self::start_inner(canned, true).await
    }

    async fn start_inner(canned: Canned, truncate_udp: bool) -> Self {
        init_logging();
        let udp = UdpSocket::bind("127.0.0.1:0").await.unwrap();
        let addr = udp.local_addr().unwrap();
        let tcp = TcpListener::bind(addr).await.unwrap();

        let udp_canned = canned.clone();
        let udp_task = tokio::spawn(async move {
            let mut buf = vec![0u8; 1024];
            loop {
                let Ok((n, peer)) = udp.recv_from(&mut buf).await else {
                    return;
                };
                if let Some(reply) =
                    udp_canned.respond(&buf[..n], truncate_udp)
                {
                    let _ = udp.send_to(&reply, peer).await;
                }
            }
        });

        let tcp_task = tokio::spawn(async move {
            loop {
                let Ok((mut stream, _)) = tcp.accept().await else {
                    return;
                };
                let canned = canned.clone();
                tokio::spawn(async move {
                    let mut len = [0u8; 2];
                    if stream.read_exact(&mut len).await.is_err() {
                        return;
                    }
                    let mut query =
                        vec![0u8; u16::from_be_bytes(len) as usize];
                    if stream.read_exact(&mut query).await.is_err() {
                        return;
                    }
                    if let Some(reply) = canned.respond(&query, false) {
                        let mut framed =
                            (reply.len() as u16).to_be_bytes().to_vec();
                        framed.extend_from_slice(&reply);
                        let _ = stream.write_all(&framed).await;
                    }
                });
            }
        });

        TestServer {
            addr,
            tasks: vec![udp_task, tcp_task],
        }
    }

    /// Starts a server that accepts datagrams but never answers.
    pub async fn sinkhole() -> Self {
        init_logging();
        let udp = UdpSocket::bind("127.0.0.1:0").await.unwrap();
        let addr = udp.local_addr().unwrap();
        let task = tokio::spawn(async move {
            let mut buf = vec![0u8; 1024];
            loop {
                if udp.recv_from(&mut buf).await.is_err() {
                    return;
                }
            }
        });
        TestServer {
            addr,
            tasks: vec![task],
        }
    }

    /// Tears the server down, closing its sockets.
    pub fn shutdown(self) {
        for task in &self.tasks {
            task.abort();
        }
    }
}

/// Installs a test log subscriber once, for `RUST_LOG`-style debugging.
fn init_logging() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}
