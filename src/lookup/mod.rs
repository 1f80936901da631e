//! Source address extraction.
//!
//! # Data Flow
//! ```text
//! Connection (RemotePeer) ──→ ConnLookup ───┐   SocketAddr ──→ ip()
//!                                           ├─→
//! Request<B> (ConnectInfo) ─→ RequestLookup ┘   "host:port" → split → parse
//! ```
//!
//! # Design Decisions
//! - One typed `AddressLookup<S>` impl per source kind, so a wrong source
//!   is a compile error rather than a runtime failure
//! - A typed socket address is used as is; only textual endpoints go
//!   through `host:port` parsing. Scoped v6 peers (`[fe80::1%3]:443`)
//!   resolve to their address without the zone

use std::net::{IpAddr, SocketAddr};

use axum::extract::ConnectInfo;
use axum::http::Request;

use crate::error::LookupError;

/// Extracts the source address from a value of type `S`.
pub trait AddressLookup<S: ?Sized>: Send + Sync {
    fn address(&self, source: &S) -> Result<IpAddr, LookupError>;
}

/// Remote endpoint as reported by a connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PeerEndpoint {
    Socket(SocketAddr),
    /// Textual `host:port`, for transports that only report a string.
    HostPort(String),
}

impl PeerEndpoint {
    pub fn address(&self) -> Result<IpAddr, LookupError> {
        match self {
            PeerEndpoint::Socket(addr) => Ok(addr.ip()),
            PeerEndpoint::HostPort(endpoint) => parse_endpoint(endpoint),
        }
    }
}

impl From<SocketAddr> for PeerEndpoint {
    fn from(addr: SocketAddr) -> Self {
        PeerEndpoint::Socket(addr)
    }
}

impl From<String> for PeerEndpoint {
    fn from(endpoint: String) -> Self {
        PeerEndpoint::HostPort(endpoint)
    }
}

/// Anything that can report the endpoint on the other side of it.
pub trait RemotePeer {
    /// The remote endpoint, or `None` if unknown.
    fn remote_endpoint(&self) -> Option<PeerEndpoint>;
}

impl RemotePeer for tokio::net::TcpStream {
    fn remote_endpoint(&self) -> Option<PeerEndpoint> {
        self.peer_addr().ok().map(PeerEndpoint::Socket)
    }
}

impl RemotePeer for std::net::TcpStream {
    fn remote_endpoint(&self) -> Option<PeerEndpoint> {
        self.peer_addr().ok().map(PeerEndpoint::Socket)
    }
}

impl RemotePeer for SocketAddr {
    fn remote_endpoint(&self) -> Option<PeerEndpoint> {
        Some(PeerEndpoint::Socket(*self))
    }
}

/// Looks up the remote address of a connection.
#[derive(Debug, Default, Clone, Copy)]
pub struct ConnLookup;

impl<C: RemotePeer + ?Sized> AddressLookup<C> for ConnLookup {
    fn address(&self, conn: &C) -> Result<IpAddr, LookupError> {
        conn.remote_endpoint().ok_or(LookupError::NoAddress)?.address()
    }
}

/// Remote address recorded on a request by a server that does not use
/// axum's `ConnectInfo`, in `host:port` form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteAddr(pub String);

/// Looks up the remote address recorded on an inbound request.
///
/// Reads `ConnectInfo<SocketAddr>` (set by
/// `into_make_service_with_connect_info`), then a `RemoteAddr`
/// extension. Forwarding headers are not trusted.
#[derive(Debug, Default, Clone, Copy)]
pub struct RequestLookup;

impl<B> AddressLookup<Request<B>> for RequestLookup {
    fn address(&self, req: &Request<B>) -> Result<IpAddr, LookupError> {
        let extensions = req.extensions();
        if let Some(ConnectInfo(addr)) = extensions.get::<ConnectInfo<SocketAddr>>() {
            return Ok(addr.ip());
        }
        match extensions.get::<RemoteAddr>() {
            Some(RemoteAddr(endpoint)) => parse_endpoint(endpoint),
            None => Err(LookupError::NoAddress),
        }
    }
}

/// Parse the host part of a `host:port` endpoint as an address.
pub fn parse_endpoint(endpoint: &str) -> Result<IpAddr, LookupError> {
    let (host, _port) = split_host_port(endpoint).ok_or_else(|| LookupError::MalformedEndpoint {
        endpoint: endpoint.to_string(),
    })?;
    host.parse().map_err(|_| LookupError::NoAddress)
}

/// Split `host:port` or `[host]:port`. A bare v6 address without
/// brackets is ambiguous and rejected.
pub fn split_host_port(endpoint: &str) -> Option<(&str, &str)> {
    if let Some(rest) = endpoint.strip_prefix('[') {
        let (host, tail) = rest.split_once(']')?;
        let port = tail.strip_prefix(':')?;
        return Some((host, port));
    }
    let (host, port) = endpoint.rsplit_once(':')?;
    if host.contains(':') || host.contains('[') || host.contains(']') {
        return None;
    }
    Some((host, port))
}
