//! Error taxonomy for the gate.
//!
//! # Design Decisions
//! - Decode and construction errors are returned to the caller and leave
//!   no partial state behind
//! - Lookup errors never reach the client verbatim; the gate turns them
//!   into a 500 response
//! - A denied address is a decision, not an error, and has no variant here

use thiserror::Error;

/// Failure while decoding an ACL from its wire or flat-file form.
#[derive(Debug, Error)]
pub enum CodecError {
    /// A member literal is not a valid address or network.
    #[error("invalid ACL member {member:?}")]
    InvalidMember { member: String },

    /// The wire form must be a single quoted string.
    #[error("wire-form ACL must be a quoted string")]
    NotQuoted,

    /// Reading or writing a flat file failed.
    #[error("ACL file I/O: {0}")]
    Io(#[from] std::io::Error),
}

/// A required piece of the request gate was not supplied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("ACL cannot be empty")]
    MissingAcl,

    #[error("allow handler cannot be empty")]
    MissingAllow,
}

/// An address could not be extracted from a connection or request.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LookupError {
    /// The source carries no usable remote address.
    #[error("no address returned")]
    NoAddress,

    /// The remote endpoint is not in `host:port` form.
    #[error("malformed remote endpoint {endpoint:?}")]
    MalformedEndpoint { endpoint: String },
}
