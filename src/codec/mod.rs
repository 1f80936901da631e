//! ACL serialization.
//!
//! # Formats
//! ```text
//! wire:  "10.0.0.1, 10.0.0.2,::1"    one quoted string, comma separated,
//!                                    embeddable in JSON/TOML documents
//! flat:  10.0.0.1\n10.0.0.2\n::1     one member per line, sorted on encode
//! ```
//!
//! # Design Decisions
//! - Decoding is all-or-nothing: the first bad member aborts the decode
//!   and no partially populated ACL is ever observable
//! - Members are parsed before any lock is taken; the result is swapped
//!   in with a single `Members::replace`
//! - Wire tokens are trimmed and blank ones skipped, so `"\"\""` is the
//!   empty ACL
//! - Flat files are strict: every line must be a member literal as
//!   written. Only empty input and one final line terminator are allowed

pub mod flat;
pub mod wire;

pub use flat::{decode_lines, dump_file, encode_lines, load_file};
pub use wire::{decode_wire, encode_wire};

use crate::acl::Identity;
use crate::error::CodecError;

/// Parse every token as written, failing on the first invalid one.
pub(crate) fn parse_members<'a, I, T>(tokens: T) -> Result<Vec<I>, CodecError>
where
    I: Identity,
    T: IntoIterator<Item = &'a str>,
{
    tokens
        .into_iter()
        .map(|token| {
            I::parse_member(token).ok_or_else(|| CodecError::InvalidMember {
                member: token.to_string(),
            })
        })
        .collect()
}
