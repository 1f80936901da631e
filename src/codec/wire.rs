//! Wire form: a single quoted, comma-separated string.
//!
//! `HostAcl`, `NetAcl` serialize to and from this form through serde, so
//! an ACL can sit directly in a JSON body or a TOML config as a string.

use serde::de::{self, Deserializer};
use serde::ser::Serializer;
use serde::{Deserialize, Serialize};

use super::parse_members;
use crate::acl::{HostAcl, Members, NetAcl};
use crate::error::CodecError;

/// Encode `acl` as `"m1,m2,..."`, quotes included. Member order follows
/// the ACL's own storage order.
pub fn encode_wire<A: Members>(acl: &A) -> String {
    format!("\"{}\"", encode_payload(acl))
}

/// Decode a quoted wire-form string into `acl`, replacing its members.
///
/// On error `acl` is left empty.
pub fn decode_wire<A: Members>(acl: &A, input: &str) -> Result<(), CodecError> {
    let payload = input
        .strip_prefix('"')
        .and_then(|rest| rest.strip_suffix('"'))
        .ok_or(CodecError::NotQuoted)?;
    decode_payload(acl, payload)
}

fn encode_payload<A: Members>(acl: &A) -> String {
    acl.snapshot()
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(",")
}

fn decode_payload<A: Members>(acl: &A, payload: &str) -> Result<(), CodecError> {
    let tokens = payload.split(',').map(str::trim).filter(|token| !token.is_empty());
    match parse_members(tokens) {
        Ok(members) => {
            acl.replace(members);
            Ok(())
        }
        Err(e) => {
            acl.replace(Vec::new());
            Err(e)
        }
    }
}

macro_rules! wire_serde {
    ($acl:ty) => {
        impl Serialize for $acl {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.serialize_str(&encode_payload(self))
            }
        }

        impl<'de> Deserialize<'de> for $acl {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let payload = String::deserialize(deserializer)?;
                let acl = <$acl>::new();
                decode_payload(&acl, &payload).map_err(de::Error::custom)?;
                Ok(acl)
            }
        }
    };
}

wire_serde!(HostAcl);
wire_serde!(NetAcl);
