//! IP-based access control for network services.
//!
//! # Architecture Overview
//!
//! ```text
//!   Connection / Request
//!          │
//!          ▼
//!   ┌─────────────┐     ┌──────────────┐     ┌──────────────────────┐
//!   │   lookup    │────▶│     acl      │────▶│        http          │
//!   │ source addr │     │ HostAcl      │     │ AclGate / middleware │
//!   └─────────────┘     │ NetAcl       │     │ allow | deny | 401   │
//!                       │ Policy, Stub │     └──────────────────────┘
//!                       └──────┬───────┘
//!                              │
//!                       ┌──────┴───────┐     ┌──────────────────────┐
//!                       │    codec     │◀────│       config         │
//!                       │ wire / flat  │     │ TOML policy document │
//!                       └──────────────┘     └──────────────────────┘
//! ```
//!
//! This crate decides who may connect; it does not authenticate anyone.

pub mod acl;
pub mod codec;
pub mod config;
pub mod error;
pub mod http;
pub mod lookup;
pub mod observability;

pub use acl::{Acl, HostAcl, HostStub, MutableAcl, NetAcl, NetStub, Policy};
pub use config::GateConfig;
pub use error::{CodecError, ConfigError, LookupError};
pub use http::{AclGate, GateState};
pub use lookup::{AddressLookup, ConnLookup, PeerEndpoint, RequestLookup};
