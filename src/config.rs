//! Typed configuration consumed by the broker.
//!
//! `region` holds the immutable endpoint table; `credentials` turns the host's loosely-typed
//! credential record into a validated [`Credentials`] value once, at the boundary.

pub mod credentials;
pub mod region;

pub use credentials::*;
pub use region::*;
