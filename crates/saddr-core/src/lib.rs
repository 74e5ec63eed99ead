//! # saddr-core
//!
//! Safe, pure logic for socket-address records: fixed-capacity storage for
//! one platform address record, coercion of caller-supplied host/service
//! inputs into resolver arguments, constant name tables, and the shared
//! error taxonomy. No `unsafe` code is permitted at the crate level; the
//! platform resolver FFI lives in the `saddr` crate.

#![deny(unsafe_code)]

pub mod coerce;
pub mod error;
pub mod names;
pub mod record;

pub use error::AddrError;
pub use record::AddrRecord;
