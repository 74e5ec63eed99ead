//! Socket-address values and name resolution.
//!
//! The crate centers on [`AddrValue`], an immutable pairing of one raw
//! socket-address record with the family, socket-type, and protocol
//! context it was produced under. Values come from three places: direct
//! construction over raw bytes, local-socket paths, and the platform
//! resolver via the [`Lookup`] builder (async; the actual
//! `getaddrinfo(3)`/`getnameinfo(3)` calls run on blocking workers).
//!
//! Address-format knowledge with no platform-call surface lives in the
//! companion [`saddr_core`] crate; this crate adds the FFI gateway, the
//! lookup front end, and the diagnostic renderer.
//!
//! ```no_run
//! # async fn demo() -> saddr::Result<()> {
//! let addr = saddr::AddrValue::tcp("localhost", 80).await?;
//! assert_eq!(addr.render(), "127.0.0.1:80 TCP (localhost)");
//! # Ok(())
//! # }
//! ```
//!
//! The optional `lookup-order-inet` / `lookup-order-inet6` features
//! replace unspecified-family queries with a fixed family probe order,
//! for platforms whose resolver handles `AF_UNSPEC` poorly.

#[cfg(all(feature = "lookup-order-inet", feature = "lookup-order-inet6"))]
compile_error!("features `lookup-order-inet` and `lookup-order-inet6` are mutually exclusive");

mod gateway;
pub mod lookup;
mod render;
pub mod value;

pub use saddr_core::coerce::{NodeInput, ServiceInput};
pub use saddr_core::error::AddrError;
pub use saddr_core::record::AddrRecord;
pub use saddr_core::{coerce, names, record};

pub use crate::lookup::Lookup;
pub use crate::value::AddrValue;

/// Crate-wide result type.
pub type Result<T> = std::result::Result<T, AddrError>;
