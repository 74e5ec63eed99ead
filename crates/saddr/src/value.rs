//! The socket-address value type.
//!
//! An [`AddrValue`] pairs one raw address record with the family,
//! socket-type, and protocol it was requested under, plus the optional
//! canonical name returned by the resolver and the optional "inspect
//! name" (the original symbolic request, kept only when it adds
//! information over the numeric form). Values are immutable once
//! constructed.

use std::ffi::c_int;
use std::fmt;

use saddr_core::error::AddrError;
use saddr_core::record::{self, AddrRecord};

use crate::gateway;
use crate::render;
use crate::Result;

/// One resolved or directly-constructed socket address.
#[derive(Clone, PartialEq, Eq)]
pub struct AddrValue {
    record: AddrRecord,
    pfamily: c_int,
    socktype: c_int,
    protocol: c_int,
    canonname: Option<String>,
    inspectname: Option<String>,
}

impl AddrValue {
    pub(crate) fn new(
        record: AddrRecord,
        pfamily: c_int,
        socktype: c_int,
        protocol: c_int,
        canonname: Option<String>,
        inspectname: Option<String>,
    ) -> Self {
        AddrValue {
            record,
            pfamily,
            socktype,
            protocol,
            canonname,
            inspectname,
        }
    }

    // -- Construction -------------------------------------------------------

    /// Builds a value directly from raw record bytes; no resolver call.
    ///
    /// The protocol family is taken from the explicit hint; when the hint
    /// is absent it falls back to the family tag embedded in the bytes.
    /// Fails with [`AddrError::AddressTooLarge`] on oversize input.
    pub fn from_bytes(
        bytes: &[u8],
        family: Option<c_int>,
        socktype: c_int,
        protocol: c_int,
    ) -> Result<Self> {
        let record = AddrRecord::from_bytes(bytes)?;
        let pfamily = family.unwrap_or_else(|| record.family());
        Ok(AddrValue::new(record, pfamily, socktype, protocol, None, None))
    }

    /// Builds a local-socket (filesystem path) address; no resolver call.
    ///
    /// Socket type defaults to stream, protocol to 0. Fails with
    /// [`AddrError::PathTooLong`] when the path does not fit the platform
    /// path field.
    pub fn from_local_path(path: &str) -> Result<Self> {
        let record = AddrRecord::pack_unix(path.as_bytes())?;
        Ok(AddrValue::new(
            record,
            libc::AF_UNIX,
            libc::SOCK_STREAM,
            0,
            None,
            None,
        ))
    }

    /// Alias for [`AddrValue::from_local_path`].
    pub fn unix(path: &str) -> Result<Self> {
        Self::from_local_path(path)
    }

    // -- Accessors ----------------------------------------------------------

    /// The address family embedded in the record bytes.
    pub fn afamily(&self) -> c_int {
        self.record.family()
    }

    /// The protocol family the value was requested under.
    pub fn pfamily(&self) -> c_int {
        self.pfamily
    }

    /// The socket type (0 when unspecified).
    pub fn socktype(&self) -> c_int {
        self.socktype
    }

    /// The protocol number (0 when unspecified).
    pub fn protocol(&self) -> c_int {
        self.protocol
    }

    /// The canonical name, when canonical-name resolution was requested
    /// and the resolver returned one.
    pub fn canonname(&self) -> Option<&str> {
        self.canonname.as_deref()
    }

    /// The retained symbolic request text, when it differs from the
    /// numeric rendering of this address.
    pub fn inspectname(&self) -> Option<&str> {
        self.inspectname.as_deref()
    }

    /// The underlying raw record.
    pub fn record(&self) -> &AddrRecord {
        &self.record
    }

    /// The exact raw record bytes.
    pub fn as_bytes(&self) -> &[u8] {
        self.record.as_bytes()
    }

    /// The exact raw record bytes as an owned vector.
    pub fn to_bytes(&self) -> Vec<u8> {
        self.record.as_bytes().to_vec()
    }

    // -- Predicates ---------------------------------------------------------

    /// True for IPv4 or IPv6 addresses.
    pub fn is_ip(&self) -> bool {
        self.is_ipv4() || self.is_ipv6()
    }

    /// True for IPv4 addresses.
    pub fn is_ipv4(&self) -> bool {
        self.afamily() == libc::AF_INET
    }

    /// True for IPv6 addresses.
    pub fn is_ipv6(&self) -> bool {
        self.afamily() == libc::AF_INET6
    }

    /// True for local-socket (filesystem path) addresses.
    pub fn is_unix(&self) -> bool {
        self.afamily() == libc::AF_UNIX
    }

    // -- Conversions --------------------------------------------------------

    /// Numeric IP text and port of an IPv4/IPv6 value.
    ///
    /// Numeric-only conversion; never touches the network. Fails with
    /// [`AddrError::UnknownAddressFamily`] for non-IP values and
    /// [`AddrError::NotInitialized`] for empty records.
    pub fn ip_unpack(&self) -> Result<(String, u16)> {
        if self.record.is_empty() {
            return Err(AddrError::NotInitialized);
        }
        if !self.is_ip() {
            return Err(AddrError::UnknownAddressFamily(self.afamily()));
        }
        let (host, serv) = gateway::reverse_blocking(
            &self.record,
            libc::NI_NUMERICHOST | libc::NI_NUMERICSERV,
        )?;
        Ok((host, serv.parse().unwrap_or(0)))
    }

    /// The filesystem path of a local-socket value, trailing zero bytes
    /// trimmed.
    pub fn unix_path(&self) -> Result<String> {
        if self.record.is_empty() {
            return Err(AddrError::NotInitialized);
        }
        if !self.is_unix() {
            return Err(AddrError::UnknownAddressFamily(self.afamily()));
        }
        if self.record.len() > record::UNIX_LEN {
            return Err(AddrError::AddressTooLarge {
                len: self.record.len(),
                capacity: record::UNIX_LEN,
            });
        }
        let Some(region) = self.record.path_region() else {
            return Err(AddrError::NotInitialized);
        };
        let end = region.iter().rposition(|&b| b != 0).map_or(0, |i| i + 1);
        Ok(String::from_utf8_lossy(&region[..end]).into_owned())
    }

    /// Converts the record back to textual host and service via the
    /// platform reverse resolver.
    ///
    /// `flags` takes `NI_*` bits; `NI_DGRAM` is added automatically for
    /// datagram values. Suspends while the resolver worker runs.
    pub async fn reverse_lookup(&self, flags: c_int) -> Result<(String, String)> {
        if self.record.is_empty() {
            return Err(AddrError::NotInitialized);
        }
        let mut flags = flags;
        if self.socktype == libc::SOCK_DGRAM {
            flags |= libc::NI_DGRAM;
        }
        gateway::reverse(self.record.clone(), flags).await
    }

    // -- Rendering ----------------------------------------------------------

    /// Human-readable, family-aware rendering.
    ///
    /// Never fails: malformed byte layouts render as descriptive
    /// placeholder text.
    pub fn render(&self) -> String {
        render::render_value(self)
    }
}

impl fmt::Display for AddrValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}

impl fmt::Debug for AddrValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#<AddrValue: {}>", self.render())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_bytes_honors_family_hint() {
        let rec = AddrRecord::pack_ipv4([127, 0, 0, 1], 0);
        let v = AddrValue::from_bytes(rec.as_bytes(), Some(libc::AF_INET6), 0, 0).unwrap();
        assert_eq!(v.pfamily(), libc::AF_INET6);
        assert_eq!(v.afamily(), libc::AF_INET);
    }

    #[test]
    fn from_bytes_falls_back_to_embedded_tag() {
        let rec = AddrRecord::pack_ipv4([127, 0, 0, 1], 0);
        let v = AddrValue::from_bytes(rec.as_bytes(), None, 0, 0).unwrap();
        assert_eq!(v.pfamily(), libc::AF_INET);
    }

    #[test]
    fn from_bytes_rejects_oversize() {
        let big = vec![0u8; record::CAPACITY + 16];
        let err = AddrValue::from_bytes(&big, None, 0, 0).unwrap_err();
        assert!(matches!(err, AddrError::AddressTooLarge { .. }));
    }

    #[test]
    fn to_bytes_roundtrips_the_construction_prefix() {
        let rec = AddrRecord::pack_ipv4([10, 1, 2, 3], 443);
        let v = AddrValue::from_bytes(rec.as_bytes(), None, libc::SOCK_STREAM, 0).unwrap();
        assert_eq!(v.to_bytes(), rec.as_bytes());
    }

    #[test]
    fn local_path_roundtrip() {
        let v = AddrValue::from_local_path("/tmp/render.sock").unwrap();
        assert!(v.is_unix());
        assert_eq!(v.socktype(), libc::SOCK_STREAM);
        assert_eq!(v.unix_path().unwrap(), "/tmp/render.sock");
    }

    #[test]
    fn local_path_too_long() {
        let long = "p".repeat(record::UNIX_PATH_CAPACITY);
        let err = AddrValue::from_local_path(&long).unwrap_err();
        assert!(matches!(err, AddrError::PathTooLong { .. }));
    }

    #[test]
    fn unix_path_on_ip_value_is_a_family_error() {
        let rec = AddrRecord::pack_ipv4([127, 0, 0, 1], 0);
        let v = AddrValue::from_bytes(rec.as_bytes(), None, 0, 0).unwrap();
        assert!(matches!(
            v.unix_path(),
            Err(AddrError::UnknownAddressFamily(_))
        ));
    }

    #[test]
    fn ip_unpack_numeric() {
        let rec = AddrRecord::pack_ipv4([127, 0, 0, 1], 8080);
        let v = AddrValue::from_bytes(rec.as_bytes(), None, 0, 0).unwrap();
        assert_eq!(v.ip_unpack().unwrap(), ("127.0.0.1".to_owned(), 8080));
    }

    #[test]
    fn empty_value_operations_report_not_initialized() {
        let v = AddrValue::from_bytes(&[], None, 0, 0).unwrap();
        assert!(matches!(v.ip_unpack(), Err(AddrError::NotInitialized)));
        assert!(matches!(v.unix_path(), Err(AddrError::NotInitialized)));
    }

    #[test]
    fn predicates() {
        let v4 = AddrValue::from_bytes(
            AddrRecord::pack_ipv4([1, 2, 3, 4], 0).as_bytes(),
            None,
            0,
            0,
        )
        .unwrap();
        assert!(v4.is_ip() && v4.is_ipv4() && !v4.is_ipv6() && !v4.is_unix());
        let un = AddrValue::from_local_path("/tmp/x").unwrap();
        assert!(un.is_unix() && !un.is_ip());
    }
}
