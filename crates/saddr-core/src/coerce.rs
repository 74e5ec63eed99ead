//! Coercion of caller-supplied host and service inputs into resolver text.
//!
//! Callers may name an endpoint several ways: a symbolic hostname, a
//! packed 32-bit address, a sentinel token, a port number, or a service
//! name. This module normalizes all of them to the canonical string
//! arguments the platform resolver expects, and records which inputs are
//! already numeric so the resolver can skip name lookups for them.
//!
//! All validation happens here, before any resolver call: length ceilings,
//! the trailing-newline injection guard, and embedded NUL bytes.

use std::ffi::c_int;
use std::net::Ipv4Addr;

use crate::error::AddrError;

// ---------------------------------------------------------------------------
// Limits and sentinel tokens
// ---------------------------------------------------------------------------

/// Resolver host-buffer ceiling (`NI_MAXHOST`).
pub const MAX_HOST: usize = 1025;

/// Resolver service-buffer ceiling (`NI_MAXSERV`).
pub const MAX_SERV: usize = 32;

/// Sentinel host token for the wildcard address.
pub const ANY_TOKEN: &str = "<any>";

/// Sentinel host token for the broadcast address.
pub const BROADCAST_TOKEN: &str = "<broadcast>";

// ---------------------------------------------------------------------------
// Input forms
// ---------------------------------------------------------------------------

/// A caller-supplied host: symbolic text or a packed 32-bit IPv4 address
/// in network byte order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeInput {
    Text(String),
    Packed(u32),
}

impl From<&str> for NodeInput {
    fn from(s: &str) -> Self {
        NodeInput::Text(s.to_owned())
    }
}

impl From<String> for NodeInput {
    fn from(s: String) -> Self {
        NodeInput::Text(s)
    }
}

impl From<u32> for NodeInput {
    fn from(v: u32) -> Self {
        NodeInput::Packed(v)
    }
}

impl From<Ipv4Addr> for NodeInput {
    fn from(addr: Ipv4Addr) -> Self {
        NodeInput::Packed(u32::from(addr))
    }
}

/// A caller-supplied service: a port number or a service name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServiceInput {
    Port(u16),
    Name(String),
}

impl From<u16> for ServiceInput {
    fn from(port: u16) -> Self {
        ServiceInput::Port(port)
    }
}

impl From<&str> for ServiceInput {
    fn from(s: &str) -> Self {
        ServiceInput::Name(s.to_owned())
    }
}

impl From<String> for ServiceInput {
    fn from(s: String) -> Self {
        ServiceInput::Name(s)
    }
}

// ---------------------------------------------------------------------------
// Coercion
// ---------------------------------------------------------------------------

/// Normalized resolver arguments plus the numeric-mode flag bits they
/// force (`AI_NUMERICHOST` / `AI_NUMERICSERV`).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Coerced {
    pub node: Option<String>,
    pub service: Option<String>,
    pub extra_flags: c_int,
}

/// Normalizes host and service inputs for a forward resolution.
pub fn coerce(
    node: Option<&NodeInput>,
    service: Option<&ServiceInput>,
) -> Result<Coerced, AddrError> {
    let mut out = Coerced::default();

    match node {
        None => {}
        Some(NodeInput::Packed(v)) => {
            out.node = Some(Ipv4Addr::from(*v).to_string());
            out.extra_flags |= libc::AI_NUMERICHOST;
        }
        Some(NodeInput::Text(text)) => {
            if text.is_empty() || text == ANY_TOKEN {
                out.node = Some(Ipv4Addr::UNSPECIFIED.to_string());
                out.extra_flags |= libc::AI_NUMERICHOST;
            } else if text == BROADCAST_TOKEN {
                out.node = Some(Ipv4Addr::BROADCAST.to_string());
                out.extra_flags |= libc::AI_NUMERICHOST;
            } else {
                if text.len() >= MAX_HOST {
                    return Err(AddrError::NameTooLong {
                        what: "hostname",
                        len: text.len(),
                        max: MAX_HOST - 1,
                    });
                }
                if text.ends_with('\n') {
                    return Err(AddrError::InvalidHostname(
                        "newline at the end of hostname",
                    ));
                }
                if text.contains('\0') {
                    return Err(AddrError::InvalidHostname("NUL byte in hostname"));
                }
                out.node = Some(text.clone());
            }
        }
    }

    match service {
        None => {}
        Some(ServiceInput::Port(port)) => {
            out.service = Some(port.to_string());
            out.extra_flags |= libc::AI_NUMERICSERV;
        }
        Some(ServiceInput::Name(name)) => {
            if name.len() >= MAX_SERV {
                return Err(AddrError::NameTooLong {
                    what: "service name",
                    len: name.len(),
                    max: MAX_SERV - 1,
                });
            }
            if name.contains('\0') {
                return Err(AddrError::InvalidHostname("NUL byte in service name"));
            }
            out.service = Some(name.clone());
        }
    }

    Ok(out)
}

/// True when `s` is a nonempty run of ASCII digits.
///
/// Drives the socktype-inference rule: an unset socktype with a purely
/// numeric service defaults that probe to datagram semantics.
pub fn is_numeric(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit())
}

#[cfg(test)]
mod tests {
    use super::*;

    // ---- coerce: node ----

    #[test]
    fn absent_node_stays_absent() {
        let c = coerce(None, None).unwrap();
        assert_eq!(c.node, None);
        assert_eq!(c.extra_flags, 0);
    }

    #[test]
    fn packed_node_formats_network_order() {
        let c = coerce(Some(&NodeInput::Packed(0x7f000001)), None).unwrap();
        assert_eq!(c.node.as_deref(), Some("127.0.0.1"));
        assert_eq!(c.extra_flags & libc::AI_NUMERICHOST, libc::AI_NUMERICHOST);
    }

    #[test]
    fn any_token_maps_to_wildcard() {
        for text in ["", ANY_TOKEN] {
            let c = coerce(Some(&NodeInput::from(text)), None).unwrap();
            assert_eq!(c.node.as_deref(), Some("0.0.0.0"));
            assert_ne!(c.extra_flags & libc::AI_NUMERICHOST, 0);
        }
    }

    #[test]
    fn broadcast_token_maps_to_broadcast() {
        let c = coerce(Some(&NodeInput::from(BROADCAST_TOKEN)), None).unwrap();
        assert_eq!(c.node.as_deref(), Some("255.255.255.255"));
        assert_ne!(c.extra_flags & libc::AI_NUMERICHOST, 0);
    }

    #[test]
    fn ordinary_host_passes_verbatim() {
        let c = coerce(Some(&NodeInput::from("example.com")), None).unwrap();
        assert_eq!(c.node.as_deref(), Some("example.com"));
        assert_eq!(c.extra_flags, 0);
    }

    #[test]
    fn overlong_host_is_rejected() {
        let long = "h".repeat(MAX_HOST);
        let err = coerce(Some(&NodeInput::from(long.as_str())), None).unwrap_err();
        assert!(matches!(
            err,
            AddrError::NameTooLong {
                what: "hostname",
                ..
            }
        ));
    }

    #[test]
    fn trailing_newline_is_rejected_before_resolution() {
        let err = coerce(Some(&NodeInput::from("example.com\n")), None).unwrap_err();
        assert!(matches!(err, AddrError::InvalidHostname(_)));
    }

    #[test]
    fn embedded_nul_is_rejected() {
        let err = coerce(Some(&NodeInput::from("exa\0mple")), None).unwrap_err();
        assert!(matches!(err, AddrError::InvalidHostname(_)));
    }

    // ---- coerce: service ----

    #[test]
    fn port_formats_decimal_and_forces_numeric() {
        let c = coerce(None, Some(&ServiceInput::Port(8080))).unwrap();
        assert_eq!(c.service.as_deref(), Some("8080"));
        assert_eq!(c.extra_flags & libc::AI_NUMERICSERV, libc::AI_NUMERICSERV);
    }

    #[test]
    fn service_name_passes_verbatim() {
        let c = coerce(None, Some(&ServiceInput::from("http"))).unwrap();
        assert_eq!(c.service.as_deref(), Some("http"));
        assert_eq!(c.extra_flags, 0);
    }

    #[test]
    fn overlong_service_is_rejected() {
        let long = "s".repeat(MAX_SERV);
        let err = coerce(None, Some(&ServiceInput::from(long.as_str()))).unwrap_err();
        assert!(matches!(
            err,
            AddrError::NameTooLong {
                what: "service name",
                ..
            }
        ));
    }

    // ---- is_numeric ----

    #[test]
    fn numeric_detection() {
        assert!(is_numeric("80"));
        assert!(is_numeric("0"));
        assert!(!is_numeric(""));
        assert!(!is_numeric("http"));
        assert!(!is_numeric("8 0"));
        assert!(!is_numeric("-1"));
    }
}
