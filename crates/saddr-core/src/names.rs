//! Constant name tables for address families, socket types, and protocols.
//!
//! Used by rendering to label the numeric values embedded in a record.
//! The tables cover the families this crate can interpret plus the common
//! platform extras; anything else renders as a numeric placeholder.

use std::ffi::c_int;

// ---------------------------------------------------------------------------
// Address families
// ---------------------------------------------------------------------------

/// Returns the `AF_*` constant name for an address family, if known.
pub fn family_name(af: c_int) -> Option<&'static str> {
    match af {
        libc::AF_UNSPEC => Some("AF_UNSPEC"),
        libc::AF_UNIX => Some("AF_UNIX"),
        libc::AF_INET => Some("AF_INET"),
        libc::AF_INET6 => Some("AF_INET6"),
        #[cfg(any(target_os = "linux", target_os = "android"))]
        libc::AF_NETLINK => Some("AF_NETLINK"),
        #[cfg(any(target_os = "linux", target_os = "android"))]
        libc::AF_PACKET => Some("AF_PACKET"),
        #[cfg(any(
            target_vendor = "apple",
            target_os = "freebsd",
            target_os = "netbsd",
            target_os = "openbsd",
            target_os = "dragonfly"
        ))]
        libc::AF_LINK => Some("AF_LINK"),
        _ => None,
    }
}

/// Returns the `PF_*` constant name for a protocol family, if known.
///
/// Protocol families share their numeric values with address families;
/// only the rendered prefix differs.
pub fn protocol_family_name(pf: c_int) -> Option<&'static str> {
    match pf {
        libc::AF_UNSPEC => Some("PF_UNSPEC"),
        libc::AF_UNIX => Some("PF_UNIX"),
        libc::AF_INET => Some("PF_INET"),
        libc::AF_INET6 => Some("PF_INET6"),
        #[cfg(any(target_os = "linux", target_os = "android"))]
        libc::AF_NETLINK => Some("PF_NETLINK"),
        #[cfg(any(target_os = "linux", target_os = "android"))]
        libc::AF_PACKET => Some("PF_PACKET"),
        #[cfg(any(
            target_vendor = "apple",
            target_os = "freebsd",
            target_os = "netbsd",
            target_os = "openbsd",
            target_os = "dragonfly"
        ))]
        libc::AF_LINK => Some("PF_LINK"),
        _ => None,
    }
}

// ---------------------------------------------------------------------------
// Socket types
// ---------------------------------------------------------------------------

/// Returns the `SOCK_*` constant name for a socket type, if known.
pub fn socktype_name(socktype: c_int) -> Option<&'static str> {
    match socktype {
        libc::SOCK_STREAM => Some("SOCK_STREAM"),
        libc::SOCK_DGRAM => Some("SOCK_DGRAM"),
        libc::SOCK_RAW => Some("SOCK_RAW"),
        libc::SOCK_SEQPACKET => Some("SOCK_SEQPACKET"),
        _ => None,
    }
}

// ---------------------------------------------------------------------------
// IP protocols
// ---------------------------------------------------------------------------

/// Returns the `IPPROTO_*` constant name for an IP protocol, if known.
pub fn ipproto_name(protocol: c_int) -> Option<&'static str> {
    match protocol {
        libc::IPPROTO_ICMP => Some("IPPROTO_ICMP"),
        libc::IPPROTO_TCP => Some("IPPROTO_TCP"),
        libc::IPPROTO_UDP => Some("IPPROTO_UDP"),
        libc::IPPROTO_ICMPV6 => Some("IPPROTO_ICMPV6"),
        libc::IPPROTO_RAW => Some("IPPROTO_RAW"),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ---- family_name ----

    #[test]
    fn family_name_known() {
        assert_eq!(family_name(libc::AF_INET), Some("AF_INET"));
        assert_eq!(family_name(libc::AF_INET6), Some("AF_INET6"));
        assert_eq!(family_name(libc::AF_UNIX), Some("AF_UNIX"));
        assert_eq!(family_name(libc::AF_UNSPEC), Some("AF_UNSPEC"));
    }

    #[test]
    fn family_name_unknown() {
        assert_eq!(family_name(4242), None);
        assert_eq!(family_name(-1), None);
    }

    // ---- protocol_family_name ----

    #[test]
    fn protocol_family_uses_pf_prefix() {
        assert_eq!(protocol_family_name(libc::AF_INET), Some("PF_INET"));
        assert_eq!(protocol_family_name(libc::AF_UNIX), Some("PF_UNIX"));
    }

    // ---- socktype_name / ipproto_name ----

    #[test]
    fn socktype_name_known_and_unknown() {
        assert_eq!(socktype_name(libc::SOCK_STREAM), Some("SOCK_STREAM"));
        assert_eq!(socktype_name(libc::SOCK_DGRAM), Some("SOCK_DGRAM"));
        assert_eq!(socktype_name(999), None);
    }

    #[test]
    fn ipproto_name_known_and_unknown() {
        assert_eq!(ipproto_name(libc::IPPROTO_TCP), Some("IPPROTO_TCP"));
        assert_eq!(ipproto_name(libc::IPPROTO_UDP), Some("IPPROTO_UDP"));
        assert_eq!(ipproto_name(254), None);
    }
}
