//! Human-readable address rendering.
//!
//! Produces the one-line diagnostic form of an [`AddrValue`]: the
//! family-specific address body, then a protocol-family qualifier when
//! it disagrees with the embedded family, the transport shorthand or
//! the raw socket-type/protocol names, the canonical name, and the
//! parenthesized inspect name. Rendering never fails; malformed byte
//! layouts become descriptive placeholder text so the diagnostic path
//! stays usable on any input.

use std::fmt::Write;

use saddr_core::names;
use saddr_core::record::{self, AddrRecord};

use crate::gateway;
use crate::value::AddrValue;

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

pub(crate) fn render_value(value: &AddrValue) -> String {
    let mut out = String::new();
    let record = value.record();

    if record.is_empty() {
        out.push_str("empty-sockaddr");
    } else if record.len() < record::FAMILY_TAG_LEN {
        out.push_str("too-short-sockaddr");
    } else {
        match record.family() {
            libc::AF_INET => render_inet(record, &mut out),
            libc::AF_INET6 => render_inet6(record, &mut out),
            libc::AF_UNIX => render_unix(record, &mut out),
            af => render_unknown(af, &mut out),
        }
    }

    // Protocol-family qualifier, only when it adds information.
    let pfamily = value.pfamily();
    if pfamily != 0 && pfamily != value.afamily() {
        match names::protocol_family_name(pfamily) {
            Some(name) => {
                let _ = write!(out, " {name}");
            }
            None => {
                let _ = write!(out, " PF_???({pfamily})");
            }
        }
    }

    let internet = pfamily == libc::PF_INET || pfamily == libc::PF_INET6;
    let socktype = value.socktype();
    let protocol = value.protocol();
    if internet
        && socktype == libc::SOCK_STREAM
        && (protocol == 0 || protocol == libc::IPPROTO_TCP)
    {
        out.push_str(" TCP");
    } else if internet
        && socktype == libc::SOCK_DGRAM
        && (protocol == 0 || protocol == libc::IPPROTO_UDP)
    {
        out.push_str(" UDP");
    } else {
        if socktype != 0 {
            match names::socktype_name(socktype) {
                Some(name) => {
                    let _ = write!(out, " {name}");
                }
                None => {
                    let _ = write!(out, " SOCK_???({socktype})");
                }
            }
        }
        if protocol != 0 {
            match names::ipproto_name(protocol).filter(|_| internet) {
                Some(name) => {
                    let _ = write!(out, " {name}");
                }
                None => {
                    let _ = write!(out, " UNKNOWN_PROTOCOL({protocol})");
                }
            }
        }
    }

    if let Some(canonname) = value.canonname() {
        let _ = write!(out, " {canonname}");
    }
    if let Some(inspectname) = value.inspectname() {
        let _ = write!(out, " ({inspectname})");
    }

    out
}

// ---------------------------------------------------------------------------
// Family-specific bodies
// ---------------------------------------------------------------------------

fn render_inet(record: &AddrRecord, out: &mut String) {
    let Some([a, b, c, d]) = record.ipv4_octets() else {
        out.push_str("too-short-AF_INET-sockaddr");
        return;
    };
    let _ = write!(out, "{a}.{b}.{c}.{d}");
    if let Some(port) = record.port() {
        if port != 0 {
            let _ = write!(out, ":{port}");
        }
    }
    if record.len() > record::INET_LEN {
        let _ = write!(
            out,
            "(sockaddr {} bytes too long)",
            record.len() - record::INET_LEN
        );
    }
}

/// The numeric IPv6 form comes from the reverse resolver so scope ids
/// are spelled the platform's way.
fn render_inet6(record: &AddrRecord, out: &mut String) {
    if record.len() < record::INET6_LEN {
        out.push_str("too-short-AF_INET6-sockaddr");
        return;
    }
    match gateway::reverse_blocking(record, libc::NI_NUMERICHOST | libc::NI_NUMERICSERV) {
        Err(_) => out.push_str("invalid-AF_INET6-sockaddr"),
        Ok((host, serv)) => {
            if serv == "0" {
                out.push_str(&host);
            } else {
                let _ = write!(out, "[{host}]:{serv}");
            }
            if record.len() > record::INET6_LEN {
                let _ = write!(
                    out,
                    "(sockaddr {} bytes too long)",
                    record.len() - record::INET6_LEN
                );
            }
        }
    }
}

fn render_unix(record: &AddrRecord, out: &mut String) {
    let Some(region) = record.path_region() else {
        out.push_str("too-short-sockaddr");
        return;
    };
    // Record bytes past the path field are reported separately.
    let field = &region[..region.len().min(record::UNIX_PATH_CAPACITY)];
    let end = field.iter().rposition(|&b| b != 0).map_or(0, |i| i + 1);
    let path = &field[..end];

    if path.is_empty() {
        out.push_str("empty-path-AF_UNIX-sockaddr");
    } else if end < field.len() && path.iter().all(|b| b.is_ascii_graphic()) {
        // Printable form requires a zero terminator inside the field;
        // a path running to the region edge is dumped as hex instead.
        if path[0] != b'/' {
            out.push_str("AF_UNIX ");
        }
        out.push_str(&String::from_utf8_lossy(path));
    } else {
        out.push_str("AF_UNIX");
        for b in path {
            let _ = write!(out, ":{b:02x}");
        }
    }

    if record.len() > record::UNIX_LEN {
        let _ = write!(
            out,
            "(sockaddr {} bytes too long)",
            record.len() - record::UNIX_LEN
        );
    }
}

fn render_unknown(af: std::ffi::c_int, out: &mut String) {
    match names::family_name(af) {
        Some(name) => {
            let _ = write!(out, "{name} address format unknown");
        }
        None => {
            let _ = write!(out, "unknown address family {af}");
        }
    }
}
