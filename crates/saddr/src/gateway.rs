//! Platform resolver gateway.
//!
//! Wraps the libc forward (`getaddrinfo(3)`) and reverse
//! (`getnameinfo(3)`) resolution primitives. Both calls can block on
//! network traffic, so the async entry points submit them to a blocking
//! worker via `tokio::task::spawn_blocking`; the calling task suspends
//! only until the worker completes. Platform quirks (family-probe
//! ordering, zero-filled result records, Apple socktype/protocol gaps)
//! are handled by standalone policy passes applied after the raw call.

use std::ffi::{CStr, CString, c_char, c_int};
use std::ptr;

use tokio::task;
use tracing::{debug, trace};

use saddr_core::coerce::{MAX_HOST, MAX_SERV};
use saddr_core::error::AddrError;
use saddr_core::record::AddrRecord;

use crate::Result;

// ---------------------------------------------------------------------------
// Request and result shapes
// ---------------------------------------------------------------------------

/// Forward-resolution hints (zero means unconstrained).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Hints {
    pub family: c_int,
    pub socktype: c_int,
    pub protocol: c_int,
    pub flags: c_int,
}

/// One forward-resolution result, detached from the platform list.
#[derive(Debug, Clone)]
pub(crate) struct RawResult {
    pub family: c_int,
    pub socktype: c_int,
    pub protocol: c_int,
    pub record: AddrRecord,
    pub canonname: Option<String>,
}

fn gai_error(operation: &'static str, code: c_int) -> AddrError {
    // SAFETY: gai_strerror returns a pointer into a static message table.
    let message = unsafe { CStr::from_ptr(libc::gai_strerror(code)) }
        .to_string_lossy()
        .into_owned();
    AddrError::ResolutionFailed {
        code,
        operation,
        message,
    }
}

fn worker_failure(operation: &'static str, err: task::JoinError) -> AddrError {
    AddrError::ResolutionFailed {
        code: libc::EAI_SYSTEM,
        operation,
        message: format!("resolver worker failed: {err}"),
    }
}

// ---------------------------------------------------------------------------
// Forward resolution
// ---------------------------------------------------------------------------

/// One raw `getaddrinfo` invocation, result list copied out and freed.
fn getaddrinfo_raw(
    node: Option<&CStr>,
    service: Option<&CStr>,
    hints: &Hints,
) -> Result<Vec<RawResult>> {
    // SAFETY: addrinfo is a plain-old-data struct; zero is its
    // conventional "no constraint" state.
    let mut c_hints: libc::addrinfo = unsafe { std::mem::zeroed() };
    c_hints.ai_family = hints.family;
    c_hints.ai_socktype = hints.socktype;
    c_hints.ai_protocol = hints.protocol;
    c_hints.ai_flags = hints.flags;

    let node_ptr = node.map_or(ptr::null(), CStr::as_ptr);
    let service_ptr = service.map_or(ptr::null(), CStr::as_ptr);
    let mut res: *mut libc::addrinfo = ptr::null_mut();

    // SAFETY: node/service are NUL-terminated or null, hints outlives the
    // call, and res receives a list owned by the platform until freed.
    let rc = unsafe { libc::getaddrinfo(node_ptr, service_ptr, &c_hints, &mut res) };
    if rc != 0 {
        return Err(gai_error("getaddrinfo", rc));
    }

    let collected = collect_results(res);
    if !res.is_null() {
        // SAFETY: res came from a successful getaddrinfo and is freed once.
        unsafe { libc::freeaddrinfo(res) };
    }
    collected
}

fn collect_results(head: *mut libc::addrinfo) -> Result<Vec<RawResult>> {
    let mut out = Vec::new();
    let mut cur = head;
    while !cur.is_null() {
        // SAFETY: cur walks the linked list returned by getaddrinfo.
        let ai = unsafe { &*cur };
        let bytes: &[u8] = if ai.ai_addr.is_null() || ai.ai_addrlen == 0 {
            &[]
        } else {
            // SAFETY: ai_addr points at ai_addrlen valid bytes.
            unsafe {
                std::slice::from_raw_parts(ai.ai_addr as *const u8, ai.ai_addrlen as usize)
            }
        };
        let record = AddrRecord::from_bytes(bytes)?;
        let canonname = if ai.ai_canonname.is_null() {
            None
        } else {
            // SAFETY: ai_canonname is a NUL-terminated string when present.
            Some(
                unsafe { CStr::from_ptr(ai.ai_canonname) }
                    .to_string_lossy()
                    .into_owned(),
            )
        };
        out.push(RawResult {
            family: ai.ai_family,
            socktype: ai.ai_socktype,
            protocol: ai.ai_protocol,
            record,
            canonname,
        });
        cur = ai.ai_next;
    }
    Ok(out)
}

#[cfg(all(feature = "lookup-order-inet", not(feature = "lookup-order-inet6")))]
const LOOKUP_ORDER: [c_int; 3] = [libc::AF_INET, libc::AF_INET6, libc::AF_UNSPEC];
#[cfg(all(feature = "lookup-order-inet6", not(feature = "lookup-order-inet")))]
const LOOKUP_ORDER: [c_int; 3] = [libc::AF_INET6, libc::AF_INET, libc::AF_UNSPEC];

/// Forward resolution with the family-probe-order policy applied.
///
/// On platforms where a single unspecified-family query is unreliable,
/// the crate runs a fixed probe order instead: successive single-family
/// queries, accepting the first success, with an unspecified-family probe
/// as the final fallback. The last attempted probe's error is reported.
fn forward_blocking(
    node: Option<&CStr>,
    service: Option<&CStr>,
    hints: &Hints,
) -> Result<Vec<RawResult>> {
    #[cfg(any(feature = "lookup-order-inet", feature = "lookup-order-inet6"))]
    if hints.family == libc::AF_UNSPEC {
        let mut last_err = None;
        for af in LOOKUP_ORDER {
            let mut probe = *hints;
            probe.family = af;
            match getaddrinfo_raw(node, service, &probe) {
                Ok(list) => return Ok(list),
                Err(err) => {
                    if af == libc::AF_UNSPEC {
                        return Err(err);
                    }
                    trace!(family = af, "single-family probe failed, trying next");
                    last_err = Some(err);
                }
            }
        }
        // the order table ends with AF_UNSPEC, so the loop returned above
        return Err(last_err.unwrap_or_else(|| gai_error("getaddrinfo", libc::EAI_FAIL)));
    }
    getaddrinfo_raw(node, service, hints)
}

/// Runs forward resolution on a blocking worker and applies the
/// platform-emulation policies to the result list.
pub(crate) async fn forward(
    node: Option<CString>,
    service: Option<CString>,
    hints: Hints,
) -> Result<Vec<RawResult>> {
    debug!(
        node = ?node,
        service = ?service,
        family = hints.family,
        socktype = hints.socktype,
        flags = hints.flags,
        "forward resolution"
    );
    let results = task::spawn_blocking(move || {
        let mut list = forward_blocking(node.as_deref(), service.as_deref(), &hints)?;
        if cfg!(target_os = "aix") {
            backfill_zero_family(&mut list);
        }
        if cfg!(target_vendor = "apple") {
            backfill_socktype_protocol(&mut list, hints.socktype);
        }
        Ok(list)
    })
    .await
    .map_err(|err| worker_failure("getaddrinfo", err))??;
    trace!(count = results.len(), "forward resolution complete");
    Ok(results)
}

// ---------------------------------------------------------------------------
// Emulation policies
// ---------------------------------------------------------------------------

/// Backfills zero-filled family tags from the result metadata.
///
/// Some resolvers return records whose embedded family field is zero;
/// the surrounding `addrinfo` entry still knows the family. On
/// `sa_len`-byte platforms the rewrite restores the length byte too.
pub(crate) fn backfill_zero_family(results: &mut [RawResult]) {
    for r in results {
        if !r.record.is_empty() && r.record.family() == libc::AF_UNSPEC {
            r.record.set_family(r.family);
        }
    }
}

/// Backfills zero socktype/protocol fields the Apple resolver leaves
/// unset: socktype from the request hint, protocol from the standard
/// transport for the socktype.
pub(crate) fn backfill_socktype_protocol(results: &mut [RawResult], hint_socktype: c_int) {
    for r in results {
        if r.socktype == 0 {
            r.socktype = hint_socktype;
        }
        if r.protocol == 0 {
            if r.socktype == libc::SOCK_DGRAM {
                r.protocol = libc::IPPROTO_UDP;
            } else if r.socktype == libc::SOCK_STREAM {
                r.protocol = libc::IPPROTO_TCP;
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Reverse resolution
// ---------------------------------------------------------------------------

/// One raw `getnameinfo` invocation.
///
/// Synchronous; reserved for numeric-only conversions on diagnostic
/// paths (rendering), which never touch the network. Network-capable
/// reverse lookups go through [`reverse`].
pub(crate) fn reverse_blocking(record: &AddrRecord, flags: c_int) -> Result<(String, String)> {
    let mut host = [0 as c_char; MAX_HOST];
    let mut serv = [0 as c_char; MAX_SERV];
    // SAFETY: the record buffer is aligned for sockaddr access and holds
    // record.len() valid bytes; host/serv are writable NUL-buffers of the
    // advertised sizes.
    let rc = unsafe {
        libc::getnameinfo(
            record.as_bytes().as_ptr() as *const libc::sockaddr,
            record.len() as libc::socklen_t,
            host.as_mut_ptr(),
            host.len() as libc::socklen_t,
            serv.as_mut_ptr(),
            serv.len() as libc::socklen_t,
            flags,
        )
    };
    if rc != 0 {
        return Err(gai_error("getnameinfo", rc));
    }
    // SAFETY: getnameinfo NUL-terminates both buffers on success.
    let host = unsafe { CStr::from_ptr(host.as_ptr()) }
        .to_string_lossy()
        .into_owned();
    let serv = unsafe { CStr::from_ptr(serv.as_ptr()) }
        .to_string_lossy()
        .into_owned();
    Ok((host, serv))
}

/// Runs reverse resolution on a blocking worker.
pub(crate) async fn reverse(record: AddrRecord, flags: c_int) -> Result<(String, String)> {
    debug!(family = record.family(), len = record.len(), flags, "reverse resolution");
    task::spawn_blocking(move || reverse_blocking(&record, flags))
        .await
        .map_err(|err| worker_failure("getnameinfo", err))?
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(family: c_int, socktype: c_int, protocol: c_int) -> RawResult {
        RawResult {
            family,
            socktype,
            protocol,
            record: AddrRecord::pack_ipv4([127, 0, 0, 1], 0),
            canonname: None,
        }
    }

    // ---- backfill_zero_family ----

    #[test]
    fn zero_family_is_repaired_from_metadata() {
        let mut rec = AddrRecord::pack_ipv4([10, 0, 0, 1], 0);
        rec.set_family(libc::AF_UNSPEC);
        let mut results = vec![RawResult {
            family: libc::AF_INET,
            socktype: libc::SOCK_STREAM,
            protocol: 0,
            record: rec,
            canonname: None,
        }];
        backfill_zero_family(&mut results);
        assert_eq!(results[0].record.family(), libc::AF_INET);
    }

    #[test]
    fn populated_family_is_left_alone() {
        let mut results = vec![result(libc::AF_INET6, 0, 0)];
        backfill_zero_family(&mut results);
        assert_eq!(results[0].record.family(), libc::AF_INET);
    }

    // ---- backfill_socktype_protocol ----

    #[test]
    fn apple_backfill_fills_socktype_from_hint() {
        let mut results = vec![result(libc::AF_INET, 0, 0)];
        backfill_socktype_protocol(&mut results, libc::SOCK_STREAM);
        assert_eq!(results[0].socktype, libc::SOCK_STREAM);
        assert_eq!(results[0].protocol, libc::IPPROTO_TCP);
    }

    #[test]
    fn apple_backfill_maps_datagram_to_udp() {
        let mut results = vec![result(libc::AF_INET, libc::SOCK_DGRAM, 0)];
        backfill_socktype_protocol(&mut results, 0);
        assert_eq!(results[0].protocol, libc::IPPROTO_UDP);
    }

    #[test]
    fn apple_backfill_keeps_existing_fields() {
        let mut results = vec![result(libc::AF_INET, libc::SOCK_RAW, libc::IPPROTO_ICMP)];
        backfill_socktype_protocol(&mut results, libc::SOCK_STREAM);
        assert_eq!(results[0].socktype, libc::SOCK_RAW);
        assert_eq!(results[0].protocol, libc::IPPROTO_ICMP);
    }

    // ---- reverse_blocking ----

    #[test]
    fn numeric_reverse_of_packed_ipv4() {
        let rec = AddrRecord::pack_ipv4([127, 0, 0, 1], 80);
        let (host, serv) =
            reverse_blocking(&rec, libc::NI_NUMERICHOST | libc::NI_NUMERICSERV).unwrap();
        assert_eq!(host, "127.0.0.1");
        assert_eq!(serv, "80");
    }

    #[test]
    fn reverse_of_empty_record_fails() {
        let rec = AddrRecord::from_bytes(&[]).unwrap();
        let err = reverse_blocking(&rec, libc::NI_NUMERICHOST).unwrap_err();
        assert!(matches!(err, AddrError::ResolutionFailed { .. }));
    }
}
