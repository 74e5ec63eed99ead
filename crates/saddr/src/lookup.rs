//! Forward-resolution requests.
//!
//! A [`Lookup`] collects one resolution request, node and service plus
//! hint fields, and finishes it with [`Lookup::all`] or
//! [`Lookup::first`]. Input coercion happens before any resolver call,
//! and the symbolic request text is retained as the inspect name only
//! when it adds information over the numeric form of the first result.

use std::ffi::{CString, c_int};

use tracing::debug;

use saddr_core::coerce::{self, NodeInput, ServiceInput};
use saddr_core::error::AddrError;
use saddr_core::record::AddrRecord;

use crate::gateway::{self, Hints, RawResult};
use crate::value::AddrValue;
use crate::Result;

// ---------------------------------------------------------------------------
// Lookup builder
// ---------------------------------------------------------------------------

/// One forward-resolution request.
///
/// All hint fields default to "unconstrained" (zero). Socket-type
/// inference is on by default: a request with no socket type and a
/// purely numeric service is probed as datagram, which keeps resolvers
/// from rejecting a portless numeric query.
#[derive(Debug, Clone)]
pub struct Lookup {
    node: Option<NodeInput>,
    service: Option<ServiceInput>,
    family: c_int,
    socktype: c_int,
    protocol: c_int,
    flags: c_int,
    infer_socktype: bool,
}

impl Lookup {
    pub fn new() -> Self {
        Lookup {
            node: None,
            service: None,
            family: libc::AF_UNSPEC,
            socktype: 0,
            protocol: 0,
            flags: 0,
            infer_socktype: true,
        }
    }

    /// The node (host) to resolve.
    pub fn node(mut self, node: impl Into<NodeInput>) -> Self {
        self.node = Some(node.into());
        self
    }

    /// The service (port) to resolve.
    pub fn service(mut self, service: impl Into<ServiceInput>) -> Self {
        self.service = Some(service.into());
        self
    }

    /// Restricts results to one address family (`AF_*`).
    pub fn family(mut self, family: c_int) -> Self {
        self.family = family;
        self
    }

    /// Restricts results to one socket type (`SOCK_*`).
    pub fn socktype(mut self, socktype: c_int) -> Self {
        self.socktype = socktype;
        self
    }

    /// Restricts results to one protocol (`IPPROTO_*`).
    pub fn protocol(mut self, protocol: c_int) -> Self {
        self.protocol = protocol;
        self
    }

    /// Extra `AI_*` flag bits, ORed with the coercion-derived ones.
    pub fn flags(mut self, flags: c_int) -> Self {
        self.flags = flags;
        self
    }

    /// Disables (or re-enables) datagram inference for numeric services.
    pub fn infer_socktype(mut self, infer: bool) -> Self {
        self.infer_socktype = infer;
        self
    }

    /// Resolves and returns every result.
    pub async fn all(self) -> Result<Vec<AddrValue>> {
        let (results, inspectname) = self.run().await?;
        Ok(results
            .into_iter()
            .map(|r| {
                AddrValue::new(
                    r.record,
                    r.family,
                    r.socktype,
                    r.protocol,
                    r.canonname,
                    inspectname.clone(),
                )
            })
            .collect())
    }

    /// Resolves and returns the first result only.
    pub async fn first(self) -> Result<AddrValue> {
        let (mut results, inspectname) = self.run().await?;
        let r = results.swap_remove(0);
        Ok(AddrValue::new(
            r.record,
            r.family,
            r.socktype,
            r.protocol,
            r.canonname,
            inspectname,
        ))
    }

    /// Coerces the inputs, runs the forward resolver, and computes the
    /// shared inspect name against the first result.
    async fn run(self) -> Result<(Vec<RawResult>, Option<String>)> {
        let coerced = coerce::coerce(self.node.as_ref(), self.service.as_ref())?;

        let mut hints = Hints {
            family: self.family,
            socktype: self.socktype,
            protocol: self.protocol,
            flags: self.flags | coerced.extra_flags,
        };
        if self.infer_socktype
            && hints.socktype == 0
            && coerced.service.as_deref().is_some_and(coerce::is_numeric)
        {
            debug!("numeric service with no socktype, probing as datagram");
            hints.socktype = libc::SOCK_DGRAM;
        }

        // Coercion already rejected embedded NULs.
        let node_c = match coerced.node {
            Some(s) => Some(
                CString::new(s).map_err(|_| AddrError::InvalidHostname("NUL byte in hostname"))?,
            ),
            None => None,
        };
        let service_c = match coerced.service {
            Some(s) => Some(
                CString::new(s)
                    .map_err(|_| AddrError::InvalidHostname("NUL byte in service name"))?,
            ),
            None => None,
        };

        let results = gateway::forward(node_c, service_c, hints).await?;
        if results.is_empty() {
            return Err(host_not_found());
        }
        let inspectname = make_inspectname(
            self.node.as_ref(),
            self.service.as_ref(),
            &results[0].record,
        )
        .await;
        Ok((results, inspectname))
    }
}

impl Default for Lookup {
    fn default() -> Self {
        Lookup::new()
    }
}

fn host_not_found() -> AddrError {
    AddrError::ResolutionFailed {
        code: libc::EAI_NONAME,
        operation: "getaddrinfo",
        message: "host not found".to_owned(),
    }
}

// ---------------------------------------------------------------------------
// Inspect-name policy
// ---------------------------------------------------------------------------

/// Keeps the symbolic request text, with parts already shown by the
/// numeric address:port rendering dropped.
///
/// A textual node equal to the numeric host is dropped; a service is
/// dropped when its text equals the numeric service or, for a port
/// number, when the numeric service parses back to the same port. A
/// packed (integer) node is never retained. When the numeric reverse
/// conversion itself fails, the request text is kept as-is.
async fn make_inspectname(
    node: Option<&NodeInput>,
    service: Option<&ServiceInput>,
    first: &AddrRecord,
) -> Option<String> {
    let mut node_text = match node {
        Some(NodeInput::Text(s)) => Some(s.as_str()),
        _ => None,
    };
    let mut service = service;

    if let Ok((numeric_host, numeric_serv)) = gateway::reverse(
        first.clone(),
        libc::NI_NUMERICHOST | libc::NI_NUMERICSERV,
    )
    .await
    {
        if node_text == Some(numeric_host.as_str()) {
            node_text = None;
        }
        match service {
            Some(ServiceInput::Name(name)) if *name == numeric_serv => service = None,
            Some(ServiceInput::Port(port)) if numeric_serv.parse() == Ok(*port) => {
                service = None;
            }
            _ => {}
        }
    }

    let mut out = node_text.map(str::to_owned);
    match service {
        Some(ServiceInput::Name(name)) => {
            let suffix = format!(":{name}");
            match &mut out {
                Some(s) => s.push_str(&suffix),
                None => out = Some(suffix),
            }
        }
        Some(ServiceInput::Port(port)) if *port != 0 => {
            let suffix = format!(":{port}");
            match &mut out {
                Some(s) => s.push_str(&suffix),
                None => out = Some(suffix),
            }
        }
        _ => {}
    }
    out
}

// ---------------------------------------------------------------------------
// Convenience constructors
// ---------------------------------------------------------------------------

impl AddrValue {
    /// First stream/TCP address for `node` and `service`.
    pub async fn tcp(
        node: impl Into<NodeInput>,
        service: impl Into<ServiceInput>,
    ) -> Result<Self> {
        Lookup::new()
            .node(node)
            .service(service)
            .socktype(libc::SOCK_STREAM)
            .protocol(libc::IPPROTO_TCP)
            .first()
            .await
    }

    /// First datagram/UDP address for `node` and `service`.
    pub async fn udp(
        node: impl Into<NodeInput>,
        service: impl Into<ServiceInput>,
    ) -> Result<Self> {
        Lookup::new()
            .node(node)
            .service(service)
            .socktype(libc::SOCK_DGRAM)
            .protocol(libc::IPPROTO_UDP)
            .first()
            .await
    }

    /// First address for `node` alone, socket type and protocol cleared.
    pub async fn ip(node: impl Into<NodeInput>) -> Result<Self> {
        let first = Lookup::new().node(node).first().await?;
        let pfamily = first.pfamily();
        let canonname = first.canonname().map(str::to_owned);
        let inspectname = first.inspectname().map(str::to_owned);
        Ok(AddrValue::new(
            first.record().clone(),
            pfamily,
            0,
            0,
            canonname,
            inspectname,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ---- builder ----

    #[test]
    fn defaults_are_unconstrained() {
        let l = Lookup::new();
        assert_eq!(l.family, libc::AF_UNSPEC);
        assert_eq!(l.socktype, 0);
        assert_eq!(l.protocol, 0);
        assert_eq!(l.flags, 0);
        assert!(l.infer_socktype);
        assert!(l.node.is_none());
        assert!(l.service.is_none());
    }

    // ---- make_inspectname ----

    #[tokio::test]
    async fn fully_numeric_request_keeps_nothing() {
        let rec = AddrRecord::pack_ipv4([127, 0, 0, 1], 80);
        let name = make_inspectname(
            Some(&NodeInput::from("127.0.0.1")),
            Some(&ServiceInput::Port(80)),
            &rec,
        )
        .await;
        assert_eq!(name, None);
    }

    #[tokio::test]
    async fn symbolic_node_is_kept_and_numeric_port_dropped() {
        let rec = AddrRecord::pack_ipv4([127, 0, 0, 1], 80);
        let name = make_inspectname(
            Some(&NodeInput::from("localhost")),
            Some(&ServiceInput::Port(80)),
            &rec,
        )
        .await;
        assert_eq!(name.as_deref(), Some("localhost"));
    }

    #[tokio::test]
    async fn symbolic_service_is_kept_without_node() {
        let rec = AddrRecord::pack_ipv4([127, 0, 0, 1], 80);
        let name = make_inspectname(None, Some(&ServiceInput::from("http")), &rec).await;
        assert_eq!(name.as_deref(), Some(":http"));
    }

    #[tokio::test]
    async fn symbolic_node_and_service_join() {
        let rec = AddrRecord::pack_ipv4([127, 0, 0, 1], 80);
        let name = make_inspectname(
            Some(&NodeInput::from("localhost")),
            Some(&ServiceInput::from("http")),
            &rec,
        )
        .await;
        assert_eq!(name.as_deref(), Some("localhost:http"));
    }

    #[tokio::test]
    async fn packed_node_is_never_kept() {
        let rec = AddrRecord::pack_ipv4([127, 0, 0, 1], 0);
        let name = make_inspectname(Some(&NodeInput::Packed(0x7f000001)), None, &rec).await;
        assert_eq!(name, None);
    }

    #[tokio::test]
    async fn zero_port_is_not_appended() {
        let rec = AddrRecord::pack_ipv4([192, 0, 2, 1], 0);
        let name = make_inspectname(
            Some(&NodeInput::from("example.net")),
            Some(&ServiceInput::Port(0)),
            &rec,
        )
        .await;
        assert_eq!(name.as_deref(), Some("example.net"));
    }
}
