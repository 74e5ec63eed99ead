//! Error taxonomy for address construction and resolution.
//!
//! Every failure is distinguishable by variant, not message text: callers
//! branch on "bad input" vs "too long" vs "resolver said no". Input
//! validation errors are produced before any resolver call or buffer
//! write, so no partially-built value ever escapes.

use thiserror::Error;

/// Errors produced while building or resolving socket addresses.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum AddrError {
    /// A raw address record larger than the fixed storage capacity.
    #[error("sockaddr string too big ({len} bytes, capacity {capacity})")]
    AddressTooLarge { len: usize, capacity: usize },

    /// A host or service string at or above the resolver's buffer ceiling.
    #[error("{what} too long ({len} bytes, max {max})")]
    NameTooLong {
        what: &'static str,
        len: usize,
        max: usize,
    },

    /// A host or service string the resolver must never see.
    #[error("invalid hostname: {0}")]
    InvalidHostname(&'static str),

    /// A local-socket path that does not fit the platform path field.
    #[error("too long unix socket path ({len} bytes, max {max})")]
    PathTooLong { len: usize, max: usize },

    /// An operation that needs a specific address family got another one.
    #[error("unknown address family: {0}")]
    UnknownAddressFamily(i32),

    /// The platform resolver reported a nonzero status.
    #[error("{operation} failed: {message} (error {code})")]
    ResolutionFailed {
        code: i32,
        operation: &'static str,
        message: String,
    },

    /// An operation was invoked on an empty (never-initialized) record.
    #[error("uninitialized socket address")]
    NotInitialized,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_carries_operation_and_code() {
        let err = AddrError::ResolutionFailed {
            code: -2,
            operation: "getaddrinfo",
            message: "Name or service not known".into(),
        };
        let text = err.to_string();
        assert!(text.starts_with("getaddrinfo failed:"));
        assert!(text.contains("-2"));
    }

    #[test]
    fn variants_are_distinguishable() {
        let too_large = AddrError::AddressTooLarge {
            len: 200,
            capacity: 128,
        };
        assert!(matches!(too_large, AddrError::AddressTooLarge { .. }));
        assert!(!matches!(too_large, AddrError::PathTooLong { .. }));
    }
}
