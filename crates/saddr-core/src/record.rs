//! Fixed-capacity storage for one platform socket-address record.
//!
//! An [`AddrRecord`] holds the raw bytes of a `struct sockaddr` variant in
//! a buffer sized to the largest supported family record
//! (`sockaddr_storage`), with an explicit valid length. Every accessor
//! length-checks before interpreting bytes; nothing past `len` is ever
//! read. The buffer is 8-byte aligned so the resolver gateway can hand it
//! to the platform reverse resolver as-is.

use std::ffi::c_int;
use std::fmt;
use std::mem::size_of;

use crate::error::AddrError;

// ---------------------------------------------------------------------------
// Layout constants
// ---------------------------------------------------------------------------

/// Capacity of the record buffer: the largest supported family record.
pub const CAPACITY: usize = size_of::<libc::sockaddr_storage>();

/// Bytes needed to read the family discriminant at the record head.
pub const FAMILY_TAG_LEN: usize = 2;

/// Minimum length of a full IPv4 record.
pub const INET_LEN: usize = size_of::<libc::sockaddr_in>();

/// Minimum length of a full IPv6 record.
pub const INET6_LEN: usize = size_of::<libc::sockaddr_in6>();

/// Length of a full local-socket record.
pub const UNIX_LEN: usize = size_of::<libc::sockaddr_un>();

/// Offset of the path field inside a local-socket record.
pub const UNIX_PATH_OFFSET: usize = 2;

/// Size of the path field inside a local-socket record.
pub const UNIX_PATH_CAPACITY: usize = UNIX_LEN - UNIX_PATH_OFFSET;

/// Offset of the (big-endian) port field shared by IPv4 and IPv6 records.
const PORT_OFFSET: usize = 2;

/// Offset of the address octets inside an IPv4 record.
const INET_ADDR_OFFSET: usize = 4;

/// Offset of the address octets inside an IPv6 record.
const INET6_ADDR_OFFSET: usize = 8;

fn read_family_tag(buf: &[u8]) -> c_int {
    #[cfg(any(
        target_vendor = "apple",
        target_os = "aix",
        target_os = "freebsd",
        target_os = "netbsd",
        target_os = "openbsd",
        target_os = "dragonfly"
    ))]
    {
        // sa_len-byte layout (BSD lineage, including AIX): a length
        // byte, then a one-byte family.
        buf[1] as c_int
    }
    #[cfg(not(any(
        target_vendor = "apple",
        target_os = "aix",
        target_os = "freebsd",
        target_os = "netbsd",
        target_os = "openbsd",
        target_os = "dragonfly"
    )))]
    {
        u16::from_ne_bytes([buf[0], buf[1]]) as c_int
    }
}

fn write_family_tag(buf: &mut [u8], family: c_int, record_len: usize) {
    #[cfg(any(
        target_vendor = "apple",
        target_os = "aix",
        target_os = "freebsd",
        target_os = "netbsd",
        target_os = "openbsd",
        target_os = "dragonfly"
    ))]
    {
        buf[0] = record_len as u8;
        buf[1] = family as u8;
    }
    #[cfg(not(any(
        target_vendor = "apple",
        target_os = "aix",
        target_os = "freebsd",
        target_os = "netbsd",
        target_os = "openbsd",
        target_os = "dragonfly"
    )))]
    {
        let _ = record_len;
        buf[..FAMILY_TAG_LEN].copy_from_slice(&(family as u16).to_ne_bytes());
    }
}

// ---------------------------------------------------------------------------
// AddrRecord
// ---------------------------------------------------------------------------

/// Raw bytes of one socket-address record plus their valid length.
#[derive(Clone)]
#[repr(align(8))]
pub struct AddrRecord {
    buf: [u8; CAPACITY],
    len: usize,
}

impl AddrRecord {
    /// Copies `bytes` into a fresh record.
    ///
    /// Fails with [`AddrError::AddressTooLarge`] before any copy when the
    /// input exceeds the buffer capacity.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, AddrError> {
        if bytes.len() > CAPACITY {
            return Err(AddrError::AddressTooLarge {
                len: bytes.len(),
                capacity: CAPACITY,
            });
        }
        let mut buf = [0u8; CAPACITY];
        buf[..bytes.len()].copy_from_slice(bytes);
        Ok(AddrRecord {
            buf,
            len: bytes.len(),
        })
    }

    /// Builds a full-size IPv4 record from address octets and a port.
    pub fn pack_ipv4(octets: [u8; 4], port: u16) -> Self {
        let mut buf = [0u8; CAPACITY];
        write_family_tag(&mut buf, libc::AF_INET, INET_LEN);
        buf[PORT_OFFSET..PORT_OFFSET + 2].copy_from_slice(&port.to_be_bytes());
        buf[INET_ADDR_OFFSET..INET_ADDR_OFFSET + 4].copy_from_slice(&octets);
        AddrRecord {
            buf,
            len: INET_LEN,
        }
    }

    /// Builds a full-size IPv6 record from address octets and a port
    /// (flow info and scope id zero).
    pub fn pack_ipv6(octets: [u8; 16], port: u16) -> Self {
        let mut buf = [0u8; CAPACITY];
        write_family_tag(&mut buf, libc::AF_INET6, INET6_LEN);
        buf[PORT_OFFSET..PORT_OFFSET + 2].copy_from_slice(&port.to_be_bytes());
        buf[INET6_ADDR_OFFSET..INET6_ADDR_OFFSET + 16].copy_from_slice(&octets);
        AddrRecord {
            buf,
            len: INET6_LEN,
        }
    }

    /// Builds a full-size local-socket record embedding `path`.
    ///
    /// Fails with [`AddrError::PathTooLong`] when the path does not fit
    /// the platform path field with a terminating zero byte.
    pub fn pack_unix(path: &[u8]) -> Result<Self, AddrError> {
        if path.len() >= UNIX_PATH_CAPACITY {
            return Err(AddrError::PathTooLong {
                len: path.len(),
                max: UNIX_PATH_CAPACITY - 1,
            });
        }
        let mut buf = [0u8; CAPACITY];
        write_family_tag(&mut buf, libc::AF_UNIX, UNIX_LEN);
        buf[UNIX_PATH_OFFSET..UNIX_PATH_OFFSET + path.len()].copy_from_slice(path);
        Ok(AddrRecord {
            buf,
            len: UNIX_LEN,
        })
    }

    /// Usable byte count of the record.
    pub fn len(&self) -> usize {
        self.len
    }

    /// True for a zero-length record.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// The valid record bytes, exactly `len` of them.
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf[..self.len]
    }

    /// The family discriminant at the record head.
    ///
    /// Reads the tag only when the record is long enough to contain it;
    /// otherwise reports `AF_UNSPEC`.
    pub fn family(&self) -> c_int {
        if self.len < FAMILY_TAG_LEN {
            return libc::AF_UNSPEC;
        }
        read_family_tag(&self.buf)
    }

    /// Overwrites the family discriminant in place.
    ///
    /// Used only by resolver emulation policies that repair zero-filled
    /// result records before an address value is constructed.
    pub fn set_family(&mut self, family: c_int) {
        if self.len >= FAMILY_TAG_LEN {
            write_family_tag(&mut self.buf, family, self.len);
        }
    }

    /// The embedded port for IPv4/IPv6 records that carry one.
    pub fn port(&self) -> Option<u16> {
        let family = self.family();
        if (family == libc::AF_INET || family == libc::AF_INET6)
            && self.len >= PORT_OFFSET + 2
        {
            Some(u16::from_be_bytes([
                self.buf[PORT_OFFSET],
                self.buf[PORT_OFFSET + 1],
            ]))
        } else {
            None
        }
    }

    /// The four address octets of a full-size IPv4 record.
    pub fn ipv4_octets(&self) -> Option<[u8; 4]> {
        if self.family() == libc::AF_INET && self.len >= INET_LEN {
            Some([
                self.buf[INET_ADDR_OFFSET],
                self.buf[INET_ADDR_OFFSET + 1],
                self.buf[INET_ADDR_OFFSET + 2],
                self.buf[INET_ADDR_OFFSET + 3],
            ])
        } else {
            None
        }
    }

    /// The path region of a local-socket record, bounded by `len`.
    pub fn path_region(&self) -> Option<&[u8]> {
        if self.family() == libc::AF_UNIX && self.len >= UNIX_PATH_OFFSET {
            Some(&self.buf[UNIX_PATH_OFFSET..self.len])
        } else {
            None
        }
    }
}

impl PartialEq for AddrRecord {
    fn eq(&self, other: &Self) -> bool {
        self.as_bytes() == other.as_bytes()
    }
}

impl Eq for AddrRecord {}

impl fmt::Debug for AddrRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AddrRecord")
            .field("family", &self.family())
            .field("len", &self.len)
            .finish()
    }
}
