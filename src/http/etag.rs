//! Entity tags for change detection.
//!
//! A 31-multiplier polynomial hash over the characters of the inputs,
//! wrapping at 32 bits, rendered as 8 lowercase hex digits in quotes. It is
//! not collision-resistant and does not need to be: clients only compare
//! it against the value they were handed last time.

use core::fmt::{self, Write};

use crate::identity::NetworkIdentity;

/// `"` + 8 hex digits + `"`.
pub const ETAG_LEN: usize = 10;

/// Fold `s` into `seed`. Chaining calls is the same as hashing the
/// concatenation.
pub fn rolling_hash(seed: u32, s: &str) -> u32 {
    s.chars()
        .fold(seed, |h, c| h.wrapping_mul(31).wrapping_add(c as u32))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ETag(heapless::String<ETAG_LEN>);

impl ETag {
    pub fn from_hash(hash: u32) -> Self {
        let mut s = heapless::String::new();
        // 10 bytes always fit.
        let _ = write!(s, "\"{:08x}\"", hash);
        Self(s)
    }

    /// Hash of the identity fields in the order ip, mac, ssid, hostname.
    pub fn for_identity(id: &NetworkIdentity) -> Self {
        let h = [id.ip(), id.mac(), id.ssid(), id.hostname()]
            .into_iter()
            .fold(0, rolling_hash);
        Self::from_hash(h)
    }

    pub fn for_content(body: &str) -> Self {
        Self::from_hash(rolling_hash(0, body))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Exact comparison against an `If-None-Match` value. Anything else,
    /// including `*`, weak tags and lists, is a miss.
    pub fn matches(&self, if_none_match: Option<&str>) -> bool {
        if_none_match == Some(self.as_str())
    }
}

impl fmt::Display for ETag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
