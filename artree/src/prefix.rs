//! Compressed path prefixes.
//!
//! An inner node skips over the bytes every key beneath it has in common. Only the first
//! [`MAX_PREFIX_LEN`] of those bytes are kept inline; the logical length is tracked separately
//! and the rest can be recovered from any leaf below the node.

/// Number of prefix bytes stored inline in an inner node.
pub const MAX_PREFIX_LEN: usize = 10;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Prefix {
    stored: [u8; MAX_PREFIX_LEN],
    len: usize,
}

impl Prefix {
    /// A prefix of logical length `len` whose leading bytes are taken from `bytes`.
    ///
    /// `bytes` must hold at least `min(len, MAX_PREFIX_LEN)` bytes.
    pub fn new(bytes: &[u8], len: usize) -> Self {
        let n = len.min(MAX_PREFIX_LEN);
        let mut stored = [0; MAX_PREFIX_LEN];
        stored[..n].copy_from_slice(&bytes[..n]);
        Self { stored, len }
    }

    pub fn from_slice(bytes: &[u8]) -> Self {
        Self::new(bytes, bytes.len())
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// The inline bytes; shorter than `len()` when the prefix is truncated.
    #[inline]
    pub fn stored(&self) -> &[u8] {
        &self.stored[..self.len.min(MAX_PREFIX_LEN)]
    }

    #[inline]
    pub fn is_truncated(&self) -> bool {
        self.len > MAX_PREFIX_LEN
    }

    /// Number of leading stored bytes equal to `key[depth..]`.
    pub fn matched_stored(&self, key: &[u8], depth: usize) -> usize {
        let rest = key.get(depth..).unwrap_or_default();
        self.stored()
            .iter()
            .zip(rest)
            .take_while(|(a, b)| a == b)
            .count()
    }

    /// Whether every stored byte matches `key` at `depth`. Bytes beyond the stored bound are
    /// not checked.
    #[inline]
    pub fn matches_stored(&self, key: &[u8], depth: usize) -> bool {
        self.matched_stored(key, depth) == self.stored().len()
    }

    /// The prefix a child ends up with when its parent collapses into it: the parent's prefix,
    /// the edge byte that led to the child, then the child's own prefix.
    pub fn join(&self, edge: u8, child: &Prefix) -> Prefix {
        let len = self.len + 1 + child.len;
        if self.is_truncated() {
            return Prefix::new(&self.stored, len);
        }

        let mut bytes = [0; MAX_PREFIX_LEN];
        let mut n = self.len;
        bytes[..n].copy_from_slice(self.stored());
        if n < MAX_PREFIX_LEN {
            bytes[n] = edge;
            n += 1;
        }
        let take = child.stored().len().min(MAX_PREFIX_LEN - n);
        bytes[n..n + take].copy_from_slice(&child.stored()[..take]);
        Prefix::new(&bytes, len)
    }
}
