//! A queue of immutable byte slices supporting O(1) append and cheap
//! prefix extraction, without ever flattening the underlying segments.
//!
//! Backed by `bytes::Bytes` segments in a `VecDeque`, holding reference-counted
//! buffers instead of copying on every append.

use std::collections::VecDeque;
use std::fmt;

use bytes::Bytes;

/// Bytes requested by a `split_prefix` or read that the buffer could not
/// satisfy. Carries the shortfall: how many more bytes are needed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Underflow(pub usize);

/// An ordered sequence of byte segments plus a cached total length.
#[derive(Clone, Default)]
pub struct ChunkedBytes {
    segments: VecDeque<Bytes>,
    len: usize,
}

impl ChunkedBytes {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a byte slice. O(1) amortised; copies the slice into an owned
    /// segment since the caller may reuse or drop its buffer.
    pub fn append_slice(&mut self, slice: &[u8]) {
        if slice.is_empty() {
            return;
        }
        self.len += slice.len();
        self.segments.push_back(Bytes::copy_from_slice(slice));
    }

    /// Appends another `ChunkedBytes`, moving its segments without copying.
    pub fn append(&mut self, mut other: ChunkedBytes) {
        self.len += other.len;
        self.segments.append(&mut other.segments);
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Splits off the first `n` bytes as a new `ChunkedBytes`, retaining the
    /// rest in `self`. On underflow, `self` is left unchanged.
    pub fn split_prefix(&mut self, n: usize) -> Result<ChunkedBytes, Underflow> {
        if n > self.len {
            return Err(Underflow(n - self.len));
        }

        let mut prefix = ChunkedBytes::new();
        let mut remaining = n;

        while remaining > 0 {
            let mut seg = self
                .segments
                .pop_front()
                .expect("len invariant guarantees enough segments");
            if seg.len() <= remaining {
                remaining -= seg.len();
                prefix.len += seg.len();
                prefix.segments.push_back(seg);
            } else {
                let tail = seg.split_off(remaining);
                prefix.len += seg.len();
                prefix.segments.push_back(seg);
                self.segments.push_front(tail);
                remaining = 0;
            }
        }

        self.len -= n;
        Ok(prefix)
    }

    /// Returns `n` zero bytes as a fresh `ChunkedBytes`.
    pub fn zero_fill(n: usize) -> ChunkedBytes {
        let mut out = ChunkedBytes::new();
        if n > 0 {
            out.len = n;
            out.segments.push_back(Bytes::from(vec![0u8; n]));
        }
        out
    }

    /// Returns a `ChunkedBytes` of exactly `n` bytes: `self` truncated if
    /// longer, zero-padded if shorter.
    pub fn pad_or_truncate_to(mut self, n: usize) -> ChunkedBytes {
        if self.len >= n {
            self.split_prefix(n).expect("len >= n checked above")
        } else {
            let shortfall = n - self.len;
            self.append(ChunkedBytes::zero_fill(shortfall));
            self
        }
    }

    /// Materialises the queue into a single contiguous buffer.
    pub fn to_vec(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.len);
        for seg in &self.segments {
            out.extend_from_slice(seg);
        }
        out
    }

    /// Iterates the underlying segments without copying.
    pub fn iter_slices(&self) -> impl Iterator<Item = &[u8]> {
        self.segments.iter().map(|b| b.as_ref())
    }
}

impl PartialEq for ChunkedBytes {
    fn eq(&self, other: &Self) -> bool {
        if self.len != other.len {
            return false;
        }
        // Compare without requiring identical segmentation.
        let mut a = self.iter_slices().peekable();
        let mut b = other.iter_slices().peekable();
        let (mut ai, mut bi) = (0usize, 0usize);
        loop {
            match (a.peek(), b.peek()) {
                (None, None) => return true,
                (None, Some(_)) | (Some(_), None) => return false,
                (Some(sa), Some(sb)) => {
                    let ra = &sa[ai..];
                    let rb = &sb[bi..];
                    let n = ra.len().min(rb.len());
                    if ra[..n] != rb[..n] {
                        return false;
                    }
                    ai += n;
                    bi += n;
                    if ai == sa.len() {
                        a.next();
                        ai = 0;
                    }
                    if bi == sb.len() {
                        b.next();
                        bi = 0;
                    }
                }
            }
        }
    }
}

impl Eq for ChunkedBytes {}

impl fmt::Debug for ChunkedBytes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChunkedBytes")
            .field("len", &self.len)
            .field("segments", &self.segments.len())
            .finish()
    }
}

impl From<&[u8]> for ChunkedBytes {
    fn from(slice: &[u8]) -> Self {
        let mut c = ChunkedBytes::new();
        c.append_slice(slice);
        c
    }
}

impl From<Vec<u8>> for ChunkedBytes {
    fn from(v: Vec<u8>) -> Self {
        let mut c = ChunkedBytes::new();
        c.len = v.len();
        if !v.is_empty() {
            c.segments.push_back(Bytes::from(v));
        }
        c
    }
}
