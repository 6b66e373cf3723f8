/*
 * The LZ77 sliding window: a circular history buffer serving back-reference
 * copies. Allocated lazily, sized once per decoder (or per zlib header, for
 * the declared CINFO window size) and reused for the life of the stream.
 */

use crate::constants::{DEFLATE_MAX_WINDOW_SIZE, DEFLATE_MIN_WINDOW_SIZE};
use crate::error::{DecompressError, Result};
use crate::span::OutputSpan;

pub struct Window {
    buf: Vec<u8>,
    mask: usize,
    wtail: usize,
    total_emitted: u64,
}

impl Window {
    /// Rounds `size_hint` up to the next power of two, clamped into
    /// `[512, 32768]`, and allocates a buffer of exactly that size.
    pub fn new(size_hint: usize) -> Self {
        let size = next_pow2(size_hint.clamp(DEFLATE_MIN_WINDOW_SIZE, DEFLATE_MAX_WINDOW_SIZE));
        Self {
            buf: vec![0u8; size],
            mask: size - 1,
            wtail: 0,
            total_emitted: 0,
        }
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.buf.len()
    }

    #[inline]
    pub fn total_emitted(&self) -> u64 {
        self.total_emitted
    }

    #[inline]
    fn push(&mut self, byte: u8) {
        self.buf[self.wtail] = byte;
        self.wtail = (self.wtail + 1) & self.mask;
        self.total_emitted += 1;
    }

    /// Appends bytes already written to the caller's output buffer. Splits
    /// into at most two copies (up to the wrap point, then from the start).
    pub fn absorb(&mut self, bytes: &[u8]) {
        let w = self.buf.len();
        if bytes.len() >= w {
            let tail = &bytes[bytes.len() - w..];
            self.buf.copy_from_slice(tail);
            self.wtail = 0;
        } else {
            let first = (w - self.wtail).min(bytes.len());
            self.buf[self.wtail..self.wtail + first].copy_from_slice(&bytes[..first]);
            let rest = &bytes[first..];
            if !rest.is_empty() {
                self.buf[..rest.len()].copy_from_slice(rest);
            }
            self.wtail = (self.wtail + bytes.len()) & self.mask;
        }
        self.total_emitted += bytes.len() as u64;
    }

    /// Validates a back-reference distance against how much history exists
    /// and against the window's own capacity: a distance beyond the window
    /// size can never be satisfied no matter how much has been emitted, and
    /// must be rejected here rather than allowed to underflow the source
    /// index arithmetic in `copy_back`.
    pub fn check_distance(&self, distance: usize) -> Result<()> {
        if distance == 0
            || distance > self.capacity()
            || (self.total_emitted < self.capacity() as u64 && distance as u64 > self.total_emitted)
        {
            return Err(DecompressError::DistanceTooFar);
        }
        Ok(())
    }

    /// Copies up to `length` bytes from `distance` bytes back into `output`,
    /// one byte at a time so that overlapping copies (distance < length)
    /// resolve correctly: the window is updated after every byte, so a
    /// later read in the same call sees bytes written earlier in that same
    /// call. Returns the number of bytes actually copied, which is less
    /// than `length` only when `output` ran out of room.
    pub fn copy_back(&mut self, distance: usize, length: usize, output: &mut OutputSpan) -> usize {
        let w = self.buf.len();
        let mut copied = 0;
        while copied < length {
            let src = (self.wtail + w - distance) & self.mask;
            let byte = self.buf[src];
            if !output.push(byte) {
                break;
            }
            self.push(byte);
            copied += 1;
        }
        copied
    }
}

fn next_pow2(n: usize) -> usize {
    n.next_power_of_two()
}
