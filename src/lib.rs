//! A resumable, buffer-driven DEFLATE (RFC 1951) decompressor, with optional
//! zlib (RFC 1950) and gzip (RFC 1952) envelope support.
//!
//! The core type is [`engine::InflateEngine`]: it never allocates beyond its
//! sliding window and Huffman decode tables, consumes input from a
//! caller-supplied [`span::InputSpan`], and writes into a caller-supplied
//! [`span::OutputSpan`], suspending whenever either is exhausted. The `gzip`
//! and `zlib` modules layer the matching envelope framing on top.

pub mod adler32;
pub mod bitstream;
pub mod constants;
pub mod crc32;
pub mod engine;
pub mod error;
pub mod huffman;
pub mod span;
pub mod window;

#[cfg(feature = "gzip")]
pub mod gzip;
#[cfg(feature = "zlib")]
pub mod zlib;

#[macro_use]
extern crate static_assertions;

pub use error::{DecompressError, Result, Status};
pub use span::{InputSpan, OutputSpan};

const_assert_eq!(constants::LEN_BASE.len(), constants::LEN_EXTRA.len());
const_assert_eq!(constants::DIST_BASE.len(), constants::DIST_EXTRA.len());

/// Decompresses a complete in-memory gzip member into a freshly allocated
/// `Vec<u8>`, growing the output buffer as needed.
///
/// A thin convenience wrapper over [`gzip::GzipDecoder`] for callers who
/// already hold the whole compressed stream in memory. Callers that need to
/// stream from a `Read` or bound their output size should drive
/// [`gzip::GzipDecoder`] directly instead.
#[cfg(all(feature = "std", feature = "gzip"))]
pub fn gzip_decompress_to_vec(data: &[u8]) -> Result<Vec<u8>> {
    decompress_to_vec(data, gzip::GzipDecoder::new, gzip::GzipDecoder::step)
}

/// Decompresses a complete in-memory zlib stream into a freshly allocated
/// `Vec<u8>`. See [`gzip_decompress_to_vec`].
#[cfg(all(feature = "std", feature = "zlib"))]
pub fn zlib_decompress_to_vec(data: &[u8]) -> Result<Vec<u8>> {
    decompress_to_vec(data, zlib::ZlibDecoder::new, zlib::ZlibDecoder::step)
}

#[cfg(feature = "std")]
fn decompress_to_vec<D>(
    data: &[u8],
    new: impl FnOnce() -> D,
    mut step: impl FnMut(&mut D, &mut InputSpan, bool, &mut OutputSpan) -> Result<Status>,
) -> Result<Vec<u8>> {
    const CHUNK: usize = 64 * 1024;

    let mut decoder = new();
    let mut input = InputSpan::new(data);
    let mut result = Vec::new();
    loop {
        let mut chunk = vec![0u8; CHUNK];
        let mut output = OutputSpan::new(&mut chunk);
        let status = step(&mut decoder, &mut input, true, &mut output)?;
        let written = output.written();
        result.extend_from_slice(&chunk[..written]);
        if matches!(status, Status::Done { .. }) {
            return Ok(result);
        }
    }
}
