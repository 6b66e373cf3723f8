/*
 * The gzip (RFC 1952) envelope: header parsing, the raw deflate body via
 * `InflateEngine`, and trailer verification (CRC-32 + ISIZE).
 *
 * Reads the field sequence in order (ID1/ID2/CM/FLG/MTIME/XFL/OS, then the
 * optional FEXTRA/FNAME/FCOMMENT/FHCRC fields, then the deflate stream,
 * then the trailer) and always verifies the trailer before reporting
 * completion.
 */

use crate::constants::{GZIP_CM_DEFLATE, GZIP_FCOMMENT, GZIP_FEXTRA, GZIP_FHCRC, GZIP_FNAME, GZIP_FRESERVED, GZIP_ID1, GZIP_ID2};
use crate::crc32::Crc32;
use crate::engine::InflateEngine;
use crate::error::{DecompressError, Result, Status};
use crate::span::{InputSpan, OutputSpan};

#[cfg(feature = "log")]
use log::trace;

enum State {
    Magic,
    ExtraLen,
    ExtraData,
    Name,
    Comment,
    Hcrc,
    Body,
    Trailer,
    Done,
    Errored(DecompressError),
}

/// A resumable gzip (first member only) decoder.
pub struct GzipDecoder {
    state: State,
    engine: InflateEngine,
    header_buf: Vec<u8>,
    header_crc: Crc32,
    flags: u8,
    extra_remaining: u16,
    content_crc: Crc32,
    content_len: u32,
    trailer_buf: Vec<u8>,
}

fn status_written(s: &Status) -> usize {
    match s {
        Status::Progress { written } => *written,
        Status::OutputFull { written } => *written,
        Status::NeedMoreInput { written } => *written,
        Status::Done { written } => *written,
    }
}

impl GzipDecoder {
    pub fn new() -> Self {
        Self {
            state: State::Magic,
            engine: InflateEngine::new(32 * 1024),
            header_buf: Vec::with_capacity(10),
            header_crc: Crc32::new(),
            flags: 0,
            extra_remaining: 0,
            content_crc: Crc32::new(),
            content_len: 0,
            trailer_buf: Vec::with_capacity(8),
        }
    }

    fn fail(&mut self, e: DecompressError) -> Result<Status> {
        self.state = State::Errored(e);
        Err(e)
    }

    /// Pulls bytes from `input` into `buf` until it holds `target` bytes.
    /// Returns true once complete.
    fn pull(buf: &mut Vec<u8>, target: usize, input: &mut InputSpan) -> bool {
        while buf.len() < target {
            match input.next_byte() {
                Some(b) => buf.push(b),
                None => return false,
            }
        }
        true
    }

    pub fn step(
        &mut self,
        input: &mut InputSpan,
        input_is_final: bool,
        output: &mut OutputSpan,
    ) -> Result<Status> {
        loop {
            match &self.state {
                State::Errored(e) => return Err(*e),
                State::Done => return Ok(Status::Done { written: output.written() }),
                _ => {}
            }

            match &mut self.state {
                State::Magic => {
                    if !Self::pull(&mut self.header_buf, 10, input) {
                        if input_is_final {
                            return self.fail(DecompressError::UnexpectedEndOfInput);
                        }
                        return Ok(Status::NeedMoreInput { written: output.written() });
                    }
                    if self.header_buf[0] != GZIP_ID1 || self.header_buf[1] != GZIP_ID2 {
                        return self.fail(DecompressError::InvalidMagic);
                    }
                    if self.header_buf[2] != GZIP_CM_DEFLATE {
                        return self.fail(DecompressError::UnsupportedMethod);
                    }
                    let flags = self.header_buf[3];
                    if flags & GZIP_FRESERVED != 0 {
                        return self.fail(DecompressError::UnsupportedFlags);
                    }
                    self.header_crc.update(&self.header_buf);
                    self.flags = flags;
                    self.header_buf.clear();
                    #[cfg(feature = "log")]
                    trace!("gzip: header parsed, flags={flags:#04x}");
                    self.state = State::ExtraLen;
                }

                State::ExtraLen => {
                    if self.flags & GZIP_FEXTRA == 0 {
                        self.state = State::Name;
                        continue;
                    }
                    if !Self::pull(&mut self.header_buf, 2, input) {
                        if input_is_final {
                            return self.fail(DecompressError::UnexpectedEndOfInput);
                        }
                        return Ok(Status::NeedMoreInput { written: output.written() });
                    }
                    let xlen = u16::from_le_bytes([self.header_buf[0], self.header_buf[1]]);
                    self.header_crc.update(&self.header_buf);
                    self.header_buf.clear();
                    self.extra_remaining = xlen;
                    self.state = State::ExtraData;
                }

                State::ExtraData => {
                    if self.extra_remaining == 0 {
                        self.state = State::Name;
                        continue;
                    }
                    match input.next_byte() {
                        Some(b) => {
                            self.header_crc.update(&[b]);
                            self.extra_remaining -= 1;
                        }
                        None => {
                            if input_is_final {
                                return self.fail(DecompressError::UnexpectedEndOfInput);
                            }
                            return Ok(Status::NeedMoreInput { written: output.written() });
                        }
                    }
                }

                State::Name => {
                    if self.flags & GZIP_FNAME == 0 {
                        self.state = State::Comment;
                        continue;
                    }
                    match input.next_byte() {
                        Some(0) => {
                            self.header_crc.update(&[0]);
                            self.state = State::Comment;
                        }
                        Some(b) => self.header_crc.update(&[b]),
                        None => {
                            if input_is_final {
                                return self.fail(DecompressError::UnexpectedEndOfInput);
                            }
                            return Ok(Status::NeedMoreInput { written: output.written() });
                        }
                    }
                }

                State::Comment => {
                    if self.flags & GZIP_FCOMMENT == 0 {
                        self.state = State::Hcrc;
                        continue;
                    }
                    match input.next_byte() {
                        Some(0) => {
                            self.header_crc.update(&[0]);
                            self.state = State::Hcrc;
                        }
                        Some(b) => self.header_crc.update(&[b]),
                        None => {
                            if input_is_final {
                                return self.fail(DecompressError::UnexpectedEndOfInput);
                            }
                            return Ok(Status::NeedMoreInput { written: output.written() });
                        }
                    }
                }

                State::Hcrc => {
                    if self.flags & GZIP_FHCRC == 0 {
                        self.state = State::Body;
                        continue;
                    }
                    if !Self::pull(&mut self.header_buf, 2, input) {
                        if input_is_final {
                            return self.fail(DecompressError::UnexpectedEndOfInput);
                        }
                        return Ok(Status::NeedMoreInput { written: output.written() });
                    }
                    let stored = u16::from_le_bytes([self.header_buf[0], self.header_buf[1]]);
                    self.header_buf.clear();
                    let computed = (self.header_crc.finalize() & 0xFFFF) as u16;
                    if stored != computed {
                        return self.fail(DecompressError::HeaderChecksumMismatch);
                    }
                    self.state = State::Body;
                }

                State::Body => {
                    let written_before = output.written();
                    let status = match self.engine.step(input, input_is_final, output) {
                        Ok(s) => s,
                        Err(e) => return self.fail(e),
                    };
                    let written_after = status_written(&status);
                    let emitted = &output.written_slice()[written_before..written_after];
                    self.content_crc.update(emitted);
                    self.content_len = self.content_len.wrapping_add(emitted.len() as u32);
                    match status {
                        Status::Done { .. } => {
                            #[cfg(feature = "log")]
                            trace!("gzip: deflate body done, entering trailer");
                            self.state = State::Trailer;
                        }
                        other => return Ok(other),
                    }
                }

                State::Trailer => {
                    if !Self::pull(&mut self.trailer_buf, 8, input) {
                        if input_is_final {
                            return self.fail(DecompressError::UnexpectedEndOfInput);
                        }
                        return Ok(Status::NeedMoreInput { written: output.written() });
                    }
                    let stored_crc = u32::from_le_bytes(self.trailer_buf[0..4].try_into().unwrap());
                    let stored_isize = u32::from_le_bytes(self.trailer_buf[4..8].try_into().unwrap());
                    if stored_crc != self.content_crc.finalize() || stored_isize != self.content_len {
                        return self.fail(DecompressError::ChecksumMismatch);
                    }
                    self.state = State::Done;
                }

                State::Done | State::Errored(_) => unreachable!("handled above"),
            }
        }
    }
}

impl Default for GzipDecoder {
    fn default() -> Self {
        Self::new()
    }
}
