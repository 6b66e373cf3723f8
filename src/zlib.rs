/*
 * The zlib (RFC 1950) envelope: a 2-byte CMF/FLG header, an optional 4-byte
 * big-endian preset-dictionary id, the raw deflate body via `InflateEngine`,
 * and a 4-byte big-endian Adler-32 trailer.
 *
 * Reads the field sequence in order (CMF/FLG check-bits, CINFO-derived
 * window size, optional DICTID, deflate stream, Adler-32 trailer), using
 * the same resumable envelope shape as `gzip.rs`.
 */

use crate::constants::ZLIB_FDICT;
use crate::adler32::Adler32;
use crate::engine::InflateEngine;
use crate::error::{DecompressError, Result, Status};
use crate::span::{InputSpan, OutputSpan};

#[cfg(feature = "log")]
use log::trace;

enum State {
    Header,
    DictId,
    Body,
    Trailer,
    Done,
    Errored(DecompressError),
}

fn status_written(s: &Status) -> usize {
    match s {
        Status::Progress { written } => *written,
        Status::OutputFull { written } => *written,
        Status::NeedMoreInput { written } => *written,
        Status::Done { written } => *written,
    }
}

/// A resumable zlib decoder.
pub struct ZlibDecoder {
    state: State,
    engine: Option<InflateEngine>,
    header_buf: Vec<u8>,
    content_adler: Adler32,
    trailer_buf: Vec<u8>,
}

impl ZlibDecoder {
    pub fn new() -> Self {
        Self {
            state: State::Header,
            engine: None,
            header_buf: Vec::with_capacity(4),
            content_adler: Adler32::new(),
            trailer_buf: Vec::with_capacity(4),
        }
    }

    fn fail(&mut self, e: DecompressError) -> Result<Status> {
        self.state = State::Errored(e);
        Err(e)
    }

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
                State::Header => {
                    if !Self::pull(&mut self.header_buf, 2, input) {
                        if input_is_final {
                            return self.fail(DecompressError::UnexpectedEndOfInput);
                        }
                        return Ok(Status::NeedMoreInput { written: output.written() });
                    }
                    let cmf = self.header_buf[0];
                    let flg = self.header_buf[1];
                    self.header_buf.clear();
                    if (cmf as u16 * 256 + flg as u16) % 31 != 0 {
                        return self.fail(DecompressError::InvalidMagic);
                    }
                    if cmf & 0x0F != 8 {
                        return self.fail(DecompressError::UnsupportedMethod);
                    }
                    let cinfo = cmf >> 4;
                    if cinfo > 7 {
                        return self.fail(DecompressError::InvalidWindowSize);
                    }
                    let window_size = 1usize << (cinfo as u32 + 8);
                    self.engine = Some(InflateEngine::new(window_size));
                    #[cfg(feature = "log")]
                    trace!("zlib: header parsed, cinfo={cinfo} window={window_size}");
                    if flg & ZLIB_FDICT != 0 {
                        self.state = State::DictId;
                    } else {
                        self.state = State::Body;
                    }
                }

                State::DictId => {
                    if !Self::pull(&mut self.header_buf, 4, input) {
                        if input_is_final {
                            return self.fail(DecompressError::UnexpectedEndOfInput);
                        }
                        return Ok(Status::NeedMoreInput { written: output.written() });
                    }
                    let id = u32::from_be_bytes(self.header_buf[0..4].try_into().unwrap());
                    self.header_buf.clear();
                    return self.fail(DecompressError::NeedsPresetDictionary(id));
                }

                State::Body => {
                    let engine = self.engine.as_mut().expect("header parsed before body");
                    let written_before = output.written();
                    let status = match engine.step(input, input_is_final, output) {
                        Ok(s) => s,
                        Err(e) => return self.fail(e),
                    };
                    let written_after = status_written(&status);
                    let emitted = &output.written_slice()[written_before..written_after];
                    self.content_adler.update(emitted);
                    match status {
                        Status::Done { .. } => {
                            #[cfg(feature = "log")]
                            trace!("zlib: deflate body done, entering trailer");
                            self.state = State::Trailer;
                        }
                        other => return Ok(other),
                    }
                }

                State::Trailer => {
                    if !Self::pull(&mut self.trailer_buf, 4, input) {
                        if input_is_final {
                            return self.fail(DecompressError::UnexpectedEndOfInput);
                        }
                        return Ok(Status::NeedMoreInput { written: output.written() });
                    }
                    let stored = u32::from_be_bytes(self.trailer_buf[0..4].try_into().unwrap());
                    if stored != self.content_adler.finalize() {
                        return self.fail(DecompressError::ChecksumMismatch);
                    }
                    self.state = State::Done;
                }

                State::Done | State::Errored(_) => unreachable!("handled above"),
            }
        }
    }
}

impl Default for ZlibDecoder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adler32::adler32;

    fn stored_block_deflate(payload: &[u8]) -> Vec<u8> {
        let mut out = vec![0b0000_0001]; // BFINAL=1, BTYPE=00, rest zero padding
        let len = payload.len() as u16;
        out.push((len & 0xFF) as u8);
        out.push((len >> 8) as u8);
        out.push((!len & 0xFF) as u8);
        out.push((!len >> 8) as u8);
        out.extend_from_slice(payload);
        out
    }

    fn make_zlib(payload: &[u8]) -> Vec<u8> {
        // CMF: CINFO=7 (32K window), CM=8. FLG chosen so (CMF*256+FLG) % 31 == 0.
        let cmf: u8 = 0x78;
        let mut flg: u16 = 0;
        let base = cmf as u16 * 256;
        while (base + flg) % 31 != 0 {
            flg += 1;
        }
        let mut out = vec![cmf, flg as u8];
        out.extend(stored_block_deflate(payload));
        out.extend_from_slice(&adler32(payload).to_be_bytes());
        out
    }

    fn run(decoder: &mut ZlibDecoder, data: &[u8]) -> Vec<u8> {
        let mut input = InputSpan::new(data);
        let mut result = Vec::new();
        loop {
            let mut buf = [0u8; 256];
            let mut out = OutputSpan::new(&mut buf);
            let status = decoder.step(&mut input, true, &mut out).unwrap();
            result.extend_from_slice(out.written_slice());
            if matches!(status, Status::Done { .. }) {
                break;
            }
        }
        result
    }

    #[test]
    fn round_trips_a_minimal_zlib_stream() {
        let payload = b"zlib body bytes";
        let data = make_zlib(payload);
        let mut decoder = ZlibDecoder::new();
        let out = run(&mut decoder, &data);
        assert_eq!(out, payload);
    }

    #[test]
    fn rejects_bad_check_bits() {
        let mut data = make_zlib(b"x");
        data[1] ^= 0x01;
        let mut decoder = ZlibDecoder::new();
        let mut input = InputSpan::new(&data);
        let mut buf = [0u8; 64];
        let mut out = OutputSpan::new(&mut buf);
        assert_eq!(
            decoder.step(&mut input, true, &mut out).unwrap_err(),
            DecompressError::InvalidMagic
        );
    }

    #[test]
    fn rejects_window_size_above_limit() {
        let mut data = make_zlib(b"x");
        // Push CINFO to 8 (> 7) while keeping CM == 8, then refix the check bits.
        data[0] = (data[0] & 0x0F) | (8 << 4);
        let base = data[0] as u16 * 256;
        let mut flg = 0u16;
        while (base + flg) % 31 != 0 {
            flg += 1;
        }
        data[1] = flg as u8;
        let mut decoder = ZlibDecoder::new();
        let mut input = InputSpan::new(&data);
        let mut buf = [0u8; 64];
        let mut out = OutputSpan::new(&mut buf);
        assert_eq!(
            decoder.step(&mut input, true, &mut out).unwrap_err(),
            DecompressError::InvalidWindowSize
        );
    }

    #[test]
    fn surfaces_preset_dictionary_requirement() {
        let mut data = make_zlib(b"x");
        data[1] |= ZLIB_FDICT;
        // Refix the check bits after setting FDICT.
        let base = data[0] as u16 * 256;
        let mut flg = data[1] as u16;
        while (base + flg) % 31 != 0 {
            flg += 1;
        }
        data[1] = flg as u8;
        data.splice(2..2, 0xDEAD_BEEFu32.to_be_bytes());
        let mut decoder = ZlibDecoder::new();
        let mut input = InputSpan::new(&data);
        let mut buf = [0u8; 64];
        let mut out = OutputSpan::new(&mut buf);
        match decoder.step(&mut input, true, &mut out) {
            Err(DecompressError::NeedsPresetDictionary(id)) => assert_eq!(id, 0xDEAD_BEEF),
            other => panic!("expected NeedsPresetDictionary, got {other:?}"),
        }
    }

    #[test]
    fn rejects_trailer_adler_mismatch() {
        let mut data = make_zlib(b"correct bytes");
        let n = data.len();
        data[n - 1] ^= 0xFF;
        let mut decoder = ZlibDecoder::new();
        let mut input = InputSpan::new(&data);
        let mut result = Vec::new();
        let err = loop {
            let mut buf = [0u8; 64];
            let mut out = OutputSpan::new(&mut buf);
            match decoder.step(&mut input, true, &mut out) {
                Ok(Status::Done { .. }) => panic!("expected checksum mismatch"),
                Ok(_) => result.extend_from_slice(out.written_slice()),
                Err(e) => break e,
            }
        };
        assert_eq!(err, DecompressError::ChecksumMismatch);
    }

    #[test]
    fn scenario_3_fixed_huffman_stream_decodes_abc() {
        let data = [0x78, 0x9C, 0x4B, 0x4C, 0x4A, 0x06, 0x00, 0x02, 0x4D, 0x01, 0x27];
        let mut decoder = ZlibDecoder::new();
        let out = run(&mut decoder, &data);
        assert_eq!(out, b"abc");
    }

    #[test]
    fn scenario_3_corrupted_cmf_is_rejected() {
        let mut data = [0x78, 0x9C, 0x4B, 0x4C, 0x4A, 0x06, 0x00, 0x02, 0x4D, 0x01, 0x27];
        data[0] = 0x79;
        let mut decoder = ZlibDecoder::new();
        let mut input = InputSpan::new(&data);
        let mut buf = [0u8; 64];
        let mut out = OutputSpan::new(&mut buf);
        assert_eq!(
            decoder.step(&mut input, true, &mut out).unwrap_err(),
            DecompressError::InvalidMagic
        );
    }

    #[test]
    fn scenario_4_stored_block_decodes_hello() {
        // CMF/FLG + a stored block carrying "Hello", trailer is the Adler-32
        // of "Hello" (0x058C01F5).
        let data = [
            0x78, 0x01, 0x01, 0x05, 0x00, 0xFA, 0xFF, 0x48, 0x65, 0x6C, 0x6C, 0x6F, 0x05, 0x8C, 0x01, 0xF5,
        ];
        let mut decoder = ZlibDecoder::new();
        let out = run(&mut decoder, &data);
        assert_eq!(out, b"Hello");
    }

    #[test]
    fn scenario_6_thousand_repeated_bytes_round_trip() {
        let payload = vec![b'a'; 1000];
        let data = make_zlib(&payload);
        let mut decoder = ZlibDecoder::new();
        let out = run(&mut decoder, &data);
        assert_eq!(out, payload);
    }
}
