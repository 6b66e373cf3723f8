/*
 * The resumable DEFLATE (RFC 1951) inflation engine.
 *
 * State lives entirely in `State` plus a handful of scratch fields on
 * `InflateEngine` shared across states (the code-length vector being
 * assembled, the currently resolved length/distance, and so on). Each
 * block phase gets its own enum variant carrying exactly the scratch it
 * needs, rather than a flat struct with a mode tag, so a half-updated
 * scratch field from a previous phase can never leak into the next one.
 *
 * No fast path: every literal, length, and distance symbol is decoded one
 * at a time through the same `step` loop. A batched/unsafe fast path is a
 * pure throughput optimization on top of this same algorithm and isn't
 * needed for correctness.
 */

use crate::constants::{
    DEFLATE_BLOCKTYPE_DYNAMIC_HUFFMAN, DEFLATE_BLOCKTYPE_STATIC_HUFFMAN,
    DEFLATE_BLOCKTYPE_UNCOMPRESSED, DEFLATE_MAX_CODEWORD_LEN, DEFLATE_MAX_PRE_CODEWORD_LEN,
    DEFLATE_NUM_LITLEN_SYMS, DEFLATE_NUM_OFFSET_SYMS, DEFLATE_NUM_PRECODE_SYMS, DIST_BASE,
    DIST_EXTRA, LEN_BASE, LEN_EXTRA, PRECODE_LENS_PERMUTATION,
};
use crate::error::{DecompressError, Result, Status};
use crate::huffman::HuffmanTable;
use crate::span::{InputSpan, OutputSpan};
use crate::window::Window;
use crate::bitstream::BitReader;

#[cfg(feature = "log")]
use log::trace;

#[derive(Clone, Copy)]
enum State {
    BlockHeader,
    StoredHeader,
    StoredCopy,
    DynamicHeader,
    PrecodeLens { remaining: u32 },
    CodeLens,
    CodeLenExtra(u8),
    Len,
    LenExtra { symbol: u16 },
    Dist,
    DistExtra { dist_symbol: u16 },
    Match,
    EmitLiteral(u8),
    Done,
    Errored(DecompressError),
}

/// A resumable DEFLATE decoder: raw RFC 1951 streams only, no envelope.
pub struct InflateEngine {
    state: State,
    reader: BitReader,
    window: Option<Window>,
    window_size_hint: usize,

    litlen_table: HuffmanTable,
    dist_table: HuffmanTable,
    precode_table: HuffmanTable,

    precode_lens: [u8; DEFLATE_NUM_PRECODE_SYMS],
    code_lens: Vec<u8>,
    hlit: u32,
    hdist: u32,
    hclen: u32,

    final_block: bool,
    stored_remaining: u16,
    pending_len: u32,
    pending_dist: u32,
}

impl InflateEngine {
    pub fn new(window_size_hint: usize) -> Self {
        Self {
            state: State::BlockHeader,
            reader: BitReader::new(),
            window: None,
            window_size_hint,
            litlen_table: HuffmanTable::with_capacity_hint(2048),
            dist_table: HuffmanTable::with_capacity_hint(512),
            precode_table: HuffmanTable::with_capacity_hint(0),
            precode_lens: [0u8; DEFLATE_NUM_PRECODE_SYMS],
            code_lens: Vec::with_capacity(DEFLATE_NUM_LITLEN_SYMS + DEFLATE_NUM_OFFSET_SYMS),
            hlit: 0,
            hdist: 0,
            hclen: 0,
            final_block: false,
            stored_remaining: 0,
            pending_len: 0,
            pending_dist: 0,
        }
    }

    pub fn is_done(&self) -> bool {
        matches!(self.state, State::Done)
    }

    fn fail(&mut self, e: DecompressError) -> Result<Status> {
        self.state = State::Errored(e);
        Err(e)
    }

    fn try_or_fail<T>(&mut self, r: Result<T>) -> Result<T> {
        if let Err(e) = r {
            self.state = State::Errored(e);
        }
        r
    }

    /// Ensures `n` bits are available for a raw, fixed-width field (block
    /// headers, LEN/NLEN, stored bytes, extra-bits counts -- anything that
    /// isn't a self-terminating Huffman code). Returns `Ok(true)` if they
    /// are. Returns `Ok(false)` if not, but more input may still arrive.
    /// Returns `Err(UnexpectedEndOfInput)` (poisoning the engine) if
    /// `input_is_final` and the stream ran dry mid-field: unlike a Huffman
    /// codeword, a raw field has no length of its own to decode, so running
    /// out of real bits here can only mean a truncated stream, never a
    /// legitimate final symbol.
    fn require_bits(&mut self, n: u32, input: &mut InputSpan, input_is_final: bool) -> Result<bool> {
        if self.reader.ensure(n, input) {
            return Ok(true);
        }
        if input_is_final {
            self.state = State::Errored(DecompressError::UnexpectedEndOfInput);
            Err(DecompressError::UnexpectedEndOfInput)
        } else {
            Ok(false)
        }
    }

    fn ensure_window(&mut self) {
        if self.window.is_none() {
            self.window = Some(Window::new(self.window_size_hint));
        }
    }

    fn window_mut(&mut self) -> &mut Window {
        self.window
            .as_mut()
            .expect("window allocated before first block body")
    }

    fn end_of_block(&mut self) {
        self.state = if self.final_block {
            #[cfg(feature = "log")]
            trace!("deflate: final block consumed");
            State::Done
        } else {
            State::BlockHeader
        };
    }

    fn load_static_tables(&mut self) -> Result<()> {
        let mut lit = [0u8; DEFLATE_NUM_LITLEN_SYMS];
        lit[0..=143].fill(8);
        lit[144..=255].fill(9);
        lit[256..=279].fill(7);
        lit[280..=287].fill(8);
        self.litlen_table.build(&lit, DEFLATE_MAX_CODEWORD_LEN)?;

        let dist = [5u8; DEFLATE_NUM_OFFSET_SYMS];
        self.dist_table.build(&dist, DEFLATE_MAX_CODEWORD_LEN)?;
        Ok(())
    }

    /// Advances the engine, consuming bits from `input` and producing
    /// decompressed bytes into `output`. `input_is_final` must be true only
    /// when the caller guarantees no further bytes will ever be supplied
    /// (used to correctly decode a final Huffman code whose last byte holds
    /// fewer bits than a fixed-width table lookup wants to peek).
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

            match self.state {
                State::BlockHeader => {
                    if !self.require_bits(3, input, input_is_final)? {
                        return Ok(Status::NeedMoreInput { written: output.written() });
                    }
                    let bits = self.reader.pop(3);
                    self.final_block = (bits & 1) != 0;
                    let btype = (bits >> 1) & 0b11;
                    self.ensure_window();
                    #[cfg(feature = "log")]
                    trace!("deflate: block header btype={btype} final={}", self.final_block);
                    match btype {
                        DEFLATE_BLOCKTYPE_UNCOMPRESSED => self.state = State::StoredHeader,
                        DEFLATE_BLOCKTYPE_STATIC_HUFFMAN => {
                            if let Err(e) = self.load_static_tables() {
                                return self.fail(e);
                            }
                            self.state = State::Len;
                        }
                        DEFLATE_BLOCKTYPE_DYNAMIC_HUFFMAN => self.state = State::DynamicHeader,
                        _ => return self.fail(DecompressError::InvalidBlockType),
                    }
                }

                State::StoredHeader => {
                    self.reader.align_to_byte();
                    if !self.require_bits(32, input, input_is_final)? {
                        return Ok(Status::NeedMoreInput { written: output.written() });
                    }
                    let len = self.reader.pop(16) as u16;
                    let nlen = self.reader.pop(16) as u16;
                    if len != !nlen {
                        return self.fail(DecompressError::InvalidStoredLength);
                    }
                    self.stored_remaining = len;
                    self.state = State::StoredCopy;
                }

                State::StoredCopy => {
                    if self.stored_remaining == 0 {
                        self.end_of_block();
                        continue;
                    }
                    if output.is_full() {
                        return Ok(Status::OutputFull { written: output.written() });
                    }
                    if !self.require_bits(8, input, input_is_final)? {
                        return Ok(Status::NeedMoreInput { written: output.written() });
                    }
                    let byte = self.reader.pop(8) as u8;
                    output.push(byte);
                    self.window_mut().absorb(&[byte]);
                    self.stored_remaining -= 1;
                }

                State::DynamicHeader => {
                    if !self.require_bits(14, input, input_is_final)? {
                        return Ok(Status::NeedMoreInput { written: output.written() });
                    }
                    self.hlit = self.reader.pop(5) + 257;
                    self.hdist = self.reader.pop(5) + 1;
                    self.hclen = self.reader.pop(4) + 4;
                    self.precode_lens = [0u8; DEFLATE_NUM_PRECODE_SYMS];
                    self.code_lens.clear();
                    self.state = State::PrecodeLens { remaining: self.hclen };
                }

                State::PrecodeLens { remaining } => {
                    if remaining == 0 {
                        let lens = self.precode_lens;
                        if let Err(e) = self
                            .precode_table
                            .build(&lens, DEFLATE_MAX_PRE_CODEWORD_LEN)
                        {
                            return self.fail(e);
                        }
                        self.state = State::CodeLens;
                        continue;
                    }
                    if !self.require_bits(3, input, input_is_final)? {
                        return Ok(Status::NeedMoreInput { written: output.written() });
                    }
                    let filled = self.hclen - remaining;
                    let val = self.reader.pop(3) as u8;
                    self.precode_lens[PRECODE_LENS_PERMUTATION[filled as usize] as usize] = val;
                    self.state = State::PrecodeLens { remaining: remaining - 1 };
                }

                State::CodeLens => {
                    let target = (self.hlit + self.hdist) as usize;
                    if self.code_lens.len() >= target {
                        let (lit_lens, dist_lens) = self.code_lens.split_at(self.hlit as usize);
                        if let Err(e) = self.litlen_table.build(lit_lens, DEFLATE_MAX_CODEWORD_LEN) {
                            return self.fail(e);
                        }
                        if let Err(e) = self.dist_table.build(dist_lens, DEFLATE_MAX_CODEWORD_LEN) {
                            return self.fail(e);
                        }
                        self.state = State::Len;
                        continue;
                    }
                    let r = self.precode_table.decode_one(&mut self.reader, input, input_is_final);
                    let sym = match self.try_or_fail(r) {
                        Ok(Some(s)) => s,
                        Ok(None) => {
                            return Ok(Status::NeedMoreInput { written: output.written() })
                        }
                        Err(e) => return Err(e),
                    };
                    match sym {
                        0..=15 => self.code_lens.push(sym as u8),
                        16 => self.state = State::CodeLenExtra(16),
                        17 => self.state = State::CodeLenExtra(17),
                        18 => self.state = State::CodeLenExtra(18),
                        _ => return self.fail(DecompressError::InvalidCodeSet),
                    }
                }

                State::CodeLenExtra(symbol) => {
                    let (extra_bits, base, use_prev) = match symbol {
                        16 => (2u32, 3u32, true),
                        17 => (3u32, 3u32, false),
                        18 => (7u32, 11u32, false),
                        _ => unreachable!(),
                    };
                    if !self.require_bits(extra_bits, input, input_is_final)? {
                        return Ok(Status::NeedMoreInput { written: output.written() });
                    }
                    let rep = base + self.reader.pop(extra_bits);
                    let fill_value = if use_prev {
                        match self.code_lens.last() {
                            Some(&v) => v,
                            None => return self.fail(DecompressError::InvalidRepeatPrefix),
                        }
                    } else {
                        0
                    };
                    let target = (self.hlit + self.hdist) as usize;
                    for _ in 0..rep {
                        if self.code_lens.len() >= target {
                            return self.fail(DecompressError::InvalidRepeatPrefix);
                        }
                        self.code_lens.push(fill_value);
                    }
                    self.state = State::CodeLens;
                }

                State::Len => {
                    let r = self.litlen_table.decode_one(&mut self.reader, input, input_is_final);
                    let sym = match self.try_or_fail(r) {
                        Ok(Some(s)) => s,
                        Ok(None) => {
                            return Ok(Status::NeedMoreInput { written: output.written() })
                        }
                        Err(e) => return Err(e),
                    };
                    if sym < 256 {
                        let byte = sym as u8;
                        if !output.push(byte) {
                            self.state = State::EmitLiteral(byte);
                            return Ok(Status::OutputFull { written: output.written() });
                        }
                        self.window_mut().absorb(&[byte]);
                    } else if sym == 256 {
                        self.end_of_block();
                    } else if (sym as usize) < 257 + LEN_BASE.len() {
                        let i = sym as usize - 257;
                        let extra = LEN_EXTRA[i] as u32;
                        if extra == 0 {
                            self.pending_len = LEN_BASE[i] as u32;
                            self.state = State::Dist;
                        } else {
                            self.state = State::LenExtra { symbol: sym };
                        }
                    } else {
                        return self.fail(DecompressError::InvalidLengthCode);
                    }
                }

                State::LenExtra { symbol } => {
                    let i = symbol as usize - 257;
                    let extra = LEN_EXTRA[i] as u32;
                    if !self.require_bits(extra, input, input_is_final)? {
                        return Ok(Status::NeedMoreInput { written: output.written() });
                    }
                    self.pending_len = LEN_BASE[i] as u32 + self.reader.pop(extra);
                    self.state = State::Dist;
                }

                State::Dist => {
                    let r = self.dist_table.decode_one(&mut self.reader, input, input_is_final);
                    let sym = match self.try_or_fail(r) {
                        Ok(Some(s)) => s,
                        Ok(None) => {
                            return Ok(Status::NeedMoreInput { written: output.written() })
                        }
                        Err(e) => return Err(e),
                    };
                    if sym as usize >= DIST_BASE.len() {
                        return self.fail(DecompressError::InvalidDistanceCode);
                    }
                    let extra = DIST_EXTRA[sym as usize] as u32;
                    if extra == 0 {
                        self.pending_dist = DIST_BASE[sym as usize] as u32;
                        self.state = State::Match;
                    } else {
                        self.state = State::DistExtra { dist_symbol: sym };
                    }
                }

                State::DistExtra { dist_symbol } => {
                    let extra = DIST_EXTRA[dist_symbol as usize] as u32;
                    if !self.require_bits(extra, input, input_is_final)? {
                        return Ok(Status::NeedMoreInput { written: output.written() });
                    }
                    self.pending_dist = DIST_BASE[dist_symbol as usize] as u32 + self.reader.pop(extra);
                    self.state = State::Match;
                }

                State::Match => {
                    let distance = self.pending_dist as usize;
                    if let Err(e) = self.window_mut().check_distance(distance) {
                        return self.fail(e);
                    }
                    let pending_len = self.pending_len as usize;
                    let copied = self
                        .window_mut()
                        .copy_back(distance, pending_len, output);
                    self.pending_len -= copied as u32;
                    if self.pending_len == 0 {
                        self.state = State::Len;
                    } else {
                        return Ok(Status::OutputFull { written: output.written() });
                    }
                }

                State::EmitLiteral(byte) => {
                    if !output.push(byte) {
                        return Ok(Status::OutputFull { written: output.written() });
                    }
                    self.window_mut().absorb(&[byte]);
                    self.state = State::Len;
                }

                State::Done | State::Errored(_) => unreachable!("handled above"),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pack_bits(bits: &[u8]) -> Vec<u8> {
        let mut out = vec![0u8; bits.len().div_ceil(8)];
        for (i, &b) in bits.iter().enumerate() {
            if b != 0 {
                out[i / 8] |= 1 << (i % 8);
            }
        }
        out
    }

    fn bits_lsb_first(mut value: u32, len: u32) -> Vec<u8> {
        // deflate transmits small fixed-width fields LSB-first
        (0..len).map(|_| { let b = (value & 1) as u8; value >>= 1; b }).collect()
    }

    /// Huffman codewords are transmitted MSB-first.
    fn bits_msb_first(code: u32, len: u32) -> Vec<u8> {
        (0..len).rev().map(|i| ((code >> i) & 1) as u8).collect()
    }

    fn run_to_completion(engine: &mut InflateEngine, data: &[u8], out_cap: usize) -> Vec<u8> {
        let mut input = InputSpan::new(data);
        let mut result = Vec::new();
        loop {
            let mut buf = vec![0u8; out_cap];
            let mut out = OutputSpan::new(&mut buf);
            let status = engine.step(&mut input, true, &mut out).unwrap();
            result.extend_from_slice(out.written_slice());
            match status {
                Status::Done { .. } => break,
                Status::NeedMoreInput { .. } if input.is_empty() => {
                    panic!("stream starved with input_is_final=true")
                }
                _ => {}
            }
        }
        result
    }

    #[test]
    fn decodes_a_stored_block() {
        // BFINAL=1, BTYPE=00, then byte-aligned LEN/NLEN/data.
        let mut bits = bits_lsb_first(0b1, 1);
        bits.extend(bits_lsb_first(0b00, 2));
        let mut bytes = pack_bits(&bits);
        let payload = b"hello, deflate";
        let len = payload.len() as u16;
        bytes.push((len & 0xFF) as u8);
        bytes.push((len >> 8) as u8);
        bytes.push((!len & 0xFF) as u8);
        bytes.push((!len >> 8) as u8);
        bytes.extend_from_slice(payload);

        let mut engine = InflateEngine::new(512);
        let out = run_to_completion(&mut engine, &bytes, 256);
        assert_eq!(out, payload);
    }

    #[test]
    fn rejects_bad_stored_length_complement() {
        let mut bits = bits_lsb_first(0b1, 1);
        bits.extend(bits_lsb_first(0b00, 2));
        let mut bytes = pack_bits(&bits);
        bytes.extend_from_slice(&[0x05, 0x00, 0x00, 0x00]); // NLEN not ~LEN
        let mut engine = InflateEngine::new(512);
        let mut input = InputSpan::new(&bytes);
        let mut buf = [0u8; 16];
        let mut out = OutputSpan::new(&mut buf);
        let err = engine.step(&mut input, true, &mut out).unwrap_err();
        assert_eq!(err, DecompressError::InvalidStoredLength);
    }

    #[test]
    fn rejects_reserved_block_type() {
        let mut bits = bits_lsb_first(0b1, 1);
        bits.extend(bits_lsb_first(0b11, 2));
        let bytes = pack_bits(&bits);
        let mut engine = InflateEngine::new(512);
        let mut input = InputSpan::new(&bytes);
        let mut buf = [0u8; 16];
        let mut out = OutputSpan::new(&mut buf);
        let err = engine.step(&mut input, true, &mut out).unwrap_err();
        assert_eq!(err, DecompressError::InvalidBlockType);
        // Poisoned: calling again returns the same error.
        let mut out2 = OutputSpan::new(&mut buf);
        let mut input2 = InputSpan::new(&[]);
        assert_eq!(engine.step(&mut input2, true, &mut out2).unwrap_err(), err);
    }

    #[test]
    fn empty_final_stored_block_completes_with_no_output() {
        let mut bits = bits_lsb_first(0b1, 1);
        bits.extend(bits_lsb_first(0b00, 2));
        let mut bytes = pack_bits(&bits);
        bytes.extend_from_slice(&[0x00, 0x00, 0xFF, 0xFF]);
        let mut engine = InflateEngine::new(512);
        let out = run_to_completion(&mut engine, &bytes, 16);
        assert!(out.is_empty());
    }

    #[test]
    fn decodes_a_fixed_huffman_block_of_literals() {
        // BFINAL=1, BTYPE=01 (fixed huffman), then fixed codes for 'A','B'
        // and the end-of-block symbol (256).
        let mut bits = bits_lsb_first(0b1, 1);
        bits.extend(bits_lsb_first(0b01, 2));
        bits.extend(bits_msb_first(0x30 + b'A' as u32, 8));
        bits.extend(bits_msb_first(0x30 + b'B' as u32, 8));
        bits.extend(bits_msb_first(0, 7)); // symbol 256, end of block
        let bytes = pack_bits(&bits);

        let mut engine = InflateEngine::new(512);
        let out = run_to_completion(&mut engine, &bytes, 64);
        assert_eq!(out, b"AB");
    }

    #[test]
    fn decodes_a_fixed_huffman_back_reference() {
        // Literal 'a', then a length=3/distance=1 match (run-length style),
        // reproducing "aaaa", then end of block.
        let mut bits = bits_lsb_first(0b1, 1);
        bits.extend(bits_lsb_first(0b01, 2));
        bits.extend(bits_msb_first(0x30 + b'a' as u32, 8));
        // length symbol 257 (base length 3, 0 extra bits): 7-bit code = 1.
        bits.extend(bits_msb_first(1, 7));
        // distance symbol 0 (base distance 1, 0 extra bits): 5-bit code = 0.
        bits.extend(bits_msb_first(0, 5));
        bits.extend(bits_msb_first(0, 7)); // end of block
        let bytes = pack_bits(&bits);

        let mut engine = InflateEngine::new(512);
        let out = run_to_completion(&mut engine, &bytes, 64);
        assert_eq!(out, b"aaaa");
    }

    #[test]
    fn suspends_on_input_shortage_and_resumes_identically_to_one_shot() {
        let mut bits = bits_lsb_first(0b1, 1);
        bits.extend(bits_lsb_first(0b00, 2));
        let mut bytes = pack_bits(&bits);
        let payload = b"split me across calls please";
        let len = payload.len() as u16;
        bytes.push((len & 0xFF) as u8);
        bytes.push((len >> 8) as u8);
        bytes.push((!len & 0xFF) as u8);
        bytes.push((!len >> 8) as u8);
        bytes.extend_from_slice(payload);

        let mut whole = InflateEngine::new(512);
        let one_shot = run_to_completion(&mut whole, &bytes, 256);

        let mut split = InflateEngine::new(512);
        let mut produced = Vec::new();
        for chunk in bytes.chunks(3) {
            let is_last = chunk.as_ptr() as usize + chunk.len() == bytes.as_ptr() as usize + bytes.len();
            let mut input = InputSpan::new(chunk);
            loop {
                let mut buf = [0u8; 64];
                let mut out = OutputSpan::new(&mut buf);
                let status = split.step(&mut input, is_last, &mut out).unwrap();
                produced.extend_from_slice(out.written_slice());
                match status {
                    Status::NeedMoreInput { .. } => break,
                    Status::Done { .. } => break,
                    _ => {
                        if input.is_empty() {
                            break;
                        }
                    }
                }
            }
        }
        assert_eq!(produced, one_shot);
        assert_eq!(produced, payload);
    }

    /// A single final dynamic-Huffman (BTYPE=10) block: real deflate output
    /// for a short repetitive text, exercising `DynamicHeader`, the precode
    /// table, the code-length RLE (`CodeLens`/`CodeLenExtra`), and the
    /// resulting litlen/distance tables end to end.
    const DYNAMIC_HUFFMAN_BODY: [u8; 120] = [
        0x55, 0x8F, 0x51, 0x12, 0xC2, 0x20, 0x0C, 0x44, 0xAF, 0xB2, 0x57, 0xAB, 0x10, 0x1D, 0xB4, 0x34,
        0x95, 0x90, 0x56, 0x3D, 0xBD, 0x45, 0xC8, 0xD8, 0x7C, 0x25, 0x64, 0x77, 0xDE, 0xB2, 0x91, 0x67,
        0x2E, 0xB8, 0x6B, 0x5E, 0x05, 0x53, 0xA6, 0x8A, 0xA7, 0xA6, 0xF0, 0xC0, 0xA5, 0xF0, 0xBE, 0x20,
        0x32, 0xAE, 0xFC, 0x82, 0xA4, 0x0A, 0x4A, 0x2A, 0x99, 0xE3, 0x90, 0x85, 0x22, 0xE6, 0xE9, 0xF3,
        0x76, 0xEE, 0xC0, 0x8B, 0x50, 0xA8, 0x54, 0xB5, 0xB8, 0xDD, 0x58, 0xB7, 0x3F, 0xF5, 0x2C, 0x77,
        0x84, 0xF1, 0x5B, 0x5E, 0xB3, 0xFA, 0x3C, 0x7B, 0xD9, 0x3C, 0xFD, 0xB4, 0x99, 0x6D, 0x1B, 0x3D,
        0xD2, 0x2A, 0x9A, 0x5D, 0x46, 0xBF, 0x8F, 0x3A, 0x06, 0xE9, 0xB6, 0xE3, 0xC8, 0x1B, 0x15, 0xA7,
        0xD8, 0xFC, 0x55, 0x6C, 0xED, 0x0F, 0xF1, 0x0B,
    ];
    const DYNAMIC_HUFFMAN_TEXT: &[u8] = b"dolor jumps amet quick brown do fox sit eiusmod quick sed lazy quick brown consectetur consectetur brown dog brown do consectetur quick eiusmod fox dog eiusmod quick eiusmod eiusmod amet quick dog quick do jumps ipsum consectetur jumps do fox eiusmod ipsum do over fox eiusmod eiusmod lazy sit fox";

    #[test]
    fn decodes_a_dynamic_huffman_block() {
        let mut engine = InflateEngine::new(1024);
        let out = run_to_completion(&mut engine, &DYNAMIC_HUFFMAN_BODY, 512);
        assert_eq!(out, DYNAMIC_HUFFMAN_TEXT);
    }

    #[test]
    fn dynamic_huffman_block_resumes_across_split_input() {
        let mut engine = InflateEngine::new(1024);
        let mut produced = Vec::new();
        for chunk in DYNAMIC_HUFFMAN_BODY.chunks(7) {
            let is_last = chunk.as_ptr() as usize + chunk.len()
                == DYNAMIC_HUFFMAN_BODY.as_ptr() as usize + DYNAMIC_HUFFMAN_BODY.len();
            let mut input = InputSpan::new(chunk);
            loop {
                let mut buf = [0u8; 64];
                let mut out = OutputSpan::new(&mut buf);
                let status = engine.step(&mut input, is_last, &mut out).unwrap();
                produced.extend_from_slice(out.written_slice());
                match status {
                    Status::NeedMoreInput { .. } => break,
                    Status::Done { .. } => break,
                    _ => {
                        if input.is_empty() {
                            break;
                        }
                    }
                }
            }
        }
        assert_eq!(produced, DYNAMIC_HUFFMAN_TEXT);
    }

    #[test]
    fn scenario_1_minimal_fixed_huffman_empty_block() {
        // The shortest possible deflate stream: an empty final fixed-Huffman
        // block, decoded straight from two raw bytes with no envelope.
        let bytes = [0x03u8, 0x00];
        let mut engine = InflateEngine::new(512);
        let out = run_to_completion(&mut engine, &bytes, 16);
        assert!(out.is_empty());
    }

    #[test]
    fn truncated_block_header_under_final_input_is_unexpected_end_of_input() {
        // No bytes at all, but the caller says no more input is coming: the
        // very first field the engine needs (the 3-bit block header) can
        // never arrive, so this can only be a truncated stream.
        let mut engine = InflateEngine::new(512);
        let mut input = InputSpan::new(&[]);
        let mut buf = [0u8; 16];
        let mut out = OutputSpan::new(&mut buf);
        let err = engine.step(&mut input, true, &mut out).unwrap_err();
        assert_eq!(err, DecompressError::UnexpectedEndOfInput);
    }

    #[test]
    fn truncated_stored_length_under_final_input_is_unexpected_end_of_input() {
        // BFINAL=1, BTYPE=00, then only one of the four LEN/NLEN bytes.
        let mut bits = bits_lsb_first(0b1, 1);
        bits.extend(bits_lsb_first(0b00, 2));
        let mut bytes = pack_bits(&bits);
        bytes.push(0x05);
        let mut engine = InflateEngine::new(512);
        let mut input = InputSpan::new(&bytes);
        let mut buf = [0u8; 16];
        let mut out = OutputSpan::new(&mut buf);
        let err = engine.step(&mut input, true, &mut out).unwrap_err();
        assert_eq!(err, DecompressError::UnexpectedEndOfInput);
    }

    #[test]
    fn truncated_stored_length_under_non_final_input_suspends_instead_of_erroring() {
        // Same short input as above, but the caller says more may arrive:
        // this must suspend, not fail.
        let mut bits = bits_lsb_first(0b1, 1);
        bits.extend(bits_lsb_first(0b00, 2));
        let mut bytes = pack_bits(&bits);
        bytes.push(0x05);
        let mut engine = InflateEngine::new(512);
        let mut input = InputSpan::new(&bytes);
        let mut buf = [0u8; 16];
        let mut out = OutputSpan::new(&mut buf);
        let status = engine.step(&mut input, false, &mut out).unwrap();
        assert_eq!(status, Status::NeedMoreInput { written: 0 });
    }
}
