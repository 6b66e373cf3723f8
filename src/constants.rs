/*
 * RFC 1951 (DEFLATE) and RFC 1952 (gzip) constants.
 *
 * These tables are transcribed directly from the RFCs.
 */

pub const DEFLATE_BLOCKTYPE_UNCOMPRESSED: u32 = 0;
pub const DEFLATE_BLOCKTYPE_STATIC_HUFFMAN: u32 = 1;
pub const DEFLATE_BLOCKTYPE_DYNAMIC_HUFFMAN: u32 = 2;

pub const DEFLATE_NUM_PRECODE_SYMS: usize = 19;
pub const DEFLATE_NUM_LITLEN_SYMS: usize = 288;
pub const DEFLATE_NUM_OFFSET_SYMS: usize = 32;

pub const DEFLATE_MAX_PRE_CODEWORD_LEN: u32 = 7;
pub const DEFLATE_MAX_CODEWORD_LEN: u32 = 15;

pub const DEFLATE_MAX_MATCH_LEN: usize = 258;
pub const DEFLATE_MIN_MATCH_LEN: usize = 3;

pub const DEFLATE_MIN_WINDOW_SIZE: usize = 512;
pub const DEFLATE_MAX_WINDOW_SIZE: usize = 32768;

/// The order in which precode code-length entries are transmitted.
pub const PRECODE_LENS_PERMUTATION: [u8; DEFLATE_NUM_PRECODE_SYMS] = [
    16, 17, 18, 0, 8, 7, 9, 6, 10, 5, 11, 4, 12, 3, 13, 2, 14, 1, 15,
];

/// Base length for litlen symbols 257..=285, indexed by `symbol - 257`.
pub const LEN_BASE: [u16; 29] = [
    3, 4, 5, 6, 7, 8, 9, 10, 11, 13, 15, 17, 19, 23, 27, 31, 35, 43, 51, 59, 67, 83, 99, 115, 131,
    163, 195, 227, 258,
];

/// Extra length bits for litlen symbols 257..=285.
pub const LEN_EXTRA: [u8; 29] = [
    0, 0, 0, 0, 0, 0, 0, 0, 1, 1, 1, 1, 2, 2, 2, 2, 3, 3, 3, 3, 4, 4, 4, 4, 5, 5, 5, 5, 0,
];

/// Base distance for distance symbols 0..=29.
pub const DIST_BASE: [u16; 30] = [
    1, 2, 3, 4, 5, 7, 9, 13, 17, 25, 33, 49, 65, 97, 129, 193, 257, 385, 513, 769, 1025, 1537,
    2049, 3073, 4097, 6145, 8193, 12289, 16385, 24577,
];

/// Extra distance bits for distance symbols 0..=29.
pub const DIST_EXTRA: [u8; 30] = [
    0, 0, 0, 0, 1, 1, 2, 2, 3, 3, 4, 4, 5, 5, 6, 6, 7, 7, 8, 8, 9, 9, 10, 10, 11, 11, 12, 12, 13,
    13,
];

/// gzip member header magic.
pub const GZIP_ID1: u8 = 0x1F;
pub const GZIP_ID2: u8 = 0x8B;
pub const GZIP_CM_DEFLATE: u8 = 8;

pub const GZIP_FTEXT: u8 = 1 << 0;
pub const GZIP_FHCRC: u8 = 1 << 1;
pub const GZIP_FEXTRA: u8 = 1 << 2;
pub const GZIP_FNAME: u8 = 1 << 3;
pub const GZIP_FCOMMENT: u8 = 1 << 4;
pub const GZIP_FRESERVED: u8 = 0b1110_0000;

pub const ZLIB_CM_DEFLATE: u8 = 8;
pub const ZLIB_FDICT: u8 = 1 << 5;
