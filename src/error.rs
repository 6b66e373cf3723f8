/*
 * Structural decode errors.
 *
 * Deliberately a plain enum with a hand-written Display: this crate's
 * error domain is small and closed, and every variant already carries the
 * data a caller needs.
 */

use core::fmt;

/// Every way a stream can be rejected as invalid or unsupported.
///
/// All variants are fatal: once returned, the decoder that produced it is
/// poisoned and will keep returning the same error (see `engine::State::Errored`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum DecompressError {
    /// Input ended where more bits were required and no further input will
    /// ever arrive (the caller signaled EOF mid-stream).
    UnexpectedEndOfInput,
    /// gzip ID1/ID2 mismatch, or zlib CMF/FLG not divisible by 31.
    InvalidMagic,
    /// Compression method is not 8 ("deflate").
    UnsupportedMethod,
    /// gzip FRESERVED bits set, or a flag combination this envelope can't interpret.
    UnsupportedFlags,
    /// zlib CINFO implies a window size this decoder cannot honor (> 15).
    InvalidWindowSize,
    /// gzip FHCRC didn't match the header bytes it covers.
    HeaderChecksumMismatch,
    /// Block type bits were `11`.
    InvalidBlockType,
    /// Stored block's LEN and NLEN were not complements.
    InvalidStoredLength,
    /// Huffman code-length vector does not form a valid canonical code.
    InvalidCodeSet,
    /// Literal/length symbol >= 286.
    InvalidLengthCode,
    /// Distance symbol >= 30.
    InvalidDistanceCode,
    /// Code-length repeat symbol (16) appeared with no previous length, or a
    /// repeat run overflowed the code-length vector being assembled.
    InvalidRepeatPrefix,
    /// Back-reference distance exceeds the number of bytes emitted so far.
    DistanceTooFar,
    /// Trailer checksum did not match the computed one.
    ChecksumMismatch,
    /// zlib FDICT was set; decoding cannot continue without the dictionary
    /// whose Adler-32 id is carried here. Supplying and applying the
    /// dictionary is out of scope for this crate.
    NeedsPresetDictionary(u32),
}

impl fmt::Display for DecompressError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnexpectedEndOfInput => write!(f, "unexpected end of input"),
            Self::InvalidMagic => write!(f, "invalid stream magic/header"),
            Self::UnsupportedMethod => write!(f, "unsupported compression method"),
            Self::UnsupportedFlags => write!(f, "unsupported header flags"),
            Self::InvalidWindowSize => write!(f, "invalid window size"),
            Self::HeaderChecksumMismatch => write!(f, "header checksum mismatch"),
            Self::InvalidBlockType => write!(f, "invalid deflate block type"),
            Self::InvalidStoredLength => write!(f, "invalid stored block length"),
            Self::InvalidCodeSet => write!(f, "invalid huffman code length set"),
            Self::InvalidLengthCode => write!(f, "invalid length code"),
            Self::InvalidDistanceCode => write!(f, "invalid distance code"),
            Self::InvalidRepeatPrefix => write!(f, "invalid code length repeat"),
            Self::DistanceTooFar => write!(f, "back-reference distance too far"),
            Self::ChecksumMismatch => write!(f, "trailer checksum mismatch"),
            Self::NeedsPresetDictionary(id) => {
                write!(f, "stream requires preset dictionary {id:#010x}")
            }
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for DecompressError {}

/// Outcome of a single call into the resumable engine or an envelope.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    /// Made progress; `written` bytes were placed into the output buffer
    /// this call. The caller may call again with more input and/or a fresh
    /// output buffer.
    Progress { written: usize },
    /// The output buffer filled up before any input shortage occurred.
    /// Equivalent to `Progress` but named separately so callers can tell
    /// "stopped because you gave me no more room" from other progress.
    OutputFull { written: usize },
    /// The input span was exhausted before the engine could make further
    /// progress. `written` bytes were placed into the output buffer in this
    /// call (possibly zero) before the shortage was hit. The caller should
    /// refill its input buffer and call again.
    NeedMoreInput { written: usize },
    /// The stream is fully decoded (final block consumed, trailer verified
    /// for wrapped streams). `written` bytes were placed into the output
    /// buffer in this call before reaching end of stream.
    Done { written: usize },
}

pub type Result<T> = core::result::Result<T, DecompressError>;
