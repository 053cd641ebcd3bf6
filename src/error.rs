//! Error type shared by the frame, solver and batch modules.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// Hex input has an odd number of digits.
    #[error("hex message has an odd number of digits ({digits})")]
    OddHexLength { digits: usize },

    /// Hex input contains something other than a hex digit.
    #[error("invalid hex digit {found:?} at position {position}")]
    InvalidHexDigit { position: usize, found: char },

    /// A frame needs at least the two trailing checksum bytes.
    #[error("frame is {size} bytes, need at least {minimum}")]
    FrameTooShort { size: usize, minimum: usize },

    /// No combination of basis vectors reproduces the target.
    #[error("no prefix reproduces target 0x{target:04x} for a {length}-byte message")]
    NoPrefix { length: usize, target: u16 },

    /// An input line is not valid UTF-8.
    #[error("line {line} is not valid UTF-8")]
    InvalidUtf8 { line: usize },

    /// Reading the input failed; no later lines are available.
    #[error("read failed at line {line}: {message}")]
    Io { line: usize, message: String },

    /// Basis width outside what the subset search can enumerate.
    #[error("basis has {width} vectors, expected 1..={max}")]
    BasisWidth { width: usize, max: usize },
}
