//! Recover the initial register ("prefix") of a CRC-16/CCITT checksum.
//!
//! Given a message body, its embedded checksum, and the knowledge that the
//! checksum was computed with some unknown register seed, the seed is the
//! unique 16-bit value whose zero-message CRC equals
//! `crc16(0, body) ^ checksum`.

pub mod batch;
pub mod crc;
pub mod error;
pub mod frame;
pub mod solver;

pub use crate::crc::{crc16, prefix, Crc16, CrcTable};
pub use crate::error::{Error, Result};
pub use crate::frame::Frame;
pub use crate::solver::{find_prefix, PrefixSolver, XorBasis};
