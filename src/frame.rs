//! Framed messages: a body followed by its big-endian CRC-16.

use byteorder::{BigEndian, ByteOrder};
use hex::FromHexError;
use tracing::debug;

use crate::crc::crc16;
use crate::error::{Error, Result};
use crate::solver::{PrefixSolver, PREFIX_SOLVER};

/// Trailing checksum size in bytes.
pub const CHECKSUM_LEN: usize = 2;

/// Decode a string of hex digit pairs. Surrounding whitespace and a leading
/// `0x` are ignored; `position` in errors counts bytes after those.
pub fn parse_hex(text: &str) -> Result<Vec<u8>> {
    let text = text.trim();
    let digits = text
        .strip_prefix("0x")
        .or_else(|| text.strip_prefix("0X"))
        .unwrap_or(text);

    hex::decode(digits).map_err(|e| match e {
        FromHexError::InvalidHexCharacter { c, index } => Error::InvalidHexDigit {
            position: index,
            found: c,
        },
        _ => Error::OddHexLength {
            digits: digits.len(),
        },
    })
}

pub fn to_hex(bytes: &[u8]) -> String {
    hex::encode(bytes)
}

/// `0x` followed by four lowercase hex digits.
pub fn format_prefix(prefix: u16) -> String {
    format!("0x{prefix:04x}")
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    body: Vec<u8>,
    checksum: u16,
}

impl Frame {
    /// Split raw bytes into body and trailing checksum (high byte first).
    pub fn parse(bytes: &[u8]) -> Result<Self> {
        if bytes.len() < CHECKSUM_LEN {
            return Err(Error::FrameTooShort {
                size: bytes.len(),
                minimum: CHECKSUM_LEN,
            });
        }

        let (body, trailer) = bytes.split_at(bytes.len() - CHECKSUM_LEN);
        Ok(Self {
            body: body.to_vec(),
            checksum: BigEndian::read_u16(trailer),
        })
    }

    pub fn from_hex(text: &str) -> Result<Self> {
        Self::parse(&parse_hex(text)?)
    }

    /// Frame whose checksum was computed with the register seeded to `prefix`.
    pub fn seal(prefix: u16, body: &[u8]) -> Self {
        Self {
            body: body.to_vec(),
            checksum: crc16(prefix, body),
        }
    }

    pub fn body(&self) -> &[u8] {
        &self.body
    }

    pub fn checksum(&self) -> u16 {
        self.checksum
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(self.body.len() + CHECKSUM_LEN);
        bytes.extend_from_slice(&self.body);
        let mut trailer = [0u8; CHECKSUM_LEN];
        BigEndian::write_u16(&mut trailer, self.checksum);
        bytes.extend_from_slice(&trailer);
        bytes
    }

    /// Difference between the embedded checksum and the zero-seeded CRC of
    /// the body; the zero-message CRC of the unknown seed.
    pub fn target(&self) -> u16 {
        crc16(0, &self.body) ^ self.checksum
    }

    pub fn recover_prefix(&self) -> Result<u16> {
        self.recover_prefix_with(&PREFIX_SOLVER)
    }

    pub fn recover_prefix_with(&self, solver: &PrefixSolver) -> Result<u16> {
        let length = self.body.len();
        let target = self.target();
        debug!(length, target, checksum = self.checksum, "solving frame prefix");

        solver
            .find_prefix(length, target)
            .ok_or(Error::NoPrefix { length, target })
    }

    /// Whether seeding the register with `prefix` reproduces the checksum.
    pub fn verify(&self, prefix: u16) -> bool {
        crc16(prefix, &self.body) == self.checksum
    }
}
