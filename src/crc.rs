//! CRC-16/CCITT (poly 0x1021, MSB first) table and engine.
//!
//! The engine carries its own lookup table, built by a `const fn`, so a
//! `Crc16` can live in a constant or be constructed once and shared by
//! reference.

use std::ops::Index;

/// Generator polynomial, without the implicit x^16 term.
pub const POLY: u16 = 0x1021;

/// Register width in bits.
pub const WIDTH: u32 = 16;

/// Lookup table for [`POLY`].
pub const CRC16_TABLE: CrcTable = CrcTable::new();

/// Engine built from [`CRC16_TABLE`], usable from any thread.
pub const CRC16: Crc16 = Crc16::with_table(CRC16_TABLE);

/// One bit of the register recurrence: shift left and fold the polynomial
/// back in when a set bit falls off the top.
#[inline]
pub const fn shift_register(value: u16) -> u16 {
    if value & 0x8000 != 0 {
        (value << 1) ^ POLY
    } else {
        value << 1
    }
}

/// 256-entry lookup table for a byte fed into the top of the register.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CrcTable {
    entries: [u16; 256],
}

impl CrcTable {
    pub const fn new() -> Self {
        let mut entries = [0u16; 256];
        let mut i = 0;
        while i < 256 {
            let mut r = (i as u16) << 8;
            let mut round = 0;
            while round < 8 {
                r = shift_register(r);
                round += 1;
            }
            entries[i] = r;
            i += 1;
        }
        Self { entries }
    }

    pub fn entries(&self) -> &[u16; 256] {
        &self.entries
    }
}

impl Default for CrcTable {
    fn default() -> Self {
        Self::new()
    }
}

impl Index<u8> for CrcTable {
    type Output = u16;

    #[inline]
    fn index(&self, index: u8) -> &u16 {
        &self.entries[index as usize]
    }
}

#[derive(Clone, Debug)]
pub struct Crc16 {
    table: CrcTable,
}

impl Crc16 {
    pub const fn new() -> Self {
        Self::with_table(CrcTable::new())
    }

    pub const fn with_table(table: CrcTable) -> Self {
        Self { table }
    }

    pub fn table(&self) -> &CrcTable {
        &self.table
    }

    /// Fold a single byte into `register`.
    #[inline]
    pub fn update_byte(&self, register: u16, byte: u8) -> u16 {
        let index = ((register >> 8) as u8) ^ byte;
        self.table[index] ^ (register << 8)
    }

    /// CRC of `data` starting from the register value `seed`.
    pub fn checksum(&self, seed: u16, data: &[u8]) -> u16 {
        data.iter()
            .fold(seed, |crc, &byte| self.update_byte(crc, byte))
    }

    /// CRC of `length` zero bytes starting from `seed`, without allocating
    /// the zero buffer.
    ///
    /// For a fixed `length` this is linear over GF(2) in `seed`:
    /// `prefix(a ^ b, n) == prefix(a, n) ^ prefix(b, n)`.
    pub fn prefix(&self, seed: u16, length: usize) -> u16 {
        (0..length).fold(seed, |crc, _| self.update_byte(crc, 0))
    }

    /// Table-free shift/XOR computation, eight rounds per byte.
    pub fn bitwise(seed: u16, data: &[u8]) -> u16 {
        let mut crc = seed;
        for &byte in data {
            crc ^= (byte as u16) << 8;
            for _ in 0..8 {
                crc = shift_register(crc);
            }
        }
        crc
    }
}

impl Default for Crc16 {
    fn default() -> Self {
        Self::new()
    }
}

/// CRC of `data` seeded with `seed`, using [`CRC16`].
pub fn crc16(seed: u16, data: &[u8]) -> u16 {
    CRC16.checksum(seed, data)
}

/// CRC of a `length`-byte all-zero message seeded with `seed`, using [`CRC16`].
pub fn prefix(seed: u16, length: usize) -> u16 {
    CRC16.prefix(seed, length)
}
