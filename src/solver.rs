//! Prefix recovery by Gray-code subset search.
//!
//! For a fixed message length the zero-message CRC is linear in the initial
//! register, so its value for any register is the XOR of its values for the
//! single-bit registers `1 << i`. Recovering a register from a target is then
//! a search for the subset of those basis vectors that XORs to the target.
//! Walking the subsets in Gray-code order changes exactly one member per
//! step, so each candidate costs a single XOR.

use tracing::{trace, warn};

use crate::crc::{shift_register, Crc16, CRC16, WIDTH};
use crate::error::{Error, Result};

/// Widest basis the exhaustive search accepts.
pub const MAX_BASIS_WIDTH: usize = 24;

/// Default solver over [`CRC16`].
pub const PREFIX_SOLVER: PrefixSolver = PrefixSolver::new(CRC16);

/// Up to [`MAX_BASIS_WIDTH`] vectors over GF(2); vector `i` is paired with
/// the selector bit `1 << i`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct XorBasis {
    vectors: Vec<u32>,
}

impl XorBasis {
    pub fn new(vectors: Vec<u32>) -> Result<Self> {
        if vectors.is_empty() || vectors.len() > MAX_BASIS_WIDTH {
            return Err(Error::BasisWidth {
                width: vectors.len(),
                max: MAX_BASIS_WIDTH,
            });
        }
        Ok(Self { vectors })
    }

    pub fn width(&self) -> usize {
        self.vectors.len()
    }

    pub fn vectors(&self) -> &[u32] {
        &self.vectors
    }

    /// XOR of the vectors whose selector bits are set in `selection`.
    pub fn combine(&self, selection: u32) -> u32 {
        self.vectors
            .iter()
            .enumerate()
            .filter(|(i, _)| selection & (1 << i) != 0)
            .fold(0, |acc, (_, &v)| acc ^ v)
    }

    /// Every selection paired with the XOR of its vectors, in Gray-code
    /// order starting from the empty selection. Consecutive selections
    /// differ in exactly one bit, so each step costs one XOR.
    pub fn walk(&self) -> impl Iterator<Item = (u32, u32)> + '_ {
        let steps = 1u32 << self.vectors.len();
        let mut selection = 0u32;
        let mut value = 0u32;
        std::iter::once((selection, value)).chain((1..steps).map(move |step| {
            // Gray codes of step-1 and step differ in bit trailing_zeros(step).
            let bit = step.trailing_zeros() as usize;
            value ^= self.vectors[bit];
            selection ^= 1 << bit;
            (selection, value)
        }))
    }

    /// Selection whose vectors XOR to `target`, or `None` if no subset does.
    ///
    /// The empty selection is tried first, so a zero target always yields
    /// `Some(0)`. When several subsets match (rank-deficient basis) the first
    /// one in Gray order wins.
    pub fn solve(&self, target: u32) -> Option<u32> {
        self.walk()
            .find(|&(_, value)| value == target)
            .map(|(selection, _)| selection)
    }
}

impl From<[u16; WIDTH as usize]> for XorBasis {
    fn from(vectors: [u16; WIDTH as usize]) -> Self {
        Self {
            vectors: vectors.iter().map(|&v| v as u32).collect(),
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct PrefixSolver {
    engine: Crc16,
}

impl PrefixSolver {
    pub const fn new(engine: Crc16) -> Self {
        Self { engine }
    }

    pub fn engine(&self) -> &Crc16 {
        &self.engine
    }

    /// `basis[i] = prefix(1 << i, length)`.
    pub fn basis(&self, length: usize) -> [u16; WIDTH as usize] {
        std::array::from_fn(|i| self.engine.prefix(1 << i, length))
    }

    /// Same vectors as [`basis`](Self::basis), derived from `prefix(1, length)`
    /// by single-bit register shifts. Costs one O(length) pass instead of 16;
    /// this is the builder `find_prefix` uses.
    pub fn shifted_basis(&self, length: usize) -> [u16; WIDTH as usize] {
        let mut basis = [0u16; WIDTH as usize];
        let mut v = self.engine.prefix(1, length);
        for entry in basis.iter_mut() {
            *entry = v;
            v = shift_register(v);
        }
        basis
    }

    /// Register value `p` with `prefix(p, length) == target`.
    pub fn find_prefix(&self, length: usize, target: u16) -> Option<u16> {
        let basis = XorBasis::from(self.shifted_basis(length));
        trace!(length, target, basis = ?basis.vectors(), "prefix basis");

        let found = basis.solve(target as u32).map(|selection| selection as u16);
        if found.is_none() {
            warn!(length, target, "no basis combination matches target");
        }
        found
    }
}

/// [`PrefixSolver::find_prefix`] on the default engine.
pub fn find_prefix(length: usize, target: u16) -> Option<u16> {
    PREFIX_SOLVER.find_prefix(length, target)
}
