//! Piece randomizer: a bag holding several copies of every tetromino, handed
//! out without replacement and refilled once empty.

use rand::Rng;
use rand_core::RngCore;

use crate::piece::PieceKind;

/// Copies of each piece type per bag.
pub const BAG_COPIES: usize = 4;
/// Pieces in a full bag.
pub const BAG_SIZE: usize = BAG_COPIES * PieceKind::ALL.len();

/// Uniform integer in `0..bound`; `0` when `bound` is zero.
pub fn random_below<R: RngCore>(rng: &mut R, bound: u32) -> u32 {
    if bound == 0 { 0 } else { rng.random_range(0..bound) }
}

#[derive(Clone, Debug)]
pub struct PieceBag {
    pieces: [PieceKind; BAG_SIZE],
    len: usize,
}

impl Default for PieceBag {
    fn default() -> Self {
        Self::new()
    }
}

impl PieceBag {
    /// An empty bag; the first draw fills it.
    pub const fn new() -> Self {
        Self {
            pieces: [PieceKind::I; BAG_SIZE],
            len: 0,
        }
    }

    /// Pieces left before the next refill.
    pub const fn remaining(&self) -> usize {
        self.len
    }

    fn refill(&mut self) {
        for (slot, kind) in self
            .pieces
            .iter_mut()
            .zip(PieceKind::ALL.iter().cycle())
        {
            *slot = *kind;
        }
        self.len = BAG_SIZE;
    }

    /// Take a uniformly random piece out of the bag, refilling it first if it
    /// is empty.
    pub fn draw<R: RngCore>(&mut self, rng: &mut R) -> PieceKind {
        if self.len == 0 {
            self.refill();
        }
        let idx = random_below(rng, self.len as u32) as usize;
        let kind = self.pieces[idx];
        self.len -= 1;
        self.pieces.swap(idx, self.len);
        kind
    }
}
