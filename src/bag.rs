//! Bag randomizer for piece generation
//!
//! Each batch holds five copies of all 7 pieces (35 entries), shuffled
//! together and then dealt out in order before the next batch is built.
//! The first batch of a game never opens with S, Z or O.

use crate::tetromino::TetrominoType;
use rand::Rng;
use rand::seq::SliceRandom;
use std::collections::VecDeque;
use tracing::trace;

/// Copies of the 7-piece set per batch
pub const BAG_COPIES: usize = 5;
pub const BATCH_SIZE: usize = BAG_COPIES * 7;

/// The piece supply, driven by an injected RNG
#[derive(Debug, Clone)]
pub struct Bag<R> {
    /// Pieces not dealt yet from the current batch
    queue: VecDeque<TetrominoType>,
    rng: R,
    /// The next batch built is the first of a game
    first_batch: bool,
}

/// Opening pieces that are hard to place on an empty board
fn is_unfair_opener(piece: TetrominoType) -> bool {
    matches!(piece, TetrominoType::S | TetrominoType::Z | TetrominoType::O)
}

impl<R: Rng> Bag<R> {
    pub fn new(rng: R) -> Self {
        Self {
            queue: VecDeque::with_capacity(BATCH_SIZE),
            rng,
            first_batch: true,
        }
    }

    /// Get the next piece, building a new batch when the current one is spent
    pub fn next(&mut self) -> TetrominoType {
        loop {
            if let Some(piece) = self.queue.pop_front() {
                return piece;
            }
            self.refill();
        }
    }

    /// Preview the pieces left in the current batch without removing them
    pub fn preview(&self, count: usize) -> impl Iterator<Item = TetrominoType> + '_ {
        self.queue.iter().copied().take(count)
    }

    /// Drop pending pieces; the next batch is treated as a game's first
    pub fn clear(&mut self) {
        self.queue.clear();
        self.first_batch = true;
    }

    /// Build a fresh shuffled batch
    fn refill(&mut self) {
        let mut batch: Vec<TetrominoType> = TetrominoType::all()
            .iter()
            .copied()
            .cycle()
            .take(BATCH_SIZE)
            .collect();
        batch.shuffle(&mut self.rng);

        if self.first_batch {
            while is_unfair_opener(batch[0]) {
                batch.shuffle(&mut self.rng);
            }
            self.first_batch = false;
        }

        trace!(first = ?batch[0], "built new batch");
        self.queue.extend(batch);
    }
}
