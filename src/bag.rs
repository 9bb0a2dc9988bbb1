//! 7-bag randomizer for piece generation
//!
//! All 7 pieces are shuffled, then dealt out before reshuffling. This
//! prevents long droughts. Seeded so both versus players can share a
//! reproducible sequence.

use crate::events::PieceSource;
use crate::tetromino::PieceKind;
use rand::SeedableRng;
use rand::seq::SliceRandom;
use rand_chacha::ChaCha8Rng;

/// Pieces shown in the next-piece preview
pub const PREVIEW_LEN: usize = 5;

#[derive(Debug, Clone)]
pub struct Bag {
    /// Preview queue for upcoming pieces
    queue: Vec<PieceKind>,
    rng: ChaCha8Rng,
}

impl Bag {
    pub fn with_seed(seed: u64) -> Self {
        let mut bag = Self {
            queue: Vec::with_capacity(14),
            rng: ChaCha8Rng::seed_from_u64(seed),
        };
        // Keep at least one full bag beyond the preview
        bag.refill();
        bag.refill();
        bag
    }

    pub fn next(&mut self) -> PieceKind {
        if self.queue.len() <= PREVIEW_LEN + 1 {
            self.refill();
        }
        self.queue.remove(0)
    }

    /// Preview the next N pieces without removing them
    pub fn preview(&self, count: usize) -> &[PieceKind] {
        &self.queue[..count.min(self.queue.len())]
    }

    fn refill(&mut self) {
        let mut new_bag = PieceKind::playable().to_vec();
        new_bag.shuffle(&mut self.rng);
        self.queue.extend(new_bag);
    }
}

impl PieceSource for Bag {
    fn request_next_piece(&mut self) -> PieceKind {
        self.next()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_every_cycle_holds_all_seven() {
        let mut bag = Bag::with_seed(7);
        for _ in 0..10 {
            let cycle: HashSet<_> = (0..7).map(|_| bag.next()).collect();
            assert_eq!(cycle.len(), 7);
        }
    }

    #[test]
    fn test_same_seed_same_sequence() {
        let mut a = Bag::with_seed(1234);
        let mut b = Bag::with_seed(1234);
        let left: Vec<_> = (0..30).map(|_| a.next()).collect();
        let right: Vec<_> = (0..30).map(|_| b.request_next_piece()).collect();
        assert_eq!(left, right);
    }

    #[test]
    fn test_preview_matches_next() {
        let mut bag = Bag::with_seed(99);
        let preview = bag.preview(PREVIEW_LEN).to_vec();
        assert_eq!(preview.len(), PREVIEW_LEN);
        let dealt: Vec<_> = (0..PREVIEW_LEN).map(|_| bag.next()).collect();
        assert_eq!(preview, dealt);
    }

    #[test]
    fn test_never_deals_special_kinds() {
        let mut bag = Bag::with_seed(5);
        for _ in 0..100 {
            assert!(bag.next().is_playable());
        }
    }
}
