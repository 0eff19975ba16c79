//! The strategy table: one row per (hand class, viable discard).
//!
//! Rows are grouped into contiguous blocks, one block per canonical hand, in
//! class-id order; within a block, rows follow discard enumeration order.
//! Everything structural (blocks, ids, discards, play hands, deal
//! probabilities) is fixed once [`StrategyTable::build`] returns; the
//! training loop mutates only the tally, regret, profile, and play-probability
//! columns.

use std::ops::Range;

use rustc_hash::FxHashMap;

use crate::canonical::CanonicalHand;
use crate::cards::{Card, PLAY_SIZE, PlayHand, Role};
use crate::discard::{CanonicalDiscard, enumerate_discards};
use crate::enumerate::HandCounts;

/// Tolerance when checking that a block's mixed strategy sums to one.
pub const PROFILE_EPSILON: f64 = 1e-9;

/// Per-role aggregate over the `dealt` tallies of every class block.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RoleCoverage {
    /// Total deals recorded for this role.
    pub deals: u64,
    /// Smallest per-block tally.
    pub min: u64,
    /// Largest per-block tally.
    pub max: u64,
    /// Fraction of classes dealt at least once.
    pub coverage: f64,
}

/// Deal-coverage aggregates for both roles.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coverage {
    pub dealer: RoleCoverage,
    pub pone: RoleCoverage,
}

/// The full strategy database table plus its lookup indices.
#[derive(Debug, Clone)]
pub struct StrategyTable {
    counts: HandCounts,
    hand_rows: Vec<Range<u32>>,
    play_hands: Vec<PlayHand>,
    play_hand_ids: FxHashMap<PlayHand, u32>,
    play_hand_rows: Vec<Vec<u32>>,
    p_deal: Vec<f64>,
    discards: Vec<CanonicalDiscard>,
    row_play_hand: Vec<u32>,

    /// Per-class deal tallies, written on the first row of each block.
    /// Indexed by [`Role::index`].
    pub dealt: [Vec<u64>; 2],
    /// Cumulative counterfactual regret per row.
    pub regret: [Vec<f64>; 2],
    /// Mixed strategy over each block's discards; sums to one per block.
    pub profile: [Vec<f64>; 2],
    /// `p_deal * profile`, cached per row.
    pub p_play: [Vec<f64>; 2],
    /// Per play-hand class, the summed `p_play` of its rows.
    pub play_hand_probs: [Vec<f64>; 2],
}

impl StrategyTable {
    /// Build the table for a deck: enumerate classes, lay out blocks, intern
    /// play hands, and initialize every training column.
    ///
    /// # Panics
    ///
    /// Panics on a malformed deck, or if any internal build invariant fails
    /// (all of which are bugs, not runtime conditions).
    #[must_use]
    #[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation)]
    pub fn build(deck: &[Card]) -> Self {
        let counts = HandCounts::enumerate(deck);

        let mut hand_rows = Vec::with_capacity(counts.len());
        let mut play_hands: Vec<PlayHand> = Vec::new();
        let mut play_hand_ids: FxHashMap<PlayHand, u32> = FxHashMap::default();
        let mut play_hand_rows: Vec<Vec<u32>> = Vec::new();
        let mut p_deal = Vec::new();
        let mut discards = Vec::new();
        let mut row_play_hand = Vec::new();
        let mut profile = Vec::new();
        let mut p_play: [Vec<f64>; 2] = [Vec::new(), Vec::new()];

        for class_id in 0..counts.len() as u32 {
            let hand = counts.class(class_id);
            let class_discards = enumerate_discards(hand);
            assert!(!class_discards.is_empty(), "class {hand} has no discards");

            let start = p_deal.len() as u32;
            let deal_prob = counts.deal_probability(class_id);
            let uniform = 1.0 / class_discards.len() as f64;

            for discard in class_discards {
                let kept = play_hand_after(hand, &discard);
                let play_id = *play_hand_ids.entry(kept).or_insert_with(|| {
                    play_hands.push(kept);
                    play_hand_rows.push(Vec::new());
                    (play_hands.len() - 1) as u32
                });

                let row = p_deal.len() as u32;
                play_hand_rows[play_id as usize].push(row);
                row_play_hand.push(play_id);
                p_deal.push(deal_prob);
                discards.push(discard);
                profile.push(uniform);
                for col in &mut p_play {
                    col.push(deal_prob * uniform);
                }
            }
            hand_rows.push(start..p_deal.len() as u32);
        }

        let rows = p_deal.len();
        let mut play_hand_probs = [
            vec![0.0; play_hands.len()],
            vec![0.0; play_hands.len()],
        ];
        for (role, probs) in play_hand_probs.iter_mut().enumerate() {
            for row in 0..rows {
                probs[row_play_hand[row] as usize] += p_play[role][row];
            }
        }

        let table = Self {
            counts,
            hand_rows,
            play_hands,
            play_hand_ids,
            play_hand_rows,
            p_deal,
            discards,
            row_play_hand,
            dealt: [vec![0; rows], vec![0; rows]],
            regret: [vec![0.0; rows], vec![0.0; rows]],
            profile: [profile.clone(), profile],
            p_play,
            play_hand_probs,
        };
        table.assert_profiles_normalized();
        table
    }

    #[must_use]
    pub fn num_rows(&self) -> usize {
        self.p_deal.len()
    }

    #[must_use]
    pub fn num_classes(&self) -> usize {
        self.counts.len()
    }

    #[must_use]
    pub fn num_play_hands(&self) -> usize {
        self.play_hands.len()
    }

    /// Total raw deals behind the probabilities: C(deck, 6).
    #[must_use]
    pub fn total_deals(&self) -> u64 {
        self.counts.total()
    }

    #[must_use]
    pub fn hand_class(&self, class_id: u32) -> &CanonicalHand {
        self.counts.class(class_id)
    }

    #[must_use]
    pub fn hand_id(&self, hand: &CanonicalHand) -> Option<u32> {
        self.counts.id_of(hand)
    }

    /// The contiguous row block of one class.
    #[must_use]
    pub fn block(&self, class_id: u32) -> Range<usize> {
        let range = &self.hand_rows[class_id as usize];
        range.start as usize..range.end as usize
    }

    #[must_use]
    pub fn play_hands(&self) -> &[PlayHand] {
        &self.play_hands
    }

    #[must_use]
    pub fn play_hand(&self, play_id: u32) -> PlayHand {
        self.play_hands[play_id as usize]
    }

    #[must_use]
    pub fn play_hand_id(&self, hand: &PlayHand) -> Option<u32> {
        self.play_hand_ids.get(hand).copied()
    }

    /// Rows whose kept hand is this play-hand class (not contiguous).
    #[must_use]
    pub fn rows_for_play_hand(&self, play_id: u32) -> &[u32] {
        &self.play_hand_rows[play_id as usize]
    }

    #[must_use]
    pub fn p_deal(&self, row: usize) -> f64 {
        self.p_deal[row]
    }

    #[must_use]
    pub fn discard(&self, row: usize) -> &CanonicalDiscard {
        &self.discards[row]
    }

    #[must_use]
    pub fn play_hand_of_row(&self, row: usize) -> u32 {
        self.row_play_hand[row]
    }

    /// Record one deal of a class for a role. The tally lives on the block's
    /// first row.
    pub fn record_deal(&mut self, role: Role, class_id: u32) {
        let first = self.hand_rows[class_id as usize].start as usize;
        self.dealt[role.index()][first] += 1;
    }

    /// Recompute `p_play` and the play-hand probability sums from the current
    /// profiles. The training loop may instead maintain both incrementally
    /// via direct column access and [`StrategyTable::add_play_prob`].
    pub fn refresh_play_probs(&mut self) {
        for role in 0..2 {
            for row in 0..self.num_rows() {
                self.p_play[role][row] = self.p_deal[row] * self.profile[role][row];
            }
            self.play_hand_probs[role].fill(0.0);
            for row in 0..self.num_rows() {
                self.play_hand_probs[role][self.row_play_hand[row] as usize] +=
                    self.p_play[role][row];
            }
        }
    }

    /// Incremental counterpart of [`StrategyTable::refresh_play_probs`] for a
    /// single play-hand class.
    pub fn add_play_prob(&mut self, role: Role, play_id: u32, delta: f64) {
        self.play_hand_probs[role.index()][play_id as usize] += delta;
    }

    /// Check that every block's profile sums to one for both roles.
    ///
    /// # Panics
    ///
    /// Panics when a block is denormalized; that is a training-side bug.
    pub fn assert_profiles_normalized(&self) {
        for (role, col) in self.profile.iter().enumerate() {
            for (class_id, range) in self.hand_rows.iter().enumerate() {
                let sum: f64 = col[range.start as usize..range.end as usize].iter().sum();
                assert!(
                    (sum - 1.0).abs() < PROFILE_EPSILON,
                    "profile block {class_id} sums to {sum} for role {role}"
                );
            }
        }
    }

    /// Deal-coverage aggregates over every class block (§ coverage query).
    #[must_use]
    pub fn coverage(&self) -> Coverage {
        Coverage {
            dealer: self.role_coverage(Role::Dealer),
            pone: self.role_coverage(Role::Pone),
        }
    }

    #[allow(clippy::cast_precision_loss)]
    fn role_coverage(&self, role: Role) -> RoleCoverage {
        let col = &self.dealt[role.index()];
        let mut deals = 0;
        let mut min = u64::MAX;
        let mut max = 0;
        let mut covered = 0usize;
        for range in &self.hand_rows {
            let rows = range.start as usize..range.end as usize;
            let block_max = col[rows.clone()].iter().copied().max().unwrap_or(0);
            deals += col[rows].iter().sum::<u64>();
            min = min.min(block_max);
            max = max.max(block_max);
            if block_max > 0 {
                covered += 1;
            }
        }
        RoleCoverage {
            deals,
            min,
            max,
            coverage: covered as f64 / self.num_classes() as f64,
        }
    }
}

/// The four ranks left after removing a discard from its parent class.
fn play_hand_after(hand: &CanonicalHand, discard: &CanonicalDiscard) -> PlayHand {
    let mut kept = [0u8; PLAY_SIZE];
    let mut at = 0;
    for slot in 0..4 {
        let gone = discard.group(slot).as_slice();
        let mut used = [false; 2];
        'ranks: for &rank in hand.group(slot).as_slice() {
            for (i, &g) in gone.iter().enumerate() {
                if !used[i] && g == rank {
                    used[i] = true;
                    continue 'ranks;
                }
            }
            assert!(at < PLAY_SIZE, "discard leaves more than four ranks");
            kept[at] = rank;
            at += 1;
        }
    }
    assert_eq!(at, PLAY_SIZE, "discard leaves fewer than four ranks");
    PlayHand::new(kept)
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_macros::timed_test;

    fn small_deck(ranks: u8, suits: u8) -> Vec<Card> {
        let mut deck = Vec::new();
        for suit in 1..=suits {
            for rank in 1..=ranks {
                deck.push(Card::new(rank, suit));
            }
        }
        deck
    }

    fn small_table() -> StrategyTable {
        StrategyTable::build(&small_deck(4, 2))
    }

    #[timed_test]
    fn blocks_are_contiguous_and_cover_all_rows() {
        let table = small_table();
        let mut next = 0usize;
        for class_id in 0..table.num_classes() {
            #[allow(clippy::cast_possible_truncation)]
            let block = table.block(class_id as u32);
            assert_eq!(block.start, next, "gap before block {class_id}");
            assert!(!block.is_empty());
            next = block.end;
        }
        assert_eq!(next, table.num_rows());
    }

    #[timed_test]
    fn initial_profiles_are_uniform_and_normalized() {
        let table = small_table();
        table.assert_profiles_normalized();
        for class_id in 0..table.num_classes() {
            #[allow(clippy::cast_possible_truncation)]
            let block = table.block(class_id as u32);
            #[allow(clippy::cast_precision_loss)]
            let uniform = 1.0 / block.len() as f64;
            for row in block {
                assert!((table.profile[0][row] - uniform).abs() < 1e-12);
                assert!((table.profile[1][row] - uniform).abs() < 1e-12);
            }
        }
    }

    #[timed_test]
    fn play_probabilities_sum_to_one() {
        let table = small_table();
        for role in 0..2 {
            let rows: f64 = table.p_play[role].iter().sum();
            assert!((rows - 1.0).abs() < 1e-9, "p_play sums to {rows}");
            let classes: f64 = table.play_hand_probs[role].iter().sum();
            assert!((classes - 1.0).abs() < 1e-9);
        }
    }

    #[timed_test]
    fn profile_total_equals_class_count() {
        let table = small_table();
        let total: f64 = table.profile[0].iter().sum();
        #[allow(clippy::cast_precision_loss)]
        let expected = table.num_classes() as f64;
        assert!((total - expected).abs() < 1e-6);
    }

    #[timed_test]
    #[allow(clippy::cast_possible_truncation)]
    fn play_hand_rows_agree_with_row_column() {
        let table = small_table();
        for play_id in 0..table.num_play_hands() {
            let play_id = play_id as u32;
            for &row in table.rows_for_play_hand(play_id) {
                assert_eq!(table.play_hand_of_row(row as usize), play_id);
            }
        }
        let spread: usize = (0..table.num_play_hands())
            .map(|id| table.rows_for_play_hand(id as u32).len())
            .sum();
        assert_eq!(spread, table.num_rows());
    }

    #[timed_test]
    fn every_kept_hand_has_four_ranks() {
        let table = small_table();
        for row in 0..table.num_rows() {
            let hand = table.play_hand(table.play_hand_of_row(row));
            assert_eq!(hand.ranks().len(), PLAY_SIZE);
            assert_eq!(table.discard(row).ranks().count(), 2);
        }
    }

    #[timed_test]
    fn record_deal_lands_on_first_row_and_feeds_coverage() {
        let mut table = small_table();
        table.record_deal(Role::Dealer, 0);
        table.record_deal(Role::Dealer, 0);
        table.record_deal(Role::Pone, 1);

        let first = table.block(0).start;
        assert_eq!(table.dealt[0][first], 2);

        let cov = table.coverage();
        assert_eq!(cov.dealer.deals, 2);
        assert_eq!(cov.dealer.max, 2);
        assert_eq!(cov.dealer.min, 0);
        assert_eq!(cov.pone.deals, 1);
        #[allow(clippy::cast_precision_loss)]
        let one_class = 1.0 / table.num_classes() as f64;
        assert!((cov.dealer.coverage - one_class).abs() < 1e-12);
    }

    #[timed_test]
    fn refresh_play_probs_tracks_profile_changes() {
        let mut table = small_table();
        let block = table.block(0);
        assert!(block.len() >= 2, "test needs a block with choices");
        // Move all of class 0's dealer mass onto its first discard.
        for row in block.clone() {
            table.profile[0][row] = 0.0;
        }
        table.profile[0][block.start] = 1.0;
        table.refresh_play_probs();

        let total: f64 = table.p_play[0].iter().sum();
        assert!((total - 1.0).abs() < 1e-9);
        assert!((table.p_play[0][block.start] - table.p_deal(block.start)).abs() < 1e-12);
        for row in block.start + 1..block.end {
            assert_eq!(table.p_play[0][row], 0.0);
        }
    }
}
