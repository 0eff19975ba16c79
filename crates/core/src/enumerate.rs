//! Exhaustive enumeration of six-card deals from a deck.
//!
//! Sweeps every C(n, 6) combination, canonicalizes each, and tallies how many
//! raw deals land in each class. The sweep is sequential on purpose: class
//! ids are assigned on first sight, and the whole table build downstream
//! depends on that insertion order being deterministic.

use rustc_hash::FxHashMap;

use crate::canonical::{CanonicalHand, assert_deck_well_formed};
use crate::cards::{Card, DEAL_SIZE};

/// Per-class deal tallies over one deck.
#[derive(Debug, Clone)]
pub struct HandCounts {
    classes: Vec<CanonicalHand>,
    counts: Vec<u64>,
    ids: FxHashMap<CanonicalHand, u32>,
    total: u64,
}

impl HandCounts {
    /// Count every six-card combination of `deck` by canonical class.
    ///
    /// # Panics
    ///
    /// Panics if the deck holds duplicate or out-of-range cards, or fewer
    /// than six cards.
    #[must_use]
    pub fn enumerate(deck: &[Card]) -> Self {
        assert_deck_well_formed(deck);
        assert!(
            deck.len() >= DEAL_SIZE,
            "deck of {} cannot deal {DEAL_SIZE} cards",
            deck.len()
        );

        let mut counts = Self {
            classes: Vec::new(),
            counts: Vec::new(),
            ids: FxHashMap::default(),
            total: 0,
        };
        let mut pick = [deck[0]; DEAL_SIZE];
        for_each_deal(deck, 0, 0, &mut pick, &mut |deal| counts.tally(deal));
        counts
    }

    fn tally(&mut self, deal: &[Card; DEAL_SIZE]) {
        let (hand, _) = CanonicalHand::canonicalize(deal);
        self.total += 1;
        if let Some(&id) = self.ids.get(&hand) {
            self.counts[id as usize] += 1;
        } else {
            #[allow(clippy::cast_possible_truncation)]
            let id = self.classes.len() as u32;
            self.ids.insert(hand, id);
            self.classes.push(hand);
            self.counts.push(1);
        }
    }

    /// Number of distinct classes seen.
    #[must_use]
    pub fn len(&self) -> usize {
        self.classes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    /// Total raw deals swept: C(deck, 6).
    #[must_use]
    pub fn total(&self) -> u64 {
        self.total
    }

    #[must_use]
    pub fn class(&self, id: u32) -> &CanonicalHand {
        &self.classes[id as usize]
    }

    #[must_use]
    pub fn count(&self, id: u32) -> u64 {
        self.counts[id as usize]
    }

    /// Probability of being dealt a hand of this class.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn deal_probability(&self, id: u32) -> f64 {
        self.counts[id as usize] as f64 / self.total as f64
    }

    #[must_use]
    pub fn id_of(&self, hand: &CanonicalHand) -> Option<u32> {
        self.ids.get(hand).copied()
    }

    /// Classes in first-sight order with their tallies.
    #[allow(clippy::cast_possible_truncation)]
    pub fn iter(&self) -> impl Iterator<Item = (u32, &CanonicalHand, u64)> + '_ {
        self.classes
            .iter()
            .zip(&self.counts)
            .enumerate()
            .map(|(id, (hand, &count))| (id as u32, hand, count))
    }
}

/// Visit every `DEAL_SIZE`-combination of `deck` in lexicographic index
/// order.
fn for_each_deal(
    deck: &[Card],
    start: usize,
    depth: usize,
    pick: &mut [Card; DEAL_SIZE],
    visit: &mut impl FnMut(&[Card; DEAL_SIZE]),
) {
    if depth == DEAL_SIZE {
        visit(pick);
        return;
    }
    let remaining = DEAL_SIZE - depth;
    for i in start..=deck.len() - remaining {
        pick[depth] = deck[i];
        for_each_deal(deck, i + 1, depth + 1, pick, visit);
    }
}
