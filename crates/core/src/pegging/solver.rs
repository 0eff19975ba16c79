//! Exhaustive minimax solver for one pair of play hands.
//!
//! Arena-allocated like the rest of the engine's trees: nodes live in a flat
//! `Vec` with the root at index 0 and children referencing indices. The tree
//! is transient; it exists to be flattened and then dropped.

use crate::cards::{PLAY_SIZE, PlayHand, Role, TOTAL_CAP, play_value};

use super::score::score_lay;

/// Sentinel rank for a Go.
pub const GO: u8 = 0;

/// One solved node.
///
/// `plays[i]` is the rank laid to reach `children[i]`, `GO` for a forced Go.
/// `total` and `scores` describe the position on entry (terminal nodes fold
/// the last-card point into `scores`).
#[derive(Debug, Clone)]
pub struct PlayNode {
    pub plays: Vec<u8>,
    pub children: Vec<u32>,
    pub total: u8,
    pub scores: [i16; 2],
    /// Minimax dealer-minus-pone differential.
    pub value: i8,
    /// First play achieving `value`; `GO` at terminals and forced Gos.
    pub best_play: u8,
}

/// A fully solved pegging tree.
#[derive(Debug, Clone)]
pub struct PlayTree {
    nodes: Vec<PlayNode>,
}

impl PlayTree {
    /// Solve the sub-game with the pone leading, as every real hand starts.
    #[must_use]
    pub fn solve(dealer: PlayHand, pone: PlayHand) -> Self {
        Self::solve_from(dealer, pone, Role::Pone)
    }

    /// Solve with an explicit leader. Swapping the two hands and the leader
    /// mirrors the game, negating the root value.
    #[must_use]
    pub fn solve_from(dealer: PlayHand, pone: PlayHand, leader: Role) -> Self {
        let state = LayState {
            owner: leader,
            hands: [RankHand::new(dealer), RankHand::new(pone)],
            history: Vec::new(),
            total: 0,
            pair_len: 0,
            scores: [0, 0],
        };
        let mut nodes = Vec::new();
        build(&state, &mut nodes);
        Self { nodes }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    #[must_use]
    pub fn node(&self, index: u32) -> &PlayNode {
        &self.nodes[index as usize]
    }

    #[must_use]
    pub fn root(&self) -> &PlayNode {
        &self.nodes[0]
    }

    /// Root minimax value: dealer pegging points minus pone pegging points.
    #[must_use]
    pub fn value(&self) -> i8 {
        self.nodes[0].value
    }
}

/// One player's remaining cards: a sorted rank multiset.
#[derive(Debug, Clone, Copy)]
struct RankHand {
    len: u8,
    ranks: [u8; PLAY_SIZE],
}

impl RankHand {
    #[allow(clippy::cast_possible_truncation)]
    fn new(hand: PlayHand) -> Self {
        Self {
            len: PLAY_SIZE as u8,
            ranks: hand.ranks(),
        }
    }

    fn is_empty(self) -> bool {
        self.len == 0
    }

    fn as_slice(&self) -> &[u8] {
        &self.ranks[..usize::from(self.len)]
    }

    fn remove_first(&mut self, rank: u8) {
        let len = usize::from(self.len);
        let at = self.ranks[..len]
            .iter()
            .position(|&r| r == rank)
            .expect("removed rank must be in hand");
        self.ranks.copy_within(at + 1..len, at);
        self.len -= 1;
    }
}

/// Position on entry to a node; cloned per candidate lay.
#[derive(Debug, Clone)]
struct LayState {
    owner: Role,
    hands: [RankHand; 2],
    history: Vec<u8>,
    total: u8,
    pair_len: u8,
    scores: [i16; 2],
}

/// Recursively solve `state`, returning the arena index of its node.
#[allow(clippy::cast_possible_truncation)]
fn build(state: &LayState, nodes: &mut Vec<PlayNode>) -> u32 {
    let index = nodes.len() as u32;
    nodes.push(PlayNode {
        plays: Vec::new(),
        children: Vec::new(),
        total: state.total,
        scores: state.scores,
        value: 0,
        best_play: GO,
    });

    // Both hands played out: the last actual card was laid by the player
    // whose turn it now is not; they take the last-card point.
    if state.hands[0].is_empty() && state.hands[1].is_empty() {
        let mut scores = state.scores;
        scores[state.owner.opponent().index()] += 1;
        let node = &mut nodes[index as usize];
        node.scores = scores;
        node.value = differential(scores);
        return index;
    }

    let me = state.owner.index();
    let mut plays = Vec::new();
    let mut children = Vec::new();

    // Each distinct rank once, in hand order.
    let mut previous = GO;
    for &rank in state.hands[me].as_slice() {
        if rank == previous {
            continue;
        }
        previous = rank;
        if play_value(rank) + state.total > TOTAL_CAP {
            continue;
        }

        let mut child = state.clone();
        let total = state.total + play_value(rank);
        let points = score_lay(rank, &state.history, total, &mut child.pair_len);
        child.scores[me] += i16::from(points);
        child.hands[me].remove_first(rank);
        child.history.push(rank);
        child.total = total;
        child.owner = state.owner.opponent();
        let child_index = build(&child, nodes);
        plays.push(rank);
        children.push(child_index);
    }

    if children.is_empty() {
        // Forced Go. A second consecutive Go resets the count; a first Go
        // hands the opponent a point and changes nothing else.
        let mut child = state.clone();
        child.owner = state.owner.opponent();
        if state.history.last() == Some(&GO) {
            child.total = 0;
            child.pair_len = 0;
        } else {
            child.scores[state.owner.opponent().index()] += 1;
        }
        child.history.push(GO);
        let child_index = build(&child, nodes);

        let value = nodes[child_index as usize].value;
        let node = &mut nodes[index as usize];
        node.plays.push(GO);
        node.children.push(child_index);
        node.value = value;
        node.best_play = GO;
        return index;
    }

    // Minimax: the dealer maximizes the differential, the pone minimizes.
    // The first candidate achieving the extremum wins ties.
    let mut best = 0;
    for i in 1..children.len() {
        let v = nodes[children[i] as usize].value;
        let b = nodes[children[best] as usize].value;
        let better = match state.owner {
            Role::Dealer => v > b,
            Role::Pone => v < b,
        };
        if better {
            best = i;
        }
    }

    let value = nodes[children[best] as usize].value;
    let best_play = plays[best];
    let node = &mut nodes[index as usize];
    node.plays = plays;
    node.children = children;
    node.value = value;
    node.best_play = best_play;
    index
}

fn differential(scores: [i16; 2]) -> i8 {
    i8::try_from(scores[0] - scores[1]).expect("pegging differential fits i8")
}
