//! The dealer-by-pone matrix of packed pegging trees.
//!
//! One cell per ordered pair of play-hand classes. A cell is empty exactly
//! when the pair is undealable (some rank would need more than four copies);
//! every other cell holds the packed solution of that pairing, pone leading.
//!
//! The outer dealer sweep is sequential; each inner pone sweep is a pure
//! function of the pair and fans out across rayon's pool, one writer per
//! cell.

use std::fmt;

use rayon::prelude::*;

use crate::cards::PlayHand;
use crate::pegging::{FlatTree, PlayTree};

/// Progress milestones for the long-running database build.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildPhase {
    /// Strategy table finished: class, row, and play-hand counts.
    TableBuilt {
        classes: usize,
        rows: usize,
        play_hands: usize,
    },
    /// One dealer row of the matrix solved.
    MatrixRow { row: usize, total: usize },
}

impl fmt::Display for BuildPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TableBuilt {
                classes,
                rows,
                play_hands,
            } => write!(
                f,
                "table built: {classes} classes, {rows} rows, {play_hands} play hands"
            ),
            Self::MatrixRow { row, total } => write!(f, "matrix row {row}/{total}"),
        }
    }
}

/// Square matrix of solved pegging trees, dealer hand on axis 1.
#[derive(Debug, Clone)]
pub struct TreeMatrix {
    dim: usize,
    cells: Vec<Option<FlatTree>>,
}

impl TreeMatrix {
    /// Solve every dealable ordered pair of play hands.
    #[must_use]
    pub fn build(play_hands: &[PlayHand]) -> Self {
        Self::build_with_progress(play_hands, &|_| {})
    }

    /// As [`TreeMatrix::build`], reporting once per completed dealer row.
    #[must_use]
    pub fn build_with_progress(
        play_hands: &[PlayHand],
        on_progress: &(impl Fn(BuildPhase) + Sync),
    ) -> Self {
        let dim = play_hands.len();
        let mut cells = Vec::with_capacity(dim * dim);
        for (row, &dealer) in play_hands.iter().enumerate() {
            let mut row_cells: Vec<Option<FlatTree>> = play_hands
                .par_iter()
                .map(|&pone| {
                    dealer
                        .compatible_with(&pone)
                        .then(|| FlatTree::from_tree(&PlayTree::solve(dealer, pone)))
                })
                .collect();
            cells.append(&mut row_cells);
            on_progress(BuildPhase::MatrixRow {
                row: row + 1,
                total: dim,
            });
        }
        Self { dim, cells }
    }

    /// Side length: the number of play-hand classes.
    #[must_use]
    pub fn dim(&self) -> usize {
        self.dim
    }

    /// The packed tree for (dealer class, pone class); `None` marks an
    /// undealable pair, and indexing one is a bug in the caller.
    #[must_use]
    pub fn get(&self, dealer_id: u32, pone_id: u32) -> Option<&FlatTree> {
        self.cells[dealer_id as usize * self.dim + pone_id as usize].as_ref()
    }

    /// Number of non-empty cells.
    #[must_use]
    pub fn solved_cells(&self) -> usize {
        self.cells.iter().filter(|c| c.is_some()).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use test_macros::timed_test;

    fn hands() -> Vec<PlayHand> {
        vec![
            PlayHand::new([5, 5, 5, 5]),
            PlayHand::new([5, 5, 6, 7]),
            PlayHand::new([1, 2, 3, 4]),
            PlayHand::new([10, 11, 12, 13]),
        ]
    }

    #[timed_test(10)]
    fn emptiness_matches_compatibility() {
        let hands = hands();
        let matrix = TreeMatrix::build(&hands);
        assert_eq!(matrix.dim(), hands.len());
        for (i, a) in hands.iter().enumerate() {
            for (j, b) in hands.iter().enumerate() {
                #[allow(clippy::cast_possible_truncation)]
                let cell = matrix.get(i as u32, j as u32);
                assert_eq!(
                    cell.is_some(),
                    a.compatible_with(b),
                    "cell ({i}, {j}) for {a} vs {b}"
                );
            }
        }
    }

    #[timed_test(10)]
    fn cells_agree_with_direct_solves() {
        let hands = hands();
        let matrix = TreeMatrix::build(&hands);
        let tree = matrix.get(2, 3).expect("dealable pair");
        let direct = PlayTree::solve(hands[2], hands[3]);
        assert_eq!(tree.root_value(), direct.value());
        assert_eq!(*tree, FlatTree::from_tree(&direct));
    }

    #[timed_test(10)]
    fn quads_against_quads_is_empty_on_diagonal() {
        let hands = hands();
        let matrix = TreeMatrix::build(&hands);
        assert!(matrix.get(0, 0).is_none(), "eight fives cannot be dealt");
        assert!(matrix.get(2, 2).is_some(), "two of each low rank is fine");
    }

    #[timed_test(10)]
    fn progress_fires_once_per_row() {
        let hands = hands();
        let fired = AtomicUsize::new(0);
        let matrix = TreeMatrix::build_with_progress(&hands, &|phase| {
            if matches!(phase, BuildPhase::MatrixRow { .. }) {
                fired.fetch_add(1, Ordering::Relaxed);
            }
        });
        assert_eq!(fired.load(Ordering::Relaxed), matrix.dim());
    }
}
