//! The assembled strategy database.
//!
//! Ties the pieces together in dependency order: enumerate classes, lay the
//! strategy table out, then solve the play-hand matrix. Built once per deck;
//! after that only the training columns move.

use std::path::Path;

use crate::cards::Card;
use crate::error::SnapshotError;
use crate::matrix::{BuildPhase, TreeMatrix};
use crate::pegging::FlatTree;
use crate::snapshot;
use crate::table::{Coverage, StrategyTable};

/// Strategy table plus the solved pegging matrix over its play hands.
#[derive(Debug, Clone)]
pub struct StrategyDb {
    pub table: StrategyTable,
    pub matrix: TreeMatrix,
}

impl StrategyDb {
    /// Build the whole database from a deck.
    #[must_use]
    pub fn build(deck: &[Card]) -> Self {
        Self::build_with_progress(deck, &|_| {})
    }

    /// As [`StrategyDb::build`], reporting build milestones.
    #[must_use]
    pub fn build_with_progress(
        deck: &[Card],
        on_progress: &(impl Fn(BuildPhase) + Sync),
    ) -> Self {
        let table = StrategyTable::build(deck);
        on_progress(BuildPhase::TableBuilt {
            classes: table.num_classes(),
            rows: table.num_rows(),
            play_hands: table.num_play_hands(),
        });
        let matrix = TreeMatrix::build_with_progress(table.play_hands(), on_progress);
        Self { table, matrix }
    }

    /// The packed tree for a row's kept hand against an opponent class.
    #[must_use]
    pub fn tree(&self, dealer_play_id: u32, pone_play_id: u32) -> Option<&FlatTree> {
        self.matrix.get(dealer_play_id, pone_play_id)
    }

    /// Deal-coverage aggregates over both roles.
    #[must_use]
    pub fn coverage(&self) -> Coverage {
        self.table.coverage()
    }

    /// Snapshot the current profiles into `dir`; returns the sequence number.
    ///
    /// # Errors
    ///
    /// Returns [`SnapshotError`] on I/O or serialization failure.
    pub fn write_snapshot(&self, dir: &Path) -> Result<u32, SnapshotError> {
        snapshot::write_snapshot(&self.table, dir)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_macros::timed_test;

    fn small_deck() -> Vec<Card> {
        let mut deck = Vec::new();
        for suit in 1..=2 {
            for rank in 1..=4 {
                deck.push(Card::new(rank, suit));
            }
        }
        deck
    }

    #[timed_test(60)]
    fn database_wires_table_to_matrix() {
        let db = StrategyDb::build(&small_deck());
        assert_eq!(db.matrix.dim(), db.table.num_play_hands());

        // Every dealable pair of kept hands resolves to a tree.
        for dealer in 0..db.table.num_play_hands() {
            for pone in 0..db.table.num_play_hands() {
                #[allow(clippy::cast_possible_truncation)]
                let (d, p) = (dealer as u32, pone as u32);
                let dealable = db
                    .table
                    .play_hand(d)
                    .compatible_with(&db.table.play_hand(p));
                assert_eq!(db.tree(d, p).is_some(), dealable);
            }
        }
    }

    #[timed_test(60)]
    fn progress_reports_table_then_rows() {
        use std::sync::Mutex;

        let phases = Mutex::new(Vec::new());
        let db = StrategyDb::build_with_progress(&small_deck(), &|phase| {
            phases.lock().unwrap().push(phase);
        });
        let phases = phases.into_inner().unwrap();
        assert!(matches!(phases[0], BuildPhase::TableBuilt { .. }));
        let rows = phases[1..]
            .iter()
            .filter(|p| matches!(p, BuildPhase::MatrixRow { .. }))
            .count();
        assert_eq!(rows, db.matrix.dim());
    }
}
