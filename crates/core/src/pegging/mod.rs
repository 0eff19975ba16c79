//! The pegging (play-phase) sub-game.
//!
//! Two four-card hands, pone leading, alternate single lays under the 31
//! cap. [`solver`] builds the exhaustive game tree and back-propagates
//! minimax values; [`score`] prices a single lay; [`flat`] packs a solved
//! tree into the fixed-arity breadth-first form the matrix stores.

pub mod flat;
pub mod score;
pub mod solver;

pub use flat::{FlatNode, FlatTree, MAX_CHILDREN};
pub use score::score_lay;
pub use solver::{GO, PlayNode, PlayTree};
