#![deny(clippy::all)]
#![warn(clippy::pedantic)]

//! Cribbage Strategy Database Core
//!
//! The substrate a CFR trainer runs on: the discard strategy table over all
//! suit-equivalence classes of six-card deals, and the exhaustively solved
//! pegging game tree for every dealable pair of kept hands.
//!
//! # Modules
//!
//! - `cards` - Card model, roles, play hands, fixed scoring constants
//! - `canonical` - Suit-symmetry canonical form for six-card deals
//! - `enumerate` - Deal-class enumeration and tallies over a deck
//! - `discard` - Canonical two-card discards per class
//! - `table` - The strategy table, its indices, and deal coverage
//! - `pegging` - Play-phase scoring, minimax solver, packed trees
//! - `matrix` - Dealer-by-pone matrix of packed trees
//! - `snapshot` - On-disk profile snapshots
//! - `db` - The assembled database
//! - `error` - Error types

pub mod canonical;
pub mod cards;
pub mod db;
pub mod discard;
pub mod enumerate;
pub mod error;
pub mod matrix;
pub mod pegging;
pub mod snapshot;
pub mod table;

pub use cards::{Card, PlayHand, Role};
pub use db::StrategyDb;
pub use error::SnapshotError;
