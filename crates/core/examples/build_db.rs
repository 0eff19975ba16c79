//! Build the full 52-card strategy database and write one snapshot.
//!
//! ```text
//! cargo run --release --example build_db
//! ```

use std::path::Path;
use std::time::Instant;

use cribbage_solver_core::StrategyDb;
use cribbage_solver_core::cards::standard_deck;

fn main() {
    let start = Instant::now();
    let deck = standard_deck();
    let db = StrategyDb::build_with_progress(&deck, &|phase| {
        eprintln!("[{:>8.1}s] {phase}", start.elapsed().as_secs_f64());
    });

    println!(
        "built {} classes / {} rows / {} play hands / {} solved cells in {:.1}s",
        db.table.num_classes(),
        db.table.num_rows(),
        db.table.num_play_hands(),
        db.matrix.solved_cells(),
        start.elapsed().as_secs_f64(),
    );

    match db.write_snapshot(Path::new("snapshots")) {
        Ok(n) => println!("wrote snapshot {n}"),
        Err(e) => eprintln!("snapshot failed: {e}"),
    }
}
