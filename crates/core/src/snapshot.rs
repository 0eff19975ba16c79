//! On-disk snapshots of the training profiles.
//!
//! Each snapshot is a pair of artifacts in the snapshot directory:
//!
//! ```text
//! snapshots/
//! ├── snapshot_<n>.jls   # bincode: the two profile columns, row order kept
//! └── snapdata.txt       # one JSON line per snapshot with coverage stats
//! ```
//!
//! Sequence numbers continue from whatever the directory already holds:
//! `n` is one past the largest index parsed out of existing payload names.
//! The metadata line is a single appended write, so a crash mid-snapshot
//! leaves prior lines intact.

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::SnapshotError;
use crate::table::StrategyTable;

/// Payload file name parts: `snapshot_<n>.jls`.
pub const SNAPSHOT_PREFIX: &str = "snapshot_";
pub const SNAPSHOT_SUFFIX: &str = ".jls";

/// The append-only metadata file.
pub const SNAPDATA_FILE: &str = "snapdata.txt";

/// The serialized payload: both profile columns, row order preserved.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnapshotProfiles {
    pub dealerprofile: Vec<f64>,
    pub poneprofile: Vec<f64>,
}

/// One line of `snapdata.txt`. Field order is the on-disk key order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnapshotRecord {
    #[serde(rename = "nSnapshot")]
    pub n_snapshot: u32,
    /// Larger of the two roles' total deal counts.
    #[serde(rename = "nDeals")]
    pub n_deals: u64,
    pub timestamp: String,
    #[serde(rename = "dCoverage")]
    pub d_coverage: f64,
    #[serde(rename = "dMin")]
    pub d_min: u64,
    #[serde(rename = "dMax")]
    pub d_max: u64,
    #[serde(rename = "pCoverage")]
    pub p_coverage: f64,
    #[serde(rename = "pMin")]
    pub p_min: u64,
    #[serde(rename = "pMax")]
    pub p_max: u64,
}

/// Write one snapshot of the table's profiles into `dir`.
///
/// Creates the directory if needed and returns the sequence number used.
/// The payload is written before the metadata line; on failure existing
/// files are left untouched.
///
/// # Errors
///
/// Returns [`SnapshotError`] on I/O or serialization failure.
///
/// # Panics
///
/// Panics if a profile block is denormalized; that is a training-side bug,
/// not a recoverable condition.
pub fn write_snapshot(table: &StrategyTable, dir: &Path) -> Result<u32, SnapshotError> {
    table.assert_profiles_normalized();
    fs::create_dir_all(dir)?;

    let n = next_snapshot_index(dir)?;
    let payload = SnapshotProfiles {
        dealerprofile: table.profile[0].clone(),
        poneprofile: table.profile[1].clone(),
    };
    let bytes =
        bincode::serialize(&payload).map_err(|e| SnapshotError::Serialize(e.to_string()))?;
    fs::write(dir.join(format!("{SNAPSHOT_PREFIX}{n}{SNAPSHOT_SUFFIX}")), bytes)?;

    let coverage = table.coverage();
    let record = SnapshotRecord {
        n_snapshot: n,
        n_deals: coverage.dealer.deals.max(coverage.pone.deals),
        timestamp: chrono::Utc::now().format("%Y-%m-%dT%H:%M:%S").to_string(),
        d_coverage: coverage.dealer.coverage,
        d_min: coverage.dealer.min,
        d_max: coverage.dealer.max,
        p_coverage: coverage.pone.coverage,
        p_min: coverage.pone.min,
        p_max: coverage.pone.max,
    };
    append_record(dir, &record)?;
    Ok(n)
}

/// Load a payload back; the interface the match runner reads profiles with.
///
/// # Errors
///
/// Returns [`SnapshotError`] if the file is missing or corrupt.
pub fn read_profiles(path: &Path) -> Result<SnapshotProfiles, SnapshotError> {
    let bytes = fs::read(path)?;
    bincode::deserialize(&bytes).map_err(|e| SnapshotError::Serialize(e.to_string()))
}

/// One past the largest `snapshot_<n>.jls` index in `dir`; 1 when none
/// exist. The whole digit run is parsed, not a single character.
///
/// # Errors
///
/// Returns [`SnapshotError`] if the directory cannot be listed.
pub fn next_snapshot_index(dir: &Path) -> Result<u32, SnapshotError> {
    let mut largest = 0;
    if dir.is_dir() {
        for entry in fs::read_dir(dir)? {
            let name = entry?.file_name();
            if let Some(n) = parse_snapshot_index(&name.to_string_lossy()) {
                largest = largest.max(n);
            }
        }
    }
    Ok(largest + 1)
}

fn parse_snapshot_index(name: &str) -> Option<u32> {
    name.strip_prefix(SNAPSHOT_PREFIX)?
        .strip_suffix(SNAPSHOT_SUFFIX)?
        .parse()
        .ok()
}

fn append_record(dir: &Path, record: &SnapshotRecord) -> Result<(), SnapshotError> {
    let mut line =
        serde_json::to_string(record).map_err(|e| SnapshotError::Serialize(e.to_string()))?;
    line.push('\n');
    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(dir.join(SNAPDATA_FILE))?;
    file.write_all(line.as_bytes())?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cards::Card;
    use tempfile::TempDir;
    use test_macros::timed_test;

    fn small_table() -> StrategyTable {
        let mut deck = Vec::new();
        for suit in 1..=2 {
            for rank in 1..=4 {
                deck.push(Card::new(rank, suit));
            }
        }
        StrategyTable::build(&deck)
    }

    #[timed_test]
    fn parse_handles_multi_digit_indices() {
        assert_eq!(parse_snapshot_index("snapshot_7.jls"), Some(7));
        assert_eq!(parse_snapshot_index("snapshot_123.jls"), Some(123));
        assert_eq!(parse_snapshot_index("snapshot_.jls"), None);
        assert_eq!(parse_snapshot_index("snapshot_7.bin"), None);
        assert_eq!(parse_snapshot_index("other_7.jls"), None);
    }

    #[timed_test]
    fn sequence_continues_from_largest() {
        let dir = TempDir::new().unwrap();
        assert_eq!(next_snapshot_index(dir.path()).unwrap(), 1);
        fs::write(dir.path().join("snapshot_3.jls"), b"x").unwrap();
        fs::write(dir.path().join("snapshot_12.jls"), b"x").unwrap();
        fs::write(dir.path().join("unrelated.txt"), b"x").unwrap();
        assert_eq!(next_snapshot_index(dir.path()).unwrap(), 13);
    }

    #[timed_test(10)]
    fn payload_roundtrips() {
        let table = small_table();
        let dir = TempDir::new().unwrap();
        let n = write_snapshot(&table, dir.path()).unwrap();
        assert_eq!(n, 1);

        let path = dir.path().join("snapshot_1.jls");
        let profiles = read_profiles(&path).unwrap();
        assert_eq!(profiles.dealerprofile, table.profile[0]);
        assert_eq!(profiles.poneprofile, table.profile[1]);
    }

    #[timed_test(10)]
    fn snapdata_accumulates_json_lines() {
        let table = small_table();
        let dir = TempDir::new().unwrap();
        write_snapshot(&table, dir.path()).unwrap();
        write_snapshot(&table, dir.path()).unwrap();

        let data = fs::read_to_string(dir.path().join(SNAPDATA_FILE)).unwrap();
        let lines: Vec<&str> = data.lines().collect();
        assert_eq!(lines.len(), 2);

        let first: SnapshotRecord = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(first.n_snapshot, 1);
        assert_eq!(first.n_deals, 0);
        assert_eq!(first.d_coverage, 0.0);
        let second: SnapshotRecord = serde_json::from_str(lines[1]).unwrap();
        assert_eq!(second.n_snapshot, 2);

        // Key order is part of the on-disk format.
        let keys: Vec<&str> = lines[0]
            .trim_start_matches('{')
            .split(',')
            .map(|kv| kv.split(':').next().unwrap().trim_matches('"'))
            .collect();
        assert_eq!(keys[0], "nSnapshot");
        assert_eq!(keys[1], "nDeals");
        assert_eq!(keys[2], "timestamp");
    }

    #[timed_test(10)]
    fn deals_and_coverage_flow_into_record() {
        use crate::cards::Role;

        let mut table = small_table();
        table.record_deal(Role::Dealer, 0);
        table.record_deal(Role::Dealer, 0);
        table.record_deal(Role::Pone, 0);

        let dir = TempDir::new().unwrap();
        write_snapshot(&table, dir.path()).unwrap();
        let data = fs::read_to_string(dir.path().join(SNAPDATA_FILE)).unwrap();
        let record: SnapshotRecord = serde_json::from_str(data.lines().next().unwrap()).unwrap();
        assert_eq!(record.n_deals, 2);
        assert_eq!(record.d_max, 2);
        assert_eq!(record.p_max, 1);
        assert!(record.d_coverage > 0.0);
    }
}
