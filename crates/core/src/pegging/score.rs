//! Pricing a single lay: pairs, runs, fifteens, thirty-ones.

use crate::cards::{PAIR_SCORES, TOTAL_CAP};

/// Points scored by laying `play`.
///
/// `history` holds the ranks laid before this one, oldest first, with Go
/// sentinels as 0; `total` is the running total after the lay. `pair_len`
/// carries the active pair chain across lays and is updated in place.
pub fn score_lay(play: u8, history: &[u8], total: u8, pair_len: &mut u8) -> u8 {
    let mut points = 0;

    // Pairs. A sentinel never equals a rank, so a Go breaks the chain.
    if history.last() == Some(&play) {
        *pair_len += 1;
        points += PAIR_SCORES[usize::from(*pair_len - 1)];
    } else {
        *pair_len = 0;
    }

    points += run_points(play, history);

    if total == 15 {
        points += 2;
    }
    if total == TOTAL_CAP {
        points += 1;
    }
    points
}

/// Longest run completed by `play`: the largest k >= 3 such that the last
/// k lays, sorted, are consecutive ranks. Runs never cross a Go sentinel.
#[allow(clippy::cast_possible_truncation)]
fn run_points(play: u8, history: &[u8]) -> u8 {
    let segment_start = history.iter().rposition(|&r| r == 0).map_or(0, |i| i + 1);
    let segment = &history[segment_start..];

    // At most seven prior lays can join a window under the 31 cap.
    let mut window = [0u8; 8];
    for prior in (2..=segment.len().min(7)).rev() {
        window[..prior].copy_from_slice(&segment[segment.len() - prior..]);
        window[prior] = play;
        let run = &mut window[..=prior];
        run.sort_unstable();
        if run.windows(2).all(|w| w[1] == w[0] + 1) {
            return (prior + 1) as u8;
        }
    }
    0
}
