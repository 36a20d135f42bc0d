//! Consecutive-day streak computation.
//!
//! A streak is a run of consecutive calendar days each containing at least one
//! qualifying completion. The same routine serves habits (from habit logs) and
//! focus sessions (from completed-session dates); callers hand in the distinct
//! active dates and "today".

use chrono::NaiveDate;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Streaks {
    pub current: u32,
    pub longest: u32,
}

/// Computes current and longest streaks from a set of active dates.
///
/// The current streak is zero when the most recent active date is more than
/// one day before `today`; otherwise it counts backward from that date while
/// each step is exactly one calendar day. The longest streak is the maximum
/// consecutive run anywhere in the history, and is never reported smaller
/// than the live streak.
pub fn compute_streaks(dates: &[NaiveDate], today: NaiveDate) -> Streaks {
    let mut distinct: Vec<NaiveDate> = dates.to_vec();
    distinct.sort_unstable();
    distinct.dedup();
    distinct.reverse();

    if distinct.is_empty() {
        return Streaks::default();
    }

    let most_recent = distinct[0];
    let mut current = 0u32;
    if (today - most_recent).num_days() <= 1 {
        current = 1;
        for pair in distinct.windows(2) {
            if (pair[0] - pair[1]).num_days() == 1 {
                current += 1;
            } else {
                break;
            }
        }
    }

    let mut longest = 1u32;
    let mut run = 1u32;
    for pair in distinct.windows(2) {
        if (pair[0] - pair[1]).num_days() == 1 {
            run += 1;
        } else {
            run = 1;
        }
        longest = longest.max(run);
    }

    Streaks {
        current,
        longest: longest.max(current),
    }
}
