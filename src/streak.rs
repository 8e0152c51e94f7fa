//! Consecutive-day streak over the daily stats.

use crate::models::DailyStats;
use chrono::NaiveDate;
use std::collections::HashSet;

/// Upper bound on days walked back.
const MAX_STREAK_DAYS: u32 = 10_000;

/// Counts consecutive days with at least one completed session, anchored at
/// `today` if it has a session, otherwise at yesterday. Returns 0 when
/// neither has one.
pub fn current_streak(stats: &[DailyStats], today: NaiveDate) -> u32 {
    let active: HashSet<NaiveDate> = stats
        .iter()
        .filter(|d| d.sessions_completed > 0)
        .map(|d| d.date)
        .collect();

    let mut day = if active.contains(&today) {
        today
    } else {
        match today.pred_opt() {
            Some(yesterday) if active.contains(&yesterday) => yesterday,
            _ => return 0,
        }
    };

    let mut count = 0;
    while count < MAX_STREAK_DAYS && active.contains(&day) {
        count += 1;
        day = match day.pred_opt() {
            Some(prev) => prev,
            None => break,
        };
    }
    count
}
