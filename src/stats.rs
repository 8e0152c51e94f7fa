//! Per-day focus totals.

use crate::models::DailyStats;
use chrono::{Days, NaiveDate};

/// All recorded days, at most one record per date.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatsLog {
    days: Vec<DailyStats>,
}

impl StatsLog {
    pub fn new(days: Vec<DailyStats>) -> Self {
        Self { days }
    }

    pub fn as_slice(&self) -> &[DailyStats] {
        &self.days
    }

    /// Credits one completed focus session of `minutes` to `date`.
    pub fn record_session(&mut self, date: NaiveDate, minutes: u32) -> &DailyStats {
        let index = match self.days.iter().position(|d| d.date == date) {
            Some(index) => index,
            None => {
                self.days.push(DailyStats::new(date));
                self.days.len() - 1
            }
        };

        let day = &mut self.days[index];
        day.minutes_focused = day.minutes_focused.saturating_add(minutes);
        day.sessions_completed = day.sessions_completed.saturating_add(1);
        day
    }

    /// Totals for `date`, zeroed if nothing was recorded.
    pub fn for_date(&self, date: NaiveDate) -> DailyStats {
        self.days
            .iter()
            .find(|d| d.date == date)
            .cloned()
            .unwrap_or_else(|| DailyStats::new(date))
    }

    /// The last `days` calendar days ending at `today`, oldest first.
    pub fn recent(&self, days: u32, today: NaiveDate) -> Vec<DailyStats> {
        (0..days)
            .rev()
            .filter_map(|back| today.checked_sub_days(Days::new(back.into())))
            .map(|date| self.for_date(date))
            .collect()
    }

    pub fn total_minutes(&self) -> u64 {
        self.days.iter().map(|d| u64::from(d.minutes_focused)).sum()
    }

    pub fn total_sessions(&self) -> u64 {
        self.days.iter().map(|d| u64::from(d.sessions_completed)).sum()
    }
}
