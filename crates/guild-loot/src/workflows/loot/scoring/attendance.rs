use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};

use super::super::domain::AttendanceRecord;
use super::config::{AttendanceModel, GuildScoringConfig};

/// Rolls a member's attendance records into one contribution under the guild's model.
pub struct AttendanceAggregator<'a> {
    config: &'a GuildScoringConfig,
}

/// Counts behind an attendance contribution, kept for officer audits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttendanceSummary {
    pub window_start: NaiveDate,
    pub events_in_window: usize,
    pub signed_up: usize,
    pub attended: usize,
    pub no_call_no_shows: usize,
    pub contribution: f64,
}

impl AttendanceSummary {
    pub fn vetoed(&self) -> bool {
        self.no_call_no_shows > 0
    }
}

impl<'a> AttendanceAggregator<'a> {
    pub fn new(config: &'a GuildScoringConfig) -> Self {
        Self { config }
    }

    /// First day of the rolling window ending on `today`. Windows reaching past the
    /// earliest representable date start there.
    pub fn window_start(&self, today: NaiveDate) -> NaiveDate {
        Duration::try_weeks(i64::from(self.config.rolling_window_weeks))
            .and_then(|span| today.checked_sub_signed(span))
            .unwrap_or(NaiveDate::MIN)
    }

    pub fn contribution(&self, records: &[AttendanceRecord], today: NaiveDate) -> f64 {
        self.summarize(records, today).contribution
    }

    pub fn summarize(&self, records: &[AttendanceRecord], today: NaiveDate) -> AttendanceSummary {
        let window_start = self.window_start(today);
        let in_window: Vec<&AttendanceRecord> = records
            .iter()
            .filter(|record| record.raid_date >= window_start && record.raid_date <= today)
            .collect();

        let signed_up = in_window.iter().filter(|record| record.signed_up).count();
        let attended = in_window.iter().filter(|record| record.attended).count();
        let no_call_no_shows = in_window
            .iter()
            .filter(|record| record.no_call_no_show)
            .count();

        // A single no-call-no-show zeroes the window regardless of other credit.
        let contribution = if no_call_no_shows > 0 || in_window.is_empty() {
            0.0
        } else {
            match self.config.attendance_type {
                AttendanceModel::Linear => self.linear(&in_window),
                AttendanceModel::Breakpoint => self.breakpoint(&in_window),
            }
        };

        AttendanceSummary {
            window_start,
            events_in_window: in_window.len(),
            signed_up,
            attended,
            no_call_no_shows,
            contribution,
        }
    }

    fn linear(&self, records: &[&AttendanceRecord]) -> f64 {
        let total: f64 = records
            .iter()
            .map(|record| {
                let mut credit = 0.0;
                if self.config.use_signups && record.signed_up {
                    credit += self.config.signup_weight;
                }
                if record.attended {
                    credit += self.config.attendance_weight;
                }
                credit
            })
            .sum();
        self.cap(total)
    }

    fn breakpoint(&self, records: &[&AttendanceRecord]) -> f64 {
        let credited = records
            .iter()
            .filter(|record| record.attended || (self.config.use_signups && record.signed_up))
            .count();
        let ratio_pct = credited as f64 / records.len() as f64 * 100.0;

        let bonus = self
            .config
            .breakpoints
            .descending()
            .into_iter()
            .find(|tier| ratio_pct >= tier.threshold_pct)
            .map(|tier| tier.bonus)
            .unwrap_or(0.0);
        self.cap(bonus)
    }

    fn cap(&self, value: f64) -> f64 {
        let ceiling = self.config.max_attendance_bonus.max(0.0);
        value.clamp(0.0, ceiling)
    }
}
