mod attendance;
mod config;
mod roles;

pub use attendance::{AttendanceAggregator, AttendanceSummary};
pub use config::{
    AttendanceModel, BreakpointTier, BreakpointTiers, GuildScoringConfig,
    DEFAULT_ATTENDANCE_WEIGHT, DEFAULT_MAX_ATTENDANCE_BONUS, DEFAULT_ROLLING_WINDOW_WEEKS,
    DEFAULT_SIGNUP_WEIGHT,
};
pub use roles::RoleModifierResolver;

use super::domain::{AttendanceRecord, Member, Rank};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Composite priority number: higher wins. Never rounded here.
pub fn loot_score(rank: Rank, attendance_contribution: f64, role_modifier: f64) -> f64 {
    f64::from(rank.value()) + attendance_contribution + role_modifier
}

/// Scores ranked claims for one guild's configuration.
pub struct LootScoreCalculator<'a> {
    config: &'a GuildScoringConfig,
}

impl<'a> LootScoreCalculator<'a> {
    pub fn new(config: &'a GuildScoringConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &GuildScoringConfig {
        self.config
    }

    /// Full breakdown for `member` claiming an item at `rank`, using the records that
    /// fall inside the rolling window ending on `today`.
    pub fn breakdown(
        &self,
        rank: Rank,
        member: &Member,
        records: &[AttendanceRecord],
        today: NaiveDate,
    ) -> LootScoreBreakdown {
        let attendance = AttendanceAggregator::new(self.config).summarize(records, today);
        let role_modifier = RoleModifierResolver::new(self.config).modifier(&member.role);

        LootScoreBreakdown {
            rank,
            attendance_contribution: attendance.contribution,
            role: member.role.clone(),
            role_modifier,
            total: loot_score(rank, attendance.contribution, role_modifier),
            attendance,
        }
    }
}

/// Transparent view of how a loot score was assembled.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LootScoreBreakdown {
    pub rank: Rank,
    pub attendance_contribution: f64,
    pub role: String,
    pub role_modifier: f64,
    pub total: f64,
    pub attendance: AttendanceSummary,
}

impl LootScoreBreakdown {
    /// Presentation rounding to two decimals.
    pub fn display_total(&self) -> String {
        format!("{:.2}", self.total)
    }
}
