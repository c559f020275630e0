use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

pub const DEFAULT_SIGNUP_WEIGHT: f64 = 0.25;
pub const DEFAULT_ATTENDANCE_WEIGHT: f64 = 0.75;
pub const DEFAULT_MAX_ATTENDANCE_BONUS: f64 = 8.0;
pub const DEFAULT_ROLLING_WINDOW_WEEKS: u32 = 8;

/// How attendance history turns into a score contribution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum AttendanceModel {
    #[default]
    Linear,
    Breakpoint,
}

/// A percentage threshold and the bonus awarded once it is met.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BreakpointTier {
    pub threshold_pct: f64,
    pub bonus: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BreakpointTiers {
    pub max: BreakpointTier,
    pub middle: BreakpointTier,
    pub bottom: BreakpointTier,
}

impl BreakpointTiers {
    /// Tiers ordered by threshold, highest first, regardless of how officers labelled them.
    pub fn descending(&self) -> [BreakpointTier; 3] {
        let mut tiers = [self.max, self.middle, self.bottom];
        tiers.sort_by(|a, b| b.threshold_pct.total_cmp(&a.threshold_pct));
        tiers
    }
}

impl Default for BreakpointTiers {
    fn default() -> Self {
        Self {
            max: BreakpointTier {
                threshold_pct: 90.0,
                bonus: 8.0,
            },
            middle: BreakpointTier {
                threshold_pct: 75.0,
                bonus: 5.0,
            },
            bottom: BreakpointTier {
                threshold_pct: 50.0,
                bonus: 2.0,
            },
        }
    }
}

/// Officer-owned scoring settings for a guild. Changes apply retroactively to every score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GuildScoringConfig {
    pub attendance_type: AttendanceModel,
    pub rolling_window_weeks: u32,
    pub use_signups: bool,
    pub signup_weight: f64,
    pub attendance_weight: f64,
    /// Ceiling on the attendance contribution under either model.
    pub max_attendance_bonus: f64,
    pub breakpoints: BreakpointTiers,
    pub role_modifiers: BTreeMap<String, f64>,
    pub slot_restrictions_enabled: bool,
}

impl GuildScoringConfig {
    /// Settings used before officers configure anything: no attendance credit and no
    /// role modifiers, so scores reduce to the raw rank.
    pub fn unconfigured() -> Self {
        Self {
            attendance_type: AttendanceModel::Linear,
            rolling_window_weeks: DEFAULT_ROLLING_WINDOW_WEEKS,
            use_signups: false,
            signup_weight: 0.0,
            attendance_weight: 0.0,
            max_attendance_bonus: 0.0,
            breakpoints: BreakpointTiers::default(),
            role_modifiers: BTreeMap::new(),
            slot_restrictions_enabled: false,
        }
    }

    pub fn with_role_modifier(mut self, role: impl Into<String>, modifier: f64) -> Self {
        self.role_modifiers.insert(role.into(), modifier);
        self
    }
}

impl Default for GuildScoringConfig {
    fn default() -> Self {
        Self {
            attendance_type: AttendanceModel::Linear,
            rolling_window_weeks: DEFAULT_ROLLING_WINDOW_WEEKS,
            use_signups: true,
            signup_weight: DEFAULT_SIGNUP_WEIGHT,
            attendance_weight: DEFAULT_ATTENDANCE_WEIGHT,
            max_attendance_bonus: DEFAULT_MAX_ATTENDANCE_BONUS,
            breakpoints: BreakpointTiers::default(),
            role_modifiers: BTreeMap::new(),
            slot_restrictions_enabled: false,
        }
    }
}
