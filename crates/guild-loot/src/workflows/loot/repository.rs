use chrono::NaiveDate;

use super::domain::{
    AttendanceRecord, GuildId, Item, ItemId, Member, MemberId, Submission, SubmissionId, TierId,
};
use super::scoring::GuildScoringConfig;

/// Read-only item metadata owned by the raid-tier admin screens.
pub trait ItemCatalog: Send + Sync {
    fn items_for_tier(&self, tier_id: &TierId) -> Result<Vec<Item>, RepositoryError>;
    fn item(&self, item_id: &ItemId) -> Result<Option<Item>, RepositoryError>;
}

/// Submission storage. Implementations must apply `replace_submission` atomically:
/// every stored selection is deleted and the new set inserted as one unit.
pub trait SubmissionStore: Send + Sync {
    fn submission(&self, id: &SubmissionId) -> Result<Option<Submission>, RepositoryError>;
    fn submissions_for_member(
        &self,
        member_id: &MemberId,
        tier_id: &TierId,
    ) -> Result<Vec<Submission>, RepositoryError>;
    /// Approved or pending submissions in the guild that rank `item_id`.
    fn active_submissions_for_item(
        &self,
        guild_id: &GuildId,
        item_id: &ItemId,
    ) -> Result<Vec<Submission>, RepositoryError>;
    fn replace_submission(&self, submission: Submission) -> Result<(), RepositoryError>;
}

pub trait AttendanceStore: Send + Sync {
    /// Records for `member_id` on or after `window_start`.
    fn records(
        &self,
        member_id: &MemberId,
        window_start: NaiveDate,
    ) -> Result<Vec<AttendanceRecord>, RepositoryError>;
}

pub trait GuildSettingsStore: Send + Sync {
    /// `None` when officers have not configured scoring yet.
    fn get(&self, guild_id: &GuildId) -> Result<Option<GuildScoringConfig>, RepositoryError>;
}

pub trait GuildRoster: Send + Sync {
    fn member(&self, member_id: &MemberId) -> Result<Option<Member>, RepositoryError>;
}

/// Everything the loot service reads from or writes to.
pub trait LootStore:
    ItemCatalog + SubmissionStore + AttendanceStore + GuildSettingsStore + GuildRoster
{
}

impl<T> LootStore for T where
    T: ItemCatalog + SubmissionStore + AttendanceStore + GuildSettingsStore + GuildRoster
{
}

/// Error enumeration for repository failures.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("record already exists")]
    Conflict,
    #[error("record not found")]
    NotFound,
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}
