//! Loot priority engine: bracket validation of ranked wishlists, attendance-weighted
//! scoring, and per-item priority ordering with tie annotation.

pub mod attendance_import;
pub mod catalog;
pub mod domain;
pub mod priority;
pub mod repository;
pub mod router;
pub mod scoring;
pub mod service;
pub mod validation;

#[cfg(test)]
mod tests;

use chrono::NaiveDate;

pub use attendance_import::{AttendanceImportError, AttendanceImporter};
pub use catalog::ItemIndex;
pub use domain::{
    AttendanceRecord, DomainError, GuildId, Item, ItemClassification, ItemId,
    LootIntegrityError, Member, MemberId, RaidEventId, Rank, RankedSelection, SlotIndex,
    StatusTransitionError, Submission, SubmissionId, SubmissionStatus, TierId,
};
pub use priority::{
    CompetitionEntry, PriorityListing, PriorityResolver, ScoredClaim, TieGroup,
    DEFAULT_PRIORITY_LIMIT,
};
pub use repository::{
    AttendanceStore, GuildRoster, GuildSettingsStore, ItemCatalog, LootStore, RepositoryError,
    SubmissionStore,
};
pub use router::loot_router;
pub use scoring::{
    loot_score, AttendanceAggregator, AttendanceModel, AttendanceSummary, BreakpointTier,
    BreakpointTiers, GuildScoringConfig, LootScoreBreakdown, LootScoreCalculator,
};
pub use service::{
    BoardEntry, ItemPriority, LootPriorityService, LootServiceError, MemberClaimView,
};
pub use validation::{
    Bracket, BracketValidator, BracketViolation, BracketViolationReport, GlobalViolation,
    RankTier, SubmissionValidation,
};

/// Validate `submission` against the tier's `items` using the guild's slot policy.
pub fn validate_submission(
    submission: &Submission,
    items: &[Item],
    config: &GuildScoringConfig,
) -> Result<SubmissionValidation, LootIntegrityError> {
    let catalog: ItemIndex = items.iter().cloned().collect();
    BracketValidator::new(config.slot_restrictions_enabled).validate(submission, &catalog)
}

pub fn compute_loot_score(
    rank: Rank,
    member: &Member,
    config: &GuildScoringConfig,
    records: &[AttendanceRecord],
    today: NaiveDate,
) -> LootScoreBreakdown {
    LootScoreCalculator::new(config).breakdown(rank, member, records, today)
}

/// Top `limit` active claims on `item_id`, highest loot score first.
pub fn resolve_priority(
    item_id: &ItemId,
    claims: &[ScoredClaim],
    limit: usize,
) -> Vec<PriorityListing> {
    PriorityResolver::new(limit).resolve(item_id, claims)
}
