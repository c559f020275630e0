use std::collections::HashMap;
use std::sync::Arc;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::config::LootConfig;

use super::catalog::ItemIndex;
use super::domain::{
    AttendanceRecord, GuildId, Item, ItemId, LootIntegrityError, Member, MemberId, Rank,
    SlotIndex, StatusTransitionError, Submission, SubmissionId, SubmissionStatus, TierId,
};
use super::priority::{CompetitionEntry, PriorityListing, PriorityResolver, ScoredClaim, TieGroup};
use super::repository::{GuildSettingsStore, LootStore, RepositoryError};
use super::scoring::{
    AttendanceAggregator, GuildScoringConfig, LootScoreBreakdown, LootScoreCalculator,
};
use super::validation::{BracketValidator, SubmissionValidation};

/// Service composing the stores with the validator, scorer, and priority resolver.
pub struct LootPriorityService<S> {
    store: Arc<S>,
    config: LootConfig,
    resolver: PriorityResolver,
}

impl<S> LootPriorityService<S>
where
    S: LootStore + 'static,
{
    pub fn new(store: Arc<S>, config: LootConfig) -> Self {
        let resolver = PriorityResolver::new(config.priority_limit);
        Self {
            store,
            config,
            resolver,
        }
    }

    pub fn config(&self) -> &LootConfig {
        &self.config
    }

    /// Stored guild settings, or the unconfigured fallback when officers have not set any.
    pub fn scoring_config(
        &self,
        guild_id: &GuildId,
    ) -> Result<GuildScoringConfig, LootServiceError> {
        match GuildSettingsStore::get(self.store.as_ref(), guild_id)? {
            Some(config) => Ok(config),
            None => {
                debug!(%guild_id, "guild scoring not configured; using defaults");
                Ok(GuildScoringConfig {
                    slot_restrictions_enabled: self.config.slot_restrictions_default,
                    ..GuildScoringConfig::unconfigured()
                })
            }
        }
    }

    /// Validate a submission against its tier's catalog and the guild's slot policy.
    pub fn validate(
        &self,
        submission: &Submission,
    ) -> Result<SubmissionValidation, LootServiceError> {
        let catalog = self.tier_catalog(&submission.tier_id)?;
        self.ensure_in_tier(submission, &catalog)?;
        let scoring = self.scoring_config(&submission.guild_id)?;
        let validation = BracketValidator::new(scoring.slot_restrictions_enabled)
            .validate(submission, &catalog)?;
        Ok(validation)
    }

    /// Replace every stored selection of the submission with the given set.
    ///
    /// Rule violations do not block a save; they are returned for display. Approved,
    /// pending and rejected submissions are locked. Saving a submission that needs
    /// revision moves it back to draft.
    pub fn save_submission(
        &self,
        submission: Submission,
    ) -> Result<SubmissionValidation, LootServiceError> {
        let status = match self.store.submission(&submission.id)? {
            Some(existing) => match existing.status {
                SubmissionStatus::Draft => SubmissionStatus::Draft,
                SubmissionStatus::NeedsRevision => existing
                    .status
                    .transition(SubmissionStatus::Draft)?,
                locked => {
                    return Err(LootServiceError::Locked {
                        submission_id: submission.id,
                        status: locked,
                    })
                }
            },
            None => SubmissionStatus::Draft,
        };

        let submission = submission.with_status(status);
        let validation = self.validate(&submission)?;

        info!(
            submission_id = %submission.id,
            member_id = %submission.member_id,
            selections = submission.selections.len(),
            acceptable = validation.is_acceptable(),
            "replacing submission selections"
        );
        self.store.replace_submission(submission)?;

        Ok(validation)
    }

    /// Move a submission through the review lifecycle.
    pub fn transition_status(
        &self,
        submission_id: &SubmissionId,
        next: SubmissionStatus,
    ) -> Result<Submission, LootServiceError> {
        let submission = self
            .store
            .submission(submission_id)?
            .ok_or(RepositoryError::NotFound)?;

        let status = submission.status.transition(next)?;

        if status == SubmissionStatus::Pending {
            let validation = self.validate(&submission)?;
            if !validation.is_acceptable() {
                return Err(LootServiceError::NotAcceptable {
                    violations: validation.messages(),
                });
            }
        }

        let previous = submission.status;
        let updated = submission.with_status(status);
        self.store.replace_submission(updated.clone())?;

        info!(
            %submission_id,
            from = previous.label(),
            to = status.label(),
            "submission status changed"
        );
        Ok(updated)
    }

    /// Loot score for `member_id` claiming an item at `rank`.
    pub fn loot_score(
        &self,
        guild_id: &GuildId,
        member_id: &MemberId,
        rank: Rank,
        today: NaiveDate,
    ) -> Result<LootScoreBreakdown, LootServiceError> {
        let member = self.require_member(member_id)?;
        let scoring = self.scoring_config(guild_id)?;
        let records = self.attendance_for(&scoring, member_id, today)?;
        Ok(LootScoreCalculator::new(&scoring).breakdown(rank, &member, &records, today))
    }

    /// Ordered claims on one item across every active submission in the guild.
    pub fn priority_for_item(
        &self,
        guild_id: &GuildId,
        item_id: &ItemId,
        today: NaiveDate,
    ) -> Result<ItemPriority, LootServiceError> {
        let item = self
            .store
            .item(item_id)?
            .ok_or_else(|| LootIntegrityError::UnknownItem {
                item_id: item_id.clone(),
            })?;
        let scoring = self.scoring_config(guild_id)?;
        let mut attendance_cache = HashMap::new();
        self.resolve_item(guild_id, item, &scoring, today, &mut attendance_cache)
    }

    /// Priority for every available item in a tier that anyone has ranked.
    ///
    /// An integrity failure on one item is reported in its entry while the remaining
    /// items still resolve. Repository failures abort the board.
    pub fn priority_board(
        &self,
        guild_id: &GuildId,
        tier_id: &TierId,
        today: NaiveDate,
    ) -> Result<Vec<BoardEntry>, LootServiceError> {
        let catalog = self.tier_catalog(tier_id)?;
        let scoring = self.scoring_config(guild_id)?;
        let mut attendance_cache = HashMap::new();
        let mut board = Vec::new();

        for item in catalog.available() {
            match self.resolve_item(
                guild_id,
                item.clone(),
                &scoring,
                today,
                &mut attendance_cache,
            ) {
                Ok(priority) if priority.claimants == 0 => {}
                Ok(priority) => board.push(BoardEntry::Resolved(priority)),
                Err(LootServiceError::Integrity(error)) => {
                    warn!(item_id = %item.id, %error, "skipping item priority");
                    board.push(BoardEntry::Failed {
                        item_id: item.id.clone(),
                        item_name: item.name.clone(),
                        reason: error.to_string(),
                    });
                }
                Err(other) => return Err(other),
            }
        }

        Ok(board)
    }

    /// The viewing member's ranked items in a tier, each with the members tied with them.
    pub fn member_competition(
        &self,
        guild_id: &GuildId,
        member_id: &MemberId,
        tier_id: &TierId,
    ) -> Result<Vec<MemberClaimView>, LootServiceError> {
        let catalog = self.tier_catalog(tier_id)?;
        let Some(submission) = self.current_submission(member_id, tier_id)? else {
            return Ok(Vec::new());
        };
        self.ensure_in_tier(&submission, &catalog)?;

        let mut selections = submission.selections.clone();
        selections.sort_by(|a, b| b.rank.cmp(&a.rank).then(a.slot.cmp(&b.slot)));

        let mut views = Vec::with_capacity(selections.len());
        for selection in selections {
            let item = catalog.require(&selection.item_id)?;
            let mut competitors = Vec::new();
            for other in self
                .store
                .active_submissions_for_item(guild_id, &selection.item_id)?
            {
                if &other.member_id == member_id
                    || !other.status.is_active()
                    || other.rank_for_item(&selection.item_id) != Some(selection.rank)
                {
                    continue;
                }
                let member = self.require_member(&other.member_id)?;
                competitors.push(CompetitionEntry::from(&member));
            }

            views.push(MemberClaimView {
                item_id: item.id.clone(),
                item_name: item.name.clone(),
                rank: selection.rank,
                slot: selection.slot,
                competitors,
            });
        }

        Ok(views)
    }

    fn resolve_item(
        &self,
        guild_id: &GuildId,
        item: Item,
        scoring: &GuildScoringConfig,
        today: NaiveDate,
        attendance_cache: &mut HashMap<MemberId, Vec<AttendanceRecord>>,
    ) -> Result<ItemPriority, LootServiceError> {
        let calculator = LootScoreCalculator::new(scoring);
        let mut claims = Vec::new();

        for submission in self.store.active_submissions_for_item(guild_id, &item.id)? {
            let Some(rank) = submission.rank_for_item(&item.id) else {
                continue;
            };
            let member = self.require_member(&submission.member_id)?;
            if !attendance_cache.contains_key(&member.id) {
                let records = self.attendance_for(scoring, &member.id, today)?;
                attendance_cache.insert(member.id.clone(), records);
            }
            let records = attendance_cache
                .get(&member.id)
                .map(Vec::as_slice)
                .unwrap_or_default();
            let breakdown = calculator.breakdown(rank, &member, records, today);

            claims.push(ScoredClaim {
                member,
                submission_status: submission.status,
                rank,
                loot_score: breakdown.total,
            });
        }

        let claimants = claims
            .iter()
            .filter(|claim| claim.submission_status.is_active())
            .count();

        Ok(ItemPriority {
            listings: self.resolver.resolve(&item.id, &claims),
            ties: PriorityResolver::tie_groups(&claims),
            claimants,
            item,
        })
    }

    fn tier_catalog(&self, tier_id: &TierId) -> Result<ItemIndex, LootServiceError> {
        Ok(ItemIndex::new(self.store.items_for_tier(tier_id)?))
    }

    /// Distinguishes items from another tier from items missing entirely.
    fn ensure_in_tier(
        &self,
        submission: &Submission,
        catalog: &ItemIndex,
    ) -> Result<(), LootServiceError> {
        for selection in &submission.selections {
            if catalog.get(&selection.item_id).is_some() {
                continue;
            }
            if self.store.item(&selection.item_id)?.is_some() {
                return Err(LootIntegrityError::ItemNotInTier {
                    item_id: selection.item_id.clone(),
                    tier_id: submission.tier_id.clone(),
                }
                .into());
            }
        }
        Ok(())
    }

    fn attendance_for(
        &self,
        scoring: &GuildScoringConfig,
        member_id: &MemberId,
        today: NaiveDate,
    ) -> Result<Vec<AttendanceRecord>, LootServiceError> {
        let window_start = AttendanceAggregator::new(scoring).window_start(today);
        Ok(self.store.records(member_id, window_start)?)
    }

    fn require_member(&self, member_id: &MemberId) -> Result<Member, LootServiceError> {
        self.store.member(member_id)?.ok_or_else(|| {
            LootServiceError::Integrity(LootIntegrityError::UnknownMember {
                member_id: member_id.clone(),
            })
        })
    }

    /// Prefers the member's live submission over drafts when several exist.
    fn current_submission(
        &self,
        member_id: &MemberId,
        tier_id: &TierId,
    ) -> Result<Option<Submission>, LootServiceError> {
        let mut submissions = self.store.submissions_for_member(member_id, tier_id)?;
        submissions.sort_by_key(|submission| !submission.status.is_active());
        Ok(submissions.into_iter().next())
    }
}

/// Competitive ordering for one item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemPriority {
    pub item: Item,
    pub claimants: usize,
    pub listings: Vec<PriorityListing>,
    pub ties: Vec<TieGroup>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum BoardEntry {
    Resolved(ItemPriority),
    Failed {
        item_id: ItemId,
        item_name: String,
        reason: String,
    },
}

/// One of the viewing member's ranked items and who they are tied with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberClaimView {
    pub item_id: ItemId,
    pub item_name: String,
    pub rank: Rank,
    pub slot: SlotIndex,
    pub competitors: Vec<CompetitionEntry>,
}

/// Error raised by the loot priority service.
#[derive(Debug, thiserror::Error)]
pub enum LootServiceError {
    #[error(transparent)]
    Integrity(#[from] LootIntegrityError),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
    #[error(transparent)]
    Transition(#[from] StatusTransitionError),
    #[error("submission {submission_id} is {} and can no longer be edited", .status.label())]
    Locked {
        submission_id: SubmissionId,
        status: SubmissionStatus,
    },
    #[error("submission is not ready for review: {}", .violations.join("; "))]
    NotAcceptable { violations: Vec<String> },
}
