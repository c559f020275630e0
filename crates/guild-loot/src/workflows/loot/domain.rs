use std::collections::HashSet;
use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        pub struct $name(pub String);

        impl $name {
            pub fn new(value: impl Into<String>) -> Self {
                Self(value.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

string_id!(
    /// Catalog identifier for a lootable item.
    ItemId
);
string_id!(
    /// Guild member (character) identifier.
    MemberId
);
string_id!(GuildId);
string_id!(
    /// Raid tier the submission and its catalog belong to.
    TierId
);
string_id!(SubmissionId);
string_id!(RaidEventId);

/// Scarcity tier of an item, which drives the allocation cost charged to a bracket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemClassification {
    Reserved,
    Limited,
    Unlimited,
}

impl ItemClassification {
    pub const fn allocation_cost(self) -> u32 {
        match self {
            Self::Reserved | Self::Limited => 1,
            Self::Unlimited => 0,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Reserved => "Reserved",
            Self::Limited => "Limited",
            Self::Unlimited => "Unlimited",
        }
    }
}

/// Catalog metadata for a single item. Immutable for the duration of a ranking session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    pub id: ItemId,
    pub name: String,
    pub boss_name: String,
    /// Equipment slot, e.g. "Ring".
    pub slot: String,
    /// Fine-grained category used for duplicate detection, e.g. a weapon subtype.
    #[serde(rename = "type")]
    pub item_type: String,
    pub classification: ItemClassification,
    #[serde(default = "default_available")]
    pub is_available: bool,
}

fn default_available() -> bool {
    true
}

impl Item {
    pub const fn allocation_cost(&self) -> u32 {
        self.classification.allocation_cost()
    }

    pub fn is_reserved(&self) -> bool {
        self.classification == ItemClassification::Reserved
    }
}

/// Desirability rank in `[1, 50]`; 50 is the most wanted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Rank(u8);

impl Rank {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 50;

    pub fn new(value: u8) -> Result<Self, DomainError> {
        if (Self::MIN..=Self::MAX).contains(&value) {
            Ok(Self(value))
        } else {
            Err(DomainError::RankOutOfRange(value))
        }
    }

    pub const fn value(self) -> u8 {
        self.0
    }

    /// Every rank from most to least desirable.
    pub fn descending() -> impl Iterator<Item = Rank> {
        (Self::MIN..=Self::MAX).rev().map(Rank)
    }
}

impl TryFrom<u8> for Rank {
    type Error = DomainError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Rank> for u8 {
    fn from(rank: Rank) -> Self {
        rank.0
    }
}

impl fmt::Display for Rank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One of the two independent item choices sharing a rank.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum SlotIndex {
    First,
    Second,
}

impl SlotIndex {
    pub const fn ordered() -> [Self; 2] {
        [Self::First, Self::Second]
    }

    pub const fn number(self) -> u8 {
        match self {
            Self::First => 1,
            Self::Second => 2,
        }
    }

    pub const fn other(self) -> Self {
        match self {
            Self::First => Self::Second,
            Self::Second => Self::First,
        }
    }
}

impl TryFrom<u8> for SlotIndex {
    type Error = DomainError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Self::First),
            2 => Ok(Self::Second),
            other => Err(DomainError::InvalidSlot(other)),
        }
    }
}

impl From<SlotIndex> for u8 {
    fn from(slot: SlotIndex) -> Self {
        slot.number()
    }
}

/// A single (rank, slot) -> item choice.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RankedSelection {
    pub rank: Rank,
    pub slot: SlotIndex,
    pub item_id: ItemId,
}

impl RankedSelection {
    pub fn new(rank: Rank, slot: SlotIndex, item_id: ItemId) -> Self {
        Self {
            rank,
            slot,
            item_id,
        }
    }
}

/// Review lifecycle of a submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubmissionStatus {
    Draft,
    Pending,
    Approved,
    NeedsRevision,
    Rejected,
}

impl SubmissionStatus {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::NeedsRevision => "needs_revision",
            Self::Rejected => "rejected",
        }
    }

    /// Only approved and pending rankings are live priority claims.
    pub const fn is_active(self) -> bool {
        matches!(self, Self::Approved | Self::Pending)
    }

    pub const fn can_transition_to(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Draft, Self::Pending)
                | (Self::Pending, Self::Approved)
                | (Self::Pending, Self::NeedsRevision)
                | (Self::Pending, Self::Rejected)
                | (Self::NeedsRevision, Self::Draft)
        )
    }

    pub fn transition(self, next: Self) -> Result<Self, StatusTransitionError> {
        if self.can_transition_to(next) {
            Ok(next)
        } else {
            Err(StatusTransitionError {
                from: self,
                to: next,
            })
        }
    }
}

/// A member's ranked choices for one raid tier.
///
/// Treated as an immutable value: edits rebuild the submission and saves replace
/// every stored selection at once.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Submission {
    pub id: SubmissionId,
    pub guild_id: GuildId,
    pub member_id: MemberId,
    pub tier_id: TierId,
    pub status: SubmissionStatus,
    #[serde(default)]
    pub selections: Vec<RankedSelection>,
}

impl Submission {
    pub fn with_selections(self, selections: Vec<RankedSelection>) -> Self {
        Self { selections, ..self }
    }

    pub fn with_status(self, status: SubmissionStatus) -> Self {
        Self { status, ..self }
    }

    pub fn is_empty(&self) -> bool {
        self.selections.is_empty()
    }

    pub fn selection_at(&self, rank: Rank, slot: SlotIndex) -> Option<&RankedSelection> {
        self.selections
            .iter()
            .find(|selection| selection.rank == rank && selection.slot == slot)
    }

    /// Rank assigned to `item_id`, if it was ranked at all. The highest rank wins when a
    /// malformed submission repeats the item.
    pub fn rank_for_item(&self, item_id: &ItemId) -> Option<Rank> {
        self.selections
            .iter()
            .filter(|selection| &selection.item_id == item_id)
            .map(|selection| selection.rank)
            .max()
    }

    /// Fails on the first (rank, slot) cell holding more than one item.
    pub fn ensure_unique_cells(&self) -> Result<(), LootIntegrityError> {
        let mut seen = HashSet::new();
        for selection in &self.selections {
            if !seen.insert((selection.rank, selection.slot)) {
                return Err(LootIntegrityError::CellCollision {
                    submission_id: self.id.clone(),
                    rank: selection.rank,
                    slot: selection.slot,
                });
            }
        }
        Ok(())
    }
}

/// Guild member as seen by the priority engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Member {
    pub id: MemberId,
    pub guild_id: GuildId,
    pub display_name: String,
    pub class_color: String,
    /// Guild rank name used to look up the role modifier.
    pub role: String,
}

/// Per raid-event attendance flags recorded by officers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttendanceRecord {
    pub member_id: MemberId,
    pub raid_event_id: RaidEventId,
    pub raid_date: NaiveDate,
    pub signed_up: bool,
    pub attended: bool,
    #[serde(default)]
    pub no_call_no_show: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DomainError {
    #[error("rank {0} is outside the supported range 1-50")]
    RankOutOfRange(u8),
    #[error("slot {0} is invalid; expected 1 or 2")]
    InvalidSlot(u8),
    #[error("bracket {0} is invalid; expected 1 to 4")]
    InvalidBracket(u8),
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("submission cannot move from {} to {}", .from.label(), .to.label())]
pub struct StatusTransitionError {
    pub from: SubmissionStatus,
    pub to: SubmissionStatus,
}

/// Data that should have been impossible to produce; the affected computation is aborted.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LootIntegrityError {
    #[error("item {item_id} is not present in the catalog")]
    UnknownItem { item_id: ItemId },
    #[error(
        "submission {submission_id} holds more than one item at rank {rank} slot {}",
        .slot.number()
    )]
    CellCollision {
        submission_id: SubmissionId,
        rank: Rank,
        slot: SlotIndex,
    },
    #[error("member {member_id} is not on the guild roster")]
    UnknownMember { member_id: MemberId },
    #[error("item {item_id} does not drop in tier {tier_id}")]
    ItemNotInTier { item_id: ItemId, tier_id: TierId },
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rank(value: u8) -> Rank {
        Rank::new(value).expect("valid rank")
    }

    fn submission(selections: Vec<RankedSelection>) -> Submission {
        Submission {
            id: SubmissionId::new("sub-1"),
            guild_id: GuildId::new("guild"),
            member_id: MemberId::new("member"),
            tier_id: TierId::new("tier"),
            status: SubmissionStatus::Draft,
            selections,
        }
    }

    #[test]
    fn allocation_cost_follows_classification() {
        assert_eq!(ItemClassification::Reserved.allocation_cost(), 1);
        assert_eq!(ItemClassification::Limited.allocation_cost(), 1);
        assert_eq!(ItemClassification::Unlimited.allocation_cost(), 0);
    }

    #[test]
    fn rank_rejects_out_of_range_values() {
        assert_eq!(Rank::new(0), Err(DomainError::RankOutOfRange(0)));
        assert_eq!(Rank::new(51), Err(DomainError::RankOutOfRange(51)));
        assert_eq!(rank(50).value(), 50);
        assert_eq!(Rank::descending().count(), 50);
        assert_eq!(Rank::descending().next(), Some(rank(50)));
    }

    #[test]
    fn rank_and_slot_deserialize_from_integers() {
        let selection: RankedSelection =
            serde_json::from_str(r#"{"rank":48,"slot":2,"item_id":"sword"}"#).expect("parse");
        assert_eq!(selection.rank, rank(48));
        assert_eq!(selection.slot, SlotIndex::Second);

        let invalid = serde_json::from_str::<RankedSelection>(
            r#"{"rank":48,"slot":3,"item_id":"sword"}"#,
        );
        assert!(invalid.is_err());
    }

    #[test]
    fn status_transitions_follow_review_lifecycle() {
        use SubmissionStatus::*;

        assert_eq!(Draft.transition(Pending), Ok(Pending));
        assert_eq!(Pending.transition(Approved), Ok(Approved));
        assert_eq!(Pending.transition(NeedsRevision), Ok(NeedsRevision));
        assert_eq!(Pending.transition(Rejected), Ok(Rejected));
        assert_eq!(NeedsRevision.transition(Draft), Ok(Draft));

        assert!(Draft.transition(Approved).is_err());
        assert!(Approved.transition(Draft).is_err());
        assert!(Rejected.transition(Pending).is_err());
        assert!(NeedsRevision.transition(Pending).is_err());
    }

    #[test]
    fn only_pending_and_approved_are_active() {
        assert!(SubmissionStatus::Pending.is_active());
        assert!(SubmissionStatus::Approved.is_active());
        assert!(!SubmissionStatus::Draft.is_active());
        assert!(!SubmissionStatus::NeedsRevision.is_active());
        assert!(!SubmissionStatus::Rejected.is_active());
    }

    #[test]
    fn cell_collisions_are_integrity_errors() {
        let colliding = submission(vec![
            RankedSelection::new(rank(40), SlotIndex::First, ItemId::new("a")),
            RankedSelection::new(rank(40), SlotIndex::First, ItemId::new("b")),
        ]);

        match colliding.ensure_unique_cells() {
            Err(LootIntegrityError::CellCollision { rank: r, slot, .. }) => {
                assert_eq!(r, rank(40));
                assert_eq!(slot, SlotIndex::First);
            }
            other => panic!("expected collision, got {other:?}"),
        }

        let distinct = submission(vec![
            RankedSelection::new(rank(40), SlotIndex::First, ItemId::new("a")),
            RankedSelection::new(rank(40), SlotIndex::Second, ItemId::new("b")),
        ]);
        assert!(distinct.ensure_unique_cells().is_ok());
    }

    #[test]
    fn rank_for_item_reports_highest_rank() {
        let submission = submission(vec![
            RankedSelection::new(rank(12), SlotIndex::First, ItemId::new("a")),
            RankedSelection::new(rank(44), SlotIndex::Second, ItemId::new("a")),
        ]);
        assert_eq!(submission.rank_for_item(&ItemId::new("a")), Some(rank(44)));
        assert_eq!(submission.rank_for_item(&ItemId::new("b")), None);
    }
}
