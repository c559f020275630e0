use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::domain::{ItemId, Member, MemberId, Rank, SubmissionStatus};

pub const DEFAULT_PRIORITY_LIMIT: usize = 5;

/// One member's scored claim on an item, taken from their submission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredClaim {
    pub member: Member,
    pub submission_status: SubmissionStatus,
    pub rank: Rank,
    pub loot_score: f64,
}

/// Another member tied at the same rank for the same item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompetitionEntry {
    pub member_id: MemberId,
    pub display_name: String,
    pub class_color: String,
}

impl From<&Member> for CompetitionEntry {
    fn from(member: &Member) -> Self {
        Self {
            member_id: member.id.clone(),
            display_name: member.display_name.clone(),
            class_color: member.class_color.clone(),
        }
    }
}

/// A member's place in line for an item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriorityListing {
    pub item_id: ItemId,
    pub member_id: MemberId,
    pub display_name: String,
    pub class_color: String,
    pub rank: Rank,
    pub loot_score: f64,
    pub competitors: Vec<CompetitionEntry>,
}

impl PriorityListing {
    pub fn is_tied(&self) -> bool {
        !self.competitors.is_empty()
    }
}

/// Members sharing an identical rank on one item; settled out of band by a roll.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TieGroup {
    pub rank: Rank,
    pub members: Vec<CompetitionEntry>,
}

/// Orders competing claims on an item and annotates literal rank ties.
///
/// The resolver never picks a tie winner and never filters by item availability; both
/// happen elsewhere.
#[derive(Debug, Clone, Copy)]
pub struct PriorityResolver {
    limit: usize,
}

impl Default for PriorityResolver {
    fn default() -> Self {
        Self::new(DEFAULT_PRIORITY_LIMIT)
    }
}

impl PriorityResolver {
    pub fn new(limit: usize) -> Self {
        Self {
            limit: limit.max(1),
        }
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Top listings by descending loot score. Equal scores keep their encountered order.
    pub fn resolve(&self, item_id: &ItemId, claims: &[ScoredClaim]) -> Vec<PriorityListing> {
        let mut active: Vec<&ScoredClaim> = active_claims(claims).collect();
        // sort_by is stable, so exact score ties are not reordered.
        active.sort_by(|a, b| b.loot_score.total_cmp(&a.loot_score));

        active
            .into_iter()
            .take(self.limit)
            .map(|claim| PriorityListing {
                item_id: item_id.clone(),
                member_id: claim.member.id.clone(),
                display_name: claim.member.display_name.clone(),
                class_color: claim.member.class_color.clone(),
                rank: claim.rank,
                loot_score: claim.loot_score,
                competitors: Self::competitors(&claim.member.id, claim.rank, claims),
            })
            .collect()
    }

    /// Every other active claimant who ranked the item at exactly `rank`.
    pub fn competitors(
        viewer: &MemberId,
        rank: Rank,
        claims: &[ScoredClaim],
    ) -> Vec<CompetitionEntry> {
        active_claims(claims)
            .filter(|claim| claim.rank == rank && &claim.member.id != viewer)
            .map(|claim| CompetitionEntry::from(&claim.member))
            .collect()
    }

    /// All ranks with two or more active claimants, highest rank first.
    pub fn tie_groups(claims: &[ScoredClaim]) -> Vec<TieGroup> {
        let mut by_rank: BTreeMap<Rank, Vec<CompetitionEntry>> = BTreeMap::new();
        for claim in active_claims(claims) {
            by_rank
                .entry(claim.rank)
                .or_default()
                .push(CompetitionEntry::from(&claim.member));
        }

        by_rank
            .into_iter()
            .rev()
            .filter(|(_, members)| members.len() > 1)
            .map(|(rank, members)| TieGroup { rank, members })
            .collect()
    }
}

fn active_claims(claims: &[ScoredClaim]) -> impl Iterator<Item = &ScoredClaim> {
    claims
        .iter()
        .filter(|claim| claim.submission_status.is_active())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflows::loot::domain::GuildId;

    fn claim(id: &str, rank: u8, score: f64, status: SubmissionStatus) -> ScoredClaim {
        ScoredClaim {
            member: Member {
                id: MemberId::new(id),
                guild_id: GuildId::new("guild"),
                display_name: id.to_uppercase(),
                class_color: "#FFFFFF".to_string(),
                role: "Raider".to_string(),
            },
            submission_status: status,
            rank: Rank::new(rank).expect("valid rank"),
            loot_score: score,
        }
    }

    fn ids(entries: &[CompetitionEntry]) -> Vec<&str> {
        entries.iter().map(|entry| entry.member_id.as_str()).collect()
    }

    #[test]
    fn three_way_tie_lists_the_other_two_members() {
        let item = ItemId::new("ashkandi");
        let claims = vec![
            claim("a", 40, 44.0, SubmissionStatus::Approved),
            claim("b", 40, 46.5, SubmissionStatus::Pending),
            claim("c", 40, 41.0, SubmissionStatus::Approved),
        ];

        let listings = PriorityResolver::default().resolve(&item, &claims);

        let order: Vec<&str> = listings.iter().map(|l| l.member_id.as_str()).collect();
        assert_eq!(order, vec!["b", "a", "c"]);
        let a = listings
            .iter()
            .find(|listing| listing.member_id.as_str() == "a")
            .expect("a listed");
        assert_eq!(ids(&a.competitors), vec!["b", "c"]);
        assert!(listings.iter().all(PriorityListing::is_tied));
    }

    #[test]
    fn equal_scores_keep_encountered_order() {
        let item = ItemId::new("ashkandi");
        let claims = vec![
            claim("first", 40, 45.0, SubmissionStatus::Approved),
            claim("second", 40, 45.0, SubmissionStatus::Approved),
            claim("third", 40, 45.0, SubmissionStatus::Pending),
        ];

        let listings = PriorityResolver::default().resolve(&item, &claims);
        let order: Vec<&str> = listings.iter().map(|l| l.member_id.as_str()).collect();
        assert_eq!(order, vec!["first", "second", "third"]);
    }

    #[test]
    fn competitors_require_identical_rank_not_similar_score() {
        let claims = vec![
            claim("a", 40, 45.0, SubmissionStatus::Approved),
            claim("b", 41, 45.0, SubmissionStatus::Approved),
        ];

        let viewer = MemberId::new("a");
        let rank = Rank::new(40).expect("valid rank");
        assert!(PriorityResolver::competitors(&viewer, rank, &claims).is_empty());
    }

    #[test]
    fn inactive_submissions_do_not_compete() {
        let item = ItemId::new("ashkandi");
        let claims = vec![
            claim("a", 40, 45.0, SubmissionStatus::Approved),
            claim("draft", 40, 49.0, SubmissionStatus::Draft),
            claim("revise", 40, 49.0, SubmissionStatus::NeedsRevision),
            claim("rejected", 40, 49.0, SubmissionStatus::Rejected),
        ];

        let listings = PriorityResolver::default().resolve(&item, &claims);
        assert_eq!(listings.len(), 1);
        assert!(listings[0].competitors.is_empty());
    }

    #[test]
    fn tie_detection_is_symmetric() {
        let claims = vec![
            claim("a", 40, 44.0, SubmissionStatus::Approved),
            claim("b", 40, 46.0, SubmissionStatus::Pending),
            claim("c", 39, 41.0, SubmissionStatus::Approved),
            claim("d", 39, 40.0, SubmissionStatus::Approved),
            claim("e", 12, 12.0, SubmissionStatus::Approved),
        ];

        for left in &claims {
            for right in &claims {
                if left.member.id == right.member.id {
                    continue;
                }
                let left_sees_right =
                    PriorityResolver::competitors(&left.member.id, left.rank, &claims)
                        .iter()
                        .any(|entry| entry.member_id == right.member.id);
                let right_sees_left =
                    PriorityResolver::competitors(&right.member.id, right.rank, &claims)
                        .iter()
                        .any(|entry| entry.member_id == left.member.id);
                assert_eq!(left_sees_right, right_sees_left);
            }
        }
    }

    #[test]
    fn listing_is_truncated_to_limit_but_competitors_are_complete() {
        let item = ItemId::new("ashkandi");
        let claims: Vec<ScoredClaim> = (0..7)
            .map(|index| {
                claim(
                    &format!("m{index}"),
                    40,
                    40.0 + index as f64,
                    SubmissionStatus::Approved,
                )
            })
            .collect();

        let listings = PriorityResolver::new(3).resolve(&item, &claims);
        assert_eq!(listings.len(), 3);
        assert_eq!(listings[0].member_id.as_str(), "m6");
        assert_eq!(listings[0].competitors.len(), 6);
    }

    #[test]
    fn tie_groups_only_report_shared_ranks() {
        let claims = vec![
            claim("a", 40, 44.0, SubmissionStatus::Approved),
            claim("b", 40, 46.0, SubmissionStatus::Pending),
            claim("c", 45, 47.0, SubmissionStatus::Approved),
            claim("d", 45, 48.0, SubmissionStatus::Approved),
            claim("e", 30, 30.0, SubmissionStatus::Approved),
        ];

        let groups = PriorityResolver::tie_groups(&claims);
        let ranks: Vec<u8> = groups.iter().map(|group| group.rank.value()).collect();
        assert_eq!(ranks, vec![45, 40]);
        assert_eq!(ids(&groups[1].members), vec!["a", "b"]);
    }
}
