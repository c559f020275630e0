use chrono::NaiveDate;
use guild_loot::workflows::loot::{
    AttendanceRecord, AttendanceStore, GuildId, GuildRoster, GuildScoringConfig,
    GuildSettingsStore, Item, ItemCatalog, ItemClassification, ItemId, Member, MemberId,
    RaidEventId, Rank, RankedSelection, RepositoryError, SlotIndex, Submission, SubmissionId,
    SubmissionStatus, SubmissionStore, TierId,
};
use metrics_exporter_prometheus::PrometheusHandle;
use std::collections::HashMap;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex};

pub(crate) const DEMO_GUILD: &str = "dawnbreakers";
pub(crate) const DEMO_TIER: &str = "blackwing-lair";

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Process-local store backing every loot collaborator.
#[derive(Default, Clone)]
pub(crate) struct InMemoryLootStore {
    items: Arc<Mutex<HashMap<TierId, Vec<Item>>>>,
    submissions: Arc<Mutex<Vec<Submission>>>,
    attendance: Arc<Mutex<Vec<AttendanceRecord>>>,
    settings: Arc<Mutex<HashMap<GuildId, GuildScoringConfig>>>,
    roster: Arc<Mutex<HashMap<MemberId, Member>>>,
}

impl InMemoryLootStore {
    /// Catalog, roster and scoring settings for the demo guild. No submissions yet.
    pub(crate) fn seeded_guild() -> Self {
        let store = Self::default();
        store
            .items
            .lock()
            .expect("items mutex poisoned")
            .insert(TierId::new(DEMO_TIER), demo_catalog());
        {
            let mut roster = store.roster.lock().expect("roster mutex poisoned");
            for member in demo_roster() {
                roster.insert(member.id.clone(), member);
            }
        }
        store
            .settings
            .lock()
            .expect("settings mutex poisoned")
            .insert(GuildId::new(DEMO_GUILD), default_guild_config());
        store
    }

    /// The seeded guild plus a few weeks of raids and a round of wishlists.
    pub(crate) fn demo(today: NaiveDate) -> Self {
        let store = Self::seeded_guild();
        store.record_attendance(demo_attendance(today));
        store
            .submissions
            .lock()
            .expect("submission mutex poisoned")
            .extend(demo_submissions());
        store
    }

    pub(crate) fn record_attendance(&self, records: impl IntoIterator<Item = AttendanceRecord>) {
        self.attendance
            .lock()
            .expect("attendance mutex poisoned")
            .extend(records);
    }

    pub(crate) fn members(&self) -> Vec<Member> {
        let guard = self.roster.lock().expect("roster mutex poisoned");
        let mut members: Vec<Member> = guard.values().cloned().collect();
        members.sort_by(|a, b| a.display_name.cmp(&b.display_name));
        members
    }

    pub(crate) fn submissions(&self) -> Vec<Submission> {
        self.submissions
            .lock()
            .expect("submission mutex poisoned")
            .clone()
    }
}

impl ItemCatalog for InMemoryLootStore {
    fn items_for_tier(&self, tier_id: &TierId) -> Result<Vec<Item>, RepositoryError> {
        let guard = self.items.lock().expect("items mutex poisoned");
        Ok(guard.get(tier_id).cloned().unwrap_or_default())
    }

    fn item(&self, item_id: &ItemId) -> Result<Option<Item>, RepositoryError> {
        let guard = self.items.lock().expect("items mutex poisoned");
        Ok(guard
            .values()
            .flatten()
            .find(|item| &item.id == item_id)
            .cloned())
    }
}

impl SubmissionStore for InMemoryLootStore {
    fn submission(&self, id: &SubmissionId) -> Result<Option<Submission>, RepositoryError> {
        let guard = self.submissions.lock().expect("submission mutex poisoned");
        Ok(guard.iter().find(|submission| &submission.id == id).cloned())
    }

    fn submissions_for_member(
        &self,
        member_id: &MemberId,
        tier_id: &TierId,
    ) -> Result<Vec<Submission>, RepositoryError> {
        let guard = self.submissions.lock().expect("submission mutex poisoned");
        Ok(guard
            .iter()
            .filter(|submission| {
                &submission.member_id == member_id && &submission.tier_id == tier_id
            })
            .cloned()
            .collect())
    }

    fn active_submissions_for_item(
        &self,
        guild_id: &GuildId,
        item_id: &ItemId,
    ) -> Result<Vec<Submission>, RepositoryError> {
        let guard = self.submissions.lock().expect("submission mutex poisoned");
        Ok(guard
            .iter()
            .filter(|submission| {
                &submission.guild_id == guild_id
                    && submission.status.is_active()
                    && submission.rank_for_item(item_id).is_some()
            })
            .cloned()
            .collect())
    }

    fn replace_submission(&self, submission: Submission) -> Result<(), RepositoryError> {
        // The single lock makes the delete-and-insert of selections one unit.
        let mut guard = self.submissions.lock().expect("submission mutex poisoned");
        match guard.iter_mut().find(|existing| existing.id == submission.id) {
            Some(existing) => *existing = submission,
            None => guard.push(submission),
        }
        Ok(())
    }
}

impl AttendanceStore for InMemoryLootStore {
    fn records(
        &self,
        member_id: &MemberId,
        window_start: NaiveDate,
    ) -> Result<Vec<AttendanceRecord>, RepositoryError> {
        let guard = self.attendance.lock().expect("attendance mutex poisoned");
        Ok(guard
            .iter()
            .filter(|record| &record.member_id == member_id && record.raid_date >= window_start)
            .cloned()
            .collect())
    }
}

impl GuildSettingsStore for InMemoryLootStore {
    fn get(&self, guild_id: &GuildId) -> Result<Option<GuildScoringConfig>, RepositoryError> {
        let guard = self.settings.lock().expect("settings mutex poisoned");
        Ok(guard.get(guild_id).cloned())
    }
}

impl GuildRoster for InMemoryLootStore {
    fn member(&self, member_id: &MemberId) -> Result<Option<Member>, RepositoryError> {
        let guard = self.roster.lock().expect("roster mutex poisoned");
        Ok(guard.get(member_id).cloned())
    }
}

pub(crate) fn default_guild_config() -> GuildScoringConfig {
    GuildScoringConfig::default()
        .with_role_modifier("Officer", 1.0)
        .with_role_modifier("Raider", 0.5)
        .with_role_modifier("Trial", -1.0)
}

fn demo_catalog() -> Vec<Item> {
    use ItemClassification::{Limited, Reserved, Unlimited};
    let item = |id: &str, name: &str, boss: &str, slot: &str, item_type: &str, classification| {
        Item {
            id: ItemId::new(id),
            name: name.to_string(),
            boss_name: boss.to_string(),
            slot: slot.to_string(),
            item_type: item_type.to_string(),
            classification,
            is_available: true,
        }
    };

    vec![
        item(
            "ashkandi",
            "Ashkandi, Greatsword of the Brotherhood",
            "Nefarian",
            "Two-Hand",
            "Sword",
            Reserved,
        ),
        item("lok-amir", "Lok'amir il Romathis", "Nefarian", "Main Hand", "Mace", Reserved),
        item(
            "mish-undare",
            "Mish'undare, Circlet of the Mind Flayer",
            "Nefarian",
            "Head",
            "Cloth Head",
            Limited,
        ),
        item("pure-elementium-band", "Pure Elementium Band", "Nefarian", "Finger", "Ring", Limited),
        item(
            "drake-fang-talisman",
            "Drake Fang Talisman",
            "Chromaggus",
            "Trinket",
            "Trinket",
            Limited,
        ),
        item("chromatic-boots", "Chromatic Boots", "Chromaggus", "Feet", "Plate Feet", Unlimited),
        item(
            "taut-dragonhide-belt",
            "Taut Dragonhide Belt",
            "Chromaggus",
            "Waist",
            "Leather Waist",
            Unlimited,
        ),
        item("cloak-of-firemaw", "Cloak of Firemaw", "Firemaw", "Back", "Cloak", Unlimited),
        item(
            "claw-of-the-black-drake",
            "Claw of the Black Drake",
            "Firemaw",
            "Main Hand",
            "Fist",
            Unlimited,
        ),
    ]
}

fn demo_roster() -> Vec<Member> {
    [
        ("thrall", "Thrall", "#0070DD", "Officer"),
        ("jaina", "Jaina", "#3FC7EB", "Raider"),
        ("valeera", "Valeera", "#FFF468", "Raider"),
        ("rexxar", "Rexxar", "#AAD372", "Raider"),
        ("anduin", "Anduin", "#FFFFFF", "Trial"),
    ]
    .into_iter()
    .map(|(id, name, color, role)| Member {
        id: MemberId::new(id),
        guild_id: GuildId::new(DEMO_GUILD),
        display_name: name.to_string(),
        class_color: color.to_string(),
        role: role.to_string(),
    })
    .collect()
}

fn demo_attendance(today: NaiveDate) -> Vec<AttendanceRecord> {
    // (member, weekly raids attended out of six, signed up, no-show week)
    let profiles: [(&str, u32, bool, Option<u32>); 5] = [
        ("thrall", 6, true, None),
        ("jaina", 5, true, None),
        ("valeera", 6, true, Some(2)),
        ("rexxar", 3, false, None),
        ("anduin", 2, true, None),
    ];

    let mut records = Vec::new();
    for (member, attended_weeks, signs_up, no_show_week) in profiles {
        for week in 0..6u32 {
            let raid_date = today - chrono::Duration::weeks(i64::from(week));
            let no_call_no_show = no_show_week == Some(week);
            records.push(AttendanceRecord {
                member_id: MemberId::new(member),
                raid_event_id: RaidEventId::new(format!("bwl-week-{week}")),
                raid_date,
                signed_up: signs_up && !no_call_no_show,
                attended: week < attended_weeks && !no_call_no_show,
                no_call_no_show,
            });
        }
    }
    records
}

fn demo_submissions() -> Vec<Submission> {
    let build = |member: &str, status, cells: &[(u8, u8, &str)]| Submission {
        id: SubmissionId::new(format!("{member}-{DEMO_TIER}")),
        guild_id: GuildId::new(DEMO_GUILD),
        member_id: MemberId::new(member),
        tier_id: TierId::new(DEMO_TIER),
        status,
        selections: cells
            .iter()
            .filter_map(|(rank, slot, item)| {
                let rank = Rank::new(*rank).ok()?;
                let slot = SlotIndex::try_from(*slot).ok()?;
                Some(RankedSelection::new(rank, slot, ItemId::new(*item)))
            })
            .collect(),
    };

    vec![
        build(
            "thrall",
            SubmissionStatus::Approved,
            &[
                (50, 1, "lok-amir"),
                (49, 1, "drake-fang-talisman"),
                (49, 2, "chromatic-boots"),
                (44, 1, "pure-elementium-band"),
                (30, 1, "cloak-of-firemaw"),
            ],
        ),
        build(
            "jaina",
            SubmissionStatus::Approved,
            &[
                (50, 1, "mish-undare"),
                (49, 1, "drake-fang-talisman"),
                (44, 1, "pure-elementium-band"),
                (30, 1, "cloak-of-firemaw"),
            ],
        ),
        build(
            "valeera",
            SubmissionStatus::Pending,
            &[
                (50, 1, "ashkandi"),
                (49, 1, "drake-fang-talisman"),
                (47, 1, "claw-of-the-black-drake"),
                (30, 1, "cloak-of-firemaw"),
            ],
        ),
        build(
            "rexxar",
            SubmissionStatus::Approved,
            &[
                (50, 1, "ashkandi"),
                (48, 1, "taut-dragonhide-belt"),
                (41, 1, "cloak-of-firemaw"),
            ],
        ),
        build(
            "anduin",
            SubmissionStatus::Draft,
            &[
                (50, 1, "mish-undare"),
                (50, 2, "pure-elementium-band"),
                (49, 1, "drake-fang-talisman"),
                (48, 1, "chromatic-boots"),
                (48, 2, "taut-dragonhide-belt"),
            ],
        ),
    ]
}

pub(crate) fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|err| format!("failed to parse '{raw}' as YYYY-MM-DD ({err})"))
}
