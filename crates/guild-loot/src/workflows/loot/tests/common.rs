use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use axum::response::Response;
use chrono::NaiveDate;
use serde_json::Value;

use crate::config::LootConfig;
use crate::workflows::loot::domain::{
    AttendanceRecord, GuildId, Item, ItemClassification, ItemId, Member, MemberId, RaidEventId,
    Rank, RankedSelection, SlotIndex, Submission, SubmissionId, SubmissionStatus, TierId,
};
use crate::workflows::loot::repository::{
    AttendanceStore, GuildRoster, GuildSettingsStore, ItemCatalog, RepositoryError,
    SubmissionStore,
};
use crate::workflows::loot::scoring::GuildScoringConfig;
use crate::workflows::loot::{loot_router, LootPriorityService};

pub(super) const GUILD: &str = "dawnbreakers";
pub(super) const TIER: &str = "blackwing-lair";
pub(super) const OTHER_TIER: &str = "molten-core";

pub(super) fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 10, 15).expect("valid date")
}

pub(super) fn rank(value: u8) -> Rank {
    Rank::new(value).expect("valid rank")
}

pub(super) fn item(
    id: &str,
    classification: ItemClassification,
    slot: &str,
    item_type: &str,
) -> Item {
    Item {
        id: ItemId::new(id),
        name: id.replace('-', " "),
        boss_name: "Nefarian".to_string(),
        slot: slot.to_string(),
        item_type: item_type.to_string(),
        classification,
        is_available: true,
    }
}

pub(super) fn catalog() -> Vec<Item> {
    use ItemClassification::{Limited, Reserved, Unlimited};
    vec![
        item("ashkandi", Reserved, "Two-Hand", "Sword"),
        item("crul-shorukh", Reserved, "Two-Hand", "Axe"),
        item("band-of-accuria", Limited, "Finger", "Ring"),
        item("onslaught-girdle", Limited, "Waist", "Plate"),
        item("staff-of-the-shadow-flame", Limited, "Two-Hand", "Staff"),
        item("drake-fang-talisman", Unlimited, "Trinket", "Trinket"),
        item("neltharions-tear", Unlimited, "Trinket", "Trinket"),
        item("chromatic-boots", Unlimited, "Feet", "Cloth"),
        item("boots-of-shadow-flame", Unlimited, "Feet", "Leather"),
        item("cloak-of-the-brood", Unlimited, "Back", "Cloak"),
    ]
}

pub(super) fn member(id: &str, role: &str) -> Member {
    Member {
        id: MemberId::new(id),
        guild_id: GuildId::new(GUILD),
        display_name: id.to_uppercase(),
        class_color: "#C69B6D".to_string(),
        role: role.to_string(),
    }
}

/// `(rank, slot, item_id)` triples.
pub(super) fn submission(
    id: &str,
    member_id: &str,
    status: SubmissionStatus,
    cells: &[(u8, u8, &str)],
) -> Submission {
    let selections = cells
        .iter()
        .map(|(rank_value, slot, item_id)| {
            RankedSelection::new(
                rank(*rank_value),
                SlotIndex::try_from(*slot).expect("valid slot"),
                ItemId::new(*item_id),
            )
        })
        .collect();

    Submission {
        id: SubmissionId::new(id),
        guild_id: GuildId::new(GUILD),
        member_id: MemberId::new(member_id),
        tier_id: TierId::new(TIER),
        status,
        selections,
    }
}

pub(super) fn raid(
    member_id: &str,
    days_ago: i64,
    signed_up: bool,
    attended: bool,
) -> AttendanceRecord {
    AttendanceRecord {
        member_id: MemberId::new(member_id),
        raid_event_id: RaidEventId::new(format!("raid-{days_ago}")),
        raid_date: today() - chrono::Duration::days(days_ago),
        signed_up,
        attended,
        no_call_no_show: false,
    }
}

pub(super) fn guild_config() -> GuildScoringConfig {
    GuildScoringConfig::default()
        .with_role_modifier("Raider", 1.0)
        .with_role_modifier("Officer", 0.5)
        .with_role_modifier("Trial", -2.0)
}

#[derive(Default, Clone)]
pub(super) struct MemoryLootStore {
    pub(super) items: Arc<Mutex<HashMap<TierId, Vec<Item>>>>,
    pub(super) submissions: Arc<Mutex<Vec<Submission>>>,
    pub(super) attendance: Arc<Mutex<Vec<AttendanceRecord>>>,
    pub(super) settings: Arc<Mutex<HashMap<GuildId, GuildScoringConfig>>>,
    pub(super) roster: Arc<Mutex<HashMap<MemberId, Member>>>,
}

impl MemoryLootStore {
    pub(super) fn seeded() -> Self {
        let store = Self::default();
        store.stock(TIER, catalog());
        store.stock(
            OTHER_TIER,
            vec![item(
                "sulfuras",
                ItemClassification::Reserved,
                "Two-Hand",
                "Mace",
            )],
        );
        for (id, role) in [
            ("thrall", "Raider"),
            ("jaina", "Raider"),
            ("sylvanas", "Trial"),
            ("anduin", "Officer"),
        ] {
            store.enroll(member(id, role));
        }
        store.configure(guild_config());
        store
    }

    pub(super) fn stock(&self, tier: &str, items: Vec<Item>) {
        self.items
            .lock()
            .expect("items mutex poisoned")
            .insert(TierId::new(tier), items);
    }

    pub(super) fn enroll(&self, member: Member) {
        self.roster
            .lock()
            .expect("roster mutex poisoned")
            .insert(member.id.clone(), member);
    }

    pub(super) fn configure(&self, config: GuildScoringConfig) {
        self.settings
            .lock()
            .expect("settings mutex poisoned")
            .insert(GuildId::new(GUILD), config);
    }

    pub(super) fn insert(&self, submission: Submission) {
        self.replace_submission(submission)
            .expect("memory store accepts submissions");
    }

    pub(super) fn record(&self, records: impl IntoIterator<Item = AttendanceRecord>) {
        self.attendance
            .lock()
            .expect("attendance mutex poisoned")
            .extend(records);
    }

    pub(super) fn stored(&self, id: &str) -> Option<Submission> {
        self.submission(&SubmissionId::new(id))
            .expect("memory store reads")
    }
}

impl ItemCatalog for MemoryLootStore {
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

impl SubmissionStore for MemoryLootStore {
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
        let mut guard = self.submissions.lock().expect("submission mutex poisoned");
        match guard.iter_mut().find(|existing| existing.id == submission.id) {
            Some(existing) => *existing = submission,
            None => guard.push(submission),
        }
        Ok(())
    }
}

impl AttendanceStore for MemoryLootStore {
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

impl GuildSettingsStore for MemoryLootStore {
    fn get(&self, guild_id: &GuildId) -> Result<Option<GuildScoringConfig>, RepositoryError> {
        let guard = self.settings.lock().expect("settings mutex poisoned");
        Ok(guard.get(guild_id).cloned())
    }
}

impl GuildRoster for MemoryLootStore {
    fn member(&self, member_id: &MemberId) -> Result<Option<Member>, RepositoryError> {
        let guard = self.roster.lock().expect("roster mutex poisoned");
        Ok(guard.get(member_id).cloned())
    }
}

pub(super) struct UnavailableStore;

impl ItemCatalog for UnavailableStore {
    fn items_for_tier(&self, _tier_id: &TierId) -> Result<Vec<Item>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn item(&self, _item_id: &ItemId) -> Result<Option<Item>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }
}

impl SubmissionStore for UnavailableStore {
    fn submission(&self, _id: &SubmissionId) -> Result<Option<Submission>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn submissions_for_member(
        &self,
        _member_id: &MemberId,
        _tier_id: &TierId,
    ) -> Result<Vec<Submission>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn active_submissions_for_item(
        &self,
        _guild_id: &GuildId,
        _item_id: &ItemId,
    ) -> Result<Vec<Submission>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn replace_submission(&self, _submission: Submission) -> Result<(), RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }
}

impl AttendanceStore for UnavailableStore {
    fn records(
        &self,
        _member_id: &MemberId,
        _window_start: NaiveDate,
    ) -> Result<Vec<AttendanceRecord>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }
}

impl GuildSettingsStore for UnavailableStore {
    fn get(&self, _guild_id: &GuildId) -> Result<Option<GuildScoringConfig>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }
}

impl GuildRoster for UnavailableStore {
    fn member(&self, _member_id: &MemberId) -> Result<Option<Member>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }
}

pub(super) fn build_service() -> (LootPriorityService<MemoryLootStore>, Arc<MemoryLootStore>) {
    let store = Arc::new(MemoryLootStore::seeded());
    let service = LootPriorityService::new(store.clone(), LootConfig::default());
    (service, store)
}

pub(super) fn unavailable_service() -> LootPriorityService<UnavailableStore> {
    LootPriorityService::new(Arc::new(UnavailableStore), LootConfig::default())
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}

pub(super) fn loot_router_with_service(
    service: LootPriorityService<MemoryLootStore>,
) -> axum::Router {
    loot_router(Arc::new(service))
}
