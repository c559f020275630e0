use std::collections::{BTreeMap, HashSet};

use super::super::domain::{Item, ItemId, Rank, RankedSelection, SlotIndex};
use super::brackets::Bracket;
use super::policy::{BracketViolation, GlobalViolation};

/// A selection joined with its catalog entry.
#[derive(Debug, Clone, Copy)]
pub(crate) struct ResolvedSelection<'a> {
    pub selection: &'a RankedSelection,
    pub item: &'a Item,
}

pub(crate) struct BracketTally {
    pub allocation_points: u32,
    pub violations: Vec<BracketViolation>,
}

pub(crate) fn check_global(resolved: &[ResolvedSelection<'_>]) -> Vec<GlobalViolation> {
    if resolved.is_empty() {
        return vec![GlobalViolation::NoSelections];
    }

    // BTreeMap keeps the report order stable across runs.
    let mut cells_by_item: BTreeMap<&ItemId, (&Item, Vec<(Rank, SlotIndex)>)> = BTreeMap::new();
    for entry in resolved {
        cells_by_item
            .entry(&entry.item.id)
            .or_insert_with(|| (entry.item, Vec::new()))
            .1
            .push((entry.selection.rank, entry.selection.slot));
    }

    cells_by_item
        .into_values()
        .filter(|(_, cells)| cells.len() > 1)
        .map(|(item, mut cells)| {
            cells.sort_by(|a, b| b.0.cmp(&a.0).then(a.1.cmp(&b.1)));
            GlobalViolation::DuplicateItem {
                item_id: item.id.clone(),
                item_name: item.name.clone(),
                cells,
            }
        })
        .collect()
}

pub(crate) fn check_bracket(
    bracket: Bracket,
    resolved: &[ResolvedSelection<'_>],
    slot_restrictions_enabled: bool,
) -> BracketTally {
    let mut in_bracket: Vec<&ResolvedSelection<'_>> = resolved
        .iter()
        .filter(|entry| bracket.contains(entry.selection.rank))
        .collect();
    in_bracket.sort_by(|a, b| {
        b.selection
            .rank
            .cmp(&a.selection.rank)
            .then(a.selection.slot.cmp(&b.selection.slot))
    });
    // Repeats are reported by the global check; the tally sees each item once.
    let mut seen: HashSet<&ItemId> = HashSet::new();
    in_bracket.retain(|entry| seen.insert(&entry.item.id));

    let mut violations = Vec::new();

    let allocation_points: u32 = in_bracket
        .iter()
        .map(|entry| entry.item.allocation_cost())
        .sum();
    let max_points = bracket.allocation_budget();
    if allocation_points > max_points {
        violations.push(BracketViolation::OverBudget {
            points: allocation_points,
            max_points,
        });
    }

    for (item_type, count) in count_by(&in_bracket, |item| item.item_type.as_str()) {
        if count > 1 {
            violations.push(BracketViolation::DuplicateType {
                item_type: item_type.to_string(),
                count,
            });
        }
    }

    if slot_restrictions_enabled {
        for (slot, count) in count_by(&in_bracket, |item| item.slot.as_str()) {
            if count > 1 {
                violations.push(BracketViolation::DuplicateSlot {
                    slot: slot.to_string(),
                    count,
                });
            }
        }
    }

    for rank in bracket.ranks() {
        let at_rank: Vec<&&ResolvedSelection<'_>> = in_bracket
            .iter()
            .filter(|entry| entry.selection.rank == rank)
            .collect();
        let both_filled = SlotIndex::ordered()
            .iter()
            .all(|slot| at_rank.iter().any(|entry| entry.selection.slot == *slot));
        if both_filled && at_rank.iter().any(|entry| entry.item.is_reserved()) {
            violations.push(BracketViolation::ReservedNotAlone { rank });
        }
    }

    BracketTally {
        allocation_points,
        violations,
    }
}

fn count_by<'a, F>(entries: &[&ResolvedSelection<'a>], key: F) -> BTreeMap<&'a str, usize>
where
    F: Fn(&'a Item) -> &'a str,
{
    let mut counts = BTreeMap::new();
    for entry in entries {
        *counts.entry(key(entry.item)).or_insert(0) += 1;
    }
    counts
}
