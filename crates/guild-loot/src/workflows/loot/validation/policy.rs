use serde::{Deserialize, Serialize};

use super::super::domain::{ItemId, Rank, SlotIndex};

/// Rule broken inside one budgeted bracket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BracketViolation {
    OverBudget { points: u32, max_points: u32 },
    DuplicateType { item_type: String, count: usize },
    DuplicateSlot { slot: String, count: usize },
    ReservedNotAlone { rank: Rank },
}

impl BracketViolation {
    pub fn summary(&self) -> String {
        match self {
            BracketViolation::OverBudget { points, max_points } => format!(
                "allocation points {points} exceed the bracket budget of {max_points}"
            ),
            BracketViolation::DuplicateType { item_type, count } => {
                format!("duplicate type: {count} {item_type} items selected in this bracket")
            }
            BracketViolation::DuplicateSlot { slot, count } => {
                format!("duplicate slot: {count} {slot} items selected in this bracket")
            }
            BracketViolation::ReservedNotAlone { rank } => {
                format!("Reserved items must be alone at rank {rank}")
            }
        }
    }
}

/// Rule broken by the submission as a whole, independent of brackets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum GlobalViolation {
    NoSelections,
    DuplicateItem {
        item_id: ItemId,
        item_name: String,
        cells: Vec<(Rank, SlotIndex)>,
    },
}

impl GlobalViolation {
    pub fn summary(&self) -> String {
        match self {
            GlobalViolation::NoSelections => "at least one item must be ranked".to_string(),
            GlobalViolation::DuplicateItem {
                item_name, cells, ..
            } => {
                let positions = cells
                    .iter()
                    .map(|(rank, slot)| format!("rank {rank} slot {}", slot.number()))
                    .collect::<Vec<_>>()
                    .join(", ");
                format!("{item_name} is ranked more than once ({positions})")
            }
        }
    }
}
