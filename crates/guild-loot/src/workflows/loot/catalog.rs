use std::collections::HashMap;

use super::domain::{Item, ItemId, LootIntegrityError};

/// Id-keyed view over the catalog subset for one raid tier.
#[derive(Debug, Clone, Default)]
pub struct ItemIndex {
    items: HashMap<ItemId, Item>,
}

impl ItemIndex {
    pub fn new(items: impl IntoIterator<Item = Item>) -> Self {
        let items = items
            .into_iter()
            .map(|item| (item.id.clone(), item))
            .collect();
        Self { items }
    }

    pub fn get(&self, item_id: &ItemId) -> Option<&Item> {
        self.items.get(item_id)
    }

    pub fn require(&self, item_id: &ItemId) -> Result<&Item, LootIntegrityError> {
        self.items
            .get(item_id)
            .ok_or_else(|| LootIntegrityError::UnknownItem {
                item_id: item_id.clone(),
            })
    }

    /// Items currently open for ranking, ordered by boss then name for stable output.
    pub fn available(&self) -> Vec<&Item> {
        let mut items: Vec<&Item> = self
            .items
            .values()
            .filter(|item| item.is_available)
            .collect();
        items.sort_by(|a, b| {
            a.boss_name
                .cmp(&b.boss_name)
                .then_with(|| a.name.cmp(&b.name))
        });
        items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl FromIterator<Item> for ItemIndex {
    fn from_iter<T: IntoIterator<Item = Item>>(iter: T) -> Self {
        Self::new(iter)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflows::loot::domain::ItemClassification;

    fn item(id: &str, boss: &str, available: bool) -> Item {
        Item {
            id: ItemId::new(id),
            name: id.to_uppercase(),
            boss_name: boss.to_string(),
            slot: "Trinket".to_string(),
            item_type: "Trinket".to_string(),
            classification: ItemClassification::Limited,
            is_available: available,
        }
    }

    #[test]
    fn require_reports_unknown_items() {
        let index = ItemIndex::new(vec![item("orb", "Kel'Thuzad", true)]);

        assert!(index.require(&ItemId::new("orb")).is_ok());
        assert_eq!(
            index.require(&ItemId::new("missing")),
            Err(LootIntegrityError::UnknownItem {
                item_id: ItemId::new("missing")
            })
        );
    }

    #[test]
    fn available_skips_withdrawn_items_and_sorts_by_boss() {
        let index: ItemIndex = vec![
            item("b", "Sapphiron", true),
            item("a", "Anub'Rekhan", true),
            item("c", "Anub'Rekhan", false),
        ]
        .into_iter()
        .collect();

        let names: Vec<&str> = index
            .available()
            .iter()
            .map(|item| item.id.as_str())
            .collect();
        assert_eq!(names, vec!["a", "b"]);
        assert_eq!(index.len(), 3);
    }
}
