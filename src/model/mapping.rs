use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// A card on a project board and its copy on the weekly board.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Mapping {
    pub original_card_id: String,
    pub weekly_card_id: String,
    pub original_board_id: String,
    pub original_list_id: String,
    pub synced_at: String,
}

impl Mapping {
    pub fn new(
        original_card_id: &str,
        weekly_card_id: &str,
        original_board_id: &str,
        original_list_id: &str,
    ) -> Self {
        Self {
            original_card_id: original_card_id.into(),
            weekly_card_id: weekly_card_id.into(),
            original_board_id: original_board_id.into(),
            original_list_id: original_list_id.into(),
            synced_at: chrono::Utc::now().to_rfc3339(),
        }
    }
}

/// Every active mirror, keyed 1:1 on both card ids.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MappingTable {
    #[serde(default)]
    pub mappings: Vec<Mapping>,
    #[serde(default)]
    pub last_updated: Option<String>,
}

impl MappingTable {
    pub fn len(&self) -> usize {
        self.mappings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mappings.is_empty()
    }

    pub fn find_by_original(&self, original_card_id: &str) -> Option<&Mapping> {
        self.mappings
            .iter()
            .find(|m| m.original_card_id == original_card_id)
    }

    pub fn find_by_weekly(&self, weekly_card_id: &str) -> Option<&Mapping> {
        self.mappings
            .iter()
            .find(|m| m.weekly_card_id == weekly_card_id)
    }

    /// Appends the mapping unless either card id is already mapped.
    pub fn add(&mut self, mapping: Mapping) -> bool {
        if self.find_by_original(&mapping.original_card_id).is_some()
            || self.find_by_weekly(&mapping.weekly_card_id).is_some()
        {
            return false;
        }
        self.mappings.push(mapping);
        true
    }

    pub fn remove_by_weekly(&mut self, weekly_card_id: &str) -> Option<Mapping> {
        let idx = self
            .mappings
            .iter()
            .position(|m| m.weekly_card_id == weekly_card_id)?;
        Some(self.mappings.remove(idx))
    }

    /// Drops later entries that reuse an already-seen card id on either side.
    /// Returns how many entries were dropped.
    pub fn dedupe(&mut self) -> usize {
        let before = self.mappings.len();
        let mut originals = HashSet::new();
        let mut weeklies = HashSet::new();
        self.mappings.retain(|m| {
            let fresh = !originals.contains(&m.original_card_id)
                && !weeklies.contains(&m.weekly_card_id);
            if fresh {
                originals.insert(m.original_card_id.clone());
                weeklies.insert(m.weekly_card_id.clone());
            }
            fresh
        });
        before - self.mappings.len()
    }
}
