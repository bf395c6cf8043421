//! Player id to display name lookup

use std::collections::HashMap;

use crate::sleeper::messages::PlayerRecord;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlayerDirectory {
    names: HashMap<String, String>,
}

impl PlayerDirectory {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn from_records(records: HashMap<String, PlayerRecord>) -> Self {
        let names = records
            .into_iter()
            .filter_map(|(id, record)| record.display_name().map(|name| (id, name)))
            .collect();
        Self { names }
    }

    /// Display name, or the raw id when unknown
    pub fn label(&self, player_id: &str) -> String {
        self.names
            .get(player_id)
            .cloned()
            .unwrap_or_else(|| player_id.to_string())
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

impl FromIterator<(String, String)> for PlayerDirectory {
    fn from_iter<T: IntoIterator<Item = (String, String)>>(iter: T) -> Self {
        Self {
            names: iter.into_iter().collect(),
        }
    }
}
