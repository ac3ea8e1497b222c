//! Room catalog

use serde::{Deserialize, Serialize};

/// Numeric identifier of a physical meeting room
pub type RoomId = u32;

/// Room shown when nothing else is configured
pub const DEFAULT_ROOM: RoomId = 333;

/// Display order follows the room picker
const ROOMS: [(RoomId, &str); 3] = [
    (333, "がじゅまる"),
    (332, "ハイビスカス"),
    (331, "カンムリワシ"),
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Room {
    pub id: RoomId,
    pub name: String,
}

/// Static mapping from room id to display name
#[derive(Debug, Clone)]
pub struct RoomCatalog {
    rooms: Vec<Room>,
}

impl RoomCatalog {
    pub fn new(rooms: Vec<Room>) -> Self {
        Self { rooms }
    }

    pub fn contains(&self, id: RoomId) -> bool {
        self.rooms.iter().any(|room| room.id == id)
    }

    pub fn name(&self, id: RoomId) -> Option<&str> {
        self.rooms
            .iter()
            .find(|room| room.id == id)
            .map(|room| room.name.as_str())
    }

    /// Display name, or the bare id for rooms outside the catalog
    pub fn label(&self, id: RoomId) -> String {
        self.name(id)
            .map(str::to_string)
            .unwrap_or_else(|| id.to_string())
    }

    pub fn rooms(&self) -> &[Room] {
        &self.rooms
    }
}

impl Default for RoomCatalog {
    fn default() -> Self {
        Self::new(
            ROOMS
                .iter()
                .map(|(id, name)| Room { id: *id, name: name.to_string() })
                .collect(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_catalog_knows_the_three_rooms() {
        let catalog = RoomCatalog::default();
        assert!(catalog.contains(DEFAULT_ROOM));
        assert_eq!(catalog.name(331), Some("カンムリワシ"));
        assert_eq!(catalog.name(332), Some("ハイビスカス"));
        assert_eq!(catalog.rooms().len(), 3);
    }

    #[test]
    fn unknown_rooms_are_labelled_by_number() {
        let catalog = RoomCatalog::default();
        assert!(!catalog.contains(100));
        assert_eq!(catalog.label(100), "100");
        assert_eq!(catalog.label(333), "がじゅまる");
    }
}
