use serde::{Deserialize, Serialize};

use crate::{
    domain::{InteractionId, Item, ItemId, PlayerId},
    error::SceneError,
};

/// Events the host scene pushes to subscribed extensions.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "snake_case")]
pub enum SceneEvent {
    SceneReadyChanged {
        ready: bool,
    },
    PlayerSelectionChanged {
        player_id: PlayerId,
        selection: Vec<ItemId>,
    },
    ItemsChanged {
        items: Vec<Item>,
    },
    /// In-progress state broadcast from an open interaction session.
    /// Preview only; nothing is persisted until a commit lands.
    InteractionPreview {
        interaction_id: InteractionId,
        items: Vec<Item>,
    },
    Error(SceneError),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Item, PlayerId, Point};

    #[test]
    fn scene_events_round_trip_through_tagged_json() {
        let item = Item::token("goblin", Point::new(4.0, 2.0));
        let event = SceneEvent::PlayerSelectionChanged {
            player_id: PlayerId::generate(),
            selection: vec![item.id],
        };

        let raw = serde_json::to_string(&event).expect("serialize");
        assert!(raw.contains("player_selection_changed"));
        let parsed: SceneEvent = serde_json::from_str(&raw).expect("deserialize");
        match parsed {
            SceneEvent::PlayerSelectionChanged { selection, .. } => {
                assert_eq!(selection, vec![item.id]);
            }
            other => panic!("unexpected event: {other:?}"),
        }
    }
}
