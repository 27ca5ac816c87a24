//! Backend commands queued from UI to the backend worker.

use shared::domain::ItemId;

pub enum BackendCommand {
    ReadSelection,
    SyncRotation {
        item_id: ItemId,
    },
    StartInteraction {
        items: Vec<ItemId>,
    },
    PushRotation {
        items: Vec<ItemId>,
        rotation: f64,
        via_session: bool,
    },
    CommitRotation {
        items: Vec<ItemId>,
        rotation: f64,
        close_session: bool,
    },
}
