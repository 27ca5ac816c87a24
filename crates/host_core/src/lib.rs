//! Client-side boundary to the virtual-tabletop host scene.
//!
//! The dial never talks to a concrete platform directly; everything goes
//! through [`SceneHost`]. [`LocalSceneHost`] is the in-process scene used by
//! tests and offline runs, [`DetachedSceneHost`] is the null object used
//! before a host is attached.

use std::{collections::HashMap, sync::Arc};

use anyhow::Result;
use async_trait::async_trait;
use shared::{
    domain::{InteractionId, Item, ItemId, PlayerId},
    error::{HostErrorCode, HostException},
    protocol::SceneEvent,
};
use thiserror::Error;
use tokio::sync::{broadcast, Mutex};
use tracing::debug;

const EVENT_CHANNEL_CAPACITY: usize = 1024;

/// Mutation applied to each matching item during an update or a preview.
pub type ItemMutator = Arc<dyn Fn(&mut Item) + Send + Sync>;

/// Mutator that overwrites the rotation of every matching item.
pub fn rotate_to(rotation: f64) -> ItemMutator {
    Arc::new(move |item: &mut Item| item.rotation = rotation)
}

#[derive(Debug, Error)]
pub enum InteractionError {
    #[error("scene is not ready for interactions")]
    SceneNotReady,
    #[error("another interaction session is already live")]
    AlreadyLive,
    #[error("item {0:?} is not part of the scene")]
    UnknownItem(ItemId),
    #[error("interaction session is closed")]
    Closed,
}

/// Exclusive low-latency preview channel over a set of items.
///
/// `update` broadcasts in-progress state to other participants without
/// persisting it. `stop` ends the session and discards the preview; callers
/// that want the result to survive must follow up with
/// [`SceneHost::update_items`].
#[async_trait]
pub trait InteractionSession: Send + Sync {
    fn id(&self) -> InteractionId;
    async fn update(&self, mutate: ItemMutator) -> Result<()>;
    async fn stop(&self) -> Result<()>;
}

impl std::fmt::Debug for dyn InteractionSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InteractionSession")
            .field("id", &self.id())
            .finish()
    }
}

/// Host-platform operations consumed by the dial.
#[async_trait]
pub trait SceneHost: Send + Sync {
    async fn scene_ready(&self) -> Result<bool>;
    /// Current selection of the local player; empty when nothing is selected.
    async fn player_selection(&self) -> Result<Vec<ItemId>>;
    /// Item records for the given ids. Unknown ids are skipped.
    async fn items(&self, ids: &[ItemId]) -> Result<Vec<Item>>;
    /// Apply `mutate` to each matching item, persist into the scene document
    /// and broadcast the change. Unknown ids are skipped.
    async fn update_items(&self, ids: &[ItemId], mutate: ItemMutator) -> Result<()>;
    async fn start_interaction(&self, ids: &[ItemId]) -> Result<Arc<dyn InteractionSession>>;
    fn subscribe_events(&self) -> broadcast::Receiver<SceneEvent>;
}

/// Null object for the time before a real host is attached. Every operation
/// fails with [`HostErrorCode::Detached`]; the event stream never yields.
pub struct DetachedSceneHost {
    events: broadcast::Sender<SceneEvent>,
}

impl DetachedSceneHost {
    pub fn new() -> Self {
        let (events, _) = broadcast::channel(1);
        Self { events }
    }
}

impl Default for DetachedSceneHost {
    fn default() -> Self {
        Self::new()
    }
}

fn detached(op: &str) -> anyhow::Error {
    HostException::new(
        HostErrorCode::Detached,
        format!("no scene host attached for {op}"),
    )
    .into()
}

#[async_trait]
impl SceneHost for DetachedSceneHost {
    async fn scene_ready(&self) -> Result<bool> {
        Err(detached("scene_ready"))
    }

    async fn player_selection(&self) -> Result<Vec<ItemId>> {
        Err(detached("player_selection"))
    }

    async fn items(&self, _ids: &[ItemId]) -> Result<Vec<Item>> {
        Err(detached("items"))
    }

    async fn update_items(&self, _ids: &[ItemId], _mutate: ItemMutator) -> Result<()> {
        Err(detached("update_items"))
    }

    async fn start_interaction(&self, _ids: &[ItemId]) -> Result<Arc<dyn InteractionSession>> {
        Err(detached("start_interaction"))
    }

    fn subscribe_events(&self) -> broadcast::Receiver<SceneEvent> {
        self.events.subscribe()
    }
}

struct LiveInteraction {
    id: InteractionId,
    preview: HashMap<ItemId, Item>,
}

struct SceneDocument {
    ready: bool,
    selection: Vec<ItemId>,
    items: HashMap<ItemId, Item>,
    live_interaction: Option<LiveInteraction>,
}

/// In-process scene document with broadcast fan-out. Doubles as the
/// reference semantics for interaction-session exclusivity.
pub struct LocalSceneHost {
    player_id: PlayerId,
    inner: Arc<Mutex<SceneDocument>>,
    events: broadcast::Sender<SceneEvent>,
}

impl LocalSceneHost {
    pub fn new() -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            player_id: PlayerId::generate(),
            inner: Arc::new(Mutex::new(SceneDocument {
                ready: false,
                selection: Vec::new(),
                items: HashMap::new(),
                live_interaction: None,
            })),
            events,
        }
    }

    pub fn player_id(&self) -> PlayerId {
        self.player_id
    }

    pub async fn set_scene_ready(&self, ready: bool) {
        let mut guard = self.inner.lock().await;
        guard.ready = ready;
        drop(guard);
        let _ = self.events.send(SceneEvent::SceneReadyChanged { ready });
    }

    pub async fn insert_items(&self, items: Vec<Item>) {
        let mut guard = self.inner.lock().await;
        for item in &items {
            guard.items.insert(item.id, item.clone());
        }
        drop(guard);
        let _ = self.events.send(SceneEvent::ItemsChanged { items });
    }

    /// Replace the local player's selection and notify subscribers.
    pub async fn select(&self, selection: Vec<ItemId>) {
        let mut guard = self.inner.lock().await;
        guard.selection = selection.clone();
        drop(guard);
        let _ = self.events.send(SceneEvent::PlayerSelectionChanged {
            player_id: self.player_id,
            selection,
        });
    }
}

impl Default for LocalSceneHost {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SceneHost for LocalSceneHost {
    async fn scene_ready(&self) -> Result<bool> {
        Ok(self.inner.lock().await.ready)
    }

    async fn player_selection(&self) -> Result<Vec<ItemId>> {
        Ok(self.inner.lock().await.selection.clone())
    }

    async fn items(&self, ids: &[ItemId]) -> Result<Vec<Item>> {
        let guard = self.inner.lock().await;
        Ok(ids
            .iter()
            .filter_map(|id| guard.items.get(id).cloned())
            .collect())
    }

    async fn update_items(&self, ids: &[ItemId], mutate: ItemMutator) -> Result<()> {
        let changed = {
            let mut guard = self.inner.lock().await;
            let mut changed = Vec::with_capacity(ids.len());
            for id in ids {
                match guard.items.get_mut(id) {
                    Some(item) => {
                        mutate(item);
                        changed.push(item.clone());
                    }
                    None => debug!(item = %id.0, "update skipped unknown item"),
                }
            }
            changed
        };

        if !changed.is_empty() {
            let _ = self.events.send(SceneEvent::ItemsChanged { items: changed });
        }
        Ok(())
    }

    async fn start_interaction(&self, ids: &[ItemId]) -> Result<Arc<dyn InteractionSession>> {
        let mut guard = self.inner.lock().await;
        if !guard.ready {
            return Err(InteractionError::SceneNotReady.into());
        }
        if guard.live_interaction.is_some() {
            return Err(InteractionError::AlreadyLive.into());
        }

        let mut preview = HashMap::with_capacity(ids.len());
        for id in ids {
            let item = guard
                .items
                .get(id)
                .ok_or(InteractionError::UnknownItem(*id))?;
            preview.insert(*id, item.clone());
        }

        let id = InteractionId::generate();
        guard.live_interaction = Some(LiveInteraction { id, preview });
        debug!(interaction = %id.0, items = ids.len(), "interaction session opened");

        Ok(Arc::new(LocalInteraction {
            id,
            inner: Arc::clone(&self.inner),
            events: self.events.clone(),
        }))
    }

    fn subscribe_events(&self) -> broadcast::Receiver<SceneEvent> {
        self.events.subscribe()
    }
}

struct LocalInteraction {
    id: InteractionId,
    inner: Arc<Mutex<SceneDocument>>,
    events: broadcast::Sender<SceneEvent>,
}

#[async_trait]
impl InteractionSession for LocalInteraction {
    fn id(&self) -> InteractionId {
        self.id
    }

    async fn update(&self, mutate: ItemMutator) -> Result<()> {
        let items = {
            let mut guard = self.inner.lock().await;
            let live = guard
                .live_interaction
                .as_mut()
                .filter(|live| live.id == self.id)
                .ok_or(InteractionError::Closed)?;
            for item in live.preview.values_mut() {
                mutate(item);
            }
            live.preview.values().cloned().collect::<Vec<_>>()
        };

        let _ = self.events.send(SceneEvent::InteractionPreview {
            interaction_id: self.id,
            items,
        });
        Ok(())
    }

    async fn stop(&self) -> Result<()> {
        let mut guard = self.inner.lock().await;
        match &guard.live_interaction {
            Some(live) if live.id == self.id => {
                guard.live_interaction = None;
                debug!(interaction = %self.id.0, "interaction session closed");
                Ok(())
            }
            _ => Err(InteractionError::Closed.into()),
        }
    }
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
