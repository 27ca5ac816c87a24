//! Backend worker: owns the tokio runtime, the scene host, and the live
//! interaction session; executes UI commands in arrival order.

use std::{sync::Arc, thread};

use crossbeam_channel::{Receiver, Sender};
use host_core::{rotate_to, InteractionSession, LocalSceneHost, SceneHost};
use shared::{
    domain::{Item, Point},
    protocol::SceneEvent,
};
use tokio::sync::broadcast;

use crate::backend_bridge::commands::BackendCommand;
use crate::controller::events::{UiError, UiErrorContext, UiEvent};

pub fn launch(cmd_rx: Receiver<BackendCommand>, ui_tx: Sender<UiEvent>) {
    thread::spawn(move || run_worker(cmd_rx, ui_tx));
}

fn run_worker(cmd_rx: Receiver<BackendCommand>, ui_tx: Sender<UiEvent>) {
    let _ = ui_tx.try_send(UiEvent::Info("Backend worker starting...".to_string()));
    let runtime = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(err) => {
            let _ = ui_tx.try_send(UiEvent::Error(UiError::from_message(
                UiErrorContext::BackendStartup,
                format!("backend worker startup failure: failed to build runtime: {err}"),
            )));
            tracing::error!("failed to build backend runtime: {err}");
            return;
        }
    };

    runtime.block_on(async move {
        let host = Arc::new(LocalSceneHost::new());

        // Subscribe before seeding so readiness and the initial selection
        // reach the UI.
        let forward_task = spawn_event_forwarder(host.subscribe_events(), ui_tx.clone());
        seed_demo_scene(host.as_ref()).await;
        let _ = ui_tx.try_send(UiEvent::Info("Backend worker ready".to_string()));

        let mut session: Option<Arc<dyn InteractionSession>> = None;
        while let Ok(cmd) = cmd_rx.recv() {
            match cmd {
                BackendCommand::ReadSelection => {
                    tracing::info!("backend: read_selection");
                    match host.player_selection().await {
                        Ok(selection) => {
                            let _ = ui_tx.try_send(UiEvent::SelectionChanged { selection });
                        }
                        Err(err) => {
                            tracing::error!("backend: read_selection failed: {err}");
                            let _ = ui_tx.try_send(UiEvent::Error(UiError::from_message(
                                UiErrorContext::ReadSelection,
                                err.to_string(),
                            )));
                        }
                    }
                }
                BackendCommand::SyncRotation { item_id } => {
                    tracing::info!(item = %item_id.0, "backend: sync_rotation");
                    match host.items(&[item_id]).await {
                        Ok(items) => match items.into_iter().next() {
                            Some(item) => {
                                let _ = ui_tx.try_send(UiEvent::RotationSynced {
                                    item_id,
                                    rotation: item.rotation,
                                });
                            }
                            None => {
                                tracing::warn!(item = %item_id.0, "backend: sync_rotation found no item");
                            }
                        },
                        Err(err) => {
                            tracing::error!("backend: sync_rotation failed: {err}");
                            let _ = ui_tx.try_send(UiEvent::Error(UiError::from_message(
                                UiErrorContext::SyncRotation,
                                err.to_string(),
                            )));
                        }
                    }
                }
                BackendCommand::StartInteraction { items } => {
                    tracing::info!(items = items.len(), "backend: start_interaction");
                    match host.start_interaction(&items).await {
                        Ok(live) => {
                            session = Some(live);
                            let _ = ui_tx.try_send(UiEvent::InteractionStarted);
                        }
                        Err(err) => {
                            tracing::error!("backend: start_interaction failed: {err}");
                            let _ = ui_tx.try_send(UiEvent::Error(UiError::from_message(
                                UiErrorContext::General,
                                err.to_string(),
                            )));
                        }
                    }
                }
                BackendCommand::PushRotation {
                    items,
                    rotation,
                    via_session,
                } => {
                    tracing::debug!(rotation, via_session, "backend: push_rotation");
                    let result = match (&session, via_session) {
                        (Some(live), true) => live.update(rotate_to(rotation)).await,
                        // Session gone or never confirmed: degrade to a
                        // direct update rather than dropping the move.
                        _ => host.update_items(&items, rotate_to(rotation)).await,
                    };
                    if let Err(err) = result {
                        tracing::error!("backend: push_rotation failed: {err}");
                        let _ = ui_tx.try_send(UiEvent::Error(UiError::from_message(
                            UiErrorContext::PushRotation,
                            err.to_string(),
                        )));
                    }
                }
                BackendCommand::CommitRotation {
                    items,
                    rotation,
                    close_session,
                } => {
                    tracing::info!(rotation, items = items.len(), "backend: commit_rotation");
                    if close_session {
                        if let Some(live) = session.take() {
                            if let Err(err) = live.stop().await {
                                tracing::warn!("backend: interaction stop failed: {err}");
                            }
                        }
                        let _ = ui_tx.try_send(UiEvent::InteractionEnded);
                    }

                    // Stopping a session never persists; this write is the
                    // one that makes the rotation durable.
                    if let Err(err) = host.update_items(&items, rotate_to(rotation)).await {
                        tracing::error!("backend: commit_rotation failed: {err}");
                        let _ = ui_tx.try_send(UiEvent::Error(UiError::from_message(
                            UiErrorContext::Commit,
                            err.to_string(),
                        )));
                    }
                }
            }
        }

        forward_task.abort();
    });
}

fn spawn_event_forwarder(
    mut events: broadcast::Receiver<SceneEvent>,
    ui_tx: Sender<UiEvent>,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        while let Ok(event) = events.recv().await {
            let forwarded = match event {
                SceneEvent::SceneReadyChanged { ready } => {
                    Some(UiEvent::SceneReadyChanged { ready })
                }
                SceneEvent::PlayerSelectionChanged { selection, .. } => {
                    Some(UiEvent::SelectionChanged { selection })
                }
                SceneEvent::ItemsChanged { items } => Some(UiEvent::ItemsChanged { items }),
                // This process produces the previews; only other
                // participants render them.
                SceneEvent::InteractionPreview { .. } => None,
                SceneEvent::Error(err) => Some(UiEvent::Error(UiError::from_message(
                    UiErrorContext::General,
                    err.message,
                ))),
            };
            if let Some(event) = forwarded {
                let _ = ui_tx.try_send(event);
            }
        }
    })
}

async fn seed_demo_scene(host: &LocalSceneHost) {
    let goblin = Item::token("Goblin", Point::new(120.0, 80.0));
    let mut ogre = Item::token("Ogre", Point::new(260.0, 150.0));
    ogre.rotation = 30.0;
    let first = goblin.id;

    host.insert_items(vec![goblin, ogre]).await;
    host.set_scene_ready(true).await;
    host.select(vec![first]).await;
    tracing::info!("seeded offline demo scene with 2 tokens");
}
