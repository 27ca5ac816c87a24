use super::*;
use shared::domain::Point;

async fn ready_scene_with_token(rotation: f64) -> (LocalSceneHost, ItemId) {
    let host = LocalSceneHost::new();
    let mut item = Item::token("goblin", Point::new(3.0, 5.0));
    item.rotation = rotation;
    let id = item.id;
    host.insert_items(vec![item]).await;
    host.set_scene_ready(true).await;
    (host, id)
}

#[tokio::test]
async fn selection_updates_are_broadcast_to_subscribers() {
    let (host, id) = ready_scene_with_token(0.0).await;
    let mut events = host.subscribe_events();

    host.select(vec![id]).await;

    match events.recv().await.expect("selection event") {
        SceneEvent::PlayerSelectionChanged {
            player_id,
            selection,
        } => {
            assert_eq!(player_id, host.player_id());
            assert_eq!(selection, vec![id]);
        }
        other => panic!("unexpected event: {other:?}"),
    }

    assert_eq!(host.player_selection().await.expect("selection"), vec![id]);
}

#[tokio::test]
async fn items_returns_current_records_and_skips_unknown_ids() {
    let (host, id) = ready_scene_with_token(30.0).await;

    let found = host
        .items(&[id, ItemId::generate()])
        .await
        .expect("items read");

    assert_eq!(found.len(), 1);
    assert_eq!(found[0].id, id);
    assert_eq!(found[0].rotation, 30.0);
}

#[tokio::test]
async fn update_items_persists_rotation_and_broadcasts() {
    let (host, id) = ready_scene_with_token(0.0).await;
    let mut events = host.subscribe_events();

    host.update_items(&[id], rotate_to(90.0))
        .await
        .expect("update");

    match events.recv().await.expect("items event") {
        SceneEvent::ItemsChanged { items } => {
            assert_eq!(items.len(), 1);
            assert_eq!(items[0].rotation, 90.0);
        }
        other => panic!("unexpected event: {other:?}"),
    }

    let persisted = host.items(&[id]).await.expect("items read");
    assert_eq!(persisted[0].rotation, 90.0);
}

#[tokio::test]
async fn update_items_with_only_unknown_ids_is_a_silent_no_op() {
    let (host, _id) = ready_scene_with_token(0.0).await;
    let mut events = host.subscribe_events();

    host.update_items(&[ItemId::generate()], rotate_to(45.0))
        .await
        .expect("update");

    assert!(matches!(
        events.try_recv(),
        Err(broadcast::error::TryRecvError::Empty)
    ));
}

#[tokio::test]
async fn interaction_preview_broadcasts_without_persisting() {
    let (host, id) = ready_scene_with_token(30.0).await;
    let mut events = host.subscribe_events();

    let session = host.start_interaction(&[id]).await.expect("session");
    session.update(rotate_to(90.0)).await.expect("preview");

    match events.recv().await.expect("preview event") {
        SceneEvent::InteractionPreview {
            interaction_id,
            items,
        } => {
            assert_eq!(interaction_id, session.id());
            assert_eq!(items[0].rotation, 90.0);
        }
        other => panic!("unexpected event: {other:?}"),
    }

    // The scene document is untouched until a commit lands.
    let persisted = host.items(&[id]).await.expect("items read");
    assert_eq!(persisted[0].rotation, 30.0);
}

#[tokio::test]
async fn stop_discards_preview_and_commit_persists_final_rotation() {
    let (host, id) = ready_scene_with_token(30.0).await;

    let session = host.start_interaction(&[id]).await.expect("session");
    session.update(rotate_to(90.0)).await.expect("preview");
    session.stop().await.expect("stop");

    let after_stop = host.items(&[id]).await.expect("items read");
    assert_eq!(after_stop[0].rotation, 30.0);

    host.update_items(&[id], rotate_to(90.0))
        .await
        .expect("commit");
    let committed = host.items(&[id]).await.expect("items read");
    assert_eq!(committed[0].rotation, 90.0);
}

#[tokio::test]
async fn second_interaction_while_one_is_live_is_rejected() {
    let (host, id) = ready_scene_with_token(0.0).await;

    let _session = host.start_interaction(&[id]).await.expect("first session");
    let second = host.start_interaction(&[id]).await;

    let err = second.expect_err("second session must fail");
    assert!(matches!(
        err.downcast_ref::<InteractionError>(),
        Some(InteractionError::AlreadyLive)
    ));
}

#[tokio::test]
async fn interaction_update_after_stop_fails() {
    let (host, id) = ready_scene_with_token(0.0).await;

    let session = host.start_interaction(&[id]).await.expect("session");
    session.stop().await.expect("stop");

    let err = session
        .update(rotate_to(10.0))
        .await
        .expect_err("update after stop must fail");
    assert!(matches!(
        err.downcast_ref::<InteractionError>(),
        Some(InteractionError::Closed)
    ));
}

#[tokio::test]
async fn interactions_require_a_ready_scene() {
    let host = LocalSceneHost::new();
    let item = Item::token("goblin", Point::default());
    let id = item.id;
    host.insert_items(vec![item]).await;

    let err = host
        .start_interaction(&[id])
        .await
        .expect_err("not-ready scene must reject sessions");
    assert!(matches!(
        err.downcast_ref::<InteractionError>(),
        Some(InteractionError::SceneNotReady)
    ));
}

#[tokio::test]
async fn interactions_reject_items_missing_from_the_scene() {
    let (host, _id) = ready_scene_with_token(0.0).await;

    let missing = ItemId::generate();
    let err = host
        .start_interaction(&[missing])
        .await
        .expect_err("unknown item must be rejected");
    assert!(matches!(
        err.downcast_ref::<InteractionError>(),
        Some(InteractionError::UnknownItem(id)) if *id == missing
    ));
}

#[tokio::test]
async fn detached_host_rejects_every_operation() {
    let host = DetachedSceneHost::new();

    assert!(host.scene_ready().await.is_err());
    assert!(host.player_selection().await.is_err());
    assert!(host.items(&[ItemId::generate()]).await.is_err());
    assert!(host
        .update_items(&[ItemId::generate()], rotate_to(1.0))
        .await
        .is_err());

    let err = host
        .start_interaction(&[ItemId::generate()])
        .await
        .expect_err("detached host must fail");
    let exception = err
        .downcast_ref::<HostException>()
        .expect("typed host exception");
    assert_eq!(exception.code, HostErrorCode::Detached);
}
