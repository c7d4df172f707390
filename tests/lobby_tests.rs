use std::sync::Arc;
use std::time::Duration;

use broadside::{LobbyConfig, LobbyError, LobbyId, LobbyService, PlayerSlot, Rules};

fn quick_expiry_config(timeout_ms: u64) -> LobbyConfig {
    LobbyConfig {
        rules: Rules::default(),
        pending_timeout: Duration::from_millis(timeout_ms),
        max_page_size: 50,
    }
}

#[tokio::test(flavor = "multi_thread")]
async fn test_create_join_full_scenario() {
    let service = LobbyService::new(LobbyConfig::default());

    let lobby = service.create("Alpha".into(), "alice".into()).await;
    assert!(!lobby.lobby_id.to_string().is_empty());
    assert_eq!(lobby.name, "Alpha");
    assert_eq!(lobby.player_one, "alice");
    assert_eq!(lobby.player_two, None);

    let joined = service.join(lobby.lobby_id, "bob".into()).await.unwrap();
    assert_eq!(joined.lobby_id, lobby.lobby_id);
    assert_eq!(joined.player_two.as_deref(), Some("bob"));

    let err = service.join(lobby.lobby_id, "carol".into()).await.unwrap_err();
    assert_eq!(err, LobbyError::LobbyFull);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_join_unknown_lobby() {
    let service = LobbyService::new(LobbyConfig::default());
    let err = service
        .join(LobbyId::generate(), "bob".into())
        .await
        .unwrap_err();
    assert_eq!(err, LobbyError::NotFound);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_join_spawns_session() {
    let service = LobbyService::new(LobbyConfig::default());
    let lobby = service.create("Alpha".into(), "alice".into()).await;
    assert_eq!(service.match_for(lobby.lobby_id).await, None);

    service.join(lobby.lobby_id, "bob".into()).await.unwrap();

    let session_id = service.match_for(lobby.lobby_id).await.unwrap();
    let session = service.session(session_id).await.unwrap();
    assert_eq!(session.id(), session_id);
    assert_eq!(session.player_name(PlayerSlot::One), "alice");
    assert_eq!(session.player_name(PlayerSlot::Two), "bob");

    service.drop_session(session_id).await;
    assert!(service.session(session_id).await.is_none());
    // a concluded match reclaims its lobby record too
    assert!(service.lobby(lobby.lobby_id).await.is_none());
    assert_eq!(service.match_for(lobby.lobby_id).await, None);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_list_paginates_in_creation_order() {
    let service = LobbyService::new(LobbyConfig::default());
    for i in 0..5 {
        service
            .create(format!("lobby-{i}"), format!("host-{i}"))
            .await;
    }

    let page = service.list(0, 2).await;
    assert_eq!(page.count, 5);
    assert_eq!(page.results.len(), 2);
    assert_eq!(page.results[0].name, "lobby-0");
    assert_eq!(page.results[1].name, "lobby-1");

    let tail = service.list(4, 10).await;
    assert_eq!(tail.count, 5);
    assert_eq!(tail.results.len(), 1);
    assert_eq!(tail.results[0].name, "lobby-4");
}

#[tokio::test(flavor = "multi_thread")]
async fn test_list_clamps_page_size_and_hides_joined() {
    let mut config = LobbyConfig::default();
    config.max_page_size = 2;
    let service = LobbyService::new(config);

    let first = service.create("one".into(), "a".into()).await;
    service.create("two".into(), "b".into()).await;
    service.create("three".into(), "c".into()).await;

    let page = service.list(0, 100).await;
    assert_eq!(page.count, 3);
    assert_eq!(page.results.len(), 2, "limit clamped to the configured cap");

    service.join(first.lobby_id, "d".into()).await.unwrap();
    let page = service.list(0, 100).await;
    // a paired lobby is no longer open
    assert_eq!(page.count, 2);
    assert!(page.results.iter().all(|l| l.lobby_id != first.lobby_id));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_concurrent_joins_single_winner() {
    let service = Arc::new(LobbyService::new(LobbyConfig::default()));
    let lobby = service.create("contested".into(), "alice".into()).await;

    let mut tasks = Vec::new();
    for i in 0..8 {
        let service = service.clone();
        let lobby_id = lobby.lobby_id;
        tasks.push(tokio::spawn(async move {
            service.join(lobby_id, format!("challenger-{i}")).await
        }));
    }

    let mut wins = 0;
    let mut fulls = 0;
    for task in tasks {
        match task.await.unwrap() {
            Ok(_) => wins += 1,
            Err(LobbyError::LobbyFull) => fulls += 1,
            Err(other) => panic!("unexpected join failure: {other}"),
        }
    }
    assert_eq!(wins, 1);
    assert_eq!(fulls, 7);

    // exactly one session came out of the stampede
    assert!(service.match_for(lobby.lobby_id).await.is_some());
}

#[tokio::test(flavor = "multi_thread")]
async fn test_pending_lobby_expires_then_vanishes() {
    let service = LobbyService::new(quick_expiry_config(50));
    let lobby = service.create("sleepy".into(), "alice".into()).await;

    tokio::time::sleep(Duration::from_millis(80)).await;
    let err = service.join(lobby.lobby_id, "bob".into()).await.unwrap_err();
    assert_eq!(err, LobbyError::Expired);
    assert_eq!(service.list(0, 10).await.count, 0);

    // a further timeout later the record is reclaimed entirely
    tokio::time::sleep(Duration::from_millis(80)).await;
    let err = service.join(lobby.lobby_id, "bob".into()).await.unwrap_err();
    assert_eq!(err, LobbyError::NotFound);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_paired_lobby_never_expires() {
    let service = LobbyService::new(quick_expiry_config(50));
    let lobby = service.create("durable".into(), "alice".into()).await;
    service.join(lobby.lobby_id, "bob".into()).await.unwrap();

    tokio::time::sleep(Duration::from_millis(120)).await;
    // reaping runs on the next write operation
    service.create("other".into(), "carol".into()).await;

    let kept = service.lobby(lobby.lobby_id).await.unwrap();
    assert_eq!(kept.player_two.as_deref(), Some("bob"));
    let session_id = service.match_for(lobby.lobby_id).await.unwrap();
    assert!(service.session(session_id).await.is_some());
}
