/// Integration tests for table actors and the table manager
use std::time::Duration;

use poker_table::{
    Command, TableError, TableEvent,
    entities::{DisplayName, Phase, PlayerId},
    table::{BotDifficulty, TableActor, TableConfig, TableManager},
};
use tokio::time::timeout;

fn id(s: &str) -> PlayerId {
    PlayerId::new(s)
}

fn join(player: &str) -> Command {
    Command::Join {
        player_id: id(player),
        name: DisplayName::new(player),
        as_spectator: false,
    }
}

fn seeded() -> TableConfig {
    TableConfig {
        seed: Some(17),
        ..TableConfig::default()
    }
}

#[tokio::test]
async fn test_actor_runs_scenario_over_channels() {
    let (actor, handle) = TableActor::new(1, seeded());
    tokio::spawn(actor.run());

    for player in ["p1", "p2", "p3"] {
        handle.command(join(player)).await.unwrap();
    }
    let snapshot = handle.command(Command::StartHand).await.unwrap();
    assert_eq!(snapshot.pot, 150);
    assert_eq!(snapshot.current_bet, 100);
    // StartHand has no player, so nobody's cards are shown.
    assert!(snapshot.players.iter().all(|p| p.cards.is_empty()));

    let snapshot = handle.command(Command::Call(id("p3"))).await.unwrap();
    assert_eq!(snapshot.pot, 250);
    assert_eq!(snapshot.player(&id("p3")).unwrap().cards.len(), 2);
    assert!(snapshot.player(&id("p1")).unwrap().cards.is_empty());

    handle.command(Command::Fold(id("p1"))).await.unwrap();
    let snapshot = handle.command(Command::Call(id("p2"))).await.unwrap();
    assert_eq!(snapshot.phase, Phase::Flop);
    assert_eq!(snapshot.board.len(), 3);

    assert_eq!(
        handle.command(Command::Call(id("p3"))).await,
        Err(TableError::NotYourTurn)
    );
    handle.close().await.unwrap();
}

#[tokio::test]
async fn test_subscriber_receives_events() {
    let (actor, handle) = TableActor::new(1, seeded());
    tokio::spawn(actor.run());

    let mut updates = handle.subscribe(id("alice"), 16).await.unwrap();
    handle.command(join("alice")).await.unwrap();

    let update = timeout(Duration::from_secs(1), updates.recv())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(update.table_id, 1);
    assert_eq!(update.snapshot.players.len(), 1);
    assert_eq!(
        update.events,
        vec![TableEvent::Joined(id("alice")), TableEvent::Seated(id("alice"))]
    );

    handle.unsubscribe(id("alice")).await.unwrap();
    handle.command(join("bob")).await.unwrap();
    handle.close().await.unwrap();
    assert!(
        timeout(Duration::from_secs(1), updates.recv())
            .await
            .unwrap()
            .is_none()
    );
}

#[tokio::test]
async fn test_bot_table_plays_itself() {
    let config = TableConfig {
        auto_start: true,
        ..seeded()
    };
    let (actor, handle) = TableActor::new(1, config);
    tokio::spawn(actor.with_tick_interval(Duration::from_millis(1)).run());

    for i in 0..4 {
        handle
            .add_bot(
                id(&format!("bot{i}")),
                DisplayName::new("bot"),
                Some(BotDifficulty::Standard),
            )
            .await
            .unwrap();
    }

    let played = timeout(Duration::from_secs(10), async {
        loop {
            let snapshot = handle.snapshot(None).await.unwrap();
            if snapshot.hand_number >= 3 {
                return snapshot;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .unwrap();

    let chips: u32 = played.players.iter().map(|p| p.chips).sum::<u32>()
        + played.spectators.iter().map(|u| u.chips).sum::<u32>()
        + played.pot;
    assert_eq!(chips, 4 * 10_000);

    assert_eq!(
        handle
            .add_bot(id("bot0"), DisplayName::new("bot"), None)
            .await,
        Err(TableError::UserAlreadyExists)
    );
    handle.close().await.unwrap();
}

#[tokio::test]
async fn test_manager_lifecycle() {
    let manager = TableManager::new(TableConfig::casual()).unwrap();

    // Joining an unknown table creates it.
    manager
        .join_table(42, id("alice"), DisplayName::new("alice"), false)
        .await
        .unwrap();
    manager
        .join_table(42, id("bob"), DisplayName::new("bob"), false)
        .await
        .unwrap();
    let tables = manager.list_tables().await;
    assert_eq!(tables.len(), 1);
    assert_eq!(tables[0].id, 42);
    assert_eq!(tables[0].player_count, 2);
    assert_eq!(tables[0].small_blind, 10);

    manager.send_command(42, Command::StartHand).await.unwrap();

    // Leaving mid-hand ends the heads-up hand; bob is left alone.
    manager
        .send_command(42, Command::Leave(id("alice")))
        .await
        .unwrap();
    let snapshot = manager.get_table_state(42, Some(id("bob"))).await.unwrap();
    assert_eq!(snapshot.phase, Phase::Waiting);
    assert_eq!(snapshot.players.len(), 1);
    assert_eq!(snapshot.players[0].chips, 1_010);
    assert_eq!(manager.active_table_count().await, 1);

    // The last leave destroys the table.
    manager
        .send_command(42, Command::Leave(id("bob")))
        .await
        .unwrap();
    assert_eq!(manager.active_table_count().await, 0);
    assert!(manager.list_tables().await.is_empty());
    assert_eq!(
        manager.send_command(42, Command::StartHand).await,
        Err(TableError::TableNotFound)
    );
}

#[tokio::test]
async fn test_tables_are_independent() {
    let manager = TableManager::new(TableConfig::default()).unwrap();
    let first = manager.create_table(seeded()).await.unwrap();
    let second = manager.create_table(seeded()).await.unwrap();

    manager
        .join_table(first, id("alice"), DisplayName::new("alice"), false)
        .await
        .unwrap();
    manager
        .join_table(second, id("alice"), DisplayName::new("alice"), false)
        .await
        .unwrap();
    manager
        .join_table(first, id("bob"), DisplayName::new("bob"), false)
        .await
        .unwrap();

    manager.send_command(first, Command::StartHand).await.unwrap();
    assert_eq!(
        manager.send_command(second, Command::StartHand).await,
        Err(TableError::NotEnoughPlayers)
    );

    let tables = manager.list_tables().await;
    assert_eq!(tables[0].phase, Phase::Preflop);
    assert_eq!(tables[1].phase, Phase::Waiting);
}
