use super::*;
use crate::game::constants::{CLEANUP_PROTECTION_TIME_MS, DEAD_POINT_RADIUS};

fn make_world() -> World {
    World::with_rng(GameConfig::default(), StdRng::seed_from_u64(42))
}

fn make_world_with(config: GameConfig) -> World {
    World::with_rng(config, StdRng::seed_from_u64(42))
}

fn messages(effects: &[Effect]) -> Vec<(&Audience, &ServerMessage)> {
    effects
        .iter()
        .filter_map(|effect| match effect {
            Effect::Send { audience, message } => Some((audience, message)),
            Effect::ScheduleRespawn { .. } => None,
        })
        .collect()
}

fn event_names(effects: &[Effect]) -> Vec<&'static str> {
    messages(effects)
        .into_iter()
        .map(|(_, message)| message.event_name())
        .collect()
}

fn dead_point(x: f64, y: f64) -> DeadPoint {
    DeadPoint {
        x,
        y,
        radius: DEAD_POINT_RADIUS,
        color: "#ffffff".to_string(),
        created_at: 0,
    }
}

#[test]
fn world_starts_with_full_food_set() {
    let world = make_world();
    assert_eq!(world.foods().len(), GameConfig::default().food_count);
    for (index, food) in world.foods().iter().enumerate() {
        assert_eq!(food.id, index as u32);
        assert!(food.x >= 0.0 && food.x <= world.config().world_width);
        assert!(food.y >= 0.0 && food.y <= world.config().world_height);
    }
}

#[test]
fn connect_sends_init_first_with_starting_length() {
    let mut world = make_world();
    let (player_id, effects) = world.on_connect("s-1", "Alice".to_string());

    let sent = messages(&effects);
    let (audience, first) = sent[0];
    assert_eq!(audience, &Audience::Only("s-1".to_string()));
    match first {
        ServerMessage::GameInit {
            player_id: init_id,
            game_state,
        } => {
            assert_eq!(init_id, &player_id);
            let me = game_state
                .players
                .iter()
                .find(|player| player.id == player_id)
                .expect("own record in snapshot");
            assert_eq!(me.points.len(), 25);
            assert_eq!(me.name, "Alice");
            assert!(me.is_alive);
            assert_eq!(game_state.foods.len(), 200);
            assert_eq!(game_state.world_width, 2000.0);
            assert_eq!(game_state.world_height, 2000.0);
        }
        other => panic!("expected gameInit, got {other:?}"),
    }

    let (audience, joined) = sent[1];
    assert_eq!(audience, &Audience::AllExcept("s-1".to_string()));
    assert!(matches!(joined, ServerMessage::PlayerJoined(record) if record.id == player_id));
    assert_eq!(world.session_player("s-1"), Some(player_id.as_str()));
}

#[test]
fn first_human_triggers_bot_batch_only_once() {
    let mut world = make_world();
    let (_, effects) = world.on_connect("s-1", "A".to_string());
    let batch = GameConfig::default().bot_spawn_batch;
    assert_eq!(world.bot_count(), batch);
    let joined_bots = messages(&effects)
        .into_iter()
        .filter(|(_, message)| matches!(message, ServerMessage::PlayerJoined(record) if record.is_bot))
        .count();
    assert_eq!(joined_bots, batch);

    world.on_connect("s-2", "B".to_string());
    assert_eq!(world.bot_count(), batch);
    assert_eq!(world.human_count(), 2);
}

#[test]
fn connect_then_eat_food_seven() {
    let mut world = make_world();
    let (player_id, _) = world.on_connect("s-1", "A".to_string());
    let before = world
        .foods()
        .iter()
        .find(|food| food.id == 7)
        .cloned()
        .expect("food 7");

    let effects = world.on_food_eaten(&player_id, 7);
    assert_eq!(
        event_names(&effects),
        vec!["foodRegenerated", "scoreUpdate", "leaderboardUpdate"]
    );
    let sent = messages(&effects);
    assert!(sent.iter().all(|(audience, _)| **audience == Audience::All));
    match sent[0].1 {
        ServerMessage::FoodRegenerated(food) => {
            assert_eq!(food.id, 7);
            assert!(food.x != before.x || food.y != before.y);
        }
        other => panic!("unexpected {other:?}"),
    }
    match sent[1].1 {
        ServerMessage::ScoreUpdate { player_id: id, score } => {
            assert_eq!(id, &player_id);
            assert_eq!(*score, 1);
        }
        other => panic!("unexpected {other:?}"),
    }
}

#[test]
fn eaten_food_keeps_id_and_count() {
    let mut world = make_world();
    let (player_id, _) = world.on_connect("s-1", "A".to_string());
    let count = world.foods().len();
    for food_id in [0u32, 7, 7, 199] {
        world.on_food_eaten(&player_id, food_id);
        assert_eq!(world.foods().len(), count);
        assert_eq!(world.foods().iter().filter(|food| food.id == food_id).count(), 1);
    }
    assert_eq!(world.player(&player_id).map(|player| player.score), Some(4));
}

#[test]
fn unknown_ids_are_silently_ignored() {
    let mut world = make_world();
    let (player_id, _) = world.on_connect("s-1", "A".to_string());
    assert!(world.on_food_eaten("ghost", 7).is_empty());
    assert!(world.on_food_eaten(&player_id, 9_999).is_empty());
    assert!(world
        .on_player_move("s-1", "ghost", 1.0, 1.0, 0.0, VecDeque::new())
        .is_empty());
    assert!(world.on_player_died("ghost", Vec::new(), 0).is_empty());
    assert!(world.on_dead_point_eaten("ghost", &[dead_point(1.0, 1.0)]).is_empty());
    assert!(world.on_disconnect("s-unknown").is_empty());
    assert!(world.respawn("ghost").is_empty());
}

#[test]
fn player_move_is_stored_verbatim_and_relayed_to_others() {
    let mut world = make_world();
    let (player_id, _) = world.on_connect("s-1", "A".to_string());
    let points: VecDeque<Point> = (0..4)
        .map(|index| Point {
            x: 300.0 - index as f64 * 2.0,
            y: 400.0,
            radius: 5.0,
            color: "#abcdef".to_string(),
        })
        .collect();

    let effects = world.on_player_move("s-1", &player_id, 300.0, 400.0, 10.0, points.clone());
    let sent = messages(&effects);
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].0, &Audience::AllExcept("s-1".to_string()));
    assert!(matches!(
        sent[0].1,
        ServerMessage::PlayerMoved { player_id: id, x, y, .. } if id == &player_id && *x == 300.0 && *y == 400.0
    ));

    let stored = world.player(&player_id).expect("player");
    assert_eq!(stored.points, points);
    assert_eq!(stored.angle, 10.0);
}

#[test]
fn dead_player_move_is_dropped() {
    let mut world = make_world();
    let (player_id, _) = world.on_connect("s-1", "A".to_string());
    world.on_player_died(&player_id, Vec::new(), 0);
    let effects = world.on_player_move("s-1", &player_id, 1.0, 1.0, 0.0, VecDeque::new());
    assert!(effects.is_empty());
}

#[test]
fn human_death_records_points_and_schedules_respawn() {
    let mut world = make_world();
    let (player_id, _) = world.on_connect("s-1", "A".to_string());
    let submitted = vec![dead_point(10.0, 10.0), dead_point(12.0, 10.0)];

    let effects = world.on_player_died(&player_id, submitted, 5_000);
    assert_eq!(world.dead_points().len(), 2);
    assert!(world.dead_points().iter().all(|point| point.created_at == 5_000));
    assert!(!world.player(&player_id).expect("player").is_alive);
    assert!(world.player(&player_id).expect("player").points.is_empty());

    assert_eq!(event_names(&effects), vec!["playerDied"]);
    assert!(effects.iter().any(|effect| matches!(
        effect,
        Effect::ScheduleRespawn { player_id: id, delay } if id == &player_id && *delay == Duration::from_secs(3)
    )));

    // A second report for the same death is a no-op.
    assert!(world.on_player_died(&player_id, vec![dead_point(1.0, 1.0)], 6_000).is_empty());
    assert_eq!(world.dead_points().len(), 2);
}

#[test]
fn death_without_submitted_points_drops_the_body() {
    let mut world = make_world();
    let (player_id, _) = world.on_connect("s-1", "A".to_string());
    world.on_player_died(&player_id, Vec::new(), 0);
    assert_eq!(world.dead_points().len(), 25);
}

#[test]
fn respawn_restores_fresh_snake() {
    let mut world = make_world();
    let (player_id, _) = world.on_connect("s-1", "A".to_string());
    world.on_food_eaten(&player_id, 1);
    world.on_player_died(&player_id, Vec::new(), 0);

    let effects = world.respawn(&player_id);
    assert_eq!(event_names(&effects), vec!["playerRespawned"]);
    let player = world.player(&player_id).expect("player");
    assert!(player.is_alive);
    assert_eq!(player.len(), 25);
    assert_eq!(player.score, 0);
    assert_eq!(player.name, "A");

    // Respawning a live player does nothing.
    assert!(world.respawn(&player_id).is_empty());
}

#[test]
fn respawn_after_disconnect_is_cancelled() {
    let mut world = make_world();
    let (player_id, _) = world.on_connect("s-1", "A".to_string());
    world.on_player_died(&player_id, Vec::new(), 0);
    let effects = world.on_disconnect("s-1");
    assert_eq!(effects, vec![Effect::broadcast(ServerMessage::PlayerDisconnected(player_id.clone()))]);
    assert!(world.respawn(&player_id).is_empty());
    assert!(world.player(&player_id).is_none());
}

#[test]
fn bot_death_removes_bot_permanently() {
    let mut world = make_world();
    world.on_connect("s-1", "A".to_string());
    let bot_id = world
        .players()
        .values()
        .find(|player| player.is_bot)
        .map(|bot| bot.id.clone())
        .expect("bot");
    let bots_before = world.bot_count();

    let effects = world.on_player_died(&bot_id, Vec::new(), 0);
    assert_eq!(
        event_names(&effects),
        vec!["playerDied", "playerDisconnected", "leaderboardUpdate"]
    );
    assert!(!effects
        .iter()
        .any(|effect| matches!(effect, Effect::ScheduleRespawn { .. })));
    assert!(world.player(&bot_id).is_none());
    assert_eq!(world.bot_count(), bots_before - 1);
}

#[test]
fn human_disconnect_leaves_bots_alone() {
    let mut world = make_world();
    world.on_connect("s-1", "A".to_string());
    let bots = world.bot_count();
    world.on_disconnect("s-1");
    assert_eq!(world.human_count(), 0);
    assert_eq!(world.bot_count(), bots);
}

#[test]
fn bot_spawns_never_exceed_cap() {
    let mut world = make_world();
    let max_bots = world.config().max_bots;
    for _ in 0..10 {
        world.spawn_bots(4);
        assert!(world.bot_count() <= max_bots);
    }
    assert_eq!(world.bot_count(), max_bots);
    assert!(world.spawn_bots(3).is_empty());
}

#[test]
fn batch_spawn_is_capped_by_remaining_capacity() {
    let mut world = make_world();
    let max_bots = world.config().max_bots;
    world.spawn_bots(max_bots - 2);
    assert_eq!(world.bot_count(), max_bots - 2);

    let effects = world.spawn_bots(5);
    assert_eq!(effects.len(), 2);
    assert_eq!(world.bot_count(), max_bots);
}

#[test]
fn minimum_players_tops_up_with_bots() {
    let mut world = make_world_with(GameConfig {
        max_bots: 10,
        ..GameConfig::default()
    });
    world.on_connect("s-1", "A".to_string());
    let total = world.players().len();

    assert!(world.ensure_minimum_players(total).is_empty());
    world.ensure_minimum_players(total + 3);
    assert_eq!(world.players().len(), total + 3);

    world.ensure_minimum_players(100);
    assert_eq!(world.bot_count(), 10);
}

#[test]
fn tick_moves_bots_and_broadcasts_each() {
    let mut world = make_world();
    world.spawn_bots(3);
    let before: HashMap<String, (f64, f64)> = world
        .players()
        .values()
        .map(|bot| (bot.id.clone(), bot.position()))
        .collect();

    let effects = world.tick(100.0);
    assert_eq!(event_names(&effects), vec!["playerMoved"; 3]);
    for bot in world.players().values() {
        assert_ne!(before[&bot.id], bot.position());
        assert_eq!(bot.len(), world.config().starting_length);
    }
}

#[test]
fn tick_ignores_humans() {
    let mut world = make_world_with(GameConfig {
        bot_spawn_batch: 0,
        ..GameConfig::default()
    });
    let (player_id, _) = world.on_connect("s-1", "A".to_string());
    let before = world.player(&player_id).expect("player").position();
    assert!(world.tick(100.0).is_empty());
    assert_eq!(world.player(&player_id).expect("player").position(), before);
}

#[test]
fn dead_point_consumption_removes_and_broadcasts() {
    let mut world = make_world();
    let (player_id, _) = world.on_connect("s-1", "A".to_string());
    world.on_player_died(
        &player_id,
        vec![dead_point(1.0, 1.0), dead_point(2.0, 2.0), dead_point(3.0, 3.0)],
        0,
    );
    let (eater, _) = world.on_connect("s-2", "B".to_string());

    let effects = world.on_dead_point_eaten(&eater, &[dead_point(2.0, 2.0), dead_point(9.0, 9.0)]);
    assert_eq!(world.dead_points().len(), 2);
    match messages(&effects)[0].1 {
        ServerMessage::DeadPointsRemoved { dead_points } => {
            assert_eq!(dead_points.len(), 1);
            assert_eq!((dead_points[0].x, dead_points[0].y), (2.0, 2.0));
        }
        other => panic!("unexpected {other:?}"),
    }
    assert!(world.on_dead_point_eaten(&eater, &[dead_point(2.0, 2.0)]).is_empty());
}

#[test]
fn dead_points_keep_newest_slice_past_cap() {
    let mut world = make_world_with(GameConfig {
        max_dead_points: 5,
        bot_spawn_batch: 0,
        ..GameConfig::default()
    });
    let (first, _) = world.on_connect("s-1", "A".to_string());
    let (second, _) = world.on_connect("s-2", "B".to_string());
    world.on_player_died(&first, (0..4).map(|i| dead_point(i as f64, 0.0)).collect(), 0);
    world.on_player_died(&second, (10..14).map(|i| dead_point(i as f64, 0.0)).collect(), 1);

    let xs: Vec<f64> = world.dead_points().iter().map(|point| point.x).collect();
    assert_eq!(xs, vec![3.0, 10.0, 11.0, 12.0, 13.0]);
}

#[test]
fn server_stamps_dead_points_for_age_gate() {
    let mut world = make_world();
    let (player_id, _) = world.on_connect("s-1", "A".to_string());
    let mut forged = dead_point(5.0, 5.0);
    forged.created_at = -1_000_000;
    world.on_player_died(&player_id, vec![forged], 50_000);
    let stored = &world.dead_points()[0];
    assert!(!stored.is_old_enough_to_consume(50_000));
    assert!(stored.is_old_enough_to_consume(50_000 + CLEANUP_PROTECTION_TIME_MS));
}

#[test]
fn stats_and_leaderboard_broadcasts() {
    let mut world = make_world();
    let (player_id, _) = world.on_connect("s-1", "A".to_string());
    world.on_food_eaten(&player_id, 3);
    world.on_food_eaten(&player_id, 4);

    let effects = world.periodic_stats();
    match messages(&effects)[0].1 {
        ServerMessage::GameStats {
            player_count,
            food_count,
            leaderboard,
        } => {
            assert_eq!(*player_count, world.players().len());
            assert_eq!(*food_count, 200);
            let leaderboard = leaderboard.as_ref().expect("leaderboard");
            assert_eq!(leaderboard[0].id, player_id);
            assert_eq!(leaderboard[0].score, 2);
            assert_eq!(leaderboard[0].rank, 1);
        }
        other => panic!("unexpected {other:?}"),
    }

    let effects = world.leaderboard_update();
    match messages(&effects)[0].1 {
        ServerMessage::LeaderboardUpdate {
            leaderboard,
            full_leaderboard,
        } => {
            assert!(leaderboard.len() <= world.config().leaderboard_size);
            assert_eq!(full_leaderboard.as_ref().map(Vec::len), Some(world.players().len()));
        }
        other => panic!("unexpected {other:?}"),
    }
}

#[test]
fn client_messages_dispatch_to_handlers() {
    let mut world = make_world_with(GameConfig {
        bot_spawn_batch: 0,
        ..GameConfig::default()
    });
    let (player_id, _) = world.on_connect("s-1", "A".to_string());

    let effects = world.handle_client_message(
        "s-1",
        ClientMessage::FoodEaten {
            player_id: player_id.clone(),
            food_id: 7,
        },
        0,
    );
    assert_eq!(event_names(&effects)[0], "foodRegenerated");

    let effects = world.handle_client_message("s-1", ClientMessage::RequestMinimumPlayers { min_players: 4 }, 0);
    assert_eq!(effects.len(), 3);
    assert_eq!(world.players().len(), 4);
}
