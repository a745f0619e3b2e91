use star_catcher::arcade::ArcadeWorld;
use star_catcher::collision::hit_bomb;
use star_catcher::compute::*;
use star_catcher::config::GameConfig;
use star_catcher::engine::{ActorHandle, Engine, TINT_RED};
use star_catcher::entities::*;
use star_catcher::spawn::{spawn_bombs, spawn_star};

use glam::Vec2;
use rand::rngs::StdRng;
use rand::SeedableRng;

fn setup() -> (ArcadeWorld, Game) {
    let mut world = ArcadeWorld::new(800.0, 600.0);
    let game = init_game(GameConfig::default(), &mut world).unwrap();
    (world, game)
}

fn seeded_rng() -> StdRng {
    StdRng::seed_from_u64(42)
}

/// Drop exactly one bomb into the pool and return its handle.
fn drop_bomb(game: &mut Game, world: &mut ArcadeWorld, rng: &mut StdRng) -> ActorHandle {
    let saved = (game.session.score, game.timers.bomb);
    game.session.score = 60;
    game.timers.bomb = game.config.bomb_spawn_min_interval;
    spawn_bombs(game, world, rng, 0.0);
    (game.session.score, game.timers.bomb) = saved;
    game.pools.bombs.actors.last().unwrap().handle
}

// ── init_game ─────────────────────────────────────────────────────────────────

#[test]
fn init_game_starts_playing_with_full_lives() {
    let (world, game) = setup();
    assert_eq!(game.session.score, 0);
    assert_eq!(game.session.lives, 5);
    assert_eq!(game.session.max_lives, 5);
    assert_eq!(game.session.status, GameStatus::Playing);
    assert!(!game.session.is_invincible());
    assert_eq!(game.pools.total(), 0);
    assert_eq!(world.text(game.hud.score.unwrap()), Some("SCORE: 0"));
    assert_eq!(world.text(game.hud.lives.unwrap()), Some("LIVES: 5"));
}

#[test]
fn init_game_places_player_and_arms_star_clock() {
    let (world, game) = setup();
    assert_eq!(world.position(game.player), Some(Vec2::new(100.0, 450.0)));
    assert_eq!(game.timers.star, game.config.star_spawn_min_interval);
    assert_eq!(game.timers.bomb, 0.0);
}

#[test]
fn init_game_rejects_invalid_config() {
    let mut world = ArcadeWorld::new(800.0, 600.0);
    let config = GameConfig { max_star_count: 0, ..GameConfig::default() };
    assert!(init_game(config, &mut world).is_err());
}

// ── tick ──────────────────────────────────────────────────────────────────────

#[test]
fn first_tick_drops_a_star_batch() {
    let (mut world, mut game) = setup();
    let mut rng = seeded_rng();
    tick(&mut game, &mut world, &mut rng, PlayerInput::default(), 16.0);
    let n = game.pools.stars.len();
    assert!((1..=5).contains(&n), "batch of {n}");
    assert_eq!(game.timers.star, 0.0);
}

#[test]
fn tick_without_points_never_drops_bombs() {
    let (mut world, mut game) = setup();
    let mut rng = seeded_rng();
    for _ in 0..100 {
        tick(&mut game, &mut world, &mut rng, PlayerInput::default(), 100.0);
    }
    assert!(game.pools.bombs.is_empty());
    assert!(game.pools.hearts.is_empty());
    // the bomb clock keeps counting while the score gate is shut
    assert_eq!(game.timers.bomb, 10_000.0);
}

#[test]
fn tick_after_game_over_changes_nothing() {
    let (mut world, mut game) = setup();
    let mut rng = seeded_rng();
    tick(&mut game, &mut world, &mut rng, PlayerInput::default(), 16.0);
    let bomb = drop_bomb(&mut game, &mut world, &mut rng);
    game.session.lives = 1;
    hit_bomb(&mut game, &mut world, bomb);
    assert!(game.session.is_game_over());

    let pools = game.pools.clone();
    let session = game.session.clone();
    let timers = game.timers;
    let input = PlayerInput { left: true, ..Default::default() };
    for _ in 0..50 {
        tick(&mut game, &mut world, &mut rng, input, 500.0);
    }
    assert_eq!(game.pools, pools);
    assert_eq!(game.session, session);
    assert_eq!(game.timers, timers);
}

// ── Bomb hits & game over ─────────────────────────────────────────────────────

#[test]
fn survivable_hit_costs_a_life_and_grants_invincibility() {
    let (mut world, mut game) = setup();
    let mut rng = seeded_rng();
    let bomb = drop_bomb(&mut game, &mut world, &mut rng);

    hit_bomb(&mut game, &mut world, bomb);

    assert_eq!(game.session.lives, 4);
    assert_eq!(game.session.invincibility.remaining, 1000.0);
    assert_eq!(game.session.status, GameStatus::Playing);
    assert!(game.pools.bombs.is_empty());
    assert_eq!(world.text(game.hud.lives.unwrap()), Some("LIVES: 4"));
}

#[test]
fn fatal_hit_ends_the_game_without_taking_the_last_life() {
    let (mut world, mut game) = setup();
    let mut rng = seeded_rng();
    let bomb = drop_bomb(&mut game, &mut world, &mut rng);
    game.session.lives = 1;
    game.session.score = 70;

    hit_bomb(&mut game, &mut world, bomb);

    assert!(game.session.is_game_over());
    assert_eq!(game.session.lives, 1);
    assert_eq!(world.tint(game.player), TINT_RED);
    assert!(world.is_paused());
    assert!(game.hud.score.is_none() && game.hud.lives.is_none());
    let texts: Vec<&str> = game.hud.game_over.iter().filter_map(|t| world.text(*t)).collect();
    assert_eq!(texts, vec!["GAME OVER", "FINAL SCORE:70"]);
}

#[test]
fn game_over_fires_once() {
    let (mut world, mut game) = setup();
    game_over(&mut game, &mut world);
    let first = game.hud.game_over.clone();
    game_over(&mut game, &mut world);
    assert_eq!(game.hud.game_over, first);
    assert_eq!(world.texts().count(), 2);
}

// ── Invincibility ─────────────────────────────────────────────────────────────

#[test]
fn invincible_player_blinks_then_recovers() {
    let (mut world, mut game) = setup();
    start_invincibility(&mut game);

    decay_invincibility(&mut game, &mut world, 150.0);
    assert_eq!(game.session.invincibility.remaining, 850.0);
    assert!(game.session.invincibility.dimmed);
    assert_eq!(game.session.invincibility.blink_timer, 0.0);
    assert_eq!(world.body(game.player).unwrap().alpha, 0.25);

    decay_invincibility(&mut game, &mut world, 150.0);
    assert!(!game.session.invincibility.dimmed);
    assert_eq!(world.body(game.player).unwrap().alpha, 1.0);

    decay_invincibility(&mut game, &mut world, 900.0);
    assert_eq!(game.session.invincibility, Invincibility::default());
    assert_eq!(world.body(game.player).unwrap().alpha, 1.0);
}

#[test]
fn no_blinking_outside_the_window() {
    let (mut world, mut game) = setup();
    for _ in 0..10 {
        decay_invincibility(&mut game, &mut world, 500.0);
        assert_eq!(game.session.invincibility, Invincibility::default());
        assert_eq!(world.body(game.player).unwrap().alpha, 1.0);
    }
}

#[test]
fn short_steps_inside_blink_period_keep_visibility() {
    let (mut world, mut game) = setup();
    start_invincibility(&mut game);
    decay_invincibility(&mut game, &mut world, 50.0);
    decay_invincibility(&mut game, &mut world, 50.0);
    assert!(!game.session.invincibility.dimmed);
    assert_eq!(game.session.invincibility.blink_timer, 100.0);
}

// ── Player control ────────────────────────────────────────────────────────────

#[test]
fn player_runs_left_right_and_stops() {
    let (mut world, mut game) = setup();

    control_player(&mut game, &mut world, PlayerInput { left: true, ..Default::default() });
    assert_eq!(world.velocity(game.player).unwrap().x, -160.0);

    control_player(&mut game, &mut world, PlayerInput { right: true, ..Default::default() });
    assert_eq!(world.velocity(game.player).unwrap().x, 160.0);

    control_player(&mut game, &mut world, PlayerInput::default());
    assert_eq!(world.velocity(game.player).unwrap().x, 0.0);
}

#[test]
fn player_jumps_only_from_the_ground() {
    let (mut world, mut game) = setup();

    // mid-air at spawn
    control_player(&mut game, &mut world, PlayerInput { jump: true, ..Default::default() });
    assert_ne!(world.velocity(game.player).unwrap().y, -500.0);

    for _ in 0..60 {
        world.step(16.0);
    }
    assert!(world.is_touching_down(game.player));
    control_player(&mut game, &mut world, PlayerInput { jump: true, ..Default::default() });
    assert_eq!(world.velocity(game.player).unwrap().y, -500.0);
}

// ── Lives & scenario ──────────────────────────────────────────────────────────

#[test]
fn change_lives_updates_the_display() {
    let (mut world, mut game) = setup();
    change_lives(&mut game, &mut world, -2);
    assert_eq!(game.session.lives, 3);
    assert_eq!(world.text(game.hud.lives.unwrap()), Some("LIVES: 3"));
    change_lives(&mut game, &mut world, 1);
    assert_eq!(world.text(game.hud.lives.unwrap()), Some("LIVES: 4"));
}

#[test]
fn collecting_three_stars_scores_thirty() {
    let mut world = ArcadeWorld::new(800.0, 600.0);
    let config = GameConfig { max_lives: 3, ..GameConfig::default() };
    let mut game = init_game(config, &mut world).unwrap();
    let mut rng = seeded_rng();

    for i in 0..3 {
        let pos = Vec2::new(100.0 + 50.0 * i as f32, 10.0);
        let star = spawn_star(&mut game, &mut world, &mut rng, pos);
        star_catcher::collision::collect_star(&mut game, &mut world, star);
    }

    assert_eq!(game.session.score, 30);
    assert_eq!(game.session.lives, 3);
    assert!(!game.session.is_game_over());
    assert_eq!(world.text(game.hud.score.unwrap()), Some("SCORE: 30"));
}
