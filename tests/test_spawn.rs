use star_catcher::arcade::ArcadeWorld;
use star_catcher::compute::init_game;
use star_catcher::config::{GameConfig, HEART_MARGIN};
use star_catcher::engine::{Engine, SpriteKey, TINT_NONE, TINT_RED};
use star_catcher::entities::*;
use star_catcher::policy::{bomb_trail, heart_trail, star_trail};
use star_catcher::spawn::*;

use glam::Vec2;
use rand::rngs::StdRng;
use rand::SeedableRng;

fn setup() -> (ArcadeWorld, Game) {
    let mut world = ArcadeWorld::new(800.0, 600.0).recording();
    let game = init_game(GameConfig::default(), &mut world).unwrap();
    (world, game)
}

fn seeded_rng() -> StdRng {
    StdRng::seed_from_u64(42)
}

/// Arm the bomb clock so the next `spawn_bombs` call fires.
fn arm_bombs(game: &mut Game, score: u32) {
    game.session.score = score;
    game.timers.bomb = game.config.bomb_spawn_min_interval;
}

// ── Layout helpers ────────────────────────────────────────────────────────────

#[test]
fn star_batch_is_evenly_spaced_left_to_right() {
    for count in [1.0_f32, 1.5, 2.7, 4.2, 5.0] {
        let xs = star_batch_positions(count, 800.0);
        let step = (800.0 / (count + 1.0)).floor();

        assert_eq!(xs.len(), count.ceil() as usize, "count {count}");
        assert_eq!(xs[0], step);
        for pair in xs.windows(2) {
            assert_eq!(pair[1] - pair[0], step, "count {count}");
        }
        assert!(xs.iter().all(|&x| x > 0.0 && x < 800.0));
    }
}

#[test]
fn bomb_batch_grows_with_score() {
    assert_eq!(bomb_batch_len(51, 200), 1);
    assert_eq!(bomb_batch_len(199, 200), 1);
    assert_eq!(bomb_batch_len(200, 200), 2);
    assert_eq!(bomb_batch_len(450, 200), 3);
}

#[test]
fn bombs_drop_on_the_far_half() {
    assert_eq!(bomb_drop_range(100.0, 800.0), (400, 800));
    assert_eq!(bomb_drop_range(399.9, 800.0), (400, 800));
    assert_eq!(bomb_drop_range(400.0, 800.0), (0, 400));
    assert_eq!(bomb_drop_range(750.0, 800.0), (0, 400));
}

// ── Stars ─────────────────────────────────────────────────────────────────────

#[test]
fn star_clock_accumulates_below_interval() {
    let (mut world, mut game) = setup();
    let mut rng = seeded_rng();
    game.timers.star = 0.0;

    assert_eq!(spawn_stars(&mut game, &mut world, &mut rng, 100.0), 0);
    assert_eq!(spawn_stars(&mut game, &mut world, &mut rng, 250.0), 0);
    assert_eq!(game.timers.star, 350.0);
    assert!(game.pools.stars.is_empty());
}

#[test]
fn every_star_batch_has_one_to_max_stars_in_order() {
    let (mut world, mut game) = setup();
    let mut rng = seeded_rng();

    for _ in 0..200 {
        game.timers.star = game.config.star_spawn_min_interval;
        let before = game.pools.stars.len();
        let n = spawn_stars(&mut game, &mut world, &mut rng, 0.0);

        assert!((1..=5).contains(&n), "batch of {n}");
        assert_eq!(game.pools.stars.len(), before + n);
        assert_eq!(game.timers.star, 0.0);

        let batch = &game.pools.stars.actors[before..];
        for pair in batch.windows(2) {
            assert!(pair[0].origin.x < pair[1].origin.x);
        }
        for star in batch {
            assert!((0.0..=30.0).contains(&star.origin.y));
        }
    }
}

#[test]
fn star_launch_and_lifespan_ranges() {
    let (mut world, mut game) = setup();
    let mut rng = seeded_rng();

    for i in 0..300 {
        spawn_star(&mut game, &mut world, &mut rng, Vec2::new(i as f32, 0.0));
    }
    for star in &game.pools.stars.actors {
        assert!((-200.0..=200.0).contains(&star.velocity.x));
        assert!((20.0..=40.0).contains(&star.velocity.y));
        assert_eq!(star.velocity.x.fract(), 0.0);
        assert!((4800.0..=7200.0).contains(&star.remaining_lifespan));
        assert_eq!(star.remaining_lifespan.fract(), 0.0);
        assert_eq!(world.velocity(star.handle), Some(star.velocity));
    }
}

#[test]
fn no_rare_stars_at_or_below_threshold() {
    let (mut world, mut game) = setup();
    let mut rng = seeded_rng();
    game.session.score = 100;

    for _ in 0..2000 {
        spawn_star(&mut game, &mut world, &mut rng, Vec2::new(400.0, 0.0));
    }
    for star in &game.pools.stars.actors {
        assert_eq!(star.points, 10);
        assert_eq!(star.tint, TINT_NONE);
        assert_eq!(world.tint(star.handle), TINT_NONE);
    }
}

#[test]
fn rare_stars_appear_above_threshold() {
    let (mut world, mut game) = setup();
    let mut rng = seeded_rng();
    game.session.score = 101;

    for _ in 0..2000 {
        spawn_star(&mut game, &mut world, &mut rng, Vec2::new(400.0, 0.0));
    }
    let rare: Vec<&Actor> = game.pools.stars.actors.iter().filter(|s| s.points == 100).collect();
    assert!((40..=200).contains(&rare.len()), "{} rare stars", rare.len());
    for star in &rare {
        assert_eq!(star.tint, TINT_RED);
        assert_eq!(world.tint(star.handle), TINT_RED);
    }
    assert!(game.pools.stars.actors.iter().all(|s| s.points == 10 || s.points == 100));
}

#[test]
fn spawned_actor_gets_exactly_one_trail() {
    let (mut world, mut game) = setup();
    let mut rng = seeded_rng();
    let star = spawn_star(&mut game, &mut world, &mut rng, Vec2::new(10.0, 10.0));

    let ledger = world.emitter_ledger(star);
    assert_eq!((ledger.attached, ledger.detached), (1, 0));
    assert_eq!(world.emitters_following(star), 1);
    assert!(game.pools.stars.get(star).unwrap().emitter.is_some());
    assert_eq!(world.body(star).unwrap().key, SpriteKey::Star);
}

#[test]
fn trails_match_the_kind_and_rarity() {
    let (mut world, mut game) = setup();
    let mut rng = seeded_rng();
    game.session.score = 1000;
    game.session.lives = 4;

    for i in 0..400 {
        spawn_star(&mut game, &mut world, &mut rng, Vec2::new(i as f32, 0.0));
    }
    for star in &game.pools.stars.actors {
        let rare = star.points == 100;
        assert_eq!(world.trail(star.handle), Some(&star_trail(rare)));
    }

    game.timers.bomb = game.config.bomb_spawn_min_interval;
    spawn_bombs(&mut game, &mut world, &mut rng, 0.0);
    for bomb in &game.pools.bombs.actors {
        assert_eq!(world.trail(bomb.handle), Some(&bomb_trail()));
        assert_eq!(bomb.tint, TINT_NONE);
    }

    while maybe_spawn_heart(&mut game, &mut world, &mut rng).is_none() {}
    let heart = &game.pools.hearts.actors[0];
    assert_eq!(world.trail(heart.handle), Some(&heart_trail()));
}

// ── Narrow windows ────────────────────────────────────────────────────────────

#[test]
fn narrowest_valid_window_still_spawns() {
    let config = GameConfig::from_json5("{ windowWidth: 40 }").unwrap();
    let mut world = ArcadeWorld::new(config.window_width, config.window_height);
    let mut game = init_game(config, &mut world).unwrap();
    let mut rng = seeded_rng();
    game.session.score = 1000;
    game.session.lives = 1;

    for _ in 0..200 {
        if let Some(heart) = maybe_spawn_heart(&mut game, &mut world, &mut rng) {
            assert_eq!(game.pools.hearts.get(heart).unwrap().origin.x, HEART_MARGIN);
        }
    }
    assert!(!game.pools.hearts.is_empty());

    for count in [1.0_f32, 2.5, 5.0] {
        let xs = star_batch_positions(count, 40.0);
        for pair in xs.windows(2) {
            assert!(pair[0] < pair[1], "count {count}: {xs:?}");
        }
    }
    for _ in 0..50 {
        game.timers.star = game.config.star_spawn_min_interval;
        let before = game.pools.stars.len();
        spawn_stars(&mut game, &mut world, &mut rng, 0.0);
        for pair in game.pools.stars.actors[before..].windows(2) {
            assert!(pair[0].origin.x < pair[1].origin.x);
        }
    }
}

// ── Bombs ─────────────────────────────────────────────────────────────────────

#[test]
fn bombs_wait_for_the_score_gate() {
    let (mut world, mut game) = setup();
    let mut rng = seeded_rng();
    arm_bombs(&mut game, 50);

    assert_eq!(spawn_bombs(&mut game, &mut world, &mut rng, 16.0), 0);
    assert!(game.pools.bombs.is_empty());
    // the clock is not reset while the gate is shut
    assert_eq!(game.timers.bomb, 4016.0);

    game.session.score = 51;
    assert_eq!(spawn_bombs(&mut game, &mut world, &mut rng, 16.0), 1);
    assert_eq!(game.timers.bomb, 0.0);
}

#[test]
fn bomb_batch_lands_away_from_player() {
    let (mut world, mut game) = setup();
    let mut rng = seeded_rng();
    arm_bombs(&mut game, 450);

    assert_eq!(spawn_bombs(&mut game, &mut world, &mut rng, 0.0), 3);
    for bomb in &game.pools.bombs.actors {
        assert!((400.0..=800.0).contains(&bomb.origin.x));
        assert_eq!(bomb.origin.y, 16.0);
        assert!((-200.0..=200.0).contains(&bomb.velocity.x));
        assert_eq!(bomb.velocity.y, 20.0);
        assert!(bomb.remaining_lifespan >= 3999.99 && bomb.remaining_lifespan <= 6000.01);
    }

    world.move_to(game.player, Vec2::new(600.0, 450.0));
    arm_bombs(&mut game, 450);
    spawn_bombs(&mut game, &mut world, &mut rng, 0.0);
    for bomb in &game.pools.bombs.actors[3..] {
        assert!((0.0..=400.0).contains(&bomb.origin.x));
    }
}

#[test]
fn bomb_clock_below_interval_never_drops_hearts() {
    let (mut world, mut game) = setup();
    let mut rng = seeded_rng();
    game.session.score = 1000;
    game.session.lives = 1;

    for _ in 0..500 {
        game.timers.bomb = 0.0;
        spawn_bombs(&mut game, &mut world, &mut rng, 10.0);
    }
    assert!(game.pools.bombs.is_empty());
    assert!(game.pools.hearts.is_empty());
}

// ── Hearts ────────────────────────────────────────────────────────────────────

#[test]
fn no_heart_while_lives_are_full() {
    let (mut world, mut game) = setup();
    let mut rng = seeded_rng();
    game.session.score = 1000;

    for _ in 0..500 {
        assert!(maybe_spawn_heart(&mut game, &mut world, &mut rng).is_none());
    }
    assert!(game.pools.hearts.is_empty());
}

#[test]
fn no_heart_at_low_score() {
    let (mut world, mut game) = setup();
    let mut rng = seeded_rng();
    game.session.score = 200;
    game.session.lives = 1;

    for _ in 0..500 {
        assert!(maybe_spawn_heart(&mut game, &mut world, &mut rng).is_none());
    }
}

#[test]
fn heart_can_drop_one_life_short_of_max() {
    let (mut world, mut game) = setup();
    let mut rng = seeded_rng();
    game.session.score = 1000;
    game.session.lives = 4;

    let dropped = (0..500)
        .filter_map(|_| maybe_spawn_heart(&mut game, &mut world, &mut rng))
        .count();
    assert!(dropped > 0);
    assert_eq!(game.pools.hearts.len(), dropped);

    for heart in &game.pools.hearts.actors {
        assert!((20.0..=780.0).contains(&heart.origin.x));
        assert_eq!(heart.origin.y, 0.0);
        assert_eq!(heart.remaining_lifespan, 12_000.0);
        assert_eq!(heart.points, 0);
    }
}
