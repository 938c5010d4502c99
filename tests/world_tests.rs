//! End-to-end tests driving a world and a Pong match through many ticks.

use glam::Vec2;
use newton_pong::consts::{GRAVITATIONAL_CONSTANT, SIM_DT, STANDARD_GRAVITY, VACUUM_PERMITTIVITY};
use newton_pong::pong::{GameEvent, PongConfig, PongGame, TickInput, tick};
use newton_pong::sim::{BodyDesc, EntityKind, PointSource, UniformGravity, Units, World};
use newton_pong::{SimError, WorldConfig};

fn running_world() -> World {
    let mut world = World::new("test", WorldConfig::default()).unwrap();
    world.unpause();
    world
}

#[test]
fn test_free_fall_matches_semi_implicit_euler() {
    let mut world = running_world();
    let scale = world.scale();
    world.add_field(UniformGravity::downward(scale, STANDARD_GRAVITY).unwrap());
    let id = world
        .spawn(BodyDesc::dynamic(EntityKind::Newtonian, 2.0, Vec2::ZERO))
        .unwrap();

    for _ in 0..100 {
        world.step(SIM_DT).unwrap();
    }

    let body = world.get(id).unwrap();
    // v_n = n·g·dt, x_n = g·dt²·n(n+1)/2
    assert!((body.velocity(Units::Si).y - 9.8).abs() < 1e-3);
    assert!((body.position(Units::Si).y - 9.8 * 1e-4 * 5050.0).abs() < 1e-2);
    assert_eq!(body.velocity(Units::Si).x, 0.0);
    assert!((world.elapsed() - 1.0).abs() < 1e-4);
}

#[test]
fn test_like_charges_repel() {
    let mut world = running_world();
    let a = world
        .spawn(BodyDesc::dynamic(EntityKind::Newtonian, 1.0, Vec2::ZERO).with_charge(1e-5))
        .unwrap();
    let b = world
        .spawn(
            BodyDesc::dynamic(EntityKind::Newtonian, 1.0, Vec2::new(1.0, 0.0)).with_charge(1e-5),
        )
        .unwrap();
    let field = PointSource::electric(world.get(a).unwrap(), VACUUM_PERMITTIVITY).unwrap();
    world.add_field(field);

    world.step(SIM_DT).unwrap();

    // F = q² / (4π ε0 r²) ≈ 0.899 N, one step of 0.01 s on 1 kg
    let v = world.get(b).unwrap().velocity(Units::Si);
    assert!((v.x - 0.00899).abs() < 1e-4);
    assert_eq!(world.get(a).unwrap().velocity(Units::Si), Vec2::ZERO);
}

#[test]
fn test_uncharged_source_is_rejected() {
    let mut world = running_world();
    let a = world
        .spawn(BodyDesc::dynamic(EntityKind::Newtonian, 1.0, Vec2::ZERO))
        .unwrap();
    let err = PointSource::electric(world.get(a).unwrap(), VACUUM_PERMITTIVITY).unwrap_err();
    assert!(matches!(err, SimError::MissingCharge { .. }));
}

#[test]
fn test_point_gravity_pulls_toward_source() {
    let mut world = running_world();
    let scale = world.scale();
    world.add_field(PointSource::gravity(scale, Vec2::ZERO, 1e12, GRAVITATIONAL_CONSTANT).unwrap());
    let id = world
        .spawn(BodyDesc::dynamic(EntityKind::Newtonian, 3.0, Vec2::new(10.0, 0.0)))
        .unwrap();

    world.step(SIM_DT).unwrap();

    // a = G·M / r² ≈ 0.6674 m/s², independent of the body's mass
    let v = world.get(id).unwrap().velocity(Units::Si);
    assert!((v.x + 0.006674).abs() < 1e-4);
    assert!(v.y.abs() < 1e-6);
}

#[test]
fn test_idle_match_keeps_ball_in_play() {
    let mut game = PongGame::new(PongConfig::default(), 2024).unwrap();
    let input = TickInput {
        idle_mode: true,
        ..Default::default()
    };
    let height = game.config.arena.y;
    let margin = game.config.ball_size;

    let mut scored = 0;
    let mut served = 0;
    for _ in 0..6000 {
        for event in tick(&mut game, &input, SIM_DT) {
            match event {
                GameEvent::Scored { .. } => scored += 1,
                GameEvent::Served => served += 1,
                GameEvent::PaddleHit { .. } => {}
            }
        }
        let y = game.world().get(game.ball()).unwrap().position(Units::Sim).y;
        assert!(y > -margin && y < height + margin, "ball escaped at y = {y}");
    }

    assert_eq!(scored, served);
    assert_eq!(game.score.left + game.score.right, scored);
    assert_eq!(game.world().time_ticks(), 6000);
}
