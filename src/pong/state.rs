//! Pong game state built on the simulation core

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use crate::config::WorldConfig;
use crate::error::Result;
use crate::sim::{
    Axis, BodyDesc, CollisionProfile, ControllerConfig, EntityId, EntityKind, PdController,
    Shape, Units, World,
};

/// How hard the computer paddle plays
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Difficulty {
    /// Tracks the ball's current height
    Easy,
    /// Tracks the ball's height and winds up a kick
    Medium,
    /// Predicts the intercept (one wall bounce) and winds up a kick
    #[default]
    Hard,
}

impl Difficulty {
    pub fn predicts(self) -> bool {
        self == Difficulty::Hard
    }

    pub fn kicks(self) -> bool {
        self != Difficulty::Easy
    }
}

/// Arena side
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Side {
    Left,
    Right,
}

/// Something notable that happened during a tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GameEvent {
    /// Ball put back in the middle with a fresh velocity
    Served,
    /// A side scored a point
    Scored { side: Side },
    /// Ball struck a paddle
    PaddleHit { paddle: EntityId },
}

/// Points per side
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Score {
    pub left: u32,
    pub right: u32,
}

impl Score {
    pub fn increment(&mut self, side: Side) {
        match side {
            Side::Left => self.left += 1,
            Side::Right => self.right += 1,
        }
    }
}

/// Pong setup. Sizes in pixels, speeds in m/s, masses in kg.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PongConfig {
    pub world: WorldConfig,
    /// Arena size in pixels
    pub arena: Vec2,
    pub ball_speed: f32,
    pub ball_mass: f32,
    pub ball_size: f32,
    pub paddle_mass: f32,
    pub paddle_size: Vec2,
    /// Distance of each paddle from its wall (meters)
    pub paddle_inset: f32,
    /// Paddle PD gains, simulation units
    pub kp: f32,
    pub kv: f32,
    pub difficulty: Difficulty,
    pub player: ControllerConfig,
    pub computer: ControllerConfig,
}

impl Default for PongConfig {
    fn default() -> Self {
        Self {
            world: WorldConfig::default(),
            arena: Vec2::new(1000.0, 700.0),
            ball_speed: 40.0,
            ball_mass: 0.05,
            ball_size: 30.0,
            paddle_mass: 1.0,
            paddle_size: Vec2::new(20.0, 120.0),
            paddle_inset: 10.0,
            kp: 20.0,
            kv: 5.0,
            difficulty: Difficulty::Hard,
            player: ControllerConfig {
                inject_forces: true,
                kick_force: Vec2::new(-70.0, 0.0),
            },
            computer: ControllerConfig {
                inject_forces: true,
                kick_force: Vec2::new(70.0, 0.0),
            },
        }
    }
}

impl PongConfig {
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.world.validate()?;
        Ok(config)
    }
}

/// Thickness of the walls above and below the arena (pixels)
const WALL_THICKNESS: f32 = 50.0;

/// A running Pong match
#[derive(Debug)]
pub struct PongGame {
    pub config: PongConfig,
    pub score: Score,
    pub(crate) world: World,
    pub(crate) player: EntityId,
    pub(crate) computer: EntityId,
    pub(crate) ball: EntityId,
    pub(crate) player_pd: PdController,
    pub(crate) computer_pd: PdController,
    /// Last pointer height the player asked for (pixels)
    pub(crate) player_target: f32,
    pub(crate) rng: Pcg32,
}

impl PongGame {
    /// Build the arena, paddles and ball, and serve
    pub fn new(config: PongConfig, seed: u64) -> Result<Self> {
        let mut world = World::new("Pong", config.world.clone())?;
        let scale = world.scale();
        let arena_si = scale.to_si(config.arena);

        let paddle = |x: f32| {
            BodyDesc::dynamic(EntityKind::Paddle, config.paddle_mass, Vec2::new(x, arena_si.y / 2.0))
                .with_shape(Shape::Rect {
                    size: config.paddle_size,
                })
                .with_collision(CollisionProfile::default())
        };
        let player = world.spawn(paddle(config.paddle_inset))?;
        let computer = world.spawn(paddle(arena_si.x - config.paddle_inset))?;

        let ball_size = Vec2::splat(config.ball_size);
        let ball = world.spawn(
            BodyDesc::dynamic(EntityKind::Ball, config.ball_mass, arena_si / 2.0)
                .with_shape(Shape::Rect { size: ball_size })
                .with_collision(CollisionProfile::box_edges(ball_size)),
        )?;

        let wall_size = Vec2::new(config.arena.x, WALL_THICKNESS);
        let half_wall = scale.to_si(Vec2::new(0.0, WALL_THICKNESS / 2.0));
        for y in [-half_wall.y, arena_si.y + half_wall.y] {
            world.spawn(
                BodyDesc::wall(Vec2::new(arena_si.x / 2.0, y), wall_size)
                    .with_collision(CollisionProfile::default()),
            )?;
        }

        let paddle_x = |id| world.get(id).map_or(0.0, |b| b.position(Units::Sim).x);
        let player_pd = PdController::new(config.kp, config.kv).along(Axis::Y, paddle_x(player));
        let computer_pd =
            PdController::new(config.kp, config.kv).along(Axis::Y, paddle_x(computer));

        let mut game = Self {
            player_target: config.arena.y / 2.0,
            config,
            score: Score::default(),
            world,
            player,
            computer,
            ball,
            player_pd,
            computer_pd,
            rng: Pcg32::seed_from_u64(seed),
        };
        game.serve();
        game.world.unpause();
        log::info!("Pong started (seed {}, {:?})", seed, game.config.difficulty);
        Ok(game)
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }

    pub fn ball(&self) -> EntityId {
        self.ball
    }

    pub fn player(&self) -> EntityId {
        self.player
    }

    pub fn computer(&self) -> EntityId {
        self.computer
    }

    /// Random serve velocity (SI): up to 0.3π below horizontal, toward either side
    pub fn serve_velocity(rng: &mut Pcg32, speed: f32) -> Vec2 {
        let mut angle = 0.3 * std::f32::consts::PI * rng.random::<f32>();
        if rng.random_bool(0.5) {
            angle += std::f32::consts::PI;
        }
        speed * Vec2::new(angle.cos(), angle.sin())
    }

    /// Put the ball back in the middle with a fresh velocity
    pub fn serve(&mut self) {
        let velocity = Self::serve_velocity(&mut self.rng, self.config.ball_speed);
        let center = self.config.arena / 2.0;
        if let Some(ball) = self.world.get_mut(self.ball) {
            ball.set_position(center, Units::Sim);
            ball.set_velocity(velocity, Units::Si);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_game_layout() {
        let game = PongGame::new(PongConfig::default(), 7).unwrap();
        let world = game.world();

        assert_eq!(world.entities_of_type(EntityKind::Paddle).count(), 2);
        assert_eq!(world.entities_of_type(EntityKind::Ball).count(), 1);
        assert_eq!(world.entities_of_type(EntityKind::Wall).count(), 2);
        assert!(world.is_running());

        let player = world.get(game.player()).unwrap();
        assert_eq!(player.position(Units::Sim), Vec2::new(100.0, 350.0));
        let computer = world.get(game.computer()).unwrap();
        assert_eq!(computer.position(Units::Sim), Vec2::new(900.0, 350.0));

        let ball = world.get(game.ball()).unwrap();
        assert_eq!(ball.position(Units::Sim), Vec2::new(500.0, 350.0));
        assert!((ball.velocity(Units::Si).length() - 40.0).abs() < 1e-3);
    }

    #[test]
    fn test_serve_angle_range() {
        let mut rng = Pcg32::seed_from_u64(1);
        for _ in 0..100 {
            let v = PongGame::serve_velocity(&mut rng, 10.0);
            assert!((v.length() - 10.0).abs() < 1e-4);
            // Never steeper than 0.3π from horizontal
            let steepness = (v.y.abs() / v.x.abs()).atan();
            assert!(steepness <= 0.3 * std::f32::consts::PI + 1e-4);
        }
    }

    #[test]
    fn test_same_seed_same_serve() {
        let a = PongGame::new(PongConfig::default(), 42).unwrap();
        let b = PongGame::new(PongConfig::default(), 42).unwrap();
        let va = a.world().get(a.ball()).unwrap().velocity(Units::Sim);
        let vb = b.world().get(b.ball()).unwrap().velocity(Units::Sim);
        assert_eq!(va, vb);
    }

    #[test]
    fn test_config_from_json() {
        let config =
            PongConfig::from_json(r#"{ "difficulty": "Easy", "world": { "scale": 20.0 } }"#)
                .unwrap();
        assert_eq!(config.difficulty, Difficulty::Easy);
        assert_eq!(config.world.scale, 20.0);
        assert_eq!(config.kp, 20.0);
        assert!(PongConfig::from_json(r#"{ "world": { "scale": 0.0 } }"#).is_err());
    }
}
