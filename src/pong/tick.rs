//! Fixed timestep Pong tick
//!
//! Runs the paddle controllers and ball rules, then advances the world once.

use glam::Vec2;
use rand::Rng;

use super::state::{GameEvent, PongGame, Side};
use crate::sim::{EntityKind, Units};

/// Computer kick window, measured back from its paddle (pixels)
const KICK_WINDOW: (f32, f32) = (300.0, 150.0);

/// Velocity given to a ball that has stalled horizontally (pixels/s)
const STALL_NUDGE: f32 = 0.01;

/// Input commands for a single tick (deterministic)
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Pointer height for the player paddle (pixels). `None` keeps the last one.
    pub target_y: Option<f32>,
    /// Player kick (space)
    pub kick: bool,
    /// Pause toggle
    pub pause: bool,
    /// Stop the match for good
    pub quit: bool,
    /// Idle/demo mode - AI plays the player paddle too
    pub idle_mode: bool,
}

/// Where a ball will cross `fixed_x`, allowing one bounce off the top or
/// bottom edge. Falls back to the ball's height when it is not moving
/// horizontally.
pub fn predict_intercept(position: Vec2, velocity: Vec2, fixed_x: f32, height: f32) -> f32 {
    if velocity.x.abs() < f32::EPSILON {
        return position.y;
    }
    let expected = (fixed_x - position.x) / velocity.x * velocity.y + position.y;
    if expected < 0.0 {
        -expected
    } else if expected > height {
        2.0 * height - expected
    } else {
        expected
    }
}

/// Advance the match by one fixed timestep
pub fn tick(game: &mut PongGame, input: &TickInput, dt: f32) -> Vec<GameEvent> {
    let mut events = Vec::new();

    if input.quit {
        game.world.stop();
        return events;
    }
    if input.pause {
        game.world.toggle_pause();
    }
    if !game.world.is_running() {
        return events;
    }

    let Some((ball_position, ball_velocity)) = game
        .world
        .get(game.ball)
        .map(|b| (b.position(Units::Sim), b.velocity(Units::Sim)))
    else {
        log::error!("Ball {} missing from world", game.ball);
        game.world.stop();
        return events;
    };

    drive_player(game, input, ball_position);
    drive_computer(game, ball_position, ball_velocity);
    apply_ball_rules(game, &mut events);

    let Some(report) = game.world.step(dt) else {
        return events;
    };
    for contact in &report.contacts {
        if contact.a != game.ball {
            continue;
        }
        let hit_paddle = game
            .world
            .get(contact.b)
            .is_some_and(|b| b.kind() == EntityKind::Paddle);
        if hit_paddle {
            events.push(GameEvent::PaddleHit { paddle: contact.b });
        }
    }

    events
}

fn drive_player(game: &mut PongGame, input: &TickInput, ball_position: Vec2) {
    if let Some(y) = input.target_y {
        game.player_target = y;
    }
    let target_y = if input.idle_mode {
        ball_position.y
    } else {
        game.player_target
    };

    let Some(paddle) = game.world.get_mut(game.player) else {
        log::warn!("Player paddle {} missing", game.player);
        return;
    };
    game.player_pd.drive(paddle, Vec2::new(0.0, target_y));
    let kick = input.kick && !input.idle_mode;
    if game.config.player.kick(paddle, kick) {
        log::trace!("Player kick");
    }
}

fn drive_computer(game: &mut PongGame, ball_position: Vec2, ball_velocity: Vec2) {
    let difficulty = game.config.difficulty;
    let fixed_x = game
        .computer_pd
        .constraint
        .map_or(ball_position.x, |(_, fixed)| fixed);

    let target_y = if difficulty.predicts() {
        predict_intercept(ball_position, ball_velocity, fixed_x, game.config.arena.y)
    } else {
        ball_position.y
    };

    let Some(paddle) = game.world.get_mut(game.computer) else {
        log::warn!("Computer paddle {} missing", game.computer);
        return;
    };
    game.computer_pd.drive(paddle, Vec2::new(0.0, target_y));

    let (far, near) = KICK_WINDOW;
    let in_window = ball_position.x > fixed_x - far && ball_position.x < fixed_x - near;
    game.config
        .computer
        .kick(paddle, difficulty.kicks() && in_window);
}

/// Scoring, edge bounce and stall nudge
fn apply_ball_rules(game: &mut PongGame, events: &mut Vec<GameEvent>) {
    let arena = game.config.arena;
    let radius = game.config.ball_size / 2.0;

    let Some(position) = game.world.get(game.ball).map(|b| b.position(Units::Sim)) else {
        return;
    };

    let scorer = if position.x < -radius {
        Some(Side::Right)
    } else if position.x > arena.x + radius {
        Some(Side::Left)
    } else {
        None
    };
    if let Some(side) = scorer {
        game.score.increment(side);
        log::info!(
            "{:?} scores ({} - {})",
            side,
            game.score.left,
            game.score.right
        );
        events.push(GameEvent::Scored { side });
        game.serve();
        events.push(GameEvent::Served);
    }

    let nudge = if game.rng.random_bool(0.5) {
        STALL_NUDGE
    } else {
        -STALL_NUDGE
    };
    let Some(ball) = game.world.get_mut(game.ball) else {
        return;
    };
    let position = ball.position(Units::Sim);
    let mut velocity = ball.velocity(Units::Sim);
    if position.y < radius {
        velocity.y = velocity.y.abs();
    } else if position.y > arena.y - radius {
        velocity.y = -velocity.y.abs();
    }
    if velocity.x == 0.0 {
        velocity.x = nudge;
    }
    ball.set_velocity(velocity, Units::Sim);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::SIM_DT;
    use crate::pong::state::{Difficulty, PongConfig};
    use crate::sim::WorldPhase;

    fn game(seed: u64) -> PongGame {
        PongGame::new(PongConfig::default(), seed).unwrap()
    }

    fn freeze_ball(game: &mut PongGame) {
        let ball = game.ball();
        game.world_mut()
            .get_mut(ball)
            .unwrap()
            .set_velocity(Vec2::ZERO, Units::Sim);
    }

    #[test]
    fn test_predict_intercept() {
        let p = Vec2::new(500.0, 350.0);
        assert!((predict_intercept(p, Vec2::new(400.0, 100.0), 900.0, 700.0) - 450.0).abs() < 1e-3);
        // Bounces off the bottom edge
        assert!((predict_intercept(p, Vec2::new(400.0, 400.0), 900.0, 700.0) - 650.0).abs() < 1e-3);
        // Bounces off the top edge
        assert!((predict_intercept(p, Vec2::new(400.0, -400.0), 900.0, 700.0) - 50.0).abs() < 1e-3);
        // Vertical ball
        assert_eq!(predict_intercept(p, Vec2::new(0.0, 10.0), 900.0, 700.0), 350.0);
    }

    #[test]
    fn test_tick_advances_ball() {
        let mut game = game(12345);
        let before = game.world().get(game.ball()).unwrap().position(Units::Sim);

        tick(&mut game, &TickInput::default(), SIM_DT);

        let after = game.world().get(game.ball()).unwrap().position(Units::Sim);
        assert_ne!(before, after);
        assert_eq!(game.world().time_ticks(), 1);
    }

    #[test]
    fn test_tick_pause() {
        let mut game = game(12345);
        let pause = TickInput {
            pause: true,
            ..Default::default()
        };

        tick(&mut game, &pause, SIM_DT);
        assert_eq!(game.world().phase(), WorldPhase::Paused);

        let frozen = game.world().get(game.ball()).unwrap().position(Units::Sim);
        tick(&mut game, &TickInput::default(), SIM_DT);
        assert_eq!(
            game.world().get(game.ball()).unwrap().position(Units::Sim),
            frozen
        );

        tick(&mut game, &pause, SIM_DT);
        assert_eq!(game.world().phase(), WorldPhase::Running);
    }

    #[test]
    fn test_quit_is_terminal() {
        let mut game = game(1);
        let quit = TickInput {
            quit: true,
            ..Default::default()
        };
        tick(&mut game, &quit, SIM_DT);
        assert_eq!(game.world().phase(), WorldPhase::Stopped);

        let pause = TickInput {
            pause: true,
            ..Default::default()
        };
        tick(&mut game, &pause, SIM_DT);
        assert_eq!(game.world().phase(), WorldPhase::Stopped);
        assert_eq!(game.world().time_ticks(), 0);
    }

    #[test]
    fn test_scoring_serves_again() {
        let mut game = game(5);
        let ball = game.ball();
        game.world_mut()
            .get_mut(ball)
            .unwrap()
            .set_position(Vec2::new(-40.0, 300.0), Units::Sim);

        let events = tick(&mut game, &TickInput::default(), SIM_DT);

        assert_eq!(game.score.right, 1);
        assert_eq!(game.score.left, 0);
        assert!(events.contains(&GameEvent::Scored { side: Side::Right }));
        assert!(events.contains(&GameEvent::Served));

        let position = game.world().get(ball).unwrap().position(Units::Sim);
        assert!((position - Vec2::new(500.0, 350.0)).length() < 10.0);
    }

    #[test]
    fn test_player_paddle_tracks_target() {
        let mut game = game(3);
        freeze_ball(&mut game);
        let input = TickInput {
            target_y: Some(200.0),
            ..Default::default()
        };
        tick(&mut game, &input, SIM_DT);

        // Target is remembered once given
        for _ in 0..400 {
            tick(&mut game, &TickInput::default(), SIM_DT);
        }

        let paddle = game.world().get(game.player()).unwrap();
        assert!((paddle.position(Units::Sim).y - 200.0).abs() < 2.0);
        assert!((paddle.position(Units::Sim).x - 100.0).abs() < 1.0);
    }

    #[test]
    fn test_player_kick() {
        let mut game = game(3);
        freeze_ball(&mut game);
        let input = TickInput {
            kick: true,
            ..Default::default()
        };
        tick(&mut game, &input, SIM_DT);

        let paddle = game.world().get(game.player()).unwrap();
        assert!(paddle.velocity(Units::Sim).x < 0.0);
    }

    #[test]
    fn test_easy_computer_never_kicks() {
        let config = PongConfig {
            difficulty: Difficulty::Easy,
            ..Default::default()
        };
        let mut game = PongGame::new(config, 3).unwrap();
        let ball = game.ball();
        // Inside the kick window in front of the computer paddle
        let body = game.world_mut().get_mut(ball).unwrap();
        body.set_position(Vec2::new(700.0, 350.0), Units::Sim);
        body.set_velocity(Vec2::ZERO, Units::Sim);

        tick(&mut game, &TickInput::default(), SIM_DT);
        let paddle = game.world().get(game.computer()).unwrap();
        assert!(paddle.velocity(Units::Sim).x.abs() < 1e-3);
    }

    #[test]
    fn test_hard_computer_kicks_in_window() {
        let mut game = game(3);
        let ball = game.ball();
        let body = game.world_mut().get_mut(ball).unwrap();
        body.set_position(Vec2::new(700.0, 350.0), Units::Sim);
        body.set_velocity(Vec2::new(100.0, 0.0), Units::Sim);

        tick(&mut game, &TickInput::default(), SIM_DT);
        let paddle = game.world().get(game.computer()).unwrap();
        assert!(paddle.velocity(Units::Sim).x > 0.0);
    }

    #[test]
    fn test_ball_reaches_paddle() {
        let mut game = game(8);
        let ball = game.ball();
        let body = game.world_mut().get_mut(ball).unwrap();
        body.set_position(Vec2::new(200.0, 350.0), Units::Sim);
        body.set_velocity(Vec2::new(-400.0, 0.0), Units::Sim);

        let mut hit = false;
        for _ in 0..50 {
            let events = tick(&mut game, &TickInput::default(), SIM_DT);
            if events.contains(&GameEvent::PaddleHit {
                paddle: game.player(),
            }) {
                hit = true;
                break;
            }
        }
        assert!(hit);
        let velocity = game.world().get(ball).unwrap().velocity(Units::Sim);
        assert!(velocity.x > 0.0);
    }

    #[test]
    fn test_determinism() {
        let mut game1 = game(99999);
        let mut game2 = game(99999);

        let inputs = [
            TickInput {
                target_y: Some(120.0),
                ..Default::default()
            },
            TickInput {
                kick: true,
                ..Default::default()
            },
            TickInput {
                idle_mode: true,
                ..Default::default()
            },
            TickInput::default(),
        ];

        for _ in 0..100 {
            for input in &inputs {
                tick(&mut game1, input, SIM_DT);
                tick(&mut game2, input, SIM_DT);
            }
        }

        assert_eq!(game1.world().time_ticks(), game2.world().time_ticks());
        assert_eq!(game1.score, game2.score);
        let p1 = game1.world().get(game1.ball()).unwrap().position(Units::Sim);
        let p2 = game2.world().get(game2.ball()).unwrap().position(Units::Sim);
        assert_eq!(p1, p2);
    }
}
