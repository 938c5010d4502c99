//! Pong on top of the simulation core
//!
//! Two PD-tracked paddles, a ball and static top/bottom walls. All game rules
//! run inside [`tick`], so a match replays exactly from its seed and inputs.

pub mod state;
pub mod tick;

pub use state::{Difficulty, GameEvent, PongConfig, PongGame, Score, Side};
pub use tick::{TickInput, predict_intercept, tick};
