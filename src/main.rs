//! Newton Pong entry point
//!
//! Runs a headless computer-vs-computer match on a fixed-timestep loop and
//! prints the final render snapshot as JSON.
//!
//! Usage: `newton-pong [seconds] [seed] [config.json]`

use newton_pong::pong::{GameEvent, PongConfig, PongGame, TickInput, tick};

/// Frame interval of the simulated display
const FRAME_DT: f32 = 1.0 / 60.0;

/// Owns the match and the accumulator between frames
struct Driver {
    game: PongGame,
    accumulator: f32,
    input: TickInput,
    fixed_dt: f32,
    max_substeps: u32,
}

impl Driver {
    fn new(game: PongGame) -> Self {
        let config = game.world().config();
        let fixed_dt = config.fixed_dt();
        let max_substeps = config.max_substeps;
        Self {
            game,
            accumulator: 0.0,
            input: TickInput {
                idle_mode: true,
                ..Default::default()
            },
            fixed_dt,
            max_substeps,
        }
    }

    /// Run simulation ticks for one display frame
    fn update(&mut self, dt: f32) {
        let dt = dt.min(0.1);
        self.accumulator += dt;

        let mut substeps = 0;
        while self.accumulator >= self.fixed_dt && substeps < self.max_substeps {
            for event in tick(&mut self.game, &self.input, self.fixed_dt) {
                if let GameEvent::PaddleHit { paddle } = event {
                    log::debug!("Paddle {} hit", paddle);
                }
            }
            self.accumulator -= self.fixed_dt;
            substeps += 1;

            // Clear one-shot inputs after processing
            self.input.pause = false;
            self.input.kick = false;
        }
    }
}

fn run() -> newton_pong::Result<()> {
    let mut args = std::env::args().skip(1);
    let seconds: f32 = args.next().and_then(|s| s.parse().ok()).unwrap_or(30.0);
    let seed: u64 = args.next().and_then(|s| s.parse().ok()).unwrap_or(12345);
    let config = match args.next() {
        Some(path) => PongConfig::from_json(&std::fs::read_to_string(&path)?)?,
        None => PongConfig::default(),
    };

    let mut driver = Driver::new(PongGame::new(config, seed)?);

    let frames = (seconds / FRAME_DT).round() as u64;
    for _ in 0..frames {
        driver.update(FRAME_DT);
    }
    driver.input.quit = true;
    driver.update(FRAME_DT);

    let score = driver.game.score;
    log::info!(
        "Final score {} - {} after {:.1}s",
        score.left,
        score.right,
        driver.game.world().elapsed()
    );

    let snapshot = driver.game.world().render_snapshot();
    println!("{}", serde_json::to_string_pretty(&snapshot)?);
    Ok(())
}

fn main() {
    env_logger::init();
    log::info!("Newton Pong (headless) starting...");

    if let Err(e) = run() {
        log::error!("{e}");
        std::process::exit(1);
    }
}
