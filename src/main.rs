//! Brickfall headless runner
//!
//! Plays the configured levels with a paddle that tracks the ball, at a
//! fixed 60 Hz step, and reports the outcome. Sound cues go to the log.
//!
//! ```text
//! brickfall [--display PATH] [--game PATH] [--frames N] [--seed N] [--strict-assets]
//! ```

#[cfg(not(target_arch = "wasm32"))]
mod headless {
    use std::path::PathBuf;

    use brickfall::audio::{AudioManager, LogBackend};
    use brickfall::config::{DataDirLocator, PassthroughLocator, ResourceLocator};
    use brickfall::renderer::DrawCommand;
    use brickfall::sim::{Game, GameStatus, LevelError, PaddleInput, read_layout};
    use brickfall::{DisplayConfig, GameConfig, HighScoreTable};
    use clap::Parser;

    const FRAME_DT: f64 = 1.0 / 60.0;

    /// Play the configured levels headless with an autopilot paddle
    #[derive(Debug, Parser)]
    #[command(name = "brickfall", version)]
    pub struct Args {
        /// Display configuration (JSON)
        #[arg(long, default_value = "data/display.json")]
        pub display: PathBuf,
        /// Game configuration (JSON)
        #[arg(long, default_value = "data/game.json")]
        pub game: PathBuf,
        /// Frames to simulate at 60 Hz
        #[arg(long, default_value_t = 60 * 60 * 5)]
        pub frames: u64,
        /// Seed for the per-level RNG streams
        #[arg(long, default_value_t = 12345)]
        pub seed: u64,
        /// Skip bricks whose textures cannot be found on disk
        #[arg(long)]
        pub strict_assets: bool,
    }

    pub fn run(args: Args) -> Result<(), LevelError> {
        let display = DisplayConfig::load_or_default(&args.display);
        let config = GameConfig::load_or_default(&args.game);
        let data = DataDirLocator::new(display.data_dir.clone());

        let layouts = config
            .levels
            .iter()
            .map(|id| read_layout(id, &config, &data))
            .collect::<Result<Vec<_>, _>>()?;

        let scores_path = display.data_dir.join("highscores.json");
        let table = HighScoreTable::load(&scores_path, config.high_score_entries).unwrap_or_else(|e| {
            log::warn!("{}", e);
            HighScoreTable::new(config.high_score_entries)
        });

        let audio = AudioManager::new(LogBackend, display.music_volume, display.sfx_volume);

        // Nothing is drawn headless, so missing textures need not drop bricks
        if args.strict_assets {
            let game = Game::new(config, display, data, layouts, args.seed)?;
            play(game, audio, &args, &scores_path, table)
        } else {
            let game = Game::new(config, display, PassthroughLocator, layouts, args.seed)?;
            play(game, audio, &args, &scores_path, table)
        }
    }

    fn play<L: ResourceLocator>(
        game: Game<L>,
        mut audio: AudioManager<LogBackend>,
        args: &Args,
        scores_path: &std::path::Path,
        table: HighScoreTable,
    ) -> Result<(), LevelError> {
        let mut game = game.with_high_scores(table).with_player("Autopilot");
        let mut frame: Vec<DrawCommand> = Vec::new();
        let mut current_level = 0;

        for n in 0..args.frames {
            let status = game.advance(FRAME_DT)?;

            if let Some(level) = game.level() {
                if game.state().level != current_level {
                    current_level = game.state().level;
                    audio.start_music(level.sounds());
                }
                let target = level.ball().center().x - level.paddle().width() / 2.0;
                let bank = level.sounds().clone();
                game.handle_input(PaddleInput::Pointer(target));
                game.launch();
                let events = game.drain_events();
                audio.play_events(&events, &bank);
            }

            if n % 600 == 0 {
                frame.clear();
                game.render(&mut frame);
                log::debug!("Frame {}: {} draw commands", n, frame.len());
            }

            if let GameStatus::Finished { score, rank } = status {
                println!("Game over after {} frames: score {} rank {:?}", n, score, rank);
                break;
            }
        }

        let state = game.state();
        println!(
            "Level {} score {} lives {}",
            state.level, state.score, state.lives
        );
        if let Err(e) = game.high_scores().save(scores_path) {
            log::warn!("{}", e);
        }
        Ok(())
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    use clap::Parser;

    let args = headless::Args::parse();
    env_logger::init();
    log::info!("Brickfall (headless) starting...");

    if let Err(e) = headless::run(args) {
        log::error!("{}", e);
        std::process::exit(1);
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // The library is usable from wasm; there is no wasm runner
}
