//! Headless parkour run: builds a course, feeds a scripted key track through
//! the input layer at a fixed tick and logs what the character does.

use std::path::PathBuf;
use std::process::ExitCode;

use livre::{CourseDesc, GameConfig, GameState, InputState, LoadedCourse};
use winit::keyboard::KeyCode;

const TICK: f32 = 1.0 / 60.0;
const DEFAULT_SECONDS: f32 = 12.0;
const DEFAULT_SEED: u64 = 2026;

/// (time in seconds, key, pressed)
const SCRIPT: &[(f32, KeyCode, bool)] = &[
    (0.0, KeyCode::KeyW, true),
    (0.3, KeyCode::ShiftLeft, true),
    (1.3, KeyCode::Space, true),
    (1.35, KeyCode::KeyD, true),
    (1.4, KeyCode::Space, false),
    (1.4, KeyCode::KeyE, true),
    (3.6, KeyCode::KeyE, false),
    (3.6, KeyCode::KeyD, false),
    (4.0, KeyCode::KeyF, true),
    (4.05, KeyCode::KeyF, false),
    (5.0, KeyCode::KeyC, true),
    (5.8, KeyCode::KeyC, false),
    (6.5, KeyCode::KeyQ, true),
    (6.55, KeyCode::KeyQ, false),
];

struct Options {
    config: Option<PathBuf>,
    course: Option<PathBuf>,
    seconds: f32,
    seed: u64,
}

fn parse_args() -> Result<Options, String> {
    let mut options = Options {
        config: None,
        course: None,
        seconds: DEFAULT_SECONDS,
        seed: DEFAULT_SEED,
    };
    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        let mut value = || args.next().ok_or_else(|| format!("missing value for {}", arg));
        match arg.as_str() {
            "--config" => options.config = Some(PathBuf::from(value()?)),
            "--course" => options.course = Some(PathBuf::from(value()?)),
            "--seconds" => {
                let v = value()?;
                options.seconds = v.parse().map_err(|_| format!("invalid --seconds {}", v))?;
            }
            "--seed" => {
                let v = value()?;
                options.seed = v.parse().map_err(|_| format!("invalid --seed {}", v))?;
            }
            other => return Err(format!("unknown argument {}", other)),
        }
    }
    Ok(options)
}

fn run(options: Options) -> Result<(), Box<dyn std::error::Error>> {
    let config = match &options.config {
        Some(path) => GameConfig::load(path)?,
        None => GameConfig::default(),
    };
    let desc = match &options.course {
        Some(path) => CourseDesc::load(path)?,
        None => CourseDesc::demo(),
    };
    let course = LoadedCourse::build(&desc, &config.hazards)?;
    let mut game = GameState::new(course, &config, options.seed);
    let mut input = InputState::new();

    let mut script = SCRIPT.iter().peekable();
    let mut last_report = 0.0;
    let ticks = (options.seconds / TICK).ceil() as u32;

    for _ in 0..ticks {
        let now = game.elapsed();
        while let Some(&&(at, key, pressed)) = script.peek()
            && at <= now
        {
            if pressed {
                input.handle_key_press(key);
            } else {
                input.handle_key_release(key);
            }
            script.next();
        }

        game.update(TICK, &mut input);

        for event in game.take_character_events() {
            log::info!("[{:6.2}] {:?}", game.elapsed(), event);
        }

        if game.elapsed() - last_report >= 1.0 {
            last_report = game.elapsed();
            let c = &game.character;
            log::info!(
                "[{:6.2}] pos {:.0} vel {:.0} jumps {} health {:.0} time left {}",
                game.elapsed(),
                c.position,
                c.movement.velocity,
                c.jumps.jump_left(),
                c.health(),
                game.level_timer.seconds_left()
            );
        }

        let requests = game.take_level_requests();
        if let Some(request) = requests.first() {
            log::info!("Level request: {}", request);
            break;
        }
    }

    game.end_play();
    log::info!("Run finished after {:.2}s", game.elapsed());
    Ok(())
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    log::info!("Starting livre headless run...");

    let options = match parse_args() {
        Ok(options) => options,
        Err(e) => {
            log::error!("{}", e);
            log::error!("usage: livre [--config FILE] [--course FILE] [--seconds N] [--seed N]");
            return ExitCode::FAILURE;
        }
    };

    if let Err(e) = run(options) {
        log::error!("Run failed: {}", e);
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}
