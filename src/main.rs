//! Tilt: a 5×5 sliding-token puzzle in the terminal.

mod app;
mod audio;
mod board;
mod input;
mod levels;
mod motion;
mod session;
mod theme;
mod tilt;
mod ui;

use anyhow::{Context, Result};
use app::App;
use clap::{Parser, ValueEnum};
use motion::MotionConfig;
use session::SessionConfig;
use std::path::{Path, PathBuf};

/// Options derived from the command line that shape the session and front end.
#[derive(Debug, Clone)]
pub struct GameConfig {
    pub session: SessionConfig,
    pub start_level: usize,
    /// Custom level pack; the built-in 40 levels when unset.
    pub levels: Option<PathBuf>,
    pub bell: bool,
    pub no_menu: bool,
}

impl From<&Args> for GameConfig {
    fn from(args: &Args) -> Self {
        Self {
            session: SessionConfig {
                motion: MotionConfig {
                    frame_rate: args.frame_rate,
                    acceleration: args.acceleration,
                    max_velocity: args.max_velocity,
                },
                max_pieces: usize::from(args.max_pieces),
                animate: !args.no_animation,
            },
            start_level: usize::from(args.level),
            levels: args.levels.clone(),
            bell: args.bell,
            no_menu: args.no_menu,
        }
    }
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.log_file.as_deref())?;
    let theme = theme::Theme::load(args.theme.as_deref(), args.palette).unwrap_or_else(|e| {
        log::warn!("theme: {e}; using defaults");
        let mut theme = theme::Theme::default();
        theme.apply_palette(args.palette);
        theme
    });
    let config = GameConfig::from(&args);
    log::info!("starting at level {} with {:?}", config.start_level, config.session);
    let mut app = App::new(config, theme)?;
    app.run()?;
    Ok(())
}

/// The game owns the terminal, so log records only go to a file, and only when asked.
fn init_logging(path: Option<&Path>) -> Result<()> {
    let Some(path) = path else {
        return Ok(());
    };
    let file = std::fs::File::create(path)
        .with_context(|| format!("creating log file {}", path.display()))?;
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Pipe(Box::new(file)))
        .init();
    Ok(())
}

/// Tilt the board to slide green tokens into the hole while keeping the blue ones out.
#[derive(Debug, Parser)]
#[command(
    name = "tilt",
    version,
    about = "Sliding-token puzzle in the terminal: tilt the board, sink the greens, save the blues.",
    long_about = "Tilt is a terminal puzzle on a 5×5 board with a hole in the middle.\n\n\
        Each tilt slides every token as far as it can go: against the edge, a stopper or \
        another token. Get every green token into the hole. If a blue token drops in, the \
        level is lost.\n\n\
        CONTROLS:\n  Arrows / hjkl  Tilt        Enter      Continue / select\n  \
        n / b          Next / previous level      r  Restart\n  \
        p              Pause       q / Esc    Quit menu\n\n\
        Use --levels to play a custom pack and --theme to load a btop-style theme (e.g. onedark.theme)."
)]
pub struct Args {
    /// Level to start on (1-based).
    #[arg(short, long, default_value = "1", value_name = "N",
          value_parser = clap::value_parser!(u16).range(1..))]
    pub level: u16,

    /// Level pack file: `.`, `S`, `G`, `B` and `O` rows, levels separated by blank lines.
    #[arg(long, value_name = "FILE")]
    pub levels: Option<PathBuf>,

    /// Path to theme file (btop-style theme[key]=\"value\"). Uses One Dark if not set.
    #[arg(short, long, value_name = "FILE")]
    pub theme: Option<PathBuf>,

    /// Colour palette: normal (theme), high-contrast, or colorblind.
    #[arg(long, default_value = "normal")]
    pub palette: Palette,

    /// Slide animation integration rate.
    #[arg(long, default_value = "24", value_name = "HZ",
          value_parser = clap::value_parser!(u32).range(1..=1000))]
    pub frame_rate: u32,

    /// Token acceleration in pixels per second squared (a board cell is 16 px).
    #[arg(long, default_value = "1536", value_name = "PX",
          value_parser = clap::value_parser!(i32).range(1..=1_000_000))]
    pub acceleration: i32,

    /// Token speed cap in pixels per second.
    #[arg(long, default_value = "512", value_name = "PX",
          value_parser = clap::value_parser!(i32).range(1..=1_000_000))]
    pub max_velocity: i32,

    /// Most tokens one tilt moves; extra tokens stay where they are.
    #[arg(long, default_value = "5", value_name = "N",
          value_parser = clap::value_parser!(u8).range(1..=25))]
    pub max_pieces: u8,

    /// Settle each tilt instantly instead of sliding.
    #[arg(long)]
    pub no_animation: bool,

    /// Skip the title screen and start playing immediately.
    #[arg(long)]
    pub no_menu: bool,

    /// Ring the terminal bell when a token drops into the hole.
    #[arg(long)]
    pub bell: bool,

    /// Write log records to this file (level from RUST_LOG, default info).
    #[arg(long, value_name = "FILE")]
    pub log_file: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum Palette {
    #[default]
    Normal,

    #[value(alias = "highcontrast", alias = "contrast")]
    HighContrast,

    #[value(alias = "colourblind")]
    Colorblind,
}
