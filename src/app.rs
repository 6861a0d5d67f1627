//! App: terminal init, main loop, tick and key handling.

use crate::GameConfig;
use crate::audio::{AudioSink, BellAudio, SilentAudio, play_frame};
use crate::input::{Action, key_to_action};
use crate::levels::LevelPack;
use crate::session::Session;
use crate::theme::Theme;
use crate::tilt::Direction;
use crate::ui::HoleFade;
use anyhow::{Context, Result};
use crossterm::event::{self, Event, KeyEventKind};
use ratatui::DefaultTerminal;
use std::ops::ControlFlow;
use std::time::{Duration, Instant};

/// Input poll / redraw interval (~60 Hz).
const FRAME_INTERVAL: Duration = Duration::from_millis(16);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Title,
    Playing,
    QuitMenu,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuitOption {
    Resume,
    Restart,
    Exit,
}

impl QuitOption {
    fn next(self) -> Self {
        match self {
            Self::Resume => Self::Restart,
            Self::Restart => Self::Exit,
            Self::Exit => Self::Resume,
        }
    }

    fn previous(self) -> Self {
        match self {
            Self::Resume => Self::Exit,
            Self::Restart => Self::Resume,
            Self::Exit => Self::Restart,
        }
    }
}

pub struct App {
    session: Session,
    theme: Theme,
    audio: Box<dyn AudioSink>,
    screen: Screen,
    paused: bool,
    quit_selected: QuitOption,
    /// TachyonFX fade over the hole, restarted whenever a token falls in.
    hole_fade: HoleFade,
    animate: bool,
    last_tick: Instant,
}

impl App {
    pub fn new(config: GameConfig, theme: Theme) -> Result<Self> {
        let pack = match &config.levels {
            Some(path) => LevelPack::load(path)
                .with_context(|| format!("loading levels from {}", path.display()))?,
            None => LevelPack::builtin().context("built-in level pack")?,
        };
        let session = Session::new(pack, config.start_level, config.session)?;
        let audio: Box<dyn AudioSink> = if config.bell {
            Box::new(BellAudio::new(std::io::stdout()))
        } else {
            Box::new(SilentAudio)
        };
        let screen = if config.no_menu {
            Screen::Playing
        } else {
            Screen::Title
        };
        Ok(Self {
            session,
            theme,
            audio,
            screen,
            paused: false,
            quit_selected: QuitOption::Resume,
            hole_fade: HoleFade::default(),
            animate: config.session.animate,
            last_tick: Instant::now(),
        })
    }

    pub fn run(&mut self) -> Result<()> {
        use crossterm::{
            event::{KeyboardEnhancementFlags, PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags},
            execute,
            terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
        };

        enable_raw_mode()?;
        let mut stdout = std::io::stdout();
        execute!(stdout, EnterAlternateScreen)?;

        // Release events let held keys be told apart from fresh presses; not every terminal
        // supports the flag.
        let _ = execute!(
            stdout,
            PushKeyboardEnhancementFlags(KeyboardEnhancementFlags::REPORT_EVENT_TYPES)
        );

        let mut terminal =
            DefaultTerminal::new(ratatui::backend::CrosstermBackend::new(stdout))?;
        self.last_tick = Instant::now();
        let result = self.run_loop(&mut terminal);

        let _ = execute!(std::io::stdout(), PopKeyboardEnhancementFlags);
        execute!(std::io::stdout(), LeaveAlternateScreen)?;
        disable_raw_mode()?;

        result
    }

    fn run_loop(&mut self, terminal: &mut DefaultTerminal) -> Result<()> {
        loop {
            let now = Instant::now();
            self.tick(now);
            terminal.draw(|f| {
                crate::ui::draw(
                    f,
                    self.screen,
                    &self.session,
                    &self.theme,
                    self.paused,
                    self.quit_selected,
                    &mut self.hole_fade,
                    now,
                );
            })?;

            let timeout = FRAME_INTERVAL.saturating_sub(now.elapsed());
            if event::poll(timeout)? {
                while event::poll(Duration::ZERO)? {
                    if let Event::Key(key) = event::read()? {
                        // Only the first Press counts; repeats and releases never tilt.
                        if key.kind != KeyEventKind::Press {
                            continue;
                        }
                        if self.handle_action(key_to_action(key))?.is_break() {
                            return Ok(());
                        }
                    }
                }
            }
        }
    }

    /// Advance the slide animation to `now` and play its sounds. Frozen while paused or
    /// in the quit menu.
    fn tick(&mut self, now: Instant) {
        let dt = now.saturating_duration_since(self.last_tick);
        self.last_tick = now;
        if self.screen != Screen::Playing || self.paused {
            return;
        }
        if let Some(report) = self.session.tick(dt) {
            play_frame(self.audio.as_mut(), &report);
            if report.fell_in_hole && self.animate {
                self.hole_fade.trigger(&self.theme);
            }
        }
    }

    fn handle_action(&mut self, action: Action) -> Result<ControlFlow<()>> {
        match self.screen {
            Screen::Title => match action {
                Action::Confirm => self.screen = Screen::Playing,
                Action::Quit => return Ok(ControlFlow::Break(())),
                _ => {}
            },
            Screen::Playing if self.paused => match action {
                Action::Pause => self.paused = false,
                Action::Quit => self.open_quit_menu(),
                _ => {}
            },
            Screen::Playing => match action {
                Action::Tilt(direction) => {
                    if !self.session.tilt(direction) {
                        log::debug!("tilt {direction} ignored");
                    }
                }
                Action::Confirm => {
                    if self.session.acknowledge()? {
                        self.hole_fade.clear();
                    }
                }
                Action::NextLevel => {
                    let changed = self.session.next_level()?;
                    self.level_changed(changed);
                }
                Action::PreviousLevel => {
                    let changed = self.session.previous_level()?;
                    self.level_changed(changed);
                }
                Action::Restart => {
                    let changed = self.session.restart()?;
                    self.level_changed(changed);
                }
                Action::Pause => self.paused = true,
                Action::Quit => self.open_quit_menu(),
                Action::None => {}
            },
            Screen::QuitMenu => match action {
                Action::Tilt(Direction::Down | Direction::Right) => {
                    self.quit_selected = self.quit_selected.next();
                }
                Action::Tilt(Direction::Up | Direction::Left) => {
                    self.quit_selected = self.quit_selected.previous();
                }
                Action::Confirm => match self.quit_selected {
                    QuitOption::Resume => self.screen = Screen::Playing,
                    QuitOption::Restart => {
                        self.screen = Screen::Playing;
                        self.paused = false;
                        let changed = self.session.restart()?;
                        self.level_changed(changed);
                    }
                    QuitOption::Exit => return Ok(ControlFlow::Break(())),
                },
                Action::Pause | Action::Quit => self.screen = Screen::Playing,
                _ => {}
            },
        }
        Ok(ControlFlow::Continue(()))
    }

    fn open_quit_menu(&mut self) {
        self.screen = Screen::QuitMenu;
        self.quit_selected = QuitOption::Resume;
    }

    fn level_changed(&mut self, changed: bool) {
        if changed {
            self.hole_fade.clear();
        }
    }
}
