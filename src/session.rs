//! Game session: the current level and board, and the resolve → commit → animate cycle.

use crate::board::Board;
use crate::levels::{LevelError, LevelPack};
use crate::motion::{Animator, FrameReport, MotionConfig};
use crate::tilt::{Direction, MAX_MOVABLE_PIECES, Move, resolve};
use std::time::Duration;

/// Session tuning derived from the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionConfig {
    pub motion: MotionConfig,
    /// Move set capacity.
    pub max_pieces: usize,
    /// Slide tokens frame by frame; when false each tilt settles on the next tick.
    pub animate: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            motion: MotionConfig::default(),
            max_pieces: MAX_MOVABLE_PIECES,
            animate: true,
        }
    }
}

#[derive(Debug, Clone)]
pub enum Phase {
    /// Waiting for a tilt.
    Idle,
    /// Tokens are sliding; the board already holds the committed result.
    Animating(Animator),
    /// Every green is in the hole; waiting for acknowledgement.
    Won,
    /// A blue fell in; waiting for acknowledgement.
    Lost,
}

#[derive(Debug, Clone)]
pub struct Session {
    pack: LevelPack,
    config: SessionConfig,
    level: usize,
    board: Board,
    phase: Phase,
    you_win: bool,
    you_lose: bool,
    tilts: u32,
    /// The last tilt left tokens behind because the board held more than `max_pieces`.
    held_back: bool,
}

impl Session {
    pub fn new(pack: LevelPack, level: usize, config: SessionConfig) -> Result<Self, LevelError> {
        let board = pack.level(level)?.clone();
        log::info!("level {level} of {}", pack.len());
        Ok(Self {
            pack,
            config,
            level,
            board,
            phase: Phase::Idle,
            you_win: false,
            you_lose: false,
            tilts: 0,
            held_back: false,
        })
    }

    /// Replace the board with level `level` and reset the flags and tilt counter.
    pub fn load_level(&mut self, level: usize) -> Result<(), LevelError> {
        self.board = self.pack.level(level)?.clone();
        self.level = level;
        self.phase = Phase::Idle;
        self.you_win = false;
        self.you_lose = false;
        self.tilts = 0;
        self.held_back = false;
        log::info!("level {level} of {}", self.pack.len());
        Ok(())
    }

    /// Start a tilt. Ignored (returns false) unless the session is idle. Tilts that move
    /// nothing still animate but are not counted.
    pub fn tilt(&mut self, direction: Direction) -> bool {
        if !matches!(self.phase, Phase::Idle) {
            return false;
        }
        let moves = resolve(&self.board, direction, self.config.max_pieces);
        let animator = Animator::new(&moves, direction, self.config.motion);
        let committed = std::mem::take(&mut self.board).commit(&moves);
        self.board = committed.board;
        self.you_win = committed.you_win;
        self.you_lose = committed.you_lose;
        self.held_back = moves.truncated();
        if !moves.iter().all(Move::is_noop) {
            self.tilts += 1;
        }
        self.phase = Phase::Animating(animator);
        true
    }

    /// Advance the running animation by `dt`. Returns the frame report while animating,
    /// and moves to won, lost or idle on the tick the last token settles.
    pub fn tick(&mut self, dt: Duration) -> Option<FrameReport> {
        let Phase::Animating(animator) = &mut self.phase else {
            return None;
        };
        let report = if self.config.animate {
            animator.advance(dt)
        } else {
            animator.finish()
        };
        if report.done {
            log::debug!("slide settled after {} frames", animator.frames());
            self.settle();
        }
        Some(report)
    }

    fn settle(&mut self) {
        self.phase = if self.you_lose {
            log::info!("level {} lost after {} tilts", self.level, self.tilts);
            Phase::Lost
        } else if self.you_win {
            log::info!("level {} solved in {} tilts", self.level, self.tilts);
            Phase::Won
        } else {
            Phase::Idle
        };
    }

    /// Dismiss the win or loss message: a win moves on to the next level, a loss replays
    /// this one. Returns false when there was nothing to acknowledge.
    pub fn acknowledge(&mut self) -> Result<bool, LevelError> {
        match self.phase {
            Phase::Won => self.load_level(self.pack.next_number(self.level))?,
            Phase::Lost => self.load_level(self.level)?,
            Phase::Idle | Phase::Animating(_) => return Ok(false),
        }
        Ok(true)
    }

    /// Skip ahead one level, wrapping to the first. Ignored mid-slide.
    pub fn next_level(&mut self) -> Result<bool, LevelError> {
        self.jump(self.pack.next_number(self.level))
    }

    /// Go back one level, wrapping to the last. Ignored mid-slide.
    pub fn previous_level(&mut self) -> Result<bool, LevelError> {
        self.jump(self.pack.previous_number(self.level))
    }

    /// Reload the current level. Ignored mid-slide.
    pub fn restart(&mut self) -> Result<bool, LevelError> {
        self.jump(self.level)
    }

    fn jump(&mut self, level: usize) -> Result<bool, LevelError> {
        if self.is_animating() {
            return Ok(false);
        }
        self.load_level(level)?;
        Ok(true)
    }

    pub fn level(&self) -> usize {
        self.level
    }

    pub fn level_count(&self) -> usize {
        self.pack.len()
    }

    /// The committed board. While animating this is already the post-tilt layout.
    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn phase(&self) -> &Phase {
        &self.phase
    }

    pub fn animator(&self) -> Option<&Animator> {
        match &self.phase {
            Phase::Animating(animator) => Some(animator),
            _ => None,
        }
    }

    pub fn is_animating(&self) -> bool {
        matches!(self.phase, Phase::Animating(_))
    }

    pub fn held_back(&self) -> bool {
        self.held_back
    }

    /// Tilts made on the current level.
    pub fn tilts(&self) -> u32 {
        self.tilts
    }
}
