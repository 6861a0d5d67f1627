//! Slide animation: a fixed-point, fixed-rate integrator that turns a move set into
//! per-frame token positions plus the end-stop and hole-fall events of each frame.
//!
//! Every token accelerates along the tilt axis at the same constant rate, with speed capped
//! at `max_velocity`, and snaps to its destination the frame it reaches or passes it.
//! Positions are pixels with [`FRAC_BITS`] fractional bits; one board cell is [`CELL_PX`]
//! pixels wide.

use crate::board::{BOARD_CELLS, Pos, Token};
use crate::tilt::{Direction, Move, MoveSet};
use arrayvec::ArrayVec;
use std::time::Duration;

pub const FRAC_BITS: u32 = 2;
pub const FIXED_ONE: i32 = 1 << FRAC_BITS;
/// Pixels per board cell.
pub const CELL_PX: i32 = 16;

/// Frames integrated by one `advance` call at most; surplus time is dropped.
const MAX_STEPS_PER_ADVANCE: u32 = 8;

/// Integrator tuning.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MotionConfig {
    /// Integration steps per second.
    pub frame_rate: u32,
    /// Pixels per second squared.
    pub acceleration: i32,
    /// Pixels per second.
    pub max_velocity: i32,
}

impl Default for MotionConfig {
    fn default() -> Self {
        Self {
            frame_rate: 24,
            acceleration: 1536,
            max_velocity: 512,
        }
    }
}

impl MotionConfig {
    pub fn frame_duration(&self) -> Duration {
        Duration::from_secs(1) / self.frame_rate.max(1)
    }

    fn rate(&self) -> i32 {
        self.frame_rate.max(1) as i32
    }

    /// Velocity gained per frame, fixed point. Never zero.
    fn velocity_step(&self) -> i32 {
        (self.acceleration.abs() * FIXED_ONE / self.rate()).max(1)
    }

    fn velocity_cap(&self) -> i32 {
        (self.max_velocity.abs() * FIXED_ONE).max(1)
    }
}

/// Fixed-point pixel position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Fixed2 {
    pub x: i32,
    pub y: i32,
}

impl Fixed2 {
    /// Top-left corner of a board cell.
    pub fn of_cell(pos: Pos) -> Self {
        Self {
            x: pos.x as i32 * CELL_PX * FIXED_ONE,
            y: pos.y as i32 * CELL_PX * FIXED_ONE,
        }
    }

    /// Nearest whole pixel.
    pub fn to_pixels(self) -> (i32, i32) {
        let round = |v: i32| (v + FIXED_ONE / 2).div_euclid(FIXED_ONE);
        (round(self.x), round(self.y))
    }
}

/// One token as seen by the renderer this frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sprite {
    pub piece: Token,
    pub pos: Fixed2,
    pub end: Pos,
    pub settled: bool,
    /// Settled during the frame(s) this report covers.
    pub just_settled: bool,
    /// Settled into the hole; drawn partly sunk.
    pub in_hole: bool,
}

/// What happened during one or more integration frames.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FrameReport {
    /// Frames integrated.
    pub frames: u32,
    pub sprites: ArrayVec<Sprite, BOARD_CELLS>,
    /// Tokens that reached their end stop.
    pub end_stops: u8,
    /// At least one token dropped into the hole. One event however many fell.
    pub fell_in_hole: bool,
    /// Every token has settled.
    pub done: bool,
}

impl FrameReport {
    /// Fold a later report into this one.
    fn absorb(&mut self, later: Self) {
        let earlier = std::mem::replace(&mut self.sprites, later.sprites);
        for (sprite, before) in self.sprites.iter_mut().zip(earlier) {
            sprite.just_settled |= before.just_settled;
        }
        self.frames += later.frames;
        self.end_stops = self.end_stops.saturating_add(later.end_stops);
        self.fell_in_hole |= later.fell_in_hole;
        self.done = later.done;
    }
}

#[derive(Debug, Clone)]
struct Body {
    mv: Move,
    pos: Fixed2,
    vel: Fixed2,
    target: Fixed2,
    settled: bool,
}

impl Body {
    fn reached(&self, (sx, sy): (i32, i32)) -> bool {
        let along = |pos: i32, target: i32, sign: i32| match sign {
            s if s < 0 => pos <= target,
            s if s > 0 => pos >= target,
            _ => true,
        };
        along(self.pos.x, self.target.x, sx) && along(self.pos.y, self.target.y, sy)
    }

    fn sprite(&self, just_settled: bool) -> Sprite {
        Sprite {
            piece: self.mv.piece,
            pos: self.pos,
            end: self.mv.end,
            settled: self.settled,
            just_settled,
            in_hole: self.settled && self.mv.fell_in_hole,
        }
    }
}

/// Drives the slide of one tilt. Owns the per-token state until every token settles.
#[derive(Debug, Clone)]
pub struct Animator {
    bodies: ArrayVec<Body, BOARD_CELLS>,
    sign: (i32, i32),
    config: MotionConfig,
    accumulator: Duration,
    frames: u32,
}

impl Animator {
    pub fn new(moves: &MoveSet, direction: Direction, config: MotionConfig) -> Self {
        let (dx, dy) = direction.step();
        let bodies = moves
            .iter()
            .map(|mv| Body {
                mv: *mv,
                pos: Fixed2::of_cell(mv.start),
                vel: Fixed2::default(),
                target: Fixed2::of_cell(mv.end),
                settled: false,
            })
            .collect();
        Self {
            bodies,
            sign: (dx as i32, dy as i32),
            config,
            accumulator: Duration::ZERO,
            frames: 0,
        }
    }

    pub fn is_done(&self) -> bool {
        self.bodies.iter().all(|b| b.settled)
    }

    /// Frames integrated so far.
    pub fn frames(&self) -> u32 {
        self.frames
    }

    /// Current sprites without stepping.
    pub fn sprites(&self) -> ArrayVec<Sprite, BOARD_CELLS> {
        self.bodies.iter().map(|b| b.sprite(false)).collect()
    }

    /// True if a token will come to rest on `pos` (fallen tokens rest nowhere).
    pub fn lands_on(&self, pos: Pos) -> bool {
        self.bodies
            .iter()
            .any(|b| b.mv.end == pos && !b.mv.fell_in_hole)
    }

    /// Integrate exactly one frame.
    pub fn step(&mut self) -> FrameReport {
        let (sx, sy) = self.sign;
        let dv = self.config.velocity_step();
        let cap = self.config.velocity_cap();
        let rate = self.config.rate();
        let mut report = FrameReport {
            frames: 1,
            ..FrameReport::default()
        };
        for body in &mut self.bodies {
            if body.settled {
                report.sprites.push(body.sprite(false));
                continue;
            }
            body.vel.x = (body.vel.x + sx * dv).clamp(-cap, cap);
            body.vel.y = (body.vel.y + sy * dv).clamp(-cap, cap);
            body.pos.x += displacement(body.vel.x, rate, sx);
            body.pos.y += displacement(body.vel.y, rate, sy);
            let just_settled = body.reached(self.sign);
            if just_settled {
                body.pos = body.target;
                body.vel = Fixed2::default();
                body.settled = true;
                report.end_stops = report.end_stops.saturating_add(1);
                report.fell_in_hole |= body.mv.fell_in_hole;
            }
            report.sprites.push(body.sprite(just_settled));
        }
        self.frames += 1;
        report.done = self.is_done();
        report
    }

    /// Feed elapsed wall time; integrates every whole frame it covers, up to a cap.
    pub fn advance(&mut self, dt: Duration) -> FrameReport {
        self.accumulator += dt;
        let frame = self.config.frame_duration();
        let mut report = self.idle_report();
        let mut steps = 0;
        while self.accumulator >= frame && !self.is_done() {
            if steps == MAX_STEPS_PER_ADVANCE {
                self.accumulator = Duration::ZERO;
                break;
            }
            self.accumulator -= frame;
            report.absorb(self.step());
            steps += 1;
        }
        report
    }

    /// Integrate until every token has settled.
    pub fn finish(&mut self) -> FrameReport {
        let mut report = self.idle_report();
        while !self.is_done() {
            report.absorb(self.step());
        }
        report
    }

    fn idle_report(&self) -> FrameReport {
        FrameReport {
            sprites: self.sprites(),
            done: self.is_done(),
            ..FrameReport::default()
        }
    }
}

/// Position change for one frame. A moving token always covers at least one fixed-point
/// unit, so slow tunings still terminate.
fn displacement(velocity: i32, rate: i32, sign: i32) -> i32 {
    match velocity / rate {
        0 => sign,
        d => d,
    }
}
