//! Sound effects for the slide animation.
//!
//! The terminal has no mixer, so the audible sink rings the bell when a token drops into
//! the hole and only logs end-stop clacks. Anything else that can make noise implements
//! [`AudioSink`].

use crate::motion::FrameReport;
use crate::tilt::MAX_MOVABLE_PIECES;
use std::io::Write;

/// Receives at most one event of each kind per animation frame.
pub trait AudioSink {
    /// Tokens hit their end stops. `intensity` is in `0.0..=1.0` and grows with how many
    /// tokens stopped on the same frame.
    fn end_stop(&mut self, intensity: f32);

    /// One or more tokens dropped into the hole.
    fn fell_in_hole(&mut self);
}

/// Volume for `count` tokens stopping together; a full move set is loudest.
pub fn end_stop_intensity(count: u8) -> f32 {
    (f32::from(count) / MAX_MOVABLE_PIECES as f32).min(1.0)
}

/// Forward a frame report's events to `sink`.
pub fn play_frame(sink: &mut dyn AudioSink, report: &FrameReport) {
    if report.end_stops > 0 {
        sink.end_stop(end_stop_intensity(report.end_stops));
    }
    if report.fell_in_hole {
        sink.fell_in_hole();
    }
}

/// Discards everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct SilentAudio;

impl AudioSink for SilentAudio {
    fn end_stop(&mut self, _intensity: f32) {}

    fn fell_in_hole(&mut self) {}
}

/// Rings the terminal bell (`BEL`) on hole falls.
#[derive(Debug)]
pub struct BellAudio<W: Write> {
    out: W,
}

impl<W: Write> BellAudio<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }
}

impl<W: Write> AudioSink for BellAudio<W> {
    fn end_stop(&mut self, intensity: f32) {
        log::trace!("end stop, intensity {intensity:.2}");
    }

    fn fell_in_hole(&mut self) {
        if let Err(e) = self.out.write_all(b"\x07").and_then(|()| self.out.flush()) {
            log::warn!("bell failed: {e}");
        }
    }
}
