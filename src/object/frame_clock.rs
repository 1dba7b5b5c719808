//! Frame clocks: a monotonic frame counter plus a short timestamp history.

use std::collections::VecDeque;

use super::class::ClassTag;
use super::handle::Object;
use super::signal::{SignalKind, SignalPayload};

/// Number of frame timestamps kept for rate computation.
pub const FRAME_HISTORY: usize = 64;

#[derive(Debug, Default)]
pub(crate) struct FrameClockState {
    counter: u64,
    history: VecDeque<i64>,
}

impl Object {
    fn with_clock<R>(&self, f: impl FnOnce(&mut FrameClockState) -> R) -> Option<R> {
        self.state.borrow_mut().frame_clock.as_mut().map(f)
    }

    /// Advance a frame clock to a new frame painted at `timestamp_us` and emit
    /// `Tick`.
    pub fn tick(&self, timestamp_us: i64) {
        debug_assert_eq!(self.class(), ClassTag::FrameClock);
        let frame = self.with_clock(|clock| {
            clock.counter += 1;
            if clock.history.len() == FRAME_HISTORY {
                clock.history.pop_front();
            }
            clock.history.push_back(timestamp_us);
            clock.counter
        });
        if let Some(frame) = frame {
            self.emit(SignalKind::Tick, &SignalPayload::Tick { frame, timestamp_us });
        }
    }

    /// Frames painted so far. Zero for anything but a frame clock.
    pub fn frame_counter(&self) -> u64 {
        self.with_clock(|clock| clock.counter).unwrap_or(0)
    }

    /// Frames per second over the history window, or `0.0` with fewer than
    /// two frames.
    pub fn fps(&self) -> f64 {
        self.fps_over(FRAME_HISTORY)
    }

    /// Frames per second over the last `window` frames.
    pub fn fps_over(&self, window: usize) -> f64 {
        self.with_clock(|clock| {
            let window = window.min(clock.history.len());
            if window < 2 {
                return 0.0;
            }
            let first = clock.history[clock.history.len() - window];
            let last = clock.history[clock.history.len() - 1];
            let span = last - first;
            if span <= 0 {
                return 0.0;
            }
            (window - 1) as f64 * 1_000_000.0 / span as f64
        })
        .unwrap_or(0.0)
    }

    /// Timestamp of the latest frame, in microseconds.
    pub fn frame_time(&self) -> Option<i64> {
        self.with_clock(|clock| clock.history.back().copied()).flatten()
    }
}
