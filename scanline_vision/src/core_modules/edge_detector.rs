// THEORY:
// The `edge_detector` module is the line follower's only piece of "memory". It walks
// a sampled row left to right and looks for the two edges of a strip of blue tape
// using a hard threshold:
//
// - Left edge: the first column that is strongly blue (blue above the threshold while
//   green and red stay below it) and the strip has not been entered yet.
// - Right edge: the first column after that where blue falls below the threshold.
//
// The midpoint of the two edges is the estimated line center.
//
// State lives in `EdgeState`, owned by the detector and carried from one frame to the
// next. `scan` itself never resets anything, so a row without tape leaves the previous
// edges (and flags) exactly where they were. Whether the flags are cleared between
// frames is decided by `ResetPolicy` and applied in `begin_frame`; the crossing columns
// always persist and act as the last known position of the line.

use crate::core_modules::frame::Frame;
use crate::core_modules::pixel::pixel::Channel;
use crate::core_modules::scanline::{self, Scanline};

/// Blue threshold used by the classroom setup.
pub const DEFAULT_THRESHOLD: Channel = 200;

/// The detector's memory, carried across scans.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EdgeState {
    /// Column of the most recent left edge.
    pub point1: u32,
    /// Column of the most recent right edge.
    pub point2: u32,
    /// Inside the strip: the left edge has been seen.
    pub left_seen: bool,
    /// The right edge has been seen as well.
    pub right_seen: bool,
    /// `floor((point1 + point2) / 2)`.
    pub midpoint: u32,
}

/// What happens to the flags when a new frame starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResetPolicy {
    /// Clear both flags so each frame can find a fresh pair of edges.
    EachFrame,
    /// Keep the flags. Once both edges are seen no further crossing is recorded.
    Never,
}

impl ResetPolicy {
    pub fn from_flag(reset_each_frame: bool) -> Self {
        if reset_each_frame {
            ResetPolicy::EachFrame
        } else {
            ResetPolicy::Never
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Crossing {
    Left(u32),
    Right(u32),
}

impl Crossing {
    pub fn column(&self) -> u32 {
        match self {
            Crossing::Left(column) | Crossing::Right(column) => *column,
        }
    }
}

/// The outcome of one scan, used by the renderer to place markers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineDetection {
    /// The frame row that was scanned.
    pub row: u32,
    /// Crossings found during this scan, in column order.
    pub crossings: Vec<Crossing>,
    /// Line center after the scan, possibly inherited from earlier frames.
    pub midpoint: u32,
}

pub struct EdgeDetector {
    threshold: Channel,
    policy: ResetPolicy,
    state: EdgeState,
}

impl EdgeDetector {
    pub fn new(threshold: Channel, policy: ResetPolicy) -> Self {
        Self::with_state(threshold, policy, EdgeState::default())
    }

    pub fn with_state(threshold: Channel, policy: ResetPolicy, state: EdgeState) -> Self {
        Self {
            threshold,
            policy,
            state,
        }
    }

    pub fn state(&self) -> &EdgeState {
        &self.state
    }

    /// Applies the reset policy. Called once per frame before `scan`.
    pub fn begin_frame(&mut self) {
        if self.policy == ResetPolicy::EachFrame {
            self.state.left_seen = false;
            self.state.right_seen = false;
        }
    }

    /// Runs the two-flag state machine over `scanline`.
    pub fn scan(&mut self, scanline: &Scanline) -> LineDetection {
        let threshold = self.threshold;
        let mut crossings = Vec::new();

        for (column, pixel) in scanline.pixels().enumerate() {
            let column = column as u32;
            let state = &mut self.state;

            if pixel.is_tape(threshold) && !state.left_seen {
                state.point1 = column;
                state.left_seen = true;
                state.right_seen = false;
                crossings.push(Crossing::Left(column));
            }

            if pixel.is_off_tape(threshold) && state.left_seen && !state.right_seen {
                state.point2 = column;
                state.right_seen = true;
                crossings.push(Crossing::Right(column));
            }

            state.midpoint = (state.point1 + state.point2) / 2;
        }

        LineDetection {
            row: scanline.row,
            crossings,
            midpoint: self.state.midpoint,
        }
    }

    /// Convenience for callers that have a frame rather than a scanline.
    pub fn detect(&mut self, frame: &Frame, row_fraction: f64) -> LineDetection {
        let scanline = scanline::sample(frame, row_fraction);
        self.begin_frame();
        self.scan(&scanline)
    }
}

impl Default for EdgeDetector {
    fn default() -> Self {
        Self::new(DEFAULT_THRESHOLD, ResetPolicy::EachFrame)
    }
}
