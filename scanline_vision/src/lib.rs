// THEORY:
// This file is the entry point for the `scanline_vision` library crate. It exposes
// everything the interactive front ends need: the frame model, the scanline sampler,
// the tape edge detector, the renderer, the view controls and the run loop.
//
// Nothing in here talks to a window system or a video decoder. Those live behind the
// `FrameSource` and `Viewer` traits in `pipeline`, which the `scanline_tester` crate
// implements with OpenCV. Keeping the boundary there means the whole per-frame
// behaviour can be exercised in plain unit tests with synthetic frames.

pub mod config;
pub mod core_modules;
pub mod error;
pub mod pipeline;

pub use config::{Config, ConfigError};
pub use error::ScanError;
