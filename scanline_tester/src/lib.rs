// THEORY:
// `scanline_tester` is the OpenCV side of the scanline tools. It implements the two
// seams of `scanline_vision::pipeline` with real hardware-facing code:
// - `capture`: `FrameSource` over a video file, plus Mat <-> Frame conversion.
// - `window`: `Viewer` over a HighGUI window with Row / Scale / resize trackbars.
// - `cli`: argument parsing, config loading and logging set-up shared by both
//   binaries (`line_plot` and `line_follower`).

pub mod capture;
pub mod cli;
pub mod window;
