// THEORY:
// The `pipeline` module is the top-level API: it owns the interactive state and runs
// the blocking display loop. One tick does, in this order and nothing else:
//
// 1. Pull a frame from the `FrameSource` (stop on end of stream).
// 2. Read the slider values from the `Viewer`.
// 3. Sample the scanline and, for the line follower, run the edge detector.
// 4. Render the display canvas.
// 5. Present it and wait briefly for one key press.
// 6. Dispatch that key through the `KeyMap`.
//
// The two traits are the only way in and out. The OpenCV front ends implement them
// for real windows and video files; the tests implement them with scripted fakes.

use crate::config::{Config, SnapshotSource};
use crate::core_modules::controls::{Action, KeyMap, Toggles, ViewParams};
use crate::core_modules::edge_detector::{EdgeDetector, LineDetection, ResetPolicy};
use crate::core_modules::frame::Frame;
use crate::core_modules::renderer;
use crate::core_modules::scanline::{self, Scanline};
use crate::error::ScanError;
use image::RgbImage;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

// Re-export key data structures for the public API.
pub use crate::core_modules::controls::KEY_ESC;
pub use crate::core_modules::edge_detector::{Crossing, EdgeState};
pub use crate::core_modules::scanline::Channel;

/// Produces the frames the loop works on.
pub trait FrameSource {
    /// The next frame, or `Ok(None)` once the source is exhausted.
    fn next_frame(&mut self) -> Result<Option<Frame>, ScanError>;
}

/// The window the loop presents to and reads input from.
pub trait Viewer {
    /// Current slider values.
    fn read_params(&mut self) -> Result<ViewParams, ScanError>;
    fn present(&mut self, canvas: &RgbImage) -> Result<(), ScanError>;
    /// Waits up to `delay_ms` for a key press. `None` if nothing was pressed.
    fn wait_key(&mut self, delay_ms: i32) -> Result<Option<i32>, ScanError>;
    /// Releases windows and other presentation resources.
    fn close(&mut self) -> Result<(), ScanError>;
}

/// A single decoded image handed out again on every tick.
pub struct StillImage {
    frame: Frame,
}

impl StillImage {
    pub fn new(frame: Frame) -> Self {
        Self { frame }
    }

    pub fn open(path: &Path) -> Result<Self, ScanError> {
        Frame::open(path).map(Self::new)
    }

    pub fn frame(&self) -> &Frame {
        &self.frame
    }
}

impl FrameSource for StillImage {
    fn next_frame(&mut self) -> Result<Option<Frame>, ScanError> {
        Ok(Some(self.frame.clone()))
    }
}

/// Which front end the pipeline is serving.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Plots only. Saves the clean frame.
    Still,
    /// Plots plus the tape edge detector.
    LineFollower,
}

/// Everything needed to run the loop.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub mode: Mode,
    pub snapshot_path: PathBuf,
    pub snapshot_source: SnapshotSource,
    pub key_wait_ms: i32,
    pub threshold: u8,
    pub reset_policy: ResetPolicy,
}

impl PipelineConfig {
    pub fn from_config(config: &Config, mode: Mode) -> Self {
        let (key_wait_ms, snapshot_source) = match mode {
            Mode::Still => (config.window.still_key_wait_ms, SnapshotSource::Clean),
            Mode::LineFollower => (config.window.video_key_wait_ms, config.output.snapshot_source),
        };
        Self {
            mode,
            snapshot_path: config.output.snapshot.clone(),
            snapshot_source,
            key_wait_ms,
            threshold: config.detector.threshold,
            reset_policy: ResetPolicy::from_flag(config.detector.reset_each_frame),
        }
    }
}

/// The result of processing one frame.
#[derive(Debug, Clone)]
pub struct FrameAnalysis {
    pub scanline: Scanline,
    pub detection: Option<LineDetection>,
    /// What `s` would save for this tick.
    pub snapshot: Frame,
    /// What gets presented.
    pub canvas: RgbImage,
}

/// Whether the loop keeps going after a key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Stop,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    Quit,
    EndOfStream,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub frames: u64,
    pub snapshots: u32,
    pub stop: StopReason,
}

/// The main, top-level struct for the scanline tools.
pub struct ScanPipeline {
    config: PipelineConfig,
    toggles: Toggles,
    keys: KeyMap,
    detector: Option<EdgeDetector>,
    snapshots: u32,
}

impl ScanPipeline {
    pub fn new(config: PipelineConfig) -> Self {
        let detector = match config.mode {
            Mode::Still => None,
            Mode::LineFollower => Some(EdgeDetector::new(config.threshold, config.reset_policy)),
        };
        Self {
            config,
            toggles: Toggles::default(),
            keys: KeyMap::default(),
            detector,
            snapshots: 0,
        }
    }

    pub fn with_keys(mut self, keys: KeyMap) -> Self {
        self.keys = keys;
        self
    }

    pub fn toggles(&self) -> &Toggles {
        &self.toggles
    }

    pub fn edge_state(&self) -> Option<&EdgeState> {
        self.detector.as_ref().map(EdgeDetector::state)
    }

    /// Samples, detects and renders one frame.
    pub fn process_frame(&mut self, frame: Frame, params: ViewParams) -> FrameAnalysis {
        let scanline = scanline::sample(&frame, params.row);

        let (detection, annotated) = match self.detector.as_mut() {
            Some(detector) => {
                detector.begin_frame();
                let detection = detector.scan(&scanline);
                let mut annotated = frame.clone();
                renderer::annotate_detection(annotated.as_image_mut(), &detection);
                (Some(detection), Some(annotated))
            }
            None => (None, None),
        };

        let canvas = renderer::render(
            annotated.as_ref().unwrap_or(&frame),
            &scanline,
            &self.toggles,
            params.scale,
            params.resize,
        );

        let snapshot = match (self.config.snapshot_source, annotated) {
            (SnapshotSource::Annotated, Some(annotated)) => annotated,
            _ => frame,
        };

        FrameAnalysis {
            scanline,
            detection,
            snapshot,
            canvas,
        }
    }

    /// Dispatches one key press. `snapshot` is the frame `s` writes.
    pub fn handle_key(&mut self, key: i32, snapshot: &Frame) -> Flow {
        let Some(action) = self.keys.lookup(key) else {
            return Flow::Continue;
        };

        match action {
            Action::Quit => {
                info!("quit requested");
                Flow::Stop
            }
            Action::Save => {
                self.save_snapshot(snapshot);
                Flow::Continue
            }
            Action::Toggle(channel) => {
                let shown = self.toggles.toggle(channel);
                info!(?channel, shown, "toggled channel plot");
                Flow::Continue
            }
        }
    }

    fn save_snapshot(&mut self, snapshot: &Frame) {
        let path = &self.config.snapshot_path;
        match snapshot.save(path) {
            Ok(()) => {
                self.snapshots += 1;
                info!(path = %path.display(), "saved snapshot");
            }
            Err(e) => warn!(error = %e, "snapshot not saved"),
        }
    }

    /// Runs until quit or end of stream, then closes the viewer.
    pub fn run<S, V>(&mut self, source: &mut S, viewer: &mut V) -> Result<RunSummary, ScanError>
    where
        S: FrameSource + ?Sized,
        V: Viewer + ?Sized,
    {
        let outcome = self.drive(source, viewer);
        let closed = viewer.close();
        let summary = outcome?;
        closed?;
        info!(frames = summary.frames, snapshots = summary.snapshots, stop = ?summary.stop, "loop finished");
        Ok(summary)
    }

    fn drive<S, V>(&mut self, source: &mut S, viewer: &mut V) -> Result<RunSummary, ScanError>
    where
        S: FrameSource + ?Sized,
        V: Viewer + ?Sized,
    {
        let mut frames = 0u64;
        let stop = loop {
            let Some(frame) = source.next_frame()? else {
                info!("end of stream");
                break StopReason::EndOfStream;
            };
            frames += 1;

            let params = viewer.read_params()?;
            let analysis = self.process_frame(frame, params);
            debug!(
                frame = frames,
                row = analysis.scanline.row,
                midpoint = analysis.detection.as_ref().map(|d| d.midpoint),
                "processed frame"
            );

            viewer.present(&analysis.canvas)?;
            if let Some(key) = viewer.wait_key(self.config.key_wait_ms)? {
                if self.handle_key(key, &analysis.snapshot) == Flow::Stop {
                    break StopReason::Quit;
                }
            }
        };

        Ok(RunSummary {
            frames,
            snapshots: self.snapshots,
            stop,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;
    use std::collections::VecDeque;

    /// Hands out a fixed list of frames and counts how many were asked for.
    struct ScriptedSource {
        frames: VecDeque<Frame>,
        pulls: usize,
    }

    impl ScriptedSource {
        fn new(frames: Vec<Frame>) -> Self {
            Self {
                frames: frames.into(),
                pulls: 0,
            }
        }
    }

    impl FrameSource for ScriptedSource {
        fn next_frame(&mut self) -> Result<Option<Frame>, ScanError> {
            self.pulls += 1;
            Ok(self.frames.pop_front())
        }
    }

    /// Replays a key script and remembers what it was shown.
    struct ScriptedViewer {
        params: ViewParams,
        keys: VecDeque<Option<i32>>,
        presented: Vec<RgbImage>,
        waits: Vec<i32>,
        closed: bool,
    }

    impl ScriptedViewer {
        fn new(keys: Vec<Option<i32>>) -> Self {
            Self {
                params: ViewParams::default(),
                keys: keys.into(),
                presented: Vec::new(),
                waits: Vec::new(),
                closed: false,
            }
        }
    }

    impl Viewer for ScriptedViewer {
        fn read_params(&mut self) -> Result<ViewParams, ScanError> {
            Ok(self.params)
        }

        fn present(&mut self, canvas: &RgbImage) -> Result<(), ScanError> {
            self.presented.push(canvas.clone());
            Ok(())
        }

        fn wait_key(&mut self, delay_ms: i32) -> Result<Option<i32>, ScanError> {
            self.waits.push(delay_ms);
            Ok(self.keys.pop_front().flatten())
        }

        fn close(&mut self) -> Result<(), ScanError> {
            self.closed = true;
            Ok(())
        }
    }

    struct FailingSource;

    impl FrameSource for FailingSource {
        fn next_frame(&mut self) -> Result<Option<Frame>, ScanError> {
            Err(ScanError::UnsupportedFormat {
                layout: "CV_16UC3".into(),
            })
        }
    }

    fn key(c: char) -> Option<i32> {
        Some(c as i32)
    }

    /// A gray frame with a blue strip over columns 10..50.
    fn taped_frame() -> Frame {
        Frame::from_rgb_image(RgbImage::from_fn(100, 40, |x, _| {
            if (10..50).contains(&x) {
                Rgb([0, 0, 255])
            } else {
                Rgb([90, 90, 90])
            }
        }))
    }

    fn config(mode: Mode, snapshot_path: PathBuf) -> PipelineConfig {
        let mut config = PipelineConfig::from_config(&Config::default(), mode);
        config.snapshot_path = snapshot_path;
        config
    }

    #[test]
    fn quit_stops_on_the_same_tick() {
        for quit in [key('q'), Some(KEY_ESC)] {
            let mut source = ScriptedSource::new(vec![taped_frame(); 5]);
            let mut viewer = ScriptedViewer::new(vec![None, key('x'), quit]);
            let mut pipeline = ScanPipeline::new(config(Mode::LineFollower, "unused.png".into()));

            let summary = pipeline.run(&mut source, &mut viewer).unwrap();

            assert_eq!(summary.stop, StopReason::Quit);
            assert_eq!(summary.frames, 3);
            assert_eq!(source.pulls, 3);
            assert!(viewer.closed);
        }
    }

    #[test]
    fn end_of_stream_is_a_normal_stop() {
        let mut source = ScriptedSource::new(vec![taped_frame(); 3]);
        let mut viewer = ScriptedViewer::new(vec![]);
        let mut pipeline = ScanPipeline::new(config(Mode::LineFollower, "unused.png".into()));

        let summary = pipeline.run(&mut source, &mut viewer).unwrap();

        assert_eq!(summary.stop, StopReason::EndOfStream);
        assert_eq!(summary.frames, 3);
        assert_eq!(viewer.presented.len(), 3);
        assert_eq!(viewer.waits, vec![30, 30, 30]);
        assert!(viewer.closed);
    }

    #[test]
    fn source_errors_propagate_and_still_close_the_viewer() {
        let mut viewer = ScriptedViewer::new(vec![]);
        let mut pipeline = ScanPipeline::new(config(Mode::LineFollower, "unused.png".into()));

        let result = pipeline.run(&mut FailingSource, &mut viewer);

        assert!(matches!(result, Err(ScanError::UnsupportedFormat { .. })));
        assert!(viewer.closed);
    }

    #[test]
    fn still_image_repeats_until_quit() {
        let frame = taped_frame();
        let mut source = StillImage::new(frame.clone());
        let mut viewer = ScriptedViewer::new(vec![None, None, None, key('q')]);
        let mut pipeline = ScanPipeline::new(config(Mode::Still, "unused.png".into()));

        let summary = pipeline.run(&mut source, &mut viewer).unwrap();

        assert_eq!(summary.frames, 4);
        assert_eq!(viewer.waits, vec![10; 4]);
        assert_eq!(source.frame(), &frame);
        assert!(pipeline.edge_state().is_none());
    }

    #[test]
    fn still_save_writes_the_clean_frame_regardless_of_view_state() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("output.png");
        let frame = taped_frame();
        let mut source = StillImage::new(frame.clone());
        let mut viewer = ScriptedViewer::new(vec![key('r'), key('k'), key('s'), key('q')]);
        viewer.params = ViewParams::from_percent(20, 100, 50);
        let mut pipeline = ScanPipeline::new(config(Mode::Still, path.clone()));

        let summary = pipeline.run(&mut source, &mut viewer).unwrap();

        assert_eq!(summary.snapshots, 1);
        assert_eq!(Frame::open(&path).unwrap(), frame);
    }

    #[test]
    fn video_save_writes_the_annotated_frame_by_default() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("output.png");
        let frame = taped_frame();
        let mut source = ScriptedSource::new(vec![frame.clone()]);
        let mut viewer = ScriptedViewer::new(vec![key('s')]);
        let mut pipeline = ScanPipeline::new(config(Mode::LineFollower, path.clone()));

        pipeline.run(&mut source, &mut viewer).unwrap();

        let saved = Frame::open(&path).unwrap();
        assert_ne!(saved, frame);
        // Row 27 = floor(0.7 * 39); circle around the left edge at column 10.
        assert_eq!(*saved.as_image().get_pixel(15, 27), Rgb([255, 255, 255]));
        // Away from the markers the frame is unchanged.
        assert_eq!(saved.as_image().get_pixel(80, 5), frame.as_image().get_pixel(80, 5));
    }

    #[test]
    fn video_save_can_write_the_clean_frame() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("output.png");
        let frame = taped_frame();
        let mut config = config(Mode::LineFollower, path.clone());
        config.snapshot_source = SnapshotSource::Clean;
        let mut pipeline = ScanPipeline::new(config);

        let analysis = pipeline.process_frame(frame.clone(), ViewParams::default());
        pipeline.handle_key('s' as i32, &analysis.snapshot);

        assert_eq!(Frame::open(&path).unwrap(), frame);
    }

    #[test]
    fn failed_save_keeps_the_loop_running() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing-dir").join("output.png");
        let mut source = ScriptedSource::new(vec![taped_frame(); 2]);
        let mut viewer = ScriptedViewer::new(vec![key('s')]);
        let mut pipeline = ScanPipeline::new(config(Mode::Still, path));

        let summary = pipeline.run(&mut source, &mut viewer).unwrap();

        assert_eq!(summary.snapshots, 0);
        assert_eq!(summary.stop, StopReason::EndOfStream);
        assert_eq!(summary.frames, 2);
    }

    #[test]
    fn channel_keys_flip_toggles() {
        let mut pipeline = ScanPipeline::new(config(Mode::Still, "unused.png".into()));
        let frame = taped_frame();

        for c in ['r', 'g', 'b', 'k'] {
            assert_eq!(pipeline.handle_key(c as i32, &frame), Flow::Continue);
        }
        assert_eq!(
            *pipeline.toggles(),
            Toggles {
                red: false,
                green: false,
                blue: false,
                luma: false
            }
        );

        pipeline.handle_key('g' as i32, &frame);
        assert!(pipeline.toggles().green);
        assert_eq!(pipeline.handle_key('z' as i32, &frame), Flow::Continue);
    }

    #[test]
    fn line_follower_tracks_the_tape_each_frame() {
        let mut pipeline = ScanPipeline::new(config(Mode::LineFollower, "unused.png".into()));

        let analysis = pipeline.process_frame(taped_frame(), ViewParams::default());

        let detection = analysis.detection.expect("line follower always detects");
        assert_eq!(detection.crossings, vec![Crossing::Left(10), Crossing::Right(50)]);
        assert_eq!(detection.midpoint, 30);
        assert_eq!(
            pipeline.edge_state().map(|s| (s.point1, s.point2)),
            Some((10, 50))
        );
    }

    #[test]
    fn canvas_follows_the_resize_slider() {
        let mut pipeline = ScanPipeline::new(config(Mode::Still, "unused.png".into()));

        let analysis = pipeline.process_frame(taped_frame(), ViewParams::from_percent(70, 40, 50));

        assert_eq!(analysis.canvas.dimensions(), (50, 20));
        assert_eq!(analysis.scanline.len(), 100);
        assert!(analysis.detection.is_none());
    }

    #[test]
    fn custom_keys_replace_the_defaults() {
        let mut keys = KeyMap::empty();
        keys.bind('x' as i32, Action::Quit);
        let mut source = ScriptedSource::new(vec![taped_frame(); 3]);
        let mut viewer = ScriptedViewer::new(vec![key('q'), key('x')]);
        let mut pipeline = ScanPipeline::new(config(Mode::Still, "unused.png".into())).with_keys(keys);

        let summary = pipeline.run(&mut source, &mut viewer).unwrap();

        assert_eq!(summary.frames, 2);
        assert_eq!(summary.stop, StopReason::Quit);
    }
}
