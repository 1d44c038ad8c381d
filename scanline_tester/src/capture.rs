use opencv::{
    core::{self, Mat, Scalar},
    imgproc,
    prelude::*,
    videoio::{self, VideoCapture},
};
use scanline_vision::core_modules::frame::Frame;
use scanline_vision::pipeline::FrameSource;
use scanline_vision::ScanError;
use image::RgbImage;
use std::path::Path;
use tracing::{debug, info};

/// Maps an OpenCV failure onto the library's error type.
pub fn backend(e: opencv::Error) -> ScanError {
    ScanError::Backend(e.to_string())
}

/// Human-readable Mat type, e.g. `CV_8UC3`.
pub fn layout_of(mat: &Mat) -> String {
    core::type_to_string(mat.typ()).unwrap_or_else(|_| format!("type {}", mat.typ()))
}

/// Converts a BGR `CV_8UC3` Mat into a `Frame`. Any other layout is rejected.
pub fn mat_to_frame(mat: &Mat) -> Result<Frame, ScanError> {
    if mat.typ() != core::CV_8UC3 {
        return Err(ScanError::UnsupportedFormat {
            layout: layout_of(mat),
        });
    }

    // Convert the OpenCV Mat (BGR) to a packed RGB buffer for the library.
    let mut rgb = Mat::default();
    imgproc::cvt_color(mat, &mut rgb, imgproc::COLOR_BGR2RGB, 0).map_err(backend)?;
    let bytes = rgb.data_bytes().map_err(backend)?.to_vec();

    Frame::from_rgb_bytes(mat.cols() as u32, mat.rows() as u32, bytes)
}

/// Converts a rendered RGB canvas into a BGR Mat ready for `imshow`.
pub fn canvas_to_mat(canvas: &RgbImage) -> opencv::Result<Mat> {
    let size = core::Size::new(canvas.width() as i32, canvas.height() as i32);
    let mut rgb = Mat::new_size_with_default(size, core::CV_8UC3, Scalar::all(0.0))?;
    rgb.data_bytes_mut()?.copy_from_slice(canvas.as_raw());

    let mut bgr = Mat::default();
    imgproc::cvt_color(&rgb, &mut bgr, imgproc::COLOR_RGB2BGR, 0)?;
    Ok(bgr)
}

/// Frames decoded from a video file, one per tick.
pub struct VideoFile {
    cap: VideoCapture,
    frame: Mat,
    decoded: u64,
}

impl VideoFile {
    /// Opens `path`. A file OpenCV cannot open is reported as `NotFound`.
    pub fn open(path: &Path) -> Result<Self, ScanError> {
        let not_found = || ScanError::NotFound {
            resource: "Video",
            path: path.display().to_string(),
        };
        let name = path.to_str().ok_or_else(not_found)?;

        let cap = VideoCapture::from_file(name, videoio::CAP_ANY).map_err(|e| {
            debug!(error = %e, "VideoCapture::from_file failed");
            not_found()
        })?;
        if !cap.is_opened().map_err(backend)? {
            return Err(not_found());
        }

        let width = cap.get(videoio::CAP_PROP_FRAME_WIDTH).map_err(backend)?;
        let height = cap.get(videoio::CAP_PROP_FRAME_HEIGHT).map_err(backend)?;
        let fps = cap.get(videoio::CAP_PROP_FPS).map_err(backend)?;
        info!(path = %path.display(), width, height, fps, "opened video");

        Ok(Self {
            cap,
            frame: Mat::default(),
            decoded: 0,
        })
    }
}

impl FrameSource for VideoFile {
    fn next_frame(&mut self) -> Result<Option<Frame>, ScanError> {
        let okay = self.cap.read(&mut self.frame).map_err(backend)?;
        if !okay || self.frame.empty() {
            debug!(decoded = self.decoded, "video exhausted");
            return Ok(None);
        }

        let frame = mat_to_frame(&self.frame)?;
        if self.decoded == 0 {
            info!(layout = %layout_of(&self.frame), rows = frame.height(), cols = frame.width(), "first frame");
        }
        self.decoded += 1;
        Ok(Some(frame))
    }
}
