use crate::capture::{backend, canvas_to_mat};
use image::RgbImage;
use opencv::highgui;
use scanline_vision::config::TrackbarConfig;
use scanline_vision::core_modules::controls::{TRACKBAR_MAX, ViewParams};
use scanline_vision::pipeline::Viewer;
use scanline_vision::ScanError;
use tracing::debug;

pub const ROW_TRACKBAR: &str = "Row";
pub const SCALE_TRACKBAR: &str = "Scale";
pub const RESIZE_TRACKBAR: &str = "resize";

/// A HighGUI window with one trackbar per view parameter.
pub struct HighGuiWindow {
    title: String,
    open: bool,
}

impl HighGuiWindow {
    pub fn open(title: &str, trackbars: &TrackbarConfig) -> Result<Self, ScanError> {
        highgui::named_window(title, highgui::WINDOW_AUTOSIZE).map_err(backend)?;

        for (name, initial) in [
            (ROW_TRACKBAR, trackbars.row),
            (SCALE_TRACKBAR, trackbars.scale),
            (RESIZE_TRACKBAR, trackbars.resize),
        ] {
            highgui::create_trackbar(name, title, None, TRACKBAR_MAX, None).map_err(backend)?;
            highgui::set_trackbar_pos(name, title, initial.clamp(0, TRACKBAR_MAX)).map_err(backend)?;
        }

        Ok(Self {
            title: title.to_string(),
            open: true,
        })
    }

    fn position(&self, trackbar: &str) -> Result<i32, ScanError> {
        highgui::get_trackbar_pos(trackbar, &self.title).map_err(backend)
    }
}

impl Viewer for HighGuiWindow {
    fn read_params(&mut self) -> Result<ViewParams, ScanError> {
        Ok(ViewParams::from_percent(
            self.position(ROW_TRACKBAR)?,
            self.position(SCALE_TRACKBAR)?,
            self.position(RESIZE_TRACKBAR)?,
        ))
    }

    fn present(&mut self, canvas: &RgbImage) -> Result<(), ScanError> {
        let mat = canvas_to_mat(canvas).map_err(backend)?;
        highgui::imshow(&self.title, &mat).map_err(backend)
    }

    fn wait_key(&mut self, delay_ms: i32) -> Result<Option<i32>, ScanError> {
        let key = highgui::wait_key(delay_ms).map_err(backend)?;
        Ok((key >= 0).then_some(key))
    }

    fn close(&mut self) -> Result<(), ScanError> {
        if self.open {
            self.open = false;
            debug!(title = %self.title, "closing windows");
            highgui::destroy_all_windows().map_err(backend)?;
        }
        Ok(())
    }
}

impl Drop for HighGuiWindow {
    fn drop(&mut self) {
        if self.open {
            let _ = highgui::destroy_all_windows();
        }
    }
}
