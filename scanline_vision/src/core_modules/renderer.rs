// THEORY:
// The renderer turns a sampled scanline into something a person can read: each
// visible channel becomes an open polyline hanging above the sampled row, where a
// column's height is its intensity times the vertical scale. A black reference line
// marks the row itself. The finished canvas is then scaled uniformly for display.
//
// Two entry points, two targets:
// - `render` never touches the frame it is given; it draws on a clone.
// - `annotate_detection` draws edge markers in place. The pipeline calls it on its own
//   working copy of a video frame, so the markers become part of the frame the plots
//   are drawn over (and, by default, of the saved snapshot).

use crate::core_modules::controls::Toggles;
use crate::core_modules::edge_detector::LineDetection;
use crate::core_modules::frame::Frame;
use crate::core_modules::scanline::{Channel, Scanline};
use image::imageops::{self, FilterType};
use image::{Rgb, RgbImage};
use imageproc::drawing::{draw_hollow_circle_mut, draw_line_segment_mut};

/// Stroke width of plots and the reference line.
pub const STROKE_WIDTH: i32 = 2;
/// Radius of the circles marking tape edges.
pub const MARKER_RADIUS: i32 = 5;
/// Half height of the midpoint tick.
pub const TICK_HALF_HEIGHT: f32 = 10.0;

const WHITE: Rgb<u8> = Rgb([255, 255, 255]);
const BLACK: Rgb<u8> = Rgb([0, 0, 0]);

pub fn channel_color(channel: Channel) -> Rgb<u8> {
    match channel {
        Channel::Red => Rgb([255, 0, 0]),
        Channel::Green => Rgb([0, 255, 0]),
        Channel::Blue => Rgb([0, 0, 255]),
        Channel::Luma => BLACK,
    }
}

/// Plot vertices `(x, row - scale * value)`, with y truncated toward zero the way
/// integer pixel coordinates are. Points above the frame are kept; drawing clips them.
pub fn plot_points(values: &[u8], row: u32, scale: f64) -> Vec<(f32, f32)> {
    values
        .iter()
        .enumerate()
        .map(|(x, &value)| {
            let y = (row as f64 - scale * value as f64) as i32;
            (x as f32, y as f32)
        })
        .collect()
}

/// Draws a segment `width` pixels wide by repeating it at small offsets.
fn draw_thick_segment(canvas: &mut RgbImage, start: (f32, f32), end: (f32, f32), color: Rgb<u8>, width: i32) {
    for dx in 0..width.max(1) {
        for dy in 0..width.max(1) {
            let (dx, dy) = (dx as f32, dy as f32);
            draw_line_segment_mut(canvas, (start.0 + dx, start.1 + dy), (end.0 + dx, end.1 + dy), color);
        }
    }
}

/// Strokes an open polyline through `points`.
pub fn draw_polyline(canvas: &mut RgbImage, points: &[(f32, f32)], color: Rgb<u8>, width: i32) {
    match points {
        [] => {}
        [only] => draw_thick_segment(canvas, *only, *only, color, width),
        _ => {
            for pair in points.windows(2) {
                draw_thick_segment(canvas, pair[0], pair[1], color, width);
            }
        }
    }
}

/// Draws the edge-crossing circles and the midpoint tick in place.
pub fn annotate_detection(image: &mut RgbImage, detection: &LineDetection) {
    let row = detection.row as i32;
    for crossing in &detection.crossings {
        draw_hollow_circle_mut(image, (crossing.column() as i32, row), MARKER_RADIUS, WHITE);
    }

    let x = detection.midpoint as f32;
    let y = detection.row as f32;
    draw_line_segment_mut(image, (x, y - TICK_HALF_HEIGHT), (x, y + TICK_HALF_HEIGHT), WHITE);
}

/// `floor(width * factor) x floor(height * factor)`, never smaller than 1x1.
pub fn resized_dimensions(width: u32, height: u32, factor: f64) -> (u32, u32) {
    let scale = |len: u32| ((len as f64 * factor.max(0.0)).floor() as u32).max(1);
    (scale(width), scale(height))
}

/// Scales the canvas uniformly on both axes.
pub fn resize_canvas(canvas: RgbImage, factor: f64) -> RgbImage {
    let (width, height) = resized_dimensions(canvas.width(), canvas.height(), factor);
    if (width, height) == canvas.dimensions() {
        return canvas;
    }
    imageops::resize(&canvas, width, height, FilterType::Triangle)
}

/// Produces the display canvas for one tick. `frame` is left untouched.
pub fn render(frame: &Frame, scanline: &Scanline, toggles: &Toggles, vertical_scale: f64, resize: f64) -> RgbImage {
    let mut canvas = frame.as_image().clone();

    for channel in Channel::ALL {
        if toggles.is_shown(channel) {
            let points = plot_points(scanline.channel(channel), scanline.row, vertical_scale);
            draw_polyline(&mut canvas, &points, channel_color(channel), STROKE_WIDTH);
        }
    }

    let y = scanline.row as f32;
    draw_thick_segment(&mut canvas, (0.0, y), (frame.width() as f32, y), BLACK, STROKE_WIDTH);

    resize_canvas(canvas, resize)
}
