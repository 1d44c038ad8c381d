// THEORY:
// The `scanline` module turns one row of a frame into four parallel intensity
// sequences: red, green, blue and luma. It is pure extraction. No smoothing, no
// aggregation, no memory between calls; one pass over the row, linear in its width.
//
// The row is chosen by a fraction of the frame height so the slider position keeps
// its meaning when the video resolution changes.

use crate::core_modules::frame::Frame;
use crate::core_modules::pixel::pixel::{Channel as Intensity, Pixel};

/// The four plotted channels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Channel {
    Red,
    Green,
    Blue,
    Luma,
}

impl Channel {
    pub const ALL: [Channel; 4] = [Channel::Red, Channel::Green, Channel::Blue, Channel::Luma];
}

/// One sampled row. All four sequences have exactly `width` entries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Scanline {
    /// The frame row the samples were taken from.
    pub row: u32,
    pub red: Vec<Intensity>,
    pub green: Vec<Intensity>,
    pub blue: Vec<Intensity>,
    pub luma: Vec<Intensity>,
}

impl Scanline {
    fn with_capacity(row: u32, width: usize) -> Self {
        Self {
            row,
            red: Vec::with_capacity(width),
            green: Vec::with_capacity(width),
            blue: Vec::with_capacity(width),
            luma: Vec::with_capacity(width),
        }
    }

    fn push(&mut self, pixel: Pixel) {
        self.red.push(pixel.red);
        self.green.push(pixel.green);
        self.blue.push(pixel.blue);
        self.luma.push(pixel.luma());
    }

    pub fn len(&self) -> usize {
        self.red.len()
    }

    pub fn is_empty(&self) -> bool {
        self.red.is_empty()
    }

    pub fn channel(&self, channel: Channel) -> &[Intensity] {
        match channel {
            Channel::Red => &self.red,
            Channel::Green => &self.green,
            Channel::Blue => &self.blue,
            Channel::Luma => &self.luma,
        }
    }

    /// Rebuilds the BGR pixel at `column`.
    pub fn pixel(&self, column: usize) -> Pixel {
        Pixel::new(self.blue[column], self.green[column], self.red[column])
    }

    /// Pixels left to right.
    pub fn pixels(&self) -> impl Iterator<Item = Pixel> + '_ {
        (0..self.len()).map(move |column| self.pixel(column))
    }
}

/// `floor(fraction * (height - 1))`, with the fraction clamped to [0, 1].
pub fn row_index(height: u32, row_fraction: f64) -> u32 {
    let fraction = row_fraction.clamp(0.0, 1.0);
    (fraction * height.saturating_sub(1) as f64).floor() as u32
}

/// Samples every column of the row selected by `row_fraction`.
pub fn sample(frame: &Frame, row_fraction: f64) -> Scanline {
    let row = row_index(frame.height(), row_fraction);
    let mut scanline = Scanline::with_capacity(row, frame.width() as usize);
    if frame.height() == 0 {
        return scanline;
    }
    for pixel in frame.row(row) {
        scanline.push(pixel);
    }
    scanline
}
