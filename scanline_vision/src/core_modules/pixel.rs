// THEORY:
// The `Pixel` module is the smallest unit the scanline tools look at: one sample of a
// three-channel, 8-bit frame. Like every pixel type in this crate it is a "dumb" value
// plus heuristics that need nothing but the pixel itself.
//
// Channel order follows the capture convention (blue, green, red). Frames are stored
// as RGB internally, so conversion happens exactly once, in `Frame::pixel`.
//
// Heuristics living here:
// - Luma: fixed 0.30 R + 0.59 G + 0.11 B weighting, truncated to a byte.
// - Tape tests: the blue/non-blue threshold comparisons used by the edge detector.

pub mod pixel {
    pub type Channel = u8;
    pub type Luma = u8;

    const RED_WEIGHT: f64 = 0.3;
    const GREEN_WEIGHT: f64 = 0.59;
    const BLUE_WEIGHT: f64 = 0.11;

    /// A single BGR sample.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct Pixel {
        /// The blue channel value (0-255).
        pub blue: Channel,
        /// The green channel value (0-255).
        pub green: Channel,
        /// The red channel value (0-255).
        pub red: Channel,
    }

    impl Pixel {
        pub fn new(blue: Channel, green: Channel, red: Channel) -> Self {
            Pixel { blue, green, red }
        }

        pub fn from_rgb(rgb: image::Rgb<u8>) -> Self {
            let [red, green, blue] = rgb.0;
            Pixel { blue, green, red }
        }

        /// Perceived brightness, truncated toward zero and clamped to a byte.
        pub fn luma(&self) -> Luma {
            let value = RED_WEIGHT * self.red as f64
                + GREEN_WEIGHT * self.green as f64
                + BLUE_WEIGHT * self.blue as f64;
            value.clamp(0.0, 255.0) as Luma
        }

        /// True when blue is above `threshold` and both other channels are below it.
        pub fn is_tape(&self, threshold: Channel) -> bool {
            self.blue > threshold && self.green < threshold && self.red < threshold
        }

        /// True when blue has dropped below `threshold`, i.e. we have left the tape.
        pub fn is_off_tape(&self, threshold: Channel) -> bool {
            self.blue < threshold
        }
    }
}
