pub mod controls;
pub mod edge_detector;
pub mod frame;
pub mod pixel;
pub mod renderer;
pub mod scanline;
