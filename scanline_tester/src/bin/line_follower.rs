use clap::Parser;
use scanline_tester::capture::VideoFile;
use scanline_tester::cli::{self, FollowerArgs};
use scanline_tester::window::HighGuiWindow;
use scanline_vision::pipeline::{Mode, PipelineConfig, ScanPipeline};
use tracing::info;

fn main() {
    // --- 1. Argument Parsing & Setup ---
    let args = FollowerArgs::parse();
    let config = cli::init(args.config.as_deref()).unwrap_or_else(|e| cli::fail(e));
    cli::print_banner();

    // --- 2. Video I/O Initialization ---
    let mut source = VideoFile::open(&config.input.video).unwrap_or_else(|e| {
        println!("Oops, capture cannot be created!");
        cli::fail(e)
    });
    println!("Press 'ESC' to quit.. ");

    // --- 3. Window, trackbars and menu ---
    let mut window = HighGuiWindow::open(&config.window.title, &config.trackbars)
        .unwrap_or_else(|e| cli::fail(e));
    cli::print_menu();

    // --- 4. Main Processing Loop ---
    let mut pipeline = ScanPipeline::new(PipelineConfig::from_config(&config, Mode::LineFollower));
    let summary = pipeline.run(&mut source, &mut window).unwrap_or_else(|e| cli::fail(e));

    if let Some(state) = pipeline.edge_state() {
        info!(point1 = state.point1, point2 = state.point2, midpoint = state.midpoint, "last line estimate");
    }
    info!(frames = summary.frames, snapshots = summary.snapshots, stop = ?summary.stop, "processing complete");
}
