use clap::Parser;
use scanline_tester::cli::{self, PlotArgs};
use scanline_tester::window::HighGuiWindow;
use scanline_vision::core_modules::frame::FRAME_LAYOUT;
use scanline_vision::pipeline::{Mode, PipelineConfig, ScanPipeline, StillImage};
use tracing::info;

fn main() {
    // --- 1. Argument Parsing & Setup ---
    let args = PlotArgs::parse();
    let config = cli::init(args.config.as_deref()).unwrap_or_else(|e| cli::fail(e));
    let path = args.image.unwrap_or_else(|| config.input.image.clone());

    // --- 2. Load the still image once ---
    let mut source = StillImage::open(&path).unwrap_or_else(|e| cli::fail(e));
    let frame = source.frame();
    println!("{}", FRAME_LAYOUT);
    println!("{}x{}", frame.height(), frame.width());
    info!(path = %path.display(), rows = frame.height(), cols = frame.width(), "loaded image");

    // --- 3. Window, trackbars and menu ---
    let mut window = HighGuiWindow::open(&config.window.title, &config.trackbars)
        .unwrap_or_else(|e| cli::fail(e));
    cli::print_menu();

    // --- 4. Main Loop ---
    let mut pipeline = ScanPipeline::new(PipelineConfig::from_config(&config, Mode::Still));
    let summary = pipeline.run(&mut source, &mut window).unwrap_or_else(|e| cli::fail(e));

    info!(frames = summary.frames, snapshots = summary.snapshots, "done");
}
