use clap::Parser;
use scanline_vision::core_modules::controls::KeyMap;
use scanline_vision::{Config, ScanError};
use std::path::PathBuf;

/// line_plot: plot one scanline of a still image
#[derive(Debug, Parser)]
#[command(name = "line_plot")]
#[command(about = "Plot the red, green, blue and luma intensities of one image row")]
pub struct PlotArgs {
    /// Image to open (defaults to `[input] image` from the config)
    pub image: Option<PathBuf>,

    /// TOML configuration file
    #[arg(long)]
    pub config: Option<PathBuf>,
}

/// line_follower: plot scanlines of a video and locate the blue tape
#[derive(Debug, Parser)]
#[command(name = "line_follower")]
#[command(about = "Plot one row of every video frame and mark the edges of a blue tape line")]
pub struct FollowerArgs {
    /// TOML configuration file
    #[arg(long)]
    pub config: Option<PathBuf>,
}

/// Loads the configuration and installs the tracing subscriber.
pub fn init(config_path: Option<&std::path::Path>) -> Result<Config, ScanError> {
    let config = Config::load_or_default(config_path)?;

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| config.logging.level.parse().unwrap_or_default()),
        )
        .init();

    Ok(config)
}

/// Course banner printed by `line_follower` before anything else.
pub const BANNER: &str = "EML 6805 Robot Design\n\
                          Florida International University\n\
                          Department of Mechanical and Materials Engineering\n\
                          Susan Zhang <szhan040@fiu.edu>\n\
                          Miami, Spring 2023\n";

pub fn print_banner() {
    println!("{}", BANNER);
}

pub fn print_menu() {
    println!("{}", KeyMap::menu());
}

/// Reports a fatal error on stdout and exits with its code.
pub fn fail(error: ScanError) -> ! {
    println!("{}", error);
    std::process::exit(error.exit_code());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plot_takes_an_optional_image() {
        let args = PlotArgs::try_parse_from(["line_plot"]).unwrap();
        assert!(args.image.is_none());
        assert!(args.config.is_none());

        let args = PlotArgs::try_parse_from(["line_plot", "lab/line2.png", "--config", "lab.toml"]).unwrap();
        assert_eq!(args.image, Some(PathBuf::from("lab/line2.png")));
        assert_eq!(args.config, Some(PathBuf::from("lab.toml")));
    }

    #[test]
    fn banner_lists_course_and_term() {
        let lines: Vec<&str> = BANNER.lines().collect();
        assert_eq!(lines.len(), 5);
        assert_eq!(lines[0], "EML 6805 Robot Design");
        assert_eq!(lines[1], "Florida International University");
        assert_eq!(lines[4], "Miami, Spring 2023");
        // A blank line follows the banner once printed.
        assert!(BANNER.ends_with('\n'));
    }

    #[test]
    fn follower_takes_no_positional_arguments() {
        assert!(FollowerArgs::try_parse_from(["line_follower"]).is_ok());
        assert!(FollowerArgs::try_parse_from(["line_follower", "video.mp4"]).is_err());
    }
}
