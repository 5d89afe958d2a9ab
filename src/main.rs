use std::process;

use clap::Parser;
use log::info;

use scrollshot::cdp::CdpDriver;
use scrollshot::output::{output_filename, parse_target_url, write_output};
use scrollshot::{CaptureConfig, Result};

/// Capture a full-length screenshot of a web page.
///
/// The page is scrolled one viewport at a time with fixed and sticky
/// elements hidden, and the captures are stitched into a single PNG in the
/// current directory.
#[derive(Parser)]
#[command(name = "scrollshot", version, about)]
struct Cli {
    /// Page to capture
    url: Option<String>,

    /// Log every tile and timing detail
    #[arg(short, long)]
    verbose: bool,
}

fn init_logging(verbose: bool) {
    let default_filter = if verbose { "scrollshot=debug" } else { "scrollshot=info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .format_target(false)
        .format_timestamp(None)
        .init();
}

fn run(raw_url: &str) -> Result<()> {
    let target = parse_target_url(raw_url)?;
    let filename = output_filename(&target);
    let config = CaptureConfig::default();

    info!("Starting browser for {}", target);
    let driver = CdpDriver::launch(&config)?;
    let shot = scrollshot::capture_full_page(driver, target.as_str(), &config)?;

    let dir = std::env::current_dir()?;
    let path = write_output(&dir, &filename, &shot.png_data)?;
    info!(
        "Saved {} ({}x{}, sha256 {})",
        path.display(),
        shot.width,
        shot.height,
        shot.digest()
    );
    Ok(())
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let Some(url) = cli.url else {
        eprintln!("Error: no URL given.");
        eprintln!("Usage: scrollshot <URL>");
        process::exit(1);
    };

    if let Err(e) = run(&url) {
        eprintln!("[Error] {}", e);
        process::exit(1);
    }
}
