//! Zonemark - draw rectangular zones over a page image, kept in sync with
//! the `<zone>` elements of an XML file.
//!
//! # Usage
//!
//! ```bash
//! zonemark page.xml
//! zonemark --image scans/p1.png page.xml
//! zonemark --tolerance 3 --side-handles --save page.xml
//! ```

use std::fs::File;
use std::path::PathBuf;
use std::sync::Mutex;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use zonemark::app::App;
use zonemark::config::{
    ConfigFlags, clear_config_flags, global_config_path, load_config_flags, local_override_path,
    parse_flag_tokens, save_config_flags,
};

/// Edit facsimile zones over a page image
#[derive(Parser, Debug)]
#[command(name = "zonemark", version, about, long_about = None)]
struct Cli {
    /// XML file holding the zones
    #[arg(value_name = "FILE")]
    file: PathBuf,

    /// Image to draw zones over (default: first graphic/@url in FILE)
    #[arg(long, value_name = "PATH")]
    image: Option<PathBuf>,

    /// Delay before the caret selects the enclosing zone
    #[arg(long, value_name = "MS")]
    caret_delay: Option<u64>,

    /// Delay before typed markup changes rebuild the zones
    #[arg(long, value_name = "MS")]
    reload_delay: Option<u64>,

    /// Handle hit distance in screen cells
    #[arg(long, value_name = "CELLS")]
    tolerance: Option<i32>,

    /// Initial zoom as a power of two (-6..=6)
    #[arg(long, value_name = "EXP", allow_negative_numbers = true)]
    scale_exp: Option<i32>,

    /// Also grab zones by their edge midpoints
    #[arg(long)]
    side_handles: bool,

    /// Write debug logs to a file
    #[arg(long, value_name = "PATH")]
    log_file: Option<PathBuf>,

    /// Save current command-line flags as defaults in .zonemarkrc
    #[arg(long)]
    save: bool,

    /// Clear saved defaults in .zonemarkrc
    #[arg(long)]
    clear: bool,
}

/// Logs go to stderr at warn unless a log file was given; `RUST_LOG`
/// overrides the level either way.
fn init_tracing(log_file: Option<&PathBuf>) -> Result<()> {
    match log_file {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("Failed to open log file {}", path.display()))?;
            let filter = EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("zonemark=debug"));
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .init();
        }
        None => {
            tracing_subscriber::fmt()
                .with_env_filter(
                    EnvFilter::from_default_env().add_directive(tracing::Level::WARN.into()),
                )
                .with_writer(std::io::stderr)
                .init();
        }
    }
    Ok(())
}

fn main() -> Result<()> {
    let raw_args = std::env::args().collect::<Vec<_>>();
    let cli = Cli::parse();
    let global_path = global_config_path();
    let local_path = local_override_path();
    let cli_flags = parse_flag_tokens(&raw_args);

    if cli.clear {
        clear_config_flags(&global_path)?;
    }
    if cli.save {
        save_config_flags(&global_path, &cli_flags)?;
    }

    let file_flags = if cli.clear {
        ConfigFlags::default()
    } else {
        let global_flags = load_config_flags(&global_path)?;
        let local_flags = load_config_flags(&local_path)?;
        global_flags.union(&local_flags)
    };
    let effective = file_flags.union(&cli_flags);

    init_tracing(effective.log_file.as_ref())?;
    tracing::debug!(?effective, "config merged");

    // Verify file exists
    if !cli.file.exists() {
        anyhow::bail!("File not found: {}", cli.file.display());
    }

    // Run the application
    let mut app = App::new(cli.file)
        .with_image(cli.image)
        .with_config(&effective)
        .with_config_paths(
            Some(global_path),
            local_path.exists().then_some(local_path),
        );

    app.run().context("Application error")
}
