//! Batch overlay tool: draws saved quadrilateral labels onto copies of the
//! images for visual QA.

use std::path::PathBuf;

use clap::Parser;
use quadlabel::config::{LogLevel, init_logging};
use quadlabel::overlay::run_overlay;

#[derive(Debug, Parser)]
#[command(name = "quadlabel-overlay")]
#[command(about = "Draw saved quadrilateral labels onto copies of the images")]
struct Cli {
    /// Label file written by the annotation session
    #[arg(value_name = "LABELS")]
    labels: PathBuf,

    /// Folder holding the source images
    #[arg(value_name = "IMAGE_DIR")]
    image_dir: PathBuf,

    /// Folder receiving the annotated copies
    #[arg(value_name = "OUTPUT_DIR")]
    output_dir: PathBuf,

    /// Log verbosity (RUST_LOG overrides)
    #[arg(long, value_enum, default_value_t = LogLevel::Info)]
    log_level: LogLevel,
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.log_level);

    match run_overlay(&cli.labels, &cli.image_dir, &cli.output_dir) {
        Ok(report) => {
            for (frame_id, reason) in &report.skipped {
                println!("skipped {}: {}", frame_id, reason);
            }
            println!(
                "{} written, {} skipped",
                report.written.len(),
                report.skipped.len()
            );
        }
        Err(e) => {
            log::error!("{}", e);
            eprintln!("{e}");
            std::process::exit(1);
        }
    }
}
