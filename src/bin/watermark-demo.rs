use std::path::PathBuf;
use std::process;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use watermark_demo_gen::{run, GenerateConfig, OutputFormat, PairOutcome};

#[derive(Parser)]
#[command(
    name = "watermark-demo",
    about = "Generate matched clean/watermarked demo image pairs",
    version,
    after_help = "Set UNSPLASH_ACCESS_KEY to fetch real base images from Unsplash.\n\
                  Without a key (or with --offline) gradient placeholders are used."
)]
struct Cli {
    /// Output directory for images and metadata.json
    #[arg(default_value = "demo/generated")]
    output: PathBuf,

    /// Image format: jpg or webp
    #[arg(short, long, default_value = "jpg")]
    format: String,

    /// Image width in pixels
    #[arg(long, default_value = "800")]
    width: u32,

    /// Image height in pixels
    #[arg(long, default_value = "600")]
    height: u32,

    /// Seed for placeholder synthesis
    #[arg(long, default_value = "42")]
    seed: u64,

    /// Never fetch remote images, always synthesize placeholders
    #[arg(long)]
    offline: bool,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Suppress all non-error output
    #[arg(short, long)]
    quiet: bool,
}

fn main() {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("watermark_demo_gen={default_level}"))
        }))
        .with_writer(std::io::stderr)
        .init();

    let format: OutputFormat = match cli.format.parse() {
        Ok(f) => f,
        Err(e) => {
            eprintln!("Error: {e}");
            process::exit(1);
        }
    };

    if cli.width == 0 || cli.height == 0 {
        eprintln!("Error: Width and height must be non-zero");
        process::exit(1);
    }

    let config = GenerateConfig {
        output_dir: cli.output,
        format,
        size: (cli.width, cli.height),
        seed: cli.seed,
        offline: cli.offline,
    };

    if !cli.quiet {
        if cli.offline {
            eprintln!("Offline mode - all base images will be synthesized");
        }
        eprintln!(
            "Generating {}x{} pairs into {}",
            config.size.0,
            config.size.1,
            config.output_dir.display()
        );
        eprintln!();
    }

    let summary = match run(&config) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Fatal: {e}");
            process::exit(1);
        }
    };

    for outcome in &summary.outcomes {
        print_outcome(outcome, cli.quiet);
    }

    if !cli.quiet {
        eprintln!();
        eprint!("[Summary] Pairs: {}", summary.pairs_written());
        if summary.failed() > 0 {
            eprint!(", Failed: {}", summary.failed());
        }
        eprintln!(" (Metadata: {})", summary.metadata_path.display());
    }

    if summary.failed() > 0 {
        process::exit(1);
    }
}

fn print_outcome(outcome: &PairOutcome, quiet: bool) {
    let filename = outcome.file.file_name().map_or_else(
        || outcome.file.display().to_string(),
        |f| f.to_string_lossy().to_string(),
    );

    if outcome.success {
        if !quiet {
            eprintln!("[OK] {filename}");
        }
    } else {
        eprintln!("[FAIL] {filename}: {}", outcome.message);
    }
}
