//! # Slidegen CLI
//!
//! Command-line interface for rendering slides.
//!
//! ## Usage
//!
//! ```bash
//! # Run the HTTP server
//! slidegen serve --listen 0.0.0.0:8080
//!
//! # Render a JSON slide description to PNG
//! slidegen render --input slide.json --output slide.png
//!
//! # Same background colors every time
//! slidegen render --input slide.json --output slide.png --seed 42
//! ```
//!
//! Log verbosity follows `RUST_LOG` (default `slidegen=info,tower_http=info`).

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::time::Duration;

use slidegen::{
    SlideError,
    compose::Renderer,
    json_api::SlideRequest,
    server::{self, ServerConfig},
    text::FontLibrary,
};
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Slidegen - render structured slide descriptions to PNG
#[derive(Parser, Debug)]
#[command(name = "slidegen")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Serve the slide API over HTTP
    Serve {
        /// Address to listen on
        #[arg(long, default_value = "0.0.0.0:8080")]
        listen: String,

        /// Upper bound on each image or map tile download, in seconds
        #[arg(long, default_value = "10")]
        fetch_timeout_secs: u64,

        /// Font file (TTF/OTF/TTC) to use instead of the system search list
        #[arg(long, value_name = "FILE")]
        font: Option<PathBuf>,
    },

    /// Render one JSON slide description to a PNG file
    Render {
        /// JSON file with the slide description
        #[arg(long, value_name = "FILE")]
        input: PathBuf,

        /// Where to write the PNG
        #[arg(long, value_name = "FILE")]
        output: PathBuf,

        /// Font file (TTF/OTF/TTC) to use instead of the system search list
        #[arg(long, value_name = "FILE")]
        font: Option<PathBuf>,

        /// Seed for the background colors
        #[arg(long)]
        seed: Option<u64>,

        /// Upper bound on each image or map tile download, in seconds
        #[arg(long, default_value = "10")]
        fetch_timeout_secs: u64,
    },
}

fn main() {
    init_tracing();
    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("slidegen=info,tower_http=info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

fn run() -> Result<(), SlideError> {
    let cli = Cli::parse();
    let runtime = tokio::runtime::Runtime::new()?;

    match cli.command {
        Commands::Serve {
            listen,
            fetch_timeout_secs,
            font,
        } => {
            let config = ServerConfig {
                listen_addr: listen,
                fetch_timeout: Duration::from_secs(fetch_timeout_secs),
                font_path: font,
            };
            runtime.block_on(server::serve(config))
        }
        Commands::Render {
            input,
            output,
            font,
            seed,
            fetch_timeout_secs,
        } => {
            let json = std::fs::read_to_string(&input)?;
            let request: SlideRequest = serde_json::from_str(&json)?;
            request.validate()?;

            let fonts = FontLibrary::load(font.as_deref())?;
            let mut renderer = Renderer::live(fonts, Duration::from_secs(fetch_timeout_secs))?;
            if let Some(seed) = seed {
                renderer = renderer.with_seed(seed);
            }

            let png = runtime.block_on(renderer.render(&request))?;
            std::fs::write(&output, &png)?;
            info!(
                input = %input.display(),
                output = %output.display(),
                bytes = png.len(),
                "slide written"
            );
            Ok(())
        }
    }
}
