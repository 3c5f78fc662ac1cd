use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use facewatch::analyzer::OnnxAnalyzer;
use facewatch::fetch::{frame_from_image, HttpImageSource};
use facewatch::{models, Config, FaceRegistry};

#[derive(Parser)]
#[command(name = "facewatch", about = "CCTV face registration and identification")]
struct Cli {
    /// Directory containing the ONNX model files (resolved via the
    /// platform cache, downloading on first use, when omitted)
    #[arg(long, global = true)]
    model_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch reference images and verify they register cleanly
    Register {
        /// Reference image URLs; each label is the URL's filename component
        #[arg(required = true)]
        urls: Vec<String>,
    },
    /// Identify faces in a frame image against a set of reference URLs
    Identify {
        /// Reference image URLs to register before matching
        #[arg(short, long = "known", required = true)]
        known: Vec<String>,

        /// Frame image to scan
        frame: PathBuf,

        /// Downscale factor applied to the frame before detection
        #[arg(long)]
        resize_factor: Option<f32>,

        /// Euclidean distance ceiling for a positive match
        #[arg(long)]
        threshold: Option<f32>,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    let mut config = Config::from_env();
    if cli.model_dir.is_some() {
        config.model_dir = cli.model_dir;
    }

    match cli.command {
        Commands::Register { urls } => {
            let mut registry = build_registry(&config)?;
            for url in &urls {
                let label = registry
                    .register_url(url)
                    .with_context(|| format!("registering {url}"))?;
                println!("registered {label}");
            }
            println!("{} known face(s)", registry.len());
        }
        Commands::Identify {
            known,
            frame,
            resize_factor,
            threshold,
        } => {
            if let Some(factor) = resize_factor {
                config.resize_factor = factor;
            }
            if let Some(threshold) = threshold {
                config.match_threshold = threshold;
            }

            let mut registry = build_registry(&config)?;
            for url in &known {
                let label = registry
                    .register_url(url)
                    .with_context(|| format!("registering {url}"))?;
                tracing::info!(label = %label, "registered reference face");
            }

            let img = image::open(&frame)
                .with_context(|| format!("reading frame image {}", frame.display()))?;
            let frame = frame_from_image(img).context("converting frame image")?;

            let results = registry.identify(&frame).context("identifying frame")?;
            println!("{}", serde_json::to_string_pretty(&results)?);
        }
    }

    Ok(())
}

/// Resolve models and wire up the production registry.
fn build_registry(config: &Config) -> Result<FaceRegistry> {
    let scrfd = models::scrfd_model(config.model_dir.as_deref())
        .context("resolving detection model")?;
    let arcface = models::arcface_model(config.model_dir.as_deref())
        .context("resolving recognition model")?;

    let analyzer = OnnxAnalyzer::load(&scrfd.to_string_lossy(), &arcface.to_string_lossy())
        .context("loading ONNX models")?;
    let source = HttpImageSource::new(Duration::from_secs(config.http_timeout_secs))
        .context("building HTTP client")?;

    Ok(FaceRegistry::new(
        Box::new(analyzer),
        Box::new(source),
        config,
    ))
}
