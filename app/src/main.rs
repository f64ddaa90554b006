use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use husk::{
    load_config, process_batch, save_config, write_redacted, AppConfig, CoverSource, Outcome, RedactionContext,
    Upload,
};
use husk_ocr::OcrEngineType;
use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "husk", version, about = "Cover forbidden text found by OCR in images")]
struct Cli {
    /// Path to the JSON config file
    #[arg(short, long, global = true, env = "HUSK_CONFIG", default_value = "husk.json")]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Scan images and write redacted copies
    Redact {
        /// Override the configured pattern (bare regex or /body/flags)
        #[arg(short, long)]
        pattern: Option<String>,
        /// Cover image: file path, http(s) URL or #rrggbb[aa]
        #[arg(long)]
        cover: Option<CoverSource>,
        /// OCR engine: tesseract or sidecar
        #[arg(long)]
        engine: Option<OcrEngineType>,
        /// Output directory
        #[arg(short, long)]
        out: Option<PathBuf>,
        /// Images to scan
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
    /// Write the effective default config to the config path
    InitConfig,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Command::InitConfig => {
            save_config(&cli.config, &AppConfig::default())
                .with_context(|| format!("writing {}", cli.config.display()))?;
            println!("wrote {}", cli.config.display());
            Ok(())
        }
        Command::Redact {
            pattern,
            cover,
            engine,
            out,
            files,
        } => {
            let mut config = load_config(&cli.config)
                .with_context(|| format!("loading {}", cli.config.display()))?;
            if let Some(pattern) = pattern {
                config.pattern = pattern;
            }
            if let Some(cover) = cover {
                config.cover = cover;
            }
            if let Some(engine) = engine {
                config.ocr_engine = engine;
            }
            if let Some(out) = out {
                config.output_dir = out;
            }
            run_redact(&config, &files)
        }
    }
}

fn run_redact(config: &AppConfig, files: &[PathBuf]) -> Result<()> {
    let ctx = RedactionContext::from_config(config).context("building redaction context")?;

    let mut uploads = Vec::with_capacity(files.len());
    for path in files {
        match Upload::from_path(path) {
            Ok(upload) => uploads.push(upload),
            Err(e) => println!("{}: error: {}", path.display(), e),
        }
    }

    fs::create_dir_all(&config.output_dir)
        .with_context(|| format!("creating {}", config.output_dir.display()))?;

    for report in process_batch(&ctx, &uploads) {
        match report.result {
            Ok(Outcome::Redacted { image, regions }) => {
                match write_redacted(&config.output_dir, &image) {
                    Ok(path) => println!(
                        "{}: redacted {} region(s) -> {}",
                        report.file_name,
                        regions.len(),
                        path.display()
                    ),
                    Err(e) if e.kind() == ErrorKind::AlreadyExists => println!(
                        "{}: error: {} already exists, not overwriting",
                        report.file_name,
                        config.output_dir.join(&image.file_name).display()
                    ),
                    Err(e) => println!("{}: error: writing {}: {}", report.file_name, image.file_name, e),
                }
            }
            Ok(outcome) => println!("{}: {}", report.file_name, outcome.label()),
            Err(e) => println!("{}: error: {}", report.file_name, e),
        }
    }

    ctx.shutdown();
    Ok(())
}
