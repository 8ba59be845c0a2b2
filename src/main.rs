use clap::{Parser, Subcommand};
use image_stacker::*;
use instant::Instant;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "stack")]
#[command(about = "Multi-frame image alignment and stacking for noise reduction")]
#[command(version = "0.1.0")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Align every image in a directory to a reference and stack them
    Run {
        /// Directory containing the input images
        #[arg(short, long)]
        input: PathBuf,

        /// Output file for the stacked result
        #[arg(short, long, default_value = "result.png")]
        output: PathBuf,

        /// Pixel reducer (mean or median)
        #[arg(short, long)]
        mode: Option<StackMode>,

        /// Number of alignment workers
        #[arg(short, long)]
        workers: Option<usize>,

        /// Explicit reference image; defaults to the middle of the
        /// sorted directory listing
        #[arg(short, long)]
        reference: Option<PathBuf>,

        /// Configuration file (TOML or JSON)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Output file for a JSON run report
        #[arg(long)]
        report: Option<PathBuf>,
    },

    /// Detect corner feature points in a single image and dump them as JSON
    Features {
        /// Path to the image
        #[arg(short, long)]
        input: PathBuf,

        /// Output file for the detected points
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Configuration file (TOML or JSON)
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    env_logger::Builder::from_default_env()
        .filter_level(match cli.verbose {
            0 => log::LevelFilter::Warn,
            1 => log::LevelFilter::Info,
            2 => log::LevelFilter::Debug,
            _ => log::LevelFilter::Trace,
        })
        .init();

    match cli.command {
        Commands::Run {
            input,
            output,
            mode,
            workers,
            reference,
            config,
            report,
        } => handle_run(input, output, mode, workers, reference, config, report),
        Commands::Features {
            input,
            output,
            config,
        } => handle_features(input, output, config),
    }
}

fn load_config(path: Option<PathBuf>) -> anyhow::Result<StackConfig> {
    let config = match path {
        Some(path) => StackConfig::load_from_file(path)?,
        None => StackConfig::default(),
    };
    config.validate()?;
    Ok(config)
}

/// Sorted listing of the input directory, one entry per regular file.
fn list_images(dir: &PathBuf) -> anyhow::Result<Vec<PathBuf>> {
    let mut files: Vec<PathBuf> = std::fs::read_dir(dir)?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.is_file())
        .collect();
    files.sort();
    if files.is_empty() {
        return Err(anyhow::anyhow!("no input images in {:?}", dir));
    }
    Ok(files)
}

#[allow(clippy::too_many_arguments)]
fn handle_run(
    input: PathBuf,
    output: PathBuf,
    mode: Option<StackMode>,
    workers: Option<usize>,
    reference: Option<PathBuf>,
    config_path: Option<PathBuf>,
    report_path: Option<PathBuf>,
) -> anyhow::Result<()> {
    let mut config = load_config(config_path)?;
    if let Some(mode) = mode {
        config.mode = mode;
    }
    if let Some(workers) = workers {
        config.workers = workers;
    }

    let start = Instant::now();
    let mut files = list_images(&input)?;

    // Reference selection is external policy: the middle of the sorted
    // listing unless the caller names one.
    let reference_path = match reference {
        Some(path) => {
            files.retain(|f| *f != path);
            path
        }
        None => files.remove(files.len() / 2),
    };

    println!("Loading {} images from {:?}...", files.len() + 1, input);
    let mut id = 0u32;
    let reference_image = Arc::new(load_image(&reference_path, id)?);
    validate_image_size(&reference_image, 16)?;

    let mut candidates = Vec::with_capacity(files.len());
    for file in &files {
        id += 1;
        candidates.push(Arc::new(load_image(file, id)?));
    }

    println!(
        "Reference: {} ({}x{})",
        reference_image.filename,
        reference_image.width(),
        reference_image.height()
    );

    let features = find_corner_points(&reference_image, &config);
    let outcomes = run_batch(reference_image.clone(), features, candidates, &config)?;

    let aligned = outcomes.iter().filter(|o| o.is_aligned()).count();
    let rejected = outcomes.len() - aligned;
    println!("Aligned {} of {} candidates", aligned, outcomes.len());

    let mut inputs: Vec<&StackImage> = vec![reference_image.as_ref()];
    inputs.extend(
        outcomes
            .iter()
            .filter(|o| config.include_rejected || o.is_aligned())
            .map(|o| o.image()),
    );

    let result = stack(&inputs, config.mode)?;
    write_image(&output, &result)?;
    println!("Stacked result written to {:?}", output);

    if let Some(report_path) = report_path {
        let report = StackReport {
            reference: reference_image.filename.clone(),
            candidates: outcomes.len(),
            aligned,
            rejected,
            stacked: inputs.len(),
            mode: config.mode,
            elapsed_ms: start.elapsed().as_millis(),
        };
        std::fs::write(&report_path, serde_json::to_string_pretty(&report)?)?;
        println!("Run report saved to {:?}", report_path);
    }

    Ok(())
}

fn handle_features(
    input: PathBuf,
    output: Option<PathBuf>,
    config_path: Option<PathBuf>,
) -> anyhow::Result<()> {
    let config = load_config(config_path)?;

    let image = load_image(&input, 0)?;
    validate_image_size(&image, 16)?;

    let features = find_corner_points(&image, &config);
    for quadrant in Quadrant::ALL {
        println!("{}:", quadrant);
        for (slot, point) in features.quadrant(quadrant).iter().enumerate() {
            println!("  [{}] ({}, {})", slot, point.x, point.y);
        }
    }

    if let Some(output_path) = output {
        let json = serde_json::to_string_pretty(&features)?;
        std::fs::write(&output_path, json)?;
        println!("Feature points saved to {:?}", output_path);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    // No unit tests in main.rs - all tests are in tests/ directory
}
