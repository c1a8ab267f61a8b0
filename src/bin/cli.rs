//! Pricecast CLI - train, evaluate, and query device price models

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use dialoguer::{theme::ColorfulTheme, Input, Select};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};

use pricecast::data::synthetic::{self, SyntheticConfig, SyntheticGenerator};
use pricecast::data::{load_listings, prepare_dataset};
use pricecast::models::{DeviceInput, EstimateResponse};
use pricecast::predictor::DealPredictor;
use pricecast::trainer::{train, TrainingConfig, TrainingReport};

/// Default listings file (relative to project root)
const DEFAULT_DATA_PATH: &str = "data/ED_dataset.csv";
const DEFAULT_MODEL_PATH: &str = "models/pricecast.json";

#[derive(Parser)]
#[command(name = "pricecast")]
#[command(author, version, about = "Device price estimation CLI", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Run in interactive mode
    #[arg(short, long)]
    interactive: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Train and evaluate the price and deal models
    Train {
        /// Path to the listings CSV
        #[arg(long, default_value = DEFAULT_DATA_PATH)]
        data: PathBuf,

        /// Save the trained model to this path
        #[arg(long)]
        model_out: Option<PathBuf>,

        /// Held-out fraction
        #[arg(long, default_value = "0.2")]
        test_ratio: f64,

        /// Trees per forest
        #[arg(long, default_value = "100")]
        trees: usize,

        /// Random seed for the split and both forests
        #[arg(long, default_value = "42")]
        seed: u64,
    },

    /// Estimate price and deal class for one device
    Estimate {
        /// Path to a trained model
        #[arg(long, default_value = DEFAULT_MODEL_PATH)]
        model: PathBuf,

        /// Location code
        #[arg(long)]
        location: f64,

        /// Technical specification score
        #[arg(long)]
        tech_specs: f64,

        /// Brand tier
        #[arg(long)]
        brand: f64,

        /// Device condition (fair or good)
        #[arg(long)]
        condition: String,
    },

    /// Generate a synthetic listings CSV
    Generate {
        /// Number of listings
        #[arg(long, default_value = "200")]
        rows: usize,

        /// Random seed
        #[arg(long, default_value = "42")]
        seed: u64,

        /// Probability that a row loses one cell
        #[arg(long, default_value = "0.05")]
        missing_rate: f64,

        /// Output path
        #[arg(short, long)]
        out: PathBuf,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter("pricecast=warn")
        .init();

    let cli = Cli::parse();

    println!("{}", "Pricecast CLI v0.2.0".cyan().bold());
    println!();

    if cli.interactive {
        run_interactive()?;
    } else if let Some(command) = cli.command {
        match command {
            Commands::Train {
                data,
                model_out,
                test_ratio,
                trees,
                seed,
            } => {
                run_train(&data, model_out.as_deref(), test_ratio, trees, seed)?;
            }
            Commands::Estimate {
                model,
                location,
                tech_specs,
                brand,
                condition,
            } => {
                let input = DeviceInput {
                    location,
                    tech_specs,
                    brand,
                    condition,
                };
                run_estimate(&model, &input)?;
            }
            Commands::Generate {
                rows,
                seed,
                missing_rate,
                out,
            } => {
                run_generate(rows, seed, missing_rate, &out)?;
            }
        }
    } else {
        println!("Use --help for usage information or --interactive for interactive mode.");
    }

    Ok(())
}

fn run_train(
    data: &Path,
    model_out: Option<&Path>,
    test_ratio: f64,
    trees: usize,
    seed: u64,
) -> Result<()> {
    println!("{}: {}", "Training from".green(), data.display());
    println!();

    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .unwrap(),
    );
    pb.set_message("Loading listings...");

    let listings = load_listings(data)
        .with_context(|| format!("Failed to load listings from {:?}", data))?;
    let dataset = prepare_dataset(&listings).context("Failed to prepare dataset")?;

    pb.set_message(format!("Training {} trees per model...", trees));

    let config = TrainingConfig {
        test_ratio,
        n_trees: trees,
        seed,
    };
    let (predictor, report) = train(&dataset, &config)?;

    pb.finish_and_clear();

    println!(
        "{} listings ({} train / {} test)",
        dataset.n_samples(),
        report.train_rows,
        report.test_rows
    );
    println!();

    print_report(&report);

    if let Some(path) = model_out {
        predictor
            .save(path)
            .with_context(|| format!("Failed to save model to {:?}", path))?;
        println!();
        println!("{}: {}", "Model saved".green(), path.display());
    }

    Ok(())
}

fn print_report(report: &TrainingReport) {
    println!(
        "{}",
        "Price Estimation (Random Forest Regressor)".yellow().bold()
    );
    println!(
        "Mean Squared Error for Price Estimation: {:.2}",
        report.regression.mse
    );
    println!(
        "R-squared Score for Price Estimation: {:.2}",
        report.regression.r2
    );
    println!();

    println!(
        "{}",
        "Classification Report for Deal Classification:".yellow().bold()
    );
    println!("{}", report.classification);

    println!("{}", "Feature Importances:".yellow().bold());
    for (i, (name, importance)) in report.importance.iter().enumerate() {
        let bar = "█".repeat((importance * 40.0).round() as usize);
        println!("{:>2}. {:<12} {:.4} {}", i + 1, name, importance, bar);
    }
}

fn run_estimate(model: &Path, input: &DeviceInput) -> Result<()> {
    let predictor = DealPredictor::load(model)
        .with_context(|| format!("Failed to load model from {:?}", model))?;

    let estimate = predictor.estimate(input);
    print_estimate(&estimate);

    Ok(())
}

fn print_estimate(estimate: &EstimateResponse) {
    println!(
        "{}: {:.2}",
        "Estimated price".green().bold(),
        estimate.estimated_price
    );
    println!("{}: {}", "Deal class".green().bold(), estimate.deal_class);
    println!();

    println!("{:>12} {:>12}", "class", "probability");
    println!("{}", "-".repeat(26));
    for class in &estimate.class_probabilities {
        println!("{:>12} {:>11.1}%", class.label, class.probability * 100.0);
    }
}

fn run_generate(rows: usize, seed: u64, missing_rate: f64, out: &Path) -> Result<()> {
    let generator = SyntheticGenerator::new(SyntheticConfig {
        rows,
        seed,
        missing_rate,
    });
    let listings = generator.generate();

    if let Some(parent) = out.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create output directory {:?}", parent))?;
        }
    }
    synthetic::write_csv(&listings, out)
        .with_context(|| format!("Failed to write listings to {:?}", out))?;

    println!(
        "{}: {} listings written to {}",
        "Generated".green(),
        listings.len(),
        out.display()
    );

    Ok(())
}

fn run_interactive() -> Result<()> {
    println!("{}", "Interactive mode".green().bold());
    println!("Type 'quit' to exit.\n");

    let theme = ColorfulTheme::default();

    loop {
        let options = vec![
            "Train a model",
            "Estimate a device",
            "Generate sample data",
            "Quit",
        ];

        let selection = Select::with_theme(&theme)
            .with_prompt("What would you like to do?")
            .items(&options)
            .default(0)
            .interact()?;

        match selection {
            0 => {
                let data: String = Input::with_theme(&theme)
                    .with_prompt("Listings CSV path")
                    .default(DEFAULT_DATA_PATH.to_string())
                    .interact_text()?;

                let model_out: String = Input::with_theme(&theme)
                    .with_prompt("Model output path")
                    .default(DEFAULT_MODEL_PATH.to_string())
                    .interact_text()?;

                println!();
                run_train(
                    Path::new(&data),
                    Some(Path::new(&model_out)),
                    0.2,
                    100,
                    42,
                )?;
                println!();
            }
            1 => {
                let model: String = Input::with_theme(&theme)
                    .with_prompt("Model path")
                    .default(DEFAULT_MODEL_PATH.to_string())
                    .interact_text()?;

                let location: f64 = Input::with_theme(&theme)
                    .with_prompt("Location code")
                    .interact_text()?;

                let tech_specs: f64 = Input::with_theme(&theme)
                    .with_prompt("Tech spec score")
                    .interact_text()?;

                let brand: f64 = Input::with_theme(&theme)
                    .with_prompt("Brand tier")
                    .interact_text()?;

                let condition = Select::with_theme(&theme)
                    .with_prompt("Condition")
                    .items(&["fair", "good"])
                    .default(0)
                    .interact()?;

                let input = DeviceInput {
                    location,
                    tech_specs,
                    brand,
                    condition: if condition == 1 { "good" } else { "fair" }.to_string(),
                };

                println!();
                run_estimate(Path::new(&model), &input)?;
                println!();
            }
            2 => {
                let rows: usize = Input::with_theme(&theme)
                    .with_prompt("Number of listings")
                    .default(200)
                    .interact_text()?;

                let out: String = Input::with_theme(&theme)
                    .with_prompt("Output path")
                    .default(DEFAULT_DATA_PATH.to_string())
                    .interact_text()?;

                println!();
                run_generate(rows, 42, 0.05, Path::new(&out))?;
                println!();
            }
            3 => {
                println!("Goodbye!");
                break;
            }
            _ => {}
        }
    }

    Ok(())
}
