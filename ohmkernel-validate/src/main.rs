//! OhmKernel validation CLI
//!
//! Measure the statistical properties of the resistor model on long captures.
//!
//! # Usage
//!
//! ```bash
//! # Run all validation suites
//! ohmkernel-validate
//!
//! # Run one suite or one case
//! ohmkernel-validate run --suite noise
//! ohmkernel-validate run --suite noise --case carbon_100k
//!
//! # List available cases
//! ohmkernel-validate list
//! ```

use clap::{Parser, Subcommand};
use colored::Colorize;
use ohmkernel::units::format_resistance;
use ohmkernel_validate::{
    config::ValidationConfig,
    report::ValidationReport,
    runner::ValidationRunner,
};
use simple_logger::SimpleLogger;
use std::collections::BTreeMap;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "ohmkernel-validate")]
#[command(about = "Validate ohmkernel resistor drift and noise statistics")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Path to validation config YAML
    #[arg(short, long, default_value = "validate.yaml")]
    config: PathBuf,

    /// Override the configured seed
    #[arg(long)]
    seed: Option<u64>,

    /// Output JSON report path
    #[arg(long)]
    report: Option<PathBuf>,

    /// Show detailed metrics table
    #[arg(long, short = 'd')]
    detailed: bool,

    /// Log progress (repeat for more detail)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Run validation checks
    Run {
        /// Suite to run (or 'all')
        #[arg(short, long, default_value = "all")]
        suite: String,

        /// Specific case to run within the suite
        #[arg(short = 'k', long)]
        case: Option<String>,
    },

    /// List available suites and cases
    List,

    /// Write the default validation config
    Init,

    /// Render a case's resistance deviation to a WAV file
    Render {
        suite: String,
        case: String,

        /// Output WAV path
        #[arg(short, long, default_value = "deviation.wav")]
        output: PathBuf,

        /// Length in seconds
        #[arg(long, default_value = "5.0")]
        seconds: f64,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Info,
        _ => log::LevelFilter::Debug,
    };
    SimpleLogger::new().with_level(level).init()?;

    match &cli.command {
        Some(Commands::List) => list_cases(&cli)?,
        Some(Commands::Init) => init_config(&cli)?,
        Some(Commands::Run { suite, case }) => run_validation(&cli, suite, case.as_deref())?,
        Some(Commands::Render { suite, case, output, seconds }) => {
            render(&cli, suite, case, output, *seconds)?
        }
        None => run_validation(&cli, "all", None)?,
    }

    Ok(())
}

fn load_config(cli: &Cli) -> anyhow::Result<ValidationConfig> {
    let mut config = if cli.config.exists() {
        log::debug!("loading {}", cli.config.display());
        ValidationConfig::load(&cli.config)?
    } else {
        println!("  {} Config not found, using defaults", "⚠".yellow());
        ValidationConfig::default_config()
    };
    if let Some(seed) = cli.seed {
        config.global.seed = seed;
    }
    Ok(config)
}

fn run_validation(cli: &Cli, suite: &str, case: Option<&str>) -> anyhow::Result<()> {
    println!("{} Loading configuration...", "▶".blue());
    let config = load_config(cli)?;
    let runner = ValidationRunner::new(config.clone());

    println!(
        "{} Running validation at {} Hz, seed {}...\n",
        "▶".blue(),
        config.global.sample_rate,
        config.global.seed
    );

    let results = if suite == "all" {
        runner.run_all()
    } else {
        let suite_config = config
            .suites
            .get(suite)
            .ok_or_else(|| anyhow::anyhow!("Suite '{}' not found", suite))?;

        let suite_to_run = if let Some(case_name) = case {
            let case_config = suite_config
                .cases
                .get(case_name)
                .ok_or_else(|| anyhow::anyhow!("Case '{}' not found in suite '{}'", case_name, suite))?;

            let mut filtered = suite_config.clone();
            filtered.cases.clear();
            filtered.cases.insert(case_name.to_string(), case_config.clone());
            filtered
        } else {
            suite_config.clone()
        };

        let mut results = BTreeMap::new();
        results.insert(suite.to_string(), runner.run_suite(suite, &suite_to_run));
        results
    };

    let report = ValidationReport::new(results, config.global.sample_rate, config.global.seed);
    report.print_summary();

    if cli.detailed {
        report.print_detailed();
    }

    if let Some(ref path) = cli.report {
        report.save_json(path)?;
        println!("Report saved to: {}", path.display());
    }

    if report.summary.failed > 0 {
        std::process::exit(1);
    }

    Ok(())
}

fn list_cases(cli: &Cli) -> anyhow::Result<()> {
    let config = load_config(cli)?;

    println!("{}", "Available Validation Suites".bold());
    println!("{}", "─".repeat(50));

    for (suite_name, suite) in &config.suites {
        println!("\n{} - {}", suite_name.bold().blue(), suite.description.dimmed());

        for (case_name, case) in &suite.cases {
            println!("  • {} - {}", case_name.green(), case.description.dimmed());
            let resistance = case
                .resistance
                .ohms()
                .map(format_resistance)
                .unwrap_or_else(|e| e.to_string());
            println!("    Part:   {} {} at {} °C", resistance, case.material, case.temperature);
            println!(
                "    Checks: {}",
                case.checks.iter().map(|c| c.label()).collect::<Vec<_>>().join(", ")
            );
        }
    }

    Ok(())
}

fn init_config(cli: &Cli) -> anyhow::Result<()> {
    let config = ValidationConfig::default_config();
    let yaml = serde_yaml::to_string(&config)?;

    let path = &cli.config;
    std::fs::write(path, &yaml)?;

    println!("{} Created default config at: {}", "✓".green(), path.display());
    println!("\nEdit this file to add your own cases and tolerances.");

    Ok(())
}

fn render(cli: &Cli, suite: &str, case: &str, output: &PathBuf, seconds: f64) -> anyhow::Result<()> {
    let config = load_config(cli)?;
    let samples = (seconds.max(0.0) * config.global.sample_rate) as usize;
    let runner = ValidationRunner::new(config);

    println!("{} Rendering {}/{} ({} samples)...", "▶".blue(), suite, case, samples);
    let trace = runner.render_case(suite, case, samples, output)?;

    let min = trace.iter().copied().fold(f64::INFINITY, f64::min);
    let max = trace.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    println!("{} Wrote {}", "✓".green(), output.display());
    println!("  Range: {:.6} Ω … {:.6} Ω", min, max);

    Ok(())
}
