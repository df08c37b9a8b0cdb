use clap::{Args, Parser, Subcommand, ValueEnum};
use pipeline_momentum::config::AppConfig;
use pipeline_momentum::error::AppError;
use pipeline_momentum::telemetry;
use pipeline_momentum::workflows::momentum::{
    run_pipeline, MomentumFramework, MomentumSignal, PipelineError, PipelineOutcome,
    RowErrorPolicy,
};
use std::path::PathBuf;
use tracing::info;

#[derive(Parser, Debug)]
#[command(
    name = "pipeline-momentum",
    about = "Score sales deals against the pipeline momentum rubric and report at-risk deals",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Score the deal table and write the results CSV and Markdown report (default command)
    Run(RunArgs),
    /// Verify the framework bands cover every reachable total exactly once
    Check(CheckArgs),
}

#[derive(Args, Debug, Default)]
struct RunArgs {
    /// Override the configured framework document
    #[arg(long)]
    framework: Option<PathBuf>,
    /// Override the configured deal table
    #[arg(long)]
    deals: Option<PathBuf>,
    /// Override the configured output directory
    #[arg(long)]
    output_dir: Option<PathBuf>,
    /// Report every invalid row before aborting instead of stopping at the first
    #[arg(long)]
    collect_errors: bool,
    /// Skip the per-deal console summary
    #[arg(long)]
    quiet: bool,
    /// Console output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,
}

#[derive(Args, Debug)]
struct CheckArgs {
    /// Override the configured framework document
    #[arg(long)]
    framework: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    #[default]
    Text,
    Json,
}

fn main() {
    if let Err(err) = run_cli() {
        eprintln!("application error: {err}");
        std::process::exit(1);
    }
}

fn run_cli() -> Result<(), AppError> {
    let cli = Cli::parse();
    let config = AppConfig::load()?;
    telemetry::init(&config.telemetry)?;

    match cli.command.unwrap_or_else(|| Command::Run(RunArgs::default())) {
        Command::Run(args) => run_scoring(config, args),
        Command::Check(args) => run_check(config, args),
    }
}

fn run_scoring(config: AppConfig, args: RunArgs) -> Result<(), AppError> {
    let mut pipeline = config.pipeline;
    if let Some(path) = args.framework {
        pipeline.framework_path = path;
    }
    if let Some(path) = args.deals {
        pipeline.deals_path = path;
    }
    if let Some(dir) = args.output_dir {
        pipeline.output_dir = dir;
    }
    if args.collect_errors {
        pipeline.row_errors = RowErrorPolicy::CollectAll;
    }

    let outcome = run_pipeline(&pipeline.paths(), pipeline.row_errors)?;

    match args.format {
        OutputFormat::Json => {
            let report = outcome.report().map_err(PipelineError::from)?;
            println!("{}", serde_json::to_string_pretty(&report.view())?);
        }
        OutputFormat::Text => {
            if !args.quiet {
                render_results(&outcome);
            }
            println!("\nWrote results CSV: {}", outcome.results_path.display());
            println!("Wrote report MD:   {}", outcome.report_path.display());
        }
    }

    Ok(())
}

fn run_check(config: AppConfig, args: CheckArgs) -> Result<(), AppError> {
    let path = args.framework.unwrap_or(config.pipeline.framework_path);
    let framework = MomentumFramework::from_path(&path)?;
    framework.verify_reachable_partition()?;

    let (lowest, highest) = MomentumSignal::reachable_totals();
    info!(framework = framework.name(), "band partition verified");

    println!("{}", framework.name());
    println!("Bands cover every total from {lowest} to {highest} exactly once:");
    for band in framework.bands() {
        println!("- {} ({}): {} to {}", band.label, band.id, band.min, band.max);
    }

    println!("Scored signals:");
    for signal in MomentumSignal::ordered() {
        println!("- {} ({})", signal.label(), signal.key());
    }

    for name in framework.unknown_signals() {
        println!("Warning: unknown signal declared: {name}");
    }
    for signal in framework.undeclared_signals() {
        println!("Warning: signal not declared: {}", signal.key());
    }

    Ok(())
}

fn render_results(outcome: &PipelineOutcome) {
    println!("{}", outcome.framework_name);
    println!("\nResults:");

    for deal in &outcome.deals {
        let scores = deal
            .scores
            .iter()
            .map(|(signal, value)| format!("{}={}", signal.key(), value))
            .collect::<Vec<_>>()
            .join(", ");

        println!("\n---");
        println!("{} | {}", deal.deal_id, deal.deal_name);
        println!("Scores: {}  Total={}", scores, deal.total_score);
        println!("Band: {} ({})", deal.band.label, deal.band.id);
        println!(
            "Weakest signal(s): {} (score {})",
            deal.weakest_signals_joined(),
            deal.weakest_score
        );
    }
}
