use clap::Parser;
use forms_exporter::runner::{CycleStats, RunArgs, run_once, run_polling};
use std::path::PathBuf;

/// Export Google Forms responses to files or spreadsheets on a schedule
#[derive(Parser, Clone)]
#[command(version)]
struct Args {
    /// Path to the YAML configuration file
    #[arg(short, long, default_value = "config.yml")]
    config: PathBuf,

    /// Directory for file exports (default: the configuration file's directory)
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Run a single export pass and exit instead of polling
    #[arg(long)]
    once: bool,

    /// Quiet mode - only warnings and errors, plus the summary
    #[arg(short, long)]
    quiet: bool,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Initialize tracing based on quiet mode
    use tracing_subscriber::{EnvFilter, FmtSubscriber};
    let filter = if args.quiet {
        EnvFilter::new("forms_exporter=warn")
    } else {
        EnvFilter::new("forms_exporter=info")
    };
    let subscriber = FmtSubscriber::builder().with_env_filter(filter).finish();
    let _ = tracing::subscriber::set_global_default(subscriber);

    let mut run_args = RunArgs::new(args.config.clone());
    run_args.output_dir = args.output_dir.clone();

    if args.once {
        let stats = run_once(run_args).await?;
        print_summary(&stats);
        return Ok(());
    }

    if !args.quiet {
        println!("Forms Exporter");
        println!("==============");
        println!("Config: {}", args.config.display());
        println!("Interval: {}s", run_args.poll_interval.as_secs());
        println!();
    }

    run_polling(run_args).await
}

fn print_summary(stats: &CycleStats) {
    println!();
    println!("Export Summary");
    println!("==============");
    println!("Forms processed: {}", stats.forms_processed);
    println!("Forms exported: {}", stats.forms_exported);
    println!("Forms without data: {}", stats.forms_without_data);
    println!("Forms disabled: {}", stats.forms_disabled);
    println!("Forms failed: {}", stats.forms_failed);
    println!("Rows exported: {}", stats.rows_exported);
    if let Some(max) = stats.max_duration_ms() {
        println!("Slowest form: {}ms", max);
    }
}
