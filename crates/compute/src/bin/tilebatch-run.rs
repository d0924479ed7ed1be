//! tilebatch-run -- drive one tiled launch from the command line.
//!
//! Builds the input `0..N`, applies a named unary transform through the
//! launcher and prints the output as JSON. The launch report goes to the
//! log, or to stdout with `--report`.

use anyhow::Context;
use clap::{Parser, ValueEnum};
use tracing::{info, warn};

use tilebatch_compute::kernel::{Unary, radians};
use tilebatch_compute::Launcher;
use tilebatch_core::{LaunchConfig, LaunchMode, load_dotenv};

// ── CLI ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Transform {
    Double,
    Radians,
    Negate,
}

impl Transform {
    fn apply(self, x: f64) -> f64 {
        match self {
            Transform::Double => x * 2.0,
            Transform::Radians => radians(x),
            Transform::Negate => -x,
        }
    }
}

/// Run an element-wise transform over a tiled PE array.
#[derive(Parser, Debug)]
#[command(name = "tilebatch-run", version, about)]
struct Cli {
    /// Path to a launch config TOML file. Defaults plus TILEBATCH_* env vars when absent.
    #[arg(long, env = "TILEBATCH_CONFIG")]
    config: Option<String>,

    /// Number of work items.
    #[arg(short, long, env = "TILEBATCH_ITEMS", default_value_t = 16)]
    items: usize,

    /// Element function applied to each input.
    #[arg(short, long, value_enum, default_value_t = Transform::Double)]
    transform: Transform,

    /// Force sequential execution regardless of the config.
    #[arg(long)]
    sequential: bool,

    /// Print the launch report alongside the output.
    #[arg(long)]
    report: bool,
}

fn load_config(cli: &Cli) -> anyhow::Result<LaunchConfig> {
    let mut config = match &cli.config {
        Some(path) => match LaunchConfig::from_file(path) {
            Ok(cfg) => {
                info!(path = %path, "loaded launch config");
                cfg
            }
            Err(e) => {
                warn!(error = %e, path = %path, "failed to load config, using env defaults");
                LaunchConfig::from_env()?
            }
        },
        None => LaunchConfig::from_env()?,
    };
    if cli.sequential {
        config.mode = LaunchMode::Sequential;
    }
    Ok(config)
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    load_dotenv();
    let cli = Cli::parse();

    let config = load_config(&cli)?;
    config.log_summary();

    let input: Vec<f64> = (0..cli.items).map(|i| i as f64).collect();
    let mut output = vec![0.0f64; cli.items];
    let transform = cli.transform;
    let kernel = Unary::new(&input, move |x: f64| transform.apply(x));

    let launcher = Launcher::new(config).context("invalid launch config")?;
    let outcome = launcher
        .launch(cli.items, &kernel, &mut output)
        .context("launch failed")?;

    let signalled: usize = outcome.drain_completions().iter().map(Vec::len).sum();
    info!(
        items = cli.items,
        transform = ?cli.transform,
        lanes = outcome.report.total_lanes(),
        completions = signalled,
        "run complete"
    );

    let json = if cli.report {
        serde_json::json!({
            "config": launcher.config().summary(),
            "report": outcome.report,
            "output": output,
        })
    } else {
        serde_json::json!(output)
    };
    println!("{}", serde_json::to_string_pretty(&json)?);
    Ok(())
}
