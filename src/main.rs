//! Battery environment entry point: CLI wiring and scenario-driven runs.

mod cli;

use anyhow::{Context, Result, bail};
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use battery_env::config::ScenarioConfig;
use battery_env::io::export::export_info_csv;
use battery_env::runner::run_scenario;

use crate::cli::Args;

fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(args.verbose);

    let scenario = load_scenario(&args)?;

    #[cfg(feature = "tui")]
    if args.tui {
        let name = args.preset.clone().unwrap_or_else(|| "custom".to_string());
        let app = battery_env::tui::runtime::App::new(scenario, &name)
            .context("failed to build the environment")?;
        return battery_env::tui::run(app).context("TUI crashed");
    }

    let output = run_scenario(&scenario).context("run failed")?;

    if args.steps {
        for r in output.recorder.records() {
            println!("{r}");
        }
        println!();
    }
    for summary in &output.summaries {
        println!("{summary}\n");
    }

    if let Some(path) = &args.info_out {
        export_info_csv(output.recorder.records(), path)
            .with_context(|| format!("failed to write CSV to {}", path.display()))?;
        info!(path = %path.display(), rows = output.recorder.len(), "step records written");
    }

    #[cfg(feature = "api")]
    if args.serve {
        use std::net::SocketAddr;
        use std::sync::Arc;

        let state = Arc::new(battery_env::api::AppState {
            config: scenario,
            summaries: output.summaries,
            records: output.recorder.into_records(),
        });
        let addr = SocketAddr::from(([0, 0, 0, 0], args.port));
        let rt = tokio::runtime::Runtime::new().context("failed to create tokio runtime")?;
        rt.block_on(battery_env::api::serve(state, addr))
            .with_context(|| format!("API server on {addr} failed"))?;
    }

    Ok(())
}

/// `-v` raises the default level; `RUST_LOG` overrides it.
fn init_tracing(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .without_time()
        .compact()
        .init();
}

/// Resolves the scenario: `--scenario`, then `--preset`, then baseline,
/// with command-line overrides applied and the result validated.
fn load_scenario(args: &Args) -> Result<ScenarioConfig> {
    let mut scenario = if let Some(path) = &args.scenario {
        ScenarioConfig::from_toml_file(path)?
    } else if let Some(name) = &args.preset {
        ScenarioConfig::from_preset(name)?
    } else {
        ScenarioConfig::baseline()
    };

    if let Some(path) = &args.series {
        scenario.series.path = Some(path.clone());
    }
    if let Some(seed) = args.seed {
        scenario.series.seed = seed;
        scenario.agent.seed = seed;
    }
    if let Some(episodes) = args.episodes {
        scenario.agent.episodes = episodes;
    }
    if args.verbose >= 2 {
        scenario.environment.verbose = scenario.environment.verbose.max(1);
    }

    let errors = scenario.validate();
    if !errors.is_empty() {
        for e in &errors {
            eprintln!("{e}");
        }
        bail!("{} invalid scenario field(s)", errors.len());
    }
    Ok(scenario)
}
