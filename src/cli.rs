//! Command-line arguments.

use std::path::PathBuf;

use clap::Parser;

/// Grid-connected battery environment: run scripted episodes and report costs.
#[derive(Debug, Parser)]
#[command(author, version, about)]
pub struct Args {
    /// Load the scenario from a TOML file.
    #[clap(long, conflicts_with = "preset")]
    pub scenario: Option<PathBuf>,

    /// Use a built-in preset (baseline, high_volatility, small_battery).
    #[clap(long)]
    pub preset: Option<String>,

    /// Read prices and demand from this CSV instead of the scenario's source.
    #[clap(long, env = "BATTERY_ENV_SERIES")]
    pub series: Option<PathBuf>,

    /// Override the series and policy seeds.
    #[clap(long)]
    pub seed: Option<u64>,

    /// Override the number of episodes.
    #[clap(long)]
    pub episodes: Option<usize>,

    /// Write every step record to this CSV file.
    #[clap(long = "info-out")]
    pub info_out: Option<PathBuf>,

    /// Print one line per step.
    #[clap(long)]
    pub steps: bool,

    /// Raise log verbosity (-v: info, -vv: debug with per-step traces).
    #[clap(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Serve the finished run over HTTP.
    #[cfg(feature = "api")]
    #[clap(long)]
    pub serve: bool,

    /// Port of the HTTP server.
    #[cfg(feature = "api")]
    #[clap(long, default_value = "3000")]
    pub port: u16,

    /// Step through one episode in a live terminal UI.
    #[cfg(feature = "tui")]
    #[clap(long)]
    pub tui: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_when_no_flags() {
        let args = Args::try_parse_from(["battery-env"]).unwrap();
        assert!(args.scenario.is_none());
        assert!(args.preset.is_none());
        assert_eq!(args.verbose, 0);
        assert!(!args.steps);
    }

    #[test]
    fn parses_overrides() {
        let args = Args::try_parse_from([
            "battery-env",
            "--preset",
            "small_battery",
            "--seed",
            "7",
            "--episodes",
            "3",
            "--info-out",
            "out.csv",
            "-vv",
        ])
        .unwrap();
        assert_eq!(args.preset.as_deref(), Some("small_battery"));
        assert_eq!(args.seed, Some(7));
        assert_eq!(args.episodes, Some(3));
        assert_eq!(args.info_out, Some(PathBuf::from("out.csv")));
        assert_eq!(args.verbose, 2);
    }

    #[test]
    fn scenario_and_preset_conflict() {
        assert!(
            Args::try_parse_from(["battery-env", "--scenario", "a.toml", "--preset", "baseline"])
                .is_err()
        );
    }

    #[test]
    fn rejects_non_numeric_seed() {
        assert!(Args::try_parse_from(["battery-env", "--seed", "abc"]).is_err());
    }
}
