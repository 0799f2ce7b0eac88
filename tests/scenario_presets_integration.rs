use std::path::PathBuf;
use std::process::Command;

#[derive(Debug)]
struct Totals {
    total_reward: f64,
    savings: f64,
}

#[test]
fn scenario_files_run_via_cli_and_produce_distinct_results() {
    let baseline = run_and_parse(&["--scenario", "scenarios/baseline.toml"]);
    let volatile = run_and_parse(&["--scenario", "scenarios/high_volatility.toml"]);
    let small = run_and_parse(&["--scenario", "scenarios/small_battery.toml"]);

    assert!(
        (baseline.total_reward - volatile.total_reward).abs() > 1.0,
        "expected baseline and high_volatility rewards to differ: baseline={:.3}, high_volatility={:.3}",
        baseline.total_reward,
        volatile.total_reward
    );

    assert!(
        (baseline.savings - small.savings).abs() > 0.01,
        "expected baseline and small_battery savings to differ: baseline={:.3}, small_battery={:.3}",
        baseline.savings,
        small.savings
    );
}

#[test]
fn csv_series_run_exports_step_records() {
    let out = std::env::temp_dir().join(format!("battery-env-cli-{}.csv", std::process::id()));
    let totals = run_and_parse(&[
        "--scenario",
        "scenarios/baseline.toml",
        "--series",
        "data/sample_prices.csv",
        "--info-out",
        out.to_str().expect("temp path should be UTF-8"),
    ]);
    assert!(totals.total_reward < 0.0, "site demand always costs money");

    let text = std::fs::read_to_string(&out).expect("CSV should be written");
    let _ = std::fs::remove_file(&out);
    let mut lines = text.lines();
    let header = lines.next().expect("header row");
    assert!(header.starts_with("episode,step,"));
    assert!(header.contains("bau_cost"));
    assert_eq!(lines.count(), 96);
}

#[test]
fn unknown_preset_fails() {
    let output = Command::new(env!("CARGO_BIN_EXE_battery-env"))
        .args(["--preset", "nonexistent"])
        .current_dir(manifest_dir())
        .output()
        .expect("battery-env process should run");
    assert!(!output.status.success());
}

fn manifest_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
}

fn run_and_parse(args: &[&str]) -> Totals {
    let output = Command::new(env!("CARGO_BIN_EXE_battery-env"))
        .args(args)
        .current_dir(manifest_dir())
        .output()
        .expect("battery-env process should run");

    assert!(
        output.status.success(),
        "run failed for {args:?}: stderr={} ",
        String::from_utf8_lossy(&output.stderr)
    );

    let stdout = String::from_utf8(output.stdout).expect("stdout should be valid UTF-8");
    Totals {
        total_reward: parse_metric(&stdout, "Total reward:"),
        savings: parse_metric(&stdout, "Savings:"),
    }
}

fn parse_metric(stdout: &str, label: &str) -> f64 {
    let line = stdout
        .lines()
        .find(|line| line.trim_start().starts_with(label))
        .unwrap_or_else(|| panic!("missing line `{label}` in output: {stdout}"));

    let raw = line
        .split_once(':')
        .map(|(_, right)| right.trim().trim_start_matches('$'))
        .unwrap_or_else(|| panic!("invalid format for line `{line}`"));

    raw.parse::<f64>()
        .unwrap_or_else(|_| panic!("invalid number in line `{line}`"))
}
