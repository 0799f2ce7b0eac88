//! CSV export of per-step environment records.

use std::fs::File;
use std::io::{self, Write};
use std::path::Path;

use crate::env::types::{Observation, StepInfo};

/// Column header of the info export.
const HEADER: &str = "episode,step,\
                      state_price,state_demand,state_charge,\
                      observation_price,observation_demand,observation_charge,\
                      charge_rate,discharge_rate,reward,\
                      next_state_price,next_state_demand,next_state_charge,\
                      next_observation_price,next_observation_demand,next_observation_charge,\
                      bau_cost,rl_cost,electricity_price,electricity_demand,\
                      net_charge,unbounded_new_charge,bounded_new_charge,\
                      unbounded_rate,gross_rate,rate,losses,adjusted_demand,\
                      old_charge,new_charge,net_stored";

/// Exports step records to a CSV file at the given path.
///
/// Writes a header row followed by one data row per record. Produces
/// deterministic output for identical inputs.
///
/// # Arguments
///
/// * `records` - Step records, usually one episode's `info` log
/// * `path` - Output file path
///
/// # Errors
///
/// Returns an `io::Error` if file creation or writing fails.
pub fn export_info_csv(records: &[StepInfo], path: &Path) -> io::Result<()> {
    let file = File::create(path)?;
    let buf = io::BufWriter::new(file);
    write_info_csv(records, buf)
}

/// Writes step records as CSV to any writer.
///
/// Absent next-state fields (the terminal step) are written as empty cells.
///
/// # Errors
///
/// Returns an `io::Error` if writing fails.
pub fn write_info_csv(records: &[StepInfo], writer: impl Write) -> io::Result<()> {
    let mut wtr = csv::WriterBuilder::new().from_writer(writer);

    wtr.write_record(HEADER.split(',').map(str::trim))?;

    for r in records {
        let mut row = Vec::with_capacity(32);
        row.push(r.episode.to_string());
        row.push(r.step.to_string());
        row.extend(observation_cells(Some(&r.state)));
        row.extend(observation_cells(Some(&r.observation)));
        row.push(num(r.action.charge_rate));
        row.push(num(r.action.discharge_rate));
        row.push(num(r.reward));
        row.extend(observation_cells(r.next_state.as_ref()));
        row.extend(observation_cells(r.next_observation.as_ref()));
        row.extend(
            [
                r.bau_cost,
                r.rl_cost,
                r.electricity_price,
                r.electricity_demand,
                r.net_charge,
                r.unbounded_new_charge,
                r.bounded_new_charge,
                r.unbounded_rate,
                r.gross_rate,
                r.rate,
                r.losses,
                r.adjusted_demand,
                r.old_charge,
                r.new_charge,
                r.net_stored,
            ]
            .map(num),
        );
        wtr.write_record(&row)?;
    }

    wtr.flush()?;
    Ok(())
}

fn num(v: f64) -> String {
    format!("{v:.6}")
}

fn observation_cells(obs: Option<&Observation>) -> [String; 3] {
    match obs {
        Some(o) => o.to_array().map(num),
        None => Default::default(),
    }
}
