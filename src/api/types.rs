//! API response and query types.

use serde::{Deserialize, Serialize};

use crate::config::ScenarioConfig;
use crate::env::summary::EpisodeSummary;
use crate::env::types::StepInfo;

/// Combined state response: config, summaries, and latest step record.
#[derive(Debug, Serialize)]
pub struct StateResponse {
    pub config: ScenarioConfig,
    pub summaries: Vec<EpisodeSummary>,
    /// Most recent record; `null` when the run recorded nothing.
    pub latest_step: Option<StepInfo>,
}

/// Optional filters for the info endpoint.
#[derive(Debug, Default, Deserialize)]
pub struct InfoQuery {
    /// First step (inclusive).
    pub from: Option<usize>,
    /// Last step (inclusive).
    pub to: Option<usize>,
    /// Restrict to one episode.
    pub episode: Option<usize>,
}

/// Error response body for 400-class errors.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Human-readable error message.
    pub error: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_run_serializes_null_latest_step() {
        let resp = StateResponse {
            config: ScenarioConfig::baseline(),
            summaries: Vec::new(),
            latest_step: None,
        };
        let json = serde_json::to_value(&resp).unwrap();
        assert!(json["latest_step"].is_null());
        assert_eq!(json["config"]["battery"]["capacity_mwh"], 4.0);
        assert_eq!(json["config"]["environment"]["episode_length"], 288);
    }
}
