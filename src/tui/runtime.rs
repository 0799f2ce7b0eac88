//! Episode driver and TUI application state.

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Instant;

use tracing::warn;

use crate::config::ScenarioConfig;
use crate::env::engine::BatteryEnv;
use crate::env::types::{EpisodeStatus, Observation, StepInfo};
use crate::error::EnvError;
use crate::policy::{AnyPolicy, Policy};

/// Maximum number of history entries kept for the rolling chart.
const MAX_HISTORY: usize = 288;

/// Tick interval options in milliseconds (slowest → fastest).
const SPEED_LEVELS_MS: [u64; 6] = [500, 250, 100, 50, 20, 5];

/// Default speed index (100 ms).
const DEFAULT_SPEED_IDX: usize = 2;

/// TUI application state.
pub struct App {
    env: BatteryEnv,
    policy: AnyPolicy,
    /// Observation the policy acts on next; `None` once the episode is done.
    observation: Option<Observation>,
    /// Current scenario configuration (kept for restart/preset switch).
    scenario: ScenarioConfig,
    /// Rolling history of step records for the chart.
    pub history: VecDeque<StepInfo>,
    /// Sum of rewards so far this episode.
    pub cumulative_reward: f64,
    /// Whether the episode is paused.
    pub paused: bool,
    /// Current index into `SPEED_LEVELS_MS`.
    pub speed_idx: usize,
    /// Whether the user has requested quit.
    pub quit: bool,
    /// When the last step was executed.
    pub last_tick: Instant,
    /// Name of the active preset.
    pub preset_name: String,
    /// Last error raised by the environment, if any.
    pub error: Option<String>,
}

impl App {
    /// Creates a new app over `scenario`, labelled `name` in the header.
    ///
    /// # Errors
    ///
    /// Returns an [`EnvError`] if the series cannot be loaded or the
    /// environment rejects the scenario.
    pub fn new(scenario: ScenarioConfig, name: &str) -> Result<Self, EnvError> {
        let (env, policy, observation) = build(&scenario)?;
        Ok(Self {
            env,
            policy,
            observation: Some(observation),
            scenario,
            history: VecDeque::with_capacity(MAX_HISTORY),
            cumulative_reward: 0.0,
            paused: false,
            speed_idx: DEFAULT_SPEED_IDX,
            quit: false,
            last_tick: Instant::now(),
            preset_name: name.to_string(),
            error: None,
        })
    }

    /// Advances the episode by one step if not finished.
    pub fn tick(&mut self) {
        let Some(observation) = self.observation else {
            return;
        };
        let action_space = self.env.spaces().action;
        let action = self.policy.act(&observation, &action_space);
        match self.env.step(action) {
            Ok(outcome) => {
                self.cumulative_reward += outcome.reward;
                self.observation = outcome.observation;
                if self.history.len() >= MAX_HISTORY {
                    self.history.pop_front();
                }
                self.history.push_back(outcome.info);
            }
            Err(e) => {
                warn!(error = %e, "step failed");
                self.error = Some(e.to_string());
                self.observation = None;
            }
        }
    }

    /// Toggles pause/resume.
    pub fn toggle_pause(&mut self) {
        self.paused = !self.paused;
    }

    /// Increases speed (shorter tick interval).
    pub fn speed_up(&mut self) {
        if self.speed_idx + 1 < SPEED_LEVELS_MS.len() {
            self.speed_idx += 1;
        }
    }

    /// Decreases speed (longer tick interval).
    pub fn speed_down(&mut self) {
        if self.speed_idx > 0 {
            self.speed_idx -= 1;
        }
    }

    /// Returns the current tick interval in milliseconds.
    pub fn tick_interval_ms(&self) -> u64 {
        SPEED_LEVELS_MS[self.speed_idx]
    }

    /// Switches to a different preset, resetting episode state.
    ///
    /// Unknown names and presets the environment rejects are ignored.
    pub fn switch_preset(&mut self, name: &str) {
        let Ok(scenario) = ScenarioConfig::from_preset(name) else {
            return;
        };
        self.load(scenario, name);
    }

    /// Restarts the current scenario from the beginning.
    pub fn restart(&mut self) {
        let name = self.preset_name.clone();
        self.load(self.scenario.clone(), &name);
    }

    fn load(&mut self, scenario: ScenarioConfig, name: &str) {
        match build(&scenario) {
            Ok((env, policy, observation)) => {
                self.env = env;
                self.policy = policy;
                self.observation = Some(observation);
                self.scenario = scenario;
                self.history.clear();
                self.cumulative_reward = 0.0;
                self.paused = false;
                self.preset_name = name.to_string();
                self.error = None;
            }
            Err(e) => self.error = Some(e.to_string()),
        }
    }

    /// Index of the next step.
    pub fn timestep(&self) -> usize {
        self.env.current_step() + usize::from(self.env.status() == EpisodeStatus::Done)
    }

    /// Steps per episode.
    pub fn total_steps(&self) -> usize {
        self.env.episode_length()
    }

    /// Stored charge (MWh).
    pub fn charge(&self) -> f64 {
        self.env.charge()
    }

    /// Battery capacity (MWh).
    pub fn capacity(&self) -> f64 {
        self.env.params().capacity_mwh
    }

    /// Name of the active policy.
    pub fn policy_name(&self) -> &'static str {
        self.policy.name()
    }

    /// Returns `true` once the terminal step ran or a step failed.
    pub fn is_finished(&self) -> bool {
        self.observation.is_none()
    }

    /// Returns the most recent step record, if any.
    pub fn last_result(&self) -> Option<&StepInfo> {
        self.history.back()
    }
}

fn build(scenario: &ScenarioConfig) -> Result<(BatteryEnv, AnyPolicy, Observation), EnvError> {
    let series = Arc::new(scenario.build_series()?);
    let mut env = BatteryEnv::new(scenario.battery, scenario.environment, series)?;
    let agent = &scenario.agent;
    let policy = AnyPolicy::build(
        agent.policy,
        agent.seed,
        agent.charge_below,
        agent.discharge_above,
    );
    let observation = env.reset();
    Ok((env, policy, observation))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::env::clock::EpisodeLength;

    fn app(preset: &str) -> App {
        let mut scenario = ScenarioConfig::from_preset(preset).unwrap();
        scenario.environment.episode_length = EpisodeLength::Steps(12);
        App::new(scenario, preset).unwrap()
    }

    #[test]
    fn app_creates_and_ticks() {
        let mut app = app("baseline");
        assert_eq!(app.timestep(), 0);
        assert!(!app.is_finished());

        app.tick();
        assert_eq!(app.timestep(), 1);
        assert_eq!(app.history.len(), 1);
    }

    #[test]
    fn app_finishes_after_total_steps() {
        let mut app = app("baseline");
        for _ in 0..app.total_steps() {
            app.tick();
        }
        assert!(app.is_finished());
        assert_eq!(app.timestep(), 12);
        app.tick(); // should be a no-op
        assert_eq!(app.history.len(), 12);
        assert!(app.error.is_none());
    }

    #[test]
    fn speed_controls_stay_in_bounds() {
        let mut app = app("baseline");
        for _ in 0..10 {
            app.speed_down();
        }
        assert_eq!(app.speed_idx, 0);
        for _ in 0..10 {
            app.speed_up();
        }
        assert_eq!(app.speed_idx, SPEED_LEVELS_MS.len() - 1);
    }

    #[test]
    fn switch_preset_resets_state() {
        let mut app = app("baseline");
        app.tick();
        app.tick();
        app.switch_preset("high_volatility");
        assert_eq!(app.timestep(), 0);
        assert!(app.history.is_empty());
        assert_eq!(app.cumulative_reward, 0.0);
        assert_eq!(app.preset_name, "high_volatility");
    }

    #[test]
    fn unknown_preset_is_ignored() {
        let mut app = app("baseline");
        app.tick();
        app.switch_preset("nope");
        assert_eq!(app.preset_name, "baseline");
        assert_eq!(app.history.len(), 1);
    }

    #[test]
    fn restart_keeps_scenario() {
        let mut app = app("small_battery");
        for _ in 0..5 {
            app.tick();
        }
        app.restart();
        assert_eq!(app.timestep(), 0);
        assert!(app.history.is_empty());
        assert_eq!(app.total_steps(), 12);
        assert_eq!(app.capacity(), 1.0);
    }

    #[test]
    fn cumulative_reward_tracks_history() {
        let mut app = app("baseline");
        for _ in 0..4 {
            app.tick();
        }
        let sum: f64 = app.history.iter().map(|r| r.reward).sum();
        assert!((app.cumulative_reward - sum).abs() < 1e-9);
    }
}
