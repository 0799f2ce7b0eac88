//! Drives whole episodes: environment, policy, recorder, and memory.

use std::sync::Arc;

use rand::{SeedableRng, rngs::StdRng};
use tracing::{debug, info};

use crate::config::ScenarioConfig;
use crate::env::engine::BatteryEnv;
use crate::env::summary::EpisodeSummary;
use crate::error::EnvError;
use crate::memory::{AgentMemory, Batch};
use crate::policy::{AnyPolicy, Policy};
use crate::recorder::EpisodeRecorder;

/// Everything a finished run produced.
#[derive(Debug, Clone)]
pub struct RunOutput {
    /// Every step record, across all episodes.
    pub recorder: EpisodeRecorder,
    /// One summary per episode, in order.
    pub summaries: Vec<EpisodeSummary>,
    /// Experiences with discounted returns filled in.
    pub memory: AgentMemory,
    /// Replay batch of up to `memory.batch_size` experiences, sampled with
    /// the agent seed once every episode has been processed.
    pub batch: Batch,
}

/// Builds the environment and policy a scenario describes and runs it.
///
/// # Errors
///
/// Returns the first [`EnvError`] raised while loading the series,
/// constructing the environment, or stepping.
pub fn run_scenario(config: &ScenarioConfig) -> Result<RunOutput, EnvError> {
    let series = Arc::new(config.build_series()?);
    let mut env = BatteryEnv::new(config.battery, config.environment, series)?;
    let agent = &config.agent;
    let mut policy = AnyPolicy::build(
        agent.policy,
        agent.seed,
        agent.charge_below,
        agent.discharge_above,
    );
    let spaces = env.spaces();
    let mut memory = AgentMemory::new(
        config.memory.length,
        spaces.observation,
        spaces.reward,
        config.memory.discount_rate,
    );
    let mut recorder = EpisodeRecorder::new();

    info!(
        policy = policy.name(),
        episodes = agent.episodes,
        steps = env.episode_length(),
        "starting run"
    );
    let summaries = run_episodes(
        &mut env,
        &mut policy,
        agent.episodes,
        &mut recorder,
        &mut memory,
    )?;

    let mut rng = StdRng::seed_from_u64(agent.seed);
    let batch = memory.random_batch(config.memory.batch_size, &mut rng);
    debug!(batch = batch.len(), stored = memory.len(), "replay batch sampled");

    Ok(RunOutput {
        recorder,
        summaries,
        memory,
        batch,
    })
}

/// Runs `episodes` complete episodes of `policy` against `env`.
///
/// Each step is appended to `recorder` and `memory`; returns are computed
/// when an episode ends.
///
/// # Errors
///
/// Propagates any [`EnvError`] from [`BatteryEnv::step`].
pub fn run_episodes<P: Policy>(
    env: &mut BatteryEnv,
    policy: &mut P,
    episodes: usize,
    recorder: &mut EpisodeRecorder,
    memory: &mut AgentMemory,
) -> Result<Vec<EpisodeSummary>, EnvError> {
    let capacity = env.params().capacity_mwh;
    let mut summaries = Vec::with_capacity(episodes);

    for _ in 0..episodes {
        let mut observation = env.reset();
        let action_space = env.spaces().action;
        loop {
            let action = policy.act(&observation, &action_space);
            let outcome = env.step(action)?;
            memory.add_experience(
                observation,
                action,
                outcome.reward,
                outcome.observation,
                outcome.info.step,
                outcome.info.episode,
            );
            recorder.record(outcome.info);
            match outcome.observation {
                Some(next) if !outcome.done => observation = next,
                _ => break,
            }
        }

        memory.process_episode(env.episode());
        let summary = EpisodeSummary::from_records(env.info(), capacity);
        info!(
            episode = summary.episode,
            total_reward = summary.total_reward,
            savings = summary.savings,
            final_charge = summary.final_charge,
            "episode complete"
        );
        summaries.push(summary);
    }

    Ok(summaries)
}
