//! Experience replay for agents learning against the environment.
//!
//! Every experience is kept twice: as observed, and scaled onto the unit
//! interval using the environment's spaces. Discounted returns are filled in
//! on the scaled copy once an episode is processed.

use rand::Rng;
use serde::Serialize;

use crate::env::space::{ContinuousSpace, ObservationSpace};
use crate::env::types::{Action, Observation};

/// One raw transition.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Experience {
    pub observation: Observation,
    pub action: Action,
    pub reward: f64,
    pub next_observation: Option<Observation>,
    pub step: usize,
    pub episode: usize,
}

/// A transition with observation and reward normalised to `[0, 1]`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScaledExperience {
    pub observation: [f64; 3],
    pub action: Action,
    pub reward: f64,
    pub step: usize,
    pub episode: usize,
    /// `None` until [`AgentMemory::process_episode`] runs for this episode.
    pub discounted_return: Option<f64>,
}

/// Aligned arrays for a learner: one row per sampled experience.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Batch {
    pub observations: Vec<[f64; 3]>,
    pub actions: Vec<Action>,
    /// Discounted returns; experiences not yet processed contribute `0.0`.
    pub returns: Vec<f64>,
}

impl Batch {
    pub fn len(&self) -> usize {
        self.observations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }

    fn push(&mut self, exp: &ScaledExperience) {
        self.observations.push(exp.observation);
        self.actions.push(exp.action);
        self.returns.push(exp.discounted_return.unwrap_or(0.0));
    }
}

/// Replay memory bounded, for sampling, to the most recent `memory_length`
/// experiences.
#[derive(Debug, Clone)]
pub struct AgentMemory {
    memory_length: usize,
    observation_space: ObservationSpace,
    reward_space: ContinuousSpace,
    discount_rate: f64,
    experiences: Vec<Experience>,
    scaled: Vec<ScaledExperience>,
}

impl AgentMemory {
    pub fn new(
        memory_length: usize,
        observation_space: ObservationSpace,
        reward_space: ContinuousSpace,
        discount_rate: f64,
    ) -> Self {
        Self {
            memory_length,
            observation_space,
            reward_space,
            discount_rate,
            experiences: Vec::new(),
            scaled: Vec::new(),
        }
    }

    /// Stores one transition and its scaled copy.
    pub fn add_experience(
        &mut self,
        observation: Observation,
        action: Action,
        reward: f64,
        next_observation: Option<Observation>,
        step: usize,
        episode: usize,
    ) {
        let spaces = self.observation_space.components();
        let raw = observation.to_array();
        let scaled_obs = std::array::from_fn(|i| spaces[i].normalize(raw[i]));

        self.scaled.push(ScaledExperience {
            observation: scaled_obs,
            action,
            reward: self.reward_space.normalize(reward),
            step,
            episode,
            discounted_return: None,
        });
        self.experiences.push(Experience {
            observation,
            action,
            reward,
            next_observation,
            step,
            episode,
        });
    }

    /// Fills in `G_t = r_t + γ·G_{t+1}` over the scaled rewards of `episode`.
    pub fn process_episode(&mut self, episode: usize) {
        let mut total = 0.0;
        for exp in self.scaled.iter_mut().rev().filter(|e| e.episode == episode) {
            total = exp.reward + self.discount_rate * total;
            exp.discounted_return = Some(total);
        }
    }

    /// Samples `min(batch_size, len)` experiences with replacement from the
    /// most recent `memory_length`.
    pub fn random_batch<R: Rng + ?Sized>(&self, batch_size: usize, rng: &mut R) -> Batch {
        let start = self.scaled.len().saturating_sub(self.memory_length);
        let window = &self.scaled[start..];
        let mut batch = Batch::default();
        if window.is_empty() {
            return batch;
        }
        for _ in 0..batch_size.min(self.scaled.len()) {
            batch.push(&window[rng.random_range(0..window.len())]);
        }
        batch
    }

    /// All experiences of `episode`, in step order.
    pub fn episode_batch(&self, episode: usize) -> Batch {
        let mut batch = Batch::default();
        for exp in self.scaled.iter().filter(|e| e.episode == episode) {
            batch.push(exp);
        }
        batch
    }

    pub fn experiences(&self) -> &[Experience] {
        &self.experiences
    }

    pub fn scaled_experiences(&self) -> &[ScaledExperience] {
        &self.scaled
    }

    pub fn len(&self) -> usize {
        self.experiences.len()
    }

    pub fn is_empty(&self) -> bool {
        self.experiences.is_empty()
    }

    /// Drops every stored experience.
    pub fn reset(&mut self) {
        self.experiences.clear();
        self.scaled.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{SeedableRng, rngs::StdRng};

    fn memory(length: usize, discount: f64) -> AgentMemory {
        let obs_space = ObservationSpace {
            electricity_price: ContinuousSpace::new(0.0, 100.0),
            electricity_demand: ContinuousSpace::new(0.0, 10.0),
            charge: ContinuousSpace::new(0.0, 4.0),
        };
        AgentMemory::new(length, obs_space, ContinuousSpace::new(-10.0, 0.0), discount)
    }

    fn obs(price: f64) -> Observation {
        Observation {
            electricity_price: price,
            electricity_demand: 5.0,
            charge: 1.0,
        }
    }

    #[test]
    fn scales_observation_and_reward() {
        let mut m = memory(10, 0.9);
        m.add_experience(obs(25.0), Action::IDLE, -5.0, None, 0, 0);
        let s = &m.scaled_experiences()[0];
        assert_eq!(s.observation, [0.25, 0.5, 0.25]);
        assert_eq!(s.reward, 0.5);
        assert!(s.discounted_return.is_none());
        assert_eq!(m.experiences()[0].reward, -5.0);
    }

    #[test]
    fn discounted_returns_run_backwards_within_episode() {
        let mut m = memory(10, 0.5);
        // Scaled rewards: 1.0, 0.5, 0.0
        m.add_experience(obs(0.0), Action::IDLE, 0.0, Some(obs(1.0)), 0, 3);
        m.add_experience(obs(1.0), Action::IDLE, -5.0, Some(obs(2.0)), 1, 3);
        m.add_experience(obs(2.0), Action::IDLE, -10.0, None, 2, 3);
        m.add_experience(obs(0.0), Action::IDLE, 0.0, None, 0, 4);
        m.process_episode(3);

        let batch = m.episode_batch(3);
        assert_eq!(batch.returns, vec![1.25, 0.5, 0.0]);
        assert!(m.scaled_experiences()[3].discounted_return.is_none());
    }

    #[test]
    fn random_batch_respects_size_and_window() {
        let mut m = memory(2, 0.9);
        for step in 0..5 {
            m.add_experience(obs(step as f64 * 10.0), Action::IDLE, -1.0, None, step, 0);
        }
        let mut rng = StdRng::seed_from_u64(1);
        let batch = m.random_batch(32, &mut rng);
        assert_eq!(batch.len(), 5);
        assert!(
            batch
                .observations
                .iter()
                .all(|o| o[0] == 0.3 || o[0] == 0.4)
        );
    }

    #[test]
    fn random_batch_on_empty_memory() {
        let m = memory(10, 0.9);
        let mut rng = StdRng::seed_from_u64(1);
        assert!(m.random_batch(4, &mut rng).is_empty());
    }

    #[test]
    fn reset_clears_everything() {
        let mut m = memory(10, 0.9);
        m.add_experience(obs(1.0), Action::IDLE, -1.0, None, 0, 0);
        m.reset();
        assert!(m.is_empty());
        assert!(m.scaled_experiences().is_empty());
    }
}
