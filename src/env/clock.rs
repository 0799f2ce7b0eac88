//! Episode step counting and length resolution.

use std::fmt;

use serde::{Deserialize, Serialize, Serializer};

/// Simulation steps per hour (five-minute steps).
pub const STEPS_PER_HOUR: u32 = 12;

/// Requested episode length: a fixed step count or the whole series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(try_from = "EpisodeLengthRepr")]
pub enum EpisodeLength {
    /// Exactly this many steps (must be >= 1).
    Steps(usize),
    /// Run from `episode_start` to the end of the available series.
    Maximum,
}

impl EpisodeLength {
    /// Resolves the concrete step count against the remaining series length.
    pub fn resolve(self, available: usize) -> usize {
        match self {
            Self::Steps(n) => n,
            Self::Maximum => available,
        }
    }
}

impl Default for EpisodeLength {
    fn default() -> Self {
        Self::Steps(288)
    }
}

impl fmt::Display for EpisodeLength {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Steps(n) => write!(f, "{n}"),
            Self::Maximum => f.write_str("maximum"),
        }
    }
}

impl Serialize for EpisodeLength {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Steps(n) => serializer.serialize_u64(*n as u64),
            Self::Maximum => serializer.serialize_str("maximum"),
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum EpisodeLengthRepr {
    Steps(usize),
    Keyword(String),
}

impl TryFrom<EpisodeLengthRepr> for EpisodeLength {
    type Error = String;

    fn try_from(repr: EpisodeLengthRepr) -> Result<Self, Self::Error> {
        match repr {
            EpisodeLengthRepr::Steps(n) => Ok(Self::Steps(n)),
            EpisodeLengthRepr::Keyword(k) if k == "maximum" => Ok(Self::Maximum),
            EpisodeLengthRepr::Keyword(k) => Err(format!(
                "episode_length must be a step count or \"maximum\", got \"{k}\""
            )),
        }
    }
}

/// Tracks the step index within one episode.
///
/// # Examples
///
/// ```
/// use battery_env::env::clock::EpisodeClock;
///
/// let mut clock = EpisodeClock::new(3);
/// assert!(!clock.is_last());
/// clock.advance();
/// clock.advance();
/// assert!(clock.is_last());
/// assert_eq!(clock.current(), 2);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EpisodeClock {
    current: usize,
    length: usize,
}

impl EpisodeClock {
    /// Creates a clock at step 0 of an episode of `length` steps.
    pub fn new(length: usize) -> Self {
        Self { current: 0, length }
    }

    /// Current step index (zero-based).
    pub fn current(&self) -> usize {
        self.current
    }

    /// Total steps in the episode.
    pub fn length(&self) -> usize {
        self.length
    }

    /// Returns `true` on the terminal step (`current == length - 1`).
    pub fn is_last(&self) -> bool {
        self.current + 1 >= self.length
    }

    /// Moves to the next step. Saturates on the terminal step.
    pub fn advance(&mut self) {
        if !self.is_last() {
            self.current += 1;
        }
    }

    /// Rewinds to step 0.
    pub fn rewind(&mut self) {
        self.current = 0;
    }
}
