//! Append-only log of step records across episodes.

use crate::env::types::StepInfo;

/// Accumulates every [`StepInfo`] a run produces.
///
/// Records are only ever appended. Within an episode they arrive in step
/// order; episodes follow one another.
#[derive(Debug, Clone, Default)]
pub struct EpisodeRecorder {
    records: Vec<StepInfo>,
}

impl EpisodeRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, info: StepInfo) {
        self.records.push(info);
    }

    /// All records in arrival order.
    pub fn records(&self) -> &[StepInfo] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// The most recent record.
    pub fn latest(&self) -> Option<&StepInfo> {
        self.records.last()
    }

    /// Records of one episode, in step order.
    pub fn episode(&self, episode: usize) -> Vec<&StepInfo> {
        self.records.iter().filter(|r| r.episode == episode).collect()
    }

    /// Distinct episode ids in arrival order.
    pub fn episodes(&self) -> Vec<usize> {
        let mut ids: Vec<usize> = Vec::new();
        for r in &self.records {
            if ids.last() != Some(&r.episode) {
                ids.push(r.episode);
            }
        }
        ids
    }

    pub fn into_records(self) -> Vec<StepInfo> {
        self.records
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::env::types::fixtures::step_info;

    fn info(episode: usize, step: usize) -> StepInfo {
        StepInfo {
            episode,
            ..step_info(step)
        }
    }

    #[test]
    fn keeps_arrival_order() {
        let mut rec = EpisodeRecorder::new();
        for step in 0..3 {
            rec.record(info(0, step));
        }
        let steps: Vec<usize> = rec.records().iter().map(|r| r.step).collect();
        assert_eq!(steps, vec![0, 1, 2]);
        assert_eq!(rec.latest().map(|r| r.step), Some(2));
    }

    #[test]
    fn filters_by_episode() {
        let mut rec = EpisodeRecorder::new();
        rec.record(info(0, 0));
        rec.record(info(0, 1));
        rec.record(info(1, 0));
        assert_eq!(rec.episode(0).len(), 2);
        assert_eq!(rec.episode(1).len(), 1);
        assert!(rec.episode(2).is_empty());
        assert_eq!(rec.episodes(), vec![0, 1]);
    }

    #[test]
    fn empty_recorder() {
        let rec = EpisodeRecorder::new();
        assert!(rec.is_empty());
        assert!(rec.latest().is_none());
        assert!(rec.episodes().is_empty());
    }
}
