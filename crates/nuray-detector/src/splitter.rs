//! Partition of readouts into digitizer events by start time.

use nuray_types::config::ResolvedConfig;

/// Single-linkage clustering of sorted start times: a gap of at least
/// `time_diff` [ns] between consecutive items starts a new event.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EventSplitter {
    time_diff: f64,
}

impl EventSplitter {
    pub fn new(time_diff: f64) -> Self {
        EventSplitter { time_diff }
    }

    pub fn from_config(config: &ResolvedConfig) -> Self {
        Self::new(config.split_event_time_diff)
    }

    pub fn time_diff(&self) -> f64 {
        self.time_diff
    }

    /// Index groups into `start_times`, each group sorted by time and the
    /// groups ordered by their first time. Equal times keep input order.
    pub fn split_times(&self, start_times: &[f64]) -> Vec<Vec<usize>> {
        let mut order: Vec<usize> = (0..start_times.len()).collect();
        order.sort_by(|&a, &b| start_times[a].total_cmp(&start_times[b]));

        let mut groups: Vec<Vec<usize>> = Vec::new();
        let mut previous = f64::NEG_INFINITY;
        for i in order {
            let t = start_times[i];
            match groups.last_mut() {
                Some(group) if t - previous < self.time_diff => group.push(i),
                _ => groups.push(vec![i]),
            }
            previous = t;
        }
        groups
    }

    /// Move `items` into events keyed by `start_time`. Every item lands in
    /// exactly one event.
    pub fn split<T>(&self, items: Vec<T>, start_time: impl Fn(&T) -> f64) -> Vec<Vec<T>> {
        let times: Vec<f64> = items.iter().map(&start_time).collect();
        let groups = self.split_times(&times);
        let mut slots: Vec<Option<T>> = items.into_iter().map(Some).collect();
        groups
            .into_iter()
            .map(|group| group.into_iter().filter_map(|i| slots[i].take()).collect())
            .collect()
    }
}
