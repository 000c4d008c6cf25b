use std::collections::VecDeque;

pub const DEFAULT_HISTORY_SIZE: usize = 60;
/// Floor for the graph scale, in Mbit/s.
pub const DEFAULT_BASELINE_MAX: f64 = 100.0;

/// Paired rolling windows of rx and tx rates.
///
/// Both windows are pushed together so they always have the same length;
/// once full, the oldest sample is evicted.
#[derive(Debug, Clone, PartialEq)]
pub struct RateHistory {
    rx: VecDeque<f64>,
    tx: VecDeque<f64>,
    capacity: usize,
    baseline: f64,
}

impl Default for RateHistory {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_SIZE, DEFAULT_BASELINE_MAX)
    }
}

impl RateHistory {
    pub fn new(capacity: usize, baseline: f64) -> Self {
        let capacity = capacity.max(1);
        Self {
            rx: VecDeque::with_capacity(capacity),
            tx: VecDeque::with_capacity(capacity),
            capacity,
            baseline,
        }
    }

    pub fn push(&mut self, rx_mbps: f64, tx_mbps: f64) {
        if self.rx.len() == self.capacity {
            self.rx.pop_front();
            self.tx.pop_front();
        }
        self.rx.push_back(rx_mbps);
        self.tx.push_back(tx_mbps);
    }

    pub fn len(&self) -> usize {
        self.rx.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rx.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Oldest first.
    pub fn rx(&self) -> Vec<f64> {
        self.rx.iter().copied().collect()
    }

    pub fn tx(&self) -> Vec<f64> {
        self.tx.iter().copied().collect()
    }

    /// Largest buffered value, never below the baseline.
    pub fn max_rate(&self) -> f64 {
        self.rx
            .iter()
            .chain(self.tx.iter())
            .copied()
            .fold(self.baseline, f64::max)
    }

    pub fn clear(&mut self) {
        self.rx.clear();
        self.tx.clear();
    }
}
