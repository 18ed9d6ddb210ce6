use std::sync::{Mutex, PoisonError};

use crate::host::{Host, PROGRESS_LABEL};

#[derive(Debug, Default)]
struct ProgressState {
    completed: usize,
    last_reported: u8,
}

/// Percent of files completed across all workers of a run.
///
/// Incrementing the counter and forwarding the new percentage happen under a
/// single lock, so concurrent completions never lose an update and reports
/// reach the host in counter order.
#[derive(Debug)]
pub struct ProgressAggregator {
    total: usize,
    state: Mutex<ProgressState>,
}

impl ProgressAggregator {
    pub fn new(total: usize) -> Self {
        Self {
            total,
            state: Mutex::new(ProgressState::default()),
        }
    }

    /// Records one finished file and reports the percentage if it changed.
    pub fn record_completion(&self, host: &dyn Host) -> u8 {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        state.completed += 1;
        let percent = (100 * state.completed / self.total.max(1)).min(100) as u8;
        if percent != state.last_reported {
            host.report_progress(PROGRESS_LABEL, percent);
            state.last_reported = percent;
        }
        percent
    }

    #[cfg(test)]
    fn completed(&self) -> usize {
        self.state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .completed
    }
}
