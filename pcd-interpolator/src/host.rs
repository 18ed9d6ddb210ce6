use std::path::Path;

/// Label attached to every progress report.
pub const PROGRESS_LABEL: &str = "Progress";

/// Capabilities the engine needs from whatever application drives it.
pub trait Host: Send + Sync {
    fn report_feedback(&self, message: &str);

    /// `percent` is in `0..=100`.
    fn report_progress(&self, label: &str, percent: u8);

    /// Called once per run with the header path of the output to display.
    fn report_result(&self, path: &Path);

    /// Called exactly once when a run ends, however it ends.
    fn signal_complete(&self);
}
