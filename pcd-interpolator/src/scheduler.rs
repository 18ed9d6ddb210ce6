use std::{
    any::Any,
    panic::{self, AssertUnwindSafe},
    path::PathBuf,
    sync::{
        atomic::{AtomicBool, Ordering},
        Mutex, PoisonError,
    },
};

use pcd_parser::parsers::ParserProvider;

use crate::{
    cancel::CancelFlag,
    config::RunConfig,
    error::{ConfigError, RunError},
    host::{Host, PROGRESS_LABEL},
    progress::ProgressAggregator,
    task::{run_task, TaskDescriptor, TaskOutcome},
};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub written: usize,
    pub failed: usize,
    pub cancelled: usize,
}

enum TaskStatus {
    Written,
    Failed,
    Cancelled,
}

struct CompletionGuard<'a>(&'a dyn Host);

impl Drop for CompletionGuard<'_> {
    fn drop(&mut self) {
        self.0.signal_complete();
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s
    } else {
        "unknown panic"
    }
}

/// Runs one interpolation task per file on a fixed-size worker pool.
///
/// Files are dispatched largest first so the slowest jobs overlap with the
/// rest of the run. Tasks share nothing but the configuration and the progress
/// counter; a failing task is reported and does not affect its siblings.
pub struct FileScheduler<P> {
    provider: P,
    config: RunConfig,
    threads: usize,
    cancel: &'static CancelFlag,
}

impl<P: ParserProvider> FileScheduler<P> {
    pub fn new(provider: P, config: RunConfig) -> Self {
        Self {
            provider,
            config,
            threads: num_cpus::get(),
            cancel: CancelFlag::global(),
        }
    }

    pub fn with_threads(mut self, threads: usize) -> Self {
        self.threads = threads.max(1);
        self
    }

    pub fn with_cancel_flag(mut self, cancel: &'static CancelFlag) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn threads(&self) -> usize {
        self.threads
    }

    /// Orders files by descending point count, keeping input order on ties.
    /// The first task is the one whose output is shown to the host.
    pub fn plan(&self, files: &[PathBuf]) -> Vec<TaskDescriptor> {
        let mut tasks: Vec<TaskDescriptor> = files
            .iter()
            .map(|path| {
                let point_count = match self.provider.get_parser(path).point_count() {
                    Ok(count) => count,
                    Err(e) => {
                        log::warn!("could not read point count of {:?}: {}", path, e);
                        0
                    }
                };
                TaskDescriptor {
                    path: path.clone(),
                    point_count,
                    display: false,
                }
            })
            .collect();

        tasks.sort_by(|a, b| b.point_count.cmp(&a.point_count));
        if let Some(first) = tasks.first_mut() {
            first.display = true;
        }
        tasks
    }

    /// Processes every file and blocks until all tasks have finished.
    ///
    /// Run-level failures are reported through the host before returning.
    /// `signal_complete` is emitted exactly once on every path.
    pub fn run(&self, files: &[PathBuf], host: &dyn Host) -> Result<RunSummary, RunError> {
        let _complete = CompletionGuard(host);
        let result = self.dispatch(files, host);
        if let Err(e) = &result {
            log::error!("{}", e);
            host.report_feedback(&e.to_string());
        }
        result
    }

    fn dispatch(&self, files: &[PathBuf], host: &dyn Host) -> Result<RunSummary, RunError> {
        if files.is_empty() {
            return Err(ConfigError::NoInputFiles.into());
        }

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.threads)
            .thread_name(|i| format!("idw-worker-{}", i))
            .build()?;

        let tasks = self.plan(files);
        log::info!(
            "dispatching {} files to {} workers",
            tasks.len(),
            self.threads
        );

        let progress = ProgressAggregator::new(tasks.len());
        let summary = Mutex::new(RunSummary::default());
        let cancel_reported = AtomicBool::new(false);

        pool.scope_fifo(|scope| {
            for task in &tasks {
                let progress = &progress;
                let summary = &summary;
                let cancel_reported = &cancel_reported;
                scope.spawn_fifo(move |_| {
                    let status = self.execute(task, host, progress, cancel_reported);
                    let mut summary = summary.lock().unwrap_or_else(PoisonError::into_inner);
                    match status {
                        TaskStatus::Written => summary.written += 1,
                        TaskStatus::Failed => summary.failed += 1,
                        TaskStatus::Cancelled => summary.cancelled += 1,
                    }
                });
            }
        });

        let summary = summary.into_inner().unwrap_or_else(PoisonError::into_inner);
        log::info!(
            "run finished: {} written, {} failed, {} cancelled",
            summary.written,
            summary.failed,
            summary.cancelled
        );
        Ok(summary)
    }

    fn execute(
        &self,
        task: &TaskDescriptor,
        host: &dyn Host,
        progress: &ProgressAggregator,
        cancel_reported: &AtomicBool,
    ) -> TaskStatus {
        if self.cancel.is_cancelled() {
            Self::report_cancelled(host, cancel_reported);
            return TaskStatus::Cancelled;
        }

        let start = std::time::Instant::now();
        log::info!(
            "start interpolating {:?} ({} points)",
            task.path,
            task.point_count
        );

        let result = panic::catch_unwind(AssertUnwindSafe(|| {
            let parser = self.provider.get_parser(&task.path);
            run_task(parser.as_ref(), &task.path, &self.config, self.cancel)
        }));

        match result {
            Ok(Ok(TaskOutcome::Written(header))) => {
                log::info!(
                    "finish interpolating {:?} in {:?}",
                    task.path,
                    start.elapsed()
                );
                progress.record_completion(host);
                if task.display {
                    host.report_result(&header);
                }
                TaskStatus::Written
            }
            Ok(Ok(TaskOutcome::Cancelled)) => {
                Self::report_cancelled(host, cancel_reported);
                TaskStatus::Cancelled
            }
            Ok(Err(e)) => {
                let message = if e.is_out_of_memory() {
                    format!("out of memory while interpolating {:?}: {}", task.path, e)
                } else {
                    format!("failed to interpolate {:?}: {}", task.path, e)
                };
                log::error!("{}", message);
                host.report_feedback(&message);
                progress.record_completion(host);
                TaskStatus::Failed
            }
            Err(payload) => {
                let message = format!(
                    "interpolation of {:?} panicked: {}",
                    task.path,
                    panic_message(&*payload)
                );
                log::error!("{}", message);
                host.report_feedback(&message);
                progress.record_completion(host);
                TaskStatus::Failed
            }
        }
    }

    fn report_cancelled(host: &dyn Host, cancel_reported: &AtomicBool) {
        if !cancel_reported.swap(true, Ordering::AcqRel) {
            log::info!("operation cancelled");
            host.report_feedback("Operation cancelled.");
            host.report_progress(PROGRESS_LABEL, 0);
        }
    }
}
