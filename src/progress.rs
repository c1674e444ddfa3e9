//! Progress reporting seam.
//!
//! The pipeline reports task creation, byte progress and console lines to a
//! [`ProgressSink`] without knowing how (or whether) they are rendered.
//! [`ConsoleProgress`] draws indicatif bars; [`SilentProgress`] discards
//! everything and is used for quiet runs.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{LazyLock, Mutex, PoisonError};
use std::time::Duration;

use indicatif::{MultiProgress, ProgressBar, ProgressStyle};

const BYTES_TEMPLATE: &str = "{spinner:.blue} {wide_msg} [{elapsed_precise}] {bar:30.cyan/blue} {bytes}/{total_bytes} ({bytes_per_sec}, {eta})";
const COUNT_TEMPLATE: &str = "{spinner:.blue} {wide_msg} {pos} found [{elapsed_precise}]";
const TICK: &str = "⠁⠂⠄⡀⢀⠠⠐⠈ ";
const PB_CHARS: &str = "█▓▒░  ";

static BYTES_STYLE: LazyLock<ProgressStyle> = LazyLock::new(|| {
    ProgressStyle::with_template(BYTES_TEMPLATE)
        .map(|style| style.tick_chars(TICK).progress_chars(PB_CHARS))
        .unwrap_or_else(|_| ProgressStyle::default_bar())
});

static COUNT_STYLE: LazyLock<ProgressStyle> = LazyLock::new(|| {
    ProgressStyle::with_template(COUNT_TEMPLATE)
        .map(|style| style.tick_chars(TICK))
        .unwrap_or_else(|_| ProgressStyle::default_spinner())
});

/// Handle for one progress task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TaskId(u64);

impl TaskId {
    #[must_use]
    pub fn new(id: u64) -> Self {
        Self(id)
    }
}

/// Receives progress events from crawls and transfers.
pub trait ProgressSink: Send + Sync {
    /// Registers a task. Until [`set_total`](Self::set_total) is called the
    /// task counts units without a known end.
    fn add_task(&self, label: &str) -> TaskId;

    /// Sets the expected total (bytes for transfers).
    fn set_total(&self, task: TaskId, total: u64);

    /// Advances the task by `delta` units.
    fn advance(&self, task: TaskId, delta: u64);

    /// Marks the task failed; it receives no further events.
    fn fail_task(&self, task: TaskId);

    /// Marks the task complete.
    fn finish_task(&self, task: TaskId);

    /// Prints a line above the progress display.
    fn message(&self, line: &str);
}

/// Discards every event.
#[derive(Debug, Default)]
pub struct SilentProgress {
    next_id: AtomicU64,
}

impl SilentProgress {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl ProgressSink for SilentProgress {
    fn add_task(&self, _label: &str) -> TaskId {
        TaskId(self.next_id.fetch_add(1, Ordering::Relaxed))
    }

    fn set_total(&self, _task: TaskId, _total: u64) {}

    fn advance(&self, _task: TaskId, _delta: u64) {}

    fn fail_task(&self, _task: TaskId) {}

    fn finish_task(&self, _task: TaskId) {}

    fn message(&self, _line: &str) {}
}

/// Multi-bar terminal display.
#[derive(Debug)]
pub struct ConsoleProgress {
    multi: MultiProgress,
    bars: Mutex<HashMap<TaskId, ProgressBar>>,
    next_id: AtomicU64,
}

impl Default for ConsoleProgress {
    fn default() -> Self {
        Self::new()
    }
}

impl ConsoleProgress {
    #[must_use]
    pub fn new() -> Self {
        Self {
            multi: MultiProgress::new(),
            bars: Mutex::new(HashMap::new()),
            next_id: AtomicU64::new(0),
        }
    }

    fn with_bar(&self, task: TaskId, f: impl FnOnce(&ProgressBar)) {
        let bars = self.bars.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(bar) = bars.get(&task) {
            f(bar);
        }
    }

    fn take_bar(&self, task: TaskId) -> Option<ProgressBar> {
        self.bars
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&task)
    }
}

impl ProgressSink for ConsoleProgress {
    fn add_task(&self, label: &str) -> TaskId {
        let id = TaskId(self.next_id.fetch_add(1, Ordering::Relaxed));
        let bar = self.multi.add(ProgressBar::new_spinner());
        bar.set_style(COUNT_STYLE.clone());
        bar.set_message(label.to_string());
        bar.enable_steady_tick(Duration::from_millis(120));
        self.bars
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(id, bar);
        id
    }

    fn set_total(&self, task: TaskId, total: u64) {
        self.with_bar(task, |bar| {
            bar.set_style(BYTES_STYLE.clone());
            bar.set_length(total);
        });
    }

    fn advance(&self, task: TaskId, delta: u64) {
        self.with_bar(task, |bar| bar.inc(delta));
    }

    fn fail_task(&self, task: TaskId) {
        if let Some(bar) = self.take_bar(task) {
            let label = bar.message();
            bar.abandon_with_message(format!("{label} (failed)"));
        }
    }

    fn finish_task(&self, task: TaskId) {
        if let Some(bar) = self.take_bar(task) {
            bar.finish_and_clear();
        }
    }

    fn message(&self, line: &str) {
        if self.multi.println(line).is_err() {
            eprintln!("{line}");
        }
    }
}
